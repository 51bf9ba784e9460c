//! Render configuration.

use serde::{Deserialize, Serialize};

use crate::{max_worker_threads, TraceConfig, SHIFT_BIAS};

/// Render configuration.
///
/// Every field is optional when deserializing; missing fields take their
/// [`Default`] value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Samples per pixel, split across the worker threads
    pub samples: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Number of worker threads.
    ///
    /// Defaults to [`max_worker_threads`], but never below one. A
    /// single-core host allows no workers at all, so the default there is
    /// rejected by `render_with` with `ResourceLimitExceeded`; render with
    /// `render_samples` on the calling thread instead.
    pub threads: usize,
    /// Seed of the per-worker random streams
    pub seed: u64,
    /// Offset of each bounce origin along the surface normal
    pub shift_bias: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples: 100,
            max_depth: 5,
            threads: max_worker_threads().max(1),
            seed: 1,
            shift_bias: SHIFT_BIAS,
        }
    }
}

impl RenderConfig {
    /// The integrator settings carried by this configuration.
    pub fn trace_config(&self) -> TraceConfig {
        TraceConfig {
            max_depth: self.max_depth,
            shift_bias: self.shift_bias,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: RenderConfig =
            serde_json::from_str(r#"{ "samples": 16, "seed": 99 }"#).unwrap();
        assert_eq!(config.samples, 16);
        assert_eq!(config.seed, 99);
        assert_eq!(config.max_depth, RenderConfig::default().max_depth);
        assert_eq!(config.shift_bias, SHIFT_BIAS);
    }

    #[test]
    fn test_trace_config() {
        let config = RenderConfig {
            max_depth: 3,
            shift_bias: 0.01,
            ..Default::default()
        };
        assert_eq!(
            config.trace_config(),
            TraceConfig {
                max_depth: 3,
                shift_bias: 0.01
            }
        );
    }

    #[test]
    fn test_default_threads() {
        let config = RenderConfig::default();
        assert_eq!(config.threads, max_worker_threads().max(1));
        assert!(config.threads >= 1);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        // Unknown keys are ignored so configs can carry CLI-only settings
        let config: RenderConfig = serde_json::from_str(r#"{ "gamma": 2.2 }"#).unwrap();
        assert_eq!(config, RenderConfig::default());
    }
}
