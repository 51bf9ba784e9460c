//! Wavefront OBJ import.
//!
//! Geometry is read with `tobj`, triangulated into fans. Materials are
//! supplied by the caller keyed by name: each face takes the entry named
//! by its `usemtl` statement. MTL files are not read; every name is bound
//! through a material library generated from the caller's map and the
//! file's own `usemtl` statements, so an OBJ needs no `mtllib` to pick up
//! its materials.
//!
//! A face whose material has no entry (or no `usemtl` at all) falls back
//! to [`Material::default`] with a warning, so a scene with a typo still
//! renders.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use lux_math::Vec3;
use thiserror::Error;

use crate::{Material, Triangle};

/// Name of the generated library declared ahead of the file's contents.
const MATERIAL_LIBRARY: &str = "lux-materials.mtl";

/// Errors that can occur during OBJ loading.
#[derive(Error, Debug)]
pub enum ObjError {
    #[error("Failed to read OBJ {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load OBJ {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: tobj::LoadError,
    },
}

/// Result type for OBJ loading.
pub type ObjResult<T> = Result<T, ObjError>;

/// Load an OBJ file and return its faces as triangles.
pub fn load_obj(
    path: impl AsRef<Path>,
    materials: &HashMap<String, Material>,
) -> ObjResult<Vec<Triangle>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ObjError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let library = material_library(&text, materials);
    let source = format!("mtllib {}\n{}", MATERIAL_LIBRARY, text);
    let (models, mtl) = tobj::load_obj_buf(
        &mut source.as_bytes(),
        &tobj::LoadOptions {
            single_index: true,
            triangulate: true,
            ..Default::default()
        },
        |_: &Path| tobj::load_mtl_buf(&mut library.as_bytes()),
    )
    .map_err(|source| ObjError::Load {
        path: path.display().to_string(),
        source,
    })?;

    let material_names: Vec<String> = match mtl {
        Ok(mtl) => mtl.into_iter().map(|m| m.name).collect(),
        Err(e) => {
            log::warn!("No material names for {}: {}", path.display(), e);
            Vec::new()
        }
    };

    let triangles = build_triangles(&models, &material_names, materials);
    log::info!(
        "Loaded {} triangles from {} ({} models)",
        triangles.len(),
        path.display(),
        models.len()
    );
    Ok(triangles)
}

/// MTL text declaring every name the caller supplies or the OBJ uses.
///
/// Declaring unknown `usemtl` names too keeps them attached to their faces,
/// so the fallback warning can name them.
fn material_library(obj: &str, materials: &HashMap<String, Material>) -> String {
    let mut names: BTreeSet<&str> = materials.keys().map(String::as_str).collect();
    names.extend(obj.lines().filter_map(usemtl_name));
    names
        .into_iter()
        .map(|name| format!("newmtl {}\n", name))
        .collect()
}

fn usemtl_name(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix("usemtl")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let name = rest.trim();
    (!name.is_empty()).then_some(name)
}

/// Turn triangulated models into triangles, resolving each model's material
/// by name.
fn build_triangles(
    models: &[tobj::Model],
    material_names: &[String],
    materials: &HashMap<String, Material>,
) -> Vec<Triangle> {
    let mut warned: HashSet<String> = HashSet::new();
    let mut triangles = Vec::new();

    for model in models {
        let mesh = &model.mesh;
        let name = mesh
            .material_id
            .and_then(|id| material_names.get(id))
            .map(String::as_str);

        let material = match name.and_then(|n| materials.get(n)) {
            Some(material) => *material,
            None => {
                let key = name.unwrap_or("<none>");
                if warned.insert(key.to_string()) {
                    log::warn!(
                        "Material '{}' (model '{}') not found, using default diffuse",
                        key,
                        model.name
                    );
                }
                Material::default()
            }
        };

        let position = |i: u32| {
            let i = i as usize * 3;
            Vec3::from_slice(&mesh.positions[i..i + 3])
        };
        for face in mesh.indices.chunks_exact(3) {
            triangles.push(Triangle::new(
                position(face[0]),
                position(face[1]),
                position(face[2]),
                material,
            ));
        }
    }

    triangles
}
