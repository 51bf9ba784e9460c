//! Flattened scene layout for GPU upload.
//!
//! A built [`Bvh`] is copied into plain `#[repr(C)]` arrays that can be
//! written to storage buffers byte for byte. Every vector occupies a
//! 16-byte slot (std430 pads `vec3` to 16 bytes), with a scalar packed into
//! the fourth lane where one fits.
//!
//! [`GpuScene`] also implements [`TraceBackend`], tracing straight from
//! the flat arrays, so the CPU integrator can check the layout against the
//! hierarchy it came from.

use bytemuck::{Pod, Zeroable};
use lux_core::{face_normal, intersect_triangle, Color, Material, MaterialKind};
use lux_math::{Aabb, Ray, Vec3};

use crate::{Bvh, BvhNode, Hit, TraceBackend};

/// Material as laid out in the material lane of a [`GpuTriangle`].
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuMaterial {
    pub color: [f32; 3],
    /// [`MaterialKind::as_u32`] tag
    pub kind: u32,
    pub emission: [f32; 3],
    pub roughness: f32,
}

impl From<&Material> for GpuMaterial {
    fn from(m: &Material) -> Self {
        Self {
            color: m.color.to_array(),
            kind: m.kind.as_u32(),
            emission: m.emission.to_array(),
            roughness: m.roughness,
        }
    }
}

impl GpuMaterial {
    /// Back to a [`Material`]; an unknown kind tag reads as the default.
    pub fn to_material(&self) -> Material {
        match MaterialKind::from_u32(self.kind) {
            Some(kind) => Material {
                kind,
                color: Color::from_array(self.color),
                emission: Color::from_array(self.emission),
                roughness: self.roughness,
            },
            None => Material::default(),
        }
    }
}

/// One triangle with its material inline.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuTriangle {
    pub v1: [f32; 3],
    _pad0: f32,
    pub v2: [f32; 3],
    _pad1: f32,
    pub v3: [f32; 3],
    _pad2: f32,
    pub material: GpuMaterial,
}

impl GpuTriangle {
    fn vertices(&self) -> (Vec3, Vec3, Vec3) {
        (
            Vec3::from_array(self.v1),
            Vec3::from_array(self.v2),
            Vec3::from_array(self.v3),
        )
    }
}

/// One hierarchy node; child indices ride in the fourth lane of the bounds.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuBvhNode {
    pub lb: [f32; 3],
    /// Left child index, -1 for a leaf
    pub left: i32,
    pub rt: [f32; 3],
    /// Right child index, -1 for a leaf
    pub right: i32,
    pub tri_start: u32,
    /// Inclusive
    pub tri_end: u32,
    _pad: [u32; 2],
}

impl From<&BvhNode> for GpuBvhNode {
    fn from(node: &BvhNode) -> Self {
        Self {
            lb: node.aabb.lb.to_array(),
            left: node.left,
            rt: node.aabb.rt.to_array(),
            right: node.right,
            tri_start: node.tri_start,
            tri_end: node.tri_end,
            _pad: [0; 2],
        }
    }
}

/// The upload-ready copy of a [`Bvh`].
#[derive(Debug, Clone, Default)]
pub struct GpuScene {
    pub triangles: Vec<GpuTriangle>,
    pub tri_idx: Vec<u32>,
    pub nodes: Vec<GpuBvhNode>,
}

impl GpuScene {
    pub fn from_bvh(bvh: &Bvh) -> Self {
        let triangles = bvh
            .triangles()
            .iter()
            .map(|tri| {
                let [v1, v2, v3] = tri.vertices();
                GpuTriangle {
                    v1: v1.to_array(),
                    _pad0: 0.0,
                    v2: v2.to_array(),
                    _pad1: 0.0,
                    v3: v3.to_array(),
                    _pad2: 0.0,
                    material: tri.material().into(),
                }
            })
            .collect();

        let scene = Self {
            triangles,
            tri_idx: bvh.tri_idx().to_vec(),
            nodes: bvh.nodes().iter().map(GpuBvhNode::from).collect(),
        };
        log::debug!(
            "Flattened BVH: {} triangle bytes, {} node bytes, {} index bytes",
            scene.triangle_bytes().len(),
            scene.node_bytes().len(),
            scene.index_bytes().len()
        );
        scene
    }

    pub fn triangle_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.triangles)
    }

    pub fn node_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.nodes)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.tri_idx)
    }
}

impl TraceBackend for GpuScene {
    fn nearest_hit(&self, ray: &Ray) -> Option<Hit> {
        if self.nodes.is_empty() {
            return None;
        }

        let inv_dir = ray.inv_direction();
        let mut best: Option<Hit> = None;
        let mut stack: Vec<u32> = Vec::with_capacity(64);
        stack.push(0);

        while let Some(i) = stack.pop() {
            let node = &self.nodes[i as usize];
            let aabb = Aabb::new(Vec3::from_array(node.lb), Vec3::from_array(node.rt));
            if !aabb.intersect_inv(ray.origin, inv_dir) {
                continue;
            }

            if node.left < 0 {
                for &tri in &self.tri_idx[node.tri_start as usize..=node.tri_end as usize] {
                    let tri = tri as usize;
                    let (v1, v2, v3) = self.triangles[tri].vertices();
                    if let Some(t) = intersect_triangle(v1, v2, v3, ray) {
                        if Hit::improves(best, t, tri) {
                            best = Some(Hit { triangle: tri, t });
                        }
                    }
                }
            } else {
                stack.push(node.right as u32);
                stack.push(node.left as u32);
            }
        }

        best
    }

    fn surface(&self, triangle: usize, ray_dir: Vec3) -> (Vec3, Material) {
        let tri = &self.triangles[triangle];
        let (v1, v2, v3) = tri.vertices();
        let n = face_normal(v1, v2, v3);
        let normal = if n.dot(ray_dir) < 0.0 { n } else { -n };
        (normal, tri.material.to_material())
    }
}
