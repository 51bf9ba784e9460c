//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! The tree is stored flat: `nodes[0]` is the root, children are referenced
//! by index, and every node owns a contiguous range of `tri_idx`, a
//! permutation of the triangle list. Leaves are the nodes whose range was
//! not worth splitting under the surface area heuristic.
//!
//! Both construction and traversal use explicit stacks, so deep or
//! degenerate scenes cannot overflow the call stack.

use std::time::Instant;

use lux_core::{Material, Triangle};
use lux_math::{Aabb, Ray, Vec3};

use crate::{RenderError, RenderResult, TraceBackend};

/// Sentinel child index of a leaf.
const NO_CHILD: i32 = -1;

/// A node of the flattened hierarchy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BvhNode {
    /// Bounds of every triangle in `tri_start..=tri_end`
    pub aabb: Aabb,
    /// Index of the left child, -1 for a leaf
    pub left: i32,
    /// Index of the right child, -1 for a leaf
    pub right: i32,
    /// First position in `tri_idx` owned by this node
    pub tri_start: u32,
    /// Last position in `tri_idx` owned by this node (inclusive)
    pub tri_end: u32,
}

impl BvhNode {
    fn leaf(tri_start: usize, tri_end: usize) -> Self {
        Self {
            aabb: Aabb::EMPTY,
            left: NO_CHILD,
            right: NO_CHILD,
            tri_start: tri_start as u32,
            tri_end: tri_end as u32,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left < 0
    }

    /// Number of triangles in this node's range.
    pub fn len(&self) -> usize {
        (self.tri_end - self.tri_start) as usize + 1
    }
}

/// Nearest intersection found by a traversal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Index into the hierarchy's triangle list
    pub triangle: usize,
    /// Distance along the ray
    pub t: f32,
}

impl Hit {
    /// Whether `(t, triangle)` should replace `best`.
    ///
    /// Ties on `t` go to the lower triangle index so every traversal order
    /// agrees on the same hit.
    #[inline]
    pub(crate) fn improves(best: Option<Hit>, t: f32, triangle: usize) -> bool {
        match best {
            None => true,
            Some(b) => t < b.t || (t == b.t && triangle < b.triangle),
        }
    }
}

/// A candidate split plane.
#[derive(Debug, Clone, Copy)]
struct Split {
    axis: usize,
    position: f32,
    cost: f32,
}

/// Triangle hierarchy built with a full-sweep surface area heuristic.
#[derive(Debug, Clone)]
pub struct Bvh {
    triangles: Vec<Triangle>,
    tri_idx: Vec<u32>,
    nodes: Vec<BvhNode>,
}

impl Bvh {
    /// Build a hierarchy over `triangles`, taking ownership of them.
    ///
    /// Each node is split at the centroid plane minimizing
    /// `area(left) * |left| + area(right) * |right|` across all three axes,
    /// provided that beats keeping the node as a leaf
    /// (`area(node) * |node|`). Fails with [`RenderError::InvalidArgument`]
    /// if `triangles` is empty.
    pub fn build(triangles: Vec<Triangle>) -> RenderResult<Self> {
        if triangles.is_empty() {
            return Err(RenderError::InvalidArgument(
                "cannot build a BVH over zero triangles".to_string(),
            ));
        }

        let start = Instant::now();
        let count = triangles.len();
        let mut tri_idx: Vec<u32> = (0..count as u32).collect();
        let mut nodes = vec![BvhNode::leaf(0, count - 1)];
        let mut pending = vec![0usize];

        while let Some(node_index) = pending.pop() {
            let (lo, hi) = {
                let node = &nodes[node_index];
                (node.tri_start as usize, node.tri_end as usize)
            };
            let range = &mut tri_idx[lo..=hi];

            let aabb = range.iter().fold(Aabb::EMPTY, |mut acc, &i| {
                acc.merge(triangles[i as usize].aabb());
                acc
            });
            nodes[node_index].aabb = aabb;

            let leaf_cost = aabb.area() * range.len() as f32;
            let Some(split) = find_split(&triangles, range, leaf_cost) else {
                continue;
            };

            let left_count = partition(&triangles, range, split);
            if left_count == 0 || left_count == range.len() {
                continue;
            }

            let left = nodes.len();
            nodes.push(BvhNode::leaf(lo, lo + left_count - 1));
            nodes.push(BvhNode::leaf(lo + left_count, hi));
            nodes[node_index].left = left as i32;
            nodes[node_index].right = left as i32 + 1;
            pending.push(left);
            pending.push(left + 1);
        }

        let bvh = Self {
            triangles,
            tri_idx,
            nodes,
        };
        log::debug!(
            "Built BVH over {} triangles: {} nodes, {} leaves, depth {} in {:.2?}",
            count,
            bvh.nodes.len(),
            bvh.leaf_count(),
            bvh.depth(),
            start.elapsed()
        );
        Ok(bvh)
    }

    /// All triangles, in construction order.
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn triangle(&self, index: usize) -> &Triangle {
        &self.triangles[index]
    }

    /// Permutation of triangle indices; each node owns a contiguous range.
    pub fn tri_idx(&self) -> &[u32] {
        &self.tri_idx
    }

    /// Flattened nodes, root first.
    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    pub fn root(&self) -> &BvhNode {
        &self.nodes[0]
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(0usize, 1usize)];
        while let Some((i, d)) = stack.pop() {
            let node = &self.nodes[i];
            deepest = deepest.max(d);
            if !node.is_leaf() {
                stack.push((node.left as usize, d + 1));
                stack.push((node.right as usize, d + 1));
            }
        }
        deepest
    }

    /// Nearest triangle hit along `ray`, if any.
    pub fn nearest_hit(&self, ray: &Ray) -> Option<Hit> {
        let inv_dir = ray.inv_direction();
        let mut best: Option<Hit> = None;
        let mut stack: Vec<u32> = Vec::with_capacity(64);
        stack.push(0);

        while let Some(i) = stack.pop() {
            let node = &self.nodes[i as usize];
            if !node.aabb.intersect_inv(ray.origin, inv_dir) {
                continue;
            }

            if node.is_leaf() {
                for &tri in &self.tri_idx[node.tri_start as usize..=node.tri_end as usize] {
                    let tri = tri as usize;
                    if let Some(t) = self.triangles[tri].intersect(ray) {
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

    /// Nearest hit by testing every triangle. Reference for
    /// [`Bvh::nearest_hit`], which must agree with it on every ray.
    pub fn brute_force_hit(&self, ray: &Ray) -> Option<Hit> {
        let mut best: Option<Hit> = None;
        for (tri, triangle) in self.triangles.iter().enumerate() {
            if let Some(t) = triangle.intersect(ray) {
                if Hit::improves(best, t, tri) {
                    best = Some(Hit { triangle: tri, t });
                }
            }
        }
        best
    }
}

impl TraceBackend for Bvh {
    fn nearest_hit(&self, ray: &Ray) -> Option<Hit> {
        Bvh::nearest_hit(self, ray)
    }

    fn surface(&self, triangle: usize, ray_dir: Vec3) -> (Vec3, Material) {
        let tri = &self.triangles[triangle];
        (tri.normal(ray_dir), *tri.material())
    }
}

/// Sweep every triangle centroid on every axis as a candidate plane and
/// return the cheapest split that beats `leaf_cost`.
///
/// Quadratic in the node size; fine for the scene sizes this renderer
/// targets.
fn find_split(triangles: &[Triangle], range: &[u32], leaf_cost: f32) -> Option<Split> {
    let mut best: Option<Split> = None;

    for axis in 0..3 {
        for &candidate in range {
            let position = triangles[candidate as usize].centroid()[axis];

            let mut left = Aabb::EMPTY;
            let mut right = Aabb::EMPTY;
            let (mut left_count, mut right_count) = (0usize, 0usize);
            for &i in range {
                let tri = &triangles[i as usize];
                if tri.centroid()[axis] < position {
                    left.merge(tri.aabb());
                    left_count += 1;
                } else {
                    right.merge(tri.aabb());
                    right_count += 1;
                }
            }
            if left_count == 0 || right_count == 0 {
                continue;
            }

            let cost = left.area() * left_count as f32 + right.area() * right_count as f32;
            let threshold = best.map_or(leaf_cost, |b| b.cost);
            if cost < threshold {
                best = Some(Split {
                    axis,
                    position,
                    cost,
                });
            }
        }
    }

    best
}

/// Reorder `range` in place so triangles whose centroid lies strictly below
/// the split plane come first. Returns how many that is.
fn partition(triangles: &[Triangle], range: &mut [u32], split: Split) -> usize {
    let goes_left = |i: u32| triangles[i as usize].centroid()[split.axis] < split.position;

    let (mut i, mut j) = (0usize, range.len());
    loop {
        while i < j && goes_left(range[i]) {
            i += 1;
        }
        while i < j && !goes_left(range[j - 1]) {
            j -= 1;
        }
        if i >= j {
            return i;
        }
        range.swap(i, j - 1);
        i += 1;
        j -= 1;
    }
}
