use crate::{Ray, Vec3};

/// Axis-Aligned Bounding Box for spatial acceleration structures (BVH).
///
/// `lb` is the componentwise lower bound and `rt` the upper bound. The
/// [`Aabb::EMPTY`] sentinel (`lb = +inf`, `rt = -inf`) is the identity for
/// [`Aabb::merge`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub lb: Vec3,
    pub rt: Vec3,
}

impl Aabb {
    /// An empty box that contains nothing.
    pub const EMPTY: Aabb = Aabb {
        lb: Vec3::INFINITY,
        rt: Vec3::NEG_INFINITY,
    };

    /// Create a box from its lower and upper corners.
    pub fn new(lb: Vec3, rt: Vec3) -> Self {
        Self { lb, rt }
    }

    /// Create the tight box around a set of points.
    pub fn from_points(points: &[Vec3]) -> Self {
        points.iter().fold(Self::EMPTY, |mut acc, &p| {
            acc.merge_point(p);
            acc
        })
    }

    /// Grow this box to enclose `other`.
    pub fn merge(&mut self, other: &Aabb) {
        self.lb = self.lb.min(other.lb);
        self.rt = self.rt.max(other.rt);
    }

    /// Grow this box to enclose the point `p`.
    pub fn merge_point(&mut self, p: Vec3) {
        self.lb = self.lb.min(p);
        self.rt = self.rt.max(p);
    }

    /// Return the box enclosing both `a` and `b`.
    pub fn surrounding(a: &Aabb, b: &Aabb) -> Self {
        let mut out = *a;
        out.merge(b);
        out
    }

    /// Slab test against a ray whose direction reciprocal is precomputed.
    ///
    /// Zero direction components yield infinite reciprocals and `±inf` slab
    /// distances, so no branch guards the division. A ray lying in a
    /// boundary plane gives `0 * inf = NaN` for that axis; such a slab is
    /// treated as spanning the whole line, since the origin is on the box
    /// face.
    #[inline]
    pub fn intersect_inv(&self, ray_o: Vec3, inv_ray_d: Vec3) -> bool {
        let t1 = (self.lb - ray_o) * inv_ray_d;
        let t2 = (self.rt - ray_o) * inv_ray_d;
        let on_face = t1.is_nan_mask() | t2.is_nan_mask();

        let tmax = Vec3::select(on_face, Vec3::INFINITY, t1.max(t2)).min_element();
        let tmin = Vec3::select(on_face, Vec3::NEG_INFINITY, t1.min(t2)).max_element();

        if tmax < 0.0 {
            return false;
        }
        tmin <= tmax
    }

    /// Slab test against a ray origin and direction.
    #[inline]
    pub fn intersect(&self, ray_o: Vec3, ray_d: Vec3) -> bool {
        self.intersect_inv(ray_o, ray_d.recip())
    }

    /// Slab test against a [`Ray`].
    #[inline]
    pub fn hit(&self, ray: &Ray) -> bool {
        self.intersect_inv(ray.origin, ray.inv_direction())
    }

    /// Half of the surface area; zero for an invalid box.
    ///
    /// Only meaningful as a relative cost between boxes.
    pub fn area(&self) -> f32 {
        if !self.is_valid() {
            return 0.0;
        }
        let d = self.rt - self.lb;
        d.x * d.y + d.x * d.z + d.y * d.z
    }

    /// True when `lb <= rt` on every axis.
    pub fn is_valid(&self) -> bool {
        self.lb.cmple(self.rt).all()
    }

    /// True when `other` lies entirely inside this box (boundaries included).
    pub fn contains(&self, other: &Aabb) -> bool {
        self.lb.cmple(other.lb).all() && other.rt.cmple(self.rt).all()
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.lb + self.rt) * 0.5
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}
