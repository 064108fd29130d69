#![warn(missing_docs)]
//! Geometry primitives (vectors, rays, AABBs, spheres) and the slab intersection test.
//!
//! Vectors are `glam::Vec3`. Degenerate inputs (zero-length directions, flat or
//! inverted boxes) never panic; they degrade to "no hit".

use glam::Vec3;
use serde::{Deserialize, Serialize};

pub use glam;

/// Vectors shorter than this are treated as having no direction.
pub const DEGENERATE_LENGTH: f32 = 1.0e-4;

/// Normalize `v`, returning `Vec3::ZERO` when it is too short to carry a direction.
pub fn normalize_or_degenerate(v: Vec3) -> Vec3 {
    let len = v.length();
    if len > DEGENERATE_LENGTH && len.is_finite() {
        v / len
    } else {
        Vec3::ZERO
    }
}

/// Half-line with a normalized direction. A zero direction marks a no-op ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Ray origin in world space.
    pub origin: Vec3,
    /// Unit direction, or `Vec3::ZERO` for a degenerate ray.
    pub direction: Vec3,
}

impl Ray {
    /// Build a ray, normalizing `direction`.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: normalize_or_degenerate(direction),
        }
    }

    /// Point at parametric distance `t` along the ray.
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// True when the direction collapsed to zero during construction.
    pub fn is_degenerate(&self) -> bool {
        self.direction == Vec3::ZERO
    }
}

/// Axis-aligned bounding box used for ray tests.
///
/// `min <= max` per axis is the caller's responsibility; see [`Aabb::is_well_formed`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from its corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB from center position and full size.
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half_size = size * 0.5;
        Self {
            min: center - half_size,
            max: center + half_size,
        }
    }

    /// Whether `min <= max` holds on every axis.
    pub fn is_well_formed(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    /// Center point.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Full extent along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Half extent along each axis.
    pub fn half_extents(&self) -> Vec3 {
        self.size() * 0.5
    }

    /// Inclusive point containment.
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.min.cmple(point).all() && point.cmple(self.max).all()
    }

    /// Tests intersection with another AABB (touching counts).
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Same box moved by `delta`.
    pub fn translated(&self, delta: Vec3) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }
}

/// Sphere used as an interaction volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingSphere {
    /// Sphere center.
    pub center: Vec3,
    /// Sphere radius.
    pub radius: f32,
}

impl BoundingSphere {
    /// Create a sphere.
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Inclusive point containment.
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.center.distance(point) <= self.radius
    }

    /// Same sphere moved by `delta`.
    pub fn translated(&self, delta: Vec3) -> Self {
        Self {
            center: self.center + delta,
            radius: self.radius,
        }
    }
}

/// Slab test: parametric entry/exit distances `(t_min, t_max)` of `ray` through `aabb`.
///
/// Returns `None` when the ray misses or the box lies entirely behind the origin.
/// `t_min` is negative when the origin is inside the box.
pub fn ray_aabb_intersection(ray: &Ray, aabb: &Aabb) -> Option<(f32, f32)> {
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;

    for axis in 0..3 {
        let origin = ray.origin[axis];
        let dir = ray.direction[axis];
        let lo = aabb.min[axis].min(aabb.max[axis]);
        let hi = aabb.min[axis].max(aabb.max[axis]);

        if dir == 0.0 {
            // Parallel to this slab: 1/0 is infinite and (lo - origin) may be 0,
            // so the product would be NaN. Resolve the slab directly instead.
            if origin < lo || origin > hi {
                return None;
            }
            continue;
        }

        let inv = 1.0 / dir;
        let t1 = (lo - origin) * inv;
        let t2 = (hi - origin) * inv;
        t_min = t_min.max(t1.min(t2));
        t_max = t_max.min(t1.max(t2));
    }

    if t_max < 0.0 || t_min > t_max {
        return None;
    }
    Some((t_min, t_max))
}

/// Outward normal of the face of `aabb` containing `point`.
///
/// The axis with the largest offset from the center relative to its half extent
/// wins; ties go to x, then y, then z. A flat axis counts as fully offset. When
/// the offset on the winning axis is exactly zero the normal opposes `incoming`.
pub fn aabb_face_normal(aabb: &Aabb, point: Vec3, incoming: Vec3) -> Vec3 {
    let offset = point - aabb.center();
    let half = aabb.half_extents().abs();

    let mut best_axis = 0;
    let mut best_ratio = f32::NEG_INFINITY;
    for axis in 0..3 {
        let ratio = if half[axis] > f32::EPSILON {
            offset[axis].abs() / half[axis]
        } else {
            1.0
        };
        if ratio > best_ratio {
            best_ratio = ratio;
            best_axis = axis;
        }
    }

    let sign = if offset[best_axis] > 0.0 {
        1.0
    } else if offset[best_axis] < 0.0 {
        -1.0
    } else if incoming[best_axis] > 0.0 {
        -1.0
    } else {
        1.0
    };

    let mut normal = Vec3::ZERO;
    normal[best_axis] = sign;
    normal
}
