//! Rays for picking and ray casting

use crate::foundation::math::{Vec3, EPSILON};
use serde::{Deserialize, Serialize};

/// A ray for ray casting and picking
///
/// The direction is not required to be unit length. Bounded queries take a
/// separate length: [`Ray::triangle_hit`] measures it in multiples of
/// `direction`, while [`Ray::sphere_hit`] measures world distance along the
/// normalized direction. The two agree only for a unit direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    /// The origin point of the ray
    pub origin: Vec3,
    /// The direction of the ray
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    pub const fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Get a point along the ray at parameter t
    pub fn point(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Test the segment `[origin, origin + direction * max_len]` against the
    /// triangle `a, b, c`, returning the hit point.
    ///
    /// Two-sided Möller-Trumbore restricted to the segment.
    pub fn triangle_hit(&self, max_len: f32, a: Vec3, b: Vec3, c: Vec3) -> Option<Vec3> {
        let segment = self.direction * max_len;
        let edge1 = b - a;
        let edge2 = c - a;

        let h = segment.cross(&edge2);
        let det = edge1.dot(&h);

        // Segment parallel to the triangle plane (or triangle degenerate).
        // The determinant scales with all three lengths, so the tolerance does too.
        let scale = segment.magnitude() * edge1.magnitude() * edge2.magnitude();
        if det.abs() <= EPSILON * scale {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = self.origin - a;
        let u = inv_det * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = inv_det * segment.dot(&q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = inv_det * edge2.dot(&q);
        if (0.0..=1.0).contains(&t) {
            Some(self.origin + segment * t)
        } else {
            None
        }
    }

    /// Intersect the ray with the plane through `plane_position` with normal
    /// `plane_normal`.
    ///
    /// Misses when the ray is near parallel to the plane or the plane lies
    /// behind the origin.
    pub fn plane_hit(&self, plane_position: Vec3, plane_normal: Vec3) -> Option<Vec3> {
        let d = plane_normal.dot(&self.direction);
        if d.abs() < EPSILON {
            return None;
        }
        let t = (plane_position - self.origin).dot(&plane_normal) / d;
        if t < 0.0 {
            return None;
        }
        Some(self.point(t))
    }

    /// Test whether the ray passes within `radius` of `center` no further
    /// than `max_len + radius` along its (normalized) direction.
    pub fn sphere_hit(&self, center: Vec3, radius: f32, max_len: f32) -> bool {
        let Some(direction) = self.direction.try_normalize(EPSILON) else {
            return false;
        };
        let to_center = center - self.origin;
        let projection = to_center.dot(&direction);
        if projection < 0.0 || projection > max_len + radius {
            return false;
        }
        let closest_sq = to_center.magnitude_squared() - projection * projection;
        closest_sq <= radius * radius
    }
}
