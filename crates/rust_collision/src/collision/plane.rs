//! Planes and view frustums
//!
//! Every plane consumer in this crate shares one sign convention: the signed
//! distance of `p` is `normal · p - dot`, positive on the side the normal
//! points toward.

use crate::foundation::logging::warn;
use crate::foundation::math::{Mat4, Vec3, EPSILON};
use nalgebra::Vector4;
use serde::{Deserialize, Serialize};

/// Plane defined by normal and signed offset
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Plane normal (not necessarily unit length, see [`Plane::normalized`])
    pub normal: Vec3,
    /// Offset along the normal: `normal · p == dot` for points on the plane
    pub dot: f32,
}

impl Plane {
    /// Create a plane from a normal and offset
    pub const fn new(normal: Vec3, dot: f32) -> Self {
        Self { normal, dot }
    }

    /// Create a plane passing through `point` with the given normal
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        Self {
            normal,
            dot: normal.dot(&point),
        }
    }

    /// Signed distance from the plane to a point
    ///
    /// Metric only when the normal is unit length.
    pub fn signed_distance(&self, point: &Vec3) -> f32 {
        self.normal.dot(point) - self.dot
    }

    /// Rescale normal and offset together so the normal has unit length.
    ///
    /// A degenerate (near-zero) normal is returned unchanged.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let length = self.normal.magnitude();
        if length <= EPSILON {
            return *self;
        }
        Self {
            normal: self.normal / length,
            dot: self.dot / length,
        }
    }

    /// Build a plane from a clip-space row combination `(a, b, c, d)` meaning
    /// `a*x + b*y + c*z + d >= 0` on the inside
    fn from_clip_row(row: Vector4<f32>) -> Self {
        Self {
            normal: Vec3::new(row.x, row.y, row.z),
            dot: -row.w,
        }
    }
}

/// Frustum for visibility culling
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Frustum {
    /// Six planes, normals pointing inward: left, right, bottom, top, near, far
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Index of the left plane
    pub const LEFT: usize = 0;
    /// Index of the right plane
    pub const RIGHT: usize = 1;
    /// Index of the bottom plane
    pub const BOTTOM: usize = 2;
    /// Index of the top plane
    pub const TOP: usize = 3;
    /// Index of the near plane
    pub const NEAR: usize = 4;
    /// Index of the far plane
    pub const FAR: usize = 5;

    /// Create a frustum from six planes
    pub const fn new(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    /// Build a frustum from a combined view-projection matrix
    pub fn from_view_projection(view_projection: &Mat4) -> Self {
        let mut frustum = Self::default();
        frustum.extract_planes(view_projection);
        frustum
    }

    /// Extract frustum planes from a view-projection matrix
    ///
    /// Gribb-Hartmann extraction for column-vector matrices (`clip = M * v`):
    /// each side is the fourth row plus or minus one of the first three.
    /// Planes are normalized so signed distances are metric.
    pub fn extract_planes(&mut self, view_projection: &Mat4) {
        let row = |i: usize| -> Vector4<f32> { view_projection.row(i).transpose() };
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        let combos = [r3 + r0, r3 - r0, r3 + r1, r3 - r1, r3 + r2, r3 - r2];
        for (plane, combo) in self.planes.iter_mut().zip(combos) {
            let raw = Plane::from_clip_row(combo);
            if raw.normal.magnitude() <= EPSILON {
                warn!("Degenerate frustum plane extracted: {raw:?}");
            }
            *plane = raw.normalized();
        }
    }

    /// Check whether a point lies inside (or on) every plane
    pub fn contains_point(&self, point: &Vec3) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.signed_distance(point) >= 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Mat4Ext;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    fn camera_frustum() -> Frustum {
        // Camera at the origin looking down -Z, 90 degree vertical fov
        let projection = Mat4::perspective(FRAC_PI_2, 1.0, 1.0, 100.0);
        let view = Mat4::look_at(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0), Vec3::y());
        Frustum::from_view_projection(&(projection * view))
    }

    #[test]
    fn test_plane_signed_distance() {
        let plane = Plane::from_point_normal(Vec3::new(0.0, 2.0, 0.0), Vec3::y());
        assert_relative_eq!(plane.signed_distance(&Vec3::new(5.0, 5.0, 5.0)), 3.0);
        assert_relative_eq!(plane.signed_distance(&Vec3::new(0.0, 0.0, 0.0)), -2.0);
    }

    #[test]
    fn test_plane_normalized_preserves_surface() {
        let plane = Plane::new(Vec3::new(0.0, 4.0, 0.0), 8.0).normalized();
        assert_relative_eq!(plane.normal, Vec3::y());
        assert_relative_eq!(plane.dot, 2.0);
    }

    #[test]
    fn test_degenerate_plane_normalized_unchanged() {
        let plane = Plane::new(Vec3::zeros(), 1.0);
        assert_eq!(plane.normalized(), plane);
    }

    #[test]
    fn test_extracted_planes_are_unit_length() {
        let frustum = camera_frustum();
        for plane in &frustum.planes {
            assert_relative_eq!(plane.normal.magnitude(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_extracted_near_far_distances() {
        let frustum = camera_frustum();
        let near = frustum.planes[Frustum::NEAR];
        let far = frustum.planes[Frustum::FAR];

        assert_relative_eq!(near.normal, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-5);
        assert_relative_eq!(far.normal, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-5);
        // Point 10 units ahead is 9 past the near plane and 90 before the far one
        let p = Vec3::new(0.0, 0.0, -10.0);
        assert_relative_eq!(near.signed_distance(&p), 9.0, epsilon = 1e-3);
        assert_relative_eq!(far.signed_distance(&p), 90.0, epsilon = 1e-3);
    }

    #[test]
    fn test_frustum_contains_point() {
        let frustum = camera_frustum();
        assert!(frustum.contains_point(&Vec3::new(0.0, 0.0, -10.0)));
        assert!(frustum.contains_point(&Vec3::new(5.0, 5.0, -10.0)));
        assert!(!frustum.contains_point(&Vec3::new(0.0, 0.0, 10.0)));
        assert!(!frustum.contains_point(&Vec3::new(0.0, 0.0, -0.5)));
        assert!(!frustum.contains_point(&Vec3::new(0.0, 0.0, -200.0)));
        assert!(!frustum.contains_point(&Vec3::new(20.0, 0.0, -10.0)));
    }
}
