//! Bounding spheres

use super::{Frustum, Plane, Ray, AABB, OOBB};
use crate::foundation::math::{Vec3, EPSILON};
use serde::{Deserialize, Serialize};

/// Sphere described by its center and radius
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    /// Center of the sphere
    pub position: Vec3,
    /// Radius, never negative
    pub radius: f32,
}

impl Sphere {
    /// Create a sphere
    pub const fn new(position: Vec3, radius: f32) -> Self {
        Self { position, radius }
    }

    /// Check whether two spheres touch or overlap
    pub fn overlap(&self, other: &Self) -> bool {
        let reach = self.radius + other.radius;
        (self.position - other.position).magnitude_squared() <= reach * reach
    }

    /// Check whether the sphere touches an axis-aligned box
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        let closest = self.position.sup(&aabb.min()).inf(&aabb.max());
        (closest - self.position).magnitude_squared() <= self.radius * self.radius
    }

    /// Check whether the sphere touches an oriented box
    pub fn intersects_oobb(&self, oobb: &OOBB) -> bool {
        let local = oobb.orientation.transpose() * (self.position - oobb.center);
        let closest = local.sup(&-oobb.extent).inf(&oobb.extent);
        (closest - local).magnitude_squared() <= self.radius * self.radius
    }

    /// Ray parameter of the first hit, in multiples of `ray.direction`.
    ///
    /// A ray starting inside the sphere reports its exit. Hits behind the
    /// origin are ignored.
    pub fn intersects_ray(&self, ray: &Ray) -> Option<f32> {
        let oc = ray.origin - self.position;
        let a = ray.direction.magnitude_squared();
        if a <= EPSILON * EPSILON {
            return None;
        }
        let b = 2.0 * oc.dot(&ray.direction);
        let c = oc.magnitude_squared() - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        let t0 = (-b - root) / (2.0 * a);
        let t1 = (-b + root) / (2.0 * a);
        if t0 >= 0.0 {
            Some(t0)
        } else if t1 >= 0.0 {
            Some(t1)
        } else {
            None
        }
    }

    /// Penetration depth into a plane, `None` when the sphere does not touch it
    pub fn intersects_plane(&self, plane: &Plane) -> Option<f32> {
        let distance = plane.signed_distance(&self.position).abs();
        (distance <= self.radius).then(|| self.radius - distance)
    }

    /// Check whether any part of the sphere lies inside the frustum
    pub fn intersects_frustum(&self, frustum: &Frustum) -> bool {
        frustum
            .planes
            .iter()
            .all(|plane| plane.signed_distance(&self.position) >= -self.radius)
    }

    /// Axis-aligned box enclosing the sphere
    pub fn bounds(&self) -> AABB {
        AABB::from_width(self.position, self.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Mat3, Mat4, Mat4Ext, Quat};
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    #[test]
    fn test_overlap_is_symmetric() {
        let a = Sphere::new(Vec3::zeros(), 1.0);
        let touching = Sphere::new(Vec3::new(1.5, 0.0, 0.0), 0.5);
        let apart = Sphere::new(Vec3::new(3.0, 0.0, 0.0), 0.5);

        assert!(a.overlap(&touching));
        assert!(touching.overlap(&a));
        assert!(!a.overlap(&apart));
        assert!(!apart.overlap(&a));
    }

    #[test]
    fn test_intersects_aabb() {
        let b = AABB::from_width(Vec3::zeros(), 1.0);
        assert!(Sphere::new(Vec3::new(1.5, 0.0, 0.0), 0.6).intersects_aabb(&b));
        assert!(Sphere::new(Vec3::zeros(), 0.1).intersects_aabb(&b));
        // Near the corner the clamp matters: distance to (1,1,1) is sqrt(3) * 0.5
        assert!(!Sphere::new(Vec3::new(1.5, 1.5, 1.5), 0.8).intersects_aabb(&b));
        assert!(Sphere::new(Vec3::new(1.5, 1.5, 1.5), 0.9).intersects_aabb(&b));
    }

    #[test]
    fn test_intersects_oobb() {
        let rotation = Quat::from_axis_angle(&Vec3::y_axis(), FRAC_PI_4);
        let b = OOBB::new(
            Vec3::zeros(),
            Vec3::new(1.0, 1.0, 1.0),
            *rotation.to_rotation_matrix().matrix(),
        );
        // The rotated box reaches sqrt(2) along world X
        assert!(Sphere::new(Vec3::new(1.8, 0.0, 0.0), 0.5).intersects_oobb(&b));
        assert!(!Sphere::new(Vec3::new(2.0, 0.0, 0.0), 0.5).intersects_oobb(&b));

        let unrotated = OOBB::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), Mat3::identity());
        assert!(!Sphere::new(Vec3::new(1.8, 0.0, 0.0), 0.5).intersects_oobb(&unrotated));
    }

    #[test]
    fn test_intersects_ray() {
        let s = Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0);
        let ray = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0));
        assert_relative_eq!(s.intersects_ray(&ray).unwrap(), 4.0, epsilon = 1e-5);

        let inside = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -1.0));
        assert_relative_eq!(s.intersects_ray(&inside).unwrap(), 1.0, epsilon = 1e-5);

        let behind = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, 1.0));
        assert!(s.intersects_ray(&behind).is_none());

        let miss = Ray::new(Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(s.intersects_ray(&miss).is_none());
    }

    #[test]
    fn test_intersects_ray_degenerate_direction() {
        let s = Sphere::new(Vec3::zeros(), 1.0);
        let zero = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::zeros());
        assert!(s.intersects_ray(&zero).is_none());

        let tiny = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1e-9));
        assert!(s.intersects_ray(&tiny).is_none());
    }

    #[test]
    fn test_intersects_plane_penetration() {
        let floor = Plane::from_point_normal(Vec3::zeros(), Vec3::y());
        let s = Sphere::new(Vec3::new(0.0, 0.75, 0.0), 1.0);
        assert_relative_eq!(s.intersects_plane(&floor).unwrap(), 0.25, epsilon = 1e-6);

        let below = Sphere::new(Vec3::new(0.0, -0.5, 0.0), 1.0);
        assert_relative_eq!(below.intersects_plane(&floor).unwrap(), 0.5, epsilon = 1e-6);

        let above = Sphere::new(Vec3::new(0.0, 2.0, 0.0), 1.0);
        assert!(above.intersects_plane(&floor).is_none());
    }

    #[test]
    fn test_intersects_frustum() {
        let projection = Mat4::perspective(FRAC_PI_2, 1.0, 1.0, 100.0);
        let view = Mat4::look_at(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0), Vec3::y());
        let frustum = Frustum::from_view_projection(&(projection * view));

        assert!(Sphere::new(Vec3::new(0.0, 0.0, -10.0), 1.0).intersects_frustum(&frustum));
        // Center behind the camera, but large enough to poke through the near plane
        assert!(Sphere::new(Vec3::new(0.0, 0.0, 0.5), 2.0).intersects_frustum(&frustum));
        assert!(!Sphere::new(Vec3::new(0.0, 0.0, 5.0), 1.0).intersects_frustum(&frustum));
        assert!(!Sphere::new(Vec3::new(30.0, 0.0, -10.0), 1.0).intersects_frustum(&frustum));
    }

    #[test]
    fn test_bounds() {
        let s = Sphere::new(Vec3::new(1.0, 2.0, 3.0), 0.5);
        let b = s.bounds();
        assert_relative_eq!(b.min(), Vec3::new(0.5, 1.5, 2.5));
        assert_relative_eq!(b.max(), Vec3::new(1.5, 2.5, 3.5));
    }
}
