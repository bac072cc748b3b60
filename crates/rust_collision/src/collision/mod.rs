//! Collision primitives and intersection algorithms
//!
//! Pure value types with self-contained intersection math. Nothing here
//! allocates or fails: degenerate input yields `false` or `None`.
//!
//! # Module Organization
//!
//! - [`plane`] - Planes and view frustums
//! - [`ray`] - Rays, with triangle, plane and sphere tests
//! - [`aabb`] - Axis-aligned bounding boxes
//! - [`oobb`] - Oriented bounding boxes
//! - [`sphere`] - Bounding spheres
//! - [`triangle`] - Triangles with cached normal, centroid and radius
//! - [`circle`] - Axis-aligned discs used by gizmo hit-tests
//!
//! # Key Types
//!
//! - [`HitObject`] - The bounds + ray test contract required of tree payloads

pub mod aabb;
pub mod circle;
pub mod oobb;
pub mod plane;
pub mod ray;
pub mod sphere;
pub mod triangle;

use std::rc::Rc;
use std::sync::Arc;

pub use aabb::AABB;
pub use circle::Circle;
pub use oobb::OOBB;
pub use plane::{Frustum, Plane};
pub use ray::Ray;
pub use sphere::Sphere;
pub use triangle::DetailedTriangle;

use crate::foundation::math::{Vec3, WorldTransform};

/// Geometry that can be stored in a [`BVH`](crate::spatial::BVH) or
/// [`Octree`](crate::spatial::Octree).
///
/// `bounds` is in object space. Ray tests receive the optional transform
/// that places the object in world space; the ray itself is always world
/// space.
pub trait HitObject {
    /// Object-space bounding box
    fn bounds(&self) -> AABB;

    /// Test the ray against this object, returning the world-space hit point.
    ///
    /// Hits further than `length` along the ray are rejected. The unit of
    /// `length` is up to the payload: boxes compare it against the world
    /// distance from the ray origin, while triangles treat it as a multiple of
    /// `ray.direction`. Use a unit-length direction when mixing payloads.
    fn ray_hit(
        &self,
        ray: &Ray,
        length: f32,
        transform: Option<&dyn WorldTransform>,
    ) -> Option<Vec3>;

    /// Test whether the ray hits this object within `length`
    fn ray_intersect(
        &self,
        ray: &Ray,
        length: f32,
        transform: Option<&dyn WorldTransform>,
    ) -> bool {
        self.ray_hit(ray, length, transform).is_some()
    }
}

macro_rules! forward_hit_object {
    ($($ptr:ty),*) => {
        $(
            impl<T: HitObject + ?Sized> HitObject for $ptr {
                fn bounds(&self) -> AABB {
                    (**self).bounds()
                }

                fn ray_hit(
                    &self,
                    ray: &Ray,
                    length: f32,
                    transform: Option<&dyn WorldTransform>,
                ) -> Option<Vec3> {
                    (**self).ray_hit(ray, length, transform)
                }
            }
        )*
    };
}

forward_hit_object!(&T, Box<T>, Rc<T>, Arc<T>);
