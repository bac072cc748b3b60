//! # Rust Collision
//!
//! Bounding volumes, intersection tests and spatial hierarchies for picking,
//! culling and broad-phase collision in 3D scenes.
//!
//! ## Features
//!
//! - **Primitives**: AABB, OOBB, spheres, planes, frustums, rays, triangles
//!   and gizmo discs
//! - **BVH**: Median-split hierarchy over any [`HitObject`](collision::HitObject)
//! - **Octree**: Fixed-depth subdivision with straddle-aware insertion
//! - **Config**: TOML/RON settings for the octree
//!
//! ## Quick Start
//!
//! ```rust
//! use rust_collision::prelude::*;
//!
//! let boxes: Vec<AABB> = (0..4)
//!     .map(|i| AABB::from_width(Vec3::new(i as f32 * 3.0, 0.0, 0.0), 0.5))
//!     .collect();
//! let bvh = BVH::build(boxes);
//!
//! let ray = Ray::new(Vec3::new(3.0, 10.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
//! let hit = bvh.ray_cast(&ray, 100.0, None).expect("box below the ray");
//! assert_eq!(hit.data.center, Vec3::new(3.0, 0.0, 0.0));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::many_single_char_names
)]

pub mod collision;
pub mod config;
pub mod foundation;
pub mod spatial;

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        collision::{
            Circle, DetailedTriangle, Frustum, HitObject, Plane, Ray, Sphere, AABB, OOBB,
        },
        config::{CollisionConfig, Config, ConfigError, OctreeConfig},
        foundation::math::{Axis, Mat3, Mat4, Quat, Transform, Vec3, WorldTransform},
        spatial::{Octree, OctreeHit, BVHHit, BVH},
    };
}
