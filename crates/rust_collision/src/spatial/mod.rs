//! Spatial partitioning data structures
//!
//! Hierarchies over [`HitObject`](crate::collision::HitObject)s for ray
//! picking and broad-phase queries in 3D space.
//!
//! - [`bvh`] - Bounding Volume Hierarchy, built once from a fixed set
//! - [`octree`] - Fixed-depth octree accepting incremental inserts

pub mod bvh;
pub mod octree;

pub use bvh::{BVHHit, BVHNode, NodeId, BVH};
pub use octree::{Octree, OctreeHit, OctreeNode, MESH_OCTREE_DEPTH};
