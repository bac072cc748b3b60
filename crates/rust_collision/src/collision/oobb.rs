//! Oriented bounding boxes

use super::{Ray, AABB};
use crate::foundation::math::{transform_point, Mat3, Vec3, WorldTransform};
use serde::{Deserialize, Serialize};

/// Axes shorter than this are treated as parallel in the SAT
const AXIS_EPSILON: f32 = 1e-6;

/// Slack allowed when comparing projected intervals
const OVERLAP_EPSILON: f32 = 1e-6;

/// Oriented Bounding Box
///
/// Invariant: the columns of `orientation` are unit length and mutually
/// orthogonal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OOBB {
    /// Center of the box in world space
    pub center: Vec3,
    /// Half widths along each local axis
    pub extent: Vec3,
    /// Local axes stored as columns
    pub orientation: Mat3,
}

impl Default for OOBB {
    fn default() -> Self {
        Self::from_aabb(&AABB::default())
    }
}

impl OOBB {
    /// Create an oriented box
    pub const fn new(center: Vec3, extent: Vec3, orientation: Mat3) -> Self {
        Self {
            center,
            extent,
            orientation,
        }
    }

    /// An oriented box with the identity orientation
    pub fn from_aabb(aabb: &AABB) -> Self {
        Self {
            center: aabb.center,
            extent: aabb.extent,
            orientation: Mat3::identity(),
        }
    }

    /// Place an object-space box in world space
    ///
    /// Scale is moved out of the orientation and into the extent so the
    /// basis stays orthonormal.
    pub fn from_transform<T: WorldTransform + ?Sized>(base: &AABB, transform: &T) -> Self {
        let world = transform.world_matrix();
        let scale = transform.scale();
        let linear: Mat3 = world.fixed_view::<3, 3>(0, 0).into_owned();

        let mut orientation = Mat3::identity();
        for i in 0..3 {
            let column = linear.column(i).into_owned();
            if let Some(unit) = column.try_normalize(AXIS_EPSILON) {
                orientation.set_column(i, &unit);
            }
        }

        Self {
            center: transform_point(&world, &base.center),
            extent: base.extent.component_mul(&scale),
            orientation,
        }
    }

    /// Local axis `i` as a world-space unit vector
    pub fn axis(&self, i: usize) -> Vec3 {
        self.orientation.column(i).into_owned()
    }

    /// Express a world-space vector in the box's local frame
    fn to_local(&self, v: &Vec3) -> Vec3 {
        self.orientation.transpose() * v
    }

    /// Check if a point lies inside (or on) the box
    pub fn contains_point(&self, point: &Vec3) -> bool {
        let local = self.to_local(&(point - self.center));
        (0..3).all(|i| local[i].abs() <= self.extent[i])
    }

    /// Separating Axis test against another oriented box.
    ///
    /// Candidate axes are the 3 local axes of each box and the 9 cross
    /// products between them; near-zero cross products are skipped.
    pub fn intersect(&self, other: &Self) -> bool {
        let mut axes = Vec::with_capacity(15);
        for i in 0..3 {
            axes.push(self.axis(i));
            axes.push(other.axis(i));
        }
        for i in 0..3 {
            for j in 0..3 {
                let cross = self.axis(i).cross(&other.axis(j));
                let length = cross.magnitude();
                if length > AXIS_EPSILON {
                    axes.push(cross / length);
                }
            }
        }

        axes.iter().all(|axis| {
            let (min1, max1) = self.project_interval(axis);
            let (min2, max2) = other.project_interval(axis);
            intervals_overlap(min1, max1, min2, max2)
        })
    }

    /// Ray test in the box's local frame, rejecting hits beyond `length`
    pub fn ray_intersect(&self, ray: &Ray, length: f32) -> bool {
        let local_ray = Ray::new(
            self.to_local(&(ray.origin - self.center)),
            self.to_local(&ray.direction),
        );
        let local_box = AABB::new(Vec3::zeros(), self.extent);
        // Rotation preserves distances, so the length check can stay local
        local_box
            .ray_hit(&local_ray)
            .is_some_and(|hit| (hit - local_ray.origin).magnitude() <= length)
    }

    /// World-space axis-aligned box enclosing every corner
    pub fn bounds(&self) -> AABB {
        let corners = self.corners();
        let (min, max) = corners[1..]
            .iter()
            .fold((corners[0], corners[0]), |(min, max), p| (min.inf(p), max.sup(p)));
        AABB::from_min_max(min, max)
    }

    /// The 8 corners in world space
    pub fn corners(&self) -> [Vec3; 8] {
        const SIGNS: [[f32; 3]; 8] = [
            [-1.0, -1.0, -1.0],
            [1.0, -1.0, -1.0],
            [-1.0, 1.0, -1.0],
            [1.0, 1.0, -1.0],
            [-1.0, -1.0, 1.0],
            [1.0, -1.0, 1.0],
            [-1.0, 1.0, 1.0],
            [1.0, 1.0, 1.0],
        ];
        SIGNS.map(|[x, y, z]| {
            let local = Vec3::new(x, y, z).component_mul(&self.extent);
            self.orientation * local + self.center
        })
    }

    /// Project the box onto an axis, returning the (min, max) interval
    fn project_interval(&self, axis: &Vec3) -> (f32, f32) {
        let p = self.center.dot(axis);
        let r = (0..3)
            .map(|i| self.axis(i).dot(axis).abs() * self.extent[i])
            .sum::<f32>();
        (p - r, p + r)
    }
}

fn intervals_overlap(min1: f32, max1: f32, min2: f32, max2: f32) -> bool {
    max1 >= min2 - OVERLAP_EPSILON && max2 >= min1 - OVERLAP_EPSILON
}
