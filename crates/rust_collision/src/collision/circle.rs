//! Axis-aligned discs for gizmo handles

use super::Ray;
use crate::foundation::math::{Axis, Vec3};
use serde::{Deserialize, Serialize};

/// A flat disc whose normal is one of the cardinal axes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// Center of the disc
    pub point: Vec3,
    /// Radius of the disc
    pub radius: f32,
    /// Normal axis of the disc's plane
    pub axis: Axis,
}

impl Circle {
    /// Create a disc
    pub const fn new(point: Vec3, radius: f32, axis: Axis) -> Self {
        Self {
            point,
            radius,
            axis,
        }
    }

    /// Unit normal of the disc's plane
    pub fn normal(&self) -> Vec3 {
        self.axis.unit()
    }

    /// Intersect the ray with the disc, returning the hit point
    pub fn ray_hit(&self, ray: &Ray) -> Option<Vec3> {
        let hit = ray.plane_hit(self.point, self.normal())?;
        let mut offset = hit - self.point;
        offset[self.axis.index()] = 0.0;
        (offset.magnitude_squared() <= self.radius * self.radius).then_some(hit)
    }
}
