//! Triangles with cached derived data

use super::{HitObject, Ray, AABB};
use crate::foundation::math::{transform_point, Vec3, WorldTransform, EPSILON};
use serde::{Deserialize, Serialize};

/// A triangle carrying its normal, centroid and bounding radius
///
/// Fields are read-only and derived from the points at construction.
/// Serialized form is the three points alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[Vec3; 3]", into = "[Vec3; 3]")]
pub struct DetailedTriangle {
    points: [Vec3; 3],
    normal: Vec3,
    centroid: Vec3,
    radius: f32,
}

impl DetailedTriangle {
    /// Build a triangle and compute its derived fields
    pub fn from_points(points: [Vec3; 3]) -> Self {
        let [p0, p1, p2] = points;
        let normal = (p2 - p1)
            .cross(&(p0 - p2))
            .try_normalize(EPSILON)
            .unwrap_or_else(Vec3::zeros);
        let centroid = (p0 + p1 + p2) / 3.0;
        let radius = points
            .iter()
            .map(|p| (p - centroid).magnitude())
            .fold(0.0_f32, f32::max);

        Self {
            points,
            normal,
            centroid,
            radius,
        }
    }
}

impl DetailedTriangle {
    /// Corner positions
    pub const fn points(&self) -> [Vec3; 3] {
        self.points
    }

    /// Unit face normal, zero for a degenerate triangle
    pub const fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Mean of the three points
    pub const fn centroid(&self) -> Vec3 {
        self.centroid
    }

    /// Distance from the centroid to the furthest corner
    pub const fn radius(&self) -> f32 {
        self.radius
    }
}

impl From<DetailedTriangle> for [Vec3; 3] {
    fn from(triangle: DetailedTriangle) -> Self {
        triangle.points
    }
}

impl From<[Vec3; 3]> for DetailedTriangle {
    fn from(points: [Vec3; 3]) -> Self {
        Self::from_points(points)
    }
}

impl HitObject for DetailedTriangle {
    fn bounds(&self) -> AABB {
        AABB::from_triangle(self)
    }

    fn ray_hit(
        &self,
        ray: &Ray,
        length: f32,
        transform: Option<&dyn WorldTransform>,
    ) -> Option<Vec3> {
        let [a, b, c] = match transform {
            Some(t) => {
                let world = t.world_matrix();
                self.points.map(|p| transform_point(&world, &p))
            }
            None => self.points,
        };
        ray.triangle_hit(length, a, b, c)
    }
}
