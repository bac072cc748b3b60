//! Axis-aligned bounding boxes

use super::{DetailedTriangle, Frustum, HitObject, Plane, Ray};
use crate::foundation::math::{transform_point, Axis, Mat4, Vec3, WorldTransform};
use serde::{Deserialize, Serialize};

/// Axis-Aligned Bounding Box described by a center and half extents
///
/// Invariant: every component of `extent` is non-negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AABB {
    /// Center of the box
    pub center: Vec3,
    /// Per-axis half widths
    pub extent: Vec3,
}

impl AABB {
    /// Create an AABB from a center and half extents
    pub const fn new(center: Vec3, extent: Vec3) -> Self {
        Self { center, extent }
    }

    /// Create a cube centered at `center` with the given half width
    pub fn from_width(center: Vec3, half_width: f32) -> Self {
        Self {
            center,
            extent: Vec3::new(half_width, half_width, half_width),
        }
    }

    /// Create an AABB from its minimum and maximum corners
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self {
            center: (min + max) * 0.5,
            extent: (max - min) * 0.5,
        }
    }

    /// Bind a box directly to a transform: centered on its position with the
    /// transform's scale used as the half extents
    pub fn from_transform<T: WorldTransform + ?Sized>(transform: &T) -> Self {
        Self {
            center: transform.position(),
            extent: transform.scale(),
        }
    }

    /// Smallest box containing every point, `None` for an empty slice
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (min, max) = rest
            .iter()
            .fold((*first, *first), |(min, max), p| (min.inf(p), max.sup(p)));
        Some(Self::from_min_max(min, max))
    }

    /// Smallest box containing a triangle
    pub fn from_triangle(triangle: &DetailedTriangle) -> Self {
        let [a, b, c] = triangle.points();
        Self::from_min_max(a.inf(&b).inf(&c), a.sup(&b).sup(&c))
    }

    /// Create a union AABB of two AABBs that surrounds both of them
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self::from_min_max(self.min().inf(&other.min()), self.max().sup(&other.max()))
    }

    /// Minimum corner
    pub fn min(&self) -> Vec3 {
        self.center - self.extent
    }

    /// Maximum corner
    pub fn max(&self) -> Vec3 {
        self.center + self.extent
    }

    /// Full size along each axis
    pub fn size(&self) -> Vec3 {
        self.extent * 2.0
    }

    /// Returns the axis which has greatest extent
    pub fn longest_axis(&self) -> Axis {
        Axis::longest(&self.extent)
    }

    /// Distance between the closest points of two boxes, zero when they overlap
    pub fn closest_distance(&self, other: &Self) -> f32 {
        let gap = (self.center - other.center).abs() - (self.extent + other.extent);
        gap.sup(&Vec3::zeros()).magnitude()
    }

    /// Slab-method ray test, returning the entry point.
    ///
    /// A ray starting inside the box hits at its origin.
    pub fn ray_hit(&self, ray: &Ray) -> Option<Vec3> {
        let mut t_min = 0.0_f32;
        let mut t_max = f32::INFINITY;
        let (min, max) = (self.min(), self.max());

        for i in 0..3 {
            let origin = ray.origin[i];
            let direction = ray.direction[i];
            if direction.abs() < f32::EPSILON {
                // Parallel to this slab: must already be inside it
                if origin < min[i] || origin > max[i] {
                    return None;
                }
            } else {
                let inv = 1.0 / direction;
                let mut t1 = (min[i] - origin) * inv;
                let mut t2 = (max[i] - origin) * inv;
                if t1 > t2 {
                    std::mem::swap(&mut t1, &mut t2);
                }
                t_min = t_min.max(t1);
                t_max = t_max.min(t2);
                if t_min > t_max {
                    return None;
                }
            }
        }

        Some(ray.point(t_min))
    }

    /// Check if this AABB contains a point
    pub fn contains(&self, point: &Vec3) -> bool {
        let (min, max) = (self.min(), self.max());
        (0..3).all(|i| point[i] >= min[i] && point[i] <= max[i])
    }

    /// Check if this AABB fully contains another AABB
    pub fn contains_aabb(&self, other: &Self) -> bool {
        self.contains(&other.min()) && self.contains(&other.max())
    }

    /// Check if this AABB intersects another AABB
    pub fn intersects(&self, other: &Self) -> bool {
        (0..3).all(|i| {
            (self.center[i] - other.center[i]).abs() <= self.extent[i] + other.extent[i]
        })
    }

    /// Check if the plane passes through this box
    pub fn plane_intersect(&self, plane: &Plane) -> bool {
        let r = self.extent.dot(&plane.normal.abs());
        plane.signed_distance(&self.center).abs() <= r
    }

    /// Separating Axis test against a triangle.
    ///
    /// Tests the 9 box-axis x triangle-edge axes, the 3 box face normals and
    /// finally the triangle's plane, after a bounding-sphere early out.
    pub fn triangle_intersect(&self, triangle: &DetailedTriangle) -> bool {
        // Work with the box at the origin
        let t = triangle.points().map(|p| p - self.center);
        let e = self.extent;

        let centroid = triangle.centroid() - self.center;
        if centroid.magnitude() > e.magnitude() + triangle.radius() {
            return false;
        }

        let edges = [t[1] - t[0], t[2] - t[1], t[0] - t[2]];

        for axis in Axis::ALL {
            for edge in &edges {
                let a = axis.unit().cross(edge);
                let r = e.dot(&a.abs());
                let (p_min, p_max) = project(&t, &a);
                if p_max < -r || p_min > r {
                    return false;
                }
            }
        }

        for i in 0..3 {
            let p_min = t[0][i].min(t[1][i]).min(t[2][i]);
            let p_max = t[0][i].max(t[1][i]).max(t[2][i]);
            if p_max < -e[i] || p_min > e[i] {
                return false;
            }
        }

        let plane = Plane::from_point_normal(t[0], edges[0].cross(&edges[1]));
        Self::new(Vec3::zeros(), e).plane_intersect(&plane)
    }

    /// Check if this box is inside or intersects the frustum
    pub fn in_frustum(&self, frustum: &Frustum) -> bool {
        let (min, max) = (self.min(), self.max());
        frustum.planes.iter().all(|plane| {
            // Corner furthest along the plane normal
            let n = plane.normal;
            let positive = Vec3::new(
                if n.x > 0.0 { max.x } else { min.x },
                if n.y > 0.0 { max.y } else { min.y },
                if n.z > 0.0 { max.z } else { min.z },
            );
            plane.signed_distance(&positive) >= 0.0
        })
    }

    /// Surface area of the box
    pub fn surface_area(&self) -> f32 {
        let s = self.size();
        2.0 * (s.x * s.y + s.x * s.z + s.y * s.z)
    }

    /// The 8 corner points
    pub fn corners(&self) -> [Vec3; 8] {
        let (min, max) = (self.min(), self.max());
        [
            min,
            Vec3::new(min.x, min.y, max.z),
            Vec3::new(min.x, max.y, min.z),
            Vec3::new(min.x, max.y, max.z),
            Vec3::new(max.x, min.y, min.z),
            Vec3::new(max.x, min.y, max.z),
            Vec3::new(max.x, max.y, min.z),
            max,
        ]
    }

    /// Axis-aligned box enclosing this box after transformation by `matrix`.
    ///
    /// Conservative under rotation.
    #[must_use]
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let corners = self.corners().map(|c| transform_point(matrix, &c));
        let (min, max) = corners[1..]
            .iter()
            .fold((corners[0], corners[0]), |(min, max), p| (min.inf(p), max.sup(p)));
        Self::from_min_max(min, max)
    }
}

/// Project three points onto an axis, returning the (min, max) interval
fn project(points: &[Vec3; 3], axis: &Vec3) -> (f32, f32) {
    let p0 = points[0].dot(axis);
    let p1 = points[1].dot(axis);
    let p2 = points[2].dot(axis);
    (p0.min(p1).min(p2), p0.max(p1).max(p2))
}

impl HitObject for AABB {
    fn bounds(&self) -> AABB {
        *self
    }

    fn ray_hit(
        &self,
        ray: &Ray,
        length: f32,
        transform: Option<&dyn WorldTransform>,
    ) -> Option<Vec3> {
        let world = transform.map_or(*self, |t| self.transformed(&t.world_matrix()));
        let point = world.ray_hit(ray)?;
        if (point - ray.origin).magnitude() > length {
            return None;
        }
        Some(point)
    }
}
