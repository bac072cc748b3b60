//! Math utilities and types
//!
//! Provides the vector/matrix aliases used by every collision primitive,
//! the cardinal [`Axis`] helper, and the [`WorldTransform`] capability the
//! scene graph hands to object-space queries.

pub use nalgebra::{Matrix3, Matrix4, Quaternion, Unit, Vector3};
use serde::{Deserialize, Serialize};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Tolerance for near-parallel and near-zero comparisons
pub const EPSILON: f32 = 1e-6;

/// One of the three cardinal axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// The X axis (right)
    X,
    /// The Y axis (up)
    Y,
    /// The Z axis (forward)
    Z,
}

impl Axis {
    /// All three axes in index order
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Component index of this axis (0, 1 or 2)
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Unit vector pointing along this axis
    pub fn unit(self) -> Vec3 {
        match self {
            Self::X => Vec3::x(),
            Self::Y => Vec3::y(),
            Self::Z => Vec3::z(),
        }
    }

    /// The axis along which `v` has its largest component.
    ///
    /// Ties resolve toward the lower axis.
    pub fn longest(v: &Vec3) -> Self {
        if v.x >= v.y && v.x >= v.z {
            Self::X
        } else if v.y >= v.z {
            Self::Y
        } else {
            Self::Z
        }
    }
}

/// World-space placement supplied by the scene graph.
///
/// Object-space shapes use this to move themselves into world space before a
/// ray test. Only the world matrix is required for intersection math;
/// `position` and `scale` are used by the constructors that bind a bounding
/// volume directly to a transform.
pub trait WorldTransform {
    /// Full object-to-world matrix
    fn world_matrix(&self) -> Mat4;

    /// World-space position
    fn position(&self) -> Vec3;

    /// World-space scale factors
    fn scale(&self) -> Vec3;
}

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Builder pattern: Set scale
    #[must_use]
    pub const fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Convert to a transformation matrix (TRS order)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        transform_point(&self.to_matrix(), &point)
    }
}

impl WorldTransform for Transform {
    fn world_matrix(&self) -> Mat4 {
        self.to_matrix()
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn scale(&self) -> Vec3 {
        self.scale
    }
}

/// A bare matrix is its own world transform; position and scale are
/// decomposed from the translation column and the basis column lengths.
impl WorldTransform for Mat4 {
    fn world_matrix(&self) -> Mat4 {
        *self
    }

    fn position(&self) -> Vec3 {
        Vec3::new(self.m14, self.m24, self.m34)
    }

    fn scale(&self) -> Vec3 {
        Vec3::new(
            Vec3::new(self.m11, self.m21, self.m31).magnitude(),
            Vec3::new(self.m12, self.m22, self.m32).magnitude(),
            Vec3::new(self.m13, self.m23, self.m33).magnitude(),
        )
    }
}

/// Transform a point (w = 1) by a 4x4 matrix
pub fn transform_point(matrix: &Mat4, point: &Vec3) -> Vec3 {
    matrix.transform_point(&Point3::from(*point)).coords
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Create a rotation matrix around the Y axis
    fn rotation_y(angle: f32) -> Mat4;

    /// Create a right-handed perspective projection with a [-1, 1] depth range
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create a right-handed look-at view matrix
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn rotation_y(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::y_axis(), angle)
    }

    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::new_perspective(aspect, fov_y, near, far)
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        Mat4::look_at_rh(&Point3::from(eye), &Point3::from(target), &up)
    }
}
