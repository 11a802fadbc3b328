//! Per-object model transforms.
//!
//! Every renderable object carries an [`ObjectTransform`]: a fixed centroid, an
//! accumulated translation, an interactive orientation and a highlight flag.
//! [`ObjectTransform::compose`] turns that state into the model matrix
//!
//! ```text
//! M = T(translation) * T(center) * R * S(highlight) * T(-center)
//! ```
//!
//! so rotations and the highlight scale-up both happen about the object's own
//! center rather than the world origin.

use cgmath::{InnerSpace, Matrix3, Matrix4, One, Quaternion, Rad, Rotation, Rotation3, SquareMatrix, Vector3, Zero};

/// Uniform scale applied to the highlighted object.
pub const HIGHLIGHT_SCALE: f32 = 1.2;

/// Number of incremental rotations after which the orientation is re-normalized.
pub const RENORMALIZE_INTERVAL: u32 = 16;

/// Orientation of an object, stored as a unit quaternion.
///
/// The object's local x and y axes are derived from the quaternion, so they stay
/// orthonormal no matter how many incremental rotations are applied. Floating
/// point error only affects the quaternion's length, which is corrected every
/// [`RENORMALIZE_INTERVAL`] rotations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orientation {
    rotation: Quaternion<f32>,
    updates: u32,
}

impl Orientation {
    pub fn identity() -> Self {
        Self {
            rotation: Quaternion::one(),
            updates: 0,
        }
    }

    /// Build an orientation whose local x and y axes map onto `x_axis` and `y_axis`.
    ///
    /// The axes must be non-parallel. They are orthonormalized before conversion,
    /// `y_axis` yielding to `x_axis`.
    pub fn from_axes(x_axis: Vector3<f32>, y_axis: Vector3<f32>) -> Self {
        let x = x_axis.normalize();
        let z = x.cross(y_axis).normalize();
        let y = z.cross(x);
        Self {
            rotation: Quaternion::from(Matrix3::from_cols(x, y, z)).normalize(),
            updates: 0,
        }
    }

    pub fn x_axis(&self) -> Vector3<f32> {
        self.rotation.rotate_vector(Vector3::unit_x())
    }

    pub fn y_axis(&self) -> Vector3<f32> {
        self.rotation.rotate_vector(Vector3::unit_y())
    }

    /// Rotate by `angle` about the world-space `axis`.
    pub fn rotate(&mut self, axis: Vector3<f32>, angle: Rad<f32>) {
        self.rotation = Quaternion::from_axis_angle(axis.normalize(), angle) * self.rotation;
        self.updates += 1;
        if self.updates % RENORMALIZE_INTERVAL == 0 {
            self.rotation = self.rotation.normalize();
        }
    }

    pub fn quaternion(&self) -> Quaternion<f32> {
        self.rotation
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::identity()
    }
}

/// Interactive transform state of one object.
#[derive(Clone, Debug)]
pub struct ObjectTransform {
    center: Vector3<f32>,
    pub translation: Vector3<f32>,
    pub orientation: Orientation,
    pub highlighted: bool,
}

impl ObjectTransform {
    /// Create the rest transform of an object whose vertices average to `center`.
    pub fn new(center: Vector3<f32>) -> Self {
        Self {
            center,
            translation: Vector3::zero(),
            orientation: Orientation::identity(),
            highlighted: false,
        }
    }

    pub fn center(&self) -> Vector3<f32> {
        self.center
    }

    /// The object's current position: its centroid moved by the user translation.
    pub fn world_center(&self) -> Vector3<f32> {
        self.center + self.translation
    }

    pub fn x_axis(&self) -> Vector3<f32> {
        self.orientation.x_axis()
    }

    pub fn y_axis(&self) -> Vector3<f32> {
        self.orientation.y_axis()
    }

    pub fn z_axis(&self) -> Vector3<f32> {
        self.x_axis().cross(self.y_axis()).normalize()
    }

    /// Replace the orientation. `x_axis` and `y_axis` must not be parallel.
    pub fn set_axes(&mut self, x_axis: Vector3<f32>, y_axis: Vector3<f32>) {
        self.orientation = Orientation::from_axes(x_axis, y_axis);
    }

    pub fn translate(&mut self, offset: Vector3<f32>) {
        self.translation += offset;
    }

    pub fn rotate(&mut self, axis: Vector3<f32>, angle: Rad<f32>) {
        self.orientation.rotate(axis, angle);
    }

    /// Back to zero translation and the world axes. The highlight flag is kept.
    pub fn reset(&mut self) {
        self.translation = Vector3::zero();
        self.orientation = Orientation::identity();
    }

    /// Model matrix mapping object-local coordinates to world coordinates.
    pub fn compose(&self) -> Matrix4<f32> {
        let to_origin = Matrix4::from_translation(-self.center);
        let highlight = if self.highlighted {
            Matrix4::from_scale(HIGHLIGHT_SCALE)
        } else {
            Matrix4::identity()
        };
        let x_axis = self.x_axis();
        let y_axis = self.y_axis();
        let z_axis = x_axis.cross(y_axis).normalize();
        let rotation = Matrix4::from(Matrix3::from_cols(x_axis, y_axis, z_axis));

        Matrix4::from_translation(self.translation)
            * Matrix4::from_translation(self.center)
            * rotation
            * highlight
            * to_origin
    }
}
