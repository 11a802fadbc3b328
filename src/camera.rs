//! Look-at camera and fixed perspective projection.
//!
//! The camera is described by an eye point, the point it looks at and an up
//! vector. Navigation moves the eye and/or the look-at point along the camera's
//! own axes; see [`Camera::strafe`], [`Camera::yaw`] and friends.

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub eye: Point3<f32>,
    pub center: Point3<f32>,
    pub up: Vector3<f32>,
}

impl Camera {
    pub const DEFAULT_EYE: [f32; 3] = [0.5, 0.5, -0.5];
    pub const DEFAULT_CENTER: [f32; 3] = [0.5, 0.5, 0.5];
    pub const DEFAULT_UP: [f32; 3] = [0.0, 1.0, 0.0];

    pub fn new<E: Into<Point3<f32>>, C: Into<Point3<f32>>, U: Into<Vector3<f32>>>(
        eye: E,
        center: C,
        up: U,
    ) -> Self {
        Self {
            eye: eye.into(),
            center: center.into(),
            up: up.into(),
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.eye, self.center, self.up)
    }

    /// Unit vector from the eye towards the look-at point.
    pub fn look_direction(&self) -> Vector3<f32> {
        (self.center - self.eye).normalize()
    }

    /// Unit vector `look × up`.
    pub fn right(&self) -> Vector3<f32> {
        self.look_direction().cross(self.up).normalize()
    }

    fn shift(&mut self, offset: Vector3<f32>) {
        self.eye += offset;
        self.center += offset;
    }

    /// Move eye and look-at point along [`Camera::right`].
    pub fn strafe(&mut self, delta: f32) {
        let offset = self.right() * delta;
        self.shift(offset);
    }

    /// Move eye and look-at point along the view direction.
    pub fn dolly(&mut self, delta: f32) {
        let offset = self.look_direction() * delta;
        self.shift(offset);
    }

    /// Move eye and look-at point along the up vector.
    pub fn rise(&mut self, delta: f32) {
        let offset = self.up * delta;
        self.shift(offset);
    }

    /// Turn about the up vector by sliding the look-at point sideways.
    pub fn yaw(&mut self, delta: f32) {
        self.center += self.right() * delta;
    }

    /// Tilt by sliding the look-at point along up, then re-deriving up so it stays
    /// perpendicular to the view direction.
    pub fn pitch(&mut self, delta: f32) {
        let right = self.right();
        self.center += self.up * delta;
        self.up = right.cross(self.center - self.eye).normalize();
    }

    /// Roll about the view direction.
    pub fn roll(&mut self, delta: f32) {
        self.up = (self.up + self.right() * delta).normalize();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Self::DEFAULT_EYE, Self::DEFAULT_CENTER, Self::DEFAULT_UP)
    }
}

/// Perspective projection with a fixed field of view and clip planes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(aspect: f32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

impl Default for Projection {
    /// Square viewport, 90° vertical field of view, depth range 0.1 to 10.
    fn default() -> Self {
        Self::new(1.0, Rad(std::f32::consts::FRAC_PI_2), 0.1, 10.0)
    }
}
