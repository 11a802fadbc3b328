use cgmath::Vector3;

/// Blinn-Phong reflectivity and opacity of a triangle set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub shininess: f32,
    /// Multiplied into the sampled texture alpha. Anything below `1.0` forces the
    /// object into the transparent pass.
    pub alpha: f32,
}

impl Material {
    pub const DEFAULT_AMBIENT: [f32; 3] = [0.2, 0.2, 0.2];
    pub const DEFAULT_DIFFUSE: [f32; 3] = [0.8, 0.8, 0.8];
    pub const DEFAULT_SPECULAR: [f32; 3] = [0.2, 0.2, 0.2];
    pub const DEFAULT_SHININESS: f32 = 10.0;

    pub fn is_translucent(&self) -> bool {
        self.alpha < 1.0
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Self::DEFAULT_AMBIENT.into(),
            diffuse: Self::DEFAULT_DIFFUSE.into(),
            specular: Self::DEFAULT_SPECULAR.into(),
            shininess: Self::DEFAULT_SHININESS,
            alpha: 1.0,
        }
    }
}
