//! The scene's single point light and the lighting/texture blend contract.
//!
//! The WGSL fragment shader (`scene.wgsl`) evaluates exactly what
//! [`Light::terms`] and [`BlendMode::shade`] compute here on the CPU.

use cgmath::{ElementWise, InnerSpace, Point3, Vector3, Vector4};
use serde::{Deserialize, Serialize};

use crate::data_structures::material::Material;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub position: [f32; 3],
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: [-0.5, 1.5, -0.5],
            ambient: [1.0, 1.0, 1.0],
            diffuse: [1.0, 1.0, 1.0],
            specular: [1.0, 1.0, 1.0],
        }
    }
}

/// The three Blinn-Phong contributions at one surface point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightingTerms {
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
}

impl LightingTerms {
    /// `ambient + diffuse + specular`, clamped to `[0, 1]` per channel.
    pub fn combined(&self) -> Vector3<f32> {
        let sum = self.ambient + self.diffuse + self.specular;
        Vector3::new(
            sum.x.clamp(0.0, 1.0),
            sum.y.clamp(0.0, 1.0),
            sum.z.clamp(0.0, 1.0),
        )
    }
}

impl Light {
    /// Blinn-Phong terms for a surface point seen from `eye`.
    pub fn terms(
        &self,
        material: &Material,
        normal: Vector3<f32>,
        position: Point3<f32>,
        eye: Point3<f32>,
    ) -> LightingTerms {
        let normal = normal.normalize();
        let to_light = (Point3::from(self.position) - position).normalize();
        let to_eye = (eye - position).normalize();
        let half = (to_light + to_eye).normalize();

        let lambert = normal.dot(to_light).max(0.0);
        let highlight = normal.dot(half).max(0.0).powf(material.shininess);

        LightingTerms {
            ambient: material.ambient.mul_element_wise(Vector3::from(self.ambient)),
            diffuse: material.diffuse.mul_element_wise(Vector3::from(self.diffuse)) * lambert,
            specular: material.specular.mul_element_wise(Vector3::from(self.specular)) * highlight,
        }
    }
}

/// How the sampled texture and the lighting are combined, for the whole frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlendMode {
    /// Unlit: the raw texture colour.
    Replace,
    /// Texture colour multiplied by the clamped lighting.
    #[default]
    Modulate,
}

impl BlendMode {
    pub fn toggled(self) -> Self {
        match self {
            BlendMode::Replace => BlendMode::Modulate,
            BlendMode::Modulate => BlendMode::Replace,
        }
    }

    /// Value of the `blend_mode` shader uniform.
    pub fn as_uniform(self) -> u32 {
        match self {
            BlendMode::Replace => 0,
            BlendMode::Modulate => 1,
        }
    }

    /// Final fragment colour for a texel, the lighting at that fragment and the
    /// material alpha. Alpha is `texel.a * material_alpha` in both modes.
    pub fn shade(self, texel: Vector4<f32>, lighting: &LightingTerms, material_alpha: f32) -> Vector4<f32> {
        let alpha = texel.w * material_alpha;
        let rgb = match self {
            BlendMode::Replace => texel.truncate(),
            BlendMode::Modulate => lighting.combined().mul_element_wise(texel.truncate()),
        };
        rgb.extend(alpha)
    }
}
