//! Viewer configuration
//!
//! Everything the viewer needs before the first frame: which scene to load,
//! the clear colour and the initial camera, light and blend mode. All fields
//! have defaults, so a configuration file only lists what it changes.

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{camera::Camera, pipelines::light::{BlendMode, Light}};

/// Initial camera placement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub eye: [f32; 3],
    pub center: [f32; 3],
    pub up: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: Camera::DEFAULT_EYE,
            center: Camera::DEFAULT_CENTER,
            up: Camera::DEFAULT_UP,
        }
    }
}

impl From<&CameraConfig> for Camera {
    fn from(config: &CameraConfig) -> Self {
        Camera::new(config.eye, config.center, config.up)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    /// Scene description, relative to the assets directory
    pub scene_file: String,
    /// Background clear color (RGBA)
    pub clear_colour: [f64; 4],
    pub camera: CameraConfig,
    pub light: Light,
    pub blend_mode: BlendMode,
    /// Window title
    pub title: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            scene_file: "triangles.json".to_string(),
            clear_colour: [0.0, 0.0, 0.0, 1.0],
            camera: CameraConfig::default(),
            light: Light::default(),
            blend_mode: BlendMode::default(),
            title: "tri-ngin".to_string(),
        }
    }
}

impl ViewerConfig {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Malformed viewer configuration")
    }

    pub fn clear_colour(&self) -> wgpu::Color {
        let [r, g, b, a] = self.clear_colour;
        wgpu::Color { r, g, b, a }
    }
}
