//! tri-ngin
//!
//! A small, cross-platform compositor for scenes made of textured, lit and
//! partially transparent triangle sets, rendered with wgpu on native targets
//! and WASM. Opaque geometry is drawn first with depth writes on; transparent
//! geometry follows back to front with depth writes off. Textures load in the
//! background and a white fallback is bound until they are ready.
//!
//! High-level modules
//! - `camera`: look-at camera and perspective projection
//! - `config`: viewer configuration (scene file, camera, light, blend mode)
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `data_structures`: transforms, materials, renderable objects, meshes and GPU textures
//! - `flow`: the winit viewer loop and its key bindings
//! - `pipelines`: the opaque and transparent pipelines, uniforms and the light model
//! - `render`: frame composition and the backend draw contract
//! - `resources`: scene description parsing and asynchronous texture loading
//! - `scene`: mutable scene state, selection and manipulation commands
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use winit::keyboard::KeyCode;
