//! Engine data structures: transforms, materials, objects, meshes and textures.
//!
//! - `transform` builds per-object model matrices from interactive state
//! - `material` holds Blinn-Phong reflectivity and opacity
//! - `object` is the renderable record the compositor walks every frame
//! - `model` contains the GPU vertex layout and mesh buffers
//! - `texture` contains the GPU texture wrapper and upload utilities

pub mod material;
pub mod model;
pub mod object;
pub mod texture;
pub mod transform;
