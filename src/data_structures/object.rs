//! Renderable object records.

use std::sync::Arc;

use crate::{
    data_structures::{material::Material, transform::ObjectTransform},
    resources::texture::{TextureBinding, TextureResource},
};

/// One independently transformable triangle set.
///
/// `G` is the handle to the uploaded geometry and `T` the backend texture type.
/// Both are owned by whoever created the scene; the object only references them.
pub struct RenderableObject<G, T> {
    pub name: String,
    pub geometry: G,
    pub triangles: u32,
    pub material: Material,
    pub transform: ObjectTransform,
    texture: Option<Arc<TextureResource<T>>>,
    transparent: bool,
}

impl<G, T> RenderableObject<G, T> {
    pub fn new(
        name: impl Into<String>,
        geometry: G,
        triangles: u32,
        material: Material,
        transform: ObjectTransform,
        texture: Option<Arc<TextureResource<T>>>,
        transparent: bool,
    ) -> Self {
        Self {
            name: name.into(),
            geometry,
            triangles,
            material,
            transform,
            texture,
            transparent,
        }
    }

    /// The load-time transparency decision.
    pub fn transparent_hint(&self) -> bool {
        self.transparent
    }

    /// Whether the object belongs to the transparent pass.
    ///
    /// A material alpha below one always wins, even if the load-time hint said opaque.
    pub fn is_transparent(&self) -> bool {
        self.transparent || self.material.is_translucent()
    }

    pub fn texture(&self) -> Option<&Arc<TextureResource<T>>> {
        self.texture.as_ref()
    }

    /// The texture to sample this frame. Objects without a texture, or whose
    /// texture is still loading or failed to load, get the white fallback.
    pub fn texture_binding(&self) -> TextureBinding<'_, T> {
        match &self.texture {
            Some(texture) => texture.bind(),
            None => TextureBinding::Fallback,
        }
    }
}
