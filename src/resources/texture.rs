//! Texture lifecycle: asynchronous loading, decoding and readiness tracking.
//!
//! A [`TextureResource`] starts out pending and settles exactly once, either
//! ready (holding the uploaded backend texture) or failed. The render loop reads
//! it every frame through [`TextureResource::bind`], which hands out the white
//! fallback until the texture is ready, so drawing never waits on I/O.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, OnceLock},
};

use anyhow::Context;
use image::imageops::FilterType;

use crate::resources::load_binary;

/// Colour of the 1x1 fallback texture bound for pending, failed or missing textures.
pub const FALLBACK_TEXEL: [u8; 4] = [255, 255, 255, 255];

/// Observable lifecycle state of a [`TextureResource`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureState {
    Pending,
    Ready,
    Failed,
}

/// Sampling policy of a ready texture, fixed by its dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterPolicy {
    /// Power-of-two image: full mip chain, trilinear filtering, repeat wrapping.
    Mipmapped,
    /// Any other size: single level, bilinear filtering, clamp-to-edge wrapping.
    Clamped,
}

impl FilterPolicy {
    pub fn for_dimensions(width: u32, height: u32) -> Self {
        if width.is_power_of_two() && height.is_power_of_two() {
            FilterPolicy::Mipmapped
        } else {
            FilterPolicy::Clamped
        }
    }

    pub fn mip_level_count(self, width: u32, height: u32) -> u32 {
        match self {
            FilterPolicy::Mipmapped => 32 - width.max(height).max(1).leading_zeros(),
            FilterPolicy::Clamped => 1,
        }
    }
}

/// What to sample for one draw.
#[derive(Debug)]
pub enum TextureBinding<'a, T> {
    Ready(&'a T),
    Fallback,
}

impl<'a, T> Clone for TextureBinding<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for TextureBinding<'a, T> {}

impl<'a, T> TextureBinding<'a, T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, TextureBinding::Fallback)
    }
}

/// A successfully uploaded texture together with the facts that fixed its sampler.
#[derive(Debug)]
pub struct ReadyTexture<T> {
    pub texture: T,
    pub width: u32,
    pub height: u32,
    pub policy: FilterPolicy,
}

#[derive(Debug)]
enum Outcome<T> {
    Ready(ReadyTexture<T>),
    Failed(String),
}

/// One texture whose backing image may still be loading.
///
/// The outcome lives in a single [`OnceLock`]: the loading task is the only
/// writer, it writes once, and readers on the render thread either see nothing
/// (pending) or the complete outcome.
#[derive(Debug)]
pub struct TextureResource<T> {
    name: String,
    outcome: OnceLock<Outcome<T>>,
}

impl<T> TextureResource<T> {
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> TextureState {
        match self.outcome.get() {
            None => TextureState::Pending,
            Some(Outcome::Ready(_)) => TextureState::Ready,
            Some(Outcome::Failed(_)) => TextureState::Failed,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == TextureState::Ready
    }

    pub fn ready(&self) -> Option<&ReadyTexture<T>> {
        match self.outcome.get() {
            Some(Outcome::Ready(ready)) => Some(ready),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self.outcome.get() {
            Some(Outcome::Failed(reason)) => Some(reason),
            _ => None,
        }
    }

    /// The ready texture, or the fallback while pending and after a failure.
    pub fn bind(&self) -> TextureBinding<'_, T> {
        match self.ready() {
            Some(ready) => TextureBinding::Ready(&ready.texture),
            None => TextureBinding::Fallback,
        }
    }

    /// Settle as ready. Returns `false` if the resource had already settled.
    pub fn complete(&self, texture: T, width: u32, height: u32) -> bool {
        let policy = FilterPolicy::for_dimensions(width, height);
        let settled = self
            .outcome
            .set(Outcome::Ready(ReadyTexture {
                texture,
                width,
                height,
                policy,
            }))
            .is_ok();
        if settled {
            log::debug!("Texture {} ready ({}x{}, {:?})", self.name, width, height, policy);
        } else {
            log::warn!("Texture {} was already settled, ignoring second completion", self.name);
        }
        settled
    }

    /// Settle as failed. The fallback stays bound for the rest of the process.
    pub fn fail(&self, reason: impl Into<String>) -> bool {
        let reason = reason.into();
        let settled = self.outcome.set(Outcome::Failed(reason.clone())).is_ok();
        if settled {
            log::warn!("Failed to load texture {}: {}", self.name, reason);
        } else {
            log::warn!("Texture {} was already settled, ignoring late failure: {}", self.name, reason);
        }
        settled
    }
}

/// A decoded RGBA8 image, flipped so that row zero is the bottom of the picture.
///
/// UV `(0, 0)` then addresses the bottom-left texel, matching how scene
/// descriptions author their texture coordinates.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    pub image: image::RgbaImage,
    pub policy: FilterPolicy,
}

impl DecodedImage {
    pub fn from_rgba(image: image::RgbaImage) -> Self {
        let flipped = image::imageops::flip_vertical(&image);
        let policy = FilterPolicy::for_dimensions(flipped.width(), flipped.height());
        Self {
            image: flipped,
            policy,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn mip_level_count(&self) -> u32 {
        self.policy.mip_level_count(self.width(), self.height())
    }

    /// Every mip level from full size down to 1x1, or just the base level for
    /// clamped textures.
    pub fn mip_chain(&self) -> Vec<image::RgbaImage> {
        let mut levels = vec![self.image.clone()];
        for _ in 1..self.mip_level_count() {
            let previous = &levels[levels.len() - 1];
            let width = (previous.width() / 2).max(1);
            let height = (previous.height() / 2).max(1);
            let next = image::imageops::resize(previous, width, height, FilterType::Triangle);
            levels.push(next);
        }
        levels
    }
}

/// Decode image file contents. The format is guessed from the bytes.
pub fn decode_image(bytes: &[u8]) -> anyhow::Result<DecodedImage> {
    let img = image::load_from_memory(bytes).context("Unsupported or corrupt image data")?;
    Ok(DecodedImage::from_rgba(img.to_rgba8()))
}

/// Turns decoded images into textures of some backend.
pub trait TextureUploader: Send + Sync + 'static {
    type Texture: Send + Sync + 'static;

    fn upload(&self, name: &str, image: &DecodedImage) -> anyhow::Result<Self::Texture>;
}

/// Decode `bytes`, upload the result and settle `resource` accordingly.
///
/// Any error along the way settles the resource as failed; nothing is retried.
pub fn settle<U: TextureUploader>(
    resource: &TextureResource<U::Texture>,
    uploader: &U,
    bytes: anyhow::Result<Vec<u8>>,
) -> TextureState {
    let uploaded = bytes.and_then(|bytes| {
        let decoded = decode_image(&bytes)?;
        let texture = uploader.upload(resource.name(), &decoded)?;
        Ok((texture, decoded.width(), decoded.height()))
    });
    match uploaded {
        Ok((texture, width, height)) => {
            resource.complete(texture, width, height);
        }
        Err(e) => {
            resource.fail(format!("{e:#}"));
        }
    }
    resource.state()
}

/// Requests textures without blocking the caller. Each file is loaded once;
/// repeated requests share the first resource.
pub struct TextureLoader<U: TextureUploader> {
    uploader: Arc<U>,
    requested: Mutex<HashMap<String, Arc<TextureResource<U::Texture>>>>,
    #[cfg(not(target_arch = "wasm32"))]
    runtime: tokio::runtime::Handle,
}

impl<U: TextureUploader> TextureLoader<U> {
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new(uploader: U, runtime: tokio::runtime::Handle) -> Self {
        Self {
            uploader: Arc::new(uploader),
            requested: Mutex::default(),
            runtime,
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn new(uploader: U) -> Self {
        Self {
            uploader: Arc::new(uploader),
            requested: Mutex::default(),
        }
    }

    /// Start loading `file_name` and return its resource right away, still pending.
    pub fn request(&self, file_name: &str) -> Arc<TextureResource<U::Texture>> {
        let mut requested = self.requested.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(resource) = requested.get(file_name) {
            return Arc::clone(resource);
        }
        let resource = Arc::new(TextureResource::pending(file_name));
        requested.insert(file_name.to_string(), Arc::clone(&resource));
        drop(requested);

        let task_resource = Arc::clone(&resource);
        let uploader = Arc::clone(&self.uploader);
        let file_name = file_name.to_string();
        let task = async move {
            let bytes = load_binary(&file_name).await;
            settle(&task_resource, uploader.as_ref(), bytes);
        };

        #[cfg(not(target_arch = "wasm32"))]
        self.runtime.spawn(task);

        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(task);

        resource
    }
}
