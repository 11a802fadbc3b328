#![allow(dead_code)]

use std::sync::Arc;

use tri_ngin::{
    data_structures::{material::Material, object::RenderableObject, transform::ObjectTransform},
    render::{DrawOp, FrameRecorder},
    resources::texture::{DecodedImage, TextureResource, TextureUploader},
    scene::SceneState,
};

/// Geometry is identified by name and textures by a number, so recordings can
/// be inspected without a GPU.
pub(crate) type TestObject = RenderableObject<&'static str, u32>;
pub(crate) type TestScene = SceneState<&'static str, u32>;

pub(crate) fn object(name: &'static str, center: [f32; 3], alpha: f32) -> TestObject {
    RenderableObject::new(
        name,
        name,
        1,
        Material {
            alpha,
            ..Material::default()
        },
        ObjectTransform::new(center.into()),
        None,
        false,
    )
}

pub(crate) fn textured(
    name: &'static str,
    center: [f32; 3],
    texture: Arc<TextureResource<u32>>,
    transparent_hint: bool,
) -> TestObject {
    RenderableObject::new(
        name,
        name,
        1,
        Material::default(),
        ObjectTransform::new(center.into()),
        Some(texture),
        transparent_hint,
    )
}

pub(crate) fn scene(objects: Vec<TestObject>) -> TestScene {
    SceneState::new(objects, 0.01)
}

/// Every draw in order, paired with whether depth writes were on at that point.
pub(crate) fn draws(recorder: &FrameRecorder<'_, &'static str, u32>) -> Vec<(&'static str, bool)> {
    let mut depth_write = None;
    let mut out = Vec::new();
    for op in &recorder.ops {
        match op {
            DrawOp::DepthWrite(enabled) => depth_write = Some(*enabled),
            DrawOp::Draw { geometry, .. } => {
                let enabled = depth_write.expect("draw issued before any depth write state");
                out.push((**geometry, enabled));
            }
            _ => {}
        }
    }
    out
}

/// The depth write state the frame leaves behind.
pub(crate) fn final_depth_write(recorder: &FrameRecorder<'_, &'static str, u32>) -> Option<bool> {
    recorder.ops.iter().rev().find_map(|op| match op {
        DrawOp::DepthWrite(enabled) => Some(*enabled),
        _ => None,
    })
}

/// Hands out increasing ids and remembers what it was asked to upload.
#[derive(Default)]
pub(crate) struct CountingUploader {
    pub uploads: std::sync::Mutex<Vec<(String, u32, u32)>>,
}

impl TextureUploader for CountingUploader {
    type Texture = u32;

    fn upload(&self, name: &str, image: &DecodedImage) -> anyhow::Result<u32> {
        let mut uploads = self.uploads.lock().expect("uploader lock poisoned");
        uploads.push((name.to_string(), image.width(), image.height()));
        Ok(uploads.len() as u32)
    }
}

/// Always refuses, like a device that ran out of memory.
pub(crate) struct FailingUploader;

impl TextureUploader for FailingUploader {
    type Texture = u32;

    fn upload(&self, _name: &str, _image: &DecodedImage) -> anyhow::Result<u32> {
        anyhow::bail!("out of texture memory")
    }
}

/// PNG-encode an RGBA image, for feeding the decoder.
pub(crate) fn png_bytes(image: &image::RgbaImage) -> Vec<u8> {
    let mut bytes = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, image::ImageFormat::Png)
        .expect("PNG encoding failed");
    bytes.into_inner()
}

/// A device without any window, or `None` on machines without an adapter.
#[cfg(feature = "integration-tests")]
pub(crate) async fn headless_device() -> Option<(wgpu::Device, wgpu::Queue)> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        ..Default::default()
    });
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions::default())
        .await
        .ok()?;
    adapter
        .request_device(&wgpu::DeviceDescriptor::default())
        .await
        .ok()
}
