//! GPU textures and texture creation utilities.
//!
//! This module provides [`Texture`], a wrapper around WGPU texture resources,
//! helpers for the depth buffer and the 1x1 fallback texture, and
//! [`GpuTextureUploader`], which turns decoded images into bindable
//! [`GpuTexture`]s for the asynchronous texture loader.

use crate::resources::texture::{DecodedImage, FALLBACK_TEXEL, FilterPolicy, TextureUploader};

/// A GPU texture with a view and optional sampler.
#[derive(Clone, Debug)]
pub struct Texture {
    #[allow(unused)]
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: Option<wgpu::Sampler>,
}

impl Texture {
    /// Standard depth buffer texture format (32-bit float).
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
    pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    /// Create a depth texture for depth-testing during rendering.
    ///
    /// # Arguments
    ///
    /// * `size` is [width, height] of the texture in pixels
    /// * `label` is used as a debug label for the GPU resource
    pub fn create_depth_texture(device: &wgpu::Device, size: [u32; 2], label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: size[0].max(1),
            height: size[1].max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[Self::DEPTH_FORMAT],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            sampler: None,
        }
    }

    /// The 1x1 white texture bound whenever an object's own texture is missing,
    /// still loading or failed.
    pub fn create_fallback(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let size = wgpu::Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("fallback texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::COLOR_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            &FALLBACK_TEXEL,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4),
                rows_per_image: Some(1),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = Some(create_sampler(device, FilterPolicy::Clamped));
        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Upload a decoded image with every mip level its [`FilterPolicy`] asks for.
    pub fn from_decoded(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &DecodedImage,
        label: Option<&str>,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: image.width(),
            height: image.height(),
            depth_or_array_layers: 1,
        };
        let levels = image.mip_chain();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size,
            mip_level_count: levels.len() as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::COLOR_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (mip_level, level) in levels.iter().enumerate() {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    aspect: wgpu::TextureAspect::All,
                    texture: &texture,
                    mip_level: mip_level as u32,
                    origin: wgpu::Origin3d::ZERO,
                },
                level,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * level.width()),
                    rows_per_image: Some(level.height()),
                },
                wgpu::Extent3d {
                    width: level.width(),
                    height: level.height(),
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = Some(create_sampler(device, image.policy));
        Self {
            texture,
            view,
            sampler,
        }
    }

    pub fn bind_group(
        &self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &str,
    ) -> wgpu::BindGroup {
        let fallback_sampler;
        let sampler = match &self.sampler {
            Some(sampler) => sampler,
            None => {
                fallback_sampler = create_sampler(device, FilterPolicy::Clamped);
                &fallback_sampler
            }
        };
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&self.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
            label: Some(label),
        })
    }
}

/// Mipmapped textures repeat and filter trilinearly, everything else clamps and
/// filters bilinearly from the base level.
pub fn create_sampler(device: &wgpu::Device, policy: FilterPolicy) -> wgpu::Sampler {
    let (address_mode, mipmap_filter) = match policy {
        FilterPolicy::Mipmapped => (wgpu::AddressMode::Repeat, wgpu::FilterMode::Linear),
        FilterPolicy::Clamped => (wgpu::AddressMode::ClampToEdge, wgpu::FilterMode::Nearest),
    };
    device.create_sampler(&wgpu::SamplerDescriptor {
        address_mode_u: address_mode,
        address_mode_v: address_mode,
        address_mode_w: address_mode,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter,
        ..Default::default()
    })
}

/// A ready scene texture together with the bind group that samples it.
#[derive(Debug)]
pub struct GpuTexture {
    pub texture: Texture,
    pub bind_group: wgpu::BindGroup,
}

/// Uploads decoded images on the loader's task. Device and queue are cheap
/// handles, so the uploader owns clones of them.
#[derive(Debug, Clone)]
pub struct GpuTextureUploader {
    device: wgpu::Device,
    queue: wgpu::Queue,
    layout: wgpu::BindGroupLayout,
}

impl GpuTextureUploader {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, layout: wgpu::BindGroupLayout) -> Self {
        Self {
            device,
            queue,
            layout,
        }
    }
}

impl TextureUploader for GpuTextureUploader {
    type Texture = GpuTexture;

    fn upload(&self, name: &str, image: &DecodedImage) -> anyhow::Result<GpuTexture> {
        let limit = self.device.limits().max_texture_dimension_2d;
        if image.width() > limit || image.height() > limit {
            anyhow::bail!(
                "{}x{} exceeds the device texture limit of {}",
                image.width(),
                image.height(),
                limit
            );
        }
        let texture = Texture::from_decoded(&self.device, &self.queue, image, Some(name));
        let bind_group = texture.bind_group(&self.device, &self.layout, name);
        Ok(GpuTexture {
            texture,
            bind_group,
        })
    }
}
