//! Render pipelines, their shared bind group layouts and uniform layouts.
//!
//! Both scene pipelines run `scene.wgsl` and only differ in depth writes and
//! blending:
//!
//! - `basic` draws the opaque pass with depth writes on
//! - `transparent` draws the blended pass with depth writes off
//! - `light` holds the light model and the CPU reference of the shading maths
//!
//! Bind groups are laid out as `0` frame uniforms, `1` object uniforms (one
//! dynamic offset per draw) and `2` texture and sampler.

use std::num::NonZeroU64;

use crate::render::{FrameUniforms, ObjectUniforms};

pub mod basic;
pub mod light;
pub mod transparent;

/// GPU layout of [`FrameUniforms`]. Vectors are padded to `vec4`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniform {
    pub eye: [f32; 4],
    pub light_position: [f32; 4],
    pub light_ambient: [f32; 4],
    pub light_diffuse: [f32; 4],
    pub light_specular: [f32; 4],
    pub blend_mode: u32,
    pub _padding: [u32; 3],
}

fn padded(v: [f32; 3], w: f32) -> [f32; 4] {
    [v[0], v[1], v[2], w]
}

impl From<&FrameUniforms> for FrameUniform {
    fn from(frame: &FrameUniforms) -> Self {
        Self {
            eye: padded(frame.eye.into(), 1.0),
            light_position: padded(frame.light.position, 1.0),
            light_ambient: padded(frame.light.ambient, 0.0),
            light_diffuse: padded(frame.light.diffuse, 0.0),
            light_specular: padded(frame.light.specular, 0.0),
            blend_mode: frame.blend_mode.as_uniform(),
            _padding: [0; 3],
        }
    }
}

/// GPU layout of [`ObjectUniforms`]. Alpha rides in `ambient.w` and the
/// shininess exponent in `specular.w`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub pvm: [[f32; 4]; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
}

impl From<&ObjectUniforms> for ObjectUniform {
    fn from(object: &ObjectUniforms) -> Self {
        let material = &object.material;
        Self {
            model: object.model.into(),
            pvm: object.pvm.into(),
            ambient: padded(material.ambient.into(), material.alpha),
            diffuse: padded(material.diffuse.into(), 0.0),
            specular: padded(material.specular.into(), material.shininess),
        }
    }
}

impl ObjectUniform {
    /// Distance between two consecutive objects in the dynamic uniform buffer.
    pub fn stride(device: &wgpu::Device) -> wgpu::BufferAddress {
        let align = device.limits().min_uniform_buffer_offset_alignment as wgpu::BufferAddress;
        let size = std::mem::size_of::<ObjectUniform>() as wgpu::BufferAddress;
        size.div_ceil(align) * align
    }
}

pub fn frame_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("frame_bind_group_layout"),
    })
}

pub fn object_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: NonZeroU64::new(std::mem::size_of::<ObjectUniform>() as u64),
            },
            count: None,
        }],
        label: Some("object_bind_group_layout"),
    })
}

pub fn texture_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("texture_bind_group_layout"),
    })
}

/// Layout shared by the opaque and the transparent pipeline.
pub fn mk_scene_pipeline_layout(
    device: &wgpu::Device,
    frame_layout: &wgpu::BindGroupLayout,
    object_layout: &wgpu::BindGroupLayout,
    texture_layout: &wgpu::BindGroupLayout,
) -> wgpu::PipelineLayout {
    device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Scene Pipeline Layout"),
        bind_group_layouts: &[frame_layout, object_layout, texture_layout],
        push_constant_ranges: &[],
    })
}

pub(crate) fn scene_shader() -> wgpu::ShaderModuleDescriptor<'static> {
    wgpu::ShaderModuleDescriptor {
        label: Some("Scene Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("scene.wgsl").into()),
    }
}
