//! Central GPU and window context.
//!
//! [`Context`] owns the window surface and a [`SceneRenderer`], which holds
//! the device, both scene pipelines and the uniform buffers. Each frame the
//! renderer lets a [`FrameCompositor`] record the scene into a
//! [`FrameRecorder`], uploads every recorded uniform at once and then replays
//! the recording into a single render pass.

use std::{iter, num::NonZeroU64, sync::Arc};

use anyhow::Context as _;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::{
    data_structures::{
        model::Mesh,
        texture::{GpuTexture, GpuTextureUploader, Texture},
    },
    pipelines::{
        FrameUniform, ObjectUniform, basic::mk_basic_pipeline, frame_bind_group_layout,
        mk_scene_pipeline_layout, object_bind_group_layout, texture_bind_group_layout,
        transparent::mk_transparent_pipeline,
    },
    render::{DrawOp, FrameCompositor, FrameRecorder},
    resources::texture::TextureBinding,
    scene::SceneState,
};

/// The scene as the GPU backend stores it.
pub type GpuScene = SceneState<Mesh, GpuTexture>;

#[derive(Debug)]
pub struct Pipelines {
    /// Opaque pass, depth writes on.
    pub basic: wgpu::RenderPipeline,
    /// Transparent pass, alpha blended, depth writes off.
    pub transparent: wgpu::RenderPipeline,
}

/// Per-object uniforms for a whole frame, addressed by dynamic offset.
#[derive(Debug)]
struct ObjectBuffer {
    layout: wgpu::BindGroupLayout,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    stride: wgpu::BufferAddress,
    capacity: usize,
}

impl ObjectBuffer {
    fn new(device: &wgpu::Device, capacity: usize) -> Self {
        let layout = object_bind_group_layout(device);
        let stride = ObjectUniform::stride(device);
        let (buffer, bind_group) = Self::allocate(device, &layout, stride, capacity);
        Self {
            layout,
            buffer,
            bind_group,
            stride,
            capacity,
        }
    }

    fn allocate(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: wgpu::BufferAddress,
        capacity: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Object Uniform Buffer"),
            size: stride * capacity.max(1) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(std::mem::size_of::<ObjectUniform>() as u64),
                }),
            }],
            label: Some("object_bind_group"),
        });
        (buffer, bind_group)
    }

    /// Write `uniforms` one stride apart, growing the buffer when needed.
    fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, uniforms: &[ObjectUniform]) {
        if uniforms.len() > self.capacity {
            self.capacity = uniforms.len().next_power_of_two();
            log::debug!("Growing object uniform buffer to {} objects", self.capacity);
            let (buffer, bind_group) = Self::allocate(device, &self.layout, self.stride, self.capacity);
            self.buffer = buffer;
            self.bind_group = bind_group;
        }
        if uniforms.is_empty() {
            return;
        }
        let stride = self.stride as usize;
        let mut bytes = vec![0u8; stride * uniforms.len()];
        for (chunk, uniform) in bytes.chunks_mut(stride).zip(uniforms) {
            let raw = bytemuck::bytes_of(uniform);
            chunk[..raw.len()].copy_from_slice(raw);
        }
        queue.write_buffer(&self.buffer, 0, &bytes);
    }

    fn offset(&self, index: u32) -> wgpu::DynamicOffset {
        index * self.stride as wgpu::DynamicOffset
    }
}

/// Everything needed to draw a scene into a colour and depth target: both
/// pipelines, the uniform buffers and the fallback texture. Independent of any
/// window, so it also renders offscreen.
#[derive(Debug)]
pub struct SceneRenderer {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub pipelines: Pipelines,
    pub clear_colour: wgpu::Color,
    texture_layout: wgpu::BindGroupLayout,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    objects: ObjectBuffer,
    fallback: GpuTexture,
}

impl SceneRenderer {
    /// Build the pipelines for colour targets of `format`.
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, format: wgpu::TextureFormat) -> Self {
        let frame_layout = frame_bind_group_layout(&device);
        let texture_layout = texture_bind_group_layout(&device);
        let objects = ObjectBuffer::new(&device, 16);

        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Buffer"),
            contents: bytemuck::cast_slice(&[<FrameUniform as bytemuck::Zeroable>::zeroed()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
            label: Some("frame_bind_group"),
        });

        let layout = mk_scene_pipeline_layout(&device, &frame_layout, &objects.layout, &texture_layout);
        let pipelines = Pipelines {
            basic: mk_basic_pipeline(&device, format, &layout),
            transparent: mk_transparent_pipeline(&device, format, &layout),
        };

        let fallback_texture = Texture::create_fallback(&device, &queue);
        let fallback = GpuTexture {
            bind_group: fallback_texture.bind_group(&device, &texture_layout, "fallback_bind_group"),
            texture: fallback_texture,
        };

        Self {
            device,
            queue,
            pipelines,
            clear_colour: wgpu::Color::BLACK,
            texture_layout,
            frame_buffer,
            frame_bind_group,
            objects,
            fallback,
        }
    }

    /// An uploader for the texture loader, sharing this renderer's device.
    pub fn texture_uploader(&self) -> GpuTextureUploader {
        GpuTextureUploader::new(
            self.device.clone(),
            self.queue.clone(),
            self.texture_layout.clone(),
        )
    }

    /// Compose `scene`, upload its uniforms and record one render pass into
    /// `encoder` that clears and fills `view` and `depth_view`.
    pub fn encode(
        &mut self,
        scene: &GpuScene,
        compositor: &FrameCompositor,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
    ) {
        let mut recorder = FrameRecorder::new();
        compositor.render_frame(scene, &mut recorder);

        let mut object_uniforms = Vec::with_capacity(recorder.object_count());
        for op in &recorder.ops {
            match op {
                DrawOp::BeginFrame(frame) => self.queue.write_buffer(
                    &self.frame_buffer,
                    0,
                    bytemuck::cast_slice(&[FrameUniform::from(frame)]),
                ),
                DrawOp::Object(object) => object_uniforms.push(ObjectUniform::from(object)),
                _ => {}
            }
        }
        self.objects.upload(&self.device, &self.queue, &object_uniforms);

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_colour),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
        render_pass.set_pipeline(&self.pipelines.basic);
        let mut object_index = 0;
        for op in &recorder.ops {
            match op {
                DrawOp::BeginFrame(_) => {}
                DrawOp::DepthWrite(true) => render_pass.set_pipeline(&self.pipelines.basic),
                DrawOp::DepthWrite(false) => render_pass.set_pipeline(&self.pipelines.transparent),
                DrawOp::Object(_) => {
                    render_pass.set_bind_group(
                        1,
                        &self.objects.bind_group,
                        &[self.objects.offset(object_index)],
                    );
                    object_index += 1;
                }
                DrawOp::Texture(binding) => {
                    let texture = match *binding {
                        TextureBinding::Ready(texture) => texture,
                        TextureBinding::Fallback => &self.fallback,
                    };
                    render_pass.set_bind_group(2, &texture.bind_group, &[]);
                }
                DrawOp::Draw {
                    geometry,
                    triangles,
                } => {
                    let count = (triangles * 3).min(geometry.num_elements);
                    if count == 0 {
                        continue;
                    }
                    render_pass.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
                    render_pass.set_index_buffer(
                        geometry.index_buffer.slice(..),
                        wgpu::IndexFormat::Uint32,
                    );
                    render_pass.draw_indexed(0..count, 0, 0..1);
                }
            }
        }
    }
}

#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: Texture,
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,
    pub renderer: SceneRenderer,
}

impl Context {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("Cannot create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No suitable graphics adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                ..Default::default()
            })
            .await
            .context("Cannot open the graphics device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shader writes linear colour, so prefer an sRGB surface.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("The surface supports no texture format")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            Texture::create_depth_texture(&device, [config.width, config.height], "depth_texture");
        let renderer = SceneRenderer::new(device, queue, config.format);

        Ok(Self {
            window,
            depth_texture,
            surface,
            config,
            renderer,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.renderer.device
    }

    /// Width over height of the surface.
    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height as f32
    }

    pub fn texture_uploader(&self) -> GpuTextureUploader {
        self.renderer.texture_uploader()
    }

    /// Reconfigure the surface and depth buffer. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.renderer.device, &self.config);
        self.depth_texture =
            Texture::create_depth_texture(&self.renderer.device, [width, height], "depth_texture");
        true
    }

    pub fn render(
        &mut self,
        scene: &GpuScene,
        compositor: &FrameCompositor,
    ) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .renderer
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        self.renderer.encode(scene, compositor, &mut encoder, &view, &self.depth_texture.view);

        self.renderer.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
