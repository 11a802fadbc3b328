use crate::{
    data_structures::model::{ModelVertex, Vertex},
    pipelines::{basic::mk_render_pipeline, scene_shader},
};

/// Pipeline of the transparent pass.
///
/// Fragments are alpha blended over what is already in the colour target and
/// still depth tested against the opaque pass, but leave the depth buffer
/// untouched so that transparent objects behind each other all show.
pub fn mk_transparent_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    layout: &wgpu::PipelineLayout,
) -> wgpu::RenderPipeline {
    mk_render_pipeline(
        device,
        layout,
        "Transparent Pipeline",
        format,
        Some(wgpu::BlendState::ALPHA_BLENDING),
        false,
        &[ModelVertex::desc()],
        scene_shader(),
    )
}
