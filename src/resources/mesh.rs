use wgpu::util::DeviceExt;

use crate::{data_structures::model::Mesh, resources::TriangleSet};

/// Upload the vertex and index buffers of one triangle set.
pub fn upload_mesh(device: &wgpu::Device, name: &str, set: &TriangleSet) -> Mesh {
    let vertices = set.model_vertices();
    let indices = set.indices();

    if let Some(bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
        log::warn!(
            "{} references vertex {} but only has {} vertices",
            name,
            bad,
            vertices.len()
        );
    }

    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{:?} Vertex Buffer", name)),
        contents: bytemuck::cast_slice(&vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });

    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{:?} Index Buffer", name)),
        contents: bytemuck::cast_slice(&indices),
        usage: wgpu::BufferUsages::INDEX,
    });

    Mesh {
        name: name.to_string(),
        vertex_buffer,
        index_buffer,
        num_elements: indices.len() as u32,
    }
}
