//! Vertex and index buffers.

use bytemuck::{Pod, Zeroable};
use earthglow_scene::MeshData;

/// Vertex and index data on the GPU.
pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub index_format: wgpu::IndexFormat,
}

impl MeshBuffer {
    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), self.index_format);
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Index data that can be either u16 or u32 format.
pub enum IndexData<'a> {
    U16(&'a [u16]),
    U32(&'a [u32]),
}

impl IndexData<'_> {
    pub fn format(&self) -> wgpu::IndexFormat {
        match self {
            IndexData::U16(_) => wgpu::IndexFormat::Uint16,
            IndexData::U32(_) => wgpu::IndexFormat::Uint32,
        }
    }

    pub fn count(&self) -> u32 {
        match self {
            IndexData::U16(data) => data.len() as u32,
            IndexData::U32(data) => data.len() as u32,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            IndexData::U16(data) => bytemuck::cast_slice(data),
            IndexData::U32(data) => bytemuck::cast_slice(data),
        }
    }
}

/// Creates vertex, index and instance buffers on one device.
pub struct BufferAllocator<'a> {
    device: &'a wgpu::Device,
}

impl<'a> BufferAllocator<'a> {
    pub fn new(device: &'a wgpu::Device) -> Self {
        Self { device }
    }

    /// Upload a sphere mesh. Meshes under 65 536 vertices use 16-bit indices.
    pub fn create_sphere_mesh(&self, label: &str, mesh: &MeshData) -> MeshBuffer {
        let vertices = interleave(mesh);
        let vertex_bytes: &[u8] = bytemuck::cast_slice(&vertices);
        if mesh.vertex_count() <= u16::MAX as usize + 1 {
            let narrow: Vec<u16> = mesh.indices.iter().map(|&i| i as u16).collect();
            self.create_mesh(label, vertex_bytes, IndexData::U16(&narrow))
        } else {
            self.create_mesh(label, vertex_bytes, IndexData::U32(&mesh.indices))
        }
    }

    pub fn create_mesh(&self, label: &str, vertices: &[u8], indices: IndexData) -> MeshBuffer {
        MeshBuffer {
            vertex_buffer: self.create_buffer(
                &format!("{label}-vertices"),
                vertices,
                wgpu::BufferUsages::VERTEX,
            ),
            index_buffer: self.create_buffer(
                &format!("{label}-indices"),
                indices.as_bytes(),
                wgpu::BufferUsages::INDEX,
            ),
            index_count: indices.count(),
            index_format: indices.format(),
        }
    }

    /// Per-instance vertex data such as star positions.
    pub fn create_instance_buffer(&self, label: &str, data: &[u8]) -> wgpu::Buffer {
        self.create_buffer(label, data, wgpu::BufferUsages::VERTEX)
    }

    /// Uniform buffer initialised with `data` and writable every frame.
    pub fn create_uniform_buffer(&self, label: &str, data: &[u8]) -> wgpu::Buffer {
        self.create_buffer(
            label,
            data,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        )
    }

    fn create_buffer(&self, label: &str, data: &[u8], usage: wgpu::BufferUsages) -> wgpu::Buffer {
        use wgpu::util::DeviceExt;

        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: data,
                usage: usage | wgpu::BufferUsages::COPY_DST,
            })
    }
}

/// Position, normal and UV; 32 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct VertexPositionNormalUv {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl VertexPositionNormalUv {
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        use wgpu::{VertexAttribute, VertexFormat};

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<VertexPositionNormalUv>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: VertexFormat::Float32x3,
                },
                VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: VertexFormat::Float32x3,
                },
                VertexAttribute {
                    offset: (std::mem::size_of::<[f32; 3]>() * 2) as wgpu::BufferAddress,
                    shader_location: 2,
                    format: VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Interleave a mesh's attribute arrays into GPU vertices.
pub fn interleave(mesh: &MeshData) -> Vec<VertexPositionNormalUv> {
    mesh.positions
        .iter()
        .zip(&mesh.normals)
        .zip(&mesh.uvs)
        .map(|((p, n), uv)| VertexPositionNormalUv {
            position: p.to_array(),
            normal: n.to_array(),
            uv: *uv,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use earthglow_scene::SphereGeometry;

    #[test]
    fn test_vertex_stride() {
        assert_eq!(std::mem::size_of::<VertexPositionNormalUv>(), 32);
        assert_eq!(VertexPositionNormalUv::layout().array_stride, 32);
    }

    #[test]
    fn test_vertex_attribute_locations() {
        let layout = VertexPositionNormalUv::layout();
        let locations: Vec<u32> = layout.attributes.iter().map(|a| a.shader_location).collect();
        assert_eq!(locations, vec![0, 1, 2]);
        assert_eq!(layout.attributes[2].offset, 24);
    }

    #[test]
    fn test_interleave_preserves_order() {
        let mesh = SphereGeometry::new(0.9, 8, 6).build();
        let vertices = interleave(&mesh);
        assert_eq!(vertices.len(), mesh.vertex_count());
        assert_eq!(vertices[5].position, mesh.positions[5].to_array());
        assert_eq!(vertices[5].normal, mesh.normals[5].to_array());
        assert_eq!(vertices[5].uv, mesh.uvs[5]);
    }

    #[test]
    fn test_index_data_format() {
        let narrow = [0u16, 1, 2];
        let wide = [0u32, 1, 2, 3];
        assert_eq!(IndexData::U16(&narrow).format(), wgpu::IndexFormat::Uint16);
        assert_eq!(IndexData::U32(&wide).count(), 4);
        assert_eq!(IndexData::U32(&wide).as_bytes().len(), 16);
    }

    #[test]
    fn test_sphere_mesh_uses_u16_indices() {
        let Some((device, _queue)) = crate::test_support::create_test_device_queue() else {
            return;
        };
        let mesh = SphereGeometry::new(0.9, 64, 64).build();
        let buffer = BufferAllocator::new(&device).create_sphere_mesh("sphere", &mesh);
        assert_eq!(buffer.index_format, wgpu::IndexFormat::Uint16);
        assert_eq!(buffer.index_count as usize, mesh.indices.len());
    }
}
