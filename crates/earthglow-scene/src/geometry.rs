//! Latitude/longitude sphere tessellation.

use glam::Vec3;

/// CPU-side triangle mesh ready for upload.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    /// Unit normals, one per vertex.
    pub normals: Vec<Vec3>,
    /// Texture coordinates with `u` along longitude and `v` from the north pole.
    pub uvs: Vec<[f32; 2]>,
    /// Counter-clockwise triangles.
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// UV sphere description: radius plus longitude/latitude segment counts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereGeometry {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl SphereGeometry {
    /// Segment counts are clamped to the smallest closed sphere (3 × 2).
    pub fn new(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        Self {
            radius,
            width_segments: width_segments.max(3),
            height_segments: height_segments.max(2),
        }
    }

    /// Build the mesh.
    ///
    /// Produces `(w + 1) * (h + 1)` vertices; the seam column is duplicated so
    /// `u` can run the full `0..=1` range. Rows touching a pole emit only one
    /// triangle per quad since the other would be degenerate.
    pub fn build(&self) -> MeshData {
        let w = self.width_segments;
        let h = self.height_segments;
        let vertex_count = ((w + 1) * (h + 1)) as usize;

        let mut mesh = MeshData {
            positions: Vec::with_capacity(vertex_count),
            normals: Vec::with_capacity(vertex_count),
            uvs: Vec::with_capacity(vertex_count),
            indices: Vec::with_capacity((6 * w * (h - 1)) as usize),
        };

        for iy in 0..=h {
            let v = iy as f32 / h as f32;
            let theta = v * std::f32::consts::PI;
            for ix in 0..=w {
                let u = ix as f32 / w as f32;
                let phi = u * std::f32::consts::TAU;

                let normal = Vec3::new(
                    -phi.cos() * theta.sin(),
                    theta.cos(),
                    phi.sin() * theta.sin(),
                );
                mesh.positions.push(normal * self.radius);
                mesh.normals.push(normal);
                mesh.uvs.push([u, v]);
            }
        }

        let row = w + 1;
        for iy in 0..h {
            for ix in 0..w {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;

                if iy != 0 {
                    mesh.indices.extend_from_slice(&[a, b, d]);
                }
                if iy != h - 1 {
                    mesh.indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        mesh
    }
}
