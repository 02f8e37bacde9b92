//! Renderable mesh assembly.
//!
//! [`build_vertices`] turns one imported sub-mesh's raw arrays into the
//! vertex/index lists, and [`RenderMesh`] pairs those with the resolved
//! textures and the GPU buffers.

use std::rc::Rc;
use std::sync::Arc;

use glam::{Vec2, Vec3};

use crate::abs::{GpuMesh, ShaderProgram};
use crate::import::{ImportedMesh, TextureRole};
use crate::model::texture::TextureRecord;
use crate::model::vertex::ModelVertex;

/// Builds the vertex and index lists for one raw sub-mesh.
///
/// Position and normal are always copied. UVs, tangent and bitangent are
/// copied only when the mesh reports a texture-coordinate channel; without
/// one the UV is (0,0) and tangent/bitangent stay zero even if the importer
/// produced tangent data. Bone slots stay zero on this path. Face corner
/// indices are appended in the importer's order.
pub(crate) fn build_vertices(raw: &ImportedMesh) -> (Vec<ModelVertex>, Vec<u32>) {
    let mut vertices = Vec::with_capacity(raw.positions.len());
    for i in 0..raw.positions.len() {
        let (tex_coords, tangent, bitangent) = match &raw.tex_coords {
            Some(uvs) => (
                uvs.get(i).copied().unwrap_or(Vec2::ZERO),
                raw.tangents.get(i).copied().unwrap_or(Vec3::ZERO),
                raw.bitangents.get(i).copied().unwrap_or(Vec3::ZERO),
            ),
            None => (Vec2::ZERO, Vec3::ZERO, Vec3::ZERO),
        };
        vertices.push(ModelVertex {
            position: raw.positions[i],
            normal: raw.normals.get(i).copied().unwrap_or(Vec3::ZERO),
            tex_coords,
            tangent,
            bitangent,
            ..Default::default()
        });
    }

    let mut indices = Vec::with_capacity(raw.faces.len() * 3);
    for face in &raw.faces {
        indices.extend_from_slice(face);
    }

    (vertices, indices)
}

/// One flattened sub-mesh: its vertex data, its resolved textures, and the
/// GPU buffers built from them. Created once, drawn many times; the GL
/// objects are freed when the owning model drops.
pub struct RenderMesh {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    pub textures: Vec<Rc<TextureRecord>>,
    gpu: GpuMesh,
}

impl RenderMesh {
    /// Uploads the assembled arrays and takes ownership of everything.
    pub fn new(
        gl: &Arc<glow::Context>,
        vertices: Vec<ModelVertex>,
        indices: Vec<u32>,
        textures: Vec<Rc<TextureRecord>>,
    ) -> Self {
        let gpu = GpuMesh::new(gl, &vertices, &indices);
        Self {
            vertices,
            indices,
            textures,
            gpu,
        }
    }

    /// Binds this mesh's textures and submits the indexed draw through the
    /// given shader program.
    ///
    /// Samplers are named by role with a per-role counter starting at 1
    /// (`texture_diffuse1`, `texture_specular1`, ...). Records whose decode
    /// failed are skipped; a mesh with zero indices submits nothing.
    pub fn draw(&self, shader: &ShaderProgram) {
        let mut role_counts = [0u32; 4];
        for (unit, record) in self.textures.iter().enumerate() {
            let Some(texture) = &record.texture else {
                continue;
            };
            let slot = match record.role {
                TextureRole::Diffuse => 0,
                TextureRole::Specular => 1,
                TextureRole::Normal => 2,
                TextureRole::Height => 3,
            };
            role_counts[slot] += 1;
            let name = format!("{}{}", record.role.uniform_prefix(), role_counts[slot]);
            shader.set_uniform(&name, unit as i32);
            texture.bind(unit as u32);
        }
        self.gpu.draw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_positions() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_zero_faces_build_empty_index_list() {
        let raw = ImportedMesh {
            positions: quad_positions(),
            normals: vec![Vec3::Z; 4],
            ..Default::default()
        };
        let (vertices, indices) = build_vertices(&raw);
        assert_eq!(vertices.len(), 4);
        assert!(indices.is_empty());
    }

    #[test]
    fn test_missing_uv_channel_zeroes_uv_and_tangents() {
        // Tangent data is present but must not be copied without UVs.
        let raw = ImportedMesh {
            positions: quad_positions(),
            normals: vec![Vec3::Z; 4],
            tangents: vec![Vec3::X; 4],
            bitangents: vec![Vec3::Y; 4],
            faces: vec![[0, 1, 2], [0, 2, 3]],
            ..Default::default()
        };
        let (vertices, _) = build_vertices(&raw);
        for vertex in &vertices {
            assert_eq!(vertex.tex_coords, Vec2::ZERO);
            assert_eq!(vertex.tangent, Vec3::ZERO);
            assert_eq!(vertex.bitangent, Vec3::ZERO);
        }
    }

    #[test]
    fn test_uv_channel_copies_uv_and_tangents() {
        let raw = ImportedMesh {
            positions: quad_positions(),
            normals: vec![Vec3::Z; 4],
            tex_coords: Some(vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0),
            ]),
            tangents: vec![Vec3::X; 4],
            bitangents: vec![Vec3::Y; 4],
            faces: vec![[0, 1, 2], [0, 2, 3]],
            ..Default::default()
        };
        let (vertices, indices) = build_vertices(&raw);
        assert_eq!(vertices[2].tex_coords, Vec2::new(1.0, 1.0));
        assert_eq!(vertices[2].tangent, Vec3::X);
        assert_eq!(vertices[2].bitangent, Vec3::Y);
        assert_eq!(indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn test_bone_slots_stay_zero() {
        let raw = ImportedMesh {
            positions: quad_positions(),
            normals: vec![Vec3::Z; 4],
            faces: vec![[0, 1, 2]],
            ..Default::default()
        };
        let (vertices, _) = build_vertices(&raw);
        for vertex in &vertices {
            assert_eq!(vertex.bone_ids, [0; 4]);
            assert_eq!(vertex.bone_weights, [0.0; 4]);
        }
    }
}
