//! Scene import via Assimp.
//!
//! This module is the only place that touches `russimp`. A parsed scene is
//! copied into an owned snapshot ([`ImportedScene`]) before the importer's
//! buffers are dropped, so the rest of the crate never borrows importer
//! memory. The snapshot keeps the importer's reporting order everywhere:
//! mesh indices per node, children per node, texture slots per material.

use glam::{Vec2, Vec3};
use russimp::material::{Material, PropertyTypeInfo, TextureType};
use russimp::node::Node;
use russimp::scene::{PostProcess, Scene};

use crate::error::Error;

/// aiScene incomplete-flag bit; set when the importer bailed out mid-file.
const SCENE_FLAGS_INCOMPLETE: u32 = 0x1;

/// Assimp material property key under which texture file paths are stored.
const TEXTURE_FILE_KEY: &str = "$tex.file";

/// The semantic slot a texture fills in shading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureRole {
    Diffuse,
    Specular,
    Normal,
    Height,
}

impl TextureRole {
    /// Every role handled by the resolver, in the fixed resolution order.
    pub const ALL: [TextureRole; 4] = [
        TextureRole::Diffuse,
        TextureRole::Specular,
        TextureRole::Normal,
        TextureRole::Height,
    ];

    /// The sampler-uniform name family for this role. Samplers are numbered
    /// per role starting at 1, e.g. `texture_diffuse1`.
    pub fn uniform_prefix(&self) -> &'static str {
        match self {
            TextureRole::Diffuse => "texture_diffuse",
            TextureRole::Specular => "texture_specular",
            TextureRole::Normal => "texture_normal",
            TextureRole::Height => "texture_height",
        }
    }

    fn texture_type(&self) -> TextureType {
        match self {
            TextureRole::Diffuse => TextureType::Diffuse,
            TextureRole::Specular => TextureType::Specular,
            TextureRole::Normal => TextureType::Normals,
            TextureRole::Height => TextureType::Height,
        }
    }
}

/// Owned snapshot of one imported file.
#[derive(Debug, Clone, Default)]
pub struct ImportedScene {
    pub meshes: Vec<ImportedMesh>,
    pub materials: Vec<ImportedMaterial>,
    pub root: ImportedNode,
}

/// One node of the imported hierarchy. Nodes only reference meshes by index;
/// the mesh data itself lives in the scene's flat table. Local transforms
/// are not carried over: every sub-mesh is treated as already being in a
/// shared coordinate space.
#[derive(Debug, Clone, Default)]
pub struct ImportedNode {
    pub name: String,
    pub mesh_indices: Vec<u32>,
    pub children: Vec<ImportedNode>,
}

/// Raw vertex/face arrays of one sub-mesh.
#[derive(Debug, Clone, Default)]
pub struct ImportedMesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    /// First UV channel, if the mesh reports one.
    pub tex_coords: Option<Vec<Vec2>>,
    pub tangents: Vec<Vec3>,
    pub bitangents: Vec<Vec3>,
    /// Triangulated faces; corner order is the importer's.
    pub faces: Vec<[u32; 3]>,
    pub material_index: u32,
}

/// Texture slots of one imported material, as `(role, relative path)` in
/// the importer's slot order.
#[derive(Debug, Clone, Default)]
pub struct ImportedMaterial {
    pub slots: Vec<(TextureRole, String)>,
}

impl ImportedMaterial {
    /// The stored paths for one role, in slot order.
    pub fn paths(&self, role: TextureRole) -> impl Iterator<Item = &str> {
        self.slots
            .iter()
            .filter(move |(r, _)| *r == role)
            .map(|(_, path)| path.as_str())
    }
}

/// Parses the file at `path` with the fixed post-process set (triangulate,
/// generate smooth normals, flip UVs, calculate tangent space) and snapshots
/// the result.
pub fn load_scene(path: &str) -> Result<ImportedScene, Error> {
    let scene = Scene::from_file(
        path,
        vec![
            PostProcess::Triangulate,
            PostProcess::GenerateSmoothNormals,
            PostProcess::FlipUVs,
            PostProcess::CalculateTangentSpace,
        ],
    )
    .map_err(|e| Error::Import(e.to_string()))?;

    if scene.flags & SCENE_FLAGS_INCOMPLETE != 0 {
        return Err(Error::Import(format!(
            "importer returned an incomplete scene for '{path}'"
        )));
    }
    let root = scene
        .root
        .as_ref()
        .ok_or_else(|| Error::Import(format!("scene '{path}' has no root node")))?;

    Ok(ImportedScene {
        meshes: scene.meshes.iter().map(convert_mesh).collect(),
        materials: scene.materials.iter().map(convert_material).collect(),
        root: convert_node(root),
    })
}

fn convert_node(node: &Node) -> ImportedNode {
    ImportedNode {
        name: node.name.clone(),
        mesh_indices: node.meshes.clone(),
        children: node
            .children
            .borrow()
            .iter()
            .map(|child| convert_node(child))
            .collect(),
    }
}

fn convert_mesh(mesh: &russimp::mesh::Mesh) -> ImportedMesh {
    let to_vec3 = |v: &russimp::Vector3D| Vec3::new(v.x, v.y, v.z);

    let tex_coords = mesh
        .texture_coords
        .first()
        .and_then(|channel| channel.as_ref())
        .map(|uvs| uvs.iter().map(|uv| Vec2::new(uv.x, uv.y)).collect());

    let mut faces = Vec::with_capacity(mesh.faces.len());
    for face in &mesh.faces {
        // Point and line primitives can survive triangulation.
        if let [a, b, c] = face.0[..] {
            faces.push([a, b, c]);
        } else {
            log::warn!(
                "skipping non-triangle face ({} indices) in mesh '{}'",
                face.0.len(),
                mesh.name
            );
        }
    }

    ImportedMesh {
        name: mesh.name.clone(),
        positions: mesh.vertices.iter().map(to_vec3).collect(),
        normals: mesh.normals.iter().map(to_vec3).collect(),
        tex_coords,
        tangents: mesh.tangents.iter().map(to_vec3).collect(),
        bitangents: mesh.bitangents.iter().map(to_vec3).collect(),
        faces,
        material_index: mesh.material_index,
    }
}

fn convert_material(material: &Material) -> ImportedMaterial {
    let mut slots = Vec::new();
    for role in TextureRole::ALL {
        let mut entries: Vec<(usize, &str)> = material
            .properties
            .iter()
            .filter(|p| p.key == TEXTURE_FILE_KEY && p.semantic == role.texture_type())
            .filter_map(|p| match &p.data {
                PropertyTypeInfo::String(path) => Some((p.index as usize, path.as_str())),
                _ => None,
            })
            .collect();
        entries.sort_by_key(|(index, _)| *index);
        slots.extend(entries.into_iter().map(|(_, path)| (role, path.to_string())));
    }
    ImportedMaterial { slots }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_order_and_prefixes() {
        let prefixes: Vec<_> = TextureRole::ALL
            .iter()
            .map(|r| r.uniform_prefix())
            .collect();
        assert_eq!(
            prefixes,
            vec![
                "texture_diffuse",
                "texture_specular",
                "texture_normal",
                "texture_height"
            ]
        );
    }

    #[test]
    fn test_material_paths_filter_by_role_in_slot_order() {
        let material = ImportedMaterial {
            slots: vec![
                (TextureRole::Diffuse, "a.png".to_string()),
                (TextureRole::Diffuse, "b.png".to_string()),
                (TextureRole::Normal, "n.png".to_string()),
            ],
        };
        let diffuse: Vec<_> = material.paths(TextureRole::Diffuse).collect();
        assert_eq!(diffuse, vec!["a.png", "b.png"]);
        let normal: Vec<_> = material.paths(TextureRole::Normal).collect();
        assert_eq!(normal, vec!["n.png"]);
        assert_eq!(material.paths(TextureRole::Specular).count(), 0);
        assert_eq!(material.paths(TextureRole::Height).count(), 0);
    }
}
