//! The model façade: load a file through the importer, flatten its node
//! hierarchy into renderable meshes, and draw them all.

pub mod mesh;
pub mod texture;
pub mod vertex;

pub use mesh::RenderMesh;
pub use texture::{TextureCache, TextureRecord};
pub use vertex::{MAX_BONE_INFLUENCE, ModelVertex};

use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use crate::abs::ShaderProgram;
use crate::error::Error;
use crate::import::{self, ImportedMaterial, ImportedMesh, ImportedNode, TextureRole};
use crate::model::mesh::build_vertices;

/// A loaded model: every sub-mesh of the imported scene, flattened, plus
/// the texture cache shared between them.
///
/// Node transforms are neither applied nor accumulated; all sub-meshes are
/// treated as sharing one coordinate space.
pub struct Model {
    pub meshes: Vec<RenderMesh>,
    cache: TextureCache,
    directory: String,
}

impl Model {
    /// Loads the model file at `path`.
    ///
    /// Fails with [`Error::Import`] when the importer reports no scene, an
    /// incomplete scene, or a missing root node. Texture failures do not
    /// fail the load; the affected meshes draw untextured.
    pub fn load(gl: &Arc<glow::Context>, path: &str) -> Result<Self, Error> {
        let scene = import::load_scene(path)?;

        let directory = Path::new(path)
            .parent()
            .map(|dir| dir.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut model = Self {
            meshes: Vec::new(),
            cache: TextureCache::default(),
            directory,
        };

        let mut order = Vec::new();
        flatten_nodes(&scene.root, &mut order);
        for mesh_index in order {
            match scene.meshes.get(mesh_index as usize) {
                Some(raw) => {
                    let mesh = model.build_mesh(gl, raw, &scene.materials);
                    model.meshes.push(mesh);
                }
                None => log::warn!("node references mesh index {mesh_index} out of range"),
            }
        }

        log::info!(
            "loaded '{}': {} meshes, {} unique textures",
            path,
            model.meshes.len(),
            model.cache.len()
        );
        Ok(model)
    }

    /// A model with no meshes; drawing it submits nothing. The fallback
    /// when an import fails.
    pub fn empty() -> Self {
        Self {
            meshes: Vec::new(),
            cache: TextureCache::default(),
            directory: String::new(),
        }
    }

    /// Draws every mesh with the given shader program, in flattened order.
    pub fn draw(&self, shader: &ShaderProgram) {
        for mesh in &self.meshes {
            mesh.draw(shader);
        }
    }

    /// Number of unique texture paths loaded for this model.
    pub fn texture_count(&self) -> usize {
        self.cache.len()
    }

    fn build_mesh(
        &mut self,
        gl: &Arc<glow::Context>,
        raw: &ImportedMesh,
        materials: &[ImportedMaterial],
    ) -> RenderMesh {
        let (vertices, indices) = build_vertices(raw);

        let mut textures = Vec::new();
        match materials.get(raw.material_index as usize) {
            Some(material) => {
                for role in TextureRole::ALL {
                    textures.extend(self.load_material_textures(gl, material, role));
                }
            }
            None => log::warn!(
                "mesh '{}' references material index {} out of range",
                raw.name,
                raw.material_index
            ),
        }

        RenderMesh::new(gl, vertices, indices, textures)
    }

    /// Resolves every texture slot of one role on a material, in slot
    /// order, qualifying relative paths against the model's directory.
    fn load_material_textures(
        &mut self,
        gl: &Arc<glow::Context>,
        material: &ImportedMaterial,
        role: TextureRole,
    ) -> Vec<Rc<TextureRecord>> {
        material
            .paths(role)
            .map(|relative| {
                let qualified = qualify_path(&self.directory, relative);
                self.cache.resolve(gl, &qualified, role)
            })
            .collect()
    }
}

/// Collects the mesh indices of `node` and its subtree in pre-order: the
/// node's own meshes first, then each child's, left to right.
fn flatten_nodes(node: &ImportedNode, out: &mut Vec<u32>) {
    out.extend_from_slice(&node.mesh_indices);
    for child in &node.children {
        flatten_nodes(child, out);
    }
}

/// Joins a texture path stored in the model file onto the model's base
/// directory. Absolute paths and empty directories pass through unchanged.
fn qualify_path(directory: &str, relative: &str) -> String {
    if directory.is_empty() || Path::new(relative).is_absolute() {
        relative.to_string()
    } else {
        Path::new(directory)
            .join(relative)
            .to_string_lossy()
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str, mesh_indices: Vec<u32>) -> ImportedNode {
        ImportedNode {
            name: name.to_string(),
            mesh_indices,
            children: Vec::new(),
        }
    }

    #[test]
    fn test_flatten_is_pre_order() {
        let root = ImportedNode {
            name: "root".to_string(),
            mesh_indices: vec![0],
            children: vec![
                ImportedNode {
                    name: "left".to_string(),
                    mesh_indices: vec![1, 2],
                    children: vec![leaf("left.child", vec![3])],
                },
                leaf("right", vec![4]),
            ],
        };
        let mut order = Vec::new();
        flatten_nodes(&root, &mut order);
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_flatten_counts_every_reference() {
        // Nodes may reference no meshes at all; only the references count.
        let root = ImportedNode {
            name: "root".to_string(),
            mesh_indices: Vec::new(),
            children: vec![leaf("a", vec![0, 0]), leaf("b", Vec::new())],
        };
        let mut order = Vec::new();
        flatten_nodes(&root, &mut order);
        assert_eq!(order, vec![0, 0]);
    }

    #[test]
    fn test_empty_model_has_no_meshes() {
        let model = Model::empty();
        assert!(model.meshes.is_empty());
        assert_eq!(model.texture_count(), 0);
    }

    #[test]
    fn test_qualify_path_joins_relative_only() {
        assert_eq!(qualify_path("assets/backpack", "diffuse.jpg"), {
            let mut p = String::from("assets/backpack");
            p.push(std::path::MAIN_SEPARATOR);
            p.push_str("diffuse.jpg");
            p
        });
        assert_eq!(qualify_path("", "diffuse.jpg"), "diffuse.jpg");
    }
}
