//! Format-neutral scene description produced by the file parsers.
//!
//! Nodes, meshes and materials live in flat arenas and refer to each other by
//! index. The importer only ever walks this structure; it never sees tobj or
//! gltf types.

use std::collections::HashMap;

use crate::{data_structures::model::BoneWeights, error::ModelLoadError};

/// Texture slot as declared by the source file, before role assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureType {
    Diffuse,
    Specular,
    Ambient,
    Height,
    Normals,
    Emissive,
    Shininess,
    Opacity,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneMaterial {
    pub name: String,
    pub diffuse: [f32; 3],
    pub ambient: [f32; 3],
    pub specular: [f32; 3],
    /// Declared texture identifiers in file order.
    pub textures: Vec<(TextureType, String)>,
}

impl SceneMaterial {
    pub fn textures_of(&self, kind: TextureType) -> impl Iterator<Item = &str> {
        self.textures
            .iter()
            .filter(move |(k, _)| *k == kind)
            .map(|(_, identifier)| identifier.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneMesh {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tex_coords: Option<Vec<[f32; 2]>>,
    pub tangents: Option<Vec<[f32; 3]>>,
    pub bitangents: Option<Vec<[f32; 3]>>,
    pub bones: Option<Vec<BoneWeights>>,
    pub faces: Vec<[u32; 3]>,
    pub material: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub meshes: Vec<usize>,
    pub children: Vec<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct SceneDescription {
    pub nodes: Vec<SceneNode>,
    pub root: Option<usize>,
    pub meshes: Vec<SceneMesh>,
    pub materials: Vec<SceneMaterial>,
    /// Encoded image payloads keyed by their `*<index>` identifier.
    pub embedded: HashMap<String, Vec<u8>>,
}

impl SceneDescription {
    pub fn add_node(&mut self, node: SceneNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn add_mesh(&mut self, mesh: SceneMesh) -> usize {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    pub fn add_material(&mut self, material: SceneMaterial) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    /// Mesh indices in depth-first pre-order: a node's own meshes, then its
    /// children in child-index order.
    ///
    /// Fails on a missing root, dangling indices, or a node reachable twice
    /// (shared subtrees and cycles alike).
    pub fn mesh_order(&self) -> Result<Vec<usize>, ModelLoadError> {
        let root = self.root.ok_or(ModelLoadError::MissingRoot)?;
        if root >= self.nodes.len() {
            return Err(ModelLoadError::MalformedScene(format!(
                "root index {root} out of range ({} nodes)",
                self.nodes.len()
            )));
        }

        let mut order = Vec::new();
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![root];

        while let Some(idx) = stack.pop() {
            if std::mem::replace(&mut visited[idx], true) {
                return Err(ModelLoadError::MalformedScene(format!(
                    "node {idx} is reachable more than once"
                )));
            }
            let node = &self.nodes[idx];

            for &mesh in &node.meshes {
                let Some(scene_mesh) = self.meshes.get(mesh) else {
                    return Err(ModelLoadError::MalformedScene(format!(
                        "node {idx} references missing mesh {mesh}"
                    )));
                };
                if scene_mesh.material >= self.materials.len() {
                    return Err(ModelLoadError::MalformedScene(format!(
                        "mesh {mesh} references missing material {}",
                        scene_mesh.material
                    )));
                }
                order.push(mesh);
            }

            // reversed so the lowest child index is popped first
            for &child in node.children.iter().rev() {
                if child >= self.nodes.len() {
                    return Err(ModelLoadError::MalformedScene(format!(
                        "node {idx} references missing child {child}"
                    )));
                }
                stack.push(child);
            }
        }

        Ok(order)
    }
}
