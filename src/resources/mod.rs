use std::path::{Path, PathBuf};

use crate::{
    context::GpuResourceSink,
    data_structures::{
        model::{GeometryBatch, Material, Model, Texture, TextureRole, Vertex},
        scene_graph::{SceneDescription, SceneMesh, TextureType},
    },
    error::ModelLoadError,
    resources::texture::TextureCache,
};

/**
 * This module contains all logic for loading meshes and textures from external files.
 */
pub mod gltf_import;
pub mod mesh;
pub mod texture;

/// File access used by the parsers and the texture cache.
pub trait AssetReader {
    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>>;
}

/// Reads straight from the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

impl AssetReader for FsReader {
    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

/// Which upstream slot feeds each role, in binding order.
///
/// Normal maps come from the Height slot and height maps from the Ambient slot.
const ROLE_SOURCES: [(TextureRole, TextureType); 4] = [
    (TextureRole::Diffuse, TextureType::Diffuse),
    (TextureRole::Specular, TextureType::Specular),
    (TextureRole::Normal, TextureType::Height),
    (TextureRole::Height, TextureType::Ambient),
];

/// Options for a single import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// Diffuse texture substituted when a material has none, relative to the model directory.
    pub fallback_texture: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            fallback_texture: "default.png".into(),
        }
    }
}

/// Parse a model file into a scene description, picking the parser by extension.
pub fn load_scene(reader: &dyn AssetReader, path: &Path) -> Result<SceneDescription, ModelLoadError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("obj") => mesh::load_obj(reader, path),
        Some("gltf" | "glb") => gltf_import::load_gltf(reader, path),
        _ => Err(ModelLoadError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Turn a parsed scene into draw batches.
///
/// Batches come out in depth-first pre-order of the node arena. Textures are
/// uploaded once per identifier; ones that fail to load are logged and left
/// out, and a batch that ends up without a diffuse texture gets the fallback.
pub fn import_scene<G: GpuResourceSink>(
    gpu: &mut G,
    reader: &dyn AssetReader,
    scene: &SceneDescription,
    directory: &Path,
    options: &ImportOptions,
) -> Result<Model<G>, ModelLoadError> {
    let order = scene.mesh_order()?;
    let mut cache = TextureCache::new();
    let mut batches = Vec::with_capacity(order.len());

    for mesh_idx in order {
        let mesh = &scene.meshes[mesh_idx];
        let textures = resolve_textures(gpu, reader, scene, mesh, directory, options, &mut cache);
        let (vertices, indices) = assemble_geometry(mesh);
        let colours = &scene.materials[mesh.material];
        let material = Material {
            diffuse: colours.diffuse.into(),
            ambient: colours.ambient.into(),
            specular: colours.specular.into(),
        };
        batches.push(GeometryBatch::new(gpu, &mesh.name, vertices, indices, textures, material));
    }

    log::info!(
        "imported {} batches with {} unique textures from {}",
        batches.len(),
        cache.len(),
        directory.display()
    );
    Ok(Model::new(batches, cache, directory.to_path_buf()))
}

fn resolve_textures<G: GpuResourceSink>(
    gpu: &mut G,
    reader: &dyn AssetReader,
    scene: &SceneDescription,
    mesh: &SceneMesh,
    directory: &Path,
    options: &ImportOptions,
    cache: &mut TextureCache<G>,
) -> Vec<Texture<G>> {
    let material = &scene.materials[mesh.material];
    let mut textures = Vec::new();

    for (role, kind) in ROLE_SOURCES {
        let before = textures.len();
        for identifier in material.textures_of(kind) {
            match cache.load(gpu, reader, &scene.embedded, directory, identifier, role) {
                Ok(texture) => textures.push(texture),
                Err(e) => log::warn!("skipping {role:?} texture of `{}`: {e}", mesh.name),
            }
        }
        if role == TextureRole::Diffuse && textures.len() == before {
            textures.push(cache.fallback(gpu, reader, directory, &options.fallback_texture));
        }
    }

    textures
}

/// Copy positions and normals, texture coordinates and tangent frame when
/// present, and flatten faces into an index list.
fn assemble_geometry(mesh: &SceneMesh) -> (Vec<Vertex>, Vec<u32>) {
    let vertices = mesh
        .positions
        .iter()
        .enumerate()
        .map(|(i, &position)| {
            let mut vertex = Vertex {
                position,
                normal: mesh.normals.get(i).copied().unwrap_or([0.0; 3]),
                bones: mesh.bones.as_ref().and_then(|b| b.get(i)).copied(),
                ..Default::default()
            };
            if let Some(tex_coords) = &mesh.tex_coords {
                vertex.tex_coords = tex_coords.get(i).copied().unwrap_or([0.0; 2]);
                vertex.tangent = mesh.tangents.as_ref().and_then(|t| t.get(i)).copied();
                vertex.bitangent = mesh.bitangents.as_ref().and_then(|b| b.get(i)).copied();
            }
            vertex
        })
        .collect();
    let indices = mesh.faces.iter().flatten().copied().collect();

    (vertices, indices)
}

impl<G: GpuResourceSink> Model<G> {
    /// Parse and import `path`. Relative texture paths resolve against its directory.
    pub fn load(
        gpu: &mut G,
        reader: &dyn AssetReader,
        path: &Path,
        options: &ImportOptions,
    ) -> Result<Self, ModelLoadError> {
        let directory: PathBuf = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let scene = load_scene(reader, path)?;
        import_scene(gpu, reader, &scene, &directory, options)
    }

    /// Like [`Model::load`], but a failed import is logged and yields an empty model.
    pub fn load_or_empty(
        gpu: &mut G,
        reader: &dyn AssetReader,
        path: &Path,
        options: &ImportOptions,
    ) -> Self {
        match Self::load(gpu, reader, path, options) {
            Ok(model) => model,
            Err(e) => {
                log::error!("failed to load model {}: {e}", path.display());
                Self::empty()
            }
        }
    }
}
