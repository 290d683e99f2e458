use std::{
    cell::RefCell,
    collections::HashMap,
    io::Cursor,
    path::{Path, PathBuf},
};

use cgmath::{Matrix4, Vector3};
use model_viewer::{
    context::GpuResourceSink,
    data_structures::{
        model::VertexRaw,
        scene_graph::{SceneDescription, SceneMaterial, SceneMesh, SceneNode, TextureType},
    },
    resources::AssetReader,
    shader::{DrawTarget, Shader},
};

/// Stand-in for the GPU: buffers are numbered, textures are their upload label.
#[derive(Debug, Default)]
pub struct RecordingGpu {
    pub vertex_uploads: Vec<usize>,
    pub index_uploads: Vec<usize>,
    pub texture_uploads: Vec<(String, u32, u32)>,
    next_buffer: usize,
    max_dimension: Option<u32>,
}

impl RecordingGpu {
    /// Same size limit as `wgpu::Limits::default()`.
    pub const DEFAULT_MAX_DIMENSION: u32 = 8192;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_dimension(max: u32) -> Self {
        Self {
            max_dimension: Some(max),
            ..Self::default()
        }
    }

    pub fn uploaded_labels(&self) -> Vec<&str> {
        self.texture_uploads.iter().map(|(l, _, _)| l.as_str()).collect()
    }
}

impl GpuResourceSink for RecordingGpu {
    type Buffer = usize;
    type Texture = String;

    fn create_vertex_buffer(&mut self, _label: &str, vertices: &[VertexRaw]) -> usize {
        self.vertex_uploads.push(vertices.len());
        self.next_buffer += 1;
        self.next_buffer
    }

    fn create_index_buffer(&mut self, _label: &str, indices: &[u32]) -> usize {
        self.index_uploads.push(indices.len());
        self.next_buffer += 1;
        self.next_buffer
    }

    fn upload_texture(&mut self, label: &str, rgba: &image::RgbaImage) -> String {
        self.texture_uploads
            .push((label.to_string(), rgba.width(), rgba.height()));
        label.to_string()
    }

    fn max_texture_dimension(&self) -> u32 {
        self.max_dimension.unwrap_or(Self::DEFAULT_MAX_DIMENSION)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    UseProgram,
    Mat4(String, Matrix4<f32>),
    Vec3(String, Vector3<f32>),
    Int(String, i32),
    Float(String, f32),
    Bind(u32, String),
    Draw { vertices: usize, indices: usize, count: u32 },
}

/// Shader and draw target that only remembers what it was told.
#[derive(Debug, Default)]
pub struct RecordingTarget {
    pub calls: Vec<Call>,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draws(&self) -> Vec<u32> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Draw { count, .. } => Some(*count),
                _ => None,
            })
            .collect()
    }

    pub fn ints(&self) -> Vec<(&str, i32)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Int(name, v) => Some((name.as_str(), *v)),
                _ => None,
            })
            .collect()
    }

    pub fn last_mat4(&self, name: &str) -> Option<Matrix4<f32>> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::Mat4(n, m) if n == name => Some(*m),
            _ => None,
        })
    }

    pub fn last_vec3(&self, name: &str) -> Option<Vector3<f32>> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::Vec3(n, v) if n == name => Some(*v),
            _ => None,
        })
    }

    pub fn last_float(&self, name: &str) -> Option<f32> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::Float(n, v) if n == name => Some(*v),
            _ => None,
        })
    }

    pub fn bound(&self) -> Vec<(u32, &str)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Bind(unit, t) => Some((*unit, t.as_str())),
                _ => None,
            })
            .collect()
    }
}

impl Shader for RecordingTarget {
    fn use_program(&mut self) {
        self.calls.push(Call::UseProgram);
    }

    fn set_mat4(&mut self, name: &str, value: &Matrix4<f32>) {
        self.calls.push(Call::Mat4(name.to_string(), *value));
    }

    fn set_vec3(&mut self, name: &str, value: Vector3<f32>) {
        self.calls.push(Call::Vec3(name.to_string(), value));
    }

    fn set_int(&mut self, name: &str, value: i32) {
        self.calls.push(Call::Int(name.to_string(), value));
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.calls.push(Call::Float(name.to_string(), value));
    }
}

impl DrawTarget<RecordingGpu> for RecordingTarget {
    fn bind_texture(&mut self, unit: u32, texture: &String) {
        self.calls.push(Call::Bind(unit, texture.clone()));
    }

    fn draw_indexed(&mut self, vertices: &usize, indices: &usize, index_count: u32) {
        self.calls.push(Call::Draw {
            vertices: *vertices,
            indices: *indices,
            count: index_count,
        });
    }
}

/// In-memory file system that counts every read.
#[derive(Debug, Default)]
pub struct MemoryReader {
    files: HashMap<PathBuf, Vec<u8>>,
    reads: RefCell<Vec<PathBuf>>,
}

impl MemoryReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl AsRef<Path>, bytes: Vec<u8>) -> Self {
        self.files.insert(path.as_ref().to_path_buf(), bytes);
        self
    }

    pub fn reads(&self) -> Vec<PathBuf> {
        self.reads.borrow().clone()
    }
}

impl AssetReader for MemoryReader {
    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        self.reads.borrow_mut().push(path.to_path_buf());
        self.files.get(path).cloned().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, path.display().to_string())
        })
    }
}

/// A solid-colour PNG of the given size.
pub fn png_bytes(width: u32, height: u32, colour: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(colour));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("png encoding");
    bytes
}

/// A single triangle in the xy plane with uvs.
pub fn triangle(name: &str, material: usize) -> SceneMesh {
    SceneMesh {
        name: name.to_string(),
        positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        normals: vec![[0.0, 0.0, 1.0]; 3],
        tex_coords: Some(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]),
        tangents: Some(vec![[1.0, 0.0, 0.0]; 3]),
        bitangents: Some(vec![[0.0, 1.0, 0.0]; 3]),
        faces: vec![[0, 1, 2]],
        material,
        ..Default::default()
    }
}

pub fn material(textures: &[(TextureType, &str)]) -> SceneMaterial {
    SceneMaterial {
        name: "material".into(),
        diffuse: [1.0, 0.5, 0.25],
        ambient: [0.1, 0.1, 0.1],
        specular: [0.5, 0.5, 0.5],
        textures: textures
            .iter()
            .map(|(kind, id)| (*kind, id.to_string()))
            .collect(),
    }
}

/// Root holding one triangle per material, each under its own child node.
pub fn flat_scene(materials: Vec<SceneMaterial>) -> SceneDescription {
    let mut scene = SceneDescription::default();
    let root = scene.add_node(SceneNode {
        name: "root".into(),
        ..Default::default()
    });
    scene.root = Some(root);
    for (i, m) in materials.into_iter().enumerate() {
        let material = scene.add_material(m);
        let mesh = scene.add_mesh(triangle(&format!("mesh{i}"), material));
        let node = scene.add_node(SceneNode {
            name: format!("node{i}"),
            meshes: vec![mesh],
            children: Vec::new(),
        });
        scene.nodes[root].children.push(node);
    }
    scene
}
