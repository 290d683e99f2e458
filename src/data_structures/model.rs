//! Draw-ready geometry: vertices, materials, textures and the batches that
//! tie them to GPU buffers.

use std::{collections::HashMap, path::PathBuf, rc::Rc};

use crate::{
    context::GpuResourceSink,
    resources::texture::{CachedImage, TextureCache},
    shader::{self, DrawTarget},
};

/// Up to four bone influences per vertex. Carried through import, never consumed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoneWeights {
    pub indices: [u32; 4],
    pub weights: [f32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
    pub tangent: Option<[f32; 3]>,
    pub bitangent: Option<[f32; 3]>,
    pub bones: Option<BoneWeights>,
}

impl Vertex {
    /// Packs the vertex for upload. Missing tangent data becomes zero.
    pub fn to_raw(&self) -> VertexRaw {
        VertexRaw {
            position: self.position,
            normal: self.normal,
            tex_coords: self.tex_coords,
            tangent: self.tangent.unwrap_or([0.0; 3]),
            bitangent: self.bitangent.unwrap_or([0.0; 3]),
        }
    }
}

/**
 * The raw vertex is what actually lives in the vertex buffer.
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VertexRaw {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
}

impl VertexRaw {
    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
        3 => Float32x3,
        4 => Float32x3
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<VertexRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// The semantic a texture is bound under. The order is the binding order inside a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextureRole {
    Diffuse,
    Specular,
    Normal,
    Height,
}

impl TextureRole {
    pub const ALL: [TextureRole; 4] = [
        TextureRole::Diffuse,
        TextureRole::Specular,
        TextureRole::Normal,
        TextureRole::Height,
    ];

    /// Sampler name prefix; the shader sees `texture_diffuse1`, `texture_diffuse2`, ...
    pub fn uniform_prefix(self) -> &'static str {
        match self {
            TextureRole::Diffuse => "texture_diffuse",
            TextureRole::Specular => "texture_specular",
            TextureRole::Normal => "texture_normal",
            TextureRole::Height => "texture_height",
        }
    }
}

/// A role-tagged reference to an uploaded image. Cloning shares the GPU handle.
pub struct Texture<G: GpuResourceSink> {
    pub role: TextureRole,
    pub image: Rc<CachedImage<G>>,
}

impl<G: GpuResourceSink> Texture<G> {
    pub fn identifier(&self) -> &str {
        &self.image.identifier
    }
}

impl<G: GpuResourceSink> Clone for Texture<G> {
    fn clone(&self) -> Self {
        Self {
            role: self.role,
            image: Rc::clone(&self.image),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub diffuse: cgmath::Vector3<f32>,
    pub ambient: cgmath::Vector3<f32>,
    pub specular: cgmath::Vector3<f32>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse: cgmath::Vector3::new(1.0, 1.0, 1.0),
            ambient: cgmath::Vector3::new(0.0, 0.0, 0.0),
            specular: cgmath::Vector3::new(0.0, 0.0, 0.0),
        }
    }
}

/// One mesh worth of geometry plus the buffers it was uploaded into.
///
/// Nothing is mutable after construction; the GPU buffers are released when
/// the batch is dropped.
pub struct GeometryBatch<G: GpuResourceSink> {
    pub name: String,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    textures: Vec<Texture<G>>,
    material: Material,
    vertex_buffer: G::Buffer,
    index_buffer: G::Buffer,
}

impl<G: GpuResourceSink> GeometryBatch<G> {
    pub fn new(
        gpu: &mut G,
        name: &str,
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
        textures: Vec<Texture<G>>,
        material: Material,
    ) -> Self {
        let raw = vertices.iter().map(Vertex::to_raw).collect::<Vec<_>>();
        let vertex_buffer = gpu.create_vertex_buffer(&format!("{name} Vertex Buffer"), &raw);
        let index_buffer = gpu.create_index_buffer(&format!("{name} Index Buffer"), &indices);

        Self {
            name: name.to_string(),
            vertices,
            indices,
            textures,
            material,
            vertex_buffer,
            index_buffer,
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn textures(&self) -> &[Texture<G>] {
        &self.textures
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Bind textures and material colours, then issue exactly one indexed draw.
    ///
    /// Texture `i` goes to unit `i` and is announced as `<role><n>`, where `n`
    /// counts from 1 within its role.
    pub fn draw<D: DrawTarget<G>>(&self, target: &mut D) {
        let mut per_role: HashMap<TextureRole, u32> = HashMap::new();

        target.set_int(shader::USE_TEXTURE, self.textures.len() as i32);
        for (unit, texture) in self.textures.iter().enumerate() {
            let number = per_role.entry(texture.role).or_insert(0);
            *number += 1;
            let name = format!("{}{}", texture.role.uniform_prefix(), number);
            target.set_int(&name, unit as i32);
            target.bind_texture(unit as u32, &texture.image.handle);
        }

        target.set_vec3(shader::MATERIAL_DIFFUSE, self.material.diffuse);
        target.set_vec3(shader::MATERIAL_AMBIENT, self.material.ambient);
        target.set_vec3(shader::MATERIAL_SPECULAR, self.material.specular);

        target.draw_indexed(
            &self.vertex_buffer,
            &self.index_buffer,
            self.indices.len() as u32,
        );
    }
}

/// An imported model: batches in scene pre-order plus the textures they share.
pub struct Model<G: GpuResourceSink> {
    batches: Vec<GeometryBatch<G>>,
    textures: TextureCache<G>,
    directory: PathBuf,
}

impl<G: GpuResourceSink> Model<G> {
    pub fn new(batches: Vec<GeometryBatch<G>>, textures: TextureCache<G>, directory: PathBuf) -> Self {
        Self {
            batches,
            textures,
            directory,
        }
    }

    /// A model without geometry. Drawing it is a no-op.
    pub fn empty() -> Self {
        Self::new(Vec::new(), TextureCache::new(), PathBuf::new())
    }

    pub fn batches(&self) -> &[GeometryBatch<G>] {
        &self.batches
    }

    pub fn textures(&self) -> &TextureCache<G> {
        &self.textures
    }

    /// Directory relative texture paths were resolved against.
    pub fn directory(&self) -> &std::path::Path {
        &self.directory
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn draw<D: DrawTarget<G>>(&self, target: &mut D) {
        for batch in &self.batches {
            batch.draw(target);
        }
    }
}
