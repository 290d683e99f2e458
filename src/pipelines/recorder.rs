//! The wgpu side of the named-uniform [`Shader`] interface.
//!
//! Uniform writes land in a [`UniformState`], a CPU copy of
//! [`ShaderUniforms`] plus the texture units each material slot was told to
//! sample. Every draw snapshots that copy into its own uniform buffer, so
//! later writes never affect earlier draws within the pass.

use std::collections::HashMap;

use cgmath::{Matrix4, Vector3};
use wgpu::util::DeviceExt;

use crate::{
    context::Context,
    data_structures::{model::TextureRole, texture::{self, Texture}},
    error::ShaderCompileError,
    pipelines::basic::{self, TEXTURE_SLOTS},
    shader::{self, DrawTarget, Shader},
};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShaderUniforms {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub light_pos: [f32; 3],
    pub light_str: f32,
    pub light_colour: [f32; 3],
    pub n: f32,
    pub cam_pos: [f32; 3],
    pub use_texture: i32,
    pub diffuse: [f32; 3],
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use a padding field here
    _padding0: f32,
    pub ambient: [f32; 3],
    _padding1: f32,
    pub specular: [f32; 3],
    _padding2: f32,
}

impl Default for ShaderUniforms {
    fn default() -> Self {
        let identity: [[f32; 4]; 4] = Matrix4::from_scale(1.0).into();
        Self {
            model: identity,
            view: identity,
            projection: identity,
            normal_matrix: identity,
            light_pos: [0.0; 3],
            light_str: 0.0,
            light_colour: [1.0; 3],
            n: 1.0,
            cam_pos: [0.0; 3],
            use_texture: 0,
            diffuse: [1.0; 3],
            _padding0: 0.0,
            ambient: [0.0; 3],
            _padding1: 0.0,
            specular: [0.0; 3],
            _padding2: 0.0,
        }
    }
}

impl ShaderUniforms {
    /// Returns `false` when no mat4 uniform is called `name`.
    pub fn set_mat4(&mut self, name: &str, value: &Matrix4<f32>) -> bool {
        let value: [[f32; 4]; 4] = (*value).into();
        let field = match name {
            shader::MODEL => &mut self.model,
            shader::VIEW => &mut self.view,
            shader::PROJECTION => &mut self.projection,
            shader::NORMAL_MATRIX => &mut self.normal_matrix,
            _ => return false,
        };
        *field = value;
        true
    }

    pub fn set_vec3(&mut self, name: &str, value: Vector3<f32>) -> bool {
        let field = match name {
            shader::LIGHT_POS => &mut self.light_pos,
            shader::LIGHT_COLOUR => &mut self.light_colour,
            shader::CAM_POS => &mut self.cam_pos,
            shader::MATERIAL_DIFFUSE => &mut self.diffuse,
            shader::MATERIAL_AMBIENT => &mut self.ambient,
            shader::MATERIAL_SPECULAR => &mut self.specular,
            _ => return false,
        };
        *field = value.into();
        true
    }

    pub fn set_float(&mut self, name: &str, value: f32) -> bool {
        let field = match name {
            shader::LIGHT_STR => &mut self.light_str,
            shader::LIGHT_N => &mut self.n,
            _ => return false,
        };
        *field = value;
        true
    }
}

/// Material slot sampled through the uniform `name` (`texture_diffuse1`,
/// `texture_normal1`, ...). Only the first texture of each role is bound.
pub fn texture_slot(name: &str) -> Option<usize> {
    TextureRole::ALL
        .iter()
        .position(|role| name.strip_prefix(role.uniform_prefix()) == Some("1"))
}

/// Everything the named-uniform writes of one frame have set so far.
#[derive(Debug, Clone, Default)]
pub struct UniformState {
    pub uniforms: ShaderUniforms,
    /// Texture unit announced for each material slot.
    slot_units: [Option<u32>; TEXTURE_SLOTS],
}

impl UniformState {
    pub fn slot_unit(&self, slot: usize) -> Option<u32> {
        self.slot_units.get(slot).copied().flatten()
    }

    /// What each material slot samples: the texture bound to its announced
    /// unit, or the slot's placeholder when nothing was announced or bound.
    pub fn resolve_slots<'t, T>(
        &self,
        bound: &'t HashMap<u32, T>,
        placeholders: &'t [T; TEXTURE_SLOTS],
    ) -> [&'t T; TEXTURE_SLOTS] {
        std::array::from_fn(|slot| {
            self.slot_units[slot]
                .and_then(|unit| bound.get(&unit))
                .unwrap_or(&placeholders[slot])
        })
    }
}

impl Shader for UniformState {
    fn use_program(&mut self) {}

    fn set_mat4(&mut self, name: &str, value: &Matrix4<f32>) {
        if !self.uniforms.set_mat4(name, value) {
            log::trace!("ignoring unknown mat4 uniform {name}");
        }
    }

    fn set_vec3(&mut self, name: &str, value: Vector3<f32>) {
        if !self.uniforms.set_vec3(name, value) {
            log::trace!("ignoring unknown vec3 uniform {name}");
        }
    }

    fn set_int(&mut self, name: &str, value: i32) {
        if name == shader::USE_TEXTURE {
            self.uniforms.use_texture = value;
            // a new batch announces its own units
            self.slot_units = [None; TEXTURE_SLOTS];
            return;
        }
        match texture_slot(name) {
            Some(slot) => self.slot_units[slot] = u32::try_from(value).ok(),
            None => log::trace!("ignoring unknown int uniform {name}"),
        }
    }

    fn set_float(&mut self, name: &str, value: f32) {
        if !self.uniforms.set_float(name, value) {
            log::trace!("ignoring unknown float uniform {name}");
        }
    }
}

/// Pipelines, layouts and placeholder textures for drawing models.
pub struct ModelPipeline {
    fill: wgpu::RenderPipeline,
    wireframe: Option<wgpu::RenderPipeline>,
    uniform_layout: wgpu::BindGroupLayout,
    material_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    /// Bound in slots no texture was announced for, in role order.
    placeholders: [Texture; TEXTURE_SLOTS],
}

impl ModelPipeline {
    pub fn new(ctx: &Context) -> Result<Self, ShaderCompileError> {
        basic::validate_wgsl("model.wgsl", basic::MODEL_SHADER)?;

        let device = &ctx.device;
        let uniform_layout = basic::uniform_layout(device);
        let material_layout = basic::material_layout(device);
        let fill = basic::mk_model_pipeline(
            device,
            ctx.config.format,
            &uniform_layout,
            &material_layout,
            wgpu::PolygonMode::Fill,
        );
        let wireframe = ctx.supports_wireframe.then(|| {
            basic::mk_model_pipeline(
                device,
                ctx.config.format,
                &uniform_layout,
                &material_layout,
                wgpu::PolygonMode::Line,
            )
        });

        let placeholders = [
            Texture::solid(device, &ctx.queue, [255, 255, 255, 255], "placeholder diffuse"),
            Texture::solid(device, &ctx.queue, [0, 0, 0, 255], "placeholder specular"),
            // The blue/purple-ish colour that represents the default for normal maps
            Texture::solid(device, &ctx.queue, [127, 127, 255, 255], "placeholder normal"),
            Texture::solid(device, &ctx.queue, [0, 0, 0, 255], "placeholder height"),
        ];

        Ok(Self {
            fill,
            wireframe,
            uniform_layout,
            material_layout,
            sampler: texture::create_default_sampler(device),
            placeholders,
        })
    }

    pub fn supports_wireframe(&self) -> bool {
        self.wireframe.is_some()
    }

    /// Start recording draws into `pass`. Falls back to fill mode when wireframe is unsupported.
    pub fn recorder<'a, 'pass>(
        &'a self,
        device: &'a wgpu::Device,
        pass: &'a mut wgpu::RenderPass<'pass>,
        wireframe: bool,
    ) -> FrameRecorder<'a, 'pass> {
        let pipeline = match (&self.wireframe, wireframe) {
            (Some(line), true) => line,
            _ => &self.fill,
        };
        FrameRecorder {
            device,
            model_pipeline: self,
            pipeline,
            pass,
            state: UniformState::default(),
            units: HashMap::new(),
        }
    }
}

/// Records draws of one frame into a render pass.
pub struct FrameRecorder<'a, 'pass> {
    device: &'a wgpu::Device,
    model_pipeline: &'a ModelPipeline,
    pipeline: &'a wgpu::RenderPipeline,
    pass: &'a mut wgpu::RenderPass<'pass>,
    state: UniformState,
    units: HashMap<u32, Texture>,
}

impl FrameRecorder<'_, '_> {
    fn material_bind_group(&self) -> wgpu::BindGroup {
        let textures = self
            .state
            .resolve_slots(&self.units, &self.model_pipeline.placeholders);

        let mut entries = textures
            .iter()
            .enumerate()
            .map(|(binding, texture)| wgpu::BindGroupEntry {
                binding: binding as u32,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            })
            .collect::<Vec<_>>();
        entries.push(wgpu::BindGroupEntry {
            binding: TEXTURE_SLOTS as u32,
            resource: wgpu::BindingResource::Sampler(&self.model_pipeline.sampler),
        });

        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.model_pipeline.material_layout,
            entries: &entries,
            label: Some("material_bind_group"),
        })
    }
}

impl Shader for FrameRecorder<'_, '_> {
    fn use_program(&mut self) {
        self.pass.set_pipeline(self.pipeline);
    }

    fn set_mat4(&mut self, name: &str, value: &Matrix4<f32>) {
        self.state.set_mat4(name, value);
    }

    fn set_vec3(&mut self, name: &str, value: Vector3<f32>) {
        self.state.set_vec3(name, value);
    }

    fn set_int(&mut self, name: &str, value: i32) {
        self.state.set_int(name, value);
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.state.set_float(name, value);
    }
}

impl DrawTarget<Context> for FrameRecorder<'_, '_> {
    fn bind_texture(&mut self, unit: u32, texture: &Texture) {
        self.units.insert(unit, texture.clone());
    }

    fn draw_indexed(&mut self, vertices: &wgpu::Buffer, indices: &wgpu::Buffer, index_count: u32) {
        if index_count == 0 {
            return;
        }

        let uniform_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Uniform Buffer"),
                contents: bytemuck::cast_slice(&[self.state.uniforms]),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let uniform_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.model_pipeline.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("uniform_bind_group"),
        });
        let material_bind_group = self.material_bind_group();

        self.pass.set_bind_group(0, &uniform_bind_group, &[]);
        self.pass.set_bind_group(1, &material_bind_group, &[]);
        self.pass.set_vertex_buffer(0, vertices.slice(..));
        self.pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
        self.pass.draw_indexed(0..index_count, 0, 0..1);
    }
}
