//! Command line and tunables.

use std::path::PathBuf;

use cgmath::{Point3, Vector3};
use clap::Parser;

use crate::{pipelines::light::Light, resources::ImportOptions};

#[derive(Debug, Parser)]
#[command(name = "model-viewer", version, about = "View a textured OBJ or glTF model")]
pub struct Cli {
    /// Model to open (.obj, .gltf or .glb)
    #[arg(default_value = "assets/model/creeper/Creeper.obj")]
    pub model: PathBuf,

    /// Initial window width in pixels
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Initial window height in pixels
    #[arg(long, default_value_t = 900)]
    pub height: u32,

    /// Start in wireframe mode
    #[arg(long)]
    pub wireframe: bool,

    /// Diffuse texture used when a material has none, relative to the model
    #[arg(long, default_value = "default.png")]
    pub fallback_texture: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub title: String,
    pub model: PathBuf,
    pub width: u32,
    pub height: u32,
    pub wireframe: bool,
    pub fallback_texture: String,
    pub clear_colour: wgpu::Color,
    pub znear: f32,
    pub zfar: f32,
    pub key_sensitivity: f32,
    pub rotate_speed: f32,
    pub scale_speed: f32,
    pub camera_start: Point3<f32>,
    pub light: Light,
    pub light_orbit_radius: f32,
    pub light_orbit_height: f32,
}

impl ViewerConfig {
    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            fallback_texture: self.fallback_texture.clone(),
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "model-viewer".into(),
            model: PathBuf::from("assets/model/creeper/Creeper.obj"),
            width: 1200,
            height: 900,
            wireframe: false,
            fallback_texture: "default.png".into(),
            clear_colour: wgpu::Color {
                r: 0.2,
                g: 0.2,
                b: 0.3,
                a: 1.0,
            },
            znear: 0.1,
            zfar: 100.0,
            key_sensitivity: 4.0,
            rotate_speed: 50.0,
            scale_speed: 0.5,
            camera_start: Point3::new(0.0, 0.0, 3.0),
            light: Light::new(
                Vector3::new(10.0, 30.0, 0.0),
                Vector3::new(1.0, 1.0, 1.0),
                0.2,
                5.0,
            ),
            light_orbit_radius: 10.0,
            light_orbit_height: 10.0,
        }
    }
}

impl From<Cli> for ViewerConfig {
    fn from(cli: Cli) -> Self {
        Self {
            model: cli.model,
            width: cli.width,
            height: cli.height,
            wireframe: cli.wireframe,
            fallback_texture: cli.fallback_texture,
            ..Default::default()
        }
    }
}
