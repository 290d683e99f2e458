//! model-viewer
//!
//! An interactive viewer for textured OBJ and glTF models. It renders a
//! single model with one Phong lighting pass and lets the user fly a camera
//! and move, turn and scale the model in real time.
//!
//! High-level modules
//! - `camera`: free-fly Euler camera and the perspective projection
//! - `context`: GPU and window context, and the resource sink it implements
//! - `data_structures`: vertices, batches, models, scene descriptions
//! - `resources`: OBJ/glTF parsing, import and the texture cache
//! - `render`: per-frame transform pipeline
//! - `pipelines`: wgpu pipelines, the shader and the light
//! - `input`, `overlay`, `state`: user interaction and the parameter panel
//! - `gui`: egui rendering of the parameter panel
//! - `flow`: window and event loop
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod gui;
pub mod input;
pub mod overlay;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod shader;
pub mod state;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use data_structures::model::{GeometryBatch, Model};
pub use error::{AssetLoadError, InitError, ModelLoadError, ShaderCompileError, ViewerError};
