//! Viewer data structures: models, textures, scene descriptions and transforms.
//!
//! - `model` contains vertices, materials, geometry batches and the imported model
//! - `texture` contains the wgpu texture wrapper and creation utilities
//! - `scene_graph` is the format-neutral node arena the importer walks
//! - `transform` holds the user-editable model placement

pub mod model;
pub mod scene_graph;
pub mod texture;
pub mod transform;
