//! Error taxonomy of the viewer.
//!
//! Only [`InitError`] and [`ShaderCompileError`] are allowed to end the
//! process. [`AssetLoadError`] is logged and skipped by the importer and
//! [`ModelLoadError`] is turned into an empty model by the caller.

use std::path::PathBuf;

use thiserror::Error;

/// Window, surface, adapter or device setup failed.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("could not create the event loop: {0}")]
    EventLoop(String),

    #[error("could not create the window: {0}")]
    Window(String),

    #[error("could not create a surface for the window: {0}")]
    Surface(String),

    #[error("no suitable graphics adapter: {0}")]
    Adapter(String),

    #[error("could not open a device on the adapter: {0}")]
    Device(String),
}

/// The WGSL program did not parse or validate.
#[derive(Debug, Error)]
#[error("shader `{label}` failed to compile:\n{log}")]
pub struct ShaderCompileError {
    pub label: String,
    pub log: String,
}

/// A single texture could not be read or decoded.
#[derive(Debug, Error)]
pub enum AssetLoadError {
    #[error("failed to read texture `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `path` is the file that was read, or the identifier itself for
    /// embedded payloads.
    #[error("failed to decode texture `{}`: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("texture `{identifier}` is {width}x{height}, larger than the device limit of {max}")]
    TooLarge {
        identifier: String,
        width: u32,
        height: u32,
        max: u32,
    },

    #[error("embedded texture `{0}` is not present in the scene")]
    MissingEmbedded(String),
}

/// The model as a whole could not be imported.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("failed to read model `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model `{}`: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("model `{}` has an unsupported extension", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("scene graph has no root node")]
    MissingRoot,

    #[error("malformed scene graph: {0}")]
    MalformedScene(String),
}

/// Umbrella error for everything that can stop the viewer before its first frame.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error(transparent)]
    Init(#[from] InitError),

    #[error(transparent)]
    Shader(#[from] ShaderCompileError),
}
