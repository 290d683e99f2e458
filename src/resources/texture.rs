//! Per-load texture cache.
//!
//! Every identifier is decoded and uploaded at most once per model load.
//! Identifiers are compared as raw strings, so `a.png` and `./a.png` are two
//! different textures.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    rc::Rc,
};

use crate::{
    context::GpuResourceSink,
    data_structures::model::{Texture, TextureRole},
    error::AssetLoadError,
    resources::AssetReader,
};

/// Prefix of identifiers that name a payload embedded in the model file.
pub const EMBEDDED_PREFIX: char = '*';

/// An uploaded image and the identifier it was loaded under.
pub struct CachedImage<G: GpuResourceSink> {
    pub identifier: String,
    pub width: u32,
    pub height: u32,
    pub handle: G::Texture,
}

pub struct TextureCache<G: GpuResourceSink> {
    loaded: HashMap<String, Rc<CachedImage<G>>>,
}

impl<G: GpuResourceSink> TextureCache<G> {
    pub fn new() -> Self {
        Self {
            loaded: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.loaded.contains_key(identifier)
    }

    pub fn get(&self, identifier: &str) -> Option<Rc<CachedImage<G>>> {
        self.loaded.get(identifier).cloned()
    }

    /// Lookup-or-load. A hit never touches the reader or the GPU.
    ///
    /// Embedded identifiers (`*N`) are decoded from `embedded`, everything else
    /// is read relative to `directory`. Images wider or taller than the sink
    /// accepts are rejected before upload.
    pub fn load(
        &mut self,
        gpu: &mut G,
        reader: &dyn AssetReader,
        embedded: &HashMap<String, Vec<u8>>,
        directory: &Path,
        identifier: &str,
        role: TextureRole,
    ) -> Result<Texture<G>, AssetLoadError> {
        if let Some(image) = self.loaded.get(identifier) {
            return Ok(Texture {
                role,
                image: Rc::clone(image),
            });
        }

        let (path, bytes) = if identifier.starts_with(EMBEDDED_PREFIX) {
            let bytes = embedded
                .get(identifier)
                .cloned()
                .ok_or_else(|| AssetLoadError::MissingEmbedded(identifier.to_string()))?;
            (PathBuf::from(identifier), bytes)
        } else {
            let path = directory.join(identifier);
            match reader.read(&path) {
                Ok(bytes) => (path, bytes),
                Err(source) => return Err(AssetLoadError::Read { path, source }),
            }
        };

        let rgba = image::load_from_memory(&bytes)
            .map_err(|source| AssetLoadError::Decode { path, source })?
            .to_rgba8();

        let max = gpu.max_texture_dimension();
        if rgba.width() > max || rgba.height() > max {
            return Err(AssetLoadError::TooLarge {
                identifier: identifier.to_string(),
                width: rgba.width(),
                height: rgba.height(),
                max,
            });
        }

        Ok(self.insert(gpu, identifier, &rgba, role))
    }

    /// The diffuse texture every batch falls back to.
    ///
    /// If `identifier` cannot be loaded a 1×1 white image is uploaded under
    /// the same identifier, so the fallback itself never fails.
    pub fn fallback(
        &mut self,
        gpu: &mut G,
        reader: &dyn AssetReader,
        directory: &Path,
        identifier: &str,
    ) -> Texture<G> {
        match self.load(gpu, reader, &HashMap::new(), directory, identifier, TextureRole::Diffuse) {
            Ok(texture) => texture,
            Err(e) => {
                log::warn!("fallback texture unavailable, using plain white: {e}");
                let white = image::RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]));
                self.insert(gpu, identifier, &white, TextureRole::Diffuse)
            }
        }
    }

    fn insert(
        &mut self,
        gpu: &mut G,
        identifier: &str,
        rgba: &image::RgbaImage,
        role: TextureRole,
    ) -> Texture<G> {
        log::debug!(
            "uploading texture {identifier} ({}x{})",
            rgba.width(),
            rgba.height()
        );
        let handle = gpu.upload_texture(identifier, rgba);
        let image = Rc::new(CachedImage {
            identifier: identifier.to_string(),
            width: rgba.width(),
            height: rgba.height(),
            handle,
        });
        self.loaded.insert(identifier.to_string(), Rc::clone(&image));

        Texture { role, image }
    }
}

impl<G: GpuResourceSink> Default for TextureCache<G> {
    fn default() -> Self {
        Self::new()
    }
}
