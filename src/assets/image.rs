use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::assets::decode::decode_image;
use crate::foundation::error::{ChoreoError, ChoreoResult};
use crate::foundation::math::Fnv1a64;

/// Decoded raster pixels.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Shared handle to a decoded image. Equality is by key and size, never by pixels.
#[derive(Clone, Debug, serde::Serialize)]
pub struct ImageHandle {
    pub key: String,
    pub width: u32,
    pub height: u32,
    #[serde(skip)]
    pub pixels: Arc<PreparedImage>,
}

impl PartialEq for ImageHandle {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.width == other.width && self.height == other.height
    }
}

impl ImageHandle {
    pub fn new(key: impl Into<String>, image: PreparedImage) -> Self {
        Self {
            key: key.into(),
            width: image.width,
            height: image.height,
            pixels: Arc::new(image),
        }
    }

    /// Content hash of the pixel data, stable across runs.
    pub fn content_hash(&self) -> u64 {
        let mut h = Fnv1a64::new_default();
        h.write_u64(u64::from(self.width));
        h.write_u64(u64::from(self.height));
        h.write_bytes(self.pixels.rgba8_premul.as_slice());
        h.finish()
    }
}

/// Resolves an asset path to a decoded image.
pub trait ImageLoader: Send + Sync {
    fn load(&self, path: &str) -> ChoreoResult<ImageHandle>;
}

/// Reads and decodes image files relative to a root directory.
///
/// Decodes are cached per path; the cache is read-mostly and filled under a write lock.
pub struct FsImageLoader {
    root: PathBuf,
    cache: RwLock<HashMap<String, ImageHandle>>,
}

impl FsImageLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cached_len(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }
}

impl ImageLoader for FsImageLoader {
    #[tracing::instrument(skip(self), fields(root = %self.root.display()))]
    fn load(&self, path: &str) -> ChoreoResult<ImageHandle> {
        if let Ok(cache) = self.cache.read()
            && let Some(hit) = cache.get(path)
        {
            return Ok(hit.clone());
        }

        let full = self.root.join(path);
        let bytes = std::fs::read(&full).map_err(|e| {
            ChoreoError::asset_missing(format!("image '{}': {e}", full.display()))
        })?;
        let handle = ImageHandle::new(path, decode_image(&bytes)?);
        tracing::debug!(width = handle.width, height = handle.height, "decoded image");

        let mut cache = self
            .cache
            .write()
            .map_err(|_| ChoreoError::render("image cache lock poisoned"))?;
        Ok(cache.entry(path.to_string()).or_insert(handle).clone())
    }
}

/// In-memory loader for generated or embedded images.
#[derive(Default)]
pub struct MemoryImageLoader {
    images: RwLock<HashMap<String, ImageHandle>>,
}

impl MemoryImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: &str, image: PreparedImage) -> ChoreoResult<()> {
        let mut images = self
            .images
            .write()
            .map_err(|_| ChoreoError::render("image cache lock poisoned"))?;
        images.insert(key.to_string(), ImageHandle::new(key, image));
        Ok(())
    }

    /// Solid straight-alpha RGBA8 image.
    pub fn insert_solid(&self, key: &str, width: u32, height: u32, rgba: [u8; 4]) -> ChoreoResult<()> {
        let a = u16::from(rgba[3]);
        let premul = |c: u8| ((u16::from(c) * a + 127) / 255) as u8;
        let px = [premul(rgba[0]), premul(rgba[1]), premul(rgba[2]), rgba[3]];
        let data = px.repeat(width as usize * height as usize);
        self.insert(
            key,
            PreparedImage {
                width,
                height,
                rgba8_premul: Arc::new(data),
            },
        )
    }
}

impl ImageLoader for MemoryImageLoader {
    fn load(&self, path: &str) -> ChoreoResult<ImageHandle> {
        let images = self
            .images
            .read()
            .map_err(|_| ChoreoError::render("image cache lock poisoned"))?;
        images
            .get(path)
            .cloned()
            .ok_or_else(|| ChoreoError::asset_missing(format!("image '{path}' not registered")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/image.rs"]
mod tests;
