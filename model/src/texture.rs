use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Metadata of a loaded tileset image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureInfo {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Loads tileset images on behalf of the document.
///
/// Decoding and GPU upload live outside the document model; the model only
/// needs to know whether a texture is available and how large it is.
pub trait TextureLoader {
    /// Returns `None` if the texture could not be loaded.
    fn load(&self, path: &Path) -> Option<TextureInfo>;
}

/// A [`TextureLoader`] backed by a fixed table of known textures.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTextureLoader {
    textures: HashMap<PathBuf, (u32, u32)>,
}

impl InMemoryTextureLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_texture(mut self, path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        self.insert(path, width, height);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, width: u32, height: u32) {
        self.textures.insert(path.into(), (width, height));
    }

    pub fn remove(&mut self, path: &Path) -> bool {
        self.textures.remove(path).is_some()
    }
}

impl TextureLoader for InMemoryTextureLoader {
    fn load(&self, path: &Path) -> Option<TextureInfo> {
        let (width, height) = *self.textures.get(path)?;
        Some(TextureInfo {
            path: path.to_path_buf(),
            width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_known_textures_only() {
        let loader = InMemoryTextureLoader::new().with_texture("tiles/terrain.png", 256, 128);

        let info = loader.load(Path::new("tiles/terrain.png")).unwrap();
        assert_eq!((info.width, info.height), (256, 128));
        assert!(loader.load(Path::new("tiles/missing.png")).is_none());
    }
}
