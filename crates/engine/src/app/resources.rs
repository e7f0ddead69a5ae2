use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;
use tracing::debug;

/// A decoded RGBA image ready to blit.
#[derive(Debug, Clone)]
pub struct ImageResource {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("resource not found: {key}")]
    NotFound { key: String },
    #[error("failed to load resource '{key}' from {path}: {source}")]
    Load {
        key: String,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Explicitly constructed image store: scenes register string keys against
/// paths at initialize time; decoding happens lazily on first lookup and the
/// result is cached for the process lifetime.
#[derive(Debug, Default)]
pub struct ResourceStore {
    paths: HashMap<String, PathBuf>,
    images: HashMap<String, ImageResource>,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: &str, path: impl AsRef<Path>) {
        self.paths.insert(key.to_string(), path.as_ref().to_path_buf());
    }

    pub fn is_registered(&self, key: &str) -> bool {
        self.paths.contains_key(key)
    }

    pub fn image(&mut self, key: &str) -> Result<&ImageResource, ResourceError> {
        if !self.images.contains_key(key) {
            let path = self.paths.get(key).ok_or_else(|| ResourceError::NotFound {
                key: key.to_string(),
            })?;
            let reader = ImageReader::open(path).map_err(|source| ResourceError::Load {
                key: key.to_string(),
                path: path.clone(),
                source: image::ImageError::IoError(source),
            })?;
            let decoded = reader.decode().map_err(|source| ResourceError::Load {
                key: key.to_string(),
                path: path.clone(),
                source,
            })?;
            let rgba = decoded.to_rgba8();
            debug!(key, width = rgba.width(), height = rgba.height(), "resource_decoded");
            self.images.insert(
                key.to_string(),
                ImageResource {
                    width: rgba.width(),
                    height: rgba.height(),
                    rgba: rgba.into_raw(),
                },
            );
        }
        // The entry was either present or inserted just above.
        self.images.get(key).ok_or_else(|| ResourceError::NotFound {
            key: key.to_string(),
        })
    }
}
