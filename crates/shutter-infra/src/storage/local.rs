//! Local filesystem implementation of `ImageStore`.
//!
//! Blobs live flat under one directory as `{post_id}.{ext}`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use shutter_core::domain::{ImageMime, extension_for_mime};
use shutter_core::ports::{ImageStore, ImageStoreError, storage_key};

pub struct LocalImageStore {
    root: PathBuf,
}

impl LocalImageStore {
    /// Open the store, creating the directory if needed.
    pub async fn init(root: impl Into<PathBuf>) -> Result<Self, ImageStoreError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| ImageStoreError::Io(format!("{}: {}", root.display(), e)))?;

        tracing::info!(root = %root.display(), "Image store ready");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn store(
        &self,
        post_id: i32,
        mime: ImageMime,
        bytes: &[u8],
    ) -> Result<String, ImageStoreError> {
        let key = storage_key(post_id, mime.as_str())
            .ok_or_else(|| ImageStoreError::UnsupportedMime(mime.as_str().to_string()))?;
        let path = self.path_for(&key);

        fs::write(&path, bytes)
            .await
            .map_err(|e| ImageStoreError::Io(format!("{}: {}", path.display(), e)))?;

        tracing::debug!(post_id, bytes = bytes.len(), path = %path.display(), "Stored image");
        Ok(path.display().to_string())
    }

    async fn retrieve(
        &self,
        post_id: i32,
        mime: &str,
        requested_ext: &str,
    ) -> Result<Vec<u8>, ImageStoreError> {
        let ext = extension_for_mime(mime);
        if ext.is_empty() || ext != requested_ext {
            return Err(ImageStoreError::NotFound);
        }

        let path = self.path_for(&format!("{post_id}.{ext}"));
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(post_id, path = %path.display(), "Image blob missing");
                Err(ImageStoreError::NotFound)
            }
            Err(e) => Err(ImageStoreError::Io(format!("{}: {}", path.display(), e))),
        }
    }
}
