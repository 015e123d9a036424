//! Image blob storage port.

use async_trait::async_trait;

use crate::domain::{ImageMime, extension_for_mime};

/// Content-addressed blob store keyed by `{post_id}.{ext}`.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Write the bytes of a post's image, returning the storage path.
    async fn store(
        &self,
        post_id: i32,
        mime: ImageMime,
        bytes: &[u8],
    ) -> Result<String, ImageStoreError>;

    /// Read the image of a post.
    ///
    /// `requested_ext` must equal the extension implied by the post's stored
    /// MIME type, otherwise the result is `NotFound`.
    async fn retrieve(
        &self,
        post_id: i32,
        mime: &str,
        requested_ext: &str,
    ) -> Result<Vec<u8>, ImageStoreError>;
}

/// Storage key for a post image, `None` when the MIME type has no extension.
pub fn storage_key(post_id: i32, mime: &str) -> Option<String> {
    match extension_for_mime(mime) {
        "" => None,
        ext => Some(format!("{post_id}.{ext}")),
    }
}

/// Image store errors.
#[derive(Debug, thiserror::Error)]
pub enum ImageStoreError {
    #[error("Image not found")]
    NotFound,

    #[error("Unsupported image type: {0}")]
    UnsupportedMime(String),

    #[error("Storage I/O failed: {0}")]
    Io(String),
}
