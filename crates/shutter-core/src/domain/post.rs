use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Largest accepted upload, in bytes (10 MiB).
pub const UPLOAD_LIMIT: usize = 10 * 1024 * 1024;

/// The three image types a post may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageMime {
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/gif")]
    Gif,
}

impl ImageMime {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Png => "image/png",
            ImageMime::Gif => "image/gif",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageMime::Jpeg => "jpg",
            ImageMime::Png => "png",
            ImageMime::Gif => "gif",
        }
    }

    /// Exact lookup of a stored MIME string.
    pub fn parse(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" => Some(ImageMime::Jpeg),
            "image/png" => Some(ImageMime::Png),
            "image/gif" => Some(ImageMime::Gif),
            _ => None,
        }
    }

    /// Loose lookup of a client-declared content type (`image/pjpeg`, `image/png; x=y`, ...).
    pub fn sniff_content_type(content_type: &str) -> Option<Self> {
        if content_type.contains("jpeg") {
            Some(ImageMime::Jpeg)
        } else if content_type.contains("png") {
            Some(ImageMime::Png)
        } else if content_type.contains("gif") {
            Some(ImageMime::Gif)
        } else {
            None
        }
    }
}

/// File extension for a stored MIME string; empty for unrecognized legacy rows.
pub fn extension_for_mime(mime: &str) -> &'static str {
    ImageMime::parse(mime).map(ImageMime::extension).unwrap_or("")
}

/// Post row as the feed sees it. Image bytes are never loaded here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub user_id: i32,
    pub body: String,
    pub mime: String,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Public path the image of this post is served under.
    pub fn image_url(&self) -> String {
        match extension_for_mime(&self.mime) {
            "" => format!("/image/{}", self.id),
            ext => format!("/image/{}.{}", self.id, ext),
        }
    }
}

/// Insert payload for an upload.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: i32,
    pub body: String,
    pub mime: ImageMime,
    pub imgdata: Vec<u8>,
}
