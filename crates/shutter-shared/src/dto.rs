//! Data Transfer Objects - form and query payloads.

use serde::{Deserialize, Serialize};

/// Login form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginForm {
    pub account_name: String,
    pub password: String,
}

/// Registration form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterForm {
    pub account_name: String,
    pub password: String,
}

/// Comment submission form. `post_id` stays textual so a malformed id can be
/// answered with 400 instead of a generic form rejection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentForm {
    pub post_id: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub csrf_token: String,
}

/// Cursor for the paginated feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostsQuery {
    pub max_created_at: Option<String>,
}

/// Ban form: repeated `uid[]` fields plus the CSRF token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BanForm {
    pub user_ids: Vec<i32>,
    pub csrf_token: String,
}

impl BanForm {
    /// Build from raw urlencoded pairs. Non-numeric ids are skipped.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "uid[]" => {
                    if let Ok(id) = value.parse() {
                        form.user_ids.push(id);
                    }
                }
                "csrf_token" => form.csrf_token = value,
                _ => {}
            }
        }
        form
    }
}
