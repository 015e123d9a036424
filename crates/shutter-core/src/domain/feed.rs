use serde::Serialize;

use super::{CommentWithAuthor, Post, User};

/// Display-ready post: the row plus author, comments, counter and CSRF token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedItem {
    #[serde(flatten)]
    pub post: Post,
    pub image_url: String,
    pub user: User,
    /// Ascending by creation time.
    pub comments: Vec<CommentWithAuthor>,
    /// True total, independent of how many comments are attached.
    pub comment_count: i64,
    pub csrf_token: String,
}

/// Per-user totals shown on a profile page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub post_count: u64,
    pub comment_count: u64,
    pub commented_count: u64,
}
