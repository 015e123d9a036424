//! Domain entities - the core business objects.

mod comment;
mod feed;
mod post;
mod user;

pub use comment::{Comment, CommentCount, CommentWithAuthor, NewComment};
pub use feed::{FeedItem, UserStats};
pub use post::{ImageMime, NewPost, Post, UPLOAD_LIMIT, extension_for_mime};
pub use user::{NewUser, User, validate_registration};
