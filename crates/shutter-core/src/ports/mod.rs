//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod image_store;
mod repository;
mod session;

pub use auth::PasswordService;
pub use image_store::{ImageStore, ImageStoreError, storage_key};
pub use repository::{BaseRepository, CommentRepository, PostRepository, UserRepository};
pub use session::{SessionData, SessionError, SessionStore};
