//! SeaORM entities mirroring the relational schema.

pub mod comment;
pub mod comment_count;
pub mod post;
pub mod user;
