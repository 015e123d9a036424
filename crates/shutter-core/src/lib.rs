//! # Shutter Core
//!
//! The domain layer of the Shutter photo-sharing service: entities, ports,
//! the feed aggregation engine and account rules. No infrastructure
//! dependencies live here.

pub mod accounts;
pub mod domain;
pub mod error;
pub mod feed;
pub mod ports;

pub use accounts::AccountService;
pub use error::{DomainError, RepoError};
pub use feed::{CommentMode, FeedAssembler, FeedError, POSTS_PER_PAGE};
