//! # Shutter Infrastructure
//!
//! Concrete implementations of the ports defined in `shutter-core`.
//! This crate contains the relational store, credential digest, image blob
//! store and session store.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory and filesystem only
//! - `postgres` - PostgreSQL database support via SeaORM
//! - `auth` - SHA-512 credential digest

pub mod database;
pub mod session;
pub mod storage;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - always available
pub use database::{DatabaseConfig, DatabaseConnections};
pub use session::InMemorySessionStore;
pub use storage::LocalImageStore;

#[cfg(feature = "auth")]
pub use auth::Sha512PasswordService;

#[cfg(feature = "postgres")]
pub use database::{PostgresCommentRepository, PostgresPostRepository, PostgresUserRepository};
