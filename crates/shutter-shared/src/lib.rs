//! # Shutter Shared
//!
//! Request and response types exchanged with browsers and templates.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
