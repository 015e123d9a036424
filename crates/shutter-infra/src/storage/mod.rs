//! Image blob storage.

mod local;

pub use local::LocalImageStore;
