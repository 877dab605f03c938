//! Object storage client for staging application packages.
//!
//! Uploads a blob as a `raw` resource to a Cloudinary-compatible
//! unsigned upload endpoint and returns the public URL, so that a
//! second service can fetch the file itself.

pub mod client;
pub mod types;

pub use client::Client;
pub use types::StorageConfig;
