//! Aurelia Storage Library
//!
//! This crate provides the blob store gateway and its implementations.
//! It includes the Storage trait and implementations for S3 and local
//! filesystem.
//!
//! # Storage key format
//!
//! Uploaded objects are keyed `uploads/{unix_millis}-{token}-{filename}`,
//! where `token` is a short random string that keeps keys unique even for
//! two files uploaded within the same millisecond. Keys must not contain
//! `..` or a leading `/`. Key generation is centralized in the `keys`
//! module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use aurelia_core::StorageBackend;
pub use factory::create_storage;
pub use keys::generate_upload_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
