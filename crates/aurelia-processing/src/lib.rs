//! Aurelia image processing
//!
//! This crate provides the image normalization pipeline used by uploads:
//! - WebP conversion with bounded downscale (transcoder)
//! - Format-preserving optimization for GIF/SVG (transcoder)
//! - Responsive width variants (transcoder)
//! - Upload validation rules (validator)
//!
//! Everything here is pure and synchronous; callers run the CPU-bound parts
//! under `tokio::task::spawn_blocking`.

pub mod transcoder;
pub mod validator;

pub use transcoder::{
    ConversionOutcome, ImageTranscoder, ProcessedImage, ProcessedImageWithThumbnail,
    ProcessingError, ProcessingOptions,
};
pub use validator::{MediaValidator, ValidationError};
