//! Shared constants.

/// Prefix under which every uploaded object is keyed in the blob store.
pub const UPLOAD_KEY_PREFIX: &str = "uploads";

/// Prefix for ledger entry ids.
pub const LEDGER_ID_PREFIX: &str = "media";

/// Schema version written into the ledger document.
pub const LEDGER_VERSION: &str = "1.0";

/// Default WebP quality for converted uploads.
pub const DEFAULT_WEBP_QUALITY: u8 = 85;

/// Default bounding box applied before WebP conversion.
pub const DEFAULT_MAX_WIDTH: u32 = 2560;
pub const DEFAULT_MAX_HEIGHT: u32 = 2560;

/// Default square thumbnail edge in pixels.
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 300;

/// Widths produced by the responsive-variant generator when none are given.
pub const DEFAULT_RESPONSIVE_WIDTHS: [u32; 4] = [320, 640, 1024, 1920];
