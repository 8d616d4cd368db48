//! Image transcoder: WebP conversion, bounded downscale, responsive variants.
//!
//! The conversion rules mirror what the storefront serves: raster images
//! become lossy WebP inside a bounding box, SVG stays vector, GIF keeps its
//! animation. Dimensions reported to callers are always measured from the
//! encoded output, not the pre-resize input.

use std::collections::BTreeMap;
use std::io::Cursor;

use bytes::Bytes;
use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::{AnimationDecoder, DynamicImage, GenericImageView, ImageReader};

use aurelia_core::constants::{
    DEFAULT_MAX_HEIGHT, DEFAULT_MAX_WIDTH, DEFAULT_THUMBNAIL_SIZE, DEFAULT_WEBP_QUALITY,
};

const THUMBNAIL_WEBP_QUALITY: f32 = 80.0;
const RESPONSIVE_WEBP_QUALITY: f32 = 85.0;

/// Moderate WebP effort: throughput over marginal size savings.
const WEBP_METHOD: i32 = 4;

/// GIF re-encode speed (1 = slowest/best compression, 30 = fastest).
const GIF_ENCODE_SPEED: i32 = 5;

/// Image processing errors
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("WebP encoding failed: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Processing options for WebP conversion.
///
/// Every recognized option is an enumerated, typed field; defaults apply
/// when a caller does not override them.
#[derive(Debug, Clone, Copy)]
pub struct ProcessingOptions {
    /// WebP lossy quality, 1-100.
    pub quality: u8,
    /// Upper bound on width before a proportional downscale.
    pub max_width: u32,
    /// Upper bound on height before a proportional downscale.
    pub max_height: u32,
    pub create_thumbnail: bool,
    /// Edge of the square cover-fit thumbnail, in pixels.
    pub thumbnail_size: u32,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        ProcessingOptions {
            quality: DEFAULT_WEBP_QUALITY,
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            create_thumbnail: false,
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
        }
    }
}

/// Output of a WebP conversion.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub buffer: Bytes,
    pub original_size: usize,
    pub processed_size: usize,
    /// Dimensions of the encoded output.
    pub width: u32,
    pub height: u32,
    pub mime_type: String,
    /// Percentage reduction relative to the input. Informational only.
    pub compression_ratio: i32,
}

/// ProcessedImage plus an optional square thumbnail.
#[derive(Debug, Clone)]
pub struct ProcessedImageWithThumbnail {
    pub image: ProcessedImage,
    pub thumbnail: Option<Bytes>,
    pub thumbnail_width: Option<u32>,
    pub thumbnail_height: Option<u32>,
}

/// Which path an upload took through the transcoder.
///
/// Conversion is a best-effort optimization: a file that cannot be decoded
/// is uploaded as-is, and callers can observe which path was taken.
#[derive(Debug)]
pub enum ConversionOutcome {
    Converted(ProcessedImage),
    Unconverted { reason: String },
}

/// Image transcoder: stateless, synchronous transformations.
pub struct ImageTranscoder;

impl ImageTranscoder {
    /// Whether the MIME type declares any image at all.
    pub fn is_image(mime_type: &str) -> bool {
        mime_type.starts_with("image/")
    }

    /// Whether an upload with this MIME type should be converted to WebP.
    ///
    /// SVG stays vector (rasterizing would lose scalability), GIF may carry
    /// animation a naive conversion would drop, and WebP needs no reprocessing.
    pub fn should_convert(mime_type: &str) -> bool {
        Self::is_image(mime_type)
            && !mime_type.contains("svg")
            && !mime_type.contains("gif")
            && !mime_type.contains("webp")
    }

    /// Convert to WebP at the given quality, downscaling proportionally when
    /// the input exceeds the configured bounding box. Never upscales.
    pub fn process_image(
        data: &[u8],
        options: &ProcessingOptions,
    ) -> Result<ProcessedImage, ProcessingError> {
        let original_size = data.len();
        let img = Self::decode(data)?;
        let (width, height) = img.dimensions();

        let img = if width > options.max_width || height > options.max_height {
            let (target_width, target_height) =
                fit_within(width, height, options.max_width, options.max_height);
            let filter = select_filter(width, height, target_width, target_height);
            img.resize_exact(target_width, target_height, filter)
        } else {
            img
        };

        let buffer = Self::encode_webp(&img, options.quality as f32)?;
        let (out_width, out_height) = Self::decode(&buffer)?.dimensions();

        let processed_size = buffer.len();
        Ok(ProcessedImage {
            buffer: Bytes::from(buffer),
            original_size,
            processed_size,
            width: out_width,
            height: out_height,
            mime_type: "image/webp".to_string(),
            compression_ratio: compression_ratio(original_size, processed_size),
        })
    }

    /// Convert to WebP and additionally produce a square cover-fit thumbnail.
    pub fn process_image_with_thumbnail(
        data: &[u8],
        options: &ProcessingOptions,
    ) -> Result<ProcessedImageWithThumbnail, ProcessingError> {
        let image = Self::process_image(data, options)?;

        let source = Self::decode(data)?;
        let (width, height) = source.dimensions();
        let filter = select_filter(width, height, options.thumbnail_size, options.thumbnail_size);
        let thumb = source.resize_to_fill(options.thumbnail_size, options.thumbnail_size, filter);
        let thumb_bytes = Self::encode_webp(&thumb, THUMBNAIL_WEBP_QUALITY)?;
        let (thumb_width, thumb_height) = Self::decode(&thumb_bytes)?.dimensions();

        Ok(ProcessedImageWithThumbnail {
            image,
            thumbnail: Some(Bytes::from(thumb_bytes)),
            thumbnail_width: Some(thumb_width),
            thumbnail_height: Some(thumb_height),
        })
    }

    /// Optimize without changing format.
    ///
    /// GIF is re-encoded with its animation frames intact; SVG passes through
    /// unchanged (hook for a future vector optimizer); everything else passes
    /// through unchanged.
    pub fn optimize_without_format_change(
        data: &[u8],
        mime_type: &str,
    ) -> Result<Vec<u8>, ProcessingError> {
        match mime_type {
            "image/gif" => {
                let decoder = GifDecoder::new(Cursor::new(data))?;
                let frames = decoder.into_frames().collect_frames()?;

                let mut out = Vec::new();
                {
                    let mut encoder = GifEncoder::new_with_speed(&mut out, GIF_ENCODE_SPEED);
                    encoder.set_repeat(Repeat::Infinite)?;
                    encoder.encode_frames(frames)?;
                }
                Ok(out)
            }
            "image/svg+xml" => Ok(data.to_vec()),
            _ => Ok(data.to_vec()),
        }
    }

    /// Generate width-bounded WebP variants for responsive serving.
    ///
    /// Widths greater than the intrinsic width are skipped, not upscaled;
    /// skipped widths are simply absent from the returned map.
    pub fn generate_responsive_sizes(
        data: &[u8],
        sizes: &[u32],
    ) -> Result<BTreeMap<u32, Vec<u8>>, ProcessingError> {
        let img = Self::decode(data)?;
        let (width, height) = img.dimensions();

        let mut variants = BTreeMap::new();
        for &size in sizes {
            if size > width {
                continue;
            }

            let (target_width, target_height) = fit_within(width, height, size, u32::MAX);
            let filter = select_filter(width, height, target_width, target_height);
            let resized = img.resize_exact(target_width, target_height, filter);
            variants.insert(size, Self::encode_webp(&resized, RESPONSIVE_WEBP_QUALITY)?);
        }

        Ok(variants)
    }

    /// Run the upload conversion policy for one file.
    ///
    /// Ineligible MIME types and undecodable payloads both yield
    /// `Unconverted`, carrying the reason; the caller uploads the original
    /// bytes in that case.
    pub fn convert_for_upload(
        data: &[u8],
        mime_type: &str,
        options: &ProcessingOptions,
    ) -> ConversionOutcome {
        if !Self::should_convert(mime_type) {
            return ConversionOutcome::Unconverted {
                reason: format!("content type {} is not converted", mime_type),
            };
        }

        match Self::process_image(data, options) {
            Ok(processed) => ConversionOutcome::Converted(processed),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    content_type = %mime_type,
                    "WebP conversion failed, uploading original"
                );
                ConversionOutcome::Unconverted {
                    reason: err.to_string(),
                }
            }
        }
    }

    fn decode(data: &[u8]) -> Result<DynamicImage, ProcessingError> {
        let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        Ok(reader.decode()?)
    }

    fn encode_webp(img: &DynamicImage, quality: f32) -> Result<Vec<u8>, ProcessingError> {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        let mut config = webp::WebPConfig::new()
            .map_err(|_| ProcessingError::Encode("failed to initialize WebP config".to_string()))?;
        config.quality = quality;
        config.method = WEBP_METHOD;

        let encoder = webp::Encoder::from_rgba(&rgba, width, height);
        let encoded = encoder
            .encode_advanced(&config)
            .map_err(|e| ProcessingError::Encode(format!("{:?}", e)))?;

        Ok(encoded.to_vec())
    }
}

/// Percentage reduction, rounded; 0 for an empty input.
pub fn compression_ratio(original_size: usize, processed_size: usize) -> i32 {
    if original_size == 0 {
        return 0;
    }
    ((1.0 - processed_size as f64 / original_size as f64) * 100.0).round() as i32
}

/// Contain `width x height` within `max_width x max_height`, preserving the
/// aspect ratio. Returns the input unchanged when it already fits.
fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let scale = (max_width as f64 / width as f64).min(max_height as f64 / height as f64);
    let target_width = ((width as f64 * scale).round() as u32).clamp(1, max_width);
    let target_height = ((height as f64 * scale).round() as u32).clamp(1, max_height);
    (target_width, target_height)
}

/// Select a resize filter based on the downscale ratio.
fn select_filter(
    orig_width: u32,
    orig_height: u32,
    new_width: u32,
    new_height: u32,
) -> image::imageops::FilterType {
    let width_ratio = orig_width as f32 / new_width as f32;
    let height_ratio = orig_height as f32 / new_height as f32;
    let max_ratio = width_ratio.max(height_ratio);

    if max_ratio > 2.0 {
        image::imageops::FilterType::Triangle
    } else if max_ratio > 1.5 {
        image::imageops::FilterType::CatmullRom
    } else {
        image::imageops::FilterType::Lanczos3
    }
}
