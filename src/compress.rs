//! Two-step JPEG recompression for oversized photos.

use crate::config::CompressionConfig;
use crate::errors::CameraError;
use crate::sizing;
use crate::types::{EncodedImage, Viewport};
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

/// Encodes a decoded image as JPEG at a given quality
pub trait JpegEncode: Send + Sync {
    fn encode(&self, image: &DynamicImage, quality: u8) -> Result<Bytes, CameraError>;
}

/// `image` crate JPEG encoder
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageJpegEncoder;

impl JpegEncode for ImageJpegEncoder {
    fn encode(&self, image: &DynamicImage, quality: u8) -> Result<Bytes, CameraError> {
        encode_jpeg(image, quality)
    }
}

/// Encode any image as JPEG. Alpha is dropped since JPEG cannot carry it.
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Bytes, CameraError> {
    let rgb = image.to_rgb8();
    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
    rgb.write_with_encoder(encoder)?;
    Ok(Bytes::from(out))
}

/// Byte budget and the two qualities tried against it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionPolicy {
    pub max_bytes: usize,
    pub qualities: [u8; 2],
    pub resize_to_viewport: bool,
}

impl CompressionPolicy {
    pub fn from_config(config: &CompressionConfig) -> Self {
        Self {
            max_bytes: config.max_bytes,
            qualities: [config.first_quality, config.second_quality],
            resize_to_viewport: config.resize_to_viewport,
        }
    }
}

impl Default for CompressionPolicy {
    fn default() -> Self {
        Self {
            max_bytes: 2 * 1024 * 1024,
            qualities: [80, 70],
            resize_to_viewport: true,
        }
    }
}

/// Result of a compression pass
#[derive(Debug, Clone)]
pub struct CompressionOutcome {
    pub image: EncodedImage,
    /// Number of JPEG encodes performed (0 when the input already fit)
    pub attempts: u8,
    pub within_budget: bool,
}

/// Bring `image` under the policy's byte budget.
///
/// Images already within budget pass through untouched. Otherwise the image is
/// decoded, optionally downscaled to its display geometry in `viewport`, and
/// re-encoded at the first quality; if that is still too large, once more at
/// the second quality. The first result within budget wins; if neither fits,
/// the smaller of the two is returned.
pub fn compress_to_budget(
    image: &EncodedImage,
    viewport: Viewport,
    policy: &CompressionPolicy,
    encoder: &dyn JpegEncode,
) -> Result<CompressionOutcome, CameraError> {
    if image.size_bytes() <= policy.max_bytes {
        return Ok(CompressionOutcome {
            image: image.clone(),
            attempts: 0,
            within_budget: true,
        });
    }

    log::debug!(
        "Photo is {} bytes, over the {} byte budget; recompressing",
        image.size_bytes(),
        policy.max_bytes
    );

    let decoded = image::load_from_memory(&image.data)?;
    let decoded = if policy.resize_to_viewport {
        downscale_to_viewport(decoded, viewport)
    } else {
        decoded
    };
    let (width, height) = (decoded.width(), decoded.height());

    let mut best: Option<EncodedImage> = None;
    let mut attempts = 0u8;

    for quality in policy.qualities {
        let data = encoder.encode(&decoded, quality)?;
        attempts += 1;
        let candidate = EncodedImage::jpeg(data, quality, width, height);
        log::debug!(
            "Re-encode attempt {} at quality {}: {} bytes",
            attempts,
            quality,
            candidate.size_bytes()
        );

        if candidate.size_bytes() <= policy.max_bytes {
            return Ok(CompressionOutcome {
                image: candidate,
                attempts,
                within_budget: true,
            });
        }

        best = match best {
            Some(prev) if prev.size_bytes() <= candidate.size_bytes() => Some(prev),
            _ => Some(candidate),
        };
    }

    let image = best.ok_or_else(|| CameraError::EncodingError("no quality levels configured".to_string()))?;
    log::warn!(
        "Photo still {} bytes after {} attempts (budget {})",
        image.size_bytes(),
        attempts,
        policy.max_bytes
    );

    Ok(CompressionOutcome {
        image,
        attempts,
        within_budget: false,
    })
}

/// Scale down to the display geometry; never scale up
fn downscale_to_viewport(image: DynamicImage, viewport: Viewport) -> DynamicImage {
    let Some(geometry) = sizing::fit_pixels(image.width(), image.height(), viewport) else {
        return image;
    };
    let (width, height) = geometry.pixel_size();
    // Fit keeps the aspect ratio; rounded height may equal the source height
    if width >= image.width() {
        return image;
    }
    image.resize_exact(width, height, FilterType::Triangle)
}
