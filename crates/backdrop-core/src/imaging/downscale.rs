//! Bounded wallpaper downscaling
//!
//! Fits the image inside `max_width` x `max_height` (never upscaling) and
//! re-encodes it as JPEG. While the encoded size exceeds the ceiling, the
//! bounds shrink by 0.8 and the quality by 0.9, up to `max_attempts` tries.
//! Transparency is composited onto black, since JPEG has no alpha channel.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::errors::{BdError, BdErrorKind, Result};

/// 1 MiB
pub const DEFAULT_SIZE_CEILING: usize = 1024 * 1024;

const DIMENSION_STEP: f64 = 0.8;
const QUALITY_STEP: f32 = 0.9;

/// Downscaling limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct DownscaleOptions {
    pub max_width: u32,
    pub max_height: u32,
    /// Lossy quality in (0, 1]
    pub quality: f32,
    /// Encoded byte length that ends the shrinking loop
    pub size_ceiling: usize,
    pub max_attempts: u32,
}

impl Default for DownscaleOptions {
    fn default() -> Self {
        Self {
            max_width: 1920,
            max_height: 1080,
            quality: 0.7,
            size_ceiling: DEFAULT_SIZE_CEILING,
            max_attempts: 10,
        }
    }
}

impl DownscaleOptions {
    /// # Errors
    ///
    /// Returns `InvalidInput` for zero bounds, zero attempts, a zero ceiling
    /// or a quality outside (0, 1].
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| {
            Err(BdError::new(BdErrorKind::InvalidInput)
                .with_op("downscale_options")
                .with_message(msg))
        };
        if self.max_width == 0 || self.max_height == 0 {
            return invalid(format!(
                "bounds must be positive, got {}x{}",
                self.max_width, self.max_height
            ));
        }
        if !(self.quality > 0.0 && self.quality <= 1.0) {
            return invalid(format!("quality must be in (0, 1], got {}", self.quality));
        }
        if self.size_ceiling == 0 {
            return invalid("size_ceiling must be positive".to_string());
        }
        if self.max_attempts == 0 {
            return invalid("max_attempts must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Result of [`downscale`]
#[derive(Debug, Clone, PartialEq)]
pub struct Downscaled {
    /// JPEG-encoded bytes
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub source_width: u32,
    pub source_height: u32,
    /// Quality used for the returned encoding
    pub quality: f32,
    /// Number of encodings performed
    pub attempts: u32,
    /// False when the attempt cap was hit and the smallest attempt was returned
    pub ceiling_met: bool,
}

/// Scale `(width, height)` uniformly to fit inside the bounds
///
/// Returns the input unchanged when it already fits. Results are floored and
/// never below one pixel.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }
    let ratio = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    );
    let scaled = |value: u32, bound: u32| ((value as f64 * ratio).floor() as u32).clamp(1, bound);
    (scaled(width, max_width), scaled(height, max_height))
}

fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Composite onto an opaque black background
pub fn flatten_onto_black(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let over_black = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
        Rgb([over_black(r), over_black(g), over_black(b)])
    })
}

fn encode_jpeg(image: &DynamicImage, quality: f32) -> Result<Vec<u8>> {
    let rgb = flatten_onto_black(image);
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, jpeg_quality(quality))
        .encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| {
            BdError::new(BdErrorKind::EncodeFailed)
                .with_op("downscale")
                .with_message(e.to_string())
        })?;
    Ok(out)
}

/// Downscale and re-encode raw image bytes
///
/// # Errors
///
/// Returns `InvalidInput` for bad options, `DecodeFailed` if the bytes are
/// not a supported image, and `EncodeFailed` if JPEG encoding fails.
/// Exhausting `max_attempts` is not an error: the smallest attempt comes
/// back with `ceiling_met = false`.
pub fn downscale(bytes: &[u8], options: &DownscaleOptions) -> Result<Downscaled> {
    options.validate()?;

    let source = image::load_from_memory(bytes).map_err(|e| {
        BdError::new(BdErrorKind::DecodeFailed)
            .with_op("downscale")
            .with_message(e.to_string())
    })?;
    let (source_width, source_height) = (source.width(), source.height());

    let (mut bound_width, mut bound_height) = (options.max_width, options.max_height);
    let mut quality = options.quality;
    let mut best: Option<Downscaled> = None;

    for attempt in 1..=options.max_attempts {
        let (width, height) = fit_within(source_width, source_height, bound_width, bound_height);
        let encoded = if (width, height) == (source_width, source_height) {
            encode_jpeg(&source, quality)?
        } else {
            encode_jpeg(
                &source.resize_exact(width, height, FilterType::Triangle),
                quality,
            )?
        };

        let candidate = Downscaled {
            ceiling_met: encoded.len() <= options.size_ceiling,
            bytes: encoded,
            width,
            height,
            source_width,
            source_height,
            quality,
            attempts: attempt,
        };

        if candidate.ceiling_met {
            tracing::debug!(
                source_width,
                source_height,
                width,
                height,
                attempts = attempt,
                byte_len = candidate.bytes.len(),
                "downscaled image"
            );
            return Ok(candidate);
        }

        let smaller = best
            .as_ref()
            .map_or(true, |b| candidate.bytes.len() < b.bytes.len());
        if smaller {
            best = Some(candidate);
        }

        bound_width = ((width as f64 * DIMENSION_STEP).floor() as u32).max(1);
        bound_height = ((height as f64 * DIMENSION_STEP).floor() as u32).max(1);
        quality *= QUALITY_STEP;
    }

    let mut best = best.ok_or_else(|| {
        BdError::new(BdErrorKind::Internal)
            .with_op("downscale")
            .with_message("no encoding attempt was made")
    })?;
    best.attempts = options.max_attempts;
    tracing::warn!(
        byte_len = best.bytes.len(),
        size_ceiling = options.size_ceiling,
        attempts = options.max_attempts,
        "downscale attempt cap reached, keeping smallest encoding"
    );
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        let mut out = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    fn decoded_dims(bytes: &[u8]) -> (u32, u32) {
        let img = image::load_from_memory(bytes).unwrap();
        (img.width(), img.height())
    }

    #[test]
    fn test_flatten_composites_alpha_onto_black() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(3, 1, |x, _| match x {
            0 => Rgba([255, 255, 255, 0]),
            1 => Rgba([200, 100, 50, 255]),
            _ => Rgba([200, 100, 50, 128]),
        }));

        let flat = flatten_onto_black(&img);

        assert_eq!(flat.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(flat.get_pixel(1, 0), &Rgb([200, 100, 50]));
        assert_eq!(flat.get_pixel(2, 0), &Rgb([100, 50, 25]));
    }

    #[test]
    fn test_transparent_source_encodes_as_black() {
        let img = RgbaImage::from_pixel(16, 16, Rgba([255, 255, 255, 0]));
        let mut source = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut source), ImageFormat::Png)
            .unwrap();

        let result = downscale(&source, &DownscaleOptions::default()).unwrap();

        let decoded = image::load_from_memory(&result.bytes).unwrap().to_rgb8();
        assert!(decoded.pixels().all(|p| p.0.iter().all(|&c| c < 8)));
    }

    #[test]
    fn test_fit_within() {
        assert_eq!(fit_within(2000, 1200, 1920, 1080), (1800, 1080));
        assert_eq!(fit_within(800, 600, 1920, 1080), (800, 600));
        assert_eq!(fit_within(4000, 1000, 1920, 1080), (1920, 480));
        assert_eq!(fit_within(10_000, 1, 100, 100), (100, 1));
    }

    #[test]
    fn test_downscale_fits_bounds() {
        let result = downscale(&png(2000, 1200), &DownscaleOptions::default()).unwrap();

        assert_eq!((result.width, result.height), (1800, 1080));
        assert_eq!(decoded_dims(&result.bytes), (1800, 1080));
        assert!(result.ceiling_met);
        assert_eq!(result.attempts, 1);
    }

    #[test]
    fn test_downscale_never_upscales() {
        let result = downscale(&png(320, 200), &DownscaleOptions::default()).unwrap();
        assert_eq!(decoded_dims(&result.bytes), (320, 200));
    }

    #[test]
    fn test_output_is_jpeg() {
        let result = downscale(&png(64, 64), &DownscaleOptions::default()).unwrap();
        assert_eq!(
            image::guess_format(&result.bytes).unwrap(),
            ImageFormat::Jpeg
        );
    }

    #[test]
    fn test_attempt_cap_returns_smallest() {
        let options = DownscaleOptions {
            size_ceiling: 1,
            max_attempts: 4,
            ..DownscaleOptions::default()
        };
        let result = downscale(&png(400, 300), &options).unwrap();

        assert!(!result.ceiling_met);
        assert_eq!(result.attempts, 4);
        assert!(result.width < 400 && result.height < 300);
        assert!(result.quality < options.quality);
    }

    #[test]
    fn test_shrinks_until_under_ceiling() {
        let first = downscale(&png(600, 400), &DownscaleOptions::default()).unwrap();
        let options = DownscaleOptions {
            size_ceiling: first.bytes.len() - 1,
            ..DownscaleOptions::default()
        };
        let result = downscale(&png(600, 400), &options).unwrap();

        assert!(result.ceiling_met);
        assert!(result.attempts >= 2);
        assert!(result.bytes.len() <= options.size_ceiling);
        assert_eq!((result.width, result.height), (480, 320));
    }

    #[test]
    fn test_decode_failure() {
        let err = downscale(b"not an image", &DownscaleOptions::default()).unwrap_err();
        assert_eq!(err.kind(), BdErrorKind::DecodeFailed);
    }

    #[test]
    fn test_invalid_options() {
        let options = DownscaleOptions {
            quality: 1.5,
            ..DownscaleOptions::default()
        };
        assert_eq!(
            options.validate().unwrap_err().kind(),
            BdErrorKind::InvalidInput
        );
        let options = DownscaleOptions {
            max_attempts: 0,
            ..DownscaleOptions::default()
        };
        assert!(options.validate().is_err());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn fit_within_respects_bounds(
                width in 1u32..10_000,
                height in 1u32..10_000,
                max_width in 1u32..4_000,
                max_height in 1u32..4_000,
            ) {
                let (w, h) = fit_within(width, height, max_width, max_height);
                prop_assert!(w <= max_width && h <= max_height);
                prop_assert!(w <= width && h <= height);
                prop_assert!(w >= 1 && h >= 1);
            }

            #[test]
            fn fit_within_is_identity_inside_bounds(
                width in 1u32..2_000,
                height in 1u32..2_000,
            ) {
                prop_assert_eq!(fit_within(width, height, 2_000, 2_000), (width, height));
            }
        }
    }
}
