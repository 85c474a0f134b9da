//! Mean perceptual luminance
//!
//! Luminance per pixel is `0.299 R + 0.587 G + 0.114 B`, averaged over the
//! whole image and normalized to [0, 1]. Fully transparent pixels read as
//! black; any other alpha value is ignored.

use image::DynamicImage;
use serde::Serialize;

/// Returned when the image cannot be decoded
pub const NEUTRAL_LUMINANCE: f64 = 0.5;

/// Luminance above this is a light background
pub const TONE_THRESHOLD: f64 = 0.5;

/// Background tone, which decides the foreground style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    /// Light background: use dark foreground text
    Light,
    /// Dark background: use light foreground text
    Dark,
}

impl Tone {
    /// Strictly above [`TONE_THRESHOLD`] is light
    pub fn from_luminance(luminance: f64) -> Self {
        if luminance > TONE_THRESHOLD {
            Tone::Light
        } else {
            Tone::Dark
        }
    }
}

/// Luminance together with its classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Brightness {
    pub luminance: f64,
    pub tone: Tone,
    /// False when the neutral default was substituted
    pub decoded: bool,
}

impl Brightness {
    /// The value substituted when no image could be analyzed
    pub fn neutral() -> Self {
        Self {
            luminance: NEUTRAL_LUMINANCE,
            tone: Tone::from_luminance(NEUTRAL_LUMINANCE),
            decoded: false,
        }
    }
}

/// Mean luminance of an already decoded image
pub fn luminance_of(image: &DynamicImage) -> f64 {
    let rgba = image.to_rgba8();
    let pixel_count = rgba.width() as u64 * rgba.height() as u64;
    if pixel_count == 0 {
        return NEUTRAL_LUMINANCE;
    }

    let total: f64 = rgba
        .pixels()
        .filter(|p| p[3] != 0)
        .map(|p| 0.299 * p[0] as f64 + 0.587 * p[1] as f64 + 0.114 * p[2] as f64)
        .sum();

    (total / pixel_count as f64 / 255.0).clamp(0.0, 1.0)
}

/// Decode and analyze raw image bytes
///
/// Never fails: undecodable input yields [`NEUTRAL_LUMINANCE`].
pub fn analyze(bytes: &[u8]) -> Brightness {
    match image::load_from_memory(bytes) {
        Ok(image) => {
            let luminance = luminance_of(&image);
            Brightness {
                luminance,
                tone: Tone::from_luminance(luminance),
                decoded: true,
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, byte_len = bytes.len(), "brightness analysis could not decode image");
            Brightness::neutral()
        }
    }
}

/// Mean luminance in [0, 1] of raw image bytes
pub fn classify(bytes: &[u8]) -> f64 {
    analyze(bytes).luminance
}
