//! Image processing for wallpapers
//!
//! - [`downscale`]: bounded, lossy re-encoding before storage
//! - [`brightness`]: mean perceptual luminance and light/dark tone
//! - [`contrast`]: foreground style chosen from the tone

pub mod brightness;
pub mod contrast;
pub mod downscale;

pub use brightness::{analyze, classify, Brightness, Tone, NEUTRAL_LUMINANCE};
pub use contrast::ContrastStyle;
pub use downscale::{downscale, DownscaleOptions, Downscaled};
