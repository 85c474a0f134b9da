//! Foreground styling for a given background tone

use serde::Serialize;

use super::brightness::{Brightness, Tone};

/// Colors and shadows applied to text drawn over the wallpaper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContrastStyle {
    pub tone: Tone,
    pub text_color: &'static str,
    pub text_shadow: &'static str,
    pub icon_color: &'static str,
    /// Lighter shadow for small secondary labels
    pub secondary_shadow: &'static str,
}

const ON_LIGHT: ContrastStyle = ContrastStyle {
    tone: Tone::Light,
    text_color: "rgba(0, 0, 0, 0.9)",
    text_shadow: "0 1px 3px rgba(255, 255, 255, 0.5)",
    icon_color: "rgba(0, 0, 0, 0.8)",
    secondary_shadow: "0 1px 2px rgba(255, 255, 255, 0.5)",
};

const ON_DARK: ContrastStyle = ContrastStyle {
    tone: Tone::Dark,
    text_color: "rgba(255, 255, 255, 0.9)",
    text_shadow: "0 1px 3px rgba(0, 0, 0, 0.8)",
    icon_color: "rgba(255, 255, 255, 0.8)",
    secondary_shadow: "0 1px 2px rgba(0, 0, 0, 0.7)",
};

impl ContrastStyle {
    pub fn for_tone(tone: Tone) -> Self {
        match tone {
            Tone::Light => ON_LIGHT,
            Tone::Dark => ON_DARK,
        }
    }

    pub fn for_luminance(luminance: f64) -> Self {
        Self::for_tone(Tone::from_luminance(luminance))
    }

    pub fn for_brightness(brightness: &Brightness) -> Self {
        Self::for_tone(brightness.tone)
    }

    /// CSS custom properties consumed by the page stylesheet
    pub fn css_variables(&self) -> [(&'static str, &'static str); 2] {
        [
            ("--text-color", self.text_color),
            ("--text-shadow", self.text_shadow),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_background_gets_dark_text() {
        let style = ContrastStyle::for_luminance(0.9);
        assert_eq!(style.tone, Tone::Light);
        assert!(style.text_color.starts_with("rgba(0, 0, 0"));
    }

    #[test]
    fn test_dark_background_gets_light_text() {
        let style = ContrastStyle::for_luminance(0.1);
        assert_eq!(style.tone, Tone::Dark);
        assert!(style.text_color.starts_with("rgba(255, 255, 255"));
    }

    #[test]
    fn test_css_variables() {
        let vars = ContrastStyle::for_tone(Tone::Dark).css_variables();
        assert_eq!(vars[0], ("--text-color", "rgba(255, 255, 255, 0.9)"));
        assert_eq!(vars[1].0, "--text-shadow");
    }
}
