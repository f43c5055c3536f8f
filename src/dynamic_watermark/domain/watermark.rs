use crate::domain::color::Color;
use crate::domain::error::DomainError;

/// Alpha multiplier applied uniformly to image watermarks.
pub const IMAGE_OPACITY: f32 = 0.6;
/// Image watermarks are never wider than `base_width / MAX_WIDTH_DIVISOR`.
pub const MAX_WIDTH_DIVISOR: f64 = 8.0;
/// Alpha of the white fill used for padding introduced by the resize.
pub const RESIZE_BACKGROUND_ALPHA: f32 = 0.9;

pub const TEXT_OPACITY: f32 = 0.5;
pub const TEXT_FONT_SIZE: u32 = 30;
pub const TEXT_FONT_FAMILY: &str = "Arial";
pub const TEXT_FILL: &str = "white";

/// What to stamp onto the base image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatermarkSpec {
    /// Locator of an image to overlay.
    Image(String),
    /// Literal text to overlay.
    Text(String),
}

impl WatermarkSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            WatermarkSpec::Image(_) => "image",
            WatermarkSpec::Text(_) => "text",
        }
    }
}

pub fn resize_background() -> Color {
    Color::with_alpha(255, 255, 255, RESIZE_BACKGROUND_ALPHA)
}

/// Shrink ratio for a watermark of `watermark_width` placed on a base of `base_width`.
/// Clamped at 1, so watermarks are never enlarged.
pub fn scale_factor(base_width: u32, watermark_width: u32) -> f64 {
    (base_width as f64 / MAX_WIDTH_DIVISOR / watermark_width as f64).min(1.0)
}

/// Target size of an image watermark after proportional scaling.
///
/// Width is `floor(watermark_width * scale_factor)`; height follows the
/// original aspect ratio. Both are at least one pixel.
pub fn scaled_size(base_width: u32, watermark: (u32, u32)) -> Result<(u32, u32), DomainError> {
    let (wm_width, wm_height) = watermark;
    if base_width == 0 || wm_width == 0 || wm_height == 0 {
        return Err(DomainError::InvalidDimensions(format!(
            "cannot scale a {}x{} watermark onto a base {} pixels wide",
            wm_width, wm_height, base_width
        )));
    }

    let factor = scale_factor(base_width, wm_width);
    let width = ((wm_width as f64 * factor).floor() as u32).max(1);
    let height = ((wm_height as f64 * width as f64 / wm_width as f64).round() as u32).max(1);
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_factor_for_wide_watermark() {
        assert_eq!(scale_factor(1600, 3200), 0.0625);
        assert_eq!(scaled_size(1600, (3200, 1800)), Ok((100, 56)));
    }

    #[test]
    fn test_scaled_width_never_exceeds_an_eighth() {
        for (base, wm) in [(1000, 999), (1001, 400), (333, 5000), (8, 9), (1920, 241)] {
            let (width, _) = scaled_size(base, (wm, 100)).unwrap();
            let expected = (wm as f64 * scale_factor(base, wm)).floor() as u32;
            assert_eq!(width, expected.max(1), "base {} watermark {}", base, wm);
            assert!(width as f64 <= base as f64 / 8.0, "base {} watermark {}", base, wm);
        }
    }

    #[test]
    fn test_narrow_watermark_is_not_upscaled() {
        assert_eq!(scale_factor(1600, 50), 1.0);
        assert_eq!(scaled_size(1600, (50, 20)), Ok((50, 20)));
        // Exactly an eighth stays untouched.
        assert_eq!(scaled_size(800, (100, 40)), Ok((100, 40)));
    }

    #[test]
    fn test_scaled_size_rejects_empty_dimensions() {
        assert!(scaled_size(0, (10, 10)).is_err());
        assert!(scaled_size(100, (0, 10)).is_err());
        assert!(scaled_size(100, (10, 0)).is_err());
    }

    #[test]
    fn test_tiny_base_still_yields_one_pixel() {
        assert_eq!(scaled_size(4, (100, 100)), Ok((1, 1)));
    }

    #[test]
    fn test_resize_background_is_translucent_white() {
        let bg = resize_background();
        assert_eq!((bg.r, bg.g, bg.b, bg.a), (255, 255, 255, 230));
    }
}
