use crate::domain::color::Color;
use crate::domain::image::Image;
use crate::domain::position::Anchor;
use crate::infrastructure::error::InfrastructureError;
use image::{ImageFormat, RgbaImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Porter-Duff source-over.
    Over,
}

/// Raster engine used by the watermark pipeline.
#[cfg_attr(test, mockall::automock)]
pub trait ImageProcessor {
    fn decode(&self, bytes: &[u8]) -> Result<Image, InfrastructureError>;

    /// Multiplies every pixel's alpha by `opacity`.
    fn adjust_opacity(&self, image: &RgbaImage, opacity: f32) -> RgbaImage;

    /// Resizes to `target_width`, keeping the aspect ratio. Any padding the
    /// resize introduces is filled with `background`.
    fn resize(
        &self,
        image: &RgbaImage,
        target_width: u32,
        background: Color,
    ) -> Result<RgbaImage, InfrastructureError>;

    /// Rasterizes an SVG document onto a transparent `width` x `height` canvas.
    fn render_markup(
        &self,
        markup: &str,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage, InfrastructureError>;

    fn composite(
        &self,
        base: &mut RgbaImage,
        overlay: &RgbaImage,
        anchor: Anchor,
        blend: BlendMode,
    ) -> Result<(), InfrastructureError>;

    fn encode(&self, image: &RgbaImage, format: ImageFormat) -> Result<Vec<u8>, InfrastructureError>;
}
