use crate::domain::color::Color;
use crate::domain::image::Image;
use crate::domain::image_processor_trait::{BlendMode, ImageProcessor};
use crate::domain::position::Anchor;
use super::config::RenderConfig;
use super::error::InfrastructureError;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::map::map_colors;
use resvg::usvg::{self, fontdb};
use resvg::tiny_skia;
use std::io::Cursor;
use std::sync::Arc;

/// Bundled with the binary so text watermarks render on hosts without `Arial`.
const EMBEDDED_FONT: &[u8] = include_bytes!("../../../DejaVu_Sans/DejaVuSans.ttf");
const EMBEDDED_FONT_FAMILY: &str = "DejaVu Sans";

/// `image` + `resvg` backed raster engine.
pub struct DefaultImageProcessor {
    fontdb: Arc<fontdb::Database>,
}

impl DefaultImageProcessor {
    pub fn from_config(config: &RenderConfig) -> Result<Self, InfrastructureError> {
        let mut fontdb = fontdb::Database::new();
        fontdb.load_font_data(EMBEDDED_FONT.to_vec());
        // Unmatched families fall back to the serif generic.
        fontdb.set_serif_family(EMBEDDED_FONT_FAMILY);
        fontdb.set_sans_serif_family(EMBEDDED_FONT_FAMILY);

        if config.load_system_fonts {
            fontdb.load_system_fonts();
        }
        if let Some(path) = &config.font_file {
            fontdb.load_font_file(path).map_err(|e| {
                InfrastructureError::ImageProcessingError(format!(
                    "Failed to load font {}: {}",
                    path.display(),
                    e
                ))
            })?;
        }
        tracing::debug!(faces = fontdb.len(), "font database ready");
        Ok(Self {
            fontdb: Arc::new(fontdb),
        })
    }
}

impl ImageProcessor for DefaultImageProcessor {
    fn decode(&self, bytes: &[u8]) -> Result<Image, InfrastructureError> {
        let reader = image::io::Reader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(InfrastructureError::IoError)?;
        let format = reader.format();
        let decoded = reader.decode().map_err(InfrastructureError::ImageLibError)?;
        Ok(Image::new(decoded.to_rgba8(), format))
    }

    fn adjust_opacity(&self, image: &RgbaImage, opacity: f32) -> RgbaImage {
        let opacity = opacity.clamp(0.0, 1.0);
        map_colors(image, |p: Rgba<u8>| {
            Rgba([p[0], p[1], p[2], (p[3] as f32 * opacity).round() as u8])
        })
    }

    fn resize(
        &self,
        image: &RgbaImage,
        target_width: u32,
        background: Color,
    ) -> Result<RgbaImage, InfrastructureError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 || target_width == 0 {
            return Err(InfrastructureError::ImageProcessingError(format!(
                "Cannot resize {}x{} image to width {}",
                width, height, target_width
            )));
        }
        let target_height =
            ((height as f64 * target_width as f64 / width as f64).round() as u32).max(1);

        // `resize` fits inside the box and may come out a pixel short of it.
        let resized = DynamicImage::ImageRgba8(image.clone())
            .resize(target_width, target_height, FilterType::Lanczos3)
            .to_rgba8();
        Ok(pad_to_box(resized, target_width, target_height, background))
    }

    fn render_markup(
        &self,
        markup: &str,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage, InfrastructureError> {
        let mut options = usvg::Options::default();
        options.fontdb = Arc::clone(&self.fontdb);

        let tree = usvg::Tree::from_str(markup, &options).map_err(|e| {
            InfrastructureError::ImageProcessingError(format!("Invalid watermark markup: {}", e))
        })?;
        let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
            InfrastructureError::ImageProcessingError(format!(
                "Cannot allocate a {}x{} markup canvas",
                width, height
            ))
        })?;
        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        // tiny-skia stores premultiplied color; the image crate expects straight alpha.
        let mut layer = RgbaImage::new(width, height);
        for (dst, src) in layer.pixels_mut().zip(pixmap.pixels()) {
            let c = src.demultiply();
            *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        Ok(layer)
    }

    fn composite(
        &self,
        base: &mut RgbaImage,
        overlay: &RgbaImage,
        anchor: Anchor,
        blend: BlendMode,
    ) -> Result<(), InfrastructureError> {
        let canvas = base.dimensions();
        let layer = overlay.dimensions();
        if layer.0 > canvas.0 || layer.1 > canvas.1 {
            return Err(InfrastructureError::ImageProcessingError(format!(
                "Overlay {}x{} must have same dimensions or smaller than base {}x{}",
                layer.0, layer.1, canvas.0, canvas.1
            )));
        }

        let (x, y) = anchor.offset(canvas, layer);
        match blend {
            BlendMode::Over => imageops::overlay(base, overlay, x, y),
        }
        Ok(())
    }

    fn encode(&self, image: &RgbaImage, format: ImageFormat) -> Result<Vec<u8>, InfrastructureError> {
        let mut buffer = Cursor::new(Vec::new());
        match format {
            // JPEG has no alpha channel.
            ImageFormat::Jpeg => DynamicImage::ImageRgba8(image.clone())
                .to_rgb8()
                .write_to(&mut buffer, format)
                .map_err(InfrastructureError::ImageLibError)?,
            _ => image
                .write_to(&mut buffer, format)
                .map_err(InfrastructureError::ImageLibError)?,
        }
        Ok(buffer.into_inner())
    }
}

/// Centers `image` in a `width` x `height` box, filling the uncovered area with `background`.
fn pad_to_box(image: RgbaImage, width: u32, height: u32, background: Color) -> RgbaImage {
    if image.dimensions() == (width, height) {
        return image;
    }
    let mut canvas = RgbaImage::from_pixel(width, height, background.to_rgba());
    let (x, y) = Anchor::Center.offset((width, height), image.dimensions());
    imageops::replace(&mut canvas, &image, x, y);
    canvas
}
