use super::error::{ApplicationError, Stage};
use image::{ImageFormat, RgbaImage};
use std::sync::Arc;

use crate::domain::image::{mime_for_format, FetchedImage, Image};
use crate::domain::image_processor_trait::{BlendMode, ImageProcessor};
use crate::domain::image_source_trait::ImageSource;
use crate::domain::output_sink_trait::OutputSink;
use crate::domain::position::{self, AnchorRule};
use crate::domain::text_overlay::TextOverlay;
use crate::domain::watermark::{self, WatermarkSpec, IMAGE_OPACITY};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::external_image_fetcher::DefaultExternalImageFetcher;
use crate::infrastructure::file_storage::LocalFileStorage;
use crate::infrastructure::image_processor::DefaultImageProcessor;

/// Encoded result of a watermarking run.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub data: Vec<u8>,
    pub content_type: &'static str,
    pub width: u32,
    pub height: u32,
}

/// A rendered image together with where the output sink put it.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub location: String,
    pub rendered: Rendered,
}

/// Fetches a base image, stamps a watermark on it and hands the result to an output sink.
pub struct WatermarkService {
    image_source: Arc<dyn ImageSource + Send + Sync>,
    image_processor: Arc<dyn ImageProcessor + Send + Sync>,
    output_sink: Arc<dyn OutputSink + Send + Sync>,
}

impl WatermarkService {
    pub fn new(
        image_source: Arc<dyn ImageSource + Send + Sync>,
        image_processor: Arc<dyn ImageProcessor + Send + Sync>,
        output_sink: Arc<dyn OutputSink + Send + Sync>,
    ) -> Self {
        Self {
            image_source,
            image_processor,
            output_sink,
        }
    }

    /// Wires the default HTTP fetcher, raster engine and local file sink.
    pub fn from_config(config: &AppConfig) -> Result<Self, ApplicationError> {
        let fetcher = DefaultExternalImageFetcher::new(&config.fetch)
            .map_err(|e| ApplicationError::Configuration(e.to_string()))?;
        let processor = DefaultImageProcessor::from_config(&config.render)
            .map_err(|e| ApplicationError::Configuration(e.to_string()))?;
        Ok(Self::new(
            Arc::new(fetcher),
            Arc::new(processor),
            Arc::new(LocalFileStorage::new()),
        ))
    }

    /// Watermarks the image at `base_locator` and writes it to `output_target`.
    ///
    /// The output format follows the target's extension, falling back to the
    /// base image's own format. Nothing is written unless every step succeeds.
    pub async fn apply(
        &self,
        base_locator: &str,
        spec: &WatermarkSpec,
        position: &str,
        output_target: &str,
    ) -> Result<Applied, ApplicationError> {
        let format = ImageFormat::from_path(output_target)
            .ok()
            .filter(|format| is_supported_output(*format));
        self.apply_as(base_locator, spec, position, output_target, format).await
    }

    /// Like [`apply`](Self::apply) with an explicit output format.
    pub async fn apply_as(
        &self,
        base_locator: &str,
        spec: &WatermarkSpec,
        position: &str,
        output_target: &str,
        format: Option<ImageFormat>,
    ) -> Result<Applied, ApplicationError> {
        let rendered = self.render(base_locator, spec, position, format).await?;

        let location = self
            .output_sink
            .write(&rendered.data, output_target)
            .await
            .map_err(|e| {
                let err = ApplicationError::Write {
                    target: output_target.to_string(),
                    message: e.to_string(),
                };
                tracing::error!(output = %output_target, error = %err, "failed to write watermarked image");
                err
            })?;

        tracing::info!(output = %location, "Watermarked image saved");
        Ok(Applied { location, rendered })
    }

    /// Runs the pipeline up to encoding without writing anything.
    pub async fn render(
        &self,
        base_locator: &str,
        spec: &WatermarkSpec,
        position: &str,
        format: Option<ImageFormat>,
    ) -> Result<Rendered, ApplicationError> {
        let result = self.render_inner(base_locator, spec, position, format).await;
        if let Err(err) = &result {
            tracing::error!(
                base = %base_locator,
                watermark = spec.kind(),
                position = %position,
                error = %err,
                "Error processing image"
            );
        }
        result
    }

    async fn render_inner(
        &self,
        base_locator: &str,
        spec: &WatermarkSpec,
        position: &str,
        format: Option<ImageFormat>,
    ) -> Result<Rendered, ApplicationError> {
        let base_bytes = self.fetch(Stage::BaseImage, base_locator).await?;
        let base = self.decode(Stage::BaseImage, &base_bytes.data)?;
        tracing::debug!(width = base.width, height = base.height, format = ?base.format, "decoded base image");

        let rule = position::resolve(position);
        let output_format = format.unwrap_or_else(|| default_output_format(base.format));
        let (width, height) = (base.width, base.height);
        let mut canvas = base.pixels;

        let overlay = match spec {
            WatermarkSpec::Image(locator) => self.image_overlay(locator, width).await?,
            WatermarkSpec::Text(text) => self.text_overlay(text, width, height, &rule)?,
        };

        self.image_processor
            .composite(&mut canvas, &overlay, rule.anchor, BlendMode::Over)
            .map_err(|e| ApplicationError::Composition(e.to_string()))?;

        let data = self
            .image_processor
            .encode(&canvas, output_format)
            .map_err(|e| ApplicationError::Composition(e.to_string()))?;

        Ok(Rendered {
            data,
            content_type: mime_for_format(output_format),
            width: canvas.width(),
            height: canvas.height(),
        })
    }

    /// Downloads, fades and shrinks an image watermark.
    async fn image_overlay(&self, locator: &str, base_width: u32) -> Result<RgbaImage, ApplicationError> {
        let fetched = self.fetch(Stage::Watermark, locator).await?;
        if !fetched.is_image() {
            return Err(ApplicationError::InvalidWatermarkContent {
                locator: locator.to_string(),
                content_type: fetched
                    .content_type
                    .unwrap_or_else(|| "unknown".to_string()),
            });
        }

        let decoded = self.decode(Stage::Watermark, &fetched.data)?;
        let faded = self
            .image_processor
            .adjust_opacity(&decoded.pixels, IMAGE_OPACITY);

        let (target_width, _) = watermark::scaled_size(base_width, (decoded.width, decoded.height))?;
        tracing::debug!(
            from = decoded.width,
            to = target_width,
            factor = watermark::scale_factor(base_width, decoded.width),
            "scaling watermark"
        );

        self.image_processor
            .resize(&faded, target_width, watermark::resize_background())
            .map_err(|e| ApplicationError::Composition(e.to_string()))
    }

    fn text_overlay(
        &self,
        text: &str,
        width: u32,
        height: u32,
        rule: &AnchorRule,
    ) -> Result<RgbaImage, ApplicationError> {
        let markup = TextOverlay::new(text, width, height, rule).to_svg();
        let layer = self
            .image_processor
            .render_markup(&markup, width, height)
            .map_err(|e| ApplicationError::Composition(e.to_string()))?;

        // A blank layer means no font could draw the glyphs.
        if !text.trim().is_empty() && layer.pixels().all(|p| p[3] == 0) {
            return Err(ApplicationError::Composition(format!(
                "Text watermark {:?} rendered no glyphs",
                text
            )));
        }
        Ok(layer)
    }

    async fn fetch(&self, stage: Stage, locator: &str) -> Result<FetchedImage, ApplicationError> {
        tracing::debug!(%stage, %locator, "fetching");
        self.image_source
            .fetch(locator)
            .await
            .map_err(|e| ApplicationError::Retrieval {
                stage,
                locator: locator.to_string(),
                message: e.to_string(),
            })
    }

    fn decode(&self, stage: Stage, bytes: &[u8]) -> Result<Image, ApplicationError> {
        self.image_processor
            .decode(bytes)
            .map_err(|e| ApplicationError::Decode {
                stage,
                message: e.to_string(),
            })
    }
}

/// Output formats the pipeline can encode to.
pub fn is_supported_output(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Bmp | ImageFormat::Gif | ImageFormat::Tiff
    )
}

/// Maps a user supplied format name to an encodable format, defaulting to PNG.
pub fn parse_output_format(format_str: &str) -> ImageFormat {
    match format_str.trim().to_lowercase().as_str() {
        "jpeg" | "jpg" => ImageFormat::Jpeg,
        "bmp" => ImageFormat::Bmp,
        "gif" => ImageFormat::Gif,
        "tif" | "tiff" => ImageFormat::Tiff,
        _ => ImageFormat::Png,
    }
}

fn default_output_format(base_format: Option<ImageFormat>) -> ImageFormat {
    base_format
        .filter(|format| is_supported_output(*format))
        .unwrap_or(ImageFormat::Png)
}
