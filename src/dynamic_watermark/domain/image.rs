use image::{ImageFormat, RgbaImage};

/// A decoded raster plus the format it was decoded from, when known.
#[derive(Debug, Clone)]
pub struct Image {
    pub pixels: RgbaImage,
    pub width: u32,
    pub height: u32,
    pub format: Option<ImageFormat>,
}

impl Image {
    pub fn new(pixels: RgbaImage, format: Option<ImageFormat>) -> Self {
        let (width, height) = pixels.dimensions();
        Self {
            pixels,
            width,
            height,
            format,
        }
    }
}

/// Raw bytes returned by an image source together with its content classification.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedImage {
    pub data: Vec<u8>,
    pub content_type: Option<String>,
}

impl FetchedImage {
    pub fn new(data: Vec<u8>, content_type: Option<String>) -> Self {
        Self { data, content_type }
    }

    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.to_ascii_lowercase().contains("image"))
            .unwrap_or(false)
    }
}

pub fn mime_for_format(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        ImageFormat::Ico => "image/x-icon",
        _ => "application/octet-stream",
    }
}
