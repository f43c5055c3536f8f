use super::config::FetchConfig;
use super::error::InfrastructureError;
use crate::domain::image::{mime_for_format, FetchedImage};
use crate::domain::image_source_trait::ImageSource;
use async_trait::async_trait;
use base64::decode;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

/// Fetches images from `http(s)://` URLs, base64 `data:` URLs or local paths.
pub struct DefaultExternalImageFetcher {
    client: reqwest::Client,
}

impl DefaultExternalImageFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, InfrastructureError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(InfrastructureError::ReqwestError)?;
        Ok(Self { client })
    }

    async fn fetch_http(&self, url: &str) -> Result<FetchedImage, InfrastructureError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(InfrastructureError::ReqwestError)?;

        if !response.status().is_success() {
            return Err(InfrastructureError::ExternalApiError(format!(
                "HTTP request failed with status: {}",
                response.status()
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let data = response
            .bytes()
            .await
            .map_err(InfrastructureError::ReqwestError)?
            .to_vec();
        Ok(FetchedImage::new(data, content_type))
    }

    async fn fetch_file(&self, path: &str) -> Result<FetchedImage, InfrastructureError> {
        let data = tokio::fs::read(path)
            .await
            .map_err(InfrastructureError::IoError)?;
        // Local files carry no content type; sniff the bytes instead.
        let content_type = image::guess_format(&data)
            .ok()
            .map(|format| mime_for_format(format).to_string());
        Ok(FetchedImage::new(data, content_type))
    }
}

#[async_trait]
impl ImageSource for DefaultExternalImageFetcher {
    async fn fetch(&self, locator: &str) -> Result<FetchedImage, InfrastructureError> {
        if let Some(rest) = locator.strip_prefix("data:") {
            decode_data_url(rest)
        } else if locator.starts_with("http://") || locator.starts_with("https://") {
            self.fetch_http(locator).await
        } else {
            self.fetch_file(locator).await
        }
    }
}

/// Decodes the part of a `data:` URL after the scheme, e.g. `image/png;base64,iVBOR...`.
fn decode_data_url(rest: &str) -> Result<FetchedImage, InfrastructureError> {
    let (header, payload) = rest.split_once(',').ok_or_else(|| {
        InfrastructureError::DecodingError("Invalid data URL: missing comma".to_string())
    })?;
    let media_type = header.strip_suffix(";base64").ok_or_else(|| {
        InfrastructureError::DecodingError("Only base64 data URLs are supported".to_string())
    })?;

    let data = decode(payload).map_err(InfrastructureError::Base64DecodeError)?;
    let content_type = match media_type.trim() {
        "" => None,
        media_type => Some(media_type.to_string()),
    };
    Ok(FetchedImage::new(data, content_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    // 1x1 PNG
    const TINY_PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

    fn fetcher() -> DefaultExternalImageFetcher {
        DefaultExternalImageFetcher::new(&FetchConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_data_url() {
        let fetched = fetcher()
            .fetch(&format!("data:image/png;base64,{}", TINY_PNG))
            .await
            .unwrap();
        assert_eq!(fetched.content_type.as_deref(), Some("image/png"));
        assert!(fetched.is_image());
        assert_eq!(image::guess_format(&fetched.data).unwrap(), ImageFormat::Png);
    }

    #[tokio::test]
    async fn test_fetch_data_url_keeps_non_image_type() {
        let fetched = fetcher()
            .fetch("data:text/html;base64,PGh0bWw+PC9odG1sPg==")
            .await
            .unwrap();
        assert_eq!(fetched.data, b"<html></html>");
        assert!(!fetched.is_image());
    }

    #[tokio::test]
    async fn test_fetch_data_url_errors() {
        let fetcher = fetcher();
        assert!(matches!(
            fetcher.fetch("data:image/png;base64").await,
            Err(InfrastructureError::DecodingError(_))
        ));
        assert!(matches!(
            fetcher.fetch("data:text/plain,hello").await,
            Err(InfrastructureError::DecodingError(_))
        ));
        assert!(matches!(
            fetcher.fetch("data:image/png;base64,!!!").await,
            Err(InfrastructureError::Base64DecodeError(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_local_file_sniffs_format() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("logo.bin");
        let mut buffer = Cursor::new(Vec::new());
        RgbaImage::from_pixel(3, 3, Rgba([0, 0, 0, 255]))
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        std::fs::write(&image_path, buffer.into_inner()).unwrap();

        let text_path = dir.path().join("notes.txt");
        std::fs::write(&text_path, "not an image").unwrap();

        let fetcher = fetcher();
        let image = fetcher.fetch(image_path.to_str().unwrap()).await.unwrap();
        assert_eq!(image.content_type.as_deref(), Some("image/png"));

        let text = fetcher.fetch(text_path.to_str().unwrap()).await.unwrap();
        assert_eq!(text.content_type, None);
        assert!(!text.is_image());
    }

    #[tokio::test]
    async fn test_fetch_missing_file() {
        let result = fetcher().fetch("/definitely/not/here.png").await;
        assert!(matches!(result, Err(InfrastructureError::IoError(_))));
    }
}
