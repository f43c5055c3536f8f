use crate::domain::image::FetchedImage;
use crate::infrastructure::error::InfrastructureError;
use async_trait::async_trait;

/// Anything that can turn a locator into raw image bytes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageSource {
    async fn fetch(&self, locator: &str) -> Result<FetchedImage, InfrastructureError>;
}
