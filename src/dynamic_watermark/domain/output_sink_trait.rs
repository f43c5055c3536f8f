use crate::infrastructure::error::InfrastructureError;
use async_trait::async_trait;

/// Destination for the final encoded image. Writes overwrite existing content.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OutputSink {
    /// Returns the location the bytes were written to.
    async fn write(&self, data: &[u8], target: &str) -> Result<String, InfrastructureError>;
}
