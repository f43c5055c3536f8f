use super::error::InfrastructureError;
use crate::domain::output_sink_trait::OutputSink;
use async_trait::async_trait;
use std::path::Path;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

pub struct LocalFileStorage;

impl LocalFileStorage {
    pub fn new() -> Self {
        Self
    }

    /// Creates or truncates `path`, creating missing parent directories.
    pub async fn save_image_impl(&self, path: &str, data: &[u8]) -> Result<(), InfrastructureError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(InfrastructureError::IoError)?;
            }
        }
        let mut file = File::create(path).await.map_err(InfrastructureError::IoError)?;
        file.write_all(data).await.map_err(InfrastructureError::IoError)?;
        file.flush().await.map_err(InfrastructureError::IoError)?;
        Ok(())
    }

    pub async fn read_image_impl(&self, path: &str) -> Result<Vec<u8>, InfrastructureError> {
        let data = fs::read(path).await.map_err(InfrastructureError::IoError)?;
        Ok(data)
    }
}

impl Default for LocalFileStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OutputSink for LocalFileStorage {
    async fn write(&self, data: &[u8], target: &str) -> Result<String, InfrastructureError> {
        self.save_image_impl(target, data).await?;
        Ok(target.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.png");
        let target = target.to_str().unwrap();
        let storage = LocalFileStorage::new();

        storage.write(b"first, longer payload", target).await.unwrap();
        let location = storage.write(b"second", target).await.unwrap();

        assert_eq!(location, target);
        assert_eq!(storage.read_image_impl(target).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/deeper/out.png");
        let target = target.to_str().unwrap();

        LocalFileStorage::new().write(&[1, 2, 3], target).await.unwrap();
        assert_eq!(std::fs::read(target).unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_write_into_a_file_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let target = blocker.join("out.png");

        let result = LocalFileStorage::new().write(&[1], target.to_str().unwrap()).await;
        assert!(matches!(result, Err(InfrastructureError::IoError(_))));
    }
}
