//! 云图床端口
//!
//! 交付层把 multipart 里的图片字节交给这里，拿回可公开访问的 URL。

use async_trait::async_trait;
use domain::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("image upload error: {0}")]
    Upload(String),
}

impl From<ImageStoreError> for DomainError {
    fn from(err: ImageStoreError) -> Self {
        DomainError::storage("image.upload", err.to_string())
    }
}

/// 图片上传
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, filename: &str) -> Result<String, ImageStoreError>;
}
