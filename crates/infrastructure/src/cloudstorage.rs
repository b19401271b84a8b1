//! 云图床客户端
//!
//! Cloudinary 风格的 unsigned upload：multipart 提交图片字节，
//! 应答里取 secure_url。

use application::image_store::{ImageStore, ImageStoreError};
use async_trait::async_trait;
use config::CloudStorageConfig;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

pub struct CloudinaryImageStore {
    client: reqwest::Client,
    config: CloudStorageConfig,
}

impl CloudinaryImageStore {
    pub fn new(config: CloudStorageConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ImageStore for CloudinaryImageStore {
    async fn upload(&self, bytes: Vec<u8>, filename: &str) -> Result<String, ImageStoreError> {
        let part = Part::bytes(bytes)
            .file_name(filename.to_owned())
            .mime_str("application/octet-stream")
            .map_err(|err| ImageStoreError::Upload(err.to_string()))?;

        let form = Form::new()
            .part("file", part)
            .text("upload_preset", self.config.upload_preset.clone())
            .text("api_key", self.config.api_key.clone());

        let response = self
            .client
            .post(&self.config.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|err| ImageStoreError::Upload(err.to_string()))?;

        if !response.status().is_success() {
            return Err(ImageStoreError::Upload(format!(
                "upload rejected with status {}",
                response.status()
            )));
        }

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|err| ImageStoreError::Upload(err.to_string()))?;
        Ok(parsed.secure_url)
    }
}
