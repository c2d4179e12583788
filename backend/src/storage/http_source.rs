use async_trait::async_trait;
use reqwest::Client;

use super::{ImageSource, MAX_IMAGE_SIZE, StorageError, validate_image};
use crate::intake::UploadReference;

/// Downloads the object from its public URL.
#[derive(Clone)]
pub struct HttpImageSource {
    client: Client,
}

impl HttpImageSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch(&self, upload: &UploadReference) -> Result<Vec<u8>, StorageError> {
        log::info!("Downloading new case from {}", upload.fetch_url);

        let response = self.client.get(&upload.request_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Status {
                url: upload.request_url.clone(),
                status: status.as_u16(),
            });
        }

        if let Some(size) = response.content_length() {
            let size = usize::try_from(size).unwrap_or(usize::MAX);
            if size > MAX_IMAGE_SIZE {
                return Err(StorageError::TooLarge {
                    size,
                    limit: MAX_IMAGE_SIZE,
                });
            }
        }

        let image_data = response.bytes().await?.to_vec();
        validate_image(upload, &image_data)?;
        Ok(image_data)
    }
}
