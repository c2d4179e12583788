mod http_source;
mod s3_service;

pub use http_source::HttpImageSource;
pub use s3_service::S3Service;

use async_trait::async_trait;

use crate::intake::UploadReference;

/// Largest scan the handler will forward to the endpoint.
pub const MAX_IMAGE_SIZE: usize = 50 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Fetching {url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("S3 error: {0}")]
    S3(String),
    #[error("Image is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },
    #[error("Object {0} is empty")]
    Empty(String),
}

/// Where the uploaded bytes are read from.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self, upload: &UploadReference) -> Result<Vec<u8>, StorageError>;
}

pub fn validate_image(upload: &UploadReference, image_data: &[u8]) -> Result<(), StorageError> {
    if image_data.is_empty() {
        return Err(StorageError::Empty(upload.key.clone()));
    }
    if image_data.len() > MAX_IMAGE_SIZE {
        return Err(StorageError::TooLarge {
            size: image_data.len(),
            limit: MAX_IMAGE_SIZE,
        });
    }
    Ok(())
}
