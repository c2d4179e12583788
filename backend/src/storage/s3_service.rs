use async_trait::async_trait;
use aws_sdk_s3::Client;

use super::{ImageSource, StorageError, validate_image};
use crate::intake::UploadReference;

/// Reads the object through the S3 API, for buckets that are not publicly readable.
#[derive(Clone)]
pub struct S3Service {
    client: Client,
}

impl S3Service {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn get_image(&self, bucket: &str, s3_key: &str) -> Result<Vec<u8>, StorageError> {
        let result = self
            .client
            .get_object()
            .bucket(bucket)
            .key(s3_key)
            .send()
            .await
            .map_err(|e| StorageError::S3(e.to_string()))?;

        let body = result
            .body
            .collect()
            .await
            .map_err(|e| StorageError::S3(e.to_string()))?;
        Ok(body.into_bytes().to_vec())
    }
}

#[async_trait]
impl ImageSource for S3Service {
    async fn fetch(&self, upload: &UploadReference) -> Result<Vec<u8>, StorageError> {
        log::info!("Downloading new case s3://{}/{}", upload.bucket, upload.key);

        let image_data = self.get_image(&upload.bucket, &upload.key).await?;
        validate_image(upload, &image_data)?;
        Ok(image_data)
    }
}
