use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_sagemakerruntime::Client;
use aws_sdk_sagemakerruntime::primitives::Blob;

use super::{InferenceError, Predictor, parse_scores};
use crate::config::InferenceConfig;

/// Calls a SageMaker real-time endpoint with the image bytes as the request body.
#[derive(Clone)]
pub struct SageMakerPredictor {
    client: Client,
    endpoint_name: String,
    content_type: String,
    accept: String,
}

impl SageMakerPredictor {
    pub fn new(client: Client, config: &InferenceConfig) -> Self {
        Self {
            client,
            endpoint_name: config.endpoint_name.clone(),
            content_type: config.content_type.clone(),
            accept: config.accept.clone(),
        }
    }

    /// Builds a client from the explicit credentials instead of the default provider chain.
    pub async fn from_config(config: &InferenceConfig) -> Self {
        let credentials = Credentials::new(
            config.access_id.clone(),
            config.secret_key.clone(),
            None,
            None,
            "prediction-handler",
        );
        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        Self::new(Client::new(&aws_config), config)
    }
}

#[async_trait]
impl Predictor for SageMakerPredictor {
    async fn predict(&self, payload: Vec<u8>) -> Result<Vec<f64>, InferenceError> {
        log::info!(
            "Invoking endpoint {} with {} bytes",
            self.endpoint_name,
            payload.len()
        );

        let output = self
            .client
            .invoke_endpoint()
            .endpoint_name(&self.endpoint_name)
            .content_type(&self.content_type)
            .accept(&self.accept)
            .body(Blob::new(payload))
            .send()
            .await
            .map_err(|e| InferenceError::Endpoint(e.to_string()))?;

        let body = output.body().ok_or(InferenceError::EmptyBody)?;
        parse_scores(body.as_ref())
    }
}
