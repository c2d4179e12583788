pub mod model;
mod sagemaker;

pub use model::{Model, calculate_result, parse_scores};
pub use sagemaker::SageMakerPredictor;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("SageMaker error: {0}")]
    Endpoint(String),
    #[error("Endpoint returned an empty body")]
    EmptyBody,
    #[error("Malformed prediction response: {0}")]
    MalformedResponse(String),
    #[error("Prediction contains no scores")]
    EmptyScores,
    #[error("Class index {index} is outside the {classes} known classes")]
    UnknownClass { index: usize, classes: usize },
}

/// A hosted model that turns raw image bytes into one score per class.
#[async_trait]
pub trait Predictor: Send + Sync {
    async fn predict(&self, payload: Vec<u8>) -> Result<Vec<f64>, InferenceError>;
}
