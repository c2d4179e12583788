use std::sync::Arc;

use aws_lambda_events::s3::S3Event;
use lambda_runtime::LambdaEvent;
use serde::Serialize;
use shared::{DiagnosisLabel, Prediction};

use crate::config::PersistencePolicy;
use crate::db::{PredictionRecord, RepositoryError, ResultWriter};
use crate::inference::{InferenceError, Model};
use crate::intake::{IntakeError, UploadReference};
use crate::storage::{ImageSource, StorageError};

pub const SUCCESS: &str = "Success";

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("Invalid upload event: {0}")]
    Intake(#[from] IntakeError),
    #[error("Could not fetch uploaded image: {0}")]
    Storage(#[from] StorageError),
    #[error("Prediction failed: {0}")]
    Inference(#[from] InferenceError),
    #[error("Failed to persist prediction for {file_name}: {source}")]
    Persistence {
        file_name: String,
        #[source]
        source: RepositoryError,
    },
}

/// What one invocation did, including the raw persistence outcome.
#[derive(Debug)]
pub struct InvocationReport {
    pub upload: UploadReference,
    pub prediction: Prediction,
    pub record: PredictionRecord,
    pub persistence: Result<(), RepositoryError>,
}

/// The value returned to the Lambda runtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationResponse {
    pub status: String,
    pub file_name: String,
    pub prediction: DiagnosisLabel,
    pub confidence: f64,
    pub persisted: bool,
}

#[derive(Clone)]
pub struct PredictionPipeline {
    storage_endpoint: String,
    source: Arc<dyn ImageSource>,
    model: Model,
    writer: ResultWriter,
    policy: PersistencePolicy,
}

impl PredictionPipeline {
    pub fn new(
        storage_endpoint: String,
        source: Arc<dyn ImageSource>,
        model: Model,
        writer: ResultWriter,
        policy: PersistencePolicy,
    ) -> Self {
        Self {
            storage_endpoint,
            source,
            model,
            writer,
            policy,
        }
    }

    /// Runs intake, inference and persistence in order. Errors before the
    /// insert abort the run; the insert outcome is reported, not raised.
    pub async fn run(&self, event: &S3Event) -> Result<InvocationReport, HandlerError> {
        let upload = UploadReference::from_event(event, &self.storage_endpoint)?;
        let payload = self.source.fetch(&upload).await?;

        let prediction = self.model.inference(payload).await?;
        log::info!(
            "Predicted {} for {} (score {:.4})",
            prediction.label,
            upload.file_name,
            prediction.confidence
        );

        let record = PredictionRecord::stamped_now(upload.file_name.clone(), prediction.label);
        let persistence = self.writer.write(&record).await;

        Ok(InvocationReport {
            upload,
            prediction,
            record,
            persistence,
        })
    }

    /// Runs the pipeline and applies the persistence policy to the result.
    pub async fn handle(&self, event: &S3Event) -> Result<InvocationResponse, HandlerError> {
        let report = self.run(event).await?;

        let persisted = match (report.persistence, self.policy) {
            (Ok(()), _) => true,
            (Err(source), PersistencePolicy::Fail) => {
                return Err(HandlerError::Persistence {
                    file_name: report.upload.file_name,
                    source,
                });
            }
            (Err(e), PersistencePolicy::Tolerate) => {
                log::error!(
                    "Prediction for {} was not persisted, reporting success anyway: {}",
                    report.upload.file_name,
                    e
                );
                false
            }
        };

        Ok(InvocationResponse {
            status: SUCCESS.to_string(),
            file_name: report.upload.file_name,
            prediction: report.prediction.label,
            confidence: report.prediction.confidence,
            persisted,
        })
    }
}

/// Lambda entry point for S3 upload notifications.
pub async fn handler(
    pipeline: &PredictionPipeline,
    event: LambdaEvent<S3Event>,
) -> Result<InvocationResponse, lambda_runtime::Error> {
    log::info!(
        "Processing upload event {} with {} record(s)",
        event.context.request_id,
        event.payload.records.len()
    );

    match pipeline.handle(&event.payload).await {
        Ok(response) => Ok(response),
        Err(e) => {
            log::error!("Invocation {} failed: {}", event.context.request_id, e);
            Err(e.into())
        }
    }
}
