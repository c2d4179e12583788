use std::sync::Arc;

use super::models::PredictionRecord;
use super::prediction_repository::{PredictionStore, RepositoryError};

#[derive(Clone)]
pub struct ResultWriter {
    store: Arc<dyn PredictionStore>,
}

impl ResultWriter {
    pub fn new(store: Arc<dyn PredictionStore>) -> Self {
        Self { store }
    }

    /// Inserts one record on a fresh connection. The connection is closed on
    /// every path once opened; a failed close is logged and never hides the
    /// insert outcome.
    pub async fn write(&self, record: &PredictionRecord) -> Result<(), RepositoryError> {
        let mut connection = self.store.connect().await?;
        let outcome = connection.insert(record).await;

        if let Err(e) = connection.close().await {
            log::warn!("Failed to close database connection: {}", e);
        }

        match &outcome {
            Ok(()) => log::info!(
                "Prediction for {} saved in database: {}",
                record.file_name,
                record.prediction
            ),
            Err(e) => log::error!(
                "Failed to save prediction for {}: {}",
                record.file_name,
                e
            ),
        }
        outcome
    }
}
