pub mod models;
pub mod prediction_repository;
pub mod writer;

pub use models::PredictionRecord;
pub use prediction_repository::{
    PostgresPredictionStore, PredictionStore, RepositoryError, StoreConnection,
};
pub use writer::ResultWriter;
