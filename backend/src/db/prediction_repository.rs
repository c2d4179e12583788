use async_trait::async_trait;
use sqlx::Connection;
use sqlx::postgres::{PgConnectOptions, PgConnection};

use super::models::PredictionRecord;
use crate::config::DatabaseConfig;

const INSERT_PREDICTION: &str = r#"
    INSERT INTO prediction (file_name, intracranial_hemorrhage, mass_effect, midline_shift, prediction, prediction_date)
    VALUES ($1, $2, $3, $4, $5, $6)
"#;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Connection error: {0}")]
    Connection(String),
}

/// Opens one connection per invocation.
#[async_trait]
pub trait PredictionStore: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn StoreConnection>, RepositoryError>;
}

#[async_trait]
pub trait StoreConnection: Send {
    async fn insert(&mut self, record: &PredictionRecord) -> Result<(), RepositoryError>;

    /// Consumes the connection so it cannot be closed twice.
    async fn close(self: Box<Self>) -> Result<(), RepositoryError>;
}

#[derive(Clone)]
pub struct PostgresPredictionStore {
    options: PgConnectOptions,
}

impl PostgresPredictionStore {
    pub fn new(config: &DatabaseConfig) -> Self {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database);
        Self { options }
    }
}

#[async_trait]
impl PredictionStore for PostgresPredictionStore {
    async fn connect(&self) -> Result<Box<dyn StoreConnection>, RepositoryError> {
        let conn = PgConnection::connect_with(&self.options)
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;
        Ok(Box::new(PostgresPredictionConnection { conn }))
    }
}

/// Statements run without an explicit transaction, so every insert commits on its own.
struct PostgresPredictionConnection {
    conn: PgConnection,
}

#[async_trait]
impl StoreConnection for PostgresPredictionConnection {
    async fn insert(&mut self, record: &PredictionRecord) -> Result<(), RepositoryError> {
        sqlx::query(INSERT_PREDICTION)
            .bind(record.file_name.as_str())
            .bind(record.intracranial_hemorrhage)
            .bind(record.mass_effect)
            .bind(record.midline_shift)
            .bind(record.prediction.as_str())
            .bind(record.prediction_date)
            .execute(&mut self.conn)
            .await?;
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), RepositoryError> {
        self.conn.close().await?;
        Ok(())
    }
}
