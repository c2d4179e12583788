use std::sync::Arc;

use aws_config::{BehaviorVersion, Region};
use aws_lambda_events::s3::S3Event;
use aws_sdk_s3::Client as S3Client;
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use prediction_handler::config::{Config, ImageSourceKind};
use prediction_handler::db::{PostgresPredictionStore, ResultWriter};
use prediction_handler::handler::{PredictionPipeline, handler};
use prediction_handler::inference::{Model, SageMakerPredictor};
use prediction_handler::storage::{HttpImageSource, ImageSource, S3Service};

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env()?;
    log::info!(
        "Starting prediction handler: endpoint={}, database={}:{}, image source={:?}, persistence policy={:?}",
        config.inference.endpoint_name,
        config.database.host,
        config.database.port,
        config.storage.image_source,
        config.persistence_policy
    );

    let source: Arc<dyn ImageSource> = match config.storage.image_source {
        ImageSourceKind::Http => Arc::new(HttpImageSource::new(reqwest::Client::new())),
        ImageSourceKind::S3 => {
            let aws_config = aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(config.inference.region.clone()))
                .load()
                .await;
            Arc::new(S3Service::new(S3Client::new(&aws_config)))
        }
    };

    let predictor = SageMakerPredictor::from_config(&config.inference).await;
    let model = Model::new(Arc::new(predictor));
    let writer = ResultWriter::new(Arc::new(PostgresPredictionStore::new(&config.database)));

    let pipeline = Arc::new(PredictionPipeline::new(
        config.storage.endpoint.clone(),
        source,
        model,
        writer,
        config.persistence_policy,
    ));

    let func = service_fn(move |event: LambdaEvent<S3Event>| {
        let pipeline = pipeline.clone();
        async move { handler(&pipeline, event).await }
    });

    run(func).await
}
