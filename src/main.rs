mod config;
mod error;
mod handlers;
mod inference;
mod models;
mod state;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use inference::{CausalGenerator, SentimentClassifier};
use models::ModelInfo;
use state::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ml_pipeline=info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        classifier = %config.classifier_model,
        generator = %config.generator_model,
        "loading models"
    );

    let classifier = SentimentClassifier::load(&config.classifier_model)?;
    let generator = CausalGenerator::load(&config.generator_model, config.generation_options())?;

    let state = web::Data::new(AppState {
        classifier: Arc::new(classifier),
        generator: Arc::new(generator),
        model_info: ModelInfo {
            classifier: config.classifier_model.clone(),
            generator: config.generator_model.clone(),
        },
    });

    info!("server running at http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .configure(handlers::routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
