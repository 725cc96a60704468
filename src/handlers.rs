//! HTTP route handlers.

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::inference;
use crate::models::{ClassifyResponse, GenerateResponse, TextRequest};
use crate::state::AppState;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(health)))
        .service(web::resource("/classify").route(web::post().to(classify)))
        .service(web::resource("/generate").route(web::post().to(generate)))
        .service(web::resource("/model-info").route(web::get().to(model_info)));
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

pub async fn model_info(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.model_info.clone())
}

pub async fn classify(
    state: web::Data<AppState>,
    body: web::Json<TextRequest>,
) -> Result<HttpResponse, ApiError> {
    let text = inference::non_empty(&body.text)?.to_string();
    let request_id = Uuid::new_v4();
    info!(%request_id, chars = text.len(), "classify request");

    let classifier = state.classifier.clone();
    // The model call is synchronous and CPU-bound.
    let outcome = web::block(move || classifier.classify(&text))
        .await
        .map_err(|_| ApiError::internal("request worker failed"))??;

    info!(%request_id, label = %outcome.label, score = outcome.score, "classify done");
    Ok(HttpResponse::Ok().json(ClassifyResponse {
        label: outcome.label,
        score: outcome.score,
    }))
}

pub async fn generate(
    state: web::Data<AppState>,
    body: web::Json<TextRequest>,
) -> Result<HttpResponse, ApiError> {
    let text = inference::non_empty(&body.text)?.to_string();
    let request_id = Uuid::new_v4();
    info!(%request_id, chars = text.len(), "generate request");

    let generator = state.generator.clone();
    let outcome = web::block(move || generator.generate(&text))
        .await
        .map_err(|_| ApiError::internal("request worker failed"))??;

    info!(%request_id, tokens = outcome.tokens_generated, "generate done");
    Ok(HttpResponse::Ok().json(GenerateResponse {
        generated_text: outcome.text,
    }))
}
