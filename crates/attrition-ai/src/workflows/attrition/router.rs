use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use tracing::info;

use super::backend::CompletionBackend;
use crate::error::AppError;
use super::request::PredictionRequest;
use super::service::NarrativeService;

pub const PREDICT_PATH: &str = "/api/predict";

/// Router builder exposing the narrative prediction endpoint.
pub fn prediction_router<B>(service: Arc<NarrativeService<B>>) -> Router
where
    B: CompletionBackend + ?Sized + 'static,
{
    Router::new()
        .route(PREDICT_PATH, post(predict_handler::<B>))
        .with_state(service)
}

/// Only malformed input is reported; every other outcome is a 200 narrative.
pub(crate) async fn predict_handler<B>(
    State(service): State<Arc<NarrativeService<B>>>,
    body: Bytes,
) -> Response
where
    B: CompletionBackend + ?Sized + 'static,
{
    let request = match PredictionRequest::from_slice(&body) {
        Ok(request) => request,
        Err(error) => {
            info!(%error, "rejected prediction request");
            return AppError::from(error).into_response();
        }
    };

    let narrative = service.narrate(&request).await;
    (StatusCode::OK, axum::Json(narrative)).into_response()
}
