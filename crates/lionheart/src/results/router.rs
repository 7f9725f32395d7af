use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::json;

use super::notify::NotificationSender;
use super::service::ResultsService;
use crate::scoring::ScoringError;

pub const FORM_RESPONSE_WEBHOOK: &str = "/api/v1/webhooks/form-response";

/// Router exposing the form-response webhook.
pub fn results_router<N>(service: Arc<ResultsService<N>>) -> Router
where
    N: NotificationSender + 'static,
{
    Router::new()
        .route(FORM_RESPONSE_WEBHOOK, post(form_response_handler::<N>))
        .with_state(service)
}

pub(crate) async fn form_response_handler<N>(
    State(service): State<Arc<ResultsService<N>>>,
    body: Bytes,
) -> Response
where
    N: NotificationSender + 'static,
{
    match service.process(&body) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(ScoringError::MalformedPayload(error)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
    }
}
