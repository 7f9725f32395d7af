use super::common::*;
use axum::extract::State;
use axum::http::StatusCode;
use std::sync::Arc;
use tower::ServiceExt;

use crate::results::router::form_response_handler;
use crate::results::{results_router, InMemorySender, FORM_RESPONSE_WEBHOOK};

#[tokio::test]
async fn handler_returns_report_for_valid_payload() {
    let (service, sender) = build_service();

    let response = form_response_handler::<InMemorySender>(
        State(Arc::new(service)),
        complete_payload().into(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["event_id"], "01HQ9Z");
    assert_eq!(payload["traits"]["E"]["normalized_score"], 1.0);
    assert_eq!(payload["respondent"]["email"], "a@b.com");
    assert_eq!(sender.sent().len(), 1);
}

#[tokio::test]
async fn handler_returns_bad_request_for_invalid_json() {
    let (service, sender) = build_service();

    let response = form_response_handler::<InMemorySender>(
        State(Arc::new(service)),
        axum::body::Bytes::from_static(b"not json"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("form-response"));
    assert!(sender.sent().is_empty());
}

#[tokio::test]
async fn webhook_route_accepts_posts() {
    let (service, _) = build_service();
    let router = results_router(Arc::new(service));

    let response = router
        .oneshot(
            axum::http::Request::post(FORM_RESPONSE_WEBHOOK)
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(complete_payload()))
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["subtraits"]["N1"]["raw_score"], 4.0);
}

#[tokio::test]
async fn webhook_route_rejects_short_submissions() {
    let (service, _) = build_service();
    let router = results_router(Arc::new(service));
    let answers = identity_answers("555").into_iter().take(2).collect();
    let body = serde_json::to_vec(&form_event(answers)).unwrap();

    let response = router
        .oneshot(
            axum::http::Request::post(FORM_RESPONSE_WEBHOOK)
                .body(axum::body::Body::from(body))
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
