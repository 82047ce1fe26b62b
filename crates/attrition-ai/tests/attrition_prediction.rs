use attrition_ai::workflows::attrition::{
    prediction_router, score, AssessmentClient, ChatCompletionsBackend, EmployeeProfile,
    NarrativeResult, NarrativeService, NarrativeSettings, NarrativeSource, PredictionRequest,
    RiskBand, ToneStyle,
};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceExt;

fn settings() -> NarrativeSettings {
    NarrativeSettings {
        model: "llama-3.3-70b-versatile".to_string(),
        temperature: 0.85,
        tone: ToneStyle::Witty,
    }
}

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{addr}")
}

async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}

/// Fake completion provider that always answers with `content`.
async fn provider_replying(content: &'static str) -> String {
    let router = Router::new().route(
        "/openai/v1/chat/completions",
        post(move || async move {
            Json(json!({
                "choices": [{ "message": { "role": "assistant", "content": content } }]
            }))
        }),
    );
    format!("{}/openai/v1", serve(router).await)
}

/// Fake completion provider that holds every request open for `delay`.
async fn provider_stalling(delay: Duration) -> String {
    let router = Router::new().route(
        "/openai/v1/chat/completions",
        post(move || async move {
            tokio::time::sleep(delay).await;
            Json(json!({
                "choices": [{ "message": { "role": "assistant", "content": "{}" } }]
            }))
        }),
    );
    format!("{}/openai/v1", serve(router).await)
}

fn narrative_service(
    provider_base_url: &str,
    timeout: Duration,
) -> NarrativeService<ChatCompletionsBackend> {
    let backend = ChatCompletionsBackend::new(provider_base_url, "test-key", Some(timeout))
        .expect("backend builds");
    NarrativeService::new(Arc::new(backend), settings())
}

fn prediction_app_with_timeout(provider_base_url: &str, timeout: Duration) -> Router {
    prediction_router(Arc::new(narrative_service(provider_base_url, timeout)))
}

fn prediction_app(provider_base_url: &str) -> Router {
    prediction_app_with_timeout(provider_base_url, Duration::from_secs(5))
}

async fn predict(app: Router, payload: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::post("/api/predict")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .expect("route executes");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

fn payload_for(profile: &EmployeeProfile) -> Value {
    let mut payload = serde_json::to_value(profile).expect("profile serializes");
    payload["calculated_score"] = json!(score(profile).value());
    payload
}

#[tokio::test]
async fn healthy_default_profile_passes_backend_narrative_through() {
    let profile = EmployeeProfile::validate(2, 1, 3, 160.0).expect("valid profile");
    assert_eq!(score(&profile).value(), 0);

    let provider = provider_replying(
        r#"{"analysis":"Steady as a rock. Nothing in the numbers hints at an exit.","recommendation":"Keep the promotion path visible."}"#,
    )
    .await;
    let (status, body) = predict(prediction_app(&provider), payload_for(&profile)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["analysis"],
        "Steady as a rock. Nothing in the numbers hints at an exit."
    );
    assert_eq!(body["recommendation"], "Keep the promotion path visible.");
}

#[tokio::test]
async fn unreachable_provider_yields_documented_fallback() {
    let profile = EmployeeProfile::validate(2, 1, 3, 160.0).expect("valid profile");
    let provider = format!("{}/openai/v1", closed_port_url().await);

    let (status, body) = predict(prediction_app(&provider), payload_for(&profile)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["analysis"], NarrativeResult::FALLBACK_ANALYSIS);
    assert_eq!(body["recommendation"], NarrativeResult::FALLBACK_RECOMMENDATION);
}

#[tokio::test]
async fn provider_slower_than_timeout_yields_documented_fallback() {
    let profile = EmployeeProfile::validate(3, 3, 2, 190.0).expect("valid profile");
    let provider = provider_stalling(Duration::from_secs(5)).await;
    let timeout = Duration::from_millis(200);

    let request = PredictionRequest::from_profile(&profile, score(&profile));
    let err = narrative_service(&provider, timeout)
        .try_narrate(&request)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "backend_unavailable");

    let (status, body) = predict(
        prediction_app_with_timeout(&provider, timeout),
        payload_for(&profile),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["analysis"], NarrativeResult::FALLBACK_ANALYSIS);
    assert_eq!(body["recommendation"], NarrativeResult::FALLBACK_RECOMMENDATION);
}

#[tokio::test]
async fn provider_reply_missing_recommendation_falls_back_identically() {
    let profile = EmployeeProfile::validate(5, 4, 1, 220.0).expect("valid profile");
    assert_eq!(score(&profile).value(), 100);

    let provider = provider_replying(r#"{"analysis":"Only the first half. And a second."}"#).await;
    let (status, body) = predict(prediction_app(&provider), payload_for(&profile)).await;

    assert_eq!(status, StatusCode::OK);
    let narrative: NarrativeResult = serde_json::from_value(body).expect("narrative shape");
    assert_eq!(narrative, NarrativeResult::fallback());
}

#[tokio::test]
async fn validation_errors_are_the_only_client_errors() {
    let provider = format!("{}/openai/v1", closed_port_url().await);

    let (status, body) = predict(
        prediction_app(&provider),
        json!({ "tenure": 2, "promotion": 1, "satisfaction": 3, "calculated_score": 0 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = predict(
        prediction_app(&provider),
        json!({ "tenure": 2, "promotion": 1, "satisfaction": "abc", "hours": 160, "calculated_score": 0 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn assessment_client_merges_score_with_service_narrative() {
    let provider = provider_replying(
        r#"{"analysis":"The exit sign is blinking. Every metric points the same way.","recommendation":"Hold a career conversation this week."}"#,
    )
    .await;
    let service_url = serve(prediction_app(&provider)).await;
    let client = AssessmentClient::new(&service_url, Some(Duration::from_secs(5))).expect("client");

    let assessment = client
        .assess_inputs(5, 4, 1, 220.0)
        .await
        .expect("profile valid");

    assert_eq!(assessment.score.value(), 100);
    assert_eq!(assessment.band, RiskBand::High);
    assert_eq!(assessment.source, NarrativeSource::Service);
    assert_eq!(assessment.recommendation, "Hold a career conversation this week.");
}

#[tokio::test]
async fn assessment_client_uses_local_narrative_when_service_is_down() {
    let client = AssessmentClient::new(&closed_port_url().await, Some(Duration::from_secs(2)))
        .expect("client");
    let profile = EmployeeProfile::validate(2, 1, 3, 160.0).expect("valid profile");

    let assessment = client.assess(&profile).await;

    assert_eq!(assessment.score.value(), 0);
    assert_eq!(assessment.source, NarrativeSource::LocalFallback);
    assert!(assessment.analysis.starts_with("Low risk"));
}
