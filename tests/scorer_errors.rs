// tests/scorer_errors.rs
//
// Provider failure mapping over real HTTP. Local axum servers stand in for
// the remote providers so each failure class (auth, rate limit, server error,
// malformed payload, slow response, refused connection) can be driven through
// the actual request path and asserted on the resulting SourceResult.

use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, routing::post, Json, Router};
use tokio::net::TcpListener;

use misinfo_ensemble_analyzer::scorers::{ClassifierScorer, ReasoningScorer, Scorer};
use misinfo_ensemble_analyzer::{ArticleText, EnsembleConfig, Label, ScorerError};

/// Serve `router` on an ephemeral local port and return its base URL.
async fn spawn_provider(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/")
}

/// Both remote scorers pointed at `url`, with credentials present so the
/// request path is actually taken and a short timeout to keep tests fast.
fn config_for(url: &str) -> EnsembleConfig {
    EnsembleConfig {
        classifier_api_key: "test-key".to_string(),
        reasoning_api_key: "test-key".to_string(),
        classifier_api_url: url.to_string(),
        reasoning_api_url: url.to_string(),
        scorer_timeout: Duration::from_millis(500),
        ..EnsembleConfig::default()
    }
}

fn article() -> ArticleText {
    ArticleText::new(
        "The agency released its audited figures on Tuesday, a spokesperson said in a briefing.",
    )
    .unwrap()
}

async fn classifier_error_against(router: Router) -> Option<ScorerError> {
    let url = spawn_provider(router).await;
    let scorer = ClassifierScorer::new(Arc::new(config_for(&url)));
    let r = scorer.score(&article()).await;
    assert!(!r.available);
    r.error
}

async fn reasoning_error_against(router: Router) -> Option<ScorerError> {
    let url = spawn_provider(router).await;
    let scorer = ReasoningScorer::new(Arc::new(config_for(&url)));
    let r = scorer.score(&article()).await;
    assert!(!r.available);
    r.error
}

#[tokio::test]
async fn forbidden_status_maps_to_auth_failed() {
    let router = Router::new().route("/", post(|| async { StatusCode::FORBIDDEN }));
    assert_eq!(
        classifier_error_against(router).await,
        Some(ScorerError::AuthFailed)
    );
}

#[tokio::test]
async fn rate_limit_status_maps_to_rate_limited() {
    let router = Router::new().route("/", post(|| async { StatusCode::TOO_MANY_REQUESTS }));
    assert_eq!(
        classifier_error_against(router).await,
        Some(ScorerError::RateLimited)
    );
}

#[tokio::test]
async fn server_error_status_maps_to_unreachable() {
    let router = Router::new().route("/", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
    assert_eq!(
        classifier_error_against(router).await,
        Some(ScorerError::Unreachable)
    );
}

#[tokio::test]
async fn non_json_body_maps_to_malformed_response() {
    let router = Router::new().route("/", post(|| async { "definitely not json" }));
    assert_eq!(
        classifier_error_against(router).await,
        Some(ScorerError::MalformedResponse)
    );
}

#[tokio::test]
async fn slow_provider_maps_to_timeout() {
    let router = Router::new().route(
        "/",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            StatusCode::OK
        }),
    );
    assert_eq!(
        classifier_error_against(router).await,
        Some(ScorerError::Timeout)
    );
}

#[tokio::test]
async fn refused_connection_maps_to_unreachable() {
    // Bind then drop, so the port is known to be closed.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let scorer = ClassifierScorer::new(Arc::new(config_for(&format!("http://{addr}/"))));
    let r = scorer.score(&article()).await;
    assert!(!r.available);
    assert_eq!(r.error, Some(ScorerError::Unreachable));
}

#[tokio::test]
async fn classifier_success_roundtrips_through_http() {
    let router = Router::new().route(
        "/",
        post(|| async {
            Json(serde_json::json!([[
                { "label": "negative", "score": 0.9 },
                { "label": "neutral", "score": 0.05 },
                { "label": "positive", "score": 0.05 }
            ]]))
        }),
    );
    let url = spawn_provider(router).await;
    let scorer = ClassifierScorer::new(Arc::new(config_for(&url)));

    let r = scorer.score(&article()).await;
    assert!(r.available);
    assert!(r.error.is_none());
    assert_eq!(r.raw_label, Label::Fake);
}

#[tokio::test]
async fn reasoning_rate_limit_maps_to_rate_limited() {
    let router = Router::new().route("/", post(|| async { StatusCode::TOO_MANY_REQUESTS }));
    assert_eq!(
        reasoning_error_against(router).await,
        Some(ScorerError::RateLimited)
    );
}

#[tokio::test]
async fn reasoning_server_error_maps_to_unreachable() {
    let router = Router::new().route("/", post(|| async { StatusCode::BAD_GATEWAY }));
    assert_eq!(
        reasoning_error_against(router).await,
        Some(ScorerError::Unreachable)
    );
}

#[tokio::test]
async fn reasoning_unknown_verdict_maps_to_malformed_response() {
    // Well-formed chat completion whose content fails schema validation.
    let router = Router::new().route(
        "/",
        post(|| async {
            Json(serde_json::json!({
                "choices": [{
                    "message": { "content": "{\"verdict\": \"maybe\", \"confidence\": 0.5}" }
                }]
            }))
        }),
    );
    assert_eq!(
        reasoning_error_against(router).await,
        Some(ScorerError::MalformedResponse)
    );
}

#[tokio::test]
async fn reasoning_success_roundtrips_through_http() {
    let router = Router::new().route(
        "/",
        post(|| async {
            Json(serde_json::json!({
                "choices": [{
                    "message": {
                        "content":
                            "{\"verdict\": \"real\", \"confidence\": 0.8, \"rationale\": \"Attributed and sober.\"}"
                    }
                }]
            }))
        }),
    );
    let url = spawn_provider(router).await;
    let scorer = ReasoningScorer::new(Arc::new(config_for(&url)));

    let r = scorer.score(&article()).await;
    assert!(r.available);
    assert_eq!(r.raw_label, Label::Real);
    assert!((r.raw_score - 0.2).abs() < 1e-6);
    assert_eq!(r.rationale.as_deref(), Some("Attributed and sober."));
}
