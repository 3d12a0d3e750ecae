//! Misinfo Ensemble Analyzer — Binary Entrypoint
//! Boots the Axum HTTP server, wiring the predictor, routes, and middleware.

use std::sync::Arc;

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use misinfo_ensemble_analyzer::{create_router, AppState, EnsembleConfig, EnsemblePredictor};

/// Verbose tracing is opt-in via `ANALYZER_DEV_LOG=1` and never honored on a
/// production deployment, which keeps Shuttle's own log pipeline untouched.
fn enable_dev_tracing() {
    let opted_in = std::env::var("ANALYZER_DEV_LOG").is_ok_and(|v| v == "1");
    let production = !cfg!(debug_assertions)
        && std::env::var("SHUTTLE_ENV")
            .unwrap_or_default()
            .eq_ignore_ascii_case("production");
    if !opted_in || production {
        return;
    }

    // Debug level for this crate (scorer failures, cache hits), info for the
    // rest of the stack; RUST_LOG overrides both.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("misinfo_ensemble_analyzer=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments. This is where
    // CLASSIFIER_API_KEY / REASONING_API_KEY come from locally.
    let _ = dotenvy::dotenv();

    // Initialize dev tracing early (no-op in production).
    enable_dev_tracing();

    let config = Arc::new(EnsembleConfig::from_env());
    tracing::info!(
        classifier = config.has_classifier_key(),
        reasoning = config.has_reasoning_key(),
        "ensemble predictor starting"
    );

    let predictor = Arc::new(EnsemblePredictor::new(config));
    let router = create_router(AppState { predictor });

    Ok(router.into())
}
