//! Process-wide ensemble configuration: nominal source weights, the shared
//! verdict thresholds, scorer timeouts, and provider credentials.
//!
//! Constructed once at startup (env via `dotenvy` in the entrypoint) and
//! passed by reference into the predictor and aggregator. Thresholds live
//! here and nowhere else: the heuristic scorer and the aggregator both label
//! through [`EnsembleConfig::label_for_score`].

use std::env;
use std::time::Duration;

use crate::verdict::{Label, SourceId};

/// Fake-probability below this labels REAL.
pub const REAL_THRESHOLD: f32 = 0.35;
/// Fake-probability above this labels FAKE.
pub const FAKE_THRESHOLD: f32 = 0.65;

/// Nominal source weights; sum to 1.0.
pub const NOMINAL_WEIGHT_HEURISTIC: f32 = 0.25;
pub const NOMINAL_WEIGHT_CLASSIFIER: f32 = 0.40;
pub const NOMINAL_WEIGHT_REASONING: f32 = 0.35;

const DEFAULT_SCORER_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CACHE_TTL_SECS: u64 = 24 * 3600;

const DEFAULT_CLASSIFIER_API_URL: &str =
    "https://router.huggingface.co/hf-inference/models/cardiffnlp/twitter-roberta-base-sentiment-latest";
const DEFAULT_REASONING_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_REASONING_MODEL: &str = "llama-3.3-70b-versatile";

#[derive(Debug, Clone)]
pub struct EnsembleConfig {
    /// Bearer token for the remote classification provider. Empty means the
    /// classifier scorer short-circuits to unavailable without a network call.
    pub classifier_api_key: String,
    /// Bearer token for the remote reasoning provider; same short-circuit.
    pub reasoning_api_key: String,
    pub classifier_api_url: String,
    pub reasoning_api_url: String,
    pub reasoning_model: String,
    /// Per-scorer ceiling for one remote call.
    pub scorer_timeout: Duration,
    pub cache_ttl: Duration,
    pub real_threshold: f32,
    pub fake_threshold: f32,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            classifier_api_key: String::new(),
            reasoning_api_key: String::new(),
            classifier_api_url: DEFAULT_CLASSIFIER_API_URL.to_string(),
            reasoning_api_url: DEFAULT_REASONING_API_URL.to_string(),
            reasoning_model: DEFAULT_REASONING_MODEL.to_string(),
            scorer_timeout: Duration::from_secs(DEFAULT_SCORER_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            real_threshold: REAL_THRESHOLD,
            fake_threshold: FAKE_THRESHOLD,
        }
    }
}

impl EnsembleConfig {
    /// Build from environment variables (the entrypoint loads `.env` first).
    /// Missing keys leave the matching remote scorer disabled; malformed
    /// numeric overrides fall back to the defaults.
    pub fn from_env() -> Self {
        let mut cfg = Self {
            classifier_api_key: env::var("CLASSIFIER_API_KEY").unwrap_or_default(),
            reasoning_api_key: env::var("REASONING_API_KEY").unwrap_or_default(),
            ..Self::default()
        };

        if let Some(url) = non_empty_env("CLASSIFIER_API_URL") {
            cfg.classifier_api_url = url;
        }
        if let Some(url) = non_empty_env("REASONING_API_URL") {
            cfg.reasoning_api_url = url;
        }
        if let Some(model) = non_empty_env("REASONING_MODEL") {
            cfg.reasoning_model = model;
        }
        if let Some(secs) = parse_env::<u64>("SCORER_TIMEOUT_SECS") {
            cfg.scorer_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(secs) = parse_env::<u64>("CACHE_TTL_SECS") {
            cfg.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(t) = parse_env::<f32>("REAL_THRESHOLD") {
            if (0.0..=1.0).contains(&t) {
                cfg.real_threshold = t;
            }
        }
        if let Some(t) = parse_env::<f32>("FAKE_THRESHOLD") {
            if (0.0..=1.0).contains(&t) {
                cfg.fake_threshold = t;
            }
        }
        // Keep a valid band.
        if cfg.real_threshold > cfg.fake_threshold {
            std::mem::swap(&mut cfg.real_threshold, &mut cfg.fake_threshold);
        }

        cfg
    }

    /// Static weight table. Adding a scorer means adding a variant in
    /// `SourceId` and a row here; the table must keep summing to 1.0.
    pub fn nominal_weight(&self, source: SourceId) -> f32 {
        match source {
            SourceId::Heuristic => NOMINAL_WEIGHT_HEURISTIC,
            SourceId::Classifier => NOMINAL_WEIGHT_CLASSIFIER,
            SourceId::Reasoning => NOMINAL_WEIGHT_REASONING,
        }
    }

    /// Shared threshold policy: every label in the system derives from a
    /// fake-probability through this single function.
    pub fn label_for_score(&self, fake_probability: f32) -> Label {
        if fake_probability < self.real_threshold {
            Label::Real
        } else if fake_probability > self.fake_threshold {
            Label::Fake
        } else {
            Label::Uncertain
        }
    }

    pub fn has_classifier_key(&self) -> bool {
        !self.classifier_api_key.trim().is_empty()
    }

    pub fn has_reasoning_key(&self) -> bool {
        !self.reasoning_api_key.trim().is_empty()
    }

    /// Stable fingerprint of the weight/threshold configuration. Cache keys
    /// embed it so a changed configuration can never serve a stale verdict.
    pub fn weights_fingerprint(&self) -> String {
        format!(
            "w{:.4}-{:.4}-{:.4}_t{:.4}-{:.4}",
            NOMINAL_WEIGHT_HEURISTIC,
            NOMINAL_WEIGHT_CLASSIFIER,
            NOMINAL_WEIGHT_REASONING,
            self.real_threshold,
            self.fake_threshold,
        )
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
