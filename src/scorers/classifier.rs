//! Remote sentiment-classification scorer.
//!
//! Sends the article text to a Hugging Face Inference-style endpoint and maps
//! the provider's sentiment labels onto the canonical REAL/FAKE/UNCERTAIN
//! space. The mapping is a deliberate simplifying assumption inherited from
//! the system design: sentiment polarity is not factuality, but negative
//! sentiment correlates with the sensational register of misinformation.
//! Fixed table: negative -> FAKE, positive -> REAL, neutral -> UNCERTAIN,
//! with `fake = 0.85*negative + 0.40*positive + 0.15*neutral`.
//!
//! Fails soft: any transport, auth, or schema problem yields an unavailable
//! `SourceResult`, never an error to the caller.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::article::ArticleText;
use crate::config::EnsembleConfig;
use crate::scorers::Scorer;
use crate::verdict::{clamp01, Label, ScorerError, SourceId, SourceResult};

/// Provider-side input cap; sentiment models truncate around this length.
const MAX_CLASSIFIER_INPUT_CHARS: usize = 512;

/// Label-mapping coefficients (documented above).
const FAKE_WEIGHT_NEGATIVE: f32 = 0.85;
const FAKE_WEIGHT_POSITIVE: f32 = 0.40;
const FAKE_WEIGHT_NEUTRAL: f32 = 0.15;

pub struct ClassifierScorer {
    config: Arc<EnsembleConfig>,
    http: reqwest::Client,
}

/// Normalized sentiment distribution parsed from the provider response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SentimentScores {
    pub negative: f32,
    pub neutral: f32,
    pub positive: f32,
}

impl ClassifierScorer {
    pub fn new(config: Arc<EnsembleConfig>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("misinfo-ensemble-analyzer/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(config.scorer_timeout)
            .build()
            .expect("reqwest client");
        Self { config, http }
    }

    async fn fetch(&self, text: &str) -> Result<SourceResult, ScorerError> {
        let input: String = text.chars().take(MAX_CLASSIFIER_INPUT_CHARS).collect();
        let body = serde_json::json!({ "inputs": input });

        let resp = self
            .http
            .post(&self.config.classifier_api_url)
            .bearer_auth(&self.config.classifier_api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        match resp.status().as_u16() {
            200 => {}
            401 | 403 => return Err(ScorerError::AuthFailed),
            429 => return Err(ScorerError::RateLimited),
            s => {
                warn!(status = s, "classifier provider returned an error status");
                return Err(ScorerError::Unreachable);
            }
        }

        let payload: Value = resp
            .json()
            .await
            .map_err(|_| ScorerError::MalformedResponse)?;
        let scores = parse_sentiment(&payload).ok_or(ScorerError::MalformedResponse)?;
        Ok(map_sentiment(scores))
    }
}

#[async_trait]
impl Scorer for ClassifierScorer {
    async fn score(&self, article: &ArticleText) -> SourceResult {
        // Credential absence is detectable up front: no network call.
        if !self.config.has_classifier_key() {
            debug!("classifier scorer disabled: no credential configured");
            return SourceResult::unavailable(SourceId::Classifier, ScorerError::AuthFailed);
        }

        let call = self.fetch(article.as_str());
        match tokio::time::timeout(self.config.scorer_timeout, call).await {
            Ok(Ok(result)) => result,
            Ok(Err(err)) => {
                warn!(error = err.as_str(), "classifier scorer unavailable");
                SourceResult::unavailable(SourceId::Classifier, err)
            }
            Err(_) => {
                warn!("classifier scorer timed out");
                SourceResult::unavailable(SourceId::Classifier, ScorerError::Timeout)
            }
        }
    }
}

fn transport_error(err: reqwest::Error) -> ScorerError {
    if err.is_timeout() {
        ScorerError::Timeout
    } else {
        ScorerError::Unreachable
    }
}

/// Accepts both response shapes the inference API emits: a flat list of
/// `{label, score}` objects or that list nested inside another array.
pub(crate) fn parse_sentiment(payload: &Value) -> Option<SentimentScores> {
    let items = match payload.as_array()? {
        outer if outer.first().map(Value::is_array).unwrap_or(false) => {
            outer.first()?.as_array()?
        }
        outer => outer,
    };

    let mut scores = SentimentScores {
        negative: 0.0,
        neutral: 0.0,
        positive: 0.0,
    };
    let mut seen = 0;
    for item in items {
        let label = item.get("label")?.as_str()?.to_ascii_lowercase();
        let score = item.get("score")?.as_f64()? as f32;
        match label.as_str() {
            "negative" => scores.negative = clamp01(score),
            "neutral" => scores.neutral = clamp01(score),
            "positive" => scores.positive = clamp01(score),
            _ => continue,
        }
        seen += 1;
    }
    if seen == 0 {
        return None;
    }
    Some(scores)
}

/// Fixed mapping from the sentiment distribution to the canonical label
/// space and a fake-probability.
pub(crate) fn map_sentiment(scores: SentimentScores) -> SourceResult {
    let fake = clamp01(
        scores.negative * FAKE_WEIGHT_NEGATIVE
            + scores.positive * FAKE_WEIGHT_POSITIVE
            + scores.neutral * FAKE_WEIGHT_NEUTRAL,
    );

    // Fixed table over the dominant class; ties resolve toward the more
    // cautious label.
    let (label, dominant, dominant_score) =
        if scores.negative >= scores.neutral && scores.negative >= scores.positive {
            (Label::Fake, "negative", scores.negative)
        } else if scores.neutral >= scores.positive {
            (Label::Uncertain, "neutral", scores.neutral)
        } else {
            (Label::Real, "positive", scores.positive)
        };
    SourceResult::ok(SourceId::Classifier, label, fake)
        .with_rationale(format!("dominant sentiment: {dominant} ({dominant_score:.2})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cfg() -> EnsembleConfig {
        EnsembleConfig::default()
    }

    #[test]
    fn parses_nested_response_shape() {
        let payload = json!([[
            { "label": "negative", "score": 0.91 },
            { "label": "neutral", "score": 0.06 },
            { "label": "positive", "score": 0.03 }
        ]]);
        let s = parse_sentiment(&payload).unwrap();
        assert!((s.negative - 0.91).abs() < 1e-6);
        assert!((s.positive - 0.03).abs() < 1e-6);
    }

    #[test]
    fn parses_flat_response_shape() {
        let payload = json!([
            { "label": "POSITIVE", "score": 0.8 },
            { "label": "negative", "score": 0.2 }
        ]);
        let s = parse_sentiment(&payload).unwrap();
        assert!((s.positive - 0.8).abs() < 1e-6);
    }

    #[test]
    fn rejects_unknown_shapes() {
        assert!(parse_sentiment(&json!({ "error": "loading" })).is_none());
        assert!(parse_sentiment(&json!([])).is_none());
        assert!(parse_sentiment(&json!([{ "label": "joy", "score": 1.0 }])).is_none());
    }

    #[test]
    fn strongly_negative_maps_to_fake() {
        let r = map_sentiment(SentimentScores {
            negative: 0.9,
            neutral: 0.05,
            positive: 0.05,
        });
        assert!(r.available);
        assert_eq!(r.raw_label, Label::Fake);
        // 0.9*0.85 + 0.05*0.40 + 0.05*0.15 = 0.7925
        assert!((r.raw_score - 0.7925).abs() < 1e-4);
    }

    #[test]
    fn strongly_positive_maps_to_real() {
        let r = map_sentiment(SentimentScores {
            negative: 0.02,
            neutral: 0.08,
            positive: 0.9,
        });
        assert_eq!(r.raw_label, Label::Real);
        // 0.02*0.85 + 0.9*0.40 + 0.08*0.15 = 0.389
        assert!((r.raw_score - 0.389).abs() < 1e-4);
    }

    #[test]
    fn neutral_dominant_stays_uncertain() {
        let r = map_sentiment(SentimentScores {
            negative: 0.2,
            neutral: 0.6,
            positive: 0.2,
        });
        assert_eq!(r.raw_label, Label::Uncertain);
    }

    #[tokio::test]
    async fn missing_credential_short_circuits_to_auth_failed() {
        let scorer = ClassifierScorer::new(Arc::new(cfg()));
        let article = ArticleText::new("x".repeat(80)).unwrap();
        let r = scorer.score(&article).await;
        assert!(!r.available);
        assert_eq!(r.error, Some(ScorerError::AuthFailed));
    }
}
