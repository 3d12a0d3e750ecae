//! Remote LLM-reasoning scorer.
//!
//! Issues a structured prompt to an OpenAI-compatible chat-completions
//! endpoint and expects a strict JSON answer:
//! `{"verdict": "real"|"fake"|"uncertain", "confidence": 0..1, "rationale": "..."}`.
//! The payload is validated against that schema; a reply that cannot be
//! salvaged is `MalformedResponse`, never a crash. The rationale is kept
//! verbatim for the breakdown.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::article::ArticleText;
use crate::config::EnsembleConfig;
use crate::scorers::Scorer;
use crate::verdict::{clamp01, Label, ScorerError, SourceId, SourceResult};

/// Provider-side input cap: keeps the prompt within small context windows.
const MAX_REASONING_INPUT_CHARS: usize = 3000;

const SYSTEM_PROMPT: &str = "You are a misinformation analyst. Assess whether the given news text \
is likely misinformation. Respond with ONLY a JSON object of the form \
{\"verdict\": \"real\" | \"fake\" | \"uncertain\", \"confidence\": <number 0..1>, \
\"rationale\": \"<one short sentence>\"}. No markdown, no extra text.";

/// Models often wrap the JSON in prose or fences; salvage the first flat
/// object (the expected payload has no nested braces).
static JSON_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^{}]*\}").expect("valid regex"));

pub struct ReasoningScorer {
    config: Arc<EnsembleConfig>,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ReasoningPayload {
    verdict: String,
    confidence: f32,
    #[serde(default)]
    rationale: String,
}

impl ReasoningScorer {
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
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
            max_tokens: u32,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: String,
        }

        let input: String = text.chars().take(MAX_REASONING_INPUT_CHARS).collect();
        let req = Req {
            model: &self.config.reasoning_model,
            messages: vec![
                Msg {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Msg {
                    role: "user",
                    content: &input,
                },
            ],
            temperature: 0.1,
            max_tokens: 300,
        };

        let resp = self
            .http
            .post(&self.config.reasoning_api_url)
            .bearer_auth(&self.config.reasoning_api_key)
            .json(&req)
            .send()
            .await
            .map_err(transport_error)?;

        match resp.status().as_u16() {
            200 => {}
            401 | 403 => return Err(ScorerError::AuthFailed),
            429 => return Err(ScorerError::RateLimited),
            s => {
                warn!(status = s, "reasoning provider returned an error status");
                return Err(ScorerError::Unreachable);
            }
        }

        let body: Resp = resp
            .json()
            .await
            .map_err(|_| ScorerError::MalformedResponse)?;
        let content = body
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or("");
        parse_reasoning_content(content).ok_or(ScorerError::MalformedResponse)
    }
}

#[async_trait]
impl Scorer for ReasoningScorer {
    async fn score(&self, article: &ArticleText) -> SourceResult {
        // Credential absence is detectable up front: no network call.
        if !self.config.has_reasoning_key() {
            debug!("reasoning scorer disabled: no credential configured");
            return SourceResult::unavailable(SourceId::Reasoning, ScorerError::AuthFailed);
        }

        let call = self.fetch(article.as_str());
        match tokio::time::timeout(self.config.scorer_timeout, call).await {
            Ok(Ok(result)) => result,
            Ok(Err(err)) => {
                warn!(error = err.as_str(), "reasoning scorer unavailable");
                SourceResult::unavailable(SourceId::Reasoning, err)
            }
            Err(_) => {
                warn!("reasoning scorer timed out");
                SourceResult::unavailable(SourceId::Reasoning, ScorerError::Timeout)
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

/// Validate the model reply against the expected schema. Returns `None` when
/// the payload cannot be salvaged (treated as `MalformedResponse` upstream).
pub(crate) fn parse_reasoning_content(content: &str) -> Option<SourceResult> {
    let payload: ReasoningPayload = match serde_json::from_str(content.trim()) {
        Ok(p) => p,
        Err(_) => {
            let block = JSON_BLOCK.find(content)?;
            serde_json::from_str(block.as_str()).ok()?
        }
    };

    if !payload.confidence.is_finite() {
        return None;
    }
    let confidence = clamp01(payload.confidence);

    // verdict -> label, and a fake-probability consistent with it.
    let (label, raw_score) = match payload.verdict.to_ascii_lowercase().as_str() {
        "fake" => (Label::Fake, confidence),
        "real" => (Label::Real, 1.0 - confidence),
        "uncertain" => (Label::Uncertain, 0.5),
        _ => return None,
    };

    let mut result = SourceResult::ok(SourceId::Reasoning, label, raw_score);
    if !payload.rationale.trim().is_empty() {
        // Verbatim; no merging or rewriting.
        result = result.with_rationale(payload.rationale);
    }
    Some(result)
}
