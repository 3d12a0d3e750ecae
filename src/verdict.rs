//! verdict.rs — Structures for the ensemble verdict, per-source breakdown and
//! explainability.
//!
//! The goal: one standardized output shape for REAL/FAKE/UNCERTAIN +
//! confidence + per-source evidence, so the HTTP layer and any downstream
//! report consumer can round-trip the verdict as plain JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Final label for an analyzed article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    Real,
    Fake,
    Uncertain,
}

/// Identity of one scoring source. Fixed set: adding a scorer means adding a
/// variant here plus a nominal weight in `config.rs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    Heuristic,
    Classifier,
    Reasoning,
}

impl SourceId {
    /// Stable display name used in explanations and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Heuristic => "heuristic",
            SourceId::Classifier => "classifier",
            SourceId::Reasoning => "reasoning",
        }
    }
}

/// Why a scorer produced no usable result. Per-scorer and non-fatal: the
/// aggregator renormalizes weights over whatever did answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerError {
    Unreachable,
    Timeout,
    AuthFailed,
    RateLimited,
    MalformedResponse,
}

impl ScorerError {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScorerError::Unreachable => "unreachable",
            ScorerError::Timeout => "timeout",
            ScorerError::AuthFailed => "auth_failed",
            ScorerError::RateLimited => "rate_limited",
            ScorerError::MalformedResponse => "malformed_response",
        }
    }
}

/// Output of one scorer for one article. Owned by the single request that
/// produced it; `raw_score` is the scorer's confidence in <0,1> that the
/// article is fake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceResult {
    pub source_id: SourceId,
    pub available: bool,
    pub raw_label: Label,
    pub raw_score: f32,
    /// Free-form rationale from the scorer, kept verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    /// Set iff `available == false`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ScorerError>,
}

impl SourceResult {
    /// A usable score from `source_id`.
    pub fn ok(source_id: SourceId, raw_label: Label, raw_score: f32) -> Self {
        Self {
            source_id,
            available: true,
            raw_label,
            raw_score: clamp01(raw_score),
            rationale: None,
            error: None,
        }
    }

    /// A failed scorer. Label/score are placeholders; the aggregator never
    /// reads them for unavailable sources.
    pub fn unavailable(source_id: SourceId, error: ScorerError) -> Self {
        Self {
            source_id,
            available: false,
            raw_label: Label::Uncertain,
            raw_score: 0.5,
            rationale: None,
            error: Some(error),
        }
    }

    /// Attach a rationale (builder style).
    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }
}

/// Complete ensemble verdict, including explainability. This is the shape the
/// `/analyze` endpoint returns and the report download mirrors exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleVerdict {
    pub label: Label,
    /// Distance from the nearest decision boundary, rescaled to <0,1>.
    pub confidence: f32,
    /// Weighted ensemble estimate in <0,1> that the article is fake.
    pub fake_probability: f32,
    /// Human-readable summary of the verdict and the evidence behind it.
    pub explanation: String,
    /// All sources in original dispatch order, failed ones included, so a
    /// degraded analysis can be explained to the caller.
    pub per_source_breakdown: Vec<SourceResult>,
    /// Nominal weights renormalized over the available sources; sums to 1.0.
    pub effective_weights: BTreeMap<SourceId, f32>,
    /// True when served from the verdict cache.
    #[serde(default)]
    pub cached: bool,
}

pub(crate) fn clamp01(x: f32) -> f32 {
    if x < 0.0 {
        0.0
    } else if x > 1.0 {
        1.0
    } else {
        x
    }
}
