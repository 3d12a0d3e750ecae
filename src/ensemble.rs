//! # Ensemble decision engine
//!
//! `aggregate` is pure, testable logic that reduces an ordered sequence of
//! `SourceResult`s into one `EnsembleVerdict`: renormalized weighting over
//! the sources that answered, a weighted fake-probability, the shared
//! threshold policy, and a boundary-distance confidence. No I/O.
//!
//! `EnsemblePredictor` owns the three scorers, fans them out concurrently
//! over one immutable article, and feeds the results to `aggregate`. A scorer
//! failure never aborts the request; only an invalid input does.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use crate::article::{ArticleText, InvalidInput};
use crate::cache::{CacheStats, VerdictCache};
use crate::config::EnsembleConfig;
use crate::scorers::{ClassifierScorer, HeuristicScorer, ReasoningScorer, Scorer};
use crate::verdict::{clamp01, EnsembleVerdict, Label, SourceId, SourceResult};

/// Reduce per-source results into the final verdict.
///
/// Order of `results` is preserved in the breakdown for auditability. The
/// heuristic source is infallible by construction, so at least one source is
/// always available; the midpoint fallback below is a guard, not a reachable
/// state.
pub fn aggregate(results: Vec<SourceResult>, config: &EnsembleConfig) -> EnsembleVerdict {
    let available: Vec<&SourceResult> = results.iter().filter(|r| r.available).collect();

    let total_weight: f32 = available
        .iter()
        .map(|r| config.nominal_weight(r.source_id))
        .sum();

    let mut effective_weights: BTreeMap<SourceId, f32> = BTreeMap::new();
    let mut fake_probability = 0.5;
    if total_weight > 0.0 {
        fake_probability = 0.0;
        for r in &available {
            let w = config.nominal_weight(r.source_id) / total_weight;
            effective_weights.insert(r.source_id, w);
            // Each raw_score already encodes the scorer's own uncertainty;
            // UNCERTAIN contributes its score, not a fixed midpoint.
            fake_probability += w * r.raw_score;
        }
    }
    let fake_probability = clamp01(fake_probability);

    let label = config.label_for_score(fake_probability);
    let confidence = boundary_confidence(fake_probability, config);
    let explanation = build_explanation(label, fake_probability, &results);

    EnsembleVerdict {
        label,
        confidence,
        fake_probability,
        explanation,
        per_source_breakdown: results,
        effective_weights,
        cached: false,
    }
}

/// Confidence = distance of the fake-probability from the nearest decision
/// boundary, rescaled per region to <0,1>. Exactly at a threshold the
/// confidence is 0; at 0, 1, or the center of the uncertain band it is 1.
pub fn boundary_confidence(fake_probability: f32, config: &EnsembleConfig) -> f32 {
    let real_t = config.real_threshold;
    let fake_t = config.fake_threshold;

    let distance = (fake_probability - real_t)
        .abs()
        .min((fake_probability - fake_t).abs());
    let max_distance = if fake_probability < real_t {
        real_t
    } else if fake_probability > fake_t {
        1.0 - fake_t
    } else {
        (fake_t - real_t) / 2.0
    };

    if max_distance <= f32::EPSILON {
        0.0
    } else {
        clamp01(distance / max_distance)
    }
}

/// Human-readable summary in the shape the report surface renders: verdict
/// sentence, source agreement, strongest text signals, degraded-mode note.
fn build_explanation(label: Label, fake_probability: f32, results: &[SourceResult]) -> String {
    let pct = (fake_probability * 100.0).round() as u32;
    let mut parts: Vec<String> = Vec::new();

    parts.push(match label {
        Label::Fake => format!(
            "This article shows strong indicators of misinformation (fake probability: {pct}%)."
        ),
        Label::Real => format!("This article appears to be authentic (fake probability: {pct}%)."),
        Label::Uncertain => format!("The analysis is inconclusive (fake probability: {pct}%)."),
    });

    let available: Vec<&SourceResult> = results.iter().filter(|r| r.available).collect();
    if available.len() > 1 {
        let min = available.iter().map(|r| r.raw_score).fold(f32::MAX, f32::min);
        let max = available.iter().map(|r| r.raw_score).fold(f32::MIN, f32::max);
        if max - min < 0.2 {
            parts.push("All sources are in agreement.".to_string());
        } else {
            parts.push(format!(
                "Source estimates vary from {:.0}% to {:.0}%.",
                min * 100.0,
                max * 100.0
            ));
        }
    }

    if let Some(heuristic) = results
        .iter()
        .find(|r| r.source_id == SourceId::Heuristic && r.available)
    {
        if heuristic.raw_score >= 0.5 {
            if let Some(rationale) = &heuristic.rationale {
                parts.push(format!("Text analysis flagged {rationale}."));
            }
        }
    }

    let degraded: Vec<String> = results
        .iter()
        .filter(|r| !r.available)
        .map(|r| {
            let kind = r.error.map(|e| e.as_str()).unwrap_or("unknown");
            format!("{} ({kind})", r.source_id.as_str())
        })
        .collect();
    if !degraded.is_empty() {
        parts.push(format!("Degraded analysis, unavailable: {}.", degraded.join(", ")));
    }

    parts.join(" ")
}

/// Owns the fixed scorer set and the verdict cache; one instance serves all
/// requests, each request fully independent.
pub struct EnsemblePredictor {
    config: Arc<EnsembleConfig>,
    heuristic: HeuristicScorer,
    classifier: ClassifierScorer,
    reasoning: ReasoningScorer,
    cache: VerdictCache,
}

impl EnsemblePredictor {
    pub fn new(config: Arc<EnsembleConfig>) -> Self {
        let cache = VerdictCache::new(&config);
        Self {
            heuristic: HeuristicScorer::new(Arc::clone(&config)),
            classifier: ClassifierScorer::new(Arc::clone(&config)),
            reasoning: ReasoningScorer::new(Arc::clone(&config)),
            cache,
            config,
        }
    }

    /// Input boundary of the whole system: validate, fan out, reduce.
    ///
    /// The three scorers run concurrently over the same immutable article;
    /// each remote scorer bounds itself with the configured timeout, so this
    /// never blocks beyond that ceiling. Dropping the returned future cancels
    /// all in-flight calls.
    pub async fn predict(&self, text: &str) -> Result<EnsembleVerdict, InvalidInput> {
        let article = ArticleText::new(text)?;

        if let Some(hit) = self.cache.get(&article) {
            return Ok(hit);
        }

        let (heuristic, classifier, reasoning) = tokio::join!(
            self.heuristic.score(&article),
            self.classifier.score(&article),
            self.reasoning.score(&article),
        );

        let verdict = aggregate(vec![heuristic, classifier, reasoning], &self.config);
        info!(
            label = ?verdict.label,
            fake_probability = verdict.fake_probability,
            confidence = verdict.confidence,
            sources = verdict.effective_weights.len(),
            "ensemble verdict"
        );

        self.cache.store(&article, &verdict);
        Ok(verdict)
    }

    /// Which remote scorers are configured; the heuristic is always active.
    pub fn active_sources(&self) -> Vec<SourceId> {
        let mut active = vec![SourceId::Heuristic];
        if self.config.has_classifier_key() {
            active.push(SourceId::Classifier);
        }
        if self.config.has_reasoning_key() {
            active.push(SourceId::Reasoning);
        }
        active
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
