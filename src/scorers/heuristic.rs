//! Rule-based pattern scorer. Pure and deterministic: identical text always
//! yields an identical result, with no network or clock involved. This is the
//! fallback path of the ensemble and is always available.
//!
//! Five independent signals, each a sub-score in <0,1> (1 = more fake-like),
//! combined by a fixed weighted sum. The signal weights are internal named
//! constants and sum to 1.0.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::article::ArticleText;
use crate::config::EnsembleConfig;
use crate::scorers::Scorer;
use crate::verdict::{clamp01, SourceId, SourceResult};

/// Internal signal weights; must sum to 1.0 (unit-tested).
const SIGNAL_WEIGHT_EMOTIONAL: f32 = 0.22;
const SIGNAL_WEIGHT_CLICKBAIT: f32 = 0.30;
const SIGNAL_WEIGHT_PUNCTUATION: f32 = 0.18;
const SIGNAL_WEIGHT_CAPS: f32 = 0.18;
const SIGNAL_WEIGHT_CITATION: f32 = 0.12;

/// Sensational/clickbait lexical markers, matched against unique lowercase
/// tokens.
static EMOTIONAL_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "shocking",
        "unbelievable",
        "incredible",
        "astonishing",
        "mindblowing",
        "bombshell",
        "explosive",
        "stunning",
        "outrageous",
        "terrifying",
        "horrifying",
        "alarming",
        "devastating",
        "catastrophic",
        "dangerous",
        "deadly",
        "crisis",
        "emergency",
        "urgent",
        "disgraceful",
        "scandalous",
        "corrupt",
        "evil",
        "sinister",
        "betrayal",
        "conspiracy",
        "coverup",
        "exposed",
        "revealed",
        "amazing",
        "revolutionary",
        "breakthrough",
        "miracle",
        "secret",
        "banned",
        "censored",
        "forbidden",
        "hidden",
        "suppressed",
        "never",
        "always",
        "everyone",
        "nobody",
        "completely",
        "totally",
        "absolutely",
        "definitely",
        "proven",
        "confirmed",
    ]
    .into_iter()
    .collect()
});

/// Clickbait phrase patterns, compiled once.
static CLICKBAIT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"you\s+won'?t\s+believe",
        r"what\s+happens?\s+next",
        r"doctors?\s+hate\s+(him|her|this|them)",
        r"this\s+one\s+(simple|weird|strange)\s+trick",
        r"the\s+truth\s+about",
        r"exposed:?\s+",
        r"breaking:?\s+",
        r"must\s+(see|read|watch)",
        r"click\s+here\s+to",
        r"share\s+before\s+(it'?s?\s+)?deleted",
        r"they\s+don'?t\s+want\s+you\s+to\s+know",
        r"is\s+this\s+the\s+end\s+of",
        r"finally\s+revealed",
        r"\d+\s+reasons?\s+why",
        r"number\s+\d+\s+will\s+(shock|surprise|amaze)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid clickbait pattern"))
    .collect()
});

static REPEATED_EMPHASIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[!?]{2,}").expect("valid regex"));

/// Attribution markers: the presence of sourcing/citations lowers the
/// fake-likelihood contribution of this signal.
static CITATION_MARKERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"according\s+to",
        r"\bsaid\b",
        r"\breported\b",
        r"\bstated\b",
        r"\btold\b",
        r"\bcited\b",
        r"\bstudy\b",
        r"\bresearchers?\b",
        r"\bspokes(man|woman|person)\b",
        r"https?://",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid citation pattern"))
    .collect()
});

/// Per-signal sub-scores in <0,1>, exposed in the rationale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalScores {
    pub emotional: f32,
    pub clickbait: f32,
    pub punctuation: f32,
    pub caps: f32,
    pub citation: f32,
}

impl SignalScores {
    /// Fixed weighted sum of the sub-scores.
    pub fn combined(&self) -> f32 {
        clamp01(
            self.emotional * SIGNAL_WEIGHT_EMOTIONAL
                + self.clickbait * SIGNAL_WEIGHT_CLICKBAIT
                + self.punctuation * SIGNAL_WEIGHT_PUNCTUATION
                + self.caps * SIGNAL_WEIGHT_CAPS
                + self.citation * SIGNAL_WEIGHT_CITATION,
        )
    }

    fn named(&self) -> [(&'static str, f32); 5] {
        [
            ("emotional language", self.emotional),
            ("clickbait patterns", self.clickbait),
            ("excessive punctuation", self.punctuation),
            ("all-caps usage", self.caps),
            ("missing citations", self.citation),
        ]
    }
}

pub struct HeuristicScorer {
    config: Arc<EnsembleConfig>,
}

impl HeuristicScorer {
    pub fn new(config: Arc<EnsembleConfig>) -> Self {
        Self { config }
    }

    /// Evaluate all signals for a text. Pure; exposed for unit tests and the
    /// rationale builder.
    pub fn signals(text: &str) -> SignalScores {
        let lower = text.to_lowercase();
        SignalScores {
            emotional: emotional_language_score(&lower),
            clickbait: clickbait_score(&lower),
            punctuation: punctuation_score(text),
            caps: caps_ratio_score(text),
            citation: citation_score(&lower),
        }
    }

    fn rationale(signals: &SignalScores) -> String {
        let mut strong: Vec<String> = signals
            .named()
            .iter()
            .filter(|(_, s)| *s >= 0.5)
            .map(|(name, s)| format!("{name} {s:.2}"))
            .collect();
        if strong.is_empty() {
            "no strong fake-news signals".to_string()
        } else {
            strong.sort();
            format!("signals: {}", strong.join(", "))
        }
    }
}

#[async_trait]
impl Scorer for HeuristicScorer {
    async fn score(&self, article: &ArticleText) -> SourceResult {
        let signals = Self::signals(article.as_str());
        let raw_score = signals.combined();
        let label = self.config.label_for_score(raw_score);
        SourceResult::ok(SourceId::Heuristic, label, raw_score)
            .with_rationale(Self::rationale(&signals))
    }
}

/// Density of sensational words among unique tokens, scaled so that a few
/// markers in a short text already register.
pub(crate) fn emotional_language_score(lower: &str) -> f32 {
    let words: HashSet<&str> = tokenize(lower).collect();
    if words.is_empty() {
        return 0.0;
    }
    let matches = words.iter().filter(|w| EMOTIONAL_WORDS.contains(*w)).count();
    let density = matches as f32 / words.len() as f32;
    (density * 33.0).min(1.0)
}

/// Stepped score by total clickbait pattern matches: 0 / 0.4 / 0.7 / 1.0.
pub(crate) fn clickbait_score(lower: &str) -> f32 {
    let count: usize = CLICKBAIT_PATTERNS
        .iter()
        .map(|p| p.find_iter(lower).count())
        .sum();
    match count {
        0 => 0.0,
        1 => 0.4,
        2 => 0.7,
        _ => 1.0,
    }
}

/// Ratio of `!`/`?` to total characters, piecewise linear, with a bonus for
/// repeated runs like `!!!`.
pub(crate) fn punctuation_score(text: &str) -> f32 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }
    let emphatic = text.chars().filter(|c| *c == '!' || *c == '?').count();
    let ratio = emphatic as f32 / total as f32;

    let base = if ratio > 0.05 {
        1.0
    } else if ratio > 0.02 {
        0.5 + (ratio - 0.02) / 0.03 * 0.5
    } else {
        ratio / 0.02 * 0.5
    };

    let repeated = REPEATED_EMPHASIS.find_iter(text).count() as f32;
    (base + repeated * 0.1).min(1.0)
}

/// Uppercase-letter ratio, piecewise linear around the 30%/50% marks.
pub(crate) fn caps_ratio_score(text: &str) -> f32 {
    let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.is_empty() {
        return 0.0;
    }
    let upper = letters.iter().filter(|c| c.is_uppercase()).count();
    let ratio = upper as f32 / letters.len() as f32;

    if ratio > 0.5 {
        1.0
    } else if ratio > 0.3 {
        0.5 + (ratio - 0.3) / 0.2 * 0.5
    } else {
        ratio / 0.3 * 0.5
    }
}

/// Citation density, inverted: zero attribution markers contribute 0.5, four
/// or more bring the signal to 0. Bounded to <0, 0.5> so sourcing alone never
/// dominates the combined score.
pub(crate) fn citation_score(lower: &str) -> f32 {
    let count: usize = CITATION_MARKERS
        .iter()
        .map(|p| p.find_iter(lower).count())
        .sum();
    0.5 * (1.0 - (count.min(4) as f32 / 4.0))
}

/// Alphanumeric tokens over an already-lowercased text.
fn tokenize(lower: &str) -> impl Iterator<Item = &str> {
    lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict::Label;

    const SENSATIONAL: &str =
        "SHOCKING!!! You won't believe what doctors hate! This EXPOSED secret is absolutely devastating!!!";
    const SOBER: &str =
        "According to a study published on Tuesday, researchers said inflation slowed last quarter, the ministry reported.";

    fn scorer() -> HeuristicScorer {
        HeuristicScorer::new(Arc::new(EnsembleConfig::default()))
    }

    #[test]
    fn signal_weights_sum_to_one() {
        let sum = SIGNAL_WEIGHT_EMOTIONAL
            + SIGNAL_WEIGHT_CLICKBAIT
            + SIGNAL_WEIGHT_PUNCTUATION
            + SIGNAL_WEIGHT_CAPS
            + SIGNAL_WEIGHT_CITATION;
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn emotional_score_rises_with_sensational_words() {
        let lower = SENSATIONAL.to_lowercase();
        let loaded = emotional_language_score(&lower);
        let plain = emotional_language_score("the committee met on tuesday to discuss the budget");
        assert!(loaded > plain);
        assert!((0.0..=1.0).contains(&loaded));
    }

    #[test]
    fn clickbait_score_steps_by_match_count() {
        assert_eq!(clickbait_score("nothing to see here"), 0.0);
        assert_eq!(clickbait_score("you won't believe this"), 0.4);
        assert_eq!(clickbait_score("you won't believe what happens next"), 0.7);
        assert_eq!(
            clickbait_score("breaking: you won't believe what happens next, finally revealed"),
            1.0
        );
    }

    #[test]
    fn punctuation_score_extremes() {
        assert_eq!(punctuation_score(""), 0.0);
        let calm = punctuation_score("A plain sentence with a single period at its end.");
        assert!(calm < 0.2);
        let shouty = punctuation_score("What?!?! No way!!! Really!!! Are you sure?!?!");
        assert!(shouty > 0.8);
    }

    #[test]
    fn caps_score_extremes() {
        assert_eq!(caps_ratio_score("THIS IS ALL UPPERCASE TEXT"), 1.0);
        let lower = caps_ratio_score("this is all lowercase text");
        assert!(lower < 1e-6);
    }

    #[test]
    fn citations_lower_the_signal() {
        let none = citation_score("aliens built the pyramids and nobody can deny it");
        let cited = citation_score(
            "according to the paper, researchers said the effect was reported in a study",
        );
        assert!((none - 0.5).abs() < 1e-6);
        assert!(cited < none);
        assert!(cited >= 0.0);
    }

    #[tokio::test]
    async fn deterministic_for_identical_input() {
        let s = scorer();
        let article = ArticleText::new(SENSATIONAL).unwrap();
        let a = s.score(&article).await;
        let b = s.score(&article).await;
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn sensational_scores_higher_than_sober() {
        let s = scorer();
        let hot = s.score(&ArticleText::new(SENSATIONAL).unwrap()).await;
        let cold = s.score(&ArticleText::new(SOBER).unwrap()).await;
        assert!(hot.raw_score > cold.raw_score);
        assert!(hot.available && cold.available);
        assert_eq!(cold.raw_label, Label::Real);
    }

    #[tokio::test]
    async fn always_available_with_rationale() {
        let s = scorer();
        let r = s.score(&ArticleText::new(SOBER).unwrap()).await;
        assert!(r.available);
        assert!(r.error.is_none());
        assert!(r.rationale.is_some());
    }
}
