// src/scorers/mod.rs
//! The scorer family: one capability ("produce a SourceResult for an article,
//! bounded by a timeout"), three fixed members. Adding a scorer means a new
//! module here, a `SourceId` variant, and a nominal-weight row in `config.rs`.

pub mod classifier;
pub mod heuristic;
pub mod reasoning;

pub use classifier::ClassifierScorer;
pub use heuristic::HeuristicScorer;
pub use reasoning::ReasoningScorer;

use async_trait::async_trait;

use crate::article::ArticleText;
use crate::verdict::SourceResult;

/// Common capability of every scorer. Implementations must fail soft: a
/// scorer returns an unavailable `SourceResult`, never an error. The result
/// identifies its source, so the trait needs nothing beyond scoring.
#[async_trait]
pub trait Scorer: Send + Sync {
    /// Score one article. Remote implementations bound themselves with the
    /// configured timeout; the heuristic implementation is pure and
    /// infallible.
    async fn score(&self, article: &ArticleText) -> SourceResult;
}
