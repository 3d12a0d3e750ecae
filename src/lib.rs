// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod article;
pub mod cache;
pub mod config;
pub mod ensemble;
pub mod verdict;

// Scorer family (heuristic, classifier, reasoning).
pub mod scorers;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::article::{ArticleText, InvalidInput};
pub use crate::config::EnsembleConfig;
pub use crate::ensemble::{aggregate, EnsemblePredictor};
pub use crate::verdict::{EnsembleVerdict, Label, ScorerError, SourceId, SourceResult};
