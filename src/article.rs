//! Validated article input. The length gate runs before any scorer is
//! dispatched; everything past this type can assume a well-formed text.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inclusive character-count bounds for an analyzable article.
pub const MIN_TEXT_CHARS: usize = 50;
pub const MAX_TEXT_CHARS: usize = 5000;

/// Terminal input error: the only failure that aborts an analysis request.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvalidInput {
    #[error("text too short: {len} chars (minimum {MIN_TEXT_CHARS})")]
    TooShort { len: usize },
    #[error("text too long: {len} chars (maximum {MAX_TEXT_CHARS})")]
    TooLong { len: usize },
}

/// An accepted article text. Immutable once constructed; character count is
/// guaranteed to be within `[MIN_TEXT_CHARS, MAX_TEXT_CHARS]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleText {
    text: String,
    chars: usize,
}

impl ArticleText {
    pub fn new(text: impl Into<String>) -> Result<Self, InvalidInput> {
        let text = text.into();
        let chars = text.chars().count();
        if chars < MIN_TEXT_CHARS {
            return Err(InvalidInput::TooShort { len: chars });
        }
        if chars > MAX_TEXT_CHARS {
            return Err(InvalidInput::TooLong { len: chars });
        }
        Ok(Self { text, chars })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Character count (not byte length).
    pub fn char_count(&self) -> usize {
        self.chars
    }
}

impl AsRef<str> for ArticleText {
    fn as_ref(&self) -> &str {
        &self.text
    }
}
