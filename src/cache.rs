//! In-process verdict cache.
//!
//! Keys are sha256(normalized text) combined with a fingerprint of the weight
//! and threshold configuration, so a configuration change can never serve a
//! stale verdict. Entries expire after the configured TTL; a TTL of zero
//! disables the cache entirely.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::article::ArticleText;
use crate::config::EnsembleConfig;
use crate::verdict::EnsembleVerdict;

pub struct VerdictCache {
    ttl: Duration,
    fingerprint: String,
    inner: Mutex<CacheInner>,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    hits: u64,
    misses: u64,
}

struct CacheEntry {
    stored_at: Instant,
    verdict: EnsembleVerdict,
}

/// Snapshot for the health endpoint.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f32,
}

impl VerdictCache {
    pub fn new(config: &EnsembleConfig) -> Self {
        Self {
            ttl: config.cache_ttl,
            fingerprint: config.weights_fingerprint(),
            inner: Mutex::new(CacheInner::default()),
        }
    }

    fn key(&self, article: &ArticleText) -> String {
        let mut hasher = Sha256::new();
        hasher.update(article.as_str().trim().to_lowercase().as_bytes());
        hasher.update(self.fingerprint.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Cached verdict for this article, marked `cached=true`. Expired entries
    /// are evicted on access.
    pub fn get(&self, article: &ArticleText) -> Option<EnsembleVerdict> {
        if self.ttl.is_zero() {
            return None;
        }
        let key = self.key(article);
        let mut g = self.inner.lock().expect("poisoned cache lock");
        let fresh = match g.entries.get(&key) {
            Some(entry) if entry.stored_at.elapsed() <= self.ttl => Some(entry.verdict.clone()),
            _ => None,
        };
        match fresh {
            Some(mut verdict) => {
                g.hits += 1;
                verdict.cached = true;
                debug!("verdict cache hit");
                Some(verdict)
            }
            None => {
                // Evicts an expired entry if one was there.
                g.entries.remove(&key);
                g.misses += 1;
                None
            }
        }
    }

    pub fn store(&self, article: &ArticleText, verdict: &EnsembleVerdict) {
        if self.ttl.is_zero() {
            return;
        }
        let key = self.key(article);
        let mut g = self.inner.lock().expect("poisoned cache lock");
        g.entries.insert(
            key,
            CacheEntry {
                stored_at: Instant::now(),
                verdict: verdict.clone(),
            },
        );
    }

    pub fn stats(&self) -> CacheStats {
        let g = self.inner.lock().expect("poisoned cache lock");
        let total = g.hits + g.misses;
        CacheStats {
            entries: g.entries.len(),
            hits: g.hits,
            misses: g.misses,
            hit_rate: if total > 0 {
                g.hits as f32 / total as f32
            } else {
                0.0
            },
        }
    }
}
