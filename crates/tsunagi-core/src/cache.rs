//! Optional read-through cache for resolution results.
//!
//! The engine never owns a cache; the caller injects one (or none).
//! Writes are idempotent — recomputing and overwriting an entry is
//! always safe — so a plain last-writer-wins mutex suffices.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::models::MatchResult;

/// Injected by the integration layer; keyed by the caller (typically
/// the normalized primary title, optionally qualified by catalog).
pub trait ResolutionCache: Send + Sync {
    fn get(&self, key: &str) -> Option<MatchResult>;
    fn insert(&self, key: &str, value: MatchResult);
}

/// Hit/miss counters for debug surfaces.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

struct Entry {
    key: String,
    inserted_at: Instant,
    value: MatchResult,
}

struct Inner {
    entries: VecDeque<Entry>,
    stats: CacheStats,
}

/// Bounded TTL cache. Capacity eviction is oldest-first; expired
/// entries are dropped on access.
pub struct TtlCache {
    ttl: Duration,
    capacity: usize,
    inner: Mutex<Inner>,
}

impl TtlCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            inner: Mutex::new(Inner {
                entries: VecDeque::new(),
                stats: CacheStats::default(),
            }),
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned cache only ever holds recomputable data.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ResolutionCache for TtlCache {
    fn get(&self, key: &str) -> Option<MatchResult> {
        let mut inner = self.lock();
        let now = Instant::now();
        if let Some(pos) = inner.entries.iter().position(|e| e.key == key) {
            if now.duration_since(inner.entries[pos].inserted_at) < self.ttl {
                inner.stats.hits += 1;
                return Some(inner.entries[pos].value.clone());
            }
            inner.entries.remove(pos);
        }
        inner.stats.misses += 1;
        None
    }

    fn insert(&self, key: &str, value: MatchResult) {
        let mut inner = self.lock();
        if let Some(pos) = inner.entries.iter().position(|e| e.key == key) {
            inner.entries.remove(pos);
        }
        inner.entries.push_back(Entry {
            key: key.to_string(),
            inserted_at: Instant::now(),
            value,
        });
        while inner.entries.len() > self.capacity {
            inner.entries.pop_front();
            inner.stats.evictions += 1;
        }
    }
}
