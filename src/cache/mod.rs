// Catalog Sync - VRT NU catalog aggregation and favorites synchronization
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Key → JSON blob cache with TTL semantics
//!
//! Every listing owns exactly one key (`programs.json`, `my-recent-1.json`, ...),
//! so writers of distinct keys never collide and same-key writes are simply
//! last-write-wins.
//!
//! # TTL rules
//! - `CacheTtl::Seconds(0)` always misses, forcing a refresh
//! - `CacheTtl::Unbounded` never misses because of age
//! - `CacheTtl::Seconds(n)` misses once the entry is older than `n` seconds
//!
//! # Implementations
//! - [`MemoryCache`] - process-local, used by tests and short-lived tools
//! - [`SqliteCache`] - persistent, backed by a single SQLite table

pub mod memory;
pub mod migrations;
pub mod sqlite;

pub use memory::MemoryCache;
pub use sqlite::SqliteCache;

use crate::error::{CatalogError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

/// Maximum age a cached payload may have to be served
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTtl {
    /// Any age is acceptable
    Unbounded,
    Seconds(u64),
}

impl CacheTtl {
    /// Always miss
    pub const REFRESH: CacheTtl = CacheTtl::Seconds(0);

    pub fn hours(hours: u64) -> Self {
        CacheTtl::Seconds(hours.saturating_mul(60 * 60))
    }

    pub fn days(days: u64) -> Self {
        CacheTtl::hours(days.saturating_mul(24))
    }

    /// Whether an entry written at `written_at` may still be served at `now`
    pub fn is_fresh(&self, written_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match *self {
            CacheTtl::Unbounded => true,
            CacheTtl::Seconds(0) => false,
            // An age limit beyond what chrono can represent never expires
            CacheTtl::Seconds(secs) => match i64::try_from(secs).ok().and_then(Duration::try_seconds) {
                Some(max_age) => now - written_at <= max_age,
                None => true,
            },
        }
    }
}

/// One stored payload
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: String,
    pub payload: Vec<u8>,
    pub written_at: DateTime<Utc>,
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Payload for `key` if present and fresh according to `ttl`
    async fn get(&self, key: &str, ttl: CacheTtl) -> Result<Option<Vec<u8>>>;

    /// Store `payload` under `key`, replacing any previous entry
    async fn put(&self, key: &str, payload: &[u8]) -> Result<()>;

    /// Remove the entry stored under exactly `key`, returning whether it existed
    async fn remove(&self, key: &str) -> Result<bool>;

    /// Remove every entry whose key matches one of the glob patterns.
    /// Returns the number of removed entries.
    async fn invalidate(&self, patterns: &[&str]) -> Result<u64>;
}

/// Read and decode a JSON payload. An undecodable payload counts as a miss.
pub async fn get_json<T: DeserializeOwned>(store: &dyn CacheStore, key: &str, ttl: CacheTtl) -> Result<Option<T>> {
    let Some(payload) = store.get(key, ttl).await? else {
        return Ok(None);
    };
    match serde_json::from_slice(&payload) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!(key, error = %e, "Ignoring undecodable cache entry");
            Ok(None)
        }
    }
}

/// Encode `value` as JSON and store it
pub async fn put_json<T: Serialize + ?Sized>(store: &dyn CacheStore, key: &str, value: &T) -> Result<()> {
    let payload = serde_json::to_vec(value)?;
    store.put(key, &payload).await
}

/// Compile a glob into an anchored regex, following SQLite `GLOB` rules:
/// `*`, `?`, `[abc]`, `[a-z]` and `[^abc]`. An unterminated `[` is literal.
pub fn glob_to_regex(pattern: &str) -> Result<Regex> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut expr = String::with_capacity(pattern.len() + 2);
    expr.push('^');
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    push_class(&mut expr, &chars[i + 1..end]);
                    i = end;
                }
                None => expr.push_str(r"\["),
            },
            other => expr.push_str(&regex::escape(&other.to_string())),
        }
        i += 1;
    }
    expr.push('$');
    Regex::new(&expr)
        .map_err(|e| CatalogError::invalid_input(format!("Bad cache key pattern '{}': {}", pattern, e)))
}

/// Index of the `]` closing the class opened at `open`. A `]` right after
/// `[` or `[^` belongs to the class.
fn class_end(chars: &[char], open: usize) -> Option<usize> {
    let mut i = open + 1;
    if chars.get(i) == Some(&'^') {
        i += 1;
    }
    if chars.get(i) == Some(&']') {
        i += 1;
    }
    chars[i.min(chars.len())..].iter().position(|&c| c == ']').map(|pos| i + pos)
}

fn push_class(expr: &mut String, body: &[char]) {
    expr.push('[');
    let rest = match body.split_first() {
        Some((&'^', tail)) => {
            expr.push('^');
            tail
        }
        _ => body,
    };
    for &c in rest {
        if c == '-' {
            expr.push('-');
        } else {
            expr.push_str(&regex::escape(&c.to_string()));
        }
    }
    expr.push(']');
}

/// Whether `key` matches the glob `pattern`
pub fn glob_matches(pattern: &str, key: &str) -> bool {
    glob_to_regex(pattern).map(|re| re.is_match(key)).unwrap_or(false)
}
