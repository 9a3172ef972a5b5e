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


//! Process-local cache

use super::{glob_to_regex, CacheEntry, CacheStore, CacheTtl};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<BTreeMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `payload` with an explicit write time
    pub async fn put_at(&self, key: &str, payload: &[u8], written_at: DateTime<Utc>) {
        let entry = CacheEntry {
            key: key.to_string(),
            payload: payload.to_vec(),
            written_at,
        };
        self.entries.lock().await.insert(key.to_string(), entry);
    }

    /// All stored keys, sorted
    pub async fn keys(&self) -> Vec<String> {
        self.entries.lock().await.keys().cloned().collect()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.entries.lock().await.contains_key(key)
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str, ttl: CacheTtl) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.lock().await;
        Ok(entries
            .get(key)
            .filter(|entry| ttl.is_fresh(entry.written_at, Utc::now()))
            .map(|entry| entry.payload.clone()))
    }

    async fn put(&self, key: &str, payload: &[u8]) -> Result<()> {
        self.put_at(key, payload, Utc::now()).await;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.entries.lock().await.remove(key).is_some())
    }

    async fn invalidate(&self, patterns: &[&str]) -> Result<u64> {
        let matchers = patterns
            .iter()
            .map(|p| glob_to_regex(p))
            .collect::<Result<Vec<_>>>()?;

        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|key, _| !matchers.iter().any(|re| re.is_match(key)));
        Ok((before - entries.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{get_json, put_json};

    #[tokio::test]
    async fn test_invalidate_removes_only_matching_keys() {
        let cache = MemoryCache::new();
        for key in ["my-recent-1.json", "my-offline-3.json", "programs.json"] {
            cache.put(key, b"[]").await.unwrap();
        }

        let removed = cache.invalidate(&["my-offline-*.json", "my-recent-*.json"]).await.unwrap();

        assert_eq!(removed, 2);
        assert_eq!(cache.keys().await, vec!["programs.json".to_string()]);
    }

    #[tokio::test]
    async fn test_remove_is_exact() {
        let cache = MemoryCache::new();
        cache.put("my-recent-1.json", b"[]").await.unwrap();
        cache.put("my-recent-*.json", b"[]").await.unwrap();

        assert!(cache.remove("my-recent-*.json").await.unwrap());
        assert!(!cache.remove("my-recent-*.json").await.unwrap());
        assert_eq!(cache.keys().await, vec!["my-recent-1.json".to_string()]);
    }

    #[tokio::test]
    async fn test_ttl_applies_on_read() {
        let cache = MemoryCache::new();
        cache.put_at("programs.json", b"[]", Utc::now() - chrono::Duration::minutes(90)).await;

        assert!(cache.get("programs.json", CacheTtl::hours(1)).await.unwrap().is_none());
        assert!(cache.get("programs.json", CacheTtl::Unbounded).await.unwrap().is_some());
        assert!(cache.get("programs.json", CacheTtl::REFRESH).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_json_helpers_treat_garbage_as_miss() {
        let cache = MemoryCache::new();
        put_json(&cache, "list.json", &vec![1, 2, 3]).await.unwrap();
        cache.put("broken.json", b"{not json").await.unwrap();

        let list: Option<Vec<u32>> = get_json(&cache, "list.json", CacheTtl::Unbounded).await.unwrap();
        assert_eq!(list, Some(vec![1, 2, 3]));

        let broken: Option<Vec<u32>> = get_json(&cache, "broken.json", CacheTtl::Unbounded).await.unwrap();
        assert!(broken.is_none());
    }
}
