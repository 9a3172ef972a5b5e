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


//! Persistent cache backed by SQLite
//!
//! # Location
//! - Linux: ~/.cache/catalog-sync/cache.db
//! - macOS: ~/Library/Caches/catalog-sync/cache.db
//! - Windows: %LOCALAPPDATA%/catalog-sync/cache.db
//!
//! # SQLite Configuration
//! - WAL mode so concurrent readers never block the single writer
//! - Normal synchronous mode
//!
//! Pattern invalidation uses SQLite's `GLOB`; [`super::glob_matches`] follows
//! the same rules for the memory cache.

use super::{CacheStore, CacheTtl};
use crate::error::{CatalogError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    ConnectOptions, Row,
};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct SqliteCache {
    pool: SqlitePool,
    path: Option<PathBuf>, // None for in-memory caches
}

impl SqliteCache {
    /// Open (or create) the cache file at `cache_path` and migrate it
    pub async fn new<P: AsRef<Path>>(cache_path: P) -> Result<Self> {
        let path = cache_path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    CatalogError::CacheError(format!(
                        "Failed to create cache directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let connection_string = format!("sqlite://{}?mode=rwc", path.display());
        let connect_opts = SqliteConnectOptions::from_str(&connection_string)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30))
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(connect_opts)
            .await?;

        let cache = Self {
            pool,
            path: Some(path.to_path_buf()),
        };
        cache.migrate().await?;

        Ok(cache)
    }

    /// Create in-memory cache for testing
    pub async fn new_in_memory() -> Result<Self> {
        let connect_opts = SqliteConnectOptions::from_str("sqlite::memory:")?
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(1) // every connection would get its own memory database
            .connect_with(connect_opts)
            .await?;

        let cache = Self { pool, path: None };
        cache.migrate().await?;

        Ok(cache)
    }

    async fn migrate(&self) -> Result<()> {
        super::migrations::run_migrations(&self.pool)
            .await
            .map_err(|e| CatalogError::MigrationFailed(e.to_string()))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns `None` for in-memory caches
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn close(self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }

    /// Store `payload` with an explicit write time
    pub async fn put_at(&self, key: &str, payload: &[u8], written_at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO cache_entries (key, payload, written_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                payload = excluded.payload,
                written_at = excluded.written_at
            "#,
        )
        .bind(key)
        .bind(payload)
        .bind(written_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// All stored keys, sorted
    pub async fn keys(&self) -> Result<Vec<String>> {
        let keys: Vec<String> = sqlx::query_scalar("SELECT key FROM cache_entries ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(keys)
    }
}

#[async_trait]
impl CacheStore for SqliteCache {
    async fn get(&self, key: &str, ttl: CacheTtl) -> Result<Option<Vec<u8>>> {
        let row = sqlx::query("SELECT payload, written_at FROM cache_entries WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let written_at: String = row.try_get("written_at")?;
        let written_at = DateTime::parse_from_rfc3339(&written_at)
            .map_err(|e| CatalogError::CacheError(format!("Bad timestamp for '{}': {}", key, e)))?
            .with_timezone(&Utc);

        if !ttl.is_fresh(written_at, Utc::now()) {
            debug!(key, "Cache entry expired");
            return Ok(None);
        }

        Ok(Some(row.try_get("payload")?))
    }

    async fn put(&self, key: &str, payload: &[u8]) -> Result<()> {
        self.put_at(key, payload, Utc::now()).await
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cache_entries WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn invalidate(&self, patterns: &[&str]) -> Result<u64> {
        let mut removed = 0;
        for pattern in patterns {
            let result = sqlx::query("DELETE FROM cache_entries WHERE key GLOB ?")
                .bind(*pattern)
                .execute(&self.pool)
                .await?;
            removed += result.rows_affected();
        }
        debug!(?patterns, removed, "Invalidated cache entries");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_get_roundtrip_in_memory() {
        let cache = SqliteCache::new_in_memory().await.expect("Failed to create cache");

        cache.put("programs.json", b"[1,2]").await.expect("put");
        let payload = cache.get("programs.json", CacheTtl::Unbounded).await.expect("get");
        assert_eq!(payload.as_deref(), Some(&b"[1,2]"[..]));

        assert!(cache.get("programs.json", CacheTtl::REFRESH).await.expect("get").is_none());
        assert!(cache.get("missing.json", CacheTtl::Unbounded).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_misses() {
        let cache = SqliteCache::new_in_memory().await.expect("Failed to create cache");
        let old = Utc::now() - chrono::Duration::hours(2);
        cache.put_at("my-recent-1.json", b"{}", old).await.expect("put");

        assert!(cache.get("my-recent-1.json", CacheTtl::hours(1)).await.expect("get").is_none());
        assert!(cache.get("my-recent-1.json", CacheTtl::hours(3)).await.expect("get").is_some());
    }

    #[tokio::test]
    async fn test_glob_invalidation_keeps_other_keys() {
        let cache = SqliteCache::new_in_memory().await.expect("Failed to create cache");
        for key in ["my-recent-1.json", "my-offline-3.json", "programs.json"] {
            cache.put(key, b"{}").await.expect("put");
        }

        let removed = cache
            .invalidate(&["my-offline-*.json", "my-recent-*.json"])
            .await
            .expect("invalidate");

        assert_eq!(removed, 2);
        assert_eq!(cache.keys().await.expect("keys"), vec!["programs.json".to_string()]);
    }

    #[tokio::test]
    async fn test_glob_classes_and_exact_remove() {
        let cache = SqliteCache::new_in_memory().await.expect("Failed to create cache");
        for key in ["recent-1.json", "recent-2.json", "recent-3.json", "recent-*.json"] {
            cache.put(key, b"{}").await.expect("put");
        }

        assert!(cache.remove("recent-*.json").await.expect("remove"));
        assert_eq!(cache.keys().await.expect("keys").len(), 3);

        let removed = cache.invalidate(&["recent-[12].json"]).await.expect("invalidate");
        assert_eq!(removed, 2);
        assert_eq!(cache.keys().await.expect("keys"), vec!["recent-3.json".to_string()]);
    }

    #[tokio::test]
    async fn test_file_cache_persists_across_reopen() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("nested").join("cache.db");

        let cache = SqliteCache::new(&path).await.expect("open");
        cache.put("favorites.json", b"{\"a\":1}").await.expect("put");
        cache.close().await.expect("close");

        let reopened = SqliteCache::new(&path).await.expect("reopen");
        assert_eq!(reopened.path(), Some(path.as_path()));
        let payload = reopened.get("favorites.json", CacheTtl::Unbounded).await.expect("get");
        assert_eq!(payload.as_deref(), Some(&b"{\"a\":1}"[..]));
    }
}
