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


//! Favorites store
//!
//! Owns the map of followed programs, keyed by [`program_to_id`]. The map is
//! filled by [`FavoritesStore::refresh`] (cache first, then the remote favorites
//! page) and changed only through [`FavoritesStore::update`], which writes to the
//! remote service before touching local state.
//!
//! # Consistency
//! - `update` refreshes with a 5 second TTL first, so a change made moments ago on
//!   another device is seen before deciding whether a write is needed
//! - Remote failures leave the local map untouched
//! - After a successful write the local entry is stored optimistically (the remote
//!   favorites page lags behind) and favorites-scoped listings are invalidated
//!
//! # Cache format
//! `favorites.json` holds
//! `{ "<programId>": { "created": 0, "updated": 0, "value": { "isFavorite", "programUrl", "title" } } }`

use crate::api::client::{CatalogClient, FetchRequest};
use crate::api::models::FavoritesPageResponse;
use crate::auth::{TokenProvider, TokenVariant, ROAMING_TOKEN_NAME, USER_TOKEN_NAME};
use crate::cache::{get_json, put_json, CacheStore, CacheTtl};
use crate::config::ApiConfig;
use crate::error::{CatalogError, Result};
use crate::program::{program_to_id, program_to_url, title_to_program, url_to_program, UrlType};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

pub const FAVORITES_CACHE_KEY: &str = "favorites.json";

/// Listings that embed favorites-filtered content
pub const FAVORITES_SCOPED_PATTERNS: [&str; 2] = ["my-offline-*.json", "my-recent-*.json"];

/// TTL used by `update` to pick up very recent remote changes
const UPDATE_REFRESH_TTL: CacheTtl = CacheTtl::Seconds(5);

const FAVORITES_PAGE_SIZE: u32 = 25;

const FAVORITES_QUERY: &str = r#"query FavoritesPage($pageSize: Int, $after: ID) {
  page(id: "custom:vrtnu-favoritePrograms") {
    ... on FavoritesPage {
      title
      components {
        ... on PaginatedTileList {
          __typename
          listId
          title
          paginatedItems(first: $pageSize, after: $after) {
            pageInfo { hasNextPage endCursor __typename }
            edges {
              cursor
              node {
                __typename
                ... on ProgramTile { id title available __typename }
              }
              __typename
            }
            __typename
          }
        }
        __typename
      }
      __typename
    }
    __typename
  }
}
"#;

/// One followed (or formerly followed) program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteEntry {
    pub program_id: String,
    pub title: String,
    /// Short program URL (`/vrtnu/a-z/<program>/`)
    pub program_url: String,
    pub is_favorite: bool,
    /// Milliseconds since the epoch, 0 when unknown
    pub created_at: i64,
    pub updated_at: i64,
}

impl FavoriteEntry {
    /// Program slug derived from the stored URL
    pub fn program(&self) -> Option<String> {
        url_to_program(&self.program_url)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedValue {
    #[serde(rename = "isFavorite", default)]
    is_favorite: bool,
    #[serde(rename = "programUrl", default)]
    program_url: String,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedFavorite {
    #[serde(default)]
    created: i64,
    #[serde(default)]
    updated: i64,
    value: CachedValue,
}

type CachedFavorites = BTreeMap<String, CachedFavorite>;

fn from_cached(cached: CachedFavorites) -> BTreeMap<String, FavoriteEntry> {
    cached
        .into_iter()
        .map(|(program_id, f)| {
            let entry = FavoriteEntry {
                program_id: program_id.clone(),
                title: f.value.title,
                program_url: f.value.program_url,
                is_favorite: f.value.is_favorite,
                created_at: f.created,
                updated_at: f.updated,
            };
            (program_id, entry)
        })
        .collect()
}

fn to_cached(entries: &BTreeMap<String, FavoriteEntry>) -> CachedFavorites {
    entries
        .iter()
        .map(|(program_id, e)| {
            let cached = CachedFavorite {
                created: e.created_at,
                updated: e.updated_at,
                value: CachedValue {
                    is_favorite: e.is_favorite,
                    program_url: e.program_url.clone(),
                    title: e.title.clone(),
                },
            };
            (program_id.clone(), cached)
        })
        .collect()
}

/// Read-only view of the favorites, served from memory
pub trait FavoritesQuery: Send + Sync {
    /// Favorites are enabled and credentials are present
    fn is_activated(&self) -> bool;

    /// Whether the program slug is currently followed
    fn is_favorite(&self, program: &str) -> bool;

    /// Slugs of all followed programs
    fn favorite_programs(&self) -> BTreeSet<String>;
}

/// Result of a follow/unfollow request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Already in the requested state; nothing was sent
    Unchanged,
    /// Remote write succeeded and local state follows it
    Updated,
}

/// One row offered for batch management
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManageItem {
    pub program: String,
    pub title: String,
    pub enabled: bool,
}

#[derive(Debug)]
pub struct ManageFailure {
    pub program: String,
    pub title: String,
    /// `true` when the failed operation was a follow
    pub follow: bool,
    pub error: CatalogError,
}

#[derive(Debug, Default)]
pub struct ManageReport {
    pub followed: Vec<String>,
    pub unfollowed: Vec<String>,
    pub failures: Vec<ManageFailure>,
}

#[derive(Debug)]
pub enum ManageOutcome {
    /// No favorites known, so nothing was offered
    NothingToManage,
    /// The selection was dismissed
    Cancelled,
    Applied(ManageReport),
}

pub struct FavoritesStore {
    cache: Arc<dyn CacheStore>,
    client: Arc<dyn CatalogClient>,
    tokens: Arc<dyn TokenProvider>,
    api: ApiConfig,
    enabled: bool,
    entries: RwLock<BTreeMap<String, FavoriteEntry>>,
}

impl FavoritesStore {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        client: Arc<dyn CatalogClient>,
        tokens: Arc<dyn TokenProvider>,
        api: ApiConfig,
        enabled: bool,
    ) -> Self {
        Self {
            cache,
            client,
            tokens,
            api,
            enabled,
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, FavoriteEntry>> {
        self.entries.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, FavoriteEntry>> {
        self.entries.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of every known entry, followed or not
    pub fn entries(&self) -> Vec<FavoriteEntry> {
        self.read().values().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Load favorites from cache, or from the remote favorites page on a miss
    ///
    /// Does nothing when favorites are disabled. A missing roaming token keeps
    /// the current state and is not an error.
    pub async fn refresh(&self, ttl: CacheTtl) -> Result<()> {
        if !self.is_activated() {
            return Ok(());
        }

        if let Some(cached) = get_json::<CachedFavorites>(self.cache.as_ref(), FAVORITES_CACHE_KEY, ttl).await? {
            debug!(count = cached.len(), "Favorites served from cache");
            *self.write() = from_cached(cached);
            return Ok(());
        }

        let Some(token) = self.tokens.get_token(ROAMING_TOKEN_NAME, TokenVariant::Roaming).await else {
            warn!("No roaming token, keeping current favorites");
            return Ok(());
        };

        let body = json!({
            "operationName": "FavoritesPage",
            "variables": { "after": null, "pageSize": FAVORITES_PAGE_SIZE },
            "query": FAVORITES_QUERY,
        });
        let request = FetchRequest::post(self.api.graphql_url.clone(), body).authenticated(&token, &self.api.referer);
        let response = self.client.fetch(request).await?;
        let page: FavoritesPageResponse = serde_json::from_value(response)?;

        let fetched: BTreeMap<String, FavoriteEntry> = page
            .titles()?
            .into_iter()
            .map(|title| {
                let program = title_to_program(&title);
                let entry = FavoriteEntry {
                    program_id: program_to_id(&program),
                    program_url: program_to_url(&program, UrlType::Short),
                    title,
                    is_favorite: true,
                    created_at: 0,
                    updated_at: 0,
                };
                (entry.program_id.clone(), entry)
            })
            .collect();

        info!(count = fetched.len(), "Fetched favorites from remote");
        put_json(self.cache.as_ref(), FAVORITES_CACHE_KEY, &to_cached(&fetched)).await?;
        *self.write() = fetched;
        Ok(())
    }

    /// Set the follow state of `program`
    ///
    /// # Errors
    /// - `AuthenticationFailed` when no user token is available
    /// - `RemoteWriteFailed` when the favorites service rejects or never receives
    ///   the write; local state is unchanged and nothing is retried
    pub async fn update(&self, program: &str, title: &str, value: bool) -> Result<UpdateOutcome> {
        self.refresh(UPDATE_REFRESH_TTL).await?;

        if self.is_favorite(program) == value {
            debug!(program, value, "Favorite already in requested state");
            return Ok(UpdateOutcome::Unchanged);
        }

        let token = self
            .tokens
            .get_token(USER_TOKEN_NAME, TokenVariant::User)
            .await
            .ok_or_else(|| {
                CatalogError::auth_failed("Failed to get favorites token", Some(USER_TOKEN_NAME.to_string()))
            })?;

        let program_id = program_to_id(program);
        let program_url = program_to_url(program, UrlType::Short);
        let payload = json!({
            "isFavorite": value,
            "programUrl": program_url,
            "title": title,
        });
        let url = format!("{}/{}", self.api.favorites_url.trim_end_matches('/'), program_id);
        let request = FetchRequest::post(url, payload).authenticated(&token, &self.api.referer);

        if let Err(e) = self.client.fetch(request).await {
            warn!(program, error = %e, "Failed to (un)follow program");
            return Err(CatalogError::remote_write_failed(program, e.to_string(), e.status_code()));
        }

        let now = Utc::now().timestamp_millis();
        let snapshot = {
            let mut entries = self.write();
            let created_at = entries.get(&program_id).map(|e| e.created_at).unwrap_or(now);
            entries.insert(
                program_id.clone(),
                FavoriteEntry {
                    program_id: program_id.clone(),
                    title: title.to_string(),
                    program_url,
                    is_favorite: value,
                    created_at,
                    updated_at: now,
                },
            );
            to_cached(&entries)
        };
        info!(program, value, "Updated favorite");

        if let Err(e) = put_json(self.cache.as_ref(), FAVORITES_CACHE_KEY, &snapshot).await {
            warn!(error = %e, "Failed to persist favorites");
        }
        match self.cache.invalidate(&FAVORITES_SCOPED_PATTERNS).await {
            Ok(removed) => info!(removed, "Invalidated favorites-scoped listings"),
            Err(e) => warn!(error = %e, "Failed to invalidate favorites-scoped listings"),
        }

        Ok(UpdateOutcome::Updated)
    }

    pub async fn follow(&self, program: &str, title: &str) -> Result<UpdateOutcome> {
        self.update(program, title, true).await
    }

    pub async fn unfollow(&self, program: &str, title: &str) -> Result<UpdateOutcome> {
        self.update(program, title, false).await
    }

    /// Titles of followed programs, in program-id order
    pub fn titles(&self) -> Vec<String> {
        self.read()
            .values()
            .filter(|e| e.is_favorite)
            .map(|e| e.title.clone())
            .collect()
    }

    /// Slugs of followed programs, in program-id order
    pub fn programs(&self) -> Vec<String> {
        self.read()
            .values()
            .filter(|e| e.is_favorite)
            .filter_map(FavoriteEntry::program)
            .collect()
    }

    /// Every known entry sorted by title, as offered for batch management
    pub fn manage_items(&self) -> Vec<ManageItem> {
        let mut items: Vec<ManageItem> = self
            .read()
            .values()
            .filter_map(|e| {
                let program = e.program()?;
                let title = urlencoding::decode(&e.title)
                    .map(|t| t.into_owned())
                    .unwrap_or_else(|_| e.title.clone());
                Some(ManageItem {
                    program,
                    title,
                    enabled: e.is_favorite,
                })
            })
            .collect();
        items.sort_by(|a, b| a.title.cmp(&b.title));
        items
    }

    /// Batch follow/unfollow
    ///
    /// Refreshes from remote, hands the title-sorted items to `select`, and
    /// applies the difference between the enabled items and the returned
    /// indices. Each change is applied on its own; failures are collected in the
    /// report instead of aborting the batch. `select` returning `None` cancels.
    pub async fn manage<F>(&self, select: F) -> Result<ManageOutcome>
    where
        F: FnOnce(&[ManageItem]) -> Option<BTreeSet<usize>>,
    {
        self.refresh(CacheTtl::REFRESH).await?;

        if self.is_empty() {
            return Ok(ManageOutcome::NothingToManage);
        }

        let items = self.manage_items();
        let Some(selected) = select(&items) else {
            return Ok(ManageOutcome::Cancelled);
        };
        let preselected: BTreeSet<usize> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.enabled)
            .map(|(idx, _)| idx)
            .collect();

        let mut report = ManageReport::default();

        for idx in preselected.difference(&selected) {
            let item = &items[*idx];
            match self.unfollow(&item.program, &item.title).await {
                Ok(_) => report.unfollowed.push(item.program.clone()),
                Err(error) => report.failures.push(ManageFailure {
                    program: item.program.clone(),
                    title: item.title.clone(),
                    follow: false,
                    error,
                }),
            }
        }

        for idx in selected.difference(&preselected) {
            let Some(item) = items.get(*idx) else {
                warn!(idx, "Ignoring out-of-range selection");
                continue;
            };
            match self.follow(&item.program, &item.title).await {
                Ok(_) => report.followed.push(item.program.clone()),
                Err(error) => report.failures.push(ManageFailure {
                    program: item.program.clone(),
                    title: item.title.clone(),
                    follow: true,
                    error,
                }),
            }
        }

        Ok(ManageOutcome::Applied(report))
    }
}

impl FavoritesQuery for FavoritesStore {
    fn is_activated(&self) -> bool {
        self.enabled && self.tokens.has_credentials()
    }

    fn is_favorite(&self, program: &str) -> bool {
        self.read()
            .get(&program_to_id(program))
            .map(|e| e.is_favorite)
            .unwrap_or(false)
    }

    fn favorite_programs(&self) -> BTreeSet<String> {
        self.programs().into_iter().collect()
    }
}
