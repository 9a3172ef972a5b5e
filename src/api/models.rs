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


//! Typed records for the catalog endpoints
//!
//! Raw JSON is parsed into these structs at the aggregation boundary so the
//! classification and mapping code never inspects untyped maps. Every field is
//! optional or defaulted: the catalog omits fields freely.
//!
//! # Endpoints
//! - search: `{ meta, results: [episode], facets: { facets: [histogram] } }`
//! - suggest: `[show]`
//! - graphql favorites page: `data.page.components[0].paginatedItems.edges[].node`

use crate::error::{CatalogError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Accept `"3"`, `3` or `null` and yield a string
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Accept a string key or a numeric key (season buckets use both)
fn bucket_key<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(string_or_number(deserializer)?.unwrap_or_default())
}

// ============================================================================
// SEARCH
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub meta: Option<SearchMeta>,
    #[serde(default)]
    pub results: Vec<RawEpisode>,
    #[serde(default)]
    pub facets: Option<FacetsBlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchMeta {
    #[serde(default)]
    pub total_results: Option<u64>,
    #[serde(default)]
    pub pages: Option<PageMeta>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Validated pagination figures from the first page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub total_results: u64,
    pub total_pages: u64,
    pub page_size: u64,
}

impl Pagination {
    /// Whether more pages than the first one need fetching
    pub fn needs_more_pages(&self) -> bool {
        self.total_results > self.page_size
    }

    /// 1-based `from` offsets of pages 2..=total_pages
    pub fn remaining_offsets(&self) -> Vec<u64> {
        (1..self.total_pages)
            .map(|page| page.saturating_mul(self.page_size).saturating_add(1))
            .collect()
    }
}

impl SearchResponse {
    /// Pagination figures, rejecting missing or self-contradicting metadata
    pub fn pagination(&self) -> Result<Pagination> {
        let meta = self
            .meta
            .as_ref()
            .ok_or_else(|| CatalogError::MalformedPagination("missing meta block".to_string()))?;
        let total_results = meta
            .total_results
            .ok_or_else(|| CatalogError::MalformedPagination("missing meta.total_results".to_string()))?;
        let pages = meta
            .pages
            .as_ref()
            .ok_or_else(|| CatalogError::MalformedPagination("missing meta.pages".to_string()))?;
        let total_pages = pages
            .total
            .ok_or_else(|| CatalogError::MalformedPagination("missing meta.pages.total".to_string()))?;
        let page_size = pages
            .size
            .ok_or_else(|| CatalogError::MalformedPagination("missing meta.pages.size".to_string()))?;

        if page_size == 0 {
            return Err(CatalogError::MalformedPagination("meta.pages.size is 0".to_string()));
        }
        let expected_pages = total_results.div_ceil(page_size);
        if total_pages != expected_pages {
            return Err(CatalogError::MalformedPagination(format!(
                "{} results of {} per page should span {} pages, meta says {}",
                total_results, page_size, expected_pages, total_pages
            )));
        }

        Ok(Pagination {
            total_results,
            total_pages,
            page_size,
        })
    }

    /// Season buckets, only when the histogram holds more than one season
    pub fn season_buckets(&self) -> Option<Vec<SeasonBucket>> {
        let facets = self.facets.as_ref()?;
        facets
            .facets
            .iter()
            .find(|f| f.name == "seasons" && f.buckets.len() > 1)
            .map(|f| {
                f.buckets
                    .iter()
                    .map(|b| SeasonBucket {
                        key: b.key.clone(),
                        episode_count_hint: b.doc_count,
                    })
                    .collect()
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetsBlock {
    #[serde(default)]
    pub facets: Vec<FacetHistogram>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetHistogram {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub buckets: Vec<FacetBucket>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetBucket {
    #[serde(default, deserialize_with = "bucket_key")]
    pub key: String,
    #[serde(default)]
    pub doc_count: u64,
}

/// One season offered for selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonBucket {
    pub key: String,
    pub episode_count_hint: u64,
}

/// Display hints the catalog attaches to every episode
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayOptions {
    #[serde(default)]
    pub show_episode_title: bool,
    #[serde(default)]
    pub show_short_description: bool,
    #[serde(default)]
    pub show_episode_number: bool,
    #[serde(default)]
    pub show_broadcast_date: bool,
    #[serde(default)]
    pub show_season: Option<bool>,
}

/// Episode document from the search endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEpisode {
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub program_url: Option<String>,
    #[serde(default)]
    pub program_type: Option<String>,
    #[serde(default)]
    pub program_description: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub season_title: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub season_name: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub episode_number: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub display_options: DisplayOptions,
    #[serde(default)]
    pub formatted_broadcast_short_date: Option<String>,
    /// Milliseconds since the epoch, `-1` when unknown
    #[serde(default)]
    pub broadcast_date: Option<i64>,
    #[serde(default)]
    pub asset_on_time: Option<String>,
    #[serde(default)]
    pub asset_off_time: Option<String>,
    #[serde(default)]
    pub allowed_region: Option<String>,
    /// Minutes
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub publication_id: Option<String>,
    #[serde(default)]
    pub video_thumbnail_url: Option<String>,
    #[serde(default)]
    pub program_image_url: Option<String>,
    #[serde(default)]
    pub permalink: Option<String>,
    #[serde(default)]
    pub external_permalink: Option<String>,
    #[serde(default)]
    pub program_brands: Vec<String>,
    #[serde(default)]
    pub brands: Vec<String>,
    /// Field name → HTML fragments with `<em>` around the matched terms
    #[serde(default)]
    pub highlight: BTreeMap<String, Vec<String>>,
}

impl RawEpisode {
    pub fn is_geo_blocked(&self) -> bool {
        self.allowed_region.as_deref() == Some("BE")
    }

    /// Brands of the program, falling back to the episode brands
    pub fn brand_list(&self) -> &[String] {
        if self.program_brands.is_empty() {
            &self.brands
        } else {
            &self.program_brands
        }
    }

    /// Mutable slot for a highlightable field
    pub fn highlight_slot(&mut self, field: &str) -> Option<&mut Option<String>> {
        match field {
            "title" => Some(&mut self.title),
            "shortDescription" => Some(&mut self.short_description),
            "description" => Some(&mut self.description),
            "subtitle" => Some(&mut self.subtitle),
            "program" => Some(&mut self.program),
            "programDescription" => Some(&mut self.program_description),
            _ => None,
        }
    }
}

// ============================================================================
// SUGGEST
// ============================================================================

/// Program document from the suggest endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawShow {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub target_url: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub brands: Vec<String>,
}

// ============================================================================
// FAVORITES PAGE (GraphQL)
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FavoritesPageResponse {
    #[serde(default)]
    pub data: Option<FavoritesPageData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FavoritesPageData {
    #[serde(default)]
    pub page: Option<FavoritesPage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FavoritesPage {
    #[serde(default)]
    pub components: Vec<FavoritesComponent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesComponent {
    #[serde(default)]
    pub paginated_items: Option<PaginatedItems>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginatedItems {
    #[serde(default)]
    pub edges: Vec<FavoriteEdge>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FavoriteEdge {
    #[serde(default)]
    pub node: Option<FavoriteNode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FavoriteNode {
    #[serde(default)]
    pub title: Option<String>,
}

impl FavoritesPageResponse {
    /// Titles of the favorite programs on the first component
    pub fn titles(&self) -> Result<Vec<String>> {
        let items = self
            .data
            .as_ref()
            .and_then(|d| d.page.as_ref())
            .and_then(|p| p.components.first())
            .and_then(|c| c.paginated_items.as_ref())
            .ok_or_else(|| CatalogError::invalid_response("favorites page without paginated items", None))?;

        Ok(items
            .edges
            .iter()
            .filter_map(|e| e.node.as_ref().and_then(|n| n.title.clone()))
            .collect())
    }
}

/// Identifiers needed to play the newest episode of a program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestEpisode {
    pub video_id: Option<String>,
    pub publication_id: Option<String>,
}
