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


//! Query building for the search and suggest endpoints
//!
//! Every listing is described by a [`ListingRequest`], which produces both the
//! outbound query string and the cache key for the listing. Keeping the two in
//! one place means a facet can never be queried under the wrong key.
//!
//! # Parameters
//! - `i=video` selects episode documents on the search endpoint
//! - `size` / `from` paginate; `from` is 1-based
//! - `facets[<field>]=<value>` filters; list values are sent as `[a,b,c]`
//! - `q` and `highlight=true` for free-text search

use crate::error::{CatalogError, Result};
use crate::program::{program_to_url, UrlType};

/// Page size for the paged listings (recent, offline, search)
pub const PAGED_SIZE: u32 = 50;

/// Page size for program/season/category browsing
pub const BROWSE_SIZE: u32 = 150;

/// Start offset for a 1-based page number: `(page - 1) * size + 1`
///
/// Fails when the offset does not fit the API's 32-bit `from` parameter.
pub fn start_offset(page: u32, page_size: u32) -> Result<u32> {
    u64::from(page.saturating_sub(1))
        .checked_mul(u64::from(page_size))
        .and_then(|offset| offset.checked_add(1))
        .and_then(|offset| u32::try_from(offset).ok())
        .ok_or_else(|| CatalogError::invalid_input(format!("Page {} is out of range", page)))
}

/// Encode a list facet value as `[a,b,c]`
pub fn list_facet<S: AsRef<str>>(values: &[S]) -> String {
    let joined = values.iter().map(|v| v.as_ref()).collect::<Vec<_>>().join(",");
    format!("[{}]", joined)
}

/// Ordered query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<K: Into<String>, V: ToString>(&mut self, key: K, value: V) -> &mut Self {
        self.pairs.push((key.into(), value.to_string()));
        self
    }

    pub fn with<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.push(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Percent-encoded `k=v&k=v` string
    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// `base?query`, or `base` alone when there are no parameters
    pub fn to_url(&self, base: &str) -> String {
        if self.pairs.is_empty() {
            base.to_string()
        } else {
            format!("{}?{}", base, self.encode())
        }
    }
}

/// The single facet a show listing may be restricted to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Facet {
    /// Plain A-Z catalog
    None,
    Category(String),
    Channel(String),
    Feature(String),
}

impl Facet {
    /// Build from the optional selectors; the first one given wins
    pub fn from_options(category: Option<&str>, channel: Option<&str>, feature: Option<&str>) -> Self {
        match (category, channel, feature) {
            (Some(c), _, _) => Facet::Category(c.to_string()),
            (None, Some(c), _) => Facet::Channel(c.to_string()),
            (None, None, Some(f)) => Facet::Feature(f.to_string()),
            (None, None, None) => Facet::None,
        }
    }

    /// Query parameter restricting the listing to this facet
    pub fn param(&self) -> (&'static str, String) {
        match self {
            Facet::None => ("facets[transcodingStatus]", "AVAILABLE".to_string()),
            Facet::Category(id) => ("facets[categories]", id.clone()),
            Facet::Channel(id) => ("facets[programBrands]", id.clone()),
            Facet::Feature(id) => ("facets[programTags.title]", id.clone()),
        }
    }

    pub fn cache_key(&self) -> String {
        match self {
            Facet::None => "programs.json".to_string(),
            Facet::Category(id) => format!("category.{}.json", id),
            Facet::Channel(id) => format!("channel.{}.json", id),
            Facet::Feature(id) => format!("featured.{}.json", id),
        }
    }

    pub fn to_params(&self) -> QueryParams {
        let (key, value) = self.param();
        QueryParams::new().with(key, value)
    }
}

/// Listing sub-type that drives pagination and filter rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingVariant {
    /// Program, season, category or feature browsing
    Catalog,
    Search,
    /// Newest episodes
    Recent,
    /// Episodes that disappear today
    Offline,
}

impl ListingVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Catalog => "catalog",
            Self::Search => "search",
            Self::Recent => "recent",
            Self::Offline => "offline",
        }
    }

    /// Parse a variety selector, `None` for anything that is not a paged variety
    pub fn from_variety(variety: &str) -> Option<Self> {
        match variety {
            "recent" => Some(Self::Recent),
            "offline" => Some(Self::Offline),
            _ => None,
        }
    }

    pub fn is_paged(&self) -> bool {
        !matches!(self, Self::Catalog)
    }
}

/// A search endpoint request: filters, window and cache identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    pub variant: ListingVariant,
    pub facet_filters: Vec<(String, String)>,
    pub page_size: u32,
    /// 1-based `from` parameter; `None` omits it
    pub start_index: Option<u32>,
    pub query: Option<String>,
    pub highlight: bool,
}

impl ListingRequest {
    /// Browse request for the catalog (150 per page, `from` added per page)
    pub fn browse() -> Self {
        Self {
            variant: ListingVariant::Catalog,
            facet_filters: Vec::new(),
            page_size: BROWSE_SIZE,
            start_index: None,
            query: None,
            highlight: false,
        }
    }

    /// One page of a paged variety (recent, offline, search)
    pub fn paged(variant: ListingVariant, page: u32) -> Result<Self> {
        Ok(Self {
            variant,
            facet_filters: Vec::new(),
            page_size: PAGED_SIZE,
            start_index: Some(start_offset(page, PAGED_SIZE)?),
            query: None,
            highlight: false,
        })
    }

    /// Free-text search with highlight spans
    pub fn search(query: &str, page: u32) -> Result<Self> {
        Ok(Self {
            query: Some(query.to_string()),
            highlight: true,
            ..Self::paged(ListingVariant::Search, page)?
        })
    }

    /// Single most recent episode of `program`
    pub fn latest_episode(program: &str) -> Self {
        Self {
            page_size: 1,
            ..Self::browse()
        }
        .facet("facets[programUrl]", program_to_url(program, UrlType::Long))
    }

    pub fn facet<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.facet_filters.push((key.into(), value.into()));
        self
    }

    pub fn has_facet(&self, key: &str) -> bool {
        self.facet_filters.iter().any(|(k, _)| k == key)
    }

    /// Same request starting at another offset
    pub fn starting_at(&self, start_index: u32) -> Self {
        Self {
            start_index: Some(start_index),
            ..self.clone()
        }
    }

    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        if let Some(from) = self.start_index {
            params.push("from", from);
        }
        params.push("i", "video");
        params.push("size", self.page_size);
        for (key, value) in &self.facet_filters {
            params.push(key.clone(), value);
        }
        if let Some(ref q) = self.query {
            params.push("q", q);
            if self.highlight {
                params.push("highlight", "true");
            }
        }
        params
    }

    pub fn to_url(&self, search_url: &str) -> String {
        self.to_params().to_url(search_url)
    }

    /// Cache key for a paged variety page: `<variety>-<page>.json` or
    /// `my-<variety>-<page>.json` when scoped to favorites
    pub fn paged_cache_key(variant: ListingVariant, page: u32, favorites_scoped: bool) -> String {
        if favorites_scoped {
            format!("my-{}-{}.json", variant.as_str(), page)
        } else {
            format!("{}-{}.json", variant.as_str(), page)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_offsets() {
        assert_eq!(start_offset(1, 50).unwrap(), 1);
        assert_eq!(start_offset(2, 50).unwrap(), 51);
        assert_eq!(start_offset(3, 50).unwrap(), 101);
        assert_eq!(start_offset(0, 50).unwrap(), 1);
    }

    #[test]
    fn test_huge_page_is_rejected_not_wrapped() {
        let err = start_offset(100_000_000, PAGED_SIZE).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidInput(_)));
        assert!(start_offset(u32::MAX, PAGED_SIZE).is_err());
        assert!(ListingRequest::search("thuis", 100_000_000).is_err());

        // Largest page whose offset still fits
        let last = (u32::MAX - 1) / PAGED_SIZE + 1;
        assert_eq!(start_offset(last, PAGED_SIZE).unwrap(), (last - 1) * PAGED_SIZE + 1);
        assert!(start_offset(last + 1, PAGED_SIZE).is_err());
    }

    #[test]
    fn test_facet_param_and_cache_key_agree() {
        let cases = [
            (Facet::None, "facets[transcodingStatus]", "AVAILABLE", "programs.json"),
            (Facet::Category("docu".into()), "facets[categories]", "docu", "category.docu.json"),
            (Facet::Channel("een".into()), "facets[programBrands]", "een", "channel.een.json"),
            (Facet::Feature("kijk-cijfers".into()), "facets[programTags.title]", "kijk-cijfers", "featured.kijk-cijfers.json"),
        ];
        for (facet, key, value, cache_key) in cases {
            assert_eq!(facet.param(), (key, value.to_string()));
            assert_eq!(facet.cache_key(), cache_key);
        }
    }

    #[test]
    fn test_facet_selection_priority() {
        assert_eq!(Facet::from_options(None, None, None), Facet::None);
        assert_eq!(Facet::from_options(None, Some("een"), None), Facet::Channel("een".into()));
        assert_eq!(Facet::from_options(Some("docu"), Some("een"), None), Facet::Category("docu".into()));
    }

    #[test]
    fn test_list_facet_encoding() {
        let url = ListingRequest::paged(ListingVariant::Recent, 2)
            .unwrap()
            .facet("facets[programBrands]", list_facet(&["een", "canvas"]))
            .to_url("https://vrtnu-api.vrt.be/search");

        assert_eq!(
            url,
            "https://vrtnu-api.vrt.be/search?from=51&i=video&size=50&facets%5BprogramBrands%5D=%5Been%2Ccanvas%5D"
        );
    }

    #[test]
    fn test_search_request_params() {
        let params = ListingRequest::search("de ideale wereld", 1).unwrap().to_params();
        assert_eq!(params.get("q"), Some("de ideale wereld"));
        assert_eq!(params.get("highlight"), Some("true"));
        assert_eq!(params.get("size"), Some("50"));
        assert!(params.encode().contains("q=de%20ideale%20wereld"));
    }

    #[test]
    fn test_latest_episode_request() {
        let params = ListingRequest::latest_episode("thuis").to_params();
        assert_eq!(params.get("size"), Some("1"));
        assert_eq!(params.get("facets[programUrl]"), Some("//www.vrt.be/vrtnu/a-z/thuis/"));
        assert!(!params.contains("from"));
    }

    #[test]
    fn test_paged_cache_keys() {
        assert_eq!(ListingRequest::paged_cache_key(ListingVariant::Recent, 1, false), "recent-1.json");
        assert_eq!(ListingRequest::paged_cache_key(ListingVariant::Offline, 3, true), "my-offline-3.json");
    }
}
