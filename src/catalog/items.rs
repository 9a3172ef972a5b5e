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


//! Listing entries handed to the display layer
//!
//! Every entry is a plain value: it owns its strings and carries no reference
//! back into the aggregator, the cache or the favorites store.

use super::SeasonSelection;
use crate::presentation::{Artwork, SortField};
use chrono::{DateTime, Utc};

/// Entries plus the order the display layer should keep them in
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub sort: SortField,
    pub ascending: bool,
}

impl<T> Listing<T> {
    pub fn new(items: Vec<T>, sort: SortField, ascending: bool) -> Self {
        Self { items, sort, ascending }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A browse request yields either episodes or the program's seasons
#[derive(Debug, Clone, PartialEq)]
pub enum EpisodeListing {
    Episodes(Listing<EpisodeItem>),
    Seasons(Listing<SeasonItem>),
}

impl EpisodeListing {
    pub fn episodes(&self) -> Option<&Listing<EpisodeItem>> {
        match self {
            Self::Episodes(listing) => Some(listing),
            Self::Seasons(_) => None,
        }
    }

    pub fn seasons(&self) -> Option<&Listing<SeasonItem>> {
        match self {
            Self::Episodes(_) => None,
            Self::Seasons(listing) => Some(listing),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShowItem {
    /// Program slug
    pub program: String,
    pub label: String,
    pub plot: String,
    pub brands: Vec<String>,
    pub permalink: Option<String>,
    pub art: Artwork,
    pub is_favorite: bool,
    /// Cache entry the listing was served from
    pub cache_key: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeItem {
    pub program: Option<String>,
    pub label: String,
    pub tvshow_title: Option<String>,
    pub plot: String,
    pub plot_outline: Option<String>,
    pub season: Option<String>,
    pub episode: Option<String>,
    pub duration_secs: Option<f64>,
    pub aired: Option<DateTime<Utc>>,
    pub brands: Vec<String>,
    pub geo_blocked: bool,
    pub permalink: Option<String>,
    pub on_time: Option<DateTime<Utc>>,
    pub off_time: Option<DateTime<Utc>>,
    pub video_id: Option<String>,
    pub publication_id: Option<String>,
    pub art: Artwork,
    pub is_favorite: bool,
    /// Set for paged varieties, which are the only cached episode listings
    pub cache_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeasonItem {
    pub program: Option<String>,
    /// `All` for the synthetic "all seasons" entry
    pub season: SeasonSelection,
    pub label: String,
    pub plot: String,
    pub art: Artwork,
    pub episode_count_hint: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryItem {
    pub id: String,
    pub label: String,
    pub plot: String,
    pub art: Artwork,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeaturedItem {
    pub id: String,
    pub label: String,
    pub plot: String,
    pub art: Artwork,
}

/// What selecting a channel entry leads to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelTarget {
    /// The channel's program listing
    Listing(String),
    /// Live stream by video id
    PlayId(String),
    /// Live stream by page URL
    PlayUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelItem {
    pub name: String,
    pub label: String,
    pub plot: String,
    pub studio: String,
    pub target: ChannelTarget,
    pub art: Artwork,
    pub cache_key: Option<String>,
}

impl ChannelItem {
    pub fn is_playable(&self) -> bool {
        !matches!(self.target, ChannelTarget::Listing(_))
    }
}
