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


//! Remote catalog access
//!
//! - [`client`] - transport contract and the reqwest implementation
//! - [`query`] - query strings and cache keys for every listing
//! - [`models`] - typed records parsed from the endpoint responses

pub mod client;
pub mod models;
pub mod query;

// Re-export commonly used types
pub use client::{CatalogClient, ClientConfig, FetchRequest, HttpCatalogClient};
pub use models::{RawEpisode, RawShow, SearchResponse, SeasonBucket};
pub use query::{Facet, ListingRequest, ListingVariant, QueryParams};
