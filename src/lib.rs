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


//! Catalog aggregation and favorites synchronization for the VRT NU catalog
//!
//! - [`catalog`] builds display-ready listings from the remote catalog
//! - [`favorites`] keeps the followed programs in sync with the favorites service
//! - [`presentation`] decides labels and sort order per listing
//! - [`cache`] stores raw responses under per-listing keys

pub mod api;
pub mod auth;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod favorites;
pub mod presentation;
pub mod program;

pub use error::{CatalogError, Result};
