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


//! Category list sources
//!
//! The category overview is scraped from the public website because the
//! catalog API has no endpoint for it. The aggregator treats the scrape as one
//! step in a fallback chain, so a [`CategorySource`] failing is never fatal.

use crate::api::client::HttpCatalogClient;
use crate::config::Category;
use crate::error::Result;
use crate::presentation::strip_newlines;
use crate::program::add_https_method;
use async_trait::async_trait;
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

lazy_static! {
    static ref TILE: Selector = Selector::parse("nui-list--content nui-tile").expect("valid selector");
    static ref MEDIA: Selector = Selector::parse(".media").expect("valid selector");
    static ref LINK: Selector = Selector::parse("a").expect("valid selector");
}

#[async_trait]
pub trait CategorySource: Send + Sync {
    async fn fetch_categories(&self) -> Result<Vec<Category>>;
}

/// Scrapes the category tiles from the website
#[derive(Debug, Clone)]
pub struct HtmlCategorySource {
    client: HttpCatalogClient,
    url: String,
}

impl HtmlCategorySource {
    pub fn new<S: Into<String>>(client: HttpCatalogClient, url: S) -> Self {
        Self { client, url: url.into() }
    }
}

#[async_trait]
impl CategorySource for HtmlCategorySource {
    async fn fetch_categories(&self) -> Result<Vec<Category>> {
        let html = self.client.get_text(&self.url).await?;
        let categories = parse_categories(&html);
        debug!(count = categories.len(), "Scraped categories");
        Ok(categories)
    }
}

/// Extract categories from the overview page
///
/// The id is the second to last path segment of the tile link
/// (`/vrtnu/categorieen/docu/` → `docu`).
pub fn parse_categories(html: &str) -> Vec<Category> {
    let document = Html::parse_document(html);
    document
        .select(&TILE)
        .filter_map(|tile| {
            let href = tile.value().attr("href")?;
            let id = href.trim_end_matches('/').rsplit('/').next()?.to_string();
            if id.is_empty() {
                return None;
            }
            Some(Category {
                id,
                name: tile_title(&tile),
                thumbnail: tile_thumbnail(&tile),
            })
        })
        .collect()
}

fn tile_thumbnail(tile: &ElementRef<'_>) -> Option<String> {
    tile.select(&MEDIA)
        .next()
        .and_then(|media| media.value().attr("data-responsive-image"))
        .map(add_https_method)
}

fn tile_title(tile: &ElementRef<'_>) -> String {
    tile.select(&LINK)
        .next()
        .and_then(|link| link.text().next())
        .map(strip_newlines)
        .unwrap_or_default()
}
