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


//! Shared fakes for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use catalog_sync::api::{CatalogClient, FetchRequest};
use catalog_sync::cache::MemoryCache;
use catalog_sync::catalog::CatalogAggregator;
use catalog_sync::config::{CatalogConfig, StaticData};
use catalog_sync::favorites::FavoritesQuery;
use catalog_sync::Result;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

type Responder = Box<dyn Fn(&FetchRequest) -> Result<Value> + Send + Sync>;

/// Answers every request through a closure and records it
pub struct ScriptedClient {
    responder: Responder,
    requests: Mutex<Vec<FetchRequest>>,
}

impl ScriptedClient {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&FetchRequest) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Same body for every request
    pub fn always(body: Value) -> Self {
        Self::new(move |_| Ok(body.clone()))
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }
}

#[async_trait]
impl CatalogClient for ScriptedClient {
    async fn fetch(&self, request: FetchRequest) -> Result<Value> {
        self.requests.lock().unwrap().push(request.clone());
        (self.responder)(&request)
    }
}

/// Favorites served from a fixed set of program slugs
pub struct FixedFavorites {
    programs: BTreeSet<String>,
}

impl FixedFavorites {
    pub fn new(programs: &[&str]) -> Self {
        Self {
            programs: programs.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl FavoritesQuery for FixedFavorites {
    fn is_activated(&self) -> bool {
        true
    }

    fn is_favorite(&self, program: &str) -> bool {
        self.programs.contains(program)
    }

    fn favorite_programs(&self) -> BTreeSet<String> {
        self.programs.clone()
    }
}

pub fn aggregator(client: Arc<ScriptedClient>, cache: Arc<MemoryCache>, favorites: &[&str]) -> CatalogAggregator {
    CatalogAggregator::new(
        client,
        cache,
        Arc::new(FixedFavorites::new(favorites)),
        CatalogConfig::default(),
        Arc::new(StaticData::builtin()),
    )
}

/// Search endpoint episode document
pub fn episode(program: &str, video_id: &str) -> Value {
    json!({
        "program": program,
        "programUrl": format!("//www.vrt.be/vrtnu/a-z/{}/", program),
        "programType": "reeksoplopend",
        "title": format!("Episode {}", video_id),
        "seasonTitle": "1",
        "seasonName": "1",
        "videoId": video_id,
        "publicationId": format!("pbs-pub-{}", video_id),
        "broadcastDate": -1,
        "displayOptions": { "showEpisodeTitle": true },
    })
}

/// Search endpoint page
pub fn search_page(results: Vec<Value>, total_results: u64, total_pages: u64, page_size: u64) -> Value {
    json!({
        "meta": {
            "total_results": total_results,
            "pages": { "total": total_pages, "size": page_size },
        },
        "results": results,
    })
}

/// Suggest endpoint show document
pub fn show(program: &str, title: &str) -> Value {
    json!({
        "title": title,
        "description": format!("About {}", title),
        "targetUrl": format!("//www.vrt.be/vrtnu/a-z/{}.relevant/", program),
        "thumbnail": format!("//images.vrt.be/{}.jpg", program),
        "brands": ["een"],
    })
}
