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


//! Catalog aggregation against a scripted catalog

mod common;

use catalog_sync::api::{Facet, ListingVariant};
use catalog_sync::cache::{CacheStore, MemoryCache};
use catalog_sync::catalog::{ChannelTarget, EpisodeListing, EpisodeQuery, SeasonSelection};
use catalog_sync::presentation::SortField;
use catalog_sync::CatalogError;
use chrono::{TimeZone, Utc};
use common::{aggregator, episode, search_page, show, ScriptedClient};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_browse_fetches_every_page_in_order() {
    let client = Arc::new(ScriptedClient::new(|request| {
        let (start, end) = if request.url.contains("from=51&") {
            (50, 100)
        } else if request.url.contains("from=101&") {
            (100, 120)
        } else {
            (0, 50)
        };
        let results = (start..end).map(|i| episode("thuis", &format!("v{}", i))).collect();
        Ok(search_page(results, 120, 3, 50))
    }));
    let catalog = aggregator(client.clone(), Arc::new(MemoryCache::new()), &[]);

    let listing = catalog.get_episode_items(&EpisodeQuery::program("thuis")).await.unwrap();

    let episodes = listing.episodes().expect("episode listing");
    assert_eq!(episodes.len(), 120);
    let ids: Vec<String> = episodes.items.iter().filter_map(|e| e.video_id.clone()).collect();
    let expected: Vec<String> = (0..120).map(|i| format!("v{}", i)).collect();
    assert_eq!(ids, expected);

    let urls = client.urls();
    assert_eq!(urls.len(), 3);
    assert!(!urls[0].contains("from="));
    assert!(urls[0].contains("facets%5BprogramUrl%5D=%2F%2Fwww.vrt.be%2Fvrtnu%2Fa-z%2Fthuis%2F"));
    assert!(urls[1].contains("from=51&"));
    assert!(urls[2].contains("from=101&"));
}

#[tokio::test]
async fn test_single_page_needs_one_fetch() {
    let client = Arc::new(ScriptedClient::always(search_page(vec![episode("thuis", "v1")], 1, 1, 150)));
    let catalog = aggregator(client.clone(), Arc::new(MemoryCache::new()), &[]);

    let listing = catalog.get_episode_items(&EpisodeQuery::program("thuis")).await.unwrap();

    assert_eq!(listing.episodes().unwrap().len(), 1);
    assert_eq!(client.urls().len(), 1);
}

#[tokio::test]
async fn test_season_matches_exactly() {
    let results: Vec<_> = ["1", "10", "11", "1"]
        .iter()
        .enumerate()
        .map(|(i, season)| {
            let mut e = episode("de-ideale-wereld", &format!("v{}", i));
            e["seasonTitle"] = json!(season);
            e
        })
        .collect();
    let client = Arc::new(ScriptedClient::always(search_page(results, 4, 1, 150)));
    let catalog = aggregator(client.clone(), Arc::new(MemoryCache::new()), &[]);

    let query = EpisodeQuery::program("de-ideale-wereld").season(SeasonSelection::Only("1".to_string()));
    let listing = catalog.get_episode_items(&query).await.unwrap();

    let episodes = listing.episodes().unwrap();
    assert_eq!(episodes.len(), 2);
    assert!(episodes.items.iter().all(|e| e.season.as_deref() == Some("1")));
    assert!(client.urls()[0].contains("facets%5BseasonTitle%5D=1"));
}

#[tokio::test]
async fn test_multiple_seasons_yield_season_listing() {
    let mut page = search_page(vec![episode("thuis", "v1")], 300, 2, 150);
    page["facets"] = json!({
        "facets": [
            { "name": "seasons", "buckets": [ { "key": "2", "doc_count": 150 }, { "key": "1", "doc_count": 150 } ] }
        ]
    });
    let client = Arc::new(ScriptedClient::always(page));
    let catalog = aggregator(client.clone(), Arc::new(MemoryCache::new()), &[]);

    let listing = catalog.get_episode_items(&EpisodeQuery::program("thuis")).await.unwrap();

    let seasons = listing.seasons().expect("season listing");
    assert_eq!(seasons.len(), 2);
    assert_eq!(seasons.items[0].season, SeasonSelection::Only("1".to_string()));
    assert_eq!(seasons.items[0].program.as_deref(), Some("thuis"));
    // No further pages once seasons are known
    assert_eq!(client.urls().len(), 1);
}

#[tokio::test]
async fn test_all_seasons_skips_season_listing() {
    let mut page = search_page(vec![episode("thuis", "v1"), episode("thuis", "v2")], 2, 1, 150);
    page["facets"] = json!({
        "facets": [ { "name": "seasons", "buckets": [ { "key": "1", "doc_count": 1 }, { "key": "2", "doc_count": 1 } ] } ]
    });
    let client = Arc::new(ScriptedClient::always(page));
    let catalog = aggregator(client, Arc::new(MemoryCache::new()), &[]);

    let query = EpisodeQuery::program("thuis").season(SeasonSelection::All);
    match catalog.get_episode_items(&query).await.unwrap() {
        EpisodeListing::Episodes(listing) => assert_eq!(listing.len(), 2),
        EpisodeListing::Seasons(_) => panic!("expected episodes"),
    }
}

#[tokio::test]
async fn test_malformed_pagination_fails() {
    let client = Arc::new(ScriptedClient::always(json!({ "results": [episode("thuis", "v1")] })));
    let catalog = aggregator(client.clone(), Arc::new(MemoryCache::new()), &[]);

    let err = catalog.get_episode_items(&EpisodeQuery::program("thuis")).await.unwrap_err();
    assert!(matches!(err, CatalogError::MalformedPagination(_)));

    let client = Arc::new(ScriptedClient::always(search_page(vec![], 120, 2, 50)));
    let catalog = aggregator(client, Arc::new(MemoryCache::new()), &[]);
    let err = catalog.get_episode_items(&EpisodeQuery::category("docu")).await.unwrap_err();
    assert!(matches!(err, CatalogError::MalformedPagination(_)));
}

#[tokio::test]
async fn test_favorites_scoped_recent_page() {
    let results = vec![episode("thuis", "v1"), episode("factcheck", "v2"), episode("thuis", "v3")];
    let client = Arc::new(ScriptedClient::always(search_page(results, 3, 1, 50)));
    let cache = Arc::new(MemoryCache::new());
    let catalog = aggregator(client.clone(), cache.clone(), &["thuis"]);

    let query = EpisodeQuery::variety(ListingVariant::Recent, Some(1)).favorites(true);
    let listing = catalog.get_episode_items(&query).await.unwrap();
    let episodes = listing.episodes().unwrap();

    assert_eq!(episodes.len(), 2);
    assert!(episodes.items.iter().all(|e| e.program.as_deref() == Some("thuis") && e.is_favorite));
    assert_eq!(episodes.items[0].cache_key.as_deref(), Some("my-recent-1.json"));
    assert_eq!(episodes.items[0].label, "thuis - Episode v1");
    assert_eq!(episodes.sort, SortField::DateAdded);
    assert!(!episodes.ascending);

    let url = &client.urls()[0];
    assert!(url.contains("from=1&"));
    assert!(url.contains("size=50"));
    assert!(url.contains("facets%5BprogramUrl%5D=%5B%2F%2Fwww.vrt.be%2Fvrtnu%2Fa-z%2Fthuis%2F%5D"));
    assert!(cache.contains("my-recent-1.json").await);

    // Served from cache the second time
    catalog.get_episode_items(&query).await.unwrap();
    assert_eq!(client.urls().len(), 1);
}

#[tokio::test]
async fn test_unscoped_page_filters_on_channels() {
    let results = vec![episode("thuis", "v1"), episode("factcheck", "v2")];
    let client = Arc::new(ScriptedClient::always(search_page(results, 2, 1, 50)));
    let cache = Arc::new(MemoryCache::new());
    let catalog = aggregator(client.clone(), cache.clone(), &["thuis"]);

    let query = EpisodeQuery::variety(ListingVariant::Recent, Some(0));
    let listing = catalog.get_episode_items(&query).await.unwrap();

    assert_eq!(listing.episodes().unwrap().len(), 2);
    assert!(cache.contains("recent-1.json").await);
    let url = &client.urls()[0];
    assert!(url.contains("facets%5BprogramBrands%5D=%5Been%2Ccanvas%2Cketnet%2Cketnet-jr%2Cpodium19%2C"));
    assert!(url.contains("%2Cvrtnxt%2Cde-warmste-week%5D"));
    assert!(!url.contains("vrt-events"));
}

#[tokio::test]
async fn test_offline_uses_brussels_date() {
    let client = Arc::new(ScriptedClient::always(search_page(vec![], 0, 0, 50)));
    let catalog = aggregator(client.clone(), Arc::new(MemoryCache::new()), &[])
        .with_clock(|| Utc.with_ymd_and_hms(2024, 3, 31, 22, 30, 0).unwrap());

    let query = EpisodeQuery::variety(ListingVariant::Offline, Some(3));
    let listing = catalog.get_episode_items(&query).await.unwrap();

    assert!(listing.episodes().unwrap().is_empty());
    let url = &client.urls()[0];
    assert!(url.contains("from=101&"));
    assert!(url.contains("facets%5BassetOffTime%5D=2024-04-01"));
}

#[tokio::test]
async fn test_show_items_filter_after_caching() {
    let client = Arc::new(ScriptedClient::always(json!([show("thuis", "Thuis"), show("factcheck", "Factcheck")])));
    let cache = Arc::new(MemoryCache::new());
    let catalog = aggregator(client.clone(), cache.clone(), &["thuis"]);

    let favorites = catalog.get_show_items(&Facet::None, true).await.unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].program, "thuis");
    assert_eq!(favorites[0].label, "Thuis");
    assert!(favorites[0].is_favorite);
    assert_eq!(favorites[0].cache_key, "programs.json");
    assert_eq!(favorites[0].art.thumb, "https://images.vrt.be/thuis.jpg");

    // The unfiltered view comes from the same cache entry
    let all = catalog.get_show_items(&Facet::None, false).await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(!all[1].is_favorite);

    let urls = client.urls();
    assert_eq!(urls.len(), 1);
    assert!(urls[0].starts_with("https://vrtnu-api.vrt.be/suggest?"));
    assert!(urls[0].contains("facets%5BtranscodingStatus%5D=AVAILABLE"));
}

#[tokio::test]
async fn test_show_items_per_facet_cache_key() {
    let client = Arc::new(ScriptedClient::always(json!([show("thuis", "Thuis")])));
    let cache = Arc::new(MemoryCache::new());
    let catalog = aggregator(client.clone(), cache.clone(), &[]);

    catalog.get_show_items(&Facet::Channel("een".to_string()), false).await.unwrap();
    catalog.get_show_items(&Facet::Category("docu".to_string()), false).await.unwrap();

    assert_eq!(cache.keys().await, vec!["category.docu.json", "channel.een.json"]);
    assert!(client.urls()[0].contains("facets%5BprogramBrands%5D=een"));
}

#[tokio::test]
async fn test_transport_errors_propagate() {
    let client = Arc::new(ScriptedClient::new(|request| {
        Err(CatalogError::api_failed("unavailable", Some(503), Some(request.url.clone())))
    }));
    let cache = Arc::new(MemoryCache::new());
    let catalog = aggregator(client, cache.clone(), &[]);

    let err = catalog.get_show_items(&Facet::None, false).await.unwrap_err();
    assert!(err.is_transport_error());
    assert_eq!(err.status_code(), Some(503));
    assert!(cache.keys().await.is_empty());
}

#[tokio::test]
async fn test_search_applies_highlights() {
    let mut result = episode("de-ideale-wereld", "v1");
    result["program"] = json!("De Ideale Wereld");
    result["highlight"] = json!({ "title": ["De <em>ideale</em> wereld"] });
    let client = Arc::new(ScriptedClient::always(search_page(vec![result], 1, 1, 50)));
    let catalog = aggregator(client.clone(), Arc::new(MemoryCache::new()), &[]);

    let listing = catalog.search("ideale", Some(2)).await.unwrap();

    assert_eq!(listing.items[0].label, "De Ideale Wereld - De [B][COLOR yellow]ideale[/COLOR][/B] wereld");
    let url = &client.urls()[0];
    assert!(url.contains("from=51&"));
    assert!(url.contains("q=ideale&highlight=true"));
}

#[tokio::test]
async fn test_blank_search_does_not_fetch() {
    let client = Arc::new(ScriptedClient::always(json!({})));
    let catalog = aggregator(client.clone(), Arc::new(MemoryCache::new()), &[]);

    assert!(catalog.search("   ", None).await.unwrap().is_empty());
    assert!(client.urls().is_empty());
}

#[tokio::test]
async fn test_out_of_range_pages_fail_without_fetching() {
    let client = Arc::new(ScriptedClient::always(search_page(vec![], 0, 0, 50)));
    let catalog = aggregator(client.clone(), Arc::new(MemoryCache::new()), &[]);

    let err = catalog.search("thuis", Some(100_000_000)).await.unwrap_err();
    assert!(matches!(err, CatalogError::InvalidInput(_)));

    let query = EpisodeQuery::variety(ListingVariant::Recent, Some(i64::MAX));
    let err = catalog.get_episode_items(&query).await.unwrap_err();
    assert!(matches!(err, CatalogError::InvalidInput(_)));
    assert!(client.urls().is_empty());
}

#[tokio::test]
async fn test_latest_episode() {
    let client = Arc::new(ScriptedClient::always(search_page(vec![episode("thuis", "v9")], 40, 40, 1)));
    let catalog = aggregator(client.clone(), Arc::new(MemoryCache::new()), &[]);

    let latest = catalog.get_latest_episode("thuis").await.unwrap().expect("latest episode");
    assert_eq!(latest.video_id.as_deref(), Some("v9"));
    assert_eq!(latest.publication_id.as_deref(), Some("pbs-pub-v9"));
    assert!(client.urls()[0].contains("size=1"));

    let empty = Arc::new(ScriptedClient::always(search_page(vec![], 0, 0, 1)));
    let catalog = aggregator(empty, Arc::new(MemoryCache::new()), &[]);
    assert_eq!(catalog.get_latest_episode("nothing").await.unwrap(), None);
}

#[tokio::test]
async fn test_static_listings() {
    let client = Arc::new(ScriptedClient::always(json!({})));
    let catalog = aggregator(client.clone(), Arc::new(MemoryCache::new()), &[]);

    assert_eq!(catalog.get_featured_items().len(), 8);

    let live = catalog.get_channel_items(&[], true);
    assert!(live.iter().all(|c| c.is_playable()));
    assert!(live.iter().all(|c| c.name != "vrtnxt"));
    assert_eq!(live[0].target, ChannelTarget::PlayId("vualto_een_geo".to_string()));
    assert_eq!(live[0].label, "Watch Eén live");
    assert_eq!(live[0].cache_key.as_deref(), Some("channel.een.json"));
    assert_eq!(live[0].art.thumb, "resource://resource.images.studios.white/Een.png");
    let events = live.iter().find(|c| c.name == "vrt-events1").expect("events channel is live");
    assert_eq!(events.target, ChannelTarget::PlayId("vualto_events1_geo".to_string()));
    assert_eq!(events.art.icon, "resource://resource.images.studios.white/VRT.png");

    let single = catalog.get_channel_items(&["canvas".to_string()], true);
    assert_eq!(single.len(), 1);
    assert_eq!(single[0].label, "[B]Watch Canvas live[/B]");

    let listings = catalog.get_channel_items(&[], false);
    assert_eq!(listings.len(), 17);
    assert_eq!(listings[0].target, ChannelTarget::Listing("een".to_string()));
    assert!(client.urls().is_empty());
}

#[tokio::test]
async fn test_delete_cache_removes_one_listing() {
    let client = Arc::new(ScriptedClient::always(json!({})));
    let cache = Arc::new(MemoryCache::new());
    cache.put("programs.json", b"[]").await.unwrap();
    cache.put("recent-1.json", b"{}").await.unwrap();
    cache.put("recent-2.json", b"{}").await.unwrap();
    let catalog = aggregator(client, cache.clone(), &[]);

    assert!(catalog.delete_cache("programs.json").await.unwrap());
    // Keys are never treated as patterns
    assert!(!catalog.delete_cache("recent-*.json").await.unwrap());
    assert_eq!(cache.keys().await, vec!["recent-1.json", "recent-2.json"]);
}

// ============================================================================
// CATEGORIES
// ============================================================================

mod categories {
    use super::*;
    use async_trait::async_trait;
    use catalog_sync::catalog::CategorySource;
    use catalog_sync::config::{Category, StaticData};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        result: Option<Vec<Category>>,
        calls: AtomicUsize,
    }

    impl CountingSource {
        fn failing() -> Self {
            Self {
                result: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn returning(categories: Vec<Category>) -> Self {
            Self {
                result: Some(categories),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CategorySource for CountingSource {
        async fn fetch_categories(&self) -> catalog_sync::Result<Vec<Category>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result
                .clone()
                .ok_or_else(|| CatalogError::network_error("scrape failed", true))
        }
    }

    fn docu() -> Category {
        Category {
            id: "docu".to_string(),
            name: "Docu".to_string(),
            thumbnail: Some("https://images.vrt.be/docu.jpg".to_string()),
        }
    }

    #[tokio::test]
    async fn test_builtin_categories_when_everything_fails() {
        let client = Arc::new(ScriptedClient::always(json!({})));
        let source = Arc::new(CountingSource::failing());
        let catalog = aggregator(client, Arc::new(MemoryCache::new()), &[]).with_category_source(source.clone());

        let items = catalog.get_categories().await;

        assert_eq!(items.len(), StaticData::builtin().categories.len());
        assert_eq!(items[0].art.thumb, "DefaultGenre.png");
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_stale_cache_beats_builtin() {
        let client = Arc::new(ScriptedClient::always(json!({})));
        let cache = Arc::new(MemoryCache::new());
        let payload = serde_json::to_vec(&vec![docu()]).unwrap();
        cache.put_at("categories.json", &payload, Utc::now() - chrono::Duration::days(30)).await;
        let catalog = aggregator(client, cache, &[]).with_category_source(Arc::new(CountingSource::failing()));

        let items = catalog.get_categories().await;

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "docu");
        assert_eq!(items[0].plot, "[B]Docu[/B]");
        assert_eq!(items[0].art.thumb, "https://images.vrt.be/docu.jpg");
    }

    #[tokio::test]
    async fn test_scraped_categories_are_cached() {
        let client = Arc::new(ScriptedClient::always(json!({})));
        let cache = Arc::new(MemoryCache::new());
        let source = Arc::new(CountingSource::returning(vec![docu()]));
        let catalog = aggregator(client, cache.clone(), &[]).with_category_source(source.clone());

        assert_eq!(catalog.get_categories().await.len(), 1);
        assert!(cache.contains("categories.json").await);

        // Fresh cache wins over the source
        assert_eq!(catalog.get_categories().await.len(), 1);
        assert_eq!(source.calls(), 1);
    }
}
