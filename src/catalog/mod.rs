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


//! Catalog aggregation
//!
//! [`CatalogAggregator`] turns the remote search and suggest endpoints into
//! display-ready listings. It decides per request how to page through the
//! catalog, which cache key a listing lives under and whether favorites
//! restrict it.
//!
//! # Regimes
//! - **Paged** (`recent`, `offline`, search): exactly one 50-item page,
//!   addressed by a 1-based `from` offset
//! - **Browse** (program, category, feature): 150 per page, every page is
//!   fetched sequentially unless the first page shows more than one season
//!
//! # Caching
//!
//! | listing | key | TTL |
//! |---------|-----|-----|
//! | shows | `programs.json`, `category.<id>.json`, ... | 1 hour |
//! | paged varieties | `<variety>-<page>.json`, `my-<variety>-<page>.json` | 1 hour |
//! | categories | `categories.json` | 7 days, then any age as fallback |
//!
//! Browse and search results are never cached. Favorites filtering happens
//! after the raw response is stored, so one cache entry serves both the
//! filtered and the unfiltered view.

pub mod categories;
pub mod items;
mod seasons;

pub use categories::{parse_categories, CategorySource, HtmlCategorySource};
pub use items::{
    CategoryItem, ChannelItem, ChannelTarget, EpisodeItem, EpisodeListing, FeaturedItem, Listing, SeasonItem,
    ShowItem,
};

use crate::api::client::{CatalogClient, FetchRequest};
use crate::api::models::{LatestEpisode, RawEpisode, RawShow, SearchResponse, SeasonBucket};
use crate::api::query::{list_facet, Facet, ListingRequest, ListingVariant};
use crate::cache::{get_json, put_json, CacheStore, CacheTtl};
use crate::config::{CatalogConfig, Category, StaticData};
use crate::error::{CatalogError, Result};
use crate::favorites::FavoritesQuery;
use crate::presentation::{
    apply_highlights, broadcast_time, classify, episode_artwork, episode_permalink, episode_plot, html_to_label,
    parse_timestamp, show_artwork, unescape, Artwork, SortField, TitleType, DEFAULT_FEATURE_ART, DEFAULT_GENRE_ART,
};
use crate::program::{program_to_id, program_to_url, realpage, shorten_link, url_to_program, UrlType};
use chrono::{DateTime, Utc};
use chrono_tz::Europe::Brussels;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const CATEGORIES_CACHE_KEY: &str = "categories.json";

/// Value of the season selector that asks for every season at once
pub const ALL_SEASONS: &str = "allseasons";

const SEASON_FACET: &str = "facets[seasonTitle]";

const STUDIO_ART: &str = "resource://resource.images.studios.white";

fn listing_ttl() -> CacheTtl {
    CacheTtl::hours(1)
}

fn categories_ttl() -> CacheTtl {
    CacheTtl::days(7)
}

/// Which seasons of a program to list
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SeasonSelection {
    /// Let the catalog decide: season buckets when there are several
    #[default]
    Unspecified,
    /// Every episode of every season in one listing
    All,
    /// One season, matched exactly on its title
    Only(String),
}

impl SeasonSelection {
    /// Parse the season selector used in listing paths
    pub fn from_option(season: Option<&str>) -> Self {
        match season {
            None | Some("") => Self::Unspecified,
            Some(ALL_SEASONS) => Self::All,
            Some(season) => Self::Only(season.to_string()),
        }
    }

    pub fn as_option(&self) -> Option<&str> {
        match self {
            Self::Unspecified => None,
            Self::All => Some(ALL_SEASONS),
            Self::Only(season) => Some(season),
        }
    }

    fn accepts(&self, episode: &RawEpisode) -> bool {
        match self {
            Self::Only(season) => episode.season_title.as_deref() == Some(season.as_str()),
            Self::Unspecified | Self::All => true,
        }
    }
}

/// Selection for [`CatalogAggregator::get_episode_items`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpisodeQuery {
    pub program: Option<String>,
    pub season: SeasonSelection,
    pub category: Option<String>,
    pub feature: Option<String>,
    pub program_type: Option<String>,
    /// 1-based page for paged varieties; anything below 1 means page 1
    pub page: Option<i64>,
    pub use_favorites: bool,
    /// `Recent` or `Offline` switch to the paged regime
    pub variety: Option<ListingVariant>,
}

impl EpisodeQuery {
    pub fn program<S: Into<String>>(program: S) -> Self {
        Self {
            program: Some(program.into()),
            ..Self::default()
        }
    }

    pub fn category<S: Into<String>>(category: S) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }

    pub fn feature<S: Into<String>>(feature: S) -> Self {
        Self {
            feature: Some(feature.into()),
            ..Self::default()
        }
    }

    pub fn variety(variety: ListingVariant, page: Option<i64>) -> Self {
        Self {
            variety: Some(variety),
            page,
            ..Self::default()
        }
    }

    pub fn season(mut self, season: SeasonSelection) -> Self {
        self.season = season;
        self
    }

    pub fn program_type<S: Into<String>>(mut self, program_type: S) -> Self {
        self.program_type = Some(program_type.into());
        self
    }

    pub fn favorites(mut self, use_favorites: bool) -> Self {
        self.use_favorites = use_favorites;
        self
    }

    fn paged_variety(&self) -> Option<ListingVariant> {
        self.variety.filter(|v| matches!(v, ListingVariant::Recent | ListingVariant::Offline))
    }
}

/// Raw outcome of browsing the catalog
enum Aggregated {
    Episodes(Vec<RawEpisode>),
    Seasons {
        buckets: Vec<SeasonBucket>,
        episodes: Vec<RawEpisode>,
    },
}

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub struct CatalogAggregator {
    client: Arc<dyn CatalogClient>,
    cache: Arc<dyn CacheStore>,
    favorites: Arc<dyn FavoritesQuery>,
    config: CatalogConfig,
    data: Arc<StaticData>,
    category_source: Option<Arc<dyn CategorySource>>,
    clock: Clock,
}

impl CatalogAggregator {
    pub fn new(
        client: Arc<dyn CatalogClient>,
        cache: Arc<dyn CacheStore>,
        favorites: Arc<dyn FavoritesQuery>,
        config: CatalogConfig,
        data: Arc<StaticData>,
    ) -> Self {
        Self {
            client,
            cache,
            favorites,
            config,
            data,
            category_source: None,
            clock: Arc::new(Utc::now),
        }
    }

    /// Scrape categories from `source` before falling back to stale data
    pub fn with_category_source(mut self, source: Arc<dyn CategorySource>) -> Self {
        self.category_source = Some(source);
        self
    }

    /// Replace the wall clock used for availability notes and the offline date
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    // ========================================================================
    // FETCHING
    // ========================================================================

    async fn fetch_json(&self, url: String) -> Result<Value> {
        debug!(url = %url, "URL get");
        self.client.fetch(FetchRequest::get(url)).await
    }

    async fn fetch_search(&self, request: &ListingRequest) -> Result<SearchResponse> {
        let value = self.fetch_json(request.to_url(&self.config.api.search_url)).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Serve `key` from cache when fresh, otherwise fetch `url` and store the raw body
    async fn cached_fetch(&self, key: &str, ttl: CacheTtl, url: String) -> Result<Value> {
        if let Some(value) = get_json::<Value>(self.cache.as_ref(), key, ttl).await? {
            debug!(key, "Listing served from cache");
            return Ok(value);
        }
        let value = self.fetch_json(url).await?;
        put_json(self.cache.as_ref(), key, &value).await?;
        Ok(value)
    }

    /// Ids of the followed programs, for filtering
    fn favorite_ids(&self) -> BTreeSet<String> {
        self.favorites
            .favorite_programs()
            .iter()
            .map(|program| program_to_id(program))
            .collect()
    }

    fn is_favorite(&self, program: Option<&str>) -> bool {
        self.favorites.is_activated() && program.map(|p| self.favorites.is_favorite(p)).unwrap_or(false)
    }

    // ========================================================================
    // SHOWS
    // ========================================================================

    /// Programs in the A-Z catalog or in one category, channel or feature
    ///
    /// With `use_favorites`, programs that are not followed are dropped.
    pub async fn get_show_items(&self, facet: &Facet, use_favorites: bool) -> Result<Vec<ShowItem>> {
        let cache_key = facet.cache_key();
        let url = facet.to_params().to_url(&self.config.api.suggest_url);
        let value = self.cached_fetch(&cache_key, listing_ttl(), url).await?;
        let shows: Vec<RawShow> = serde_json::from_value(value)
            .map_err(|e| CatalogError::invalid_response(format!("Unexpected suggest response: {}", e), None))?;

        let favorite_ids = use_favorites.then(|| self.favorite_ids());
        let show_fanart = self.config.settings.show_fanart;

        let items: Vec<ShowItem> = shows
            .into_iter()
            .filter_map(|show| {
                let target_url = show.target_url.as_deref()?;
                let Some(program) = url_to_program(target_url) else {
                    debug!(target_url, "Skipping show without program URL");
                    return None;
                };
                if let Some(ref ids) = favorite_ids {
                    if !ids.contains(&program_to_id(&program)) {
                        return None;
                    }
                }
                Some(ShowItem {
                    label: show.title.clone().unwrap_or_else(|| "???".to_string()),
                    plot: unescape(show.description.as_deref().unwrap_or("???")),
                    permalink: Some(shorten_link(target_url)),
                    art: show_artwork(&show, show_fanart),
                    is_favorite: self.is_favorite(Some(&program)),
                    cache_key: cache_key.clone(),
                    brands: show.brands,
                    program,
                })
            })
            .collect();

        debug!(facet = %cache_key, count = items.len(), "Mapped show items");
        Ok(items)
    }

    // ========================================================================
    // EPISODES
    // ========================================================================

    /// Episodes of a program, category or feature, or one page of a variety
    pub async fn get_episode_items(&self, query: &EpisodeQuery) -> Result<EpisodeListing> {
        if let Some(variety) = query.paged_variety() {
            return self.get_paged_items(variety, query).await.map(EpisodeListing::Episodes);
        }

        let request = browse_request(query);
        match self.aggregate(&request, &query.season).await? {
            Aggregated::Episodes(episodes) => Ok(EpisodeListing::Episodes(self.map_to_episode_items(
                episodes,
                None,
                &query.season,
                query.use_favorites,
                None,
            ))),
            Aggregated::Seasons { buckets, episodes } => Ok(EpisodeListing::Seasons(seasons::map_to_season_items(
                query.program.as_deref(),
                buckets,
                &episodes,
                &self.config.settings,
                &self.config.labels,
            ))),
        }
    }

    async fn get_paged_items(&self, variety: ListingVariant, query: &EpisodeQuery) -> Result<Listing<EpisodeItem>> {
        let page = realpage(query.page);
        let mut request = ListingRequest::paged(variety, page)?;

        if variety == ListingVariant::Offline {
            let today = self.now().with_timezone(&Brussels).format("%Y-%m-%d").to_string();
            request = request.facet("facets[assetOffTime]", today);
        }

        if query.use_favorites {
            let urls: Vec<String> = self
                .favorites
                .favorite_programs()
                .iter()
                .map(|program| program_to_url(program, UrlType::Long))
                .collect();
            request = request.facet("facets[programUrl]", list_facet(&urls));
        } else {
            let channels = self.data.enabled_channel_names(&self.config.settings);
            request = request.facet("facets[programBrands]", list_facet(&channels));
        }

        let cache_key = ListingRequest::paged_cache_key(variety, page, query.use_favorites);
        let value = self
            .cached_fetch(&cache_key, listing_ttl(), request.to_url(&self.config.api.search_url))
            .await?;
        let response: SearchResponse = serde_json::from_value(value)?;

        let title_type = match variety {
            ListingVariant::Offline => TitleType::Offline,
            _ => TitleType::Recent,
        };
        Ok(self.map_to_episode_items(
            response.results,
            Some(title_type),
            &SeasonSelection::Unspecified,
            query.use_favorites,
            Some(cache_key),
        ))
    }

    /// Fetch a browse listing, following every page
    ///
    /// Returns season buckets instead when no season facet is set, not every
    /// season was asked for and the first page reports more than one season.
    async fn aggregate(&self, request: &ListingRequest, season: &SeasonSelection) -> Result<Aggregated> {
        let first = self.fetch_search(request).await?;

        if *season != SeasonSelection::All && !request.has_facet(SEASON_FACET) {
            if let Some(buckets) = first.season_buckets() {
                debug!(seasons = buckets.len(), "Listing seasons instead of episodes");
                return Ok(Aggregated::Seasons {
                    buckets,
                    episodes: first.results,
                });
            }
        }

        let pagination = first.pagination()?;
        let mut episodes = first.results;

        if pagination.needs_more_pages() {
            info!(
                total_results = pagination.total_results,
                total_pages = pagination.total_pages,
                "Fetching remaining catalog pages"
            );
            for offset in pagination.remaining_offsets() {
                let offset = u32::try_from(offset)
                    .map_err(|_| CatalogError::MalformedPagination(format!("offset {} out of range", offset)))?;
                let page = self.fetch_search(&request.starting_at(offset)).await?;
                episodes.extend(page.results);
            }
        }

        Ok(Aggregated::Episodes(episodes))
    }

    /// Search the catalog; highlighted fragments replace their plain fields
    pub async fn search(&self, query: &str, page: Option<i64>) -> Result<Listing<EpisodeItem>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Listing::new(Vec::new(), SortField::Episode, true));
        }
        let response = self.fetch_search(&ListingRequest::search(query, realpage(page))?).await?;
        Ok(self.map_to_episode_items(
            response.results,
            Some(TitleType::Recent),
            &SeasonSelection::Unspecified,
            false,
            None,
        ))
    }

    /// Identifiers of the newest episode of `program`
    pub async fn get_latest_episode(&self, program: &str) -> Result<Option<LatestEpisode>> {
        let response = self.fetch_search(&ListingRequest::latest_episode(program)).await?;
        if response.meta.as_ref().and_then(|m| m.total_results) == Some(0) {
            return Ok(None);
        }
        Ok(response.results.into_iter().next().map(|episode| LatestEpisode {
            video_id: episode.video_id,
            publication_id: episode.publication_id,
        }))
    }

    /// Map raw episodes to display entries
    ///
    /// Without an explicit title type, the first kept episode's program type
    /// is used for the whole listing. The listing takes the sort of the last
    /// classified episode.
    fn map_to_episode_items(
        &self,
        episodes: Vec<RawEpisode>,
        title_type: Option<TitleType>,
        season: &SeasonSelection,
        use_favorites: bool,
        cache_key: Option<String>,
    ) -> Listing<EpisodeItem> {
        let favorite_ids = use_favorites.then(|| self.favorite_ids());
        let settings = &self.config.settings;
        let labels = &self.config.labels;
        let now = self.now();

        let mut title_type = title_type;
        let mut sort = SortField::Episode;
        let mut ascending = true;
        let mut items = Vec::with_capacity(episodes.len());

        for mut episode in episodes {
            // The season facet is a prefix match upstream
            if !season.accepts(&episode) {
                continue;
            }

            let program = episode.program_url.as_deref().and_then(url_to_program);
            if let Some(ref ids) = favorite_ids {
                match program {
                    Some(ref p) if ids.contains(&program_to_id(p)) => {}
                    _ => continue,
                }
            }

            apply_highlights(&mut episode);
            episode.display_options.show_season = Some(true);

            let listing_type =
                title_type.get_or_insert_with(|| TitleType::from_program_type(episode.program_type.as_deref()));
            let classification = classify(&episode, listing_type, &episode.display_options, labels);
            sort = classification.sort;
            ascending = classification.ascending;

            let plot_outline = if episode.display_options.show_short_description {
                episode.short_description.as_deref().map(html_to_label)
            } else {
                episode.subtitle.clone()
            };

            items.push(EpisodeItem {
                is_favorite: self.is_favorite(program.as_deref()),
                label: classification.label,
                tvshow_title: episode.program.clone(),
                plot: episode_plot(&episode, labels, settings, now),
                plot_outline,
                season: episode.season_title.clone(),
                episode: episode.episode_number.clone(),
                duration_secs: episode.duration.map(|minutes| minutes * 60.0),
                aired: broadcast_time(&episode),
                brands: episode.brand_list().to_vec(),
                geo_blocked: episode.is_geo_blocked(),
                permalink: episode_permalink(&episode),
                on_time: parse_timestamp(episode.asset_on_time.as_deref()),
                off_time: parse_timestamp(episode.asset_off_time.as_deref()),
                art: episode_artwork(&episode, settings.show_fanart),
                cache_key: cache_key.clone(),
                video_id: episode.video_id,
                publication_id: episode.publication_id,
                program,
            });
        }

        Listing::new(items, sort, ascending)
    }

    // ========================================================================
    // STATIC LISTINGS
    // ========================================================================

    /// Category entries
    ///
    /// Sources are tried in order: fresh cache, the category source (whose
    /// result is cached), the cache at any age, the built-in table. Failures
    /// along the way are logged and never surface.
    pub async fn get_categories(&self) -> Vec<CategoryItem> {
        let categories = self.resolve_categories().await;
        let show_fanart = self.config.settings.show_fanart;

        categories
            .into_iter()
            .map(|category| {
                let thumbnail = match category.thumbnail {
                    Some(thumb) if show_fanart => thumb,
                    _ => DEFAULT_GENRE_ART.to_string(),
                };
                CategoryItem {
                    plot: format!("[B]{}[/B]", category.name),
                    art: Artwork {
                        thumb: thumbnail.clone(),
                        icon: DEFAULT_GENRE_ART.to_string(),
                        fanart: thumbnail,
                    },
                    label: category.name,
                    id: category.id,
                }
            })
            .collect()
    }

    async fn resolve_categories(&self) -> Vec<Category> {
        if let Some(categories) = self.cached_categories(categories_ttl()).await {
            return categories;
        }

        if let Some(ref source) = self.category_source {
            match source.fetch_categories().await {
                Ok(categories) if !categories.is_empty() => {
                    if let Err(e) = put_json(self.cache.as_ref(), CATEGORIES_CACHE_KEY, &categories).await {
                        warn!(error = %e, "Failed to cache categories");
                    }
                    return categories;
                }
                Ok(_) => warn!("Category source returned nothing"),
                Err(e) => warn!(error = %e, "Failed to fetch categories"),
            }
        }

        if let Some(categories) = self.cached_categories(CacheTtl::Unbounded).await {
            info!("Using stale cached categories");
            return categories;
        }

        debug!("Using built-in categories");
        self.data.categories.clone()
    }

    async fn cached_categories(&self, ttl: CacheTtl) -> Option<Vec<Category>> {
        match get_json::<Vec<Category>>(self.cache.as_ref(), CATEGORIES_CACHE_KEY, ttl).await {
            Ok(categories) => categories.filter(|c| !c.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read cached categories");
                None
            }
        }
    }

    pub fn get_featured_items(&self) -> Vec<FeaturedItem> {
        self.data
            .featured
            .iter()
            .map(|feature| FeaturedItem {
                id: feature.id.clone(),
                label: feature.name.clone(),
                plot: format!("[B]{}[/B]", feature.name),
                art: Artwork::uniform(DEFAULT_FEATURE_ART),
            })
            .collect()
    }

    /// Channel entries, restricted to `channels` unless it is empty
    ///
    /// Live entries are only produced for channels with a live stream. A single
    /// requested live channel is emphasized since it heads that channel's
    /// program listing.
    pub fn get_channel_items(&self, channels: &[String], live: bool) -> Vec<ChannelItem> {
        let labels = &self.config.labels;

        self.data
            .channels
            .iter()
            .filter(|channel| channels.is_empty() || channels.contains(&channel.name))
            .filter_map(|channel| {
                let art = Artwork::uniform(&format!("{}/{}.png", STUDIO_ART, channel.studio));

                if !live {
                    return Some(ChannelItem {
                        name: channel.name.clone(),
                        label: channel.label.clone(),
                        plot: format!("[B]{}[/B]", channel.label),
                        studio: channel.studio.clone(),
                        target: ChannelTarget::Listing(channel.name.clone()),
                        art,
                        cache_key: None,
                    });
                }

                let target = match (&channel.live_stream_id, &channel.live_stream) {
                    (Some(id), _) => ChannelTarget::PlayId(id.clone()),
                    (None, Some(url)) => ChannelTarget::PlayUrl(url.clone()),
                    (None, None) => return None,
                };
                let mut label = labels.live_channel.replace("{label}", &channel.label);
                if channels.len() == 1 {
                    label = format!("[B]{}[/B]", label);
                }
                Some(ChannelItem {
                    name: channel.name.clone(),
                    label,
                    plot: labels.live_plot.replace("{label}", &channel.label),
                    studio: channel.studio.clone(),
                    target,
                    art,
                    cache_key: Some(Facet::Channel(channel.name.clone()).cache_key()),
                })
            })
            .collect()
    }

    /// Drop one cached listing
    pub async fn delete_cache(&self, cache_key: &str) -> Result<bool> {
        let removed = self.cache.remove(cache_key).await?;
        info!(cache_key, removed, "Deleted cached listing");
        Ok(removed)
    }
}

/// Browse request for a program, category or feature
fn browse_request(query: &EpisodeQuery) -> ListingRequest {
    let mut request = ListingRequest::browse();
    if let Some(ref program) = query.program {
        request = request.facet("facets[programUrl]", program_to_url(program, UrlType::Long));
    }
    if let SeasonSelection::Only(ref season) = query.season {
        request = request.facet(SEASON_FACET, season.clone());
    }
    if let Some(ref category) = query.category {
        request = request.facet("facets[categories]", category.clone());
    }
    if let Some(ref feature) = query.feature {
        request = request.facet("facets[programTags.title]", feature.clone());
    }
    if let Some(ref program_type) = query.program_type {
        request = request.facet("facets[programType]", program_type.clone());
    }
    request
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_selection_parsing() {
        assert_eq!(SeasonSelection::from_option(None), SeasonSelection::Unspecified);
        assert_eq!(SeasonSelection::from_option(Some("allseasons")), SeasonSelection::All);
        assert_eq!(SeasonSelection::from_option(Some("3")), SeasonSelection::Only("3".to_string()));
        assert_eq!(SeasonSelection::Only("3".to_string()).as_option(), Some("3"));
    }

    #[test]
    fn test_season_exact_match() {
        let season = SeasonSelection::Only("1".to_string());
        let with_title = |title: &str| RawEpisode {
            season_title: Some(title.to_string()),
            ..Default::default()
        };

        assert!(season.accepts(&with_title("1")));
        assert!(!season.accepts(&with_title("10")));
        assert!(!season.accepts(&with_title("11")));
        assert!(SeasonSelection::All.accepts(&with_title("10")));
    }

    #[test]
    fn test_browse_request_facets() {
        let query = EpisodeQuery::program("thuis").season(SeasonSelection::Only("25".to_string()));
        let request = browse_request(&query);

        assert!(request.has_facet("facets[programUrl]"));
        assert!(request.has_facet(SEASON_FACET));
        assert_eq!(request.start_index, None);
        assert_eq!(request.page_size, 150);

        let all = browse_request(&EpisodeQuery::program("thuis").season(SeasonSelection::All));
        assert!(!all.has_facet(SEASON_FACET));
    }

    #[test]
    fn test_paged_variety_detection() {
        assert_eq!(
            EpisodeQuery::variety(ListingVariant::Offline, Some(2)).paged_variety(),
            Some(ListingVariant::Offline)
        );
        assert_eq!(EpisodeQuery::variety(ListingVariant::Search, None).paged_variety(), None);
        assert_eq!(EpisodeQuery::category("docu").paged_variety(), None);
    }
}
