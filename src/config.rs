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


//! Configuration and static catalog data
//!
//! `CatalogConfig` holds user-tunable settings and is persisted as TOML under the
//! platform config directory. `StaticData` holds the channel, category and
//! featured tables; it is built once at startup and handed to the aggregator by
//! reference, never mutated afterwards.
//!
//! # File Location
//! - Linux: ~/.config/catalog-sync/config.toml
//! - macOS: ~/Library/Application Support/catalog-sync/config.toml
//! - Windows: %APPDATA%/catalog-sync/config.toml

use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub labels: Labels,
}

/// Remote endpoints and transport tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_search_url")]
    pub search_url: String,
    #[serde(default = "default_suggest_url")]
    pub suggest_url: String,
    #[serde(default = "default_graphql_url")]
    pub graphql_url: String,
    #[serde(default = "default_favorites_url")]
    pub favorites_url: String,
    /// Page scraped for the category list
    #[serde(default = "default_categories_url")]
    pub categories_url: String,
    #[serde(default = "default_referer")]
    pub referer: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Behavioural switches mirrored from the host platform's settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Feature flag for favorites; credentials are checked separately
    #[serde(default = "default_true")]
    pub use_favorites: bool,
    #[serde(default = "default_true")]
    pub show_fanart: bool,
    #[serde(default)]
    pub show_permalink: bool,
    /// Host's global "show all items" list setting
    #[serde(default)]
    pub show_all_seasons: bool,
    /// Channels used to restrict the recent/offline listings.
    /// Empty means every channel from the static table.
    #[serde(default)]
    pub enabled_channels: Vec<String>,
}

/// User-visible label fragments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Labels {
    #[serde(default = "default_episode_word")]
    pub episode_word: String,
    #[serde(default = "default_season_word")]
    pub season_word: String,
    #[serde(default = "default_all_seasons")]
    pub all_seasons: String,
    #[serde(default = "default_geo_blocked")]
    pub geo_blocked: String,
    /// `{date}` is replaced with the short removal date
    #[serde(default = "default_available_until")]
    pub available_until: String,
    /// `{days}` is replaced with the remaining number of days
    #[serde(default = "default_days_remaining")]
    pub days_remaining: String,
    /// `{hours}` is replaced with the remaining number of hours
    #[serde(default = "default_hours_remaining")]
    pub hours_remaining: String,
    /// `{label}` is replaced with the channel label
    #[serde(default = "default_live_channel")]
    pub live_channel: String,
    #[serde(default = "default_live_plot")]
    pub live_plot: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            suggest_url: default_suggest_url(),
            graphql_url: default_graphql_url(),
            favorites_url: default_favorites_url(),
            categories_url: default_categories_url(),
            referer: default_referer(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_favorites: true,
            show_fanart: true,
            show_permalink: false,
            show_all_seasons: false,
            enabled_channels: Vec::new(),
        }
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            episode_word: default_episode_word(),
            season_word: default_season_word(),
            all_seasons: default_all_seasons(),
            geo_blocked: default_geo_blocked(),
            available_until: default_available_until(),
            days_remaining: default_days_remaining(),
            hours_remaining: default_hours_remaining(),
            live_channel: default_live_channel(),
            live_plot: default_live_plot(),
        }
    }
}

fn default_search_url() -> String {
    "https://vrtnu-api.vrt.be/search".to_string()
}

fn default_suggest_url() -> String {
    "https://vrtnu-api.vrt.be/suggest".to_string()
}

fn default_graphql_url() -> String {
    "https://www.vrt.be/vrtnu-api/graphql/v1".to_string()
}

fn default_favorites_url() -> String {
    "https://video-user-data.vrt.be/favorites".to_string()
}

fn default_categories_url() -> String {
    "https://www.vrt.be/vrtnu/categorieen/".to_string()
}

fn default_referer() -> String {
    "https://www.vrt.be/vrtnu".to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_retries() -> u32 {
    3
}

fn default_user_agent() -> String {
    concat!("catalog-sync/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_true() -> bool {
    true
}

fn default_episode_word() -> String {
    "Episode".to_string()
}

fn default_season_word() -> String {
    "Season".to_string()
}

fn default_all_seasons() -> String {
    "* All seasons".to_string()
}

fn default_geo_blocked() -> String {
    "[Geo-blocked]\n".to_string()
}

fn default_available_until() -> String {
    "Available until {date}".to_string()
}

fn default_days_remaining() -> String {
    " ({days} days left)\n".to_string()
}

fn default_hours_remaining() -> String {
    " ({hours} hours left)\n".to_string()
}

fn default_live_channel() -> String {
    "Watch {label} live".to_string()
}

fn default_live_plot() -> String {
    "Watch {label} live TV stream".to_string()
}

impl CatalogConfig {
    /// Load configuration from the default location, writing defaults on first run
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from an explicit path, writing defaults if it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| CatalogError::ConfigurationError(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        config_dir().join("config.toml")
    }

    /// Default location of the SQLite cache database
    pub fn cache_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("catalog-sync")
            .join("cache.db")
    }
}

fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("catalog-sync")
}

// ============================================================================
// STATIC DATA
// ============================================================================

/// A broadcast channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    /// Facet value used by the catalog (`programBrands`)
    pub name: String,
    pub label: String,
    pub studio: String,
    #[serde(default)]
    pub live_stream: Option<String>,
    #[serde(default)]
    pub live_stream_id: Option<String>,
    /// Whether the channel has on-demand programs in the catalog
    #[serde(default)]
    pub vod: bool,
}

/// A catalog category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// A featured collection (a `programTags.title` facet value)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    pub name: String,
}

/// Immutable lookup tables loaded once at process start
#[derive(Debug, Clone, PartialEq)]
pub struct StaticData {
    pub channels: Vec<Channel>,
    pub categories: Vec<Category>,
    pub featured: Vec<Feature>,
}

impl StaticData {
    /// The tables shipped with the crate
    pub fn builtin() -> Self {
        Self {
            channels: builtin_channels(),
            categories: builtin_categories(),
            featured: builtin_featured(),
        }
    }

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.name == name)
    }

    /// On-demand channel names enabled by `settings`, in table order
    pub fn enabled_channel_names(&self, settings: &Settings) -> Vec<String> {
        self.channels
            .iter()
            .filter(|c| c.vod)
            .filter(|c| settings.enabled_channels.is_empty() || settings.enabled_channels.contains(&c.name))
            .map(|c| c.name.clone())
            .collect()
    }
}

fn channel(name: &str, label: &str, studio: &str, live_stream: Option<&str>, live_stream_id: Option<&str>, vod: bool) -> Channel {
    Channel {
        name: name.to_string(),
        label: label.to_string(),
        studio: studio.to_string(),
        live_stream: live_stream.map(str::to_string),
        live_stream_id: live_stream_id.map(str::to_string),
        vod,
    }
}

fn builtin_channels() -> Vec<Channel> {
    vec![
        channel("een", "Eén", "Een", Some("https://www.vrt.be/vrtnu/livestream/#epgchannel=O8"), Some("vualto_een_geo"), true),
        channel("canvas", "Canvas", "Canvas", Some("https://www.vrt.be/vrtnu/livestream/#epgchannel=1H"), Some("vualto_canvas_geo"), true),
        channel("ketnet", "Ketnet", "Ketnet", Some("https://www.vrt.be/vrtnu/kanalen/ketnet/"), Some("vualto_ketnet_geo"), true),
        channel("ketnet-jr", "Ketnet Junior", "Ketnet Junior", None, Some("ketnet_jr"), true),
        channel("podium19", "Podium 19", "Podium 19", None, None, true),
        channel("sporza", "Sporza", "Sporza", None, Some("vualto_sporza_geo"), true),
        channel("vrtnws", "VRT NWS", "VRT NWS", None, Some("vualto_nieuws"), true),
        channel("radio1", "Radio 1", "Radio 1", None, Some("vualto_radio1"), true),
        channel("radio2", "Radio 2", "Radio 2", None, Some("vualto_radio2"), true),
        channel("klara", "Klara", "Klara", None, Some("vualto_klara"), true),
        channel("stubru", "Studio Brussel", "Studio Brussel", None, Some("vualto_stubru"), true),
        channel("mnm", "MNM", "MNM", None, Some("vualto_mnm"), true),
        channel("vrtnxt", "VRT NXT", "VRT NXT", None, None, true),
        channel("de-warmste-week", "De Warmste Week", "De Warmste Week", None, None, true),
        channel("vrt-events1", "VRT Events 1", "VRT", None, Some("vualto_events1_geo"), false),
        channel("vrt-events2", "VRT Events 2", "VRT", None, Some("vualto_events2_geo"), false),
        channel("vrt-events3", "VRT Events 3", "VRT", None, Some("vualto_events3_geo"), false),
    ]
}

fn builtin_categories() -> Vec<Category> {
    [
        ("met-audiodescriptie", "Audiodescriptie"),
        ("cultuur", "Cultuur"),
        ("docu", "Docu"),
        ("entertainment", "Entertainment"),
        ("films", "Film"),
        ("human-interest", "Human interest"),
        ("humor", "Humor"),
        ("voor-kinderen", "Kinderen en jongeren"),
        ("koken", "Koken"),
        ("levensbeschouwing", "Levensbeschouwing"),
        ("lifestyle", "Lifestyle"),
        ("muziek", "Muziek"),
        ("nieuws-en-actua", "Nieuws en actua"),
        ("nostalgie", "Nostalgie"),
        ("series", "Series"),
        ("sport", "Sport"),
        ("talkshows", "Talkshows"),
        ("met-gebarentaal", "Vlaamse Gebarentaal"),
        ("wetenschap-en-natuur", "Wetenschap & natuur"),
    ]
    .into_iter()
    .map(|(id, name)| Category {
        id: id.to_string(),
        name: name.to_string(),
        thumbnail: None,
    })
    .collect()
}

fn builtin_featured() -> Vec<Feature> {
    [
        ("exclusief-online", "Exclusief online"),
        ("volledig-seizoen", "Volledig seizoen"),
        ("volledige-reeks", "Volledige reeks"),
        ("uit-het-archief", "Uit het archief"),
        ("kortfilm", "Kortfilm"),
        ("kies-19", "Kies19"),
        ("klimaat", "Klimaat"),
        ("de-warmste-week", "De warmste week"),
    ]
    .into_iter()
    .map(|(id, name)| Feature {
        id: id.to_string(),
        name: name.to_string(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CatalogConfig::default();
        assert!(config.settings.use_favorites);
        assert!(config.settings.show_fanart);
        assert!(!config.settings.show_all_seasons);
        assert!(config.api.search_url.starts_with("https://"));
        assert_eq!(config.api.timeout_secs, 30);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: CatalogConfig = toml::from_str(
            r#"
            [settings]
            use_favorites = false
            enabled_channels = ["een", "canvas"]
            "#,
        )
        .expect("valid toml");

        assert!(!config.settings.use_favorites);
        assert_eq!(config.settings.enabled_channels, vec!["een", "canvas"]);
        assert_eq!(config.labels.episode_word, "Episode");
        assert_eq!(config.api, ApiConfig::default());
    }

    #[test]
    fn test_load_writes_defaults_then_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let first = CatalogConfig::load_from(&path).unwrap();
        assert!(path.exists());

        let mut edited = first.clone();
        edited.settings.show_permalink = true;
        edited.save_to(&path).unwrap();

        let reloaded = CatalogConfig::load_from(&path).unwrap();
        assert!(reloaded.settings.show_permalink);
    }

    #[test]
    fn test_enabled_channel_names() {
        let data = StaticData::builtin();
        let mut settings = Settings::default();
        let all = data.enabled_channel_names(&settings);
        assert_eq!(all.len(), 14);
        assert!(all.iter().any(|c| c == "podium19"));
        assert!(all.iter().any(|c| c == "de-warmste-week"));
        // Event channels only stream live
        assert!(!all.iter().any(|c| c.starts_with("vrt-events")));

        settings.enabled_channels = vec!["canvas".to_string(), "een".to_string(), "vrt-events1".to_string()];
        // Table order wins over settings order
        assert_eq!(data.enabled_channel_names(&settings), vec!["een", "canvas"]);
    }

    #[test]
    fn test_channel_studio_differs_from_label() {
        let data = StaticData::builtin();
        let een = data.channel("een").expect("een is builtin");
        assert_eq!(een.label, "Eén");
        assert_eq!(een.studio, "Een");
        assert_eq!(data.channel("vrt-events2").map(|c| c.studio.as_str()), Some("VRT"));
        assert_eq!(data.channels.len(), 17);
    }
}
