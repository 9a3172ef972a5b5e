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


//! Presentation classification
//!
//! Pure functions that turn a typed episode record plus its listing's title
//! type into a display label, a sort field and a sort direction. Nothing here
//! performs I/O; the aggregator calls these per record.
//!
//! # Classification table
//!
//! | title type | sort | ascending | label |
//! |------------|------|-----------|-------|
//! | recent / offline | dateadded | no | `<program> - <label>` |
//! | descending series | dateadded | no | `S01E02: <label>` when season and episode are numeric |
//! | descending series (fallback) | dateadded | no | `<date> - <label>` if dates are shown |
//! | ascending series | label | yes | `<episode word> <n>: <label>` |
//! | ascending series (fallback) | dateadded | yes | `<date> - <label>` if dates are shown |
//! | daily | dateadded | no | `<date> - <label>` |
//! | oneoff | label | yes | program name |
//! | anything else | unsorted | yes | base label |

pub mod html;

pub use html::{html_to_label, strip_newlines, unescape};

use crate::api::models::{DisplayOptions, RawEpisode, RawShow};
use crate::config::{Labels, Settings};
use crate::program::{add_https_method, shorten_link};
use chrono::{DateTime, Utc};
use chrono_tz::Europe::Brussels;

/// Removal dates further away than this are not mentioned in the plot
const REMOVAL_NOTICE_DAYS: i64 = 93;

pub const DEFAULT_VIDEO_ART: &str = "DefaultAddonVideo.png";
pub const DEFAULT_SEASON_ART: &str = "DefaultSets.png";
pub const DEFAULT_GENRE_ART: &str = "DefaultGenre.png";
pub const DEFAULT_FEATURE_ART: &str = "DefaultCountry.png";

/// Classification tag driving sort and label rules
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TitleType {
    Recent,
    Offline,
    /// `reeksaflopend`: newest episode first
    DescendingSeries,
    /// `reeksoplopend`: first episode first
    AscendingSeries,
    Daily,
    Oneoff,
    /// Any other program type the catalog reports
    Other(String),
    /// No program type at all
    Unknown,
}

impl TitleType {
    pub fn from_program_type(program_type: Option<&str>) -> Self {
        match program_type {
            Some("recent") => Self::Recent,
            Some("offline") => Self::Offline,
            Some("reeksaflopend") => Self::DescendingSeries,
            Some("reeksoplopend") => Self::AscendingSeries,
            Some("daily") => Self::Daily,
            Some("oneoff") => Self::Oneoff,
            Some(other) => Self::Other(other.to_string()),
            None => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Recent => "recent",
            Self::Offline => "offline",
            Self::DescendingSeries => "reeksaflopend",
            Self::AscendingSeries => "reeksoplopend",
            Self::Daily => "daily",
            Self::Oneoff => "oneoff",
            Self::Other(s) => s,
            Self::Unknown => "",
        }
    }

    /// Season listings of these programs show the newest season first
    pub fn seasons_descending(&self) -> bool {
        matches!(self, Self::Daily | Self::DescendingSeries)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Unsorted,
    Label,
    Episode,
    DateAdded,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unsorted => "unsorted",
            Self::Label => "label",
            Self::Episode => "episode",
            Self::DateAdded => "dateadded",
        }
    }
}

/// Label and ordering for one record; recomputed per listing, never stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub label: String,
    pub sort: SortField,
    pub ascending: bool,
}

impl Classification {
    fn new(label: String, sort: SortField, ascending: bool) -> Self {
        Self { label, sort, ascending }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Episode title or short description, depending on display options
pub fn base_label(episode: &RawEpisode, options: &DisplayOptions) -> String {
    let title = non_empty(&episode.title);
    let short = non_empty(&episode.short_description);

    let chosen = if !options.show_episode_title && options.show_short_description {
        short.or(title)
    } else {
        title.or(short)
    };
    chosen.map(html_to_label).unwrap_or_default()
}

fn dated(date: Option<&str>, label: String) -> String {
    match date {
        Some(date) => format!("{} - {}", date, label),
        None => label,
    }
}

/// Season/episode numbers when both coerce to integers
fn numeric_season_episode(episode: &RawEpisode) -> Option<(u32, u32)> {
    let season = non_empty(&episode.season_name).or(non_empty(&episode.season_title))?;
    let number = non_empty(&episode.episode_number)?;
    Some((season.trim().parse().ok()?, number.trim().parse().ok()?))
}

/// Classify one episode
///
/// Non-numeric season or episode numbers never fail; they fall back to date
/// ordering.
pub fn classify(episode: &RawEpisode, title_type: &TitleType, options: &DisplayOptions, labels: &Labels) -> Classification {
    let label = base_label(episode, options);
    let short_date = non_empty(&episode.formatted_broadcast_short_date);

    match title_type {
        TitleType::Recent | TitleType::Offline => {
            let label = match non_empty(&episode.program) {
                Some(program) => format!("{} - {}", program, label),
                None => label,
            };
            Classification::new(label, SortField::DateAdded, false)
        }

        TitleType::DescendingSeries => {
            if options.show_episode_number {
                if let Some((season, number)) = numeric_season_episode(episode) {
                    return Classification::new(
                        format!("S{:02}E{:02}: {}", season, number, label),
                        SortField::DateAdded,
                        false,
                    );
                }
            }
            let label = if options.show_broadcast_date { dated(short_date, label) } else { label };
            Classification::new(label, SortField::DateAdded, false)
        }

        TitleType::AscendingSeries => {
            if options.show_episode_number {
                if let Some(number) = non_empty(&episode.episode_number) {
                    return Classification::new(
                        format!("{} {}: {}", labels.episode_word, number, label),
                        SortField::Label,
                        true,
                    );
                }
            }
            if options.show_broadcast_date && short_date.is_some() {
                return Classification::new(dated(short_date, label), SortField::DateAdded, true);
            }
            Classification::new(label, SortField::DateAdded, true)
        }

        TitleType::Daily => Classification::new(dated(short_date, label), SortField::DateAdded, false),

        TitleType::Oneoff => {
            let label = non_empty(&episode.program).map(str::to_string).unwrap_or(label);
            Classification::new(label, SortField::Label, true)
        }

        TitleType::Other(_) | TitleType::Unknown => Classification::new(label, SortField::Unsorted, true),
    }
}

/// Apply search highlight fragments over their plain fields
pub fn apply_highlights(episode: &mut RawEpisode) {
    let highlight = std::mem::take(&mut episode.highlight);
    for (field, fragments) in highlight {
        let Some(fragment) = fragments.first() else {
            continue;
        };
        match episode.highlight_slot(&field) {
            Some(slot) => *slot = Some(html_to_label(fragment)),
            None => tracing::debug!(field = %field, "Ignoring highlight for unknown field"),
        }
    }
}

// ============================================================================
// PLOT
// ============================================================================

/// Parse an RFC 3339 catalog timestamp
pub fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value?).ok().map(|dt| dt.with_timezone(&Utc))
}

/// Broadcast time from the millisecond timestamp; `-1` means unknown
pub fn broadcast_time(episode: &RawEpisode) -> Option<DateTime<Utc>> {
    match episode.broadcast_date {
        Some(ms) if ms >= 0 => DateTime::from_timestamp_millis(ms),
        _ => None,
    }
}

/// Short local date used in availability notes
pub fn short_date(when: DateTime<Utc>) -> String {
    when.with_timezone(&Brussels).format("%d/%m/%Y").to_string()
}

/// Geo-block and removal notes prepended to an episode plot
pub fn plot_meta(episode: &RawEpisode, labels: &Labels, now: DateTime<Utc>) -> String {
    let mut meta = String::new();
    if episode.is_geo_blocked() {
        meta.push_str(&labels.geo_blocked);
    }

    if let Some(off_time) = parse_timestamp(episode.asset_off_time.as_deref()) {
        let remaining = off_time - now;
        if remaining.num_days() < REMOVAL_NOTICE_DAYS {
            meta.push_str(&labels.available_until.replace("{date}", &short_date(off_time)));
            if remaining.num_days() > 0 {
                meta.push_str(&labels.days_remaining.replace("{days}", &remaining.num_days().to_string()));
            } else {
                let hours = remaining.num_hours().max(0);
                meta.push_str(&labels.hours_remaining.replace("{hours}", &hours.to_string()));
            }
        }
    }
    meta
}

/// Full plot: notes, HTML-normalized description and optional permalink
pub fn episode_plot(episode: &RawEpisode, labels: &Labels, settings: &Settings, now: DateTime<Utc>) -> String {
    let mut plot = episode.description.as_deref().map(html_to_label).unwrap_or_default();

    let meta = plot_meta(episode, labels, now);
    if !meta.is_empty() {
        plot = format!("{}\n{}", meta, plot);
    }

    if settings.show_permalink {
        if let Some(permalink) = episode_permalink(episode) {
            plot = format!("{}\n\n[COLOR yellow]{}[/COLOR]", plot, permalink);
        }
    }
    plot
}

pub fn episode_permalink(episode: &RawEpisode) -> Option<String> {
    non_empty(&episode.permalink)
        .map(shorten_link)
        .or_else(|| non_empty(&episode.external_permalink).map(str::to_string))
}

// ============================================================================
// ARTWORK
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artwork {
    pub thumb: String,
    pub icon: String,
    pub fanart: String,
}

impl Artwork {
    pub fn uniform(image: &str) -> Self {
        Self {
            thumb: image.to_string(),
            icon: image.to_string(),
            fanart: image.to_string(),
        }
    }
}

pub fn episode_artwork(episode: &RawEpisode, show_fanart: bool) -> Artwork {
    if !show_fanart {
        return Artwork::uniform(DEFAULT_VIDEO_ART);
    }
    let thumb = add_https_method(non_empty(&episode.video_thumbnail_url).unwrap_or(DEFAULT_VIDEO_ART));
    let fanart = non_empty(&episode.program_image_url)
        .map(add_https_method)
        .unwrap_or_else(|| thumb.clone());
    Artwork {
        thumb,
        icon: DEFAULT_VIDEO_ART.to_string(),
        fanart,
    }
}

pub fn show_artwork(show: &RawShow, show_fanart: bool) -> Artwork {
    if !show_fanart {
        return Artwork::uniform(DEFAULT_VIDEO_ART);
    }
    let thumb = add_https_method(non_empty(&show.thumbnail).unwrap_or(DEFAULT_VIDEO_ART));
    Artwork {
        thumb: thumb.clone(),
        icon: DEFAULT_VIDEO_ART.to_string(),
        fanart: thumb,
    }
}

/// Season entry art, taken from the season's representative episode
pub fn season_artwork(episode: Option<&RawEpisode>, show_fanart: bool) -> Artwork {
    let Some(episode) = episode.filter(|_| show_fanart) else {
        return Artwork::uniform(DEFAULT_SEASON_ART);
    };
    let fanart = add_https_method(non_empty(&episode.program_image_url).unwrap_or(DEFAULT_SEASON_ART));
    let thumb = non_empty(&episode.video_thumbnail_url)
        .map(add_https_method)
        .unwrap_or_else(|| fanart.clone());
    Artwork {
        thumb,
        icon: DEFAULT_SEASON_ART.to_string(),
        fanart,
    }
}
