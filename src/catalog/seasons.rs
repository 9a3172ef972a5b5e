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


//! Season bucket listings

use super::items::{Listing, SeasonItem};
use super::SeasonSelection;
use crate::api::models::{RawEpisode, SeasonBucket};
use crate::config::{Labels, Settings};
use crate::presentation::{html_to_label, season_artwork, Artwork, SortField, TitleType};

/// Turn season buckets into season entries
///
/// Each bucket is illustrated by the first fetched episode of that season, or
/// by the first episode overall when the season was not among the fetched
/// results. Buckets are ordered by key as strings; newest first for daily
/// programs and descending series.
pub(crate) fn map_to_season_items(
    program: Option<&str>,
    mut buckets: Vec<SeasonBucket>,
    episodes: &[RawEpisode],
    settings: &Settings,
    labels: &Labels,
) -> Listing<SeasonItem> {
    let representative = episodes.first();
    let title_type = TitleType::from_program_type(representative.and_then(|e| e.program_type.as_deref()));
    let ascending = !title_type.seasons_descending();
    let plot = season_plot(representative, labels);

    let mut items = Vec::with_capacity(buckets.len() + 1);

    if settings.show_all_seasons {
        let art = season_artwork(representative, settings.show_fanart);
        items.push(SeasonItem {
            program: program.map(str::to_string),
            season: SeasonSelection::All,
            label: labels.all_seasons.clone(),
            plot: plot.clone(),
            art: Artwork {
                thumb: art.fanart.clone(),
                ..art
            },
            episode_count_hint: None,
        });
    }

    buckets.sort_by_cached_key(|bucket| season_order(&bucket.key));
    if !ascending {
        buckets.reverse();
    }

    for bucket in buckets {
        let episode = episodes
            .iter()
            .find(|e| e.season_name.as_deref() == Some(bucket.key.as_str()))
            .or(representative);
        items.push(SeasonItem {
            program: program.map(str::to_string),
            label: format!("{} {}", labels.season_word, bucket.key),
            plot: plot.clone(),
            art: season_artwork(episode, settings.show_fanart),
            episode_count_hint: Some(bucket.episode_count_hint),
            season: SeasonSelection::Only(bucket.key),
        });
    }

    Listing::new(items, SortField::Label, ascending)
}

/// Numeric season titles first, by value, then the rest by text
fn season_order(key: &str) -> (bool, u64, String) {
    match key.trim().parse::<u64>() {
        Ok(number) => (false, number, key.to_string()),
        Err(_) => (true, 0, key.to_string()),
    }
}

fn season_plot(episode: Option<&RawEpisode>, labels: &Labels) -> String {
    let Some(episode) = episode else {
        return String::new();
    };
    let meta = if episode.is_geo_blocked() { labels.geo_blocked.as_str() } else { "" };
    let description = episode.program_description.as_deref().map(html_to_label).unwrap_or_default();
    format!(
        "{}[B]{}[/B]\n{}",
        meta,
        episode.program.as_deref().unwrap_or_default(),
        description
    )
}
