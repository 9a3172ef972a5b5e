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


//! Program identifiers and URL forms
//!
//! A program is known by its slug (`de-ideale-wereld`). The catalog hands out
//! three URL shapes for it and the favorites service keys entries by a
//! normalized id. Every conversion lives here so that all call sites agree.
//!
//! | Form | Example |
//! |------|---------|
//! | slug | `de-ideale-wereld` |
//! | short url | `/vrtnu/a-z/de-ideale-wereld/` |
//! | long url | `//www.vrt.be/vrtnu/a-z/de-ideale-wereld/` |
//! | target url | `//www.vrt.be/vrtnu/a-z/de-ideale-wereld.relevant/` |
//! | program id | `vrtnuazdeidealewereld` |

const SHORT_PREFIX: &str = "/vrtnu/a-z/";
const LONG_PREFIX: &str = "//www.vrt.be/vrtnu/a-z/";
const TARGET_SUFFIX: &str = ".relevant/";
const PROGRAM_ID_PREFIX: &str = "vrtnuaz";

/// Which program URL shape to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlType {
    Short,
    Long,
}

/// Normalized favorites key for a program slug
///
/// Lowercases and drops everything that is not alphanumeric, so slugs that only
/// differ by case, spacing or punctuation share one key.
pub fn program_to_id(program: &str) -> String {
    let normalized: String = program
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();
    format!("{}{}", PROGRAM_ID_PREFIX, normalized)
}

/// Slug derived from a display title (`De Ideale Wereld` → `de-ideale-wereld`)
pub fn title_to_program(title: &str) -> String {
    title
        .to_lowercase()
        .replace('.', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

pub fn program_to_url(program: &str, url_type: UrlType) -> String {
    match url_type {
        UrlType::Short => format!("{}{}/", SHORT_PREFIX, program),
        UrlType::Long => format!("{}{}/", LONG_PREFIX, program),
    }
}

/// Extract the slug from a target, short or long program URL
pub fn url_to_program(url: &str) -> Option<String> {
    if let Some(rest) = url.strip_prefix(LONG_PREFIX) {
        if let Some(program) = rest.strip_suffix(TARGET_SUFFIX) {
            return Some(program.to_string());
        }
        return Some(rest.trim_end_matches('/').to_string());
    }
    url.strip_prefix(SHORT_PREFIX)
        .map(|rest| rest.trim_end_matches('/').to_string())
}

/// Shortest human-friendly form of a catalog link
pub fn shorten_link(url: &str) -> String {
    for prefix in ["https://www.vrt.be/vrtnu/", "//www.vrt.be/vrtnu/"] {
        if let Some(rest) = url.strip_prefix(prefix) {
            return format!("vrtnu.be/{}", rest);
        }
    }
    url.to_string()
}

/// Turn protocol-relative and site-relative URLs into absolute https URLs
pub fn add_https_method(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{}", url)
    } else if url.starts_with('/') {
        format!("https://vrt.be{}", url)
    } else {
        url.to_string()
    }
}

/// Clamp a requested page number to a valid 1-based page
pub fn realpage(page: Option<i64>) -> u32 {
    match page {
        Some(p) if p >= 1 => u32::try_from(p).unwrap_or(u32::MAX),
        _ => 1,
    }
}
