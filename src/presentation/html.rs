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


//! Catalog HTML to display markup
//!
//! Descriptions and search highlights arrive as small HTML fragments. They are
//! rewritten to the bracket markup used by the display layer (`[B]`, `[I]`,
//! `[COLOR yellow]`), remaining block tags are dropped, and entities are
//! decoded.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Ordered rewrite table; `<em>` marks search matches
    static ref HTML_MAPPING: Vec<(Regex, &'static str)> = vec![
        (Regex::new(r"(?i)<(/?)i(|\s[^>]+)>").expect("valid regex"), "[${1}I]"),
        (Regex::new(r"(?i)<(/?)b(|\s[^>]+)>").expect("valid regex"), "[${1}B]"),
        (Regex::new(r"(?i)<em(|\s[^>]+)>").expect("valid regex"), "[B][COLOR yellow]"),
        (Regex::new(r"(?i)</em>").expect("valid regex"), "[/COLOR][/B]"),
        (Regex::new(r"(?i)<li>").expect("valid regex"), "- "),
        (Regex::new(r"(?i)</?(div|li|p|span|ul)(|\s[^>]+)>").expect("valid regex"), ""),
        (Regex::new(r"(?i)<br>\n?").expect("valid regex"), " "),
    ];
}

/// Convert a catalog HTML fragment into a display label
pub fn html_to_label(text: &str) -> String {
    let mut converted = text.to_string();
    for (pattern, replacement) in HTML_MAPPING.iter() {
        converted = pattern.replace_all(&converted, *replacement).into_owned();
    }
    unescape(&converted).trim().to_string()
}

/// Decode HTML entities (`&amp;`, `&#39;`, ...). Anything else, including
/// stray `<`, is left as is.
pub fn unescape(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

/// Drop newlines and surrounding whitespace
pub fn strip_newlines(text: &str) -> String {
    text.replace('\n', "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_markup() {
        assert_eq!(html_to_label("<b>Vet</b> en <i>schuin</i>"), "[B]Vet[/B] en [I]schuin[/I]");
        assert_eq!(html_to_label("<B class=\"x\">Vet</B>"), "[B]Vet[/B]");
    }

    #[test]
    fn test_highlight_markup() {
        assert_eq!(
            html_to_label("De <em>ideale</em> wereld"),
            "De [B][COLOR yellow]ideale[/COLOR][/B] wereld"
        );
    }

    #[test]
    fn test_block_tags_and_breaks() {
        assert_eq!(html_to_label("<p>Een<br>\ntwee</p>"), "Een twee");
        assert_eq!(html_to_label("<ul><li>a</li><li>b</li></ul>"), "- a- b");
        assert_eq!(html_to_label("<div class=\"x\"><span>tekst</span></div>"), "tekst");
    }

    #[test]
    fn test_entities_and_whitespace() {
        assert_eq!(html_to_label("  Tom &amp; Jerry&#39;s  "), "Tom & Jerry's");
        assert_eq!(html_to_label("plain"), "plain");
    }

    #[test]
    fn test_unescape_keeps_tag_like_text() {
        assert_eq!(unescape("a<b c"), "a<b c");
        assert_eq!(unescape("1 &lt; 2 <x> &eacute;&#233;&#xE9;"), "1 < 2 <x> ééé");
        assert_eq!(html_to_label("3 < 4 &amp; 5 > 1"), "3 < 4 & 5 > 1");
    }

    #[test]
    fn test_strip_newlines() {
        assert_eq!(strip_newlines("\n  Docu\n "), "Docu");
    }
}
