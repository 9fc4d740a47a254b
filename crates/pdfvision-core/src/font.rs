//! Human-readable font attributes derived from raw font names.
//!
//! PDF font names such as `ABCDEF+OpenSans-SemiBoldItalic` carry a subset
//! tag and encode weight and style in free-form text. This module strips the
//! tag and maps the remaining name to CSS-like weight and style tokens.

use std::sync::LazyLock;

use regex::Regex;

/// Family name used when nothing remains after stripping the subset tag.
pub const UNKNOWN_FAMILY: &str = "Unknown";

static SUBSET_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{6}\+").expect("valid subset prefix pattern"));

/// Family, weight, and style derived from a font identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FontAttributes {
    pub family: String,
    /// `"bold"`, `"normal"`, or a numeric weight such as `"300"`.
    pub weight: String,
    /// `"italic"` or `"normal"`.
    pub style: String,
}

impl FontAttributes {
    pub fn from_font_id(font_id: &str) -> Self {
        let family = strip_subset_prefix(font_id);
        let family = if family.trim().is_empty() {
            UNKNOWN_FAMILY.to_string()
        } else {
            family.to_string()
        };
        Self {
            weight: font_weight(&family).to_string(),
            style: font_style(&family).to_string(),
            family,
        }
    }
}

/// Remove a leading six-uppercase-letter subset tag and its `+`.
///
/// ```
/// use pdfvision_core::strip_subset_prefix;
/// assert_eq!(strip_subset_prefix("ABCDEF+Helvetica"), "Helvetica");
/// assert_eq!(strip_subset_prefix("Helvetica"), "Helvetica");
/// ```
pub fn strip_subset_prefix(font_id: &str) -> &str {
    match SUBSET_PREFIX.find(font_id) {
        Some(m) => &font_id[m.end()..],
        None => font_id,
    }
}

/// Weight token for a font name, matched case-insensitively.
///
/// Checks run in a fixed order because several patterns contain others
/// (`bold` wins over `semi`/`extra` variants; `ultra`+`light` wins over `light`).
pub fn font_weight(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    let has = |s: &str| lower.contains(s);

    if has("bold") {
        "bold"
    } else if has("black") || has("heavy") {
        "900"
    } else if has("ultra") && has("light") {
        "200"
    } else if has("light") {
        "300"
    } else if has("medium") {
        "500"
    } else if has("thin") {
        "100"
    } else if has("semi") && has("bold") {
        "600"
    } else if has("extra") && has("bold") {
        "800"
    } else {
        "normal"
    }
}

/// Style token for a font name: `"italic"` for italic or oblique faces.
pub fn font_style(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    if lower.contains("italic") || lower.contains("oblique") {
        "italic"
    } else {
        "normal"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subset_prefix_removed() {
        let attrs = FontAttributes::from_font_id("ABCDEF+PlayfairDisplay-Italic");
        assert_eq!(attrs.family, "PlayfairDisplay-Italic");
        assert_eq!(attrs.style, "italic");
        assert_eq!(attrs.weight, "normal");
    }

    #[test]
    fn non_subset_prefixes_kept() {
        assert_eq!(strip_subset_prefix("ABCDE+Arial"), "ABCDE+Arial");
        assert_eq!(strip_subset_prefix("abcdef+Arial"), "abcdef+Arial");
        assert_eq!(strip_subset_prefix("ABCDEFG+Arial"), "ABCDEFG+Arial");
        assert_eq!(strip_subset_prefix("XArial ABCDEF+"), "XArial ABCDEF+");
    }

    #[test]
    fn empty_family_is_unknown() {
        assert_eq!(FontAttributes::from_font_id("ABCDEF+").family, "Unknown");
        assert_eq!(FontAttributes::from_font_id("").family, "Unknown");
        assert_eq!(FontAttributes::from_font_id("ABCDEF+ ").family, "Unknown");
        assert_eq!(FontAttributes::from_font_id("  ").family, "Unknown");
        assert_eq!(FontAttributes::from_font_id("").weight, "normal");
    }

    #[test]
    fn weights() {
        let cases = [
            ("Helvetica-Bold", "bold"),
            ("Roboto-Black", "900"),
            ("Inter-Heavy", "900"),
            ("OpenSans-Light", "300"),
            ("Gotham-UltraLight", "200"),
            ("Lato-Medium", "500"),
            ("Raleway-Thin", "100"),
            ("Times-Roman", "normal"),
        ];
        for (name, expected) in cases {
            assert_eq!(font_weight(name), expected, "{name}");
        }
    }

    #[test]
    fn bold_takes_precedence_over_compound_weights() {
        assert_eq!(font_weight("Montserrat-SemiBold"), "bold");
        assert_eq!(font_weight("Montserrat-ExtraBold"), "bold");
        assert_eq!(font_weight("Arial-BoldMT-Light"), "bold");
    }

    #[test]
    fn weight_matching_is_case_insensitive() {
        assert_eq!(font_weight("ARIAL-BOLD"), "bold");
        assert_eq!(font_weight("arial-light"), "300");
    }

    #[test]
    fn styles() {
        assert_eq!(font_style("Helvetica-Oblique"), "italic");
        assert_eq!(font_style("Times-BoldItalic"), "italic");
        assert_eq!(font_style("Times-Roman"), "normal");
    }

    #[test]
    fn full_attributes() {
        let attrs = FontAttributes::from_font_id("QWERTY+OpenSans-LightItalic");
        assert_eq!(
            attrs,
            FontAttributes {
                family: "OpenSans-LightItalic".to_string(),
                weight: "300".to_string(),
                style: "italic".to_string(),
            }
        );
    }
}
