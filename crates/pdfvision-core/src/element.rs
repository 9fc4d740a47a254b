use crate::font::FontAttributes;
use crate::words::TextGroup;

/// A styled word or phrase on a page, ready for serialization.
///
/// With the `serde` feature the JSON field names are camelCase
/// (`fontSize`, `fontFamily`, `pageNumber`, ...).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct TextElement {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub font_size: f64,
    pub font_family: String,
    pub font_weight: String,
    pub font_style: String,
    /// `#rrggbb`, lowercase.
    pub color: String,
    /// 1-based page number.
    pub page_number: u32,
}

impl TextElement {
    /// Build an element from a closed group, deriving font attributes from
    /// the group's font identifier.
    pub fn from_group(group: TextGroup, page_number: u32) -> Self {
        let FontAttributes {
            family,
            weight,
            style,
        } = FontAttributes::from_font_id(&group.font_id);
        Self {
            text: group.text,
            x: group.x,
            y: group.y,
            width: group.width,
            height: group.height,
            font_size: group.font_size,
            font_family: family,
            font_weight: weight,
            font_style: style,
            color: group.color.to_string(),
            page_number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::HexColor;

    #[test]
    fn from_group_derives_font_attributes() {
        let group = TextGroup {
            text: "Hello".to_string(),
            x: 72.0,
            y: 700.0,
            width: 30.0,
            height: 12.0,
            font_id: "ABCDEF+Lato-BoldItalic".to_string(),
            font_size: 12.0,
            color: HexColor([0x12, 0x34, 0x56]),
        };
        let el = TextElement::from_group(group, 3);
        assert_eq!(el.text, "Hello");
        assert_eq!(el.x, 72.0);
        assert_eq!(el.y, 700.0);
        assert_eq!(el.width, 30.0);
        assert_eq!(el.height, 12.0);
        assert_eq!(el.font_size, 12.0);
        assert_eq!(el.font_family, "Lato-BoldItalic");
        assert_eq!(el.font_weight, "bold");
        assert_eq!(el.font_style, "italic");
        assert_eq!(el.color, "#123456");
        assert_eq!(el.page_number, 3);
    }
}
