//! Paint colors, text rendering modes, and effective glyph color resolution.

use std::fmt;
use std::str::FromStr;

/// A paint color as set by the content stream color operators.
///
/// Device color spaces carry their components directly (each in `0.0..=1.0`).
/// Any other color space is carried as [`Color::Other`] together with the
/// RGB approximation the decoding backend was able to compute for it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Color {
    /// DeviceGray (single gray component).
    Gray(f32),
    /// DeviceRGB.
    Rgb(f32, f32, f32),
    /// DeviceCMYK.
    Cmyk(f32, f32, f32, f32),
    /// A non-device color space (ICCBased, Indexed, Separation, DeviceN, ...).
    Other {
        /// Color space family name, e.g. `"ICCBased"`.
        space: String,
        /// Raw operand components.
        components: Vec<f32>,
        /// Generic RGB conversion supplied by the backend, if any.
        rgb: Option<[f32; 3]>,
    },
}

impl Color {
    pub fn black() -> Self {
        Color::Gray(0.0)
    }

    /// Convert to RGB components in `0.0..=1.0`.
    ///
    /// Returns `None` when the color cannot be converted: a non-device
    /// color space without a backend conversion, or non-finite components.
    pub fn to_rgb(&self) -> Option<[f32; 3]> {
        let rgb = match self {
            Color::Gray(g) => [*g, *g, *g],
            Color::Rgb(r, g, b) => [*r, *g, *b],
            Color::Cmyk(c, m, y, k) => [
                (1.0 - c) * (1.0 - k),
                (1.0 - m) * (1.0 - k),
                (1.0 - y) * (1.0 - k),
            ],
            Color::Other { rgb, .. } => (*rgb)?,
        };
        rgb.iter().all(|c| c.is_finite()).then_some(rgb)
    }
}

/// Text rendering mode values (`Tr` operator).
///
/// Determines how character glyphs are painted (filled, stroked, clipped, etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextRenderMode {
    /// Fill character glyphs (default).
    #[default]
    Fill = 0,
    /// Stroke (outline) character glyphs.
    Stroke = 1,
    /// Fill, then stroke character glyphs.
    FillStroke = 2,
    /// Neither fill nor stroke (invisible text).
    Invisible = 3,
    /// Fill and add to clipping path.
    FillClip = 4,
    /// Stroke and add to clipping path.
    StrokeClip = 5,
    /// Fill, stroke, and add to clipping path.
    FillStrokeClip = 6,
    /// Add to clipping path only.
    Clip = 7,
}

impl TextRenderMode {
    /// Create a TextRenderMode from an integer value (0-7).
    /// Returns None for invalid values.
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Fill),
            1 => Some(Self::Stroke),
            2 => Some(Self::FillStroke),
            3 => Some(Self::Invisible),
            4 => Some(Self::FillClip),
            5 => Some(Self::StrokeClip),
            6 => Some(Self::FillStrokeClip),
            7 => Some(Self::Clip),
            _ => None,
        }
    }

    /// Whether the effective glyph color comes from the stroking color.
    ///
    /// Even mode values (fill, fill+stroke, and their clip variants) use the
    /// fill color; odd values use the stroke color.
    pub fn uses_stroke_color(self) -> bool {
        matches!(
            self,
            Self::Stroke | Self::Invisible | Self::StrokeClip | Self::Clip
        )
    }
}

/// A 24-bit RGB color rendered as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HexColor(pub [u8; 3]);

impl HexColor {
    pub const BLACK: HexColor = HexColor([0, 0, 0]);

    /// Scale `0.0..=1.0` components to bytes. Scaling truncates toward zero
    /// and clamps to `0..=255`.
    pub fn from_rgb(rgb: [f32; 3]) -> Self {
        HexColor(rgb.map(|c| ((c * 255.0) as i32).clamp(0, 255) as u8))
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

impl FromStr for HexColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.is_ascii())
            .ok_or_else(|| format!("expected #rrggbb, got {s:?}"))?;
        let mut out = [0u8; 3];
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
                .map_err(|e| format!("invalid hex color {s:?}: {e}"))?;
        }
        Ok(HexColor(out))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for HexColor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for HexColor {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Resolve the effective color of a glyph from its rendering mode and the
/// fill/stroke paint colors active when it was shown.
///
/// Never fails: a missing or unconvertible color resolves to black and is
/// logged as a warning.
pub fn resolve_color(
    mode: TextRenderMode,
    fill: Option<&Color>,
    stroke: Option<&Color>,
) -> HexColor {
    let (color, which) = if mode.uses_stroke_color() {
        (stroke, "stroke")
    } else {
        (fill, "fill")
    };
    let Some(color) = color else {
        tracing::warn!(?mode, which, "no paint color set, using #000000");
        return HexColor::BLACK;
    };
    match color.to_rgb() {
        Some(rgb) => HexColor::from_rgb(rgb),
        None => {
            tracing::warn!(?color, which, "color conversion failed, using #000000");
            HexColor::BLACK
        }
    }
}
