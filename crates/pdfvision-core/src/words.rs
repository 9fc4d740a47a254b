use crate::color::HexColor;
use crate::glyph::GlyphRecord;

/// Tolerances for splitting glyphs into words.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupingOptions {
    /// A gap wider than `space width * gap_ratio` starts a new word.
    pub gap_ratio: f64,
    /// Glyphs whose baselines differ by less than `height * line_tolerance_ratio`
    /// of the previous glyph are on the same line.
    pub line_tolerance_ratio: f64,
    /// Maximum font size difference (points) within one word.
    pub font_size_tolerance: f64,
}

impl Default for GroupingOptions {
    fn default() -> Self {
        Self {
            gap_ratio: 0.35,
            line_tolerance_ratio: 0.5,
            font_size_tolerance: 0.5,
        }
    }
}

/// A word or phrase assembled from adjacent glyphs sharing one style.
///
/// Geometry follows glyph conventions: `x` is the leftmost glyph origin,
/// `y` the baseline of the first glyph encountered while grouping.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextGroup {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub font_id: String,
    pub font_size: f64,
    pub color: HexColor,
}

/// Position of the most recently closed group.
#[derive(Debug, Clone, Copy)]
struct LastGroupInfo {
    end_x: f64,
    y: f64,
    space_width: f64,
}

/// Groups one page of glyphs into words.
#[derive(Debug, Clone, Default)]
pub struct WordGrouper {
    options: GroupingOptions,
}

impl WordGrouper {
    pub fn new(options: GroupingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GroupingOptions {
        &self.options
    }

    /// Group the glyphs of a single page.
    ///
    /// Glyphs without decoded text are dropped. The rest are ordered by
    /// rounded baseline then x (stable for ties) and scanned once: whitespace
    /// closes the open group, and a new group starts whenever the next glyph
    /// leaves the line, jumps a gap, or changes font or color.
    pub fn group(&self, glyphs: impl IntoIterator<Item = GlyphRecord>) -> Vec<TextGroup> {
        let mut sorted: Vec<GlyphRecord> = glyphs
            .into_iter()
            .filter(|g| g.text.is_some())
            .map(|mut g| {
                if g.resolved_color.is_none() {
                    g.resolve_color();
                }
                g
            })
            .collect();
        sorted.sort_by(|a, b| {
            line_key(a.y)
                .total_cmp(&line_key(b.y))
                .then(a.x.total_cmp(&b.x))
        });

        let mut groups = Vec::new();
        let mut current: Vec<GlyphRecord> = Vec::new();
        let mut last_group_info: Option<LastGroupInfo> = None;

        for glyph in sorted {
            if glyph.is_whitespace() {
                if !current.is_empty() {
                    let info = self.close_group(&mut current, &mut groups);
                    last_group_info = Some(LastGroupInfo {
                        space_width: glyph.valid_space_width(),
                        ..info
                    });
                }
                continue;
            }

            if let Some(last) = current.last() {
                if self.is_boundary(last, &glyph) {
                    last_group_info = Some(self.close_group(&mut current, &mut groups));
                }
            }

            if current.is_empty() {
                if let Some(info) = last_group_info {
                    tracing::trace!(
                        gap = glyph.x - info.end_x,
                        dy = glyph.y - info.y,
                        space_width = info.space_width,
                        "starting group after previous group"
                    );
                }
            }
            current.push(glyph);
        }

        if !current.is_empty() {
            self.close_group(&mut current, &mut groups);
        }
        groups
    }

    /// Whether `glyph` must start a new group after `last`.
    fn is_boundary(&self, last: &GlyphRecord, glyph: &GlyphRecord) -> bool {
        let opts = &self.options;
        let same_line = (glyph.y - last.y).abs() < last.height * opts.line_tolerance_ratio;
        let same_font = glyph.font_id == last.font_id
            && (glyph.font_size - last.font_size).abs() < opts.font_size_tolerance;
        let same_color = glyph.resolved_color == last.resolved_color;
        let gap = glyph.x - (last.x + last.width);
        let substantial_gap = gap > last.valid_space_width() * opts.gap_ratio;

        !same_line || substantial_gap || !same_font || !same_color
    }

    /// Turn the buffered glyphs into a [`TextGroup`] and clear the buffer.
    fn close_group(
        &self,
        current: &mut Vec<GlyphRecord>,
        groups: &mut Vec<TextGroup>,
    ) -> LastGroupInfo {
        let first = current[0].clone();
        let height = current.iter().map(|g| g.height).fold(0.0, f64::max);
        current.sort_by(|a, b| a.x.total_cmp(&b.x));

        let text: String = current.iter().filter_map(|g| g.text.as_deref()).collect();
        let left = &current[0];
        let right = &current[current.len() - 1];
        let end_x = right.x + right.width;
        let group = TextGroup {
            text,
            x: left.x,
            y: first.y,
            width: end_x - left.x,
            height,
            color: first.color(),
            font_id: first.font_id,
            font_size: first.font_size,
        };
        let info = LastGroupInfo {
            end_x,
            y: group.y,
            space_width: right.valid_space_width(),
        };
        current.clear();

        if group.text.is_empty() {
            tracing::trace!(x = group.x, y = group.y, "dropping group without text");
        } else {
            tracing::trace!(text = %group.text, x = group.x, y = group.y, "closed group");
            groups.push(group);
        }
        info
    }
}

/// Baseline rounded to the nearest integer, halves rounding up (`-0.5` is `0`).
fn line_key(y: f64) -> f64 {
    (y + 0.5).floor()
}

/// Group one page of glyphs with the given options.
pub fn group_glyphs(glyphs: Vec<GlyphRecord>, options: &GroupingOptions) -> Vec<TextGroup> {
    WordGrouper::new(options.clone()).group(glyphs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn glyph(text: &str, x: f64, y: f64, width: f64) -> GlyphRecord {
        let mut g = GlyphRecord::new(text, x, y, width, 12.0, "F", 12.0);
        g.fill_color = Some(Color::black());
        g
    }

    fn space(x: f64, y: f64, declared: f64) -> GlyphRecord {
        let mut g = glyph(" ", x, y, 3.0);
        g.declared_space_width = declared;
        g
    }

    fn texts(groups: &[TextGroup]) -> Vec<&str> {
        groups.iter().map(|g| g.text.as_str()).collect()
    }

    fn group(glyphs: Vec<GlyphRecord>) -> Vec<TextGroup> {
        WordGrouper::default().group(glyphs)
    }

    #[test]
    fn test_default_options() {
        let grouper = WordGrouper::default();
        let opts = grouper.options();
        assert_eq!(opts.gap_ratio, 0.35);
        assert_eq!(opts.line_tolerance_ratio, 0.5);
        assert_eq!(opts.font_size_tolerance, 0.5);
    }

    #[test]
    fn test_empty_page() {
        assert!(group(Vec::new()).is_empty());
    }

    #[test]
    fn test_adjacent_glyphs_merge() {
        let groups = group(vec![glyph("H", 0.0, 700.0, 10.0), glyph("i", 10.0, 700.0, 5.0)]);
        assert_eq!(groups.len(), 1);
        let g = &groups[0];
        assert_eq!(g.text, "Hi");
        assert_eq!(g.x, 0.0);
        assert_eq!(g.y, 700.0);
        assert_eq!(g.width, 15.0);
        assert_eq!(g.height, 12.0);
        assert_eq!(g.font_id, "F");
        assert_eq!(g.font_size, 12.0);
        assert_eq!(g.color, HexColor::BLACK);
    }

    #[test]
    fn test_whitespace_splits_and_is_excluded() {
        let groups = group(vec![
            glyph("H", 0.0, 700.0, 10.0),
            glyph("i", 10.0, 700.0, 5.0),
            space(15.0, 700.0, 6.0),
            glyph("T", 25.0, 700.0, 8.0),
        ]);
        assert_eq!(texts(&groups), vec!["Hi", "T"]);
        assert_eq!(groups[0].x, 0.0);
        assert_eq!(groups[0].width, 15.0);
        // the previous group's end is never used to move this one
        assert_eq!(groups[1].x, 25.0);
        assert_eq!(groups[1].width, 8.0);
    }

    #[test]
    fn test_leading_and_repeated_whitespace_ignored() {
        let groups = group(vec![
            space(0.0, 700.0, 3.0),
            glyph("a", 3.0, 700.0, 5.0),
            space(8.0, 700.0, 3.0),
            space(11.0, 700.0, 3.0),
            glyph("b", 14.0, 700.0, 5.0),
            space(19.0, 700.0, 3.0),
        ]);
        assert_eq!(texts(&groups), vec!["a", "b"]);
    }

    #[test]
    fn test_gap_at_threshold_merges() {
        let mut a = glyph("a", 0.0, 700.0, 10.0);
        a.declared_space_width = 100.0;
        // gap = 45 - 10 = 35 = 100 * 0.35
        let groups = group(vec![a, glyph("b", 45.0, 700.0, 10.0)]);
        assert_eq!(texts(&groups), vec!["ab"]);
        assert_eq!(groups[0].width, 55.0);
    }

    #[test]
    fn test_gap_above_threshold_splits() {
        let mut a = glyph("a", 0.0, 700.0, 10.0);
        a.declared_space_width = 100.0;
        // gap = 36 = 100 * 0.36
        let groups = group(vec![a, glyph("b", 46.0, 700.0, 10.0)]);
        assert_eq!(texts(&groups), vec!["a", "b"]);
    }

    #[test]
    fn test_gap_uses_glyph_width_without_declared_space() {
        // space width falls back to 10 -> threshold 3.5
        let groups = group(vec![glyph("a", 0.0, 700.0, 10.0), glyph("b", 13.0, 700.0, 10.0)]);
        assert_eq!(texts(&groups), vec!["ab"]);
        let groups = group(vec![glyph("a", 0.0, 700.0, 10.0), glyph("b", 14.0, 700.0, 10.0)]);
        assert_eq!(texts(&groups), vec!["a", "b"]);
    }

    #[test]
    fn test_configurable_gap_ratio() {
        let grouper = WordGrouper::new(GroupingOptions {
            gap_ratio: 1.0,
            ..GroupingOptions::default()
        });
        let groups = grouper.group(vec![glyph("a", 0.0, 700.0, 10.0), glyph("b", 19.0, 700.0, 10.0)]);
        assert_eq!(texts(&groups), vec!["ab"]);
    }

    #[test]
    fn test_color_change_forces_break() {
        let a = glyph("a", 0.0, 700.0, 10.0);
        let mut b = glyph("b", 0.0, 700.0, 10.0);
        b.fill_color = Some(Color::Rgb(1.0, 0.0, 0.0));
        let groups = group(vec![a, b]);
        assert_eq!(texts(&groups), vec!["a", "b"]);
        assert_eq!(groups[1].color.to_string(), "#ff0000");
    }

    #[test]
    fn test_font_change_forces_break() {
        let a = glyph("a", 0.0, 700.0, 10.0);
        let mut b = glyph("b", 10.0, 700.0, 10.0);
        b.font_id = "G".to_string();
        assert_eq!(texts(&group(vec![a, b])), vec!["a", "b"]);
    }

    #[test]
    fn test_font_size_tolerance() {
        let a = glyph("a", 0.0, 700.0, 10.0);
        let mut b = glyph("b", 10.0, 700.0, 10.0);
        b.font_size = 12.4;
        assert_eq!(texts(&group(vec![a.clone(), b.clone()])), vec!["ab"]);
        b.font_size = 12.5;
        assert_eq!(texts(&group(vec![a, b])), vec!["a", "b"]);
    }

    #[test]
    fn test_lines_are_separated_and_ordered_by_baseline() {
        let groups = group(vec![
            glyph("c", 0.0, 700.0, 5.0),
            glyph("a", 0.0, 100.0, 5.0),
            glyph("b", 5.0, 100.0, 5.0),
        ]);
        assert_eq!(texts(&groups), vec!["ab", "c"]);
        assert_eq!(groups[0].y, 100.0);
        assert_eq!(groups[1].y, 700.0);
    }

    #[test]
    fn test_subunit_jitter_sorted_by_x() {
        // 700.4 and 699.6 both round to 700, so x decides order
        let groups = group(vec![
            glyph("b", 5.0, 699.6, 5.0),
            glyph("a", 0.0, 700.4, 5.0),
        ]);
        assert_eq!(texts(&groups), vec!["ab"]);
        // y comes from the first glyph encountered after sorting
        assert_eq!(groups[0].y, 700.4);
    }

    #[test]
    fn test_line_tolerance_uses_previous_glyph_height() {
        let mut a = glyph("a", 0.0, 700.0, 5.0);
        a.height = 4.0;
        // |dy| = 2 is not < 4 * 0.5
        let b = glyph("b", 5.0, 702.0, 5.0);
        assert_eq!(texts(&group(vec![a, b])), vec!["a", "b"]);
    }

    #[test]
    fn test_group_height_is_max_and_style_from_first() {
        let mut a = glyph("a", 0.0, 700.0, 5.0);
        a.height = 10.0;
        let mut b = glyph("b", 5.0, 700.2, 5.0);
        b.height = 14.0;
        b.font_size = 12.3;
        let groups = group(vec![a, b]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].height, 14.0);
        assert_eq!(groups[0].font_size, 12.0);
        assert_eq!(groups[0].y, 700.0);
    }

    #[test]
    fn test_undecodable_glyphs_dropped() {
        let mut bad = glyph("?", 5.0, 700.0, 5.0);
        bad.text = None;
        let groups = group(vec![glyph("a", 0.0, 700.0, 5.0), bad, glyph("b", 5.0, 700.0, 5.0)]);
        assert_eq!(texts(&groups), vec!["ab"]);
    }

    #[test]
    fn test_empty_text_glyph_closes_group() {
        let groups = group(vec![
            glyph("a", 0.0, 700.0, 5.0),
            glyph("", 5.0, 700.0, 5.0),
            glyph("b", 10.0, 700.0, 5.0),
        ]);
        assert_eq!(texts(&groups), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_text_glyph_adds_no_width() {
        let groups = group(vec![glyph("a", 0.0, 700.0, 5.0), glyph("", 5.0, 700.0, 40.0)]);
        assert_eq!(texts(&groups), vec!["a"]);
        assert_eq!(groups[0].width, 5.0);
    }

    #[test]
    fn test_negative_half_baseline_rounds_up() {
        // both keys are 0, so x decides
        let groups = group(vec![glyph("a", 5.0, -0.5, 5.0), glyph("b", 0.0, 0.4, 5.0)]);
        assert_eq!(texts(&groups), vec!["ba"]);
    }

    #[test]
    fn test_overlapping_glyphs_keep_emission_order() {
        // double-painted bold: identical position, stable sort keeps order
        let groups = group(vec![glyph("x", 0.0, 700.0, 5.0), glyph("y", 0.0, 700.0, 5.0)]);
        assert_eq!(texts(&groups), vec!["xy"]);
    }

    #[test]
    fn test_multi_char_glyph() {
        let groups = group(vec![glyph("ﬁ", 0.0, 700.0, 8.0), glyph("sh", 8.0, 700.0, 9.0)]);
        assert_eq!(texts(&groups), vec!["ﬁsh"]);
    }

    #[test]
    fn test_preresolved_color_is_kept() {
        let mut g = glyph("a", 0.0, 700.0, 5.0);
        g.resolved_color = Some(HexColor([1, 2, 3]));
        let groups = group(vec![g]);
        assert_eq!(groups[0].color, HexColor([1, 2, 3]));
    }

    #[test]
    fn test_grouping_is_deterministic() {
        let input = vec![
            glyph("b", 5.0, 700.0, 5.0),
            glyph("a", 0.0, 700.0, 5.0),
            space(10.0, 700.0, 3.0),
            glyph("c", 20.0, 650.0, 5.0),
        ];
        assert_eq!(group(input.clone()), group(input));
    }

    #[test]
    fn test_group_glyphs_helper() {
        let groups = group_glyphs(
            vec![glyph("a", 0.0, 700.0, 5.0)],
            &GroupingOptions::default(),
        );
        assert_eq!(texts(&groups), vec!["a"]);
    }
}
