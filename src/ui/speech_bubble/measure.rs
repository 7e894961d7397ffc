// src/ui/speech_bubble/measure.rs
//
// Text measurement used to size the speech bubble before it is rendered.

use bevy::prelude::*;

/// Preferred size of a block of text when wrapped at `max_width`.
///
/// A `max_width` of zero or less means "do not wrap".
pub trait TextMeasure {
    fn measure(&self, text: &str, max_width: f32) -> Vec2;
}

/// Monospace approximation: every char advances by the same fraction of the
/// font size, and lines are broken greedily at whitespace. Words wider than a
/// line (and scripts without spaces) are hard-broken at the line width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphGridMeasure {
    pub font_size: f32,
    pub advance_ratio: f32,
    pub line_height_ratio: f32,
}

impl GlyphGridMeasure {
    pub fn new(font_size: f32) -> Self {
        Self {
            font_size: font_size.max(1.0),
            advance_ratio: 0.55,
            line_height_ratio: 1.2,
        }
    }

    pub fn advance(&self) -> f32 {
        self.font_size * self.advance_ratio
    }

    pub fn line_height(&self) -> f32 {
        self.font_size * self.line_height_ratio
    }
}

impl TextMeasure for GlyphGridMeasure {
    fn measure(&self, text: &str, max_width: f32) -> Vec2 {
        if text.is_empty() {
            return Vec2::ZERO;
        }

        let advance = self.advance();
        let max_chars = if max_width > 0.0 {
            ((max_width / advance).floor() as usize).max(1)
        } else {
            usize::MAX
        };

        let mut widest = 0;
        let mut line_count = 0;
        for paragraph in text.split('\n') {
            for line in wrap_paragraph(paragraph, max_chars) {
                widest = widest.max(line);
                line_count += 1;
            }
        }

        Vec2::new(
            widest as f32 * advance,
            line_count as f32 * self.line_height(),
        )
    }
}

/// Char counts of each wrapped line of a paragraph.
fn wrap_paragraph(paragraph: &str, max_chars: usize) -> Vec<usize> {
    let mut lines = Vec::new();
    let mut current = 0usize;

    for word in paragraph.split_whitespace() {
        let mut word_len = word.chars().count();
        let needed = if current == 0 {
            word_len
        } else {
            current + 1 + word_len
        };
        if needed <= max_chars {
            current = needed;
            continue;
        }

        if current > 0 {
            lines.push(current);
        }
        while word_len > max_chars {
            lines.push(max_chars);
            word_len -= max_chars;
        }
        current = word_len;
    }

    lines.push(current);
    lines
}

/// The measurer the bubble layout consults.
#[derive(Resource)]
pub struct TextMeasureService(Box<dyn TextMeasure + Send + Sync>);

impl TextMeasureService {
    pub fn new(measure: impl TextMeasure + Send + Sync + 'static) -> Self {
        Self(Box::new(measure))
    }

    pub fn measurer(&self) -> &dyn TextMeasure {
        self.0.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_grid() -> GlyphGridMeasure {
        GlyphGridMeasure {
            font_size: 10.0,
            advance_ratio: 1.0,
            line_height_ratio: 2.0,
        }
    }

    #[test]
    fn unbounded_width_keeps_one_line() {
        let size = unit_grid().measure("hello world", 0.0);
        assert_eq!(size, Vec2::new(110.0, 20.0));
    }

    #[test]
    fn wraps_at_word_boundaries() {
        // 6 chars per line: "hello" / "world"
        let size = unit_grid().measure("hello world", 60.0);
        assert_eq!(size, Vec2::new(50.0, 40.0));
    }

    #[test]
    fn hard_breaks_long_words_and_unspaced_scripts() {
        let size = unit_grid().measure("abcdefghij", 40.0);
        assert_eq!(size, Vec2::new(40.0, 60.0));

        let size = unit_grid().measure("你好世界", 20.0);
        assert_eq!(size, Vec2::new(20.0, 40.0));
    }

    #[test]
    fn explicit_newlines_start_new_lines() {
        let size = unit_grid().measure("ab\n\ncd", 0.0);
        assert_eq!(size, Vec2::new(20.0, 60.0));
        assert_eq!(unit_grid().measure("", 100.0), Vec2::ZERO);
    }
}
