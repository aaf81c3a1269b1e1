use super::color::Color;
use crate::layout::Coord;

/// Where the anchor column sits relative to the rendered text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Align {
    /// Text starts at the anchor
    #[default]
    Left,

    /// Text is centered on the anchor.
    /// Half the width is rounded to even, so odd widths lean alternately left and right.
    Center,

    /// Text ends on the anchor (inclusive)
    Right,
}

pub struct TextOptions {
    pub align: Align,

    /// Pixels between glyphs; `None` uses the font's configured spacing
    pub spacing: Option<Coord>,

    pub foreground: Color,

    /// Fill for the unset bits of each glyph box.
    /// `None` leaves those pixels untouched.
    pub background: Option<Color>,
}
impl Default for TextOptions {
    fn default() -> Self {
        Self {
            align: Align::Left,
            spacing: None,
            foreground: Color::WHITE,
            background: None,
        }
    }
}
