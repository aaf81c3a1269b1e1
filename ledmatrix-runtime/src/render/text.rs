use std::fmt::Display;

use super::{Drawable, FrameBuffer};
use crate::graphics::{Align, Color, Font, Glyph, TextOptions};
use crate::layout::{Address, Coord};

/// Where a piece of text ended up, so that other shapes can be placed around it
/// (e.g. a highlight box sized to the text).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextExtent {
    /// Column of the left edge, after alignment
    pub left: Coord,
    pub width: Coord,
}
impl TextExtent {
    /// Right-most column covered by the text (inclusive)
    pub fn right(&self) -> Coord {
        self.left.saturating_add(self.width).saturating_sub(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextError {
    /// The font has no glyph for this character
    MissingGlyph(char),

    /// Only single-byte character codes can be looked up in a font
    Unsupported(char),
}
impl Display for TextError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextError::MissingGlyph(c) => write!(f, "no glyph for {c:?} in font"),
            TextError::Unsupported(c) => {
                write!(f, "{c:?} is outside the single-byte character set")
            }
        }
    }
}
impl std::error::Error for TextError {}

/// Lays out a string with a bitmap [`Font`] and plots it into a [`FrameBuffer`].
///
/// The anchor is a point on the baseline;
/// depending on [`Align`], the text starts at, is centered on, or ends at its column.
pub struct TextRenderer<'f> {
    font: &'f Font,
    options: TextOptions,
}
impl<'f> TextRenderer<'f> {
    pub fn new(font: &'f Font) -> Self {
        Self::with_options(font, TextOptions::default())
    }

    pub fn with_options(font: &'f Font, options: TextOptions) -> Self {
        Self { font, options }
    }

    pub fn align(mut self, align: Align) -> Self {
        self.options.align = align;
        self
    }

    pub fn spacing(mut self, spacing: Coord) -> Self {
        self.options.spacing = Some(spacing);
        self
    }

    pub fn foreground(mut self, color: Color) -> Self {
        self.options.foreground = color;
        self
    }

    pub fn background(mut self, color: impl Into<Option<Color>>) -> Self {
        self.options.background = color.into();
        self
    }

    fn spacing_px(&self) -> Coord {
        self.options.spacing.unwrap_or(self.font.spacing)
    }

    /// Every glyph has to be found before anything is drawn;
    /// skipping one would silently throw off the layout.
    fn glyphs(&self, text: &str) -> Result<Vec<&'f Glyph>, TextError> {
        text.chars()
            .map(|c| {
                let code = u8::try_from(c).map_err(|_| TextError::Unsupported(c))?;
                self.font.glyph(code).ok_or(TextError::MissingGlyph(c))
            })
            .collect()
    }

    fn width_of(&self, glyphs: &[&Glyph]) -> Coord {
        let gaps = Coord::try_from(glyphs.len().saturating_sub(1)).unwrap_or(Coord::MAX);
        glyphs
            .iter()
            .fold(self.spacing_px().saturating_mul(gaps), |width, glyph| {
                width.saturating_add(glyph.width())
            })
    }

    /// Total width `text` would take up, including the spacing between glyphs
    pub fn measure(&self, text: &str) -> Result<Coord, TextError> {
        Ok(self.width_of(&self.glyphs(text)?))
    }

    /// Saturates, so anchors far off the buffer just end up clipped
    fn left_edge(&self, anchor: Coord, width: Coord) -> Coord {
        match self.options.align {
            Align::Left => anchor,
            Align::Center => {
                anchor.saturating_sub((f64::from(width) / 2.0).round_ties_even() as Coord)
            }
            Align::Right => anchor.saturating_sub(width.saturating_sub(1)),
        }
    }

    /// Where `text` would land if drawn at `anchor`, without drawing it
    pub fn extent(&self, anchor: Address, text: &str) -> Result<TextExtent, TextError> {
        let width = self.measure(text)?;
        Ok(TextExtent {
            left: self.left_edge(anchor.col, width),
            width,
        })
    }

    /// Draws `text` on `buffer`. Parts that fall off the buffer are clipped.
    ///
    /// On error nothing has been drawn.
    pub fn draw(
        &self,
        buffer: &mut FrameBuffer,
        anchor: Address,
        text: &str,
    ) -> Result<TextExtent, TextError> {
        let glyphs = self.glyphs(text)?;
        let width = self.width_of(&glyphs);
        let left = self.left_edge(anchor.col, width);

        let mut cursor = left;
        for glyph in glyphs {
            GlyphStamp {
                glyph,
                foreground: self.options.foreground,
                background: self.options.background,
            }
            .draw_at(
                buffer,
                Address::new(
                    anchor.row.saturating_sub(glyph.y_offset()),
                    cursor.saturating_add(glyph.x_offset()),
                ),
            );

            cursor = cursor
                .saturating_add(glyph.width())
                .saturating_add(self.spacing_px());
        }

        log::trace!("drew {text:?} at columns {left}..{}", left.saturating_add(width));
        Ok(TextExtent { left, width })
    }
}

/// A glyph with its colors; `position` is the bottom-left corner of the glyph box.
struct GlyphStamp<'a> {
    glyph: &'a Glyph,
    foreground: Color,
    background: Option<Color>,
}
impl Drawable for GlyphStamp<'_> {
    fn draw_at(&self, buffer: &mut FrameBuffer, position: Address) {
        // Bitmap rows run bottom to top
        for row in 0..self.glyph.height() {
            for col in 0..self.glyph.width() {
                let at = Address::new(
                    position.row.saturating_sub(row),
                    position.col.saturating_add(col),
                );
                if self.glyph.is_set(row, col) {
                    buffer.set_at(at, self.foreground);
                } else if let Some(background) = self.background {
                    buffer.set_at(at, background);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 'A' is a solid 3x3 block, 'B' a 3x3 ring, 'g' has a descender
    fn test_font() -> Font {
        let mut font = Font::new(0);
        font.insert(
            b'A',
            Glyph::from_top_rows(3, 0, 0, &[0b111, 0b111, 0b111]).unwrap(),
        );
        font.insert(
            b'B',
            Glyph::from_top_rows(3, 0, 0, &[0b111, 0b101, 0b111]).unwrap(),
        );
        font.insert(b'g', Glyph::from_top_rows(1, 0, -1, &[1, 0, 1]).unwrap());
        font
    }

    fn lit_cols(buffer: &FrameBuffer, row: Coord) -> Vec<Coord> {
        (0..buffer.cols())
            .filter(|&col| buffer.pixel_at(row, col).is_some_and(|p| !p.color().is_black()))
            .collect()
    }

    #[test]
    fn test_left_aligned_layout() {
        let font = test_font();
        let mut buffer = FrameBuffer::new(5, 10);
        let extent = TextRenderer::new(&font)
            .spacing(1)
            .draw(&mut buffer, Address::new(4, 0), "AB")
            .unwrap();

        assert_eq!(extent, TextExtent { left: 0, width: 7 });
        assert_eq!(extent.right(), 6);
        // baseline row: both glyphs solid
        assert_eq!(lit_cols(&buffer, 4), vec![0, 1, 2, 4, 5, 6]);
        // middle row: 'B' has a hole
        assert_eq!(lit_cols(&buffer, 3), vec![0, 1, 2, 4, 6]);
        assert_eq!(lit_cols(&buffer, 2), vec![0, 1, 2, 4, 5, 6]);
        assert!(lit_cols(&buffer, 1).is_empty());
    }

    #[test]
    fn test_font_spacing_is_default() {
        let mut font = test_font();
        font.spacing = 2;
        let renderer = TextRenderer::new(&font);
        assert_eq!(renderer.measure("AB"), Ok(8));
        assert_eq!(renderer.spacing(0).measure("AB"), Ok(6));
    }

    #[test]
    fn test_alignment() {
        let font = test_font();
        let renderer = |align| TextRenderer::new(&font).spacing(1).align(align);
        let mut buffer = FrameBuffer::new(5, 20);

        let right = renderer(Align::Right)
            .draw(&mut buffer, Address::new(4, 10), "AB")
            .unwrap();
        assert_eq!(right, TextExtent { left: 4, width: 7 });
        assert_eq!(lit_cols(&buffer, 4).last(), Some(&10));

        // 7 / 2 = 3.5 rounds to 4
        let center = renderer(Align::Center)
            .draw(&mut buffer, Address::new(4, 10), "AB")
            .unwrap();
        assert_eq!(center.left, 6);

        // 3 / 2 = 1.5 rounds to 2, 11 / 2 = 5.5 rounds to 6, 5 / 2 = 2.5 rounds to 2
        assert_eq!(
            renderer(Align::Center).draw(&mut buffer, Address::new(4, 10), "A"),
            Ok(TextExtent { left: 8, width: 3 })
        );
        assert_eq!(
            renderer(Align::Center).draw(&mut buffer, Address::new(4, 10), "ABA"),
            Ok(TextExtent { left: 4, width: 11 })
        );
        assert_eq!(
            renderer(Align::Center).extent(Address::new(0, 10), "ABA"),
            Ok(TextExtent { left: 4, width: 11 })
        );
        assert_eq!(
            TextRenderer::new(&font)
                .spacing(-1)
                .align(Align::Center)
                .draw(&mut buffer, Address::new(4, 10), "AB"),
            Ok(TextExtent { left: 8, width: 5 })
        );
    }

    #[test]
    fn test_background() {
        let font = test_font();
        let mut transparent = FrameBuffer::new(3, 3);
        transparent.set(1, 1, Color::RED);
        TextRenderer::new(&font)
            .draw(&mut transparent, Address::new(2, 0), "B")
            .unwrap();
        assert_eq!(transparent.pixel_at(1, 1).map(|p| p.color()), Some(Color::RED));

        let mut filled = FrameBuffer::new(3, 3);
        filled.set(1, 1, Color::RED);
        TextRenderer::new(&font)
            .foreground(Color::GREEN)
            .background(Color::BLUE)
            .draw(&mut filled, Address::new(2, 0), "B")
            .unwrap();
        assert_eq!(filled.pixel_at(1, 1).map(|p| p.color()), Some(Color::BLUE));
        assert_eq!(filled.pixel_at(0, 0).map(|p| p.color()), Some(Color::GREEN));
    }

    #[test]
    fn test_descender_offset() {
        let font = test_font();
        let mut buffer = FrameBuffer::new(6, 2);
        TextRenderer::new(&font)
            .draw(&mut buffer, Address::new(3, 0), "g")
            .unwrap();
        // y_offset of -1 drops the glyph box one row below the baseline
        assert_eq!(
            buffer.render_text_rows(),
            vec!["--", "--", "#-", "--", "#-", "--"]
        );
    }

    #[test]
    fn test_missing_glyph_draws_nothing() {
        let font = test_font();
        let mut buffer = FrameBuffer::new(5, 10);
        let renderer = TextRenderer::new(&font);

        assert_eq!(
            renderer.draw(&mut buffer, Address::new(4, 0), "AxB"),
            Err(TextError::MissingGlyph('x'))
        );
        assert_eq!(
            renderer.draw(&mut buffer, Address::new(4, 0), "A\u{263a}"),
            Err(TextError::Unsupported('\u{263a}'))
        );
        assert_eq!(buffer, FrameBuffer::new(5, 10));
    }

    #[test]
    fn test_empty_and_clipped() {
        let font = test_font();
        let mut buffer = FrameBuffer::new(3, 4);
        let renderer = TextRenderer::new(&font).spacing(1);
        assert_eq!(renderer.measure(""), Ok(0));
        assert_eq!(
            renderer.draw(&mut buffer, Address::new(2, 0), ""),
            Ok(TextExtent { left: 0, width: 0 })
        );

        renderer
            .draw(&mut buffer, Address::new(2, -2), "AB")
            .unwrap();
        assert_eq!(buffer.render_text_rows(), vec!["#-##", "#-#-", "#-##"]);
    }

    #[test]
    fn test_far_off_anchors() {
        let font = test_font();
        let mut buffer = FrameBuffer::new(10, 10);

        let right = TextRenderer::new(&font).align(Align::Right);
        assert_eq!(
            right.draw(&mut buffer, Address::new(5, Coord::MIN), "A"),
            Ok(TextExtent { left: Coord::MIN, width: 3 })
        );
        assert_eq!(
            right.draw(&mut buffer, Address::new(Coord::MAX, 0), "AB"),
            Ok(TextExtent { left: -5, width: 6 })
        );

        let center = TextRenderer::new(&font).align(Align::Center);
        assert_eq!(
            center.draw(&mut buffer, Address::new(5, Coord::MIN), "AB"),
            Ok(TextExtent { left: Coord::MIN, width: 6 })
        );
        assert_eq!(
            center.draw(&mut buffer, Address::new(Coord::MAX, Coord::MAX), "AgB"),
            Ok(TextExtent { left: Coord::MAX - 4, width: 7 })
        );

        let wide = TextRenderer::new(&font).spacing(Coord::MAX);
        assert_eq!(wide.measure("AB"), Ok(Coord::MAX));
        assert!(wide.draw(&mut buffer, Address::new(Coord::MIN, 0), "ABA").is_ok());

        assert_eq!(buffer, FrameBuffer::new(10, 10));
        assert_eq!(TextExtent { left: Coord::MIN, width: 0 }.right(), Coord::MIN);
        assert_eq!(TextExtent { left: Coord::MAX, width: 5 }.right(), Coord::MAX - 1);
    }
}
