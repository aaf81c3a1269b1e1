use std::{collections::HashMap, fmt::Display, path::Path};

use eyre::WrapErr;
use fontdue::{Font as FontData, FontSettings};

use crate::layout::Coord;

/// Widest glyph a [`Glyph`] row can hold
pub const MAX_GLYPH_WIDTH: Coord = u64::BITS as Coord;

/// A single character's 1-bit bitmap plus its bounding box.
///
/// Offsets are relative to the text anchor, which sits on the baseline:
/// `x_offset` shifts the box right, `y_offset` is the height of the box's bottom edge above the baseline.
///
/// `rows[0]` is the **bottom** row of the bitmap.
/// Within a row, bit `width - 1` is the left-most column and bit 0 the right-most.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Glyph {
    width: Coord,
    height: Coord,
    x_offset: Coord,
    y_offset: Coord,
    rows: Vec<u64>,
}
impl Glyph {
    pub fn new(
        width: Coord,
        height: Coord,
        x_offset: Coord,
        y_offset: Coord,
        rows: Vec<u64>,
    ) -> Result<Self, FontError> {
        if !(0..=MAX_GLYPH_WIDTH).contains(&width) {
            return Err(FontError::GlyphTooWide(width));
        }
        if height < 0 || rows.len() != height as usize {
            return Err(FontError::BadRows {
                expected: height,
                found: rows.len(),
            });
        }

        let mask = match width {
            MAX_GLYPH_WIDTH => u64::MAX,
            width => (1u64 << width) - 1,
        };
        Ok(Self {
            width,
            height,
            x_offset,
            y_offset,
            rows: rows.into_iter().map(|row| row & mask).collect(),
        })
    }

    /// Same as [`Glyph::new`], but with rows listed the way they read: top first.
    pub fn from_top_rows(
        width: Coord,
        x_offset: Coord,
        y_offset: Coord,
        rows: &[u64],
    ) -> Result<Self, FontError> {
        let bottom_up = rows.iter().rev().copied().collect::<Vec<_>>();
        Self::new(width, rows.len() as Coord, x_offset, y_offset, bottom_up)
    }

    pub fn width(&self) -> Coord {
        self.width
    }
    pub fn height(&self) -> Coord {
        self.height
    }
    pub fn x_offset(&self) -> Coord {
        self.x_offset
    }
    pub fn y_offset(&self) -> Coord {
        self.y_offset
    }

    /// `row` counts up from the bottom of the bitmap, `col` right from its left edge.
    pub fn is_set(&self, row: Coord, col: Coord) -> bool {
        if !(0..self.width).contains(&col) {
            return false;
        }
        usize::try_from(row)
            .ok()
            .and_then(|row| self.rows.get(row))
            .map(|&bits| bits >> (self.width - 1 - col) & 1 == 1)
            .unwrap_or(false)
    }
}

/// A bitmap font: glyphs keyed by single-byte character code,
/// plus the spacing to put between glyphs when none is requested explicitly.
#[derive(Clone, Debug, Default)]
pub struct Font {
    glyphs: HashMap<u8, Glyph>,
    pub spacing: Coord,
}
impl Font {
    pub fn new(spacing: Coord) -> Self {
        Self {
            glyphs: HashMap::new(),
            spacing,
        }
    }

    pub fn insert(&mut self, code: u8, glyph: Glyph) -> Option<Glyph> {
        self.glyphs.insert(code, glyph)
    }

    pub fn glyph(&self, code: u8) -> Option<&Glyph> {
        self.glyphs.get(&code)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Small 3x5 font covering space, digits, upper-case letters and some punctuation.
    pub fn builtin() -> Self {
        let mut font = Self::new(1);
        for (c, rows) in BUILTIN_3X5 {
            // Every entry is 3 wide with 5 rows, which `Glyph::new` always accepts
            if let Ok(glyph) = Glyph::from_top_rows(3, 0, 0, rows) {
                font.insert(*c as u8, glyph);
            }
        }
        font
    }

    /// Rasterizes printable ASCII from TrueType/OpenType data into 1-bit glyphs.
    ///
    /// A pixel is lit when its coverage is at least half.
    /// Each glyph box spans the full advance width, so spaces keep their width.
    pub fn rasterize(bytes: &[u8], px: f32, spacing: Coord) -> Result<Self, FontError> {
        let data =
            FontData::from_bytes(bytes, FontSettings::default()).map_err(FontError::Rasterizer)?;

        let mut font = Self::new(spacing);
        for code in 0x20u8..0x7f {
            let c = code as char;
            if c != ' ' && data.lookup_glyph_index(c) == 0 {
                log::warn!("font has no glyph for {c:?}, skipping");
                continue;
            }

            let (metrics, bitmap) = data.rasterize(c, px);
            let bitmap_width = metrics.width as Coord;
            let left = metrics.xmin.max(0);
            let width = Coord::max(metrics.advance_width.round() as Coord, left + bitmap_width);
            if width > MAX_GLYPH_WIDTH {
                return Err(FontError::GlyphTooWide(width));
            }

            let rows = (0..metrics.height)
                .rev()
                .map(|y| {
                    (0..metrics.width)
                        .filter(|x| bitmap[y * metrics.width + x] >= 0x80)
                        .fold(0u64, |row, x| {
                            row | 1u64 << (width - 1 - (left + x as Coord))
                        })
                })
                .collect();

            let glyph = Glyph::new(width, metrics.height as Coord, 0, metrics.ymin, rows)?;
            font.insert(code, glyph);
        }

        log::info!("rasterized {} glyphs at {px}px", font.len());
        Ok(font)
    }

    pub fn from_file(path: impl AsRef<Path>, px: f32, spacing: Coord) -> eyre::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .wrap_err_with(|| format!("reading font file {}", path.display()))?;
        Self::rasterize(&bytes, px, spacing)
            .wrap_err_with(|| format!("rasterizing font {}", path.display()))
    }
}

/// Index of a font in a [`FontRegistry`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FontHandle(usize);

/// Fonts loaded by the host, by name.
///
/// The host owns this and decides when fonts are loaded;
/// a font is loaded once and afterwards reused through its [`FontHandle`].
#[derive(Debug, Default)]
pub struct FontRegistry {
    fonts: Vec<(String, Font)>,
}
impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `font` under `name`, replacing any font already registered with that name.
    pub fn insert(&mut self, name: impl Into<String>, font: Font) -> FontHandle {
        let name = name.into();
        match self.find(&name) {
            Some(handle) => {
                log::debug!("replacing font {name:?}");
                self.fonts[handle.0].1 = font;
                handle
            }
            None => {
                self.fonts.push((name, font));
                FontHandle(self.fonts.len() - 1)
            }
        }
    }

    pub fn find(&self, name: &str) -> Option<FontHandle> {
        self.fonts
            .iter()
            .position(|(existing, _)| existing == name)
            .map(FontHandle)
    }

    /// Returns the handle of the font registered as `name`, calling `load` only if there is none yet.
    pub fn load_or_insert_with<E>(
        &mut self,
        name: &str,
        load: impl FnOnce() -> Result<Font, E>,
    ) -> Result<FontHandle, E> {
        match self.find(name) {
            Some(handle) => Ok(handle),
            None => Ok(self.insert(name, load()?)),
        }
    }

    pub fn get(&self, handle: FontHandle) -> Result<&Font, FontError> {
        self.fonts
            .get(handle.0)
            .map(|(_, font)| font)
            .ok_or(FontError::UnknownHandle(handle.0))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FontError {
    /// `fontdue` rejected the font data
    Rasterizer(&'static str),
    GlyphTooWide(Coord),
    BadRows { expected: Coord, found: usize },
    UnknownHandle(usize),
}
impl Display for FontError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FontError::Rasterizer(msg) => write!(f, "FontError: {msg}"),
            FontError::GlyphTooWide(width) => write!(
                f,
                "FontError: glyph is {width} pixels wide, at most {MAX_GLYPH_WIDTH} are supported"
            ),
            FontError::BadRows { expected, found } => {
                write!(f, "FontError: expected {expected} bitmap rows, found {found}")
            }
            FontError::UnknownHandle(index) => write!(f, "FontError: no font with handle {index}"),
        }
    }
}
impl std::error::Error for FontError {}

#[rustfmt::skip]
const BUILTIN_3X5: &[(char, [u64; 5])] = &[
    (' ', [0b000, 0b000, 0b000, 0b000, 0b000]),
    ('!', [0b010, 0b010, 0b010, 0b000, 0b010]),
    ('%', [0b101, 0b001, 0b010, 0b100, 0b101]),
    ('\'', [0b010, 0b010, 0b000, 0b000, 0b000]),
    ('(', [0b001, 0b010, 0b010, 0b010, 0b001]),
    (')', [0b100, 0b010, 0b010, 0b010, 0b100]),
    ('+', [0b000, 0b010, 0b111, 0b010, 0b000]),
    (',', [0b000, 0b000, 0b000, 0b010, 0b100]),
    ('-', [0b000, 0b000, 0b111, 0b000, 0b000]),
    ('.', [0b000, 0b000, 0b000, 0b000, 0b010]),
    ('/', [0b001, 0b001, 0b010, 0b100, 0b100]),
    ('0', [0b111, 0b101, 0b101, 0b101, 0b111]),
    ('1', [0b010, 0b110, 0b010, 0b010, 0b111]),
    ('2', [0b111, 0b001, 0b111, 0b100, 0b111]),
    ('3', [0b111, 0b001, 0b111, 0b001, 0b111]),
    ('4', [0b101, 0b101, 0b111, 0b001, 0b001]),
    ('5', [0b111, 0b100, 0b111, 0b001, 0b111]),
    ('6', [0b111, 0b100, 0b111, 0b101, 0b111]),
    ('7', [0b111, 0b001, 0b001, 0b001, 0b001]),
    ('8', [0b111, 0b101, 0b111, 0b101, 0b111]),
    ('9', [0b111, 0b101, 0b111, 0b001, 0b111]),
    (':', [0b000, 0b010, 0b000, 0b010, 0b000]),
    ('=', [0b000, 0b111, 0b000, 0b111, 0b000]),
    ('?', [0b111, 0b001, 0b010, 0b000, 0b010]),
    ('A', [0b010, 0b101, 0b111, 0b101, 0b101]),
    ('B', [0b110, 0b101, 0b110, 0b101, 0b110]),
    ('C', [0b011, 0b100, 0b100, 0b100, 0b011]),
    ('D', [0b110, 0b101, 0b101, 0b101, 0b110]),
    ('E', [0b111, 0b100, 0b110, 0b100, 0b111]),
    ('F', [0b111, 0b100, 0b110, 0b100, 0b100]),
    ('G', [0b011, 0b100, 0b101, 0b101, 0b011]),
    ('H', [0b101, 0b101, 0b111, 0b101, 0b101]),
    ('I', [0b111, 0b010, 0b010, 0b010, 0b111]),
    ('J', [0b001, 0b001, 0b001, 0b101, 0b010]),
    ('K', [0b101, 0b101, 0b110, 0b101, 0b101]),
    ('L', [0b100, 0b100, 0b100, 0b100, 0b111]),
    ('M', [0b101, 0b111, 0b111, 0b101, 0b101]),
    ('N', [0b101, 0b111, 0b111, 0b111, 0b101]),
    ('O', [0b010, 0b101, 0b101, 0b101, 0b010]),
    ('P', [0b110, 0b101, 0b110, 0b100, 0b100]),
    ('Q', [0b010, 0b101, 0b101, 0b111, 0b011]),
    ('R', [0b110, 0b101, 0b110, 0b101, 0b101]),
    ('S', [0b011, 0b100, 0b010, 0b001, 0b110]),
    ('T', [0b111, 0b010, 0b010, 0b010, 0b010]),
    ('U', [0b101, 0b101, 0b101, 0b101, 0b111]),
    ('V', [0b101, 0b101, 0b101, 0b101, 0b010]),
    ('W', [0b101, 0b101, 0b111, 0b111, 0b101]),
    ('X', [0b101, 0b101, 0b010, 0b101, 0b101]),
    ('Y', [0b101, 0b101, 0b010, 0b010, 0b010]),
    ('Z', [0b111, 0b001, 0b010, 0b100, 0b111]),
];
