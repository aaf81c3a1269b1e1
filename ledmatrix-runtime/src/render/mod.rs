/// Dots, lines, boxes and diamonds, clipped to the buffer.
pub mod shapes;

/// Bitmap text layout and plotting.
pub mod text;

use std::fmt::Display;

use crate::graphics::Color;
use crate::layout::{Address, Coord, Size};

/// One cell of a [`FrameBuffer`].
/// Its address is fixed when the buffer is created; only the color changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pixel {
    address: Address,
    color: Color,
}
impl Pixel {
    pub fn new(address: Address, color: Color) -> Self {
        Self { address, color }
    }

    /// Row-major: `index = row * cols + col`
    fn from_index(index: usize, cols: Coord) -> Self {
        let cols = cols as usize;
        Self {
            address: Address::new((index / cols) as Coord, (index % cols) as Coord),
            color: Color::BLACK,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }
    pub fn row(&self) -> Coord {
        self.address.row
    }
    pub fn col(&self) -> Coord {
        self.address.col
    }
    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

/// The "virtual matrix": an in-memory copy of the panel that drawing happens in.
///
/// Dimensions are fixed for the buffer's lifetime.
/// Addresses outside of it are never an error, lookups just come back empty and writes do nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    size: Size,
    pixels: Vec<Pixel>,
}
impl FrameBuffer {
    /// Every pixel starts out black. Negative dimensions are treated as zero.
    pub fn new(rows: Coord, cols: Coord) -> Self {
        let size = Size::new(rows.max(0), cols.max(0));
        Self {
            pixels: (0..size.area())
                .map(|index| Pixel::from_index(index, size.cols))
                .collect(),
            size,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }
    pub fn rows(&self) -> Coord {
        self.size.rows
    }
    pub fn cols(&self) -> Coord {
        self.size.cols
    }

    /// Pixels in row-major order
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    #[inline]
    fn index(&self, address: Address) -> Option<usize> {
        self.size
            .contains(address)
            .then(|| (address.row * self.size.cols + address.col) as usize)
    }

    pub fn pixel(&self, address: Address) -> Option<&Pixel> {
        self.index(address).map(|index| &self.pixels[index])
    }

    pub fn pixel_at(&self, row: Coord, col: Coord) -> Option<&Pixel> {
        self.pixel(Address::new(row, col))
    }

    /// Color at `address`, if it is on the buffer
    pub fn color(&self, address: Address) -> Option<Color> {
        self.pixel(address).map(Pixel::color)
    }

    pub(crate) fn set_at(&mut self, address: Address, color: Color) {
        if let Some(index) = self.index(address) {
            self.pixels[index].set_color(color);
        }
    }

    /// Does nothing when `(row, col)` is off the buffer.
    pub fn set(&mut self, row: Coord, col: Coord, color: Color) {
        self.set_at(Address::new(row, col), color)
    }

    /// Writes every entry of `changes` to the pixel at the same address.
    /// Entries that don't fit in this buffer are skipped; returns how many were written.
    pub fn apply(&mut self, changes: &ChangeSet) -> usize {
        let mut applied = 0;
        for pixel in changes {
            match self.index(pixel.address) {
                Some(index) => {
                    self.pixels[index].set_color(pixel.color);
                    applied += 1;
                }
                None => log::trace!("skipping change at {:?}, outside {}", pixel.address, self.size),
            }
        }

        if applied < changes.len() {
            log::warn!(
                "skipped {} of {} changes outside the {} buffer",
                changes.len() - applied,
                changes.len(),
                self.size
            );
        }
        applied
    }

    /// Sets every pixel to black
    pub fn clear(&mut self) {
        self.pixels
            .iter_mut()
            .for_each(|pixel| pixel.set_color(Color::BLACK));
    }

    /// The pixels of `self` whose color differs from `cache`, in row-major order,
    /// carrying the colors from `self`.
    ///
    /// This is directional: applying the result to `cache` makes it match `self`.
    pub fn diff(&self, cache: &FrameBuffer) -> Result<ChangeSet, DimensionMismatch> {
        if self.size != cache.size {
            log::warn!("can't diff a {} buffer against a {} one", self.size, cache.size);
            return Err(DimensionMismatch {
                expected: self.size,
                found: cache.size,
            });
        }

        Ok(self
            .pixels
            .iter()
            .zip(&cache.pixels)
            .filter(|(new, old)| new.color != old.color)
            .map(|(new, _)| *new)
            .collect())
    }

    /// One string per row, one character per column: `-` for black, `#` for anything else.
    /// A buffer without columns still has its rows, as empty strings.
    pub fn render_text_rows(&self) -> Vec<String> {
        let cols = self.size.cols as usize;
        (0..self.size.rows as usize)
            .map(|row| {
                self.pixels[row * cols..(row + 1) * cols]
                    .iter()
                    .map(|pixel| if pixel.color.is_black() { '-' } else { '#' })
                    .collect()
            })
            .collect()
    }
}
impl Display for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.render_text_rows() {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

/// The pixels that changed between two frames, with their new colors.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pixels: Vec<Pixel>,
}
impl ChangeSet {
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pixel> {
        self.pixels.iter()
    }
}
impl FromIterator<Pixel> for ChangeSet {
    fn from_iter<T: IntoIterator<Item = Pixel>>(iter: T) -> Self {
        Self {
            pixels: iter.into_iter().collect(),
        }
    }
}
impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a Pixel;
    type IntoIter = std::slice::Iter<'a, Pixel>;

    fn into_iter(self) -> Self::IntoIter {
        self.pixels.iter()
    }
}

/// Returned when diffing buffers of different sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionMismatch {
    pub expected: Size,
    pub found: Size,
}
impl Display for DimensionMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "frame buffer is {}, expected {}",
            self.found, self.expected
        )
    }
}
impl std::error::Error for DimensionMismatch {}

/// Anything that can be stamped onto a frame buffer at a given position.
/// Out-of-bounds parts are clipped.
pub trait Drawable {
    fn draw_at(&self, buffer: &mut FrameBuffer, position: Address);
}
