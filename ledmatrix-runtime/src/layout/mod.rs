use std::fmt::Display;

/// Signed so that shapes can be positioned partially (or entirely) off the panel;
/// anything outside the buffer is clipped when drawn.
pub type Coord = i32;

/// Address of a pixel, from the top left of the panel.
/// Row 0 is the top row, column 0 the left-most column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    pub row: Coord,
    pub col: Coord,
}
impl Address {
    pub const fn new(row: Coord, col: Coord) -> Self {
        Self { row, col }
    }

    /// Manhattan distance, `|Δrow| + |Δcol|`, saturating at `Coord::MAX`
    pub fn manhattan(&self, other: Address) -> Coord {
        let distance = self.row.abs_diff(other.row).saturating_add(self.col.abs_diff(other.col));
        Coord::try_from(distance).unwrap_or(Coord::MAX)
    }
}
impl From<(Coord, Coord)> for Address {
    fn from((row, col): (Coord, Coord)) -> Self {
        Self { row, col }
    }
}

/// Dimensions of a frame buffer, in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    pub rows: Coord,
    pub cols: Coord,
}
impl Size {
    pub const fn new(rows: Coord, cols: Coord) -> Self {
        Self { rows, cols }
    }

    pub fn area(&self) -> usize {
        self.rows.max(0) as usize * self.cols.max(0) as usize
    }

    pub fn contains(&self, address: Address) -> bool {
        (0..self.rows).contains(&address.row) && (0..self.cols).contains(&address.col)
    }

    /// Clamps a (possibly reversed) inclusive range of rows to `[0, rows)`.
    /// `None` if nothing of it lies on the panel.
    pub fn clamp_rows(&self, a: Coord, b: Coord) -> Option<(Coord, Coord)> {
        clamp_span(a, b, self.rows)
    }

    /// Column counterpart of [`Size::clamp_rows`]
    pub fn clamp_cols(&self, a: Coord, b: Coord) -> Option<(Coord, Coord)> {
        clamp_span(a, b, self.cols)
    }
}
impl Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

fn clamp_span(a: Coord, b: Coord, len: Coord) -> Option<(Coord, Coord)> {
    let low = a.min(b).max(0);
    let high = a.max(b).min(len - 1);
    (low <= high).then_some((low, high))
}
