use super::FrameBuffer;
use crate::graphics::Color;
use crate::layout::{Address, Coord};

// Shapes overwrite pixels unconditionally; change tracking is left to `FrameBuffer::diff`.
impl FrameBuffer {
    pub fn draw_dot(&mut self, at: Address, color: Color) {
        self.set_at(at, color);
    }

    /// Draws a horizontal or vertical line, both ends included.
    ///
    /// Diagonal lines aren't supported; returns `false` and draws nothing for those.
    pub fn draw_line(&mut self, from: Address, to: Address, color: Color) -> bool {
        if from.row == to.row {
            if let Some((start, end)) = self.size().clamp_cols(from.col, to.col) {
                (start..=end).for_each(|col| self.set(from.row, col, color));
            }
            true
        } else if from.col == to.col {
            if let Some((start, end)) = self.size().clamp_rows(from.row, to.row) {
                (start..=end).for_each(|row| self.set(row, from.col, color));
            }
            true
        } else {
            log::trace!("ignoring diagonal line {from:?} -> {to:?}");
            false
        }
    }

    /// Fills the rectangle between two opposite corners, given in any order.
    pub fn draw_box(&mut self, corner: Address, opposite: Address, color: Color) {
        let size = self.size();
        let (Some((top, bottom)), Some((left, right))) = (
            size.clamp_rows(corner.row, opposite.row),
            size.clamp_cols(corner.col, opposite.col),
        ) else {
            return;
        };

        for row in top..=bottom {
            for col in left..=right {
                self.set(row, col, color);
            }
        }
    }

    /// Fills every pixel within Manhattan distance `(width - 1) / 2` of `center`.
    ///
    /// `width` must be odd and positive; returns `false` and draws nothing otherwise.
    pub fn draw_diamond(&mut self, center: Address, width: Coord, color: Color) -> bool {
        if width < 1 || width % 2 == 0 {
            log::trace!("ignoring diamond of width {width}");
            return false;
        }
        let radius = (width - 1) / 2;

        let size = self.size();
        let (Some((top, bottom)), Some((left, right))) = (
            size.clamp_rows(
                center.row.saturating_sub(radius),
                center.row.saturating_add(radius),
            ),
            size.clamp_cols(
                center.col.saturating_sub(radius),
                center.col.saturating_add(radius),
            ),
        ) else {
            return true;
        };

        for row in top..=bottom {
            for col in left..=right {
                let at = Address::new(row, col);
                if at.manhattan(center) <= radius {
                    self.set_at(at, color);
                }
            }
        }
        true
    }
}
