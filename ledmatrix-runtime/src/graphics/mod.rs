pub mod color;
pub mod font;
pub mod text;

pub use color::{Color, ColorError};
pub use font::{Font, FontError, FontHandle, FontRegistry, Glyph};
pub use text::{Align, TextOptions};
