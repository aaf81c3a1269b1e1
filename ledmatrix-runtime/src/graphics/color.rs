use std::{fmt::Display, str::FromStr};

use palette::{FromColor, Hsv, Srgb};

/// An 8-bit-per-channel color, as sent to the panel.
///
/// The fallible constructors come in two flavors:
/// the `try_` / [`FromStr`] versions report what went wrong,
/// while [`Color::from_rgb`] and [`Color::from_hex`] are best-effort and fall back to [`Color::BLACK`],
/// so that one malformed color never aborts a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Color(Srgb<u8>);

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(Srgb::new(r, g, b))
    }

    pub fn try_from_rgb(r: i32, g: i32, b: i32) -> Result<Self, ColorError> {
        let channel = |value: i32| u8::try_from(value).map_err(|_| ColorError::OutOfRange(value));
        Ok(Self::rgb(channel(r)?, channel(g)?, channel(b)?))
    }

    /// Any channel outside `0..=255` yields black.
    pub fn from_rgb(r: i32, g: i32, b: i32) -> Self {
        Self::try_from_rgb(r, g, b).unwrap_or_else(|err| {
            log::warn!("{err}; using black");
            Self::BLACK
        })
    }

    /// Parses `rrggbb`, `#rrggbb` or `0xrrggbb` (any case).
    /// Anything else yields black.
    pub fn from_hex(hex: &str) -> Self {
        hex.parse().unwrap_or_else(|err| {
            log::warn!("{err}; using black");
            Self::BLACK
        })
    }

    /// Fully saturated color at the given hue, in degrees
    pub fn from_hue(degrees: f32) -> Self {
        let hsv: Hsv = Hsv::new(degrees, 1.0, 1.0);
        let rgb: Srgb = Srgb::from_color(hsv);
        Self(rgb.into_format())
    }

    /// Lower-case, zero-padded, no prefix: `ff8000`
    pub fn to_hex(&self) -> String {
        format!("{:02x}{:02x}{:02x}", self.r(), self.g(), self.b())
    }

    /// `0x00RRGGBB`, the layout expected by `softbuffer`
    pub fn to_packed(&self) -> u32 {
        (self.r() as u32) << 16 | (self.g() as u32) << 8 | self.b() as u32
    }

    pub fn r(&self) -> u8 {
        self.0.red
    }
    pub fn g(&self) -> u8 {
        self.0.green
    }
    pub fn b(&self) -> u8 {
        self.0.blue
    }

    pub fn is_black(&self) -> bool {
        *self == Self::BLACK
    }
}

impl From<Srgb<u8>> for Color {
    fn from(value: Srgb<u8>) -> Self {
        Self(value)
    }
}
impl From<Color> for Srgb<u8> {
    fn from(value: Color) -> Self {
        value.0
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix('#'))
            .unwrap_or(s);

        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::BadHex(s.to_owned()));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| ColorError::BadHex(s.to_owned()))
        };
        Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColorError {
    /// Not a 6-digit hex code
    BadHex(String),
    OutOfRange(i32),
}
impl Display for ColorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorError::BadHex(hex) => write!(f, "invalid hex color {hex:?}"),
            ColorError::OutOfRange(value) => {
                write!(f, "color channel {value} outside of 0..=255")
            }
        }
    }
}
impl std::error::Error for ColorError {}
