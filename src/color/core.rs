use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ColorSpecError;

/// Channel sum at or above which black text reads better than white.
pub const CONTRAST_THRESHOLD: u16 = 381;

/// Amount added to every channel of a selected rectangle.
pub const HIGHLIGHT_SHIFT: u8 = 50;

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
    /// Mid grey used for runs no known category matches.
    pub const NEUTRAL: Self = Self::new(127, 127, 127);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub fn from_channels([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (leading `#` optional).
    pub fn from_hex(text: &str) -> Result<Self, ColorSpecError> {
        let invalid = || ColorSpecError::InvalidColor(text.to_string());
        let trimmed = text.trim();
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Parse a parenthesised tuple such as `(255, 0, 0)`.
    pub fn from_tuple(text: &str) -> Result<Self, ColorSpecError> {
        let invalid = || ColorSpecError::InvalidColor(text.to_string());
        let inner = text
            .trim()
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(invalid)?;

        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        let [r, g, b] = parts[..] else {
            return Err(invalid());
        };
        let channel = |part: &str| part.parse::<u8>().map_err(|_| invalid());
        Ok(Self::new(channel(r)?, channel(g)?, channel(b)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Selection highlight: each channel shifted up by 50, wrapping modulo 256.
    ///
    /// High channels wrap to dark values (250 becomes 44); this matches the
    /// output hosts already compare against.
    pub fn highlight(self) -> Self {
        Self::from_channels(self.channels().map(|c| c.wrapping_add(HIGHLIGHT_SHIFT)))
    }

    pub fn channel_sum(self) -> u16 {
        u16::from(self.r) + u16::from(self.g) + u16::from(self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Text colour drawn on top of a filled rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextColor {
    Black,
    White,
}

impl TextColor {
    pub fn rgb(self) -> Rgb {
        match self {
            Self::Black => Rgb::BLACK,
            Self::White => Rgb::WHITE,
        }
    }
}

/// Pick black or white text for a background by its channel sum.
pub fn contrast_text_color(background: Rgb) -> TextColor {
    if background.channel_sum() >= CONTRAST_THRESHOLD {
        TextColor::Black
    } else {
        TextColor::White
    }
}
