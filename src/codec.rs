//! Conversions between colors and their `#RRGGBB` text form.

use super::Color;
use thiserror::Error;

/// Luminance above which black text is more readable than white.
const LABEL_LUMINANCE_THRESHOLD: f64 = 0.5;

/// Represents an error for a string that is not a `#RRGGBB` color.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid hex color: {0:?}")]
pub struct HexParseError(pub String);

/// Formats a color as an uppercase, zero-padded `#RRGGBB` string.
pub fn to_hex(color: Color) -> String {
    format!("#{:02X}{:02X}{:02X}", color.r, color.g, color.b)
}

/// Parses a `#RRGGBB` string.
///
/// Surrounding whitespace and leading `#` characters are ignored. Only the
/// first six digits are read, anything after them is ignored.
pub fn from_hex(s: &str) -> Result<Color, HexParseError> {
    let digits = s.trim().trim_start_matches('#').as_bytes();
    if digits.len() < 6 {
        return Err(HexParseError(s.to_owned()));
    }

    let mut channels = [0u8; 3];
    for (channel, pair) in channels.iter_mut().zip(digits.chunks_exact(2)) {
        let high = hex_value(pair[0]).ok_or_else(|| HexParseError(s.to_owned()))?;
        let low = hex_value(pair[1]).ok_or_else(|| HexParseError(s.to_owned()))?;
        *channel = (high << 4) | low;
    }

    Ok(Color::new(channels[0], channels[1], channels[2]))
}

fn hex_value(digit: u8) -> Option<u8> {
    (digit as char).to_digit(16).map(|v| v as u8)
}

/// Returns `0.2126·R + 0.7152·G + 0.0722·B` over channels scaled to `[0, 1]`.
///
/// No gamma linearization is applied; the value is only used to pick a
/// readable label color.
pub fn relative_luminance(color: Color) -> f64 {
    let r = color.r as f64 / 255.0;
    let g = color.g as f64 / 255.0;
    let b = color.b as f64 / 255.0;
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

/// Picks black or white, whichever reads better on top of `background`.
pub fn label_color(background: Color) -> Color {
    if relative_luminance(background) > LABEL_LUMINANCE_THRESHOLD {
        Color::new(0, 0, 0)
    } else {
        Color::new(255, 255, 255)
    }
}
