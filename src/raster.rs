use super::{Color, Error};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use std::borrow::Cow;
use std::str::FromStr;

/// Represent a color format of raw image data.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ColorFormat {
    /// Red, Green, Blue color format.
    Rgb,
    /// Red, Green, Blue, Alpha color format.
    Rgba,
    /// Alpha, Red, Green, Blue color format.
    Argb,
    /// Blue, Green, Red color format.
    Bgr,
    /// Blue, Green, Red, Alpha color format.
    Bgra,
}

impl ColorFormat {
    /// Returns the number of channels in a color format.
    fn channels(&self) -> usize {
        match self {
            ColorFormat::Rgb | ColorFormat::Bgr => 3,
            ColorFormat::Rgba | ColorFormat::Argb | ColorFormat::Bgra => 4,
        }
    }

    /// Reads one pixel as `[r, g, b, a]`. Formats without alpha are opaque.
    fn color_parts(&self, pixel: &[u8]) -> [u8; 4] {
        match self {
            ColorFormat::Rgb => [pixel[0], pixel[1], pixel[2], 255],
            ColorFormat::Rgba => [pixel[0], pixel[1], pixel[2], pixel[3]],
            ColorFormat::Argb => [pixel[1], pixel[2], pixel[3], pixel[0]],
            ColorFormat::Bgr => [pixel[2], pixel[1], pixel[0], 255],
            ColorFormat::Bgra => [pixel[2], pixel[1], pixel[0], pixel[3]],
        }
    }
}

/// Represents an error for invalid input when parsing a color format
#[derive(Debug, thiserror::Error)]
#[error("invalid color format")]
pub struct ColorFormatParseError;

impl FromStr for ColorFormat {
    type Err = ColorFormatParseError;

    fn from_str(s: &str) -> Result<ColorFormat, Self::Err> {
        const VARIANTS: &[(&str, ColorFormat)] = &[
            ("rgb", ColorFormat::Rgb),
            ("rgba", ColorFormat::Rgba),
            ("argb", ColorFormat::Argb),
            ("bgr", ColorFormat::Bgr),
            ("bgra", ColorFormat::Bgra),
        ];

        VARIANTS
            .iter()
            .find(|(name, _)| s.eq_ignore_ascii_case(name))
            .map(|(_, fmt)| *fmt)
            .ok_or(ColorFormatParseError)
    }
}

/// Builds an RGBA raster out of raw interleaved pixel data.
///
/// * `pixels` - A raw image data, `width * height` pixels long.
/// * `color_format` - Channel layout of `pixels`.
pub fn rgba_from_raw(
    pixels: &[u8],
    color_format: ColorFormat,
    width: u32,
    height: u32,
) -> Result<RgbaImage, Error> {
    let channels = color_format.channels();
    let expected = width as usize * height as usize * channels;
    if pixels.len() != expected {
        return Err(Error::InvalidArgument(format!(
            "expected {expected} bytes for a {width}x{height} {color_format:?} image, got {}",
            pixels.len()
        )));
    }

    let mut raw = Vec::with_capacity(width as usize * height as usize * 4);
    for pixel in pixels.chunks_exact(channels) {
        raw.extend_from_slice(&color_format.color_parts(pixel));
    }

    RgbaImage::from_raw(width, height, raw)
        .ok_or_else(|| Error::InvalidArgument("image dimensions overflow".to_owned()))
}

/// Returns the size an image must be shrunk to so that its longest side
/// equals `max_dim`, or `None` if it already fits.
pub(crate) fn fit_within(width: u32, height: u32, max_dim: u32) -> Option<(u32, u32)> {
    let longest = width.max(height);
    if longest <= max_dim {
        return None;
    }
    let scale = max_dim as f64 / longest as f64;
    Some((
        ((width as f64 * scale) as u32).max(1),
        ((height as f64 * scale) as u32).max(1),
    ))
}

/// Area-correct downsample for statistics and quantization.
pub(crate) fn downsample_smooth(image: &RgbaImage, max_dim: u32) -> Cow<'_, RgbaImage> {
    match fit_within(image.width(), image.height(), max_dim) {
        Some((w, h)) => Cow::Owned(imageops::resize(image, w, h, FilterType::Lanczos3)),
        None => Cow::Borrowed(image),
    }
}

/// Nearest-neighbour downsample, keeps every sampled color exact.
///
/// Also returns the `sample / source` scale factor.
pub(crate) fn downsample_nearest(image: &RgbaImage, max_dim: u32) -> (Cow<'_, RgbaImage>, f64) {
    let longest = image.width().max(image.height());
    match fit_within(image.width(), image.height(), max_dim) {
        Some((w, h)) => (
            Cow::Owned(imageops::resize(image, w, h, FilterType::Nearest)),
            max_dim as f64 / longest as f64,
        ),
        None => (Cow::Borrowed(image), 1.0),
    }
}

#[inline]
pub(crate) fn is_opaque(pixel: &Rgba<u8>) -> bool {
    pixel[3] > 0
}

/// Iterates the color of every pixel with a non-zero alpha.
pub(crate) fn opaque_colors(image: &RgbaImage) -> impl Iterator<Item = Color> + '_ {
    image
        .pixels()
        .filter(|p| is_opaque(p))
        .map(|p| Color::new(p[0], p[1], p[2]))
}

pub(crate) fn count_opaque(image: &RgbaImage) -> usize {
    image.pixels().filter(|p| is_opaque(p)).count()
}

/// Packs a color into a `0x00RRGGBB` key for cheap hashing and sorting.
#[inline]
pub(crate) fn pack(color: Color) -> u32 {
    (color.r as u32) << 16 | (color.g as u32) << 8 | color.b as u32
}

#[inline]
pub(crate) fn unpack(key: u32) -> Color {
    Color::new((key >> 16) as u8, (key >> 8) as u8, key as u8)
}
