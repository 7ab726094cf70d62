//! Text and image renditions of a palette.

use super::Error;
use crate::codec::label_color;
use crate::container::Palette;
use image::{Rgba, RgbaImage};
use log::info;
use std::fs;
use std::path::Path;

const GRID_COLUMNS: u32 = 6;
const CELL_WIDTH: u32 = 200;
const CELL_HEIGHT: u32 = 120;
const SWATCH_OFFSET: u32 = 10;
const SWATCH_WIDTH: u32 = 180;
const SWATCH_HEIGHT: u32 = 90;
const LABEL_OFFSET: u32 = 6;
const GLYPH_SCALE: u32 = 2;
const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: usize = 7;

/// Enabled hex values, one per line, in palette order.
pub fn hex_text(palette: &Palette) -> String {
    palette.hex_list(true).join("\n")
}

/// Writes [`hex_text`] to `path` and returns the number of colors written.
pub fn save_hex_text(palette: &Palette, path: &Path) -> Result<usize, Error> {
    let hex_list = palette.hex_list(true);
    fs::write(path, hex_list.join("\n"))?;
    info!("saved {} colors to {}", hex_list.len(), path.display());
    Ok(hex_list.len())
}

/// Renders every entry as a labelled swatch on a white grid.
///
/// Swatches are laid out six per row. Each label is drawn in black or white
/// depending on the swatch luminance.
pub fn swatch_grid(palette: &Palette) -> Result<RgbaImage, Error> {
    if palette.is_empty() {
        return Err(Error::InvalidArgument("No colors to export".to_owned()));
    }

    let rows = (palette.len() as u32).div_ceil(GRID_COLUMNS);
    let mut out = RgbaImage::from_pixel(
        GRID_COLUMNS * CELL_WIDTH,
        rows * CELL_HEIGHT,
        Rgba([255, 255, 255, 255]),
    );

    for (i, entry) in palette.colors().iter().enumerate() {
        let i = i as u32;
        let x = (i % GRID_COLUMNS) * CELL_WIDTH + SWATCH_OFFSET;
        let y = (i / GRID_COLUMNS) * CELL_HEIGHT + SWATCH_OFFSET;
        let rgb = entry.rgb();

        fill_rect(
            &mut out,
            x,
            y,
            SWATCH_WIDTH,
            SWATCH_HEIGHT,
            Rgba([rgb.r, rgb.g, rgb.b, 255]),
        );
        let ink = label_color(rgb);
        draw_text(
            &mut out,
            x + LABEL_OFFSET,
            y + LABEL_OFFSET,
            entry.hex(),
            Rgba([ink.r, ink.g, ink.b, 255]),
        );
    }

    Ok(out)
}

/// Renders [`swatch_grid`] and saves it, the format following the extension.
pub fn save_swatch_grid(palette: &Palette, path: &Path) -> Result<(), Error> {
    swatch_grid(palette)?.save(path)?;
    info!("palette image saved to {}", path.display());
    Ok(())
}

fn fill_rect(image: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
    for py in y..(y + h).min(image.height()) {
        for px in x..(x + w).min(image.width()) {
            image.put_pixel(px, py, color);
        }
    }
}

fn draw_text(image: &mut RgbaImage, x: u32, y: u32, text: &str, color: Rgba<u8>) {
    let advance = (GLYPH_WIDTH + 1) * GLYPH_SCALE;
    for (n, ch) in text.chars().enumerate() {
        let Some(rows) = glyph(ch) else {
            continue;
        };
        let gx = x + n as u32 * advance;
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) != 0 {
                    fill_rect(
                        image,
                        gx + col * GLYPH_SCALE,
                        y + row as u32 * GLYPH_SCALE,
                        GLYPH_SCALE,
                        GLYPH_SCALE,
                        color,
                    );
                }
            }
        }
    }
}

/// 5x7 bitmaps of the characters a hex label can contain.
fn glyph(ch: char) -> Option<[u8; GLYPH_HEIGHT]> {
    let rows = match ch {
        '#' => [0x0A, 0x0A, 0x1F, 0x0A, 0x1F, 0x0A, 0x0A],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        _ => return None,
    };
    Some(rows)
}
