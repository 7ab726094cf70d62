use super::Color;
use crate::container::ColorEntry;
use crate::raster;
use image::RgbaImage;

/// Longest side of the image sampled when placing markers.
pub const MARKER_SAMPLE_DIM: u32 = 420;

/// Opaque sample pixels are matched in slices of this many.
const MARKER_BATCH: usize = 20_000;

/// A palette color paired with one pixel showing it.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Marker {
    /// The palette color.
    pub rgb: Color,
    /// `(x, y)` of a representative pixel, `None` when nothing matched.
    pub position: Option<(u32, u32)>,
}

impl Marker {
    /// Maps the position into an image displayed at `scale` times its size.
    pub fn to_display(self, scale: f64) -> Marker {
        Marker {
            rgb: self.rgb,
            position: self
                .position
                .map(|(x, y)| ((x as f64 * scale) as u32, (y as f64 * scale) as u32)),
        }
    }
}

/// Finds a representative pixel for each palette entry.
///
/// The image is shrunk with nearest-neighbour sampling to at most
/// [`MARKER_SAMPLE_DIM`]. Opaque pixels are scanned in row order and each one
/// is assigned to its nearest palette color (squared RGB distance, first
/// entry wins ties); the first pixel claiming a color becomes its marker.
/// Scanning stops once every color has a marker. Positions are returned in
/// source image coordinates, one marker per entry in palette order.
pub fn locate_markers(image: &RgbaImage, palette: &[ColorEntry]) -> Vec<Marker> {
    let colors: Vec<Color> = palette.iter().map(|c| c.rgb()).collect();
    let mut positions: Vec<Option<(u32, u32)>> = vec![None; colors.len()];
    if colors.is_empty() || image.width() == 0 || image.height() == 0 {
        return colors
            .into_iter()
            .map(|rgb| Marker {
                rgb,
                position: None,
            })
            .collect();
    }

    let (sample, scale) = raster::downsample_nearest(image, MARKER_SAMPLE_DIM);
    let mut remaining = colors.len();

    let opaque: Vec<(u32, u32, Color)> = sample
        .enumerate_pixels()
        .filter(|(_, _, p)| raster::is_opaque(p))
        .map(|(x, y, p)| (x, y, Color::new(p[0], p[1], p[2])))
        .collect();

    'batches: for batch in opaque.chunks(MARKER_BATCH) {
        for &(x, y, pixel) in batch {
            let nearest = nearest_color(&colors, pixel);
            if positions[nearest].is_none() {
                positions[nearest] = Some((x, y));
                remaining -= 1;
                if remaining == 0 {
                    break 'batches;
                }
            }
        }
    }

    let (max_x, max_y) = (image.width() - 1, image.height() - 1);
    colors
        .into_iter()
        .zip(positions)
        .map(|(rgb, position)| Marker {
            rgb,
            position: position.map(|(x, y)| {
                (
                    ((x as f64 / scale) as u32).min(max_x),
                    ((y as f64 / scale) as u32).min(max_y),
                )
            }),
        })
        .collect()
}

fn nearest_color(colors: &[Color], pixel: Color) -> usize {
    let mut best = 0;
    let mut best_dist = u32::MAX;
    for (index, color) in colors.iter().enumerate() {
        let dist = color_distance(color, &pixel);
        if dist < best_dist {
            best_dist = dist;
            best = index;
        }
    }
    best
}

#[inline]
fn color_distance(c1: &Color, c2: &Color) -> u32 {
    let dr = c1.r.abs_diff(c2.r) as u32;
    let dg = c1.g.abs_diff(c2.g) as u32;
    let db = c1.b.abs_diff(c2.b) as u32;
    dr * dr + dg * dg + db * db
}
