use super::Error;
use crate::container::ColorEntry;
use crate::raster;
use crate::settings::Thresholds;
use crate::stats::{UniqueStats, color_counts};
use image::RgbaImage;
use log::{debug, info};

/// Per-call switches of [`maximal_palette`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct MaximalOptions {
    /// Count every pixel at full resolution even if the sample suggests the
    /// image is too diverse for it.
    pub force_full_scan: bool,
    /// Fail with [`Error::TooManyColors`] when more distinct colors than
    /// this are found.
    pub max_unique_error: Option<usize>,
}

/// Lists every distinct opaque color of `image` with its pixel count.
///
/// An exact full-resolution count is only made when it is forced, or when
/// the image is small enough (`full_scan_pixel_limit`) and the downsampled
/// sample looks color-poor (`unique_threshold` or `unique_ratio_threshold`).
/// Otherwise the colors of the sample are returned as an approximation.
///
/// The `max_unique_error` cap is applied on both paths. Entries are sorted
/// by descending count.
pub fn maximal_palette(
    image: &RgbaImage,
    thresholds: &Thresholds,
    options: MaximalOptions,
) -> Result<Vec<ColorEntry>, Error> {
    let total_pixels = raster::count_opaque(image);
    if total_pixels == 0 {
        return Ok(Vec::new());
    }

    let sample = raster::downsample_smooth(image, thresholds.max_sample_dim);
    let sample_colors = color_counts(raster::opaque_colors(&sample));
    let stats = UniqueStats {
        sample_unique: sample_colors.len(),
        sample_pixels: sample_colors.iter().map(|(_, n)| *n as usize).sum(),
        total_pixels,
    };
    if stats.sample_pixels == 0 {
        return Ok(Vec::new());
    }

    let color_poor = stats.sample_unique <= thresholds.unique_threshold
        || stats.sample_unique_ratio() <= thresholds.unique_ratio_threshold;
    let full_scan = options.force_full_scan
        || (color_poor && total_pixels <= thresholds.full_scan_pixel_limit);
    debug!(
        "maximal palette: {stats:?}, ratio {:.4}, full scan: {full_scan}",
        stats.sample_unique_ratio()
    );

    let colors = if full_scan {
        color_counts(raster::opaque_colors(image))
    } else {
        sample_colors
    };

    if let Some(limit) = options.max_unique_error {
        if colors.len() > limit {
            return Err(Error::TooManyColors {
                found: colors.len(),
                limit,
            });
        }
    }

    info!(
        "maximal palette: {} colors ({})",
        colors.len(),
        if full_scan { "exact" } else { "sampled" }
    );
    Ok(colors
        .into_iter()
        .map(|(color, count)| ColorEntry::new(color, count))
        .collect())
}
