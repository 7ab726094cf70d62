use super::Color;
use crate::raster::{self, pack, unpack};
use image::RgbaImage;
use std::collections::{HashMap, HashSet};

/// Unique-color statistics measured on a (possibly downsampled) sample.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct UniqueStats {
    /// Distinct opaque colors in the sample.
    pub sample_unique: usize,
    /// Opaque pixels in the sample.
    pub sample_pixels: usize,
    /// Opaque pixels in the full-resolution image.
    pub total_pixels: usize,
}

impl UniqueStats {
    /// Extrapolates the number of distinct colors in the full image.
    ///
    /// Scales the sample's unique count by `total / sample` pixels and caps it
    /// at the total pixel count, since no image has more colors than pixels.
    pub fn estimated_total_unique(&self) -> usize {
        if self.sample_pixels == 0 {
            return self.sample_unique;
        }
        let scaled =
            self.sample_unique as f64 * (self.total_pixels as f64 / self.sample_pixels as f64);
        (scaled as usize).min(self.total_pixels)
    }

    /// Share of distinct colors among the sampled pixels.
    pub fn sample_unique_ratio(&self) -> f64 {
        if self.sample_pixels == 0 {
            return 0.0;
        }
        self.sample_unique as f64 / self.sample_pixels as f64
    }
}

/// Cheaply estimates how many distinct colors an image holds.
///
/// Fully transparent pixels are ignored. When the longest side exceeds
/// `max_sample_dim` the image is downsampled first, so the cost is bounded
/// regardless of the input size; `total_pixels` is always exact.
pub fn estimate_unique_stats(image: &RgbaImage, max_sample_dim: u32) -> UniqueStats {
    let total_pixels = raster::count_opaque(image);
    if total_pixels == 0 {
        return UniqueStats::default();
    }

    let sample = raster::downsample_smooth(image, max_sample_dim);
    let mut seen = HashSet::new();
    let mut sample_pixels = 0;
    for color in raster::opaque_colors(&sample) {
        seen.insert(pack(color));
        sample_pixels += 1;
    }

    UniqueStats {
        sample_unique: seen.len(),
        sample_pixels,
        total_pixels,
    }
}

/// Counts every distinct color, most frequent first.
///
/// Equal counts are ordered by ascending `0xRRGGBB` value so the output is
/// deterministic.
pub(crate) fn color_counts(colors: impl Iterator<Item = Color>) -> Vec<(Color, u64)> {
    let mut counts: HashMap<u32, u64> = HashMap::new();
    for color in colors {
        *counts.entry(pack(color)).or_insert(0) += 1;
    }

    let mut counts: Vec<(u32, u64)> = counts.into_iter().collect();
    counts.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    counts
        .into_iter()
        .map(|(key, count)| (unpack(key), count))
        .collect()
}
