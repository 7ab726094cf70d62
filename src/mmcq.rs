//! Modified median cut quantization.
//!
//! The distinct opaque colors of the image, weighted by their pixel counts,
//! start in a single box. The box is split recursively along its widest
//! channel near the population median: first by pixel count only, then by
//! `count * volume` so large sparse regions also get a representative.
//! Each final box contributes the exact mean of the pixels it holds, so an
//! image with at most `max_colors` distinct colors keeps every one of them.

use super::Color;
use crate::container::ColorEntry;
use crate::raster::{self, pack, unpack};
use crate::stats;
use image::RgbaImage;
use log::debug;
use std::cmp;
use std::collections::HashMap;

const FRACTION_BY_POPULATION: f64 = 0.75;

/// Reduces the opaque pixels of `image` to at most `max_colors` colors.
///
/// Images whose longest side exceeds `max_dim` are resampled down first;
/// counts then refer to the resampled pixels. Entries are sorted by
/// descending count. Returns an empty list when `max_colors` is zero or the
/// image has no opaque pixel.
pub fn quantized_palette(image: &RgbaImage, max_colors: usize, max_dim: u32) -> Vec<ColorEntry> {
    if max_colors == 0 {
        return Vec::new();
    }

    let working = raster::downsample_smooth(image, max_dim);
    let entries = stats::color_counts(raster::opaque_colors(&working));
    if entries.is_empty() {
        return Vec::new();
    }

    let distinct = entries.len();
    let boxes = quantize(VBox::new(entries), max_colors);
    debug!(
        "median cut: {} boxes from {} distinct colors for {} requested",
        boxes.len(),
        distinct,
        max_colors
    );

    // Two boxes may average to the same color.
    let mut merged: HashMap<u32, u64> = HashMap::with_capacity(boxes.len());
    for vbox in &boxes {
        *merged.entry(pack(vbox.average)).or_insert(0) += vbox.count;
    }

    let mut colors: Vec<(u32, u64)> = merged.into_iter().collect();
    colors.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    colors
        .into_iter()
        .map(|(key, count)| ColorEntry::new(unpack(key), count))
        .collect()
}

#[derive(Clone, Copy)]
enum ColorChannel {
    Red,
    Green,
    Blue,
}

impl ColorChannel {
    fn of(self, color: Color) -> u8 {
        match self {
            ColorChannel::Red => color.r,
            ColorChannel::Green => color.g,
            ColorChannel::Blue => color.b,
        }
    }
}

/// A box of distinct colors, each with its pixel count.
#[derive(Debug)]
struct VBox {
    entries: Vec<(Color, u64)>,
    r_min: u8,
    r_max: u8,
    g_min: u8,
    g_max: u8,
    b_min: u8,
    b_max: u8,
    average: Color,
    volume: u64,
    count: u64,
}

impl VBox {
    /// Wraps a non-empty set of distinct colors.
    fn new(entries: Vec<(Color, u64)>) -> VBox {
        let mut vbox = VBox {
            entries,
            r_min: u8::MAX,
            r_max: u8::MIN,
            g_min: u8::MAX,
            g_max: u8::MIN,
            b_min: u8::MAX,
            b_max: u8::MIN,
            average: Color::new(0, 0, 0),
            volume: 0,
            count: 0,
        };
        vbox.recalc();
        vbox
    }

    /// Shrinks the bounds to the held colors and refreshes count, volume
    /// and average.
    fn recalc(&mut self) {
        let mut count = 0u64;
        let mut sum = [0u64; 3];

        for &(color, n) in &self.entries {
            count += n;
            sum[0] += color.r as u64 * n;
            sum[1] += color.g as u64 * n;
            sum[2] += color.b as u64 * n;
            self.r_min = cmp::min(self.r_min, color.r);
            self.r_max = cmp::max(self.r_max, color.r);
            self.g_min = cmp::min(self.g_min, color.g);
            self.g_max = cmp::max(self.g_max, color.g);
            self.b_min = cmp::min(self.b_min, color.b);
            self.b_max = cmp::max(self.b_max, color.b);
        }

        self.count = count;
        if count == 0 {
            self.volume = 0;
            return;
        }

        self.volume = (self.r_max - self.r_min + 1) as u64
            * (self.g_max - self.g_min + 1) as u64
            * (self.b_max - self.b_min + 1) as u64;

        let mean = |s: u64| ((s + count / 2) / count) as u8;
        self.average = Color::new(mean(sum[0]), mean(sum[1]), mean(sum[2]));
    }

    /// Entries are distinct, so two of them differ on some channel.
    fn is_splittable(&self) -> bool {
        self.entries.len() > 1
    }

    fn widest_color_channel(&self) -> ColorChannel {
        let r_width = self.r_max - self.r_min;
        let g_width = self.g_max - self.g_min;
        let b_width = self.b_max - self.b_min;
        let max = cmp::max(cmp::max(r_width, g_width), b_width);

        if max == r_width {
            ColorChannel::Red
        } else if max == g_width {
            ColorChannel::Green
        } else {
            ColorChannel::Blue
        }
    }

    fn range(&self, axis: ColorChannel) -> (u8, u8) {
        match axis {
            ColorChannel::Red => (self.r_min, self.r_max),
            ColorChannel::Green => (self.g_min, self.g_max),
            ColorChannel::Blue => (self.b_min, self.b_max),
        }
    }
}

/// Splits a splittable box in two non-empty halves.
fn apply_median_cut(mut vbox: VBox) -> (VBox, VBox) {
    let axis = vbox.widest_color_channel();
    let (lo, hi) = vbox.range(axis);
    let (lo, hi) = (lo as i32, hi as i32);

    vbox.entries.sort_unstable_by_key(|&(c, _)| (axis.of(c), pack(c)));

    let mut running = 0u64;
    let median = vbox
        .entries
        .iter()
        .find(|&&(_, n)| {
            running += n;
            running > vbox.count / 2
        })
        .map_or(hi, |&(c, _)| axis.of(c) as i32);

    // Cut halfway into the larger side of the median.
    let left = median - lo;
    let right = hi - median;
    let d2 = if left <= right {
        median + right / 2
    } else {
        median - left / 2
    };
    // Both ends of the axis are held by some color, so any cut inside
    // [min, max - 1] leaves two non-empty halves.
    let d2 = d2.clamp(lo, hi - 1) as u8;

    let at = vbox.entries.partition_point(|&(c, _)| axis.of(c) <= d2);
    let upper = vbox.entries.split_off(at);
    (VBox::new(vbox.entries), VBox::new(upper))
}

fn quantize(vbox: VBox, max_colors: usize) -> Vec<VBox> {
    let mut boxes = vec![vbox];
    let target = (FRACTION_BY_POPULATION * max_colors as f64).ceil() as usize;

    iterate(&mut boxes, |v| v.count, target);
    iterate(
        &mut boxes,
        |v| v.count.saturating_mul(v.volume),
        max_colors,
    );
    boxes
}

/// Repeatedly splits the splittable box with the highest priority until
/// `target` boxes exist or nothing can be split any more.
fn iterate<P>(boxes: &mut Vec<VBox>, priority: P, target: usize)
where
    P: Fn(&VBox) -> u64,
{
    while boxes.len() < target {
        let candidate = boxes
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_splittable())
            .max_by_key(|(_, v)| priority(*v))
            .map(|(i, _)| i);
        let Some(index) = candidate else {
            break;
        };

        let vbox = boxes.swap_remove(index);
        let (vbox1, vbox2) = apply_median_cut(vbox);
        boxes.push(vbox1);
        boxes.push(vbox2);
    }
}
