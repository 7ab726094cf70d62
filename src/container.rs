use super::Color;
use crate::codec::{relative_luminance, to_hex};
use palette::{FromColor, Hsv, Srgb};
use std::cmp::Ordering;
use std::fmt;

/// One slot of a palette.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorEntry {
    rgb: Color,
    hex: String,
    /// Number of source pixels that map to this color, `0` for manual adds.
    pub count: u64,
    /// Presentation filter; disabled entries are skipped by exports.
    pub enabled: bool,
}

impl ColorEntry {
    /// Creates an enabled entry.
    pub fn new(rgb: Color, count: u64) -> ColorEntry {
        ColorEntry {
            rgb,
            hex: to_hex(rgb),
            count,
            enabled: true,
        }
    }

    /// The entry color.
    pub fn rgb(&self) -> Color {
        self.rgb
    }

    /// The entry color as `#RRGGBB`.
    pub fn hex(&self) -> &str {
        &self.hex
    }

    /// Replaces the color, keeping the hex form in sync.
    pub fn set_rgb(&mut self, rgb: Color) {
        self.rgb = rgb;
        self.hex = to_hex(rgb);
    }

    fn hsv(&self) -> Hsv {
        Hsv::from_color(Srgb::new(self.rgb.r, self.rgb.g, self.rgb.b).into_format::<f32>())
    }
}

/// Key used by [`Palette::sort`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SortMode {
    /// Most frequent first.
    Frequency,
    /// HSV hue, ascending.
    Hue,
    /// HSV saturation, ascending.
    Saturation,
    /// HSV value, ascending.
    Value,
    /// Relative luminance, ascending.
    Luminance,
    /// `#RRGGBB` string, lexicographic.
    Hex,
    /// Every entry compares equal, so the current order is kept.
    Unordered,
}

impl SortMode {
    const NAMES: &'static [(&'static str, SortMode)] = &[
        ("frequency", SortMode::Frequency),
        ("hue", SortMode::Hue),
        ("saturation", SortMode::Saturation),
        ("value", SortMode::Value),
        ("luminance", SortMode::Luminance),
        ("hex", SortMode::Hex),
    ];

    /// Resolves a mode by name. Unknown names yield [`SortMode::Unordered`].
    pub fn from_name(name: &str) -> SortMode {
        let name = name.trim();
        SortMode::NAMES
            .iter()
            .find(|(n, _)| name.eq_ignore_ascii_case(n))
            .map_or(SortMode::Unordered, |(_, mode)| *mode)
    }

    fn compare(self, a: &ColorEntry, b: &ColorEntry) -> Ordering {
        match self {
            SortMode::Frequency => b.count.cmp(&a.count),
            SortMode::Hue => {
                let (ha, hb) = (a.hsv().hue, b.hsv().hue);
                ha.into_positive_degrees()
                    .total_cmp(&hb.into_positive_degrees())
            }
            SortMode::Saturation => a.hsv().saturation.total_cmp(&b.hsv().saturation),
            SortMode::Value => a.hsv().value.total_cmp(&b.hsv().value),
            SortMode::Luminance => relative_luminance(a.rgb).total_cmp(&relative_luminance(b.rgb)),
            SortMode::Hex => a.hex.cmp(&b.hex),
            SortMode::Unordered => Ordering::Equal,
        }
    }
}

impl From<&str> for SortMode {
    fn from(name: &str) -> SortMode {
        SortMode::from_name(name)
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = SortMode::NAMES
            .iter()
            .find(|(_, mode)| mode == self)
            .map_or("unordered", |(n, _)| n);
        f.write_str(name)
    }
}

/// An ordered list of color entries.
///
/// Entries may repeat the same color. Out-of-range indices are ignored by
/// every editing method, since they typically come from a UI that may be
/// a redraw behind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Palette {
    colors: Vec<ColorEntry>,
}

impl Palette {
    /// Creates an empty palette.
    pub fn new() -> Palette {
        Palette::default()
    }

    /// Entries in display order.
    pub fn colors(&self) -> &[ColorEntry] {
        &self.colors
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Returns `true` if the palette holds no entries.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Discards the current entries and installs `colors`.
    pub fn replace(&mut self, colors: Vec<ColorEntry>) {
        self.colors = colors;
    }

    /// Stable sort by `mode`.
    ///
    /// With `disabled_to_top`, disabled entries are sorted among themselves
    /// and placed before the separately sorted enabled ones.
    pub fn sort(&mut self, mode: SortMode, disabled_to_top: bool) {
        if disabled_to_top {
            let (mut disabled, mut enabled): (Vec<_>, Vec<_>) =
                self.colors.drain(..).partition(|c| !c.enabled);
            disabled.sort_by(|a, b| mode.compare(a, b));
            enabled.sort_by(|a, b| mode.compare(a, b));
            disabled.append(&mut enabled);
            self.colors = disabled;
        } else {
            self.colors.sort_by(|a, b| mode.compare(a, b));
        }
    }

    /// Flips the enabled flag of the entry at `index`.
    pub fn toggle_enabled(&mut self, index: usize) {
        if let Some(entry) = self.colors.get_mut(index) {
            entry.enabled = !entry.enabled;
        }
    }

    /// Appends a manually chosen color with a zero count.
    pub fn add_color(&mut self, rgb: Color) {
        self.colors.push(ColorEntry::new(rgb, 0));
    }

    /// Removes the entry at `index`, shifting later entries down.
    pub fn remove_color(&mut self, index: usize) {
        if index < self.colors.len() {
            self.colors.remove(index);
        }
    }

    /// Removes every disabled entry and returns how many were dropped.
    pub fn remove_disabled(&mut self) -> usize {
        let before = self.colors.len();
        self.colors.retain(|c| c.enabled);
        before - self.colors.len()
    }

    /// Hex strings in the current order, optionally only the enabled ones.
    pub fn hex_list(&self, enabled_only: bool) -> Vec<String> {
        self.colors
            .iter()
            .filter(|c| c.enabled || !enabled_only)
            .map(|c| c.hex.clone())
            .collect()
    }
}
