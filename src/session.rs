//! One image being worked on, with its palette, thresholds and markers.

use super::{Color, Error};
use crate::container::{Palette, SortMode};
use crate::locate::{Marker, locate_markers};
use crate::maximal::{MaximalOptions, maximal_palette};
use crate::mmcq::quantized_palette;
use crate::settings::Thresholds;
use crate::stats::estimate_unique_stats;
use image::RgbaImage;
use log::{debug, info};
use std::str::FromStr;

/// What the user asked a palette to contain.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Target {
    /// A quantized palette of at most this many colors.
    Colors(usize),
    /// Every unique color.
    Max,
}

impl FromStr for Target {
    type Err = Error;

    /// Accepts `max` or a positive integer.
    fn from_str(s: &str) -> Result<Target, Error> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("max") {
            return Ok(Target::Max);
        }
        match s.parse::<usize>() {
            Ok(n) if n > 0 => Ok(Target::Colors(n)),
            _ => Err(Error::InvalidArgument(
                "Enter a positive integer or `max`".to_owned(),
            )),
        }
    }
}

/// Answer to the "many colors" prompt raised by [`Session::generate`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Confirmation {
    /// Build the palette anyway.
    Proceed {
        /// Count every pixel exactly, even where sampling would be used.
        force_full_scan: bool,
    },
    /// Leave the current palette alone.
    Cancel,
}

/// Owns the working image and everything derived from it.
#[derive(Debug)]
pub struct Session {
    image: RgbaImage,
    palette: Palette,
    thresholds: Thresholds,
    display_scale: f64,
    markers: Vec<Marker>,
}

impl Session {
    /// Starts a session with an empty palette, displayed at scale 1.
    pub fn new(image: RgbaImage, thresholds: Thresholds) -> Session {
        Session {
            image,
            palette: Palette::new(),
            thresholds,
            display_scale: 1.0,
            markers: Vec::new(),
        }
    }

    /// The source image.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// The current palette.
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// The thresholds used by the next [`Session::generate`].
    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Replaces the thresholds.
    pub fn set_thresholds(&mut self, thresholds: Thresholds) {
        self.thresholds = thresholds;
    }

    /// Sets the ratio between displayed and source image size.
    pub fn set_display_scale(&mut self, scale: f64) {
        self.display_scale = scale;
    }

    /// One marker per palette entry, in display coordinates.
    pub fn markers(&self) -> Vec<Marker> {
        self.markers
            .iter()
            .map(|m| m.to_display(self.display_scale))
            .collect()
    }

    /// Builds a new palette for `target` and installs it.
    ///
    /// For [`Target::Max`] the number of unique colors is estimated first.
    /// Above `max_error` the request is refused with
    /// [`Error::TooManyColors`]; above `max_warn`, `confirm` is called with
    /// the estimate and the build is then capped at `max_error` colors.
    ///
    /// Returns `false` if the user cancelled. On cancel or error the
    /// previous palette is kept.
    pub fn generate<F>(&mut self, target: Target, confirm: F) -> Result<bool, Error>
    where
        F: FnOnce(usize) -> Confirmation,
    {
        let colors = match target {
            Target::Colors(n) => quantized_palette(&self.image, n, self.thresholds.max_quant_dim),
            Target::Max => {
                let stats = estimate_unique_stats(&self.image, self.thresholds.max_sample_dim);
                let estimate = stats.estimated_total_unique();
                debug!("estimated {estimate} unique colors from {stats:?}");

                if estimate > self.thresholds.max_error {
                    return Err(Error::TooManyColors {
                        found: estimate,
                        limit: self.thresholds.max_error,
                    });
                }

                let options = if estimate > self.thresholds.max_warn {
                    match confirm(estimate) {
                        Confirmation::Proceed { force_full_scan } => MaximalOptions {
                            force_full_scan,
                            max_unique_error: Some(self.thresholds.max_error),
                        },
                        Confirmation::Cancel => return Ok(false),
                    }
                } else {
                    MaximalOptions::default()
                };
                maximal_palette(&self.image, &self.thresholds, options)?
            }
        };

        info!("generated {} colors for {target:?}", colors.len());
        self.palette.replace(colors);
        self.refresh_markers();
        Ok(true)
    }

    /// Re-sorts the palette.
    pub fn resort(&mut self, mode: SortMode, disabled_to_top: bool) {
        self.palette.sort(mode, disabled_to_top);
        self.refresh_markers();
    }

    /// Flips the enabled flag of one entry.
    pub fn toggle_enabled(&mut self, index: usize) {
        self.palette.toggle_enabled(index);
    }

    /// Appends a manually picked color.
    pub fn add_color(&mut self, rgb: Color) {
        self.palette.add_color(rgb);
        self.refresh_markers();
    }

    /// Removes one entry.
    pub fn remove_color(&mut self, index: usize) {
        self.palette.remove_color(index);
        self.refresh_markers();
    }

    /// Removes every disabled entry, returning how many went away.
    pub fn remove_disabled(&mut self) -> usize {
        let removed = self.palette.remove_disabled();
        if removed > 0 {
            self.refresh_markers();
        }
        removed
    }

    fn refresh_markers(&mut self) {
        self.markers = locate_markers(&self.image, self.palette.colors());
    }
}
