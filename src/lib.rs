// Copyright 2026, The color-extractor developers.
// Licensed under the MIT license, see the LICENSE file or <http://opensource.org/licenses/MIT>

//! *color-extractor* builds a color palette out of a decoded raster image.
//!
//! Two modes are supported:
//!
//! - a quantized palette of at most `n` colors, produced by a modified
//!   median cut over the opaque pixels of the image;
//! - a maximal palette listing every unique opaque color. Exact counting is
//!   guarded by a cheap estimate taken on a downsampled copy, so huge
//!   photographs fall back to an approximate palette instead of stalling.
//!
//! Builders are pure functions returning a fresh list of [`ColorEntry`];
//! the caller installs it into a [`Palette`], which handles sorting,
//! enable flags and manual edits.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod codec;
mod container;
pub mod export;
mod locate;
mod maximal;
mod mmcq;
mod raster;
pub mod session;
pub mod settings;
mod stats;

use thiserror::Error;

pub use codec::HexParseError;
pub use container::{ColorEntry, Palette, SortMode};
pub use locate::{MARKER_SAMPLE_DIM, Marker, locate_markers};
pub use maximal::{MaximalOptions, maximal_palette};
pub use mmcq::quantized_palette;
pub use raster::{ColorFormat, ColorFormatParseError, rgba_from_raw};
pub use session::{Confirmation, Session, Target};
pub use settings::{SettingsStore, Thresholds};
pub use stats::{UniqueStats, estimate_unique_stats};

pub use image::RgbaImage;
pub use rgb::RGB8 as Color;

/// Represents an error that can occur while building or editing a palette.
#[derive(Debug, Error)]
pub enum Error {
    /// An exact unique-color count exceeded the configured hard cap.
    ///
    /// The palette is left untouched when this is returned.
    #[error("there are too many colors to display ({found} > {limit})")]
    TooManyColors {
        /// Number of distinct colors that were found (or estimated).
        found: usize,
        /// The cap that was exceeded.
        limit: usize,
    },
    /// A numeric input or threshold edit was rejected.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A hex color string could not be parsed.
    #[error(transparent)]
    Parse(#[from] HexParseError),
    /// Reading or writing a file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The settings file could not be encoded or decoded.
    #[error(transparent)]
    Settings(#[from] serde_json::Error),
    /// An image could not be decoded or encoded.
    #[error(transparent)]
    Image(#[from] image::ImageError),
}
