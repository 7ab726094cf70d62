//! Tunable thresholds and their on-disk persistence.

use super::Error;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_FILE_NAME: &str = ".colorextractor_settings.json";

/// Limits steering the palette builders and the host's color-count prompts.
///
/// Serialized as a flat JSON object with `SCREAMING_SNAKE_CASE` keys; keys
/// missing from a stored file keep their default value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct Thresholds {
    /// Above this estimated color count the user is asked to confirm.
    pub max_warn: usize,
    /// Hard cap on the number of colors a maximal palette may hold.
    pub max_error: usize,
    /// Longest side of the sample used for unique-color estimation.
    pub max_sample_dim: u32,
    /// Largest opaque pixel count eligible for an exact scan.
    pub full_scan_pixel_limit: usize,
    /// Sample unique counts up to this value allow an exact scan.
    pub unique_threshold: usize,
    /// Sample unique ratios up to this value allow an exact scan.
    pub unique_ratio_threshold: f64,
    /// Longest side of the image fed to quantization.
    pub max_quant_dim: u32,
}

impl Default for Thresholds {
    fn default() -> Thresholds {
        Thresholds {
            max_warn: 50,
            max_error: 75,
            max_sample_dim: 1200,
            full_scan_pixel_limit: 6_000_000,
            unique_threshold: 2048,
            unique_ratio_threshold: 0.05,
            max_quant_dim: 800,
        }
    }
}

impl Thresholds {
    /// Applies one edit given as text, e.g. `set("MAX_WARN", "60")`.
    ///
    /// Names are matched case-insensitively. Values must be positive numbers
    /// and the ratio must lie within `(0, 1]`.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), Error> {
        let value = value.trim();
        match name.trim().to_ascii_uppercase().as_str() {
            "MAX_WARN" => self.max_warn = parse_positive(name, value)?,
            "MAX_ERROR" => self.max_error = parse_positive(name, value)?,
            "MAX_SAMPLE_DIM" => self.max_sample_dim = parse_positive(name, value)?,
            "FULL_SCAN_PIXEL_LIMIT" => self.full_scan_pixel_limit = parse_positive(name, value)?,
            "UNIQUE_THRESHOLD" => self.unique_threshold = parse_positive(name, value)?,
            "UNIQUE_RATIO_THRESHOLD" => {
                let ratio: f64 = value
                    .parse()
                    .map_err(|_| invalid_value(name, value))?;
                if !(ratio > 0.0 && ratio <= 1.0) {
                    return Err(invalid_value(name, value));
                }
                self.unique_ratio_threshold = ratio;
            }
            "MAX_QUANT_DIM" => self.max_quant_dim = parse_positive(name, value)?,
            _ => {
                return Err(Error::InvalidArgument(format!(
                    "unknown setting {name:?}"
                )));
            }
        }
        Ok(())
    }
}

fn parse_positive<T>(name: &str, value: &str) -> Result<T, Error>
where
    T: std::str::FromStr + Default + PartialOrd,
{
    match value.parse::<T>() {
        Ok(v) if v > T::default() => Ok(v),
        _ => Err(invalid_value(name, value)),
    }
}

fn invalid_value(name: &str, value: &str) -> Error {
    Error::InvalidArgument(format!("{name} must be a positive number, got {value:?}"))
}

/// JSON file holding persisted [`Thresholds`].
#[derive(Clone, Debug)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Uses the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> SettingsStore {
        SettingsStore { path: path.into() }
    }

    /// Uses `.colorextractor_settings.json` in the user's home directory,
    /// or the current directory when no home is known.
    pub fn in_home_dir() -> SettingsStore {
        let home = std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map(PathBuf::from)
            .unwrap_or_default();
        SettingsStore::new(home.join(SETTINGS_FILE_NAME))
    }

    /// Location of the settings file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored thresholds.
    ///
    /// Never fails: a missing, unreadable or malformed file yields the
    /// defaults.
    pub fn load(&self) -> Thresholds {
        match self.try_load() {
            Ok(Some(thresholds)) => {
                debug!("loaded settings from {}", self.path.display());
                thresholds
            }
            Ok(None) => Thresholds::default(),
            Err(e) => {
                warn!("failed to load settings from {}: {e}", self.path.display());
                Thresholds::default()
            }
        }
    }

    fn try_load(&self) -> Result<Option<Thresholds>, Error> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&data)?))
    }

    /// Writes `thresholds` as pretty-printed JSON.
    pub fn save(&self, thresholds: &Thresholds) -> Result<(), Error> {
        let data = serde_json::to_string_pretty(thresholds)?;
        fs::write(&self.path, data)?;
        debug!("saved settings to {}", self.path.display());
        Ok(())
    }
}
