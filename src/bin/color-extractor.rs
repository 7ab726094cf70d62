use anyhow::{Context, Result, bail};
use clap::Parser;
use color_extractor::{Confirmation, Session, SettingsStore, SortMode, Target, export};
use log::warn;
use std::path::PathBuf;

/// Extract a color palette from an image.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input image path
    input: PathBuf,

    /// Number of colors, or `max` for every unique color
    #[arg(short = 'n', long, default_value = "8")]
    count: String,

    /// Sort order: frequency, hue, saturation, value, luminance or hex
    #[arg(short, long, default_value = "frequency")]
    sort: String,

    /// Place disabled colors before enabled ones when sorting
    #[arg(long)]
    disabled_to_top: bool,

    /// Count colors exactly even when the image looks too diverse
    #[arg(long)]
    force_full_scan: bool,

    /// Proceed without asking when many colors are expected
    #[arg(short = 'y', long)]
    yes: bool,

    /// Settings file (defaults to ~/.colorextractor_settings.json)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Threshold edits such as `MAX_WARN=100`, saved to the settings file
    #[arg(long = "set", value_name = "NAME=VALUE")]
    edits: Vec<String>,

    /// Write the enabled hex values to this text file
    #[arg(long)]
    export_text: Option<PathBuf>,

    /// Write a swatch grid to this image file
    #[arg(long)]
    export_image: Option<PathBuf>,

    /// Print a sample pixel position for every color
    #[arg(short, long)]
    markers: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let store = args
        .settings
        .clone()
        .map_or_else(SettingsStore::in_home_dir, SettingsStore::new);
    let mut thresholds = store.load();
    if !args.edits.is_empty() {
        for edit in &args.edits {
            let Some((name, value)) = edit.split_once('=') else {
                bail!("expected NAME=VALUE, got {edit:?}");
            };
            thresholds.set(name, value)?;
        }
        if let Err(e) = store.save(&thresholds) {
            warn!("failed to save settings: {e}");
        }
    }

    let target: Target = args.count.parse()?;
    let image = image::open(&args.input)
        .with_context(|| format!("unable to decode {}", args.input.display()))?
        .to_rgba8();

    let mut session = Session::new(image, thresholds);
    let generated = session.generate(target, |estimate| {
        if args.yes {
            Confirmation::Proceed {
                force_full_scan: args.force_full_scan,
            }
        } else {
            eprintln!("Estimated unique colors: {estimate}. Re-run with --yes to proceed.");
            Confirmation::Cancel
        }
    })?;
    if !generated {
        return Ok(());
    }
    session.resort(SortMode::from_name(&args.sort), args.disabled_to_top);

    let markers = session.markers();
    for (entry, marker) in session.palette().colors().iter().zip(&markers) {
        if args.markers {
            match marker.position {
                Some((x, y)) => println!("{}\t{}\t{x},{y}", entry.hex(), entry.count),
                None => println!("{}\t{}\t-", entry.hex(), entry.count),
            }
        } else {
            println!("{}\t{}", entry.hex(), entry.count);
        }
    }

    if let Some(path) = &args.export_text {
        let n = export::save_hex_text(session.palette(), path)?;
        eprintln!("Saved {n} colors to {}", path.display());
    }
    if let Some(path) = &args.export_image {
        export::save_swatch_grid(session.palette(), path)?;
        eprintln!("Palette image saved to {}", path.display());
    }

    Ok(())
}
