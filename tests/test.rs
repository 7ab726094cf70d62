use color_extractor::{
    Color, ColorEntry, ColorFormat, ColorFormatParseError, Error, MaximalOptions, Palette,
    RgbaImage, Thresholds, UniqueStats, estimate_unique_stats, locate_markers, maximal_palette,
    quantized_palette, rgba_from_raw,
};
use image::Rgba;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const CLEAR: [u8; 4] = [0, 0, 0, 0];

fn image_from(width: u32, height: u32, pixels: &[[u8; 4]]) -> RgbaImage {
    RgbaImage::from_raw(width, height, pixels.concat()).unwrap()
}

/// The 2x2 image with two red, one green and one transparent pixel.
fn small_image() -> RgbaImage {
    image_from(2, 2, &[RED, RED, GREEN, CLEAR])
}

fn random_image(width: u32, height: u32, seed: u64) -> RgbaImage {
    let mut rng = StdRng::seed_from_u64(seed);
    RgbaImage::from_fn(width, height, |_, _| {
        Rgba([rng.random(), rng.random(), rng.random(), 255])
    })
}

fn assert_color_approx(left: Color, right: Color, tolerance: u8) {
    assert!(
        left.r.abs_diff(right.r) <= tolerance
            && left.g.abs_diff(right.g) <= tolerance
            && left.b.abs_diff(right.b) <= tolerance,
        "Color mismatch: {:?} vs {:?} (tolerance {})",
        left,
        right,
        tolerance
    );
}

fn assert_sorted_by_count(colors: &[ColorEntry]) {
    assert!(
        colors.windows(2).all(|w| w[0].count >= w[1].count),
        "not sorted by descending count: {:?}",
        colors.iter().map(|c| c.count).collect::<Vec<_>>()
    );
}

fn summary(colors: &[ColorEntry]) -> Vec<(Color, u64)> {
    colors.iter().map(|c| (c.rgb(), c.count)).collect()
}

#[test]
fn stats_small_image() {
    let stats = estimate_unique_stats(&small_image(), 1200);
    assert_eq!(
        stats,
        UniqueStats {
            sample_unique: 2,
            sample_pixels: 3,
            total_pixels: 3,
        }
    );
    assert_eq!(stats.estimated_total_unique(), 2);
}

#[test]
fn stats_transparent_image() {
    let img = image_from(2, 1, &[CLEAR, CLEAR]);
    assert_eq!(estimate_unique_stats(&img, 1200), UniqueStats::default());
}

#[test]
fn stats_downsampled_sample() {
    let img = RgbaImage::from_pixel(300, 100, Rgba(BLUE));
    let stats = estimate_unique_stats(&img, 150);
    assert_eq!(stats.total_pixels, 30_000);
    assert_eq!(stats.sample_pixels, 150 * 50);
    assert!(stats.sample_unique >= 1);
}

#[test]
fn stats_extrapolation() {
    let stats = UniqueStats {
        sample_unique: 100,
        sample_pixels: 1000,
        total_pixels: 4000,
    };
    assert_eq!(stats.estimated_total_unique(), 400);

    let capped = UniqueStats {
        sample_unique: 900,
        sample_pixels: 1000,
        total_pixels: 2000,
    };
    assert_eq!(capped.estimated_total_unique(), 1800);

    let saturated = UniqueStats {
        sample_unique: 1000,
        sample_pixels: 1000,
        total_pixels: 1500,
    };
    assert_eq!(saturated.estimated_total_unique(), 1500);
}

#[test]
fn quantized_zero_colors() {
    assert!(quantized_palette(&small_image(), 0, 800).is_empty());
}

#[test]
fn quantized_transparent_image() {
    let img = image_from(2, 1, &[CLEAR, CLEAR]);
    assert!(quantized_palette(&img, 5, 800).is_empty());
}

#[test]
fn quantized_separated_colors() {
    let img = image_from(
        3,
        3,
        &[RED, RED, RED, RED, RED, GREEN, GREEN, GREEN, BLUE],
    );
    let colors = quantized_palette(&img, 8, 800);
    assert_eq!(
        summary(&colors),
        vec![
            (Color::new(255, 0, 0), 5),
            (Color::new(0, 255, 0), 3),
            (Color::new(0, 0, 255), 1),
        ]
    );
    assert!(colors.iter().all(|c| c.enabled));
}

#[test]
fn quantized_ignores_transparency() {
    let colors = quantized_palette(&small_image(), 4, 800);
    assert_eq!(
        summary(&colors),
        vec![(Color::new(255, 0, 0), 2), (Color::new(0, 255, 0), 1)]
    );
}

#[test]
fn quantized_single_color_is_mean() {
    let img = image_from(2, 1, &[[10, 20, 30, 255], [20, 30, 40, 255]]);
    let colors = quantized_palette(&img, 1, 800);
    assert_eq!(summary(&colors), vec![(Color::new(15, 25, 35), 2)]);
}

#[test]
fn quantized_keeps_close_colors_apart() {
    let img = image_from(2, 1, &[[0, 0, 0, 255], [6, 6, 6, 255]]);
    let colors = quantized_palette(&img, 2, 800);
    assert_eq!(
        summary(&colors),
        vec![(Color::new(0, 0, 0), 1), (Color::new(6, 6, 6), 1)]
    );
}

#[test]
fn quantized_close_colors_fill_the_request() {
    let img = RgbaImage::from_fn(4, 4, |x, y| Rgba([x as u8 * 2, y as u8 * 2, 1, 255]));

    let colors = quantized_palette(&img, 4, 800);
    assert_eq!(colors.len(), 4);
    assert_eq!(colors.iter().map(|c| c.count).sum::<u64>(), 16);

    let colors = quantized_palette(&img, 16, 800);
    assert_eq!(colors.len(), 16);
    assert!(colors.iter().all(|c| c.count == 1));
}

#[test]
fn quantized_matches_exact_palette_when_n_is_large() {
    let img = random_image(32, 32, 11);
    let exact = maximal_palette(&img, &Thresholds::default(), MaximalOptions::default()).unwrap();
    let colors = quantized_palette(&img, 32 * 32, 800);
    assert_eq!(summary(&colors), summary(&exact));
}

#[test]
fn quantized_random_images() {
    let img = random_image(64, 64, 7);
    for n in [1, 2, 3, 5, 16, 50, 256] {
        let colors = quantized_palette(&img, n, 800);
        assert!(!colors.is_empty());
        assert!(colors.len() <= n, "{} colors for n = {n}", colors.len());
        assert_sorted_by_count(&colors);
        assert_eq!(colors.iter().map(|c| c.count).sum::<u64>(), 64 * 64);
    }
}

#[test]
fn quantized_downsamples_large_images() {
    let color = Color::new(44, 124, 204);
    let img = RgbaImage::from_pixel(1000, 500, Rgba([color.r, color.g, color.b, 255]));
    let colors = quantized_palette(&img, 4, 800);
    assert_eq!(colors.len(), 1);
    assert_eq!(colors[0].count, 800 * 400);
    assert_color_approx(colors[0].rgb(), color, 1);
}

#[test]
fn maximal_small_image() {
    let colors = maximal_palette(
        &small_image(),
        &Thresholds::default(),
        MaximalOptions::default(),
    )
    .unwrap();
    assert_eq!(
        summary(&colors),
        vec![(Color::new(255, 0, 0), 2), (Color::new(0, 255, 0), 1)]
    );
    assert_eq!(colors[0].hex(), "#FF0000");
    assert_eq!(colors[1].hex(), "#00FF00");
}

#[test]
fn maximal_transparent_image() {
    let img = image_from(2, 1, &[CLEAR, CLEAR]);
    let colors = maximal_palette(&img, &Thresholds::default(), MaximalOptions::default()).unwrap();
    assert!(colors.is_empty());
}

#[test]
fn maximal_exact_counts_sum_to_total() {
    let mut rng = StdRng::seed_from_u64(3);
    let choices = [RED, GREEN, BLUE, [9, 9, 9, 255], [200, 100, 50, 255]];
    let pixels: Vec<[u8; 4]> = (0..40 * 30)
        .map(|_| choices[rng.random_range(0..choices.len())])
        .collect();
    let img = image_from(40, 30, &pixels);

    let colors = maximal_palette(&img, &Thresholds::default(), MaximalOptions::default()).unwrap();
    assert_eq!(colors.len(), choices.len());
    assert_eq!(colors.iter().map(|c| c.count).sum::<u64>(), 40 * 30);
    assert_sorted_by_count(&colors);
}

#[test]
fn maximal_too_many_colors() {
    let img = image_from(3, 1, &[RED, GREEN, BLUE]);
    let thresholds = Thresholds::default();

    let mut palette = Palette::new();
    palette.add_color(Color::new(1, 2, 3));
    let before = palette.clone();

    let options = MaximalOptions {
        force_full_scan: false,
        max_unique_error: Some(2),
    };
    match maximal_palette(&img, &thresholds, options) {
        Err(Error::TooManyColors { found, limit }) => {
            assert_eq!(found, 3);
            assert_eq!(limit, 2);
        }
        other => panic!("expected TooManyColors, got {other:?}"),
    }
    assert_eq!(palette, before);

    let options = MaximalOptions {
        max_unique_error: Some(3),
        ..options
    };
    palette.replace(maximal_palette(&img, &thresholds, options).unwrap());
    assert_eq!(palette.len(), 3);
}

#[test]
fn maximal_sampled_fallback() {
    let img = image_from(2, 2, &[RED, RED, GREEN, BLUE]);
    let thresholds = Thresholds {
        full_scan_pixel_limit: 2,
        ..Thresholds::default()
    };

    // Too many pixels for an exact scan; the sample is the image itself here.
    let colors = maximal_palette(&img, &thresholds, MaximalOptions::default()).unwrap();
    assert_eq!(colors.len(), 3);
    assert_eq!(colors[0].rgb(), Color::new(255, 0, 0));
    assert_eq!(colors[0].count, 2);

    // The cap is honored on the sampled path as well.
    let capped = MaximalOptions {
        force_full_scan: false,
        max_unique_error: Some(1),
    };
    assert!(matches!(
        maximal_palette(&img, &thresholds, capped),
        Err(Error::TooManyColors { found: 3, limit: 1 })
    ));
}

#[test]
fn maximal_forced_full_scan() {
    // Every pixel unique and the sample shrunk: only forcing gives exact counts.
    let img = random_image(40, 40, 11);
    let thresholds = Thresholds {
        max_sample_dim: 10,
        unique_threshold: 1,
        unique_ratio_threshold: 0.0001,
        ..Thresholds::default()
    };

    let sampled = maximal_palette(&img, &thresholds, MaximalOptions::default()).unwrap();
    assert!(sampled.iter().map(|c| c.count).sum::<u64>() <= 100);

    let forced = MaximalOptions {
        force_full_scan: true,
        max_unique_error: None,
    };
    let exact = maximal_palette(&img, &thresholds, forced).unwrap();
    assert_eq!(exact.iter().map(|c| c.count).sum::<u64>(), 1600);
}

#[test]
fn markers_small_image() {
    let img = small_image();
    let colors = maximal_palette(&img, &Thresholds::default(), MaximalOptions::default()).unwrap();
    let markers = locate_markers(&img, &colors);

    assert_eq!(markers.len(), 2);
    assert_eq!(markers[0].rgb, Color::new(255, 0, 0));
    assert_eq!(markers[0].position, Some((0, 0)));
    assert_eq!(markers[1].rgb, Color::new(0, 255, 0));
    assert_eq!(markers[1].position, Some((0, 1)));
}

#[test]
fn markers_nearest_color() {
    let img = image_from(2, 1, &[[250, 5, 5, 255], [5, 5, 250, 255]]);
    let colors = vec![
        ColorEntry::new(Color::new(0, 0, 255), 0),
        ColorEntry::new(Color::new(255, 0, 0), 0),
        ColorEntry::new(Color::new(0, 255, 0), 0),
    ];
    let markers = locate_markers(&img, &colors);
    assert_eq!(markers[0].position, Some((1, 0)));
    assert_eq!(markers[1].position, Some((0, 0)));
    assert_eq!(markers[2].position, None);
}

#[test]
fn markers_transparent_image() {
    let img = image_from(2, 1, &[CLEAR, CLEAR]);
    let colors = vec![ColorEntry::new(Color::new(0, 0, 0), 0)];
    let markers = locate_markers(&img, &colors);
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].position, None);
    assert!(locate_markers(&img, &[]).is_empty());
}

#[test]
fn markers_rescaled_to_source() {
    let img = RgbaImage::from_fn(840, 10, |x, _| if x < 420 { Rgba(RED) } else { Rgba(BLUE) });
    let colors = vec![
        ColorEntry::new(Color::new(255, 0, 0), 0),
        ColorEntry::new(Color::new(0, 0, 255), 0),
    ];
    let markers = locate_markers(&img, &colors);

    assert_eq!(markers[0].position, Some((0, 0)));
    let (x, y) = markers[1].position.unwrap();
    assert!((410..840).contains(&x), "x = {x}");
    assert!(y < 10);
    assert_eq!(markers[1].to_display(0.5).position, Some((x / 2, y / 2)));
}

#[test]
fn raw_bgr_buffer() {
    let img = rgba_from_raw(&[0, 0, 255, 0, 255, 0], ColorFormat::Bgr, 2, 1).unwrap();
    assert_eq!(img.get_pixel(0, 0), &Rgba(RED));
    assert_eq!(img.get_pixel(1, 0), &Rgba(GREEN));

    let img = rgba_from_raw(&[0, 1, 2, 3], ColorFormat::Argb, 1, 1).unwrap();
    assert_eq!(img.get_pixel(0, 0), &Rgba([1, 2, 3, 0]));
}

#[test]
fn raw_buffer_length_mismatch() {
    assert!(matches!(
        rgba_from_raw(&[1, 2, 3, 4, 5], ColorFormat::Rgb, 2, 1),
        Err(Error::InvalidArgument(_))
    ));
    assert_eq!("BGRA".parse::<ColorFormat>().unwrap(), ColorFormat::Bgra);
    assert!("cmyk".parse::<ColorFormat>().is_err());
}

#[test]
fn color_format_parse_error_message() {
    let err: ColorFormatParseError = "cmyk".parse::<ColorFormat>().unwrap_err();
    assert_eq!(err.to_string(), "invalid color format");
}
