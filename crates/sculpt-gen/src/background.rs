//! White-background check for generated images
//!
//! The 3D converter works best on a single object isolated on a plain white
//! backdrop. Before a generated image is accepted, the four border bands of the
//! image are averaged per channel; if any band's mean falls below the whiteness
//! threshold on any channel, the image is rejected.

use image::{DynamicImage, RgbImage};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum mean channel value (0-255) a border band must reach
pub const DEFAULT_THRESHOLD: u8 = 240;
/// Width in pixels of each sampled border band
pub const DEFAULT_MARGIN_PIXELS: u32 = 20;

/// Parameters for the background check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundCheck {
    pub threshold: u8,
    pub margin_pixels: u32,
}

impl Default for BackgroundCheck {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            margin_pixels: DEFAULT_MARGIN_PIXELS,
        }
    }
}

/// One of the four border regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Top,
    Bottom,
    Left,
    Right,
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Band::Top => write!(f, "top"),
            Band::Bottom => write!(f, "bottom"),
            Band::Left => write!(f, "left"),
            Band::Right => write!(f, "right"),
        }
    }
}

/// Mean RGB color of a border band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandMean {
    pub band: Band,
    pub mean: [f64; 3],
}

impl BandMean {
    /// The darkest channel mean in this band
    pub fn min_channel(&self) -> f64 {
        self.mean.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn passes(&self, threshold: u8) -> bool {
        self.mean.iter().all(|&c| c >= threshold as f64)
    }
}

/// Outcome of a background check, with per-band diagnostics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackgroundReport {
    pub passed: bool,
    pub threshold: u8,
    /// Margin actually sampled after clamping to the image size
    pub margin: u32,
    pub width: u32,
    pub height: u32,
    pub bands: Vec<BandMean>,
}

impl BackgroundReport {
    /// The band with the lowest channel mean, if any band was sampled
    pub fn darkest_band(&self) -> Option<&BandMean> {
        self.bands
            .iter()
            .min_by(|a, b| a.min_channel().total_cmp(&b.min_channel()))
    }

    /// Print a formatted summary
    pub fn print_summary(&self) {
        println!(
            "Background: {}x{} (margin {}px, threshold {})",
            self.width, self.height, self.margin, self.threshold
        );
        for band in &self.bands {
            let status = if band.passes(self.threshold) { "OK" } else { "FAIL" };
            println!(
                "  {:<6} mean rgb({:.1}, {:.1}, {:.1})  {}",
                band.band.to_string(),
                band.mean[0],
                band.mean[1],
                band.mean[2],
                status
            );
        }
        println!("  Result: {}", if self.passed { "WHITE" } else { "NOT WHITE" });
    }
}

/// Clamp the requested margin so every band lies inside the image.
///
/// The margin never exceeds half of the smaller dimension and is at least one
/// pixel, so a 1x1 image is sampled as a single band covering the whole image.
pub fn effective_margin(width: u32, height: u32, margin_pixels: u32) -> u32 {
    let half = (width.min(height) / 2).max(1);
    margin_pixels.clamp(1, half)
}

/// Returns true when all four border bands are at least `threshold` on every channel
pub fn is_background_white(image: &DynamicImage, threshold: u8, margin_pixels: u32) -> bool {
    inspect_background(
        image,
        &BackgroundCheck {
            threshold,
            margin_pixels,
        },
    )
    .passed
}

/// Run the background check and keep the per-band means for diagnostics
pub fn inspect_background(image: &DynamicImage, check: &BackgroundCheck) -> BackgroundReport {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();

    if width == 0 || height == 0 {
        return BackgroundReport {
            passed: false,
            threshold: check.threshold,
            margin: 0,
            width,
            height,
            bands: Vec::new(),
        };
    }

    let m = effective_margin(width, height, check.margin_pixels);

    let bands = vec![
        BandMean {
            band: Band::Top,
            mean: region_mean(&rgb, 0, 0, width, m),
        },
        BandMean {
            band: Band::Bottom,
            mean: region_mean(&rgb, 0, height - m, width, height),
        },
        BandMean {
            band: Band::Left,
            mean: region_mean(&rgb, 0, 0, m, height),
        },
        BandMean {
            band: Band::Right,
            mean: region_mean(&rgb, width - m, 0, width, height),
        },
    ];

    let passed = bands.iter().all(|b| b.passes(check.threshold));

    tracing::debug!(
        width,
        height,
        margin = m,
        threshold = check.threshold,
        passed,
        "background bands: {}",
        bands
            .iter()
            .map(|b| format!(
                "{}=({:.0},{:.0},{:.0})",
                b.band, b.mean[0], b.mean[1], b.mean[2]
            ))
            .collect::<Vec<_>>()
            .join(" ")
    );

    BackgroundReport {
        passed,
        threshold: check.threshold,
        margin: m,
        width,
        height,
        bands,
    }
}

/// Per-channel mean over the half-open rectangle [x0, x1) x [y0, y1)
fn region_mean(img: &RgbImage, x0: u32, y0: u32, x1: u32, y1: u32) -> [f64; 3] {
    let mut sum = [0u64; 3];
    for y in y0..y1 {
        for x in x0..x1 {
            let p = img.get_pixel(x, y);
            sum[0] += p[0] as u64;
            sum[1] += p[1] as u64;
            sum[2] += p[2] as u64;
        }
    }

    let count = ((x1 - x0) as u64 * (y1 - y0) as u64).max(1) as f64;
    [
        sum[0] as f64 / count,
        sum[1] as f64 / count,
        sum[2] as f64 / count,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid(width: u32, height: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([value; 3])))
    }

    /// White canvas with a dark square in the middle, like a well-framed product shot
    fn centered_object(size: u32) -> DynamicImage {
        let mut img = RgbImage::from_pixel(size, size, Rgb([255, 255, 255]));
        for y in size / 3..2 * size / 3 {
            for x in size / 3..2 * size / 3 {
                img.put_pixel(x, y, Rgb([180, 20, 20]));
            }
        }
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_white_image_passes() {
        assert!(is_background_white(&solid(128, 128, 255), 240, 20));
    }

    #[test]
    fn test_near_white_at_threshold_passes() {
        assert!(is_background_white(&solid(64, 64, 240), 240, 20));
        assert!(!is_background_white(&solid(64, 64, 239), 240, 20));
    }

    #[test]
    fn test_black_image_fails() {
        assert!(!is_background_white(&solid(64, 64, 0), 240, 20));
    }

    #[test]
    fn test_centered_object_does_not_affect_borders() {
        assert!(is_background_white(&centered_object(300), 240, 20));
    }

    #[test]
    fn test_single_dark_band_fails() {
        let mut img = RgbImage::from_pixel(100, 100, Rgb([255, 255, 255]));
        for y in 0..100 {
            for x in 80..100 {
                img.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        let report = inspect_background(&DynamicImage::ImageRgb8(img), &BackgroundCheck::default());
        assert!(!report.passed);
        let darkest = report.darkest_band().unwrap();
        assert_eq!(darkest.band, Band::Right);
        assert_eq!(darkest.min_channel(), 0.0);
    }

    #[test]
    fn test_one_channel_below_threshold_fails() {
        // Pale yellow: red and green are white enough, blue is not
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(50, 50, Rgb([255, 255, 200])));
        assert!(!is_background_white(&img, 240, 10));
    }

    #[test]
    fn test_uses_band_mean_not_minimum() {
        // One black row inside a 20-row top band: mean = 255 * 19 / 20 = 242.25
        let mut img = RgbImage::from_pixel(100, 100, Rgb([255, 255, 255]));
        for x in 0..100 {
            img.put_pixel(x, 0, Rgb([0, 0, 0]));
        }
        let report = inspect_background(&DynamicImage::ImageRgb8(img), &BackgroundCheck::default());
        assert!(report.passed);
        let top = report.bands.iter().find(|b| b.band == Band::Top).unwrap();
        assert!((top.mean[0] - 242.25).abs() < 1e-9);
    }

    #[test]
    fn test_small_image_clamps_margin() {
        // 10x6 is smaller than 2 * 20 in both dimensions
        let report = inspect_background(&solid(10, 6, 255), &BackgroundCheck::default());
        assert!(report.passed);
        assert_eq!(report.margin, 3);
    }

    #[test]
    fn test_single_pixel_image() {
        assert!(is_background_white(&solid(1, 1, 255), 240, 20));
        assert!(!is_background_white(&solid(1, 1, 0), 240, 20));
    }

    #[test]
    fn test_zero_margin_samples_one_pixel() {
        assert_eq!(effective_margin(100, 100, 0), 1);
        assert!(is_background_white(&solid(100, 100, 250), 240, 0));
    }

    #[test]
    fn test_effective_margin() {
        assert_eq!(effective_margin(512, 512, 20), 20);
        assert_eq!(effective_margin(30, 512, 20), 15);
        assert_eq!(effective_margin(1, 1, 20), 1);
    }

    #[test]
    fn test_alpha_is_ignored() {
        let img = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            40,
            40,
            image::Rgba([255, 255, 255, 0]),
        ));
        assert!(is_background_white(&img, 240, 5));
    }

    #[test]
    fn test_report_has_four_bands() {
        let report = inspect_background(&solid(64, 64, 255), &BackgroundCheck::default());
        assert_eq!(report.bands.len(), 4);
        assert_eq!(report.width, 64);
        assert_eq!(report.threshold, DEFAULT_THRESHOLD);
    }
}
