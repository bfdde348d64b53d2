//! Raster front-end: image file -> binary bitmap.
//!
//! Decodes with `image`, reduces resolution by an integer factor when
//! asked, converts to luminance, and thresholds either at a fixed cutoff
//! or at the Otsu level computed by `imageproc`.

use std::path::Path;

use image::{imageops, GrayImage, Luma, RgbImage};
use imageproc::contrast::otsu_level;

use crate::bitmap::Bitmap;
use crate::error::TraceError;

/// How an input image becomes a binary bitmap.
#[derive(Debug, Clone)]
pub struct RasterOptions {
    /// Fixed brightness cutoff; `None` selects Otsu auto-detection.
    pub threshold: Option<u8>,
    /// Trace bright regions instead of dark ones.
    pub invert: bool,
    /// Integer factor by which to shrink the image before thresholding.
    pub downsample: u32,
}

impl Default for RasterOptions {
    fn default() -> Self {
        RasterOptions {
            threshold: None,
            invert: false,
            downsample: 1,
        }
    }
}

/// Load an image file and reduce it to a binary bitmap.
pub fn load_bitmap(path: &Path, options: &RasterOptions) -> Result<Bitmap, TraceError> {
    if options.downsample == 0 {
        return Err(TraceError::InvalidOptions(
            "downsample factor must be at least 1".into(),
        ));
    }

    let img = image::open(path).map_err(|e| TraceError::ImageLoad(e.to_string()))?;
    let mut gray = luminance(&img.to_rgb8());

    if options.downsample > 1 {
        let w = (gray.width() / options.downsample).max(1);
        let h = (gray.height() / options.downsample).max(1);
        gray = imageops::resize(&gray, w, h, imageops::FilterType::Triangle);
    }

    Ok(binarize(&gray, options))
}

/// Rec. 601 luma, the same weighting scanners and screens assume.
fn luminance(rgb: &RgbImage) -> GrayImage {
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let p = rgb.get_pixel(x, y);
        let l = 0.299 * p[0] as f64 + 0.587 * p[1] as f64 + 0.114 * p[2] as f64;
        Luma([l.round().clamp(0.0, 255.0) as u8])
    })
}

/// Threshold a grayscale image into a bitmap. Pixels darker than the
/// cutoff become foreground, flipped when `invert` is set.
pub fn binarize(gray: &GrayImage, options: &RasterOptions) -> Bitmap {
    // otsu_level splits classes at p <= level; the foreground rule below is
    // strict, so shift by one to keep the dark class intact.
    let cutoff = match options.threshold {
        Some(t) => t,
        None => otsu_level(gray).saturating_add(1),
    };

    let mut bm = Bitmap::new(gray.width() as usize, gray.height() as usize);
    for (x, y, p) in gray.enumerate_pixels() {
        let fg = (p[0] < cutoff) != options.invert;
        bm.set(x as i32, y as i32, fg);
    }
    bm
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bimodal() -> GrayImage {
        // Left half dark ink, right half light paper.
        GrayImage::from_fn(8, 4, |x, _| if x < 4 { Luma([20u8]) } else { Luma([230u8]) })
    }

    #[test]
    fn fixed_threshold_splits_dark_from_light() {
        let options = RasterOptions {
            threshold: Some(128),
            ..RasterOptions::default()
        };
        let bm = binarize(&bimodal(), &options);
        assert!(bm.at(0, 0));
        assert!(!bm.at(7, 0));
    }

    #[test]
    fn invert_flips_foreground() {
        let options = RasterOptions {
            threshold: Some(128),
            invert: true,
            ..RasterOptions::default()
        };
        let bm = binarize(&bimodal(), &options);
        assert!(!bm.at(0, 0));
        assert!(bm.at(7, 0));
    }

    #[test]
    fn otsu_separates_bimodal_image() {
        let bm = binarize(&bimodal(), &RasterOptions::default());
        for y in 0..4 {
            for x in 0..4 {
                assert!(bm.at(x, y), "ink pixel ({}, {}) lost", x, y);
            }
            for x in 4..8 {
                assert!(!bm.at(x, y), "paper pixel ({}, {}) kept", x, y);
            }
        }
    }

    #[test]
    fn luminance_weights_green_heaviest() {
        let mut rgb = RgbImage::new(2, 1);
        rgb.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        rgb.put_pixel(1, 0, image::Rgb([0, 255, 0]));
        let gray = luminance(&rgb);
        assert!(gray.get_pixel(1, 0)[0] > gray.get_pixel(0, 0)[0]);
    }

    #[test]
    fn zero_downsample_is_rejected() {
        let options = RasterOptions {
            downsample: 0,
            ..RasterOptions::default()
        };
        let err = load_bitmap(Path::new("nonexistent.png"), &options);
        assert!(matches!(err, Err(TraceError::InvalidOptions(_))));
    }
}
