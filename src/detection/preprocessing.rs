use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{dilate_mut, erode_mut};

use crate::config::DetectorConfig;
use crate::models::HsvBand;

/// 8-bit HSV image. Channels are H, S, V in that order.
///
/// H is half the hue angle (0..=179) so it fits a byte; S and V span 0..=255.
pub type HsvImage = ImageBuffer<Rgb<u8>, Vec<u8>>;

/// Convert a single RGB pixel to 8-bit HSV
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (r, g, b) = (r as f32, g as f32, b as f32);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = max - min;

    let v = max;
    let s = if max > 0.0 { 255.0 * diff / max } else { 0.0 };

    let mut h = if diff == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / diff
    } else if max == g {
        120.0 + 60.0 * (b - r) / diff
    } else {
        240.0 + 60.0 * (r - g) / diff
    };
    if h < 0.0 {
        h += 360.0;
    }

    // 360 degrees rounds to 180, which wraps back to red
    let h = ((h / 2.0).round() as u32 % 180) as u8;
    [h, s.round() as u8, v as u8]
}

/// Convert image to HSV
pub fn to_hsv(img: &RgbImage) -> HsvImage {
    let mut hsv = HsvImage::new(img.width(), img.height());
    for (x, y, pixel) in img.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        hsv.put_pixel(x, y, Rgb(rgb_to_hsv(r, g, b)));
    }
    hsv
}

/// Binary mask of the pixels inside `band`: 255 inside, 0 outside.
pub fn threshold(hsv: &HsvImage, band: &HsvBand) -> GrayImage {
    GrayImage::from_fn(hsv.width(), hsv.height(), |x, y| {
        let [h, s, v] = hsv.get_pixel(x, y).0;
        if band.contains(h, s, v) {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

/// Erode then dilate the mask in place to drop speckles.
///
/// A square structuring element of side `2k + 1` is the L-infinity ball of
/// radius `k`. Erosion runs first so that speckles vanish before the larger
/// dilation could grow them.
pub fn clean_mask(mask: &mut GrayImage, config: &DetectorConfig) {
    let erode_k = (config.erode_size / 2) as u8;
    let dilate_k = (config.dilate_size / 2) as u8;

    for _ in 0..config.morph_passes {
        erode_mut(mask, Norm::LInf, erode_k);
    }
    for _ in 0..config.morph_passes {
        dilate_mut(mask, Norm::LInf, dilate_k);
    }
}
