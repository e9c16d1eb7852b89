use image::{GrayImage, Luma, Rgb, RgbImage};
use std::path::{Path, PathBuf};

pub const FRAME_WIDTH: u32 = 640;
pub const FRAME_HEIGHT: u32 = 480;

/// Color constants for tests
pub const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const BLUE: Rgb<u8> = Rgb([0, 0, 255]);

/// Creates an all-black 640x480 frame.
pub fn black_frame() -> RgbImage {
    RgbImage::from_pixel(FRAME_WIDTH, FRAME_HEIGHT, BLACK)
}

/// Paints a filled square of side `2 * half + 1` centered on (cx, cy).
pub fn paint_square(frame: &mut RgbImage, cx: u32, cy: u32, half: u32, color: Rgb<u8>) {
    for y in cy - half..=cy + half {
        for x in cx - half..=cx + half {
            frame.put_pixel(x, y, color);
        }
    }
}

/// Paints a filled `width` x `height` rectangle with its top-left at (x0, y0).
pub fn paint_rect(frame: &mut RgbImage, x0: u32, y0: u32, width: u32, height: u32, color: Rgb<u8>) {
    for y in y0..y0 + height {
        for x in x0..x0 + width {
            frame.put_pixel(x, y, color);
        }
    }
}

/// Black frame with a 51x51 green square centered on each point.
pub fn frame_with_green_squares(centers: &[(u32, u32)]) -> RgbImage {
    let mut frame = black_frame();
    for &(cx, cy) in centers {
        paint_square(&mut frame, cx, cy, 25, GREEN);
    }
    frame
}

/// Paints a filled rectangle into a binary mask.
pub fn fill_mask(mask: &mut GrayImage, x0: u32, y0: u32, width: u32, height: u32) {
    for y in y0..y0 + height {
        for x in x0..x0 + width {
            mask.put_pixel(x, y, Luma([255]));
        }
    }
}

/// Paints a one-pixel-wide square outline into a binary mask.
pub fn outline_mask(mask: &mut GrayImage, x0: u32, y0: u32, side: u32) {
    for i in 0..side {
        mask.put_pixel(x0 + i, y0, Luma([255]));
        mask.put_pixel(x0 + i, y0 + side - 1, Luma([255]));
        mask.put_pixel(x0, y0 + i, Luma([255]));
        mask.put_pixel(x0 + side - 1, y0 + i, Luma([255]));
    }
}

/// Saves a frame as PNG under `dir` and returns its path.
pub fn save_frame(dir: &Path, name: &str, frame: &RgbImage) -> PathBuf {
    let path = dir.join(name);
    frame
        .save_with_format(&path, image::ImageFormat::Png)
        .expect("Failed to save test frame");
    path
}
