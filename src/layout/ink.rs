//! Ink-region detection on rasterized pages without extractable text

use super::geometry::BoundingBox;
use image::{Rgba, RgbaImage};

/// Opaque white
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Find the tight box around every pixel that is not exactly `background`.
///
/// Returns `None` for a blank raster. Width and height are the distance
/// between the extreme ink pixels, so a single ink pixel yields a zero-sized
/// box at its coordinates.
pub fn detect_ink_bbox(image: &RgbaImage, background: Rgba<u8>) -> Option<BoundingBox> {
    let mut extent: Option<(u32, u32, u32, u32)> = None;

    for (x, y, pixel) in image.enumerate_pixels() {
        if *pixel == background {
            continue;
        }
        extent = Some(match extent {
            None => (y, x, y, x),
            Some((top, left, bottom, right)) => {
                (top.min(y), left.min(x), bottom.max(y), right.max(x))
            }
        });
    }

    extent.map(|(top, left, bottom, right)| {
        BoundingBox::new(
            top as i32,
            left as i32,
            (right - left) as i32,
            (bottom - top) as i32,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, WHITE)
    }

    #[test]
    fn test_blank_page_has_no_ink() {
        assert_eq!(detect_ink_bbox(&blank(40, 40), WHITE), None);
    }

    #[test]
    fn test_single_pixel() {
        let mut img = blank(40, 30);
        img.put_pixel(7, 12, Rgba([0, 0, 0, 255]));
        assert_eq!(
            detect_ink_bbox(&img, WHITE),
            Some(BoundingBox::new(12, 7, 0, 0))
        );
    }

    #[test]
    fn test_black_square() {
        let mut img = blank(40, 40);
        for y in 5..=20 {
            for x in 5..=20 {
                img.put_pixel(x, y, Rgba([0, 0, 0, 255]));
            }
        }
        assert_eq!(
            detect_ink_bbox(&img, WHITE),
            Some(BoundingBox::new(5, 5, 15, 15))
        );
    }

    #[test]
    fn test_near_white_counts_as_ink() {
        let mut img = blank(10, 10);
        img.put_pixel(3, 4, Rgba([254, 255, 255, 255]));
        img.put_pixel(8, 1, Rgba([255, 255, 255, 0]));
        assert_eq!(
            detect_ink_bbox(&img, WHITE),
            Some(BoundingBox::new(1, 3, 5, 3))
        );
    }
}
