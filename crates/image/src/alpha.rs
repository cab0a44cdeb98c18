//! Alpha channel flattening for output formats without transparency.

use image::{Rgb, RgbImage, RgbaImage};

/// Composite an RGBA surface over a solid background, dropping the alpha channel.
pub fn flatten_alpha(surface: &RgbaImage, background: [u8; 3]) -> RgbImage {
    let mut output = RgbImage::new(surface.width(), surface.height());

    for (x, y, pixel) in surface.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = u32::from(a);
        let blend = |fg: u8, bg: u8| -> u8 {
            // Integer "over" with rounding; stays within 0..=255.
            ((u32::from(fg) * alpha + u32::from(bg) * (255 - alpha) + 127) / 255) as u8
        };
        output.put_pixel(
            x,
            y,
            Rgb([
                blend(r, background[0]),
                blend(g, background[1]),
                blend(b, background[2]),
            ]),
        );
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_flatten_over_white() {
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255])); // Opaque red
        img.put_pixel(0, 1, Rgba([0, 255, 0, 128])); // Semi-transparent green
        img.put_pixel(1, 0, Rgba([0, 0, 255, 0])); // Fully transparent blue
        img.put_pixel(1, 1, Rgba([255, 255, 0, 255])); // Opaque yellow

        let result = flatten_alpha(&img, [255, 255, 255]);

        assert_eq!(result.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(result.get_pixel(0, 1), &Rgb([127, 255, 127]));
        assert_eq!(result.get_pixel(1, 0), &Rgb([255, 255, 255]));
        assert_eq!(result.get_pixel(1, 1), &Rgb([255, 255, 0]));
    }

    #[test]
    fn test_flatten_over_custom_background() {
        let mut img = RgbaImage::new(1, 1);
        img.put_pixel(0, 0, Rgba([200, 200, 200, 0]));
        let result = flatten_alpha(&img, [10, 20, 30]);
        assert_eq!(result.get_pixel(0, 0), &Rgb([10, 20, 30]));
    }
}
