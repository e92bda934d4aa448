use image::DynamicImage;
use tracing::warn;

/// Complement the colour channels of an RGBA image, leaving alpha as is.
///
/// Images without an alpha channel are returned unchanged with a warning.
pub fn invert_colors(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageRgba8(mut buffer) => {
            for pixel in buffer.pixels_mut() {
                for channel in pixel.0.iter_mut().take(3) {
                    *channel = u8::MAX - *channel;
                }
            }
            DynamicImage::ImageRgba8(buffer)
        }
        DynamicImage::ImageRgba16(mut buffer) => {
            for pixel in buffer.pixels_mut() {
                for channel in pixel.0.iter_mut().take(3) {
                    *channel = u16::MAX - *channel;
                }
            }
            DynamicImage::ImageRgba16(buffer)
        }
        DynamicImage::ImageRgba32F(mut buffer) => {
            for pixel in buffer.pixels_mut() {
                for channel in pixel.0.iter_mut().take(3) {
                    *channel = 1.0 - *channel;
                }
            }
            DynamicImage::ImageRgba32F(buffer)
        }
        other => {
            warn!(
                "Image has {} channels, expected 4 (RGBA); leaving colours as they are",
                other.color().channel_count()
            );
            other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn sample_rgba() -> RgbaImage {
        RgbaImage::from_fn(8, 4, |x, y| {
            Rgba([(x * 30) as u8, (y * 60) as u8, ((x + y) * 10) as u8, (x * 20 + 40) as u8])
        })
    }

    #[test]
    fn test_invert_keeps_alpha() {
        let inverted = invert_colors(DynamicImage::ImageRgba8(sample_rgba())).to_rgba8();
        let pixel = inverted.get_pixel(2, 1);
        assert_eq!(pixel.0, [255 - 60, 255 - 60, 255 - 30, 80]);
    }

    #[test]
    fn test_invert_twice_is_identity() {
        let original = sample_rgba();
        let twice = invert_colors(invert_colors(DynamicImage::ImageRgba8(original.clone())));
        assert_eq!(twice.to_rgba8(), original);
    }

    #[test]
    fn test_invert_rgba16_twice_is_identity() {
        let original = DynamicImage::ImageRgba8(sample_rgba()).to_rgba16();
        let twice = invert_colors(invert_colors(DynamicImage::ImageRgba16(original.clone())));
        assert_eq!(twice.to_rgba16(), original);
    }

    #[test]
    fn test_rgb_image_passes_through() {
        let rgb = RgbImage::from_pixel(3, 3, Rgb([10, 20, 30]));
        let result = invert_colors(DynamicImage::ImageRgb8(rgb.clone()));
        assert_eq!(result.as_rgb8(), Some(&rgb));
    }
}
