use std::io::Cursor;

use image::imageops::FilterType;
use image::{GenericImageView, ImageFormat};
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// A processed image ready for hashing and upload.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedImage")
            .field("bytes", &self.bytes.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Turns source image bytes into the encoded form that gets uploaded.
pub trait ImageCodec: Send + Sync {
    /// File extension of encoded output, without the dot.
    fn extension(&self) -> &'static str;

    /// MIME type of encoded output.
    fn content_type(&self) -> &'static str;

    /// Decode `source`, scale it so neither side exceeds `max_dimension`
    /// (aspect ratio preserved, never upscaled), and re-encode it.
    fn render(&self, source: &[u8], max_dimension: u32) -> MediaResult<EncodedImage>;
}

/// Fit `width` x `height` inside a `max` x `max` box.
///
/// Images already inside the box are unchanged. Otherwise the longer side
/// becomes `max` and the shorter side is scaled proportionally, rounding to
/// the nearest pixel and never below one. Square images scale to `max` x `max`.
pub fn scaled_dimensions(width: u32, height: u32, max: u32) -> (u32, u32) {
    if width <= max && height <= max {
        return (width, height);
    }
    let scale = |short: u32, long: u32| -> u32 {
        let scaled = (u64::from(short) * u64::from(max) + u64::from(long) / 2) / u64::from(long);
        scaled.max(1) as u32
    };
    if width >= height {
        (max, scale(height, width))
    } else {
        (scale(width, height), max)
    }
}

/// PNG output via the `image` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct PngCodec;

impl ImageCodec for PngCodec {
    fn extension(&self) -> &'static str {
        "png"
    }

    fn content_type(&self) -> &'static str {
        "image/png"
    }

    fn render(&self, source: &[u8], max_dimension: u32) -> MediaResult<EncodedImage> {
        let image =
            image::load_from_memory(source).map_err(|e| MediaError::Decode(e.to_string()))?;
        let (width, height) = image.dimensions();
        let (target_w, target_h) = scaled_dimensions(width, height, max_dimension);

        let image = if (target_w, target_h) == (width, height) {
            image
        } else {
            debug!(width, height, target_w, target_h, "rescaling image");
            image.resize_exact(target_w, target_h, FilterType::Lanczos3)
        };

        let mut buffer = Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| MediaError::Encode(e.to_string()))?;

        Ok(EncodedImage {
            bytes: buffer.into_inner(),
            width: target_w,
            height: target_h,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};

    fn solid_png(width: u32, height: u32, colour: [u8; 3]) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(colour)));
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    // ---- scaled_dimensions ----

    #[test]
    fn small_images_are_untouched() {
        assert_eq!(scaled_dimensions(800, 600, 2048), (800, 600));
        assert_eq!(scaled_dimensions(2048, 2048, 2048), (2048, 2048));
    }

    #[test]
    fn landscape_and_portrait_fit_the_box() {
        assert_eq!(scaled_dimensions(4000, 3000, 2048), (2048, 1536));
        assert_eq!(scaled_dimensions(3000, 4000, 2048), (1536, 2048));
    }

    #[test]
    fn oversized_square_is_scaled() {
        assert_eq!(scaled_dimensions(4096, 4096, 256), (256, 256));
    }

    #[test]
    fn extreme_ratio_keeps_one_pixel() {
        assert_eq!(scaled_dimensions(10_000, 1, 256), (256, 1));
    }

    // ---- PngCodec ----

    #[test]
    fn render_downscales_and_encodes_png() {
        let source = solid_png(40, 20, [200, 10, 10]);
        let encoded = PngCodec.render(&source, 10).unwrap();
        assert_eq!((encoded.width, encoded.height), (10, 5));

        let decoded =
            image::load_from_memory_with_format(&encoded.bytes, ImageFormat::Png).unwrap();
        assert_eq!(decoded.dimensions(), (10, 5));
    }

    #[test]
    fn render_is_deterministic() {
        let source = solid_png(30, 30, [1, 2, 3]);
        let a = PngCodec.render(&source, 16).unwrap();
        let b = PngCodec.render(&source, 16).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn render_rejects_garbage() {
        let err = PngCodec.render(b"definitely not an image", 256).unwrap_err();
        assert!(matches!(err, MediaError::Decode(_)));
    }

    #[test]
    fn codec_metadata() {
        assert_eq!(PngCodec.extension(), "png");
        assert_eq!(PngCodec.content_type(), "image/png");
    }
}
