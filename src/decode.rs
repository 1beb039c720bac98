use std::path::Path;

use image::DynamicImage;

use crate::error::TextureError;

/// Pixels decoded from an image file, rows stored bottom-up.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// The pixels expanded to RGBA8, which is what the GPU texture stores.
    pub fn to_rgba8(&self) -> Option<image::RgbaImage> {
        match self.channels {
            4 => image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone()),
            3 => image::RgbImage::from_raw(self.width, self.height, self.pixels.clone())
                .map(|rgb| DynamicImage::ImageRgb8(rgb).to_rgba8()),
            _ => None,
        }
    }
}

pub trait ImageDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage, TextureError>;
}

/// Decodes files with the `image` crate, flipping them vertically so the
/// first row is the bottom of the picture.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateDecoder;

impl ImageDecoder for ImageCrateDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage, TextureError> {
        let img = image::open(path).map_err(|source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        let (width, height) = (img.width(), img.height());
        let channels = img.color().channel_count();

        let pixels = match (img.flipv(), channels) {
            (DynamicImage::ImageRgb8(rgb), _) => rgb.into_raw(),
            (DynamicImage::ImageRgba8(rgba), _) => rgba.into_raw(),
            (other, 3) => other.to_rgb8().into_raw(),
            (other, 4) => other.to_rgba8().into_raw(),
            // left for the registry to reject
            (other, _) => other.into_bytes(),
        };

        Ok(DecodedImage {
            width,
            height,
            channels,
            pixels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_rgb_png_flipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stripes.png");

        let mut img = image::RgbImage::new(1, 2);
        img.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        img.put_pixel(0, 1, image::Rgb([0, 0, 255]));
        img.save(&path).unwrap();

        let decoded = ImageCrateDecoder.decode(&path).unwrap();

        assert_eq!((decoded.width, decoded.height, decoded.channels), (1, 2, 3));
        assert_eq!(decoded.pixels, vec![0, 0, 255, 255, 0, 0]);
    }

    #[test]
    fn reports_grayscale_channel_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        image::GrayImage::new(2, 2).save(&path).unwrap();

        let decoded = ImageCrateDecoder.decode(&path).unwrap();

        assert_eq!(decoded.channels, 1);
        assert!(decoded.to_rgba8().is_none());
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let err = ImageCrateDecoder
            .decode(Path::new("does/not/exist.png"))
            .unwrap_err();

        assert!(matches!(err, TextureError::Decode { .. }));
    }

    #[test]
    fn rgb_expands_to_opaque_rgba() {
        let decoded = DecodedImage {
            width: 1,
            height: 1,
            channels: 3,
            pixels: vec![10, 20, 30],
        };

        assert_eq!(decoded.to_rgba8().unwrap().into_raw(), vec![10, 20, 30, 255]);
    }
}
