//! Reading and writing image files.

use crate::{Result, WatermarkerError};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Decode an image, reporting a missing file as `MissingFile`.
pub fn open_image(path: &Path) -> Result<DynamicImage> {
    if !path.is_file() {
        return Err(WatermarkerError::MissingFile(path.to_path_buf()));
    }
    let image = image::open(path)?;
    debug!(path = %path.display(), width = image.width(), height = image.height(), "Image loaded");
    Ok(image)
}

/// Encode in the format named by `format`. JPEG uses `quality` (1-100) and is
/// always written from RGB8, since the encoder rejects alpha.
pub fn encode(image: &DynamicImage, format: ImageFormat, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    if format == ImageFormat::Jpeg {
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
        image.to_rgb8().write_with_encoder(encoder)?;
    } else {
        image.write_to(&mut Cursor::new(&mut buffer), format)?;
    }
    Ok(buffer)
}

/// Encode fully in memory, then write, so a failed encode leaves no file behind.
pub fn save_image(image: &DynamicImage, path: &Path, quality: u8) -> Result<()> {
    let format = ImageFormat::from_path(path)?;
    let bytes = encode(image, format, quality)?;
    std::fs::write(path, &bytes)?;
    debug!(path = %path.display(), bytes = bytes.len(), "Image written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn sample() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 128])))
    }

    #[test]
    fn test_missing_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = open_image(&dir.path().join("nope.png")).unwrap_err();
        assert!(matches!(err, WatermarkerError::MissingFile(_)));
    }

    #[test]
    fn test_png_keeps_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        save_image(&sample(), &path, 100).unwrap();

        let loaded = open_image(&path).unwrap().to_rgba8();
        assert_eq!(loaded.get_pixel(3, 3).0, [10, 20, 30, 128]);
    }

    #[test]
    fn test_jpeg_from_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        save_image(&sample(), &path, 100).unwrap();

        let loaded = open_image(&path).unwrap();
        assert_eq!((loaded.width(), loaded.height()), (8, 8));
    }

    #[test]
    fn test_jpeg_drops_alpha_without_flattening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clear.jpg");
        let clear = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 0])));
        save_image(&clear, &path, 100).unwrap();

        // Transparent black stays black; it is not composited onto white.
        let px = open_image(&path).unwrap().to_rgb8().get_pixel(4, 4).0;
        assert!(px.iter().all(|&c| c < 10), "pixel was {px:?}");
    }

    #[test]
    fn test_unknown_extension_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.unknown");
        assert!(save_image(&sample(), &path, 100).is_err());
        assert!(!path.exists());
    }
}
