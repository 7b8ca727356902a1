//! Upload sanity checks before OCR.
//!
//! Only confirms the bytes decode as an image. No deskew, binarisation or
//! denoising happens here; Tesseract receives the original bytes.

use image::GenericImageView;

use super::ExtractionError;

/// Anything smaller cannot hold an image header.
const MIN_IMAGE_BYTES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
}

/// Validate image bytes before OCR.
/// Size limits are checked first, then the image is decoded once.
pub fn validate_image(bytes: &[u8], max_bytes: usize) -> Result<ImageInfo, ExtractionError> {
    if bytes.len() < MIN_IMAGE_BYTES {
        return Err(ExtractionError::ImageProcessing(
            "Image data too small to be valid".into(),
        ));
    }
    if bytes.len() > max_bytes {
        return Err(ExtractionError::ImageProcessing(format!(
            "Image data exceeds {max_bytes} byte limit"
        )));
    }

    let img = image::load_from_memory(bytes)
        .map_err(|e| ExtractionError::ImageProcessing(format!("Cannot decode image: {e}")))?;
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(ExtractionError::ImageProcessing("Image has no pixels".into()));
    }

    tracing::debug!(width, height, bytes = bytes.len(), "Image decoded");
    Ok(ImageInfo { width, height })
}

#[cfg(test)]
pub(crate) fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([255, 255, 255]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut bytes, image::ImageOutputFormat::Png)
        .unwrap();
    bytes
}
