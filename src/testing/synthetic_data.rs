//! Synthetic frames for offline capture
//!
//! Frames are a gradient that shifts with the frame number, so consecutive
//! captures encode to different bytes.

use crate::errors::CameraError;
use crate::types::{CaptureConfig, EncodedImage, ImageType};
use image::codecs::jpeg::JpegEncoder;
use image::{imageops, DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

/// Create a gradient frame that varies by position and frame number
pub fn synthetic_video_frame(frame_number: u64, width: u32, height: u32) -> RgbImage {
    let base = (frame_number.wrapping_mul(37) % 256) as u8;
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            base.wrapping_add((x % 256) as u8),
            base.wrapping_add((y % 256) as u8),
            base.wrapping_add(((x + y) % 256) as u8),
        ])
    })
}

/// Scale a stream dimension by the capture size factor, never below one pixel
pub fn scaled_dimension(dimension: u32, size_factor: f64) -> u32 {
    ((dimension as f64 * size_factor).round() as u32).max(1)
}

/// Map a 0.0..=1.0 compression setting to a JPEG quality of 1..=100
pub fn jpeg_quality(image_compression: f64) -> u8 {
    ((image_compression.clamp(0.0, 1.0) * 100.0).round() as u8).max(1)
}

/// Encode a frame the way the capture config asks for
pub fn encode_frame(
    mut frame: RgbImage,
    config: &CaptureConfig,
) -> Result<EncodedImage, CameraError> {
    if config.is_image_mirror {
        imageops::flip_horizontal_in_place(&mut frame);
    }

    let (width, height) = frame.dimensions();
    let dynamic_img = DynamicImage::ImageRgb8(frame);
    let mut data = Vec::new();

    let result = match config.image_type {
        ImageType::Png => dynamic_img.write_to(&mut Cursor::new(&mut data), ImageFormat::Png),
        ImageType::Jpg => {
            let quality = jpeg_quality(config.image_compression);
            let encoder = JpegEncoder::new_with_quality(&mut data, quality);
            dynamic_img.write_with_encoder(encoder)
        }
    };
    result.map_err(|e| CameraError::new("EncodingError", e.to_string()))?;

    Ok(EncodedImage::new(config.image_type, width, height, data))
}
