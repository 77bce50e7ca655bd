use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageBuffer, ImageEncoder, Rgba};
use thiserror::Error;

use crate::capture::frame::{ProcessedFrame, BYTES_PER_PIXEL};

/// JPEG quality used for live preview frames.
pub const PREVIEW_JPEG_QUALITY: u8 = 85;

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("frame buffer does not match {width}x{height} RGBA")]
    InvalidBuffer { width: u32, height: u32 },

    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

fn to_image(frame: &ProcessedFrame) -> Result<ImageBuffer<Rgba<u8>, Vec<u8>>, PreviewError> {
    if frame.data.len() != frame.width as usize * frame.height as usize * BYTES_PER_PIXEL {
        return Err(PreviewError::InvalidBuffer {
            width: frame.width,
            height: frame.height,
        });
    }
    ImageBuffer::from_raw(frame.width, frame.height, frame.data.clone()).ok_or(
        PreviewError::InvalidBuffer {
            width: frame.width,
            height: frame.height,
        },
    )
}

/// Compress a processed frame to JPEG at the given quality (1-100).
///
/// JPEG has no alpha channel, so alpha is dropped.
pub fn compress_jpeg(frame: &ProcessedFrame, quality: u8) -> Result<Vec<u8>, PreviewError> {
    let rgba = to_image(frame)?;
    let rgb = DynamicImage::ImageRgba8(rgba).into_rgb8();

    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    rgb.write_with_encoder(encoder)?;
    Ok(buf)
}

/// Losslessly encode a processed frame to PNG, alpha included.
pub fn compress_png(frame: &ProcessedFrame) -> Result<Vec<u8>, PreviewError> {
    let rgba = to_image(frame)?;
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf).write_image(
        rgba.as_raw(),
        frame.width,
        frame.height,
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(buf)
}

/// Encode a frame as base64 JPEG, the form web-view hosts display directly.
pub fn frame_to_base64_jpeg(frame: &ProcessedFrame) -> Result<String, PreviewError> {
    let jpeg = compress_jpeg(frame, PREVIEW_JPEG_QUALITY)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(jpeg))
}
