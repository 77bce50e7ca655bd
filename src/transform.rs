//! Pure pixel transforms applied to every captured frame.
//!
//! Order is fixed: horizontal mirror first, then luminosity grayscale.

use image::{imageops, ImageBuffer, Rgba};

use crate::capture::error::{CaptureError, Result};
use crate::capture::frame::{ProcessedFrame, RawFrame, TransformFlags};

/// Luminosity weights in hundredths: 0.21 R + 0.72 G + 0.07 B.
const LUMA_R: u32 = 21;
const LUMA_G: u32 = 72;
const LUMA_B: u32 = 7;

/// Apply the enabled transforms to a raw frame.
///
/// Rejects zero-area frames and buffers whose length does not match the
/// frame dimensions. With no flags set the pixels pass through unchanged.
pub fn apply(raw: RawFrame, flags: TransformFlags) -> Result<ProcessedFrame> {
    if raw.width == 0 || raw.height == 0 {
        return Err(CaptureError::EmptyFrame {
            width: raw.width,
            height: raw.height,
        });
    }
    let expected = raw.expected_len();
    if raw.data.len() != expected {
        return Err(CaptureError::MalformedFrame {
            expected,
            actual: raw.data.len(),
        });
    }

    let RawFrame {
        data,
        width,
        height,
        timestamp_us,
    } = raw;
    let mut img: ImageBuffer<Rgba<u8>, Vec<u8>> =
        ImageBuffer::from_raw(width, height, data).ok_or(CaptureError::MalformedFrame {
            expected,
            actual: 0,
        })?;

    if flags.flip {
        imageops::flip_horizontal_in_place(&mut img);
    }
    if flags.grayscale {
        for px in img.pixels_mut() {
            let l = luminosity(px[0], px[1], px[2]);
            px[0] = l;
            px[1] = l;
            px[2] = l;
        }
    }

    Ok(ProcessedFrame {
        data: img.into_raw(),
        width,
        height,
        timestamp_us,
        flags,
    })
}

/// Weighted luminosity of one pixel, rounded half up.
///
/// The weights sum to 100, so the result never exceeds 255.
pub fn luminosity(r: u8, g: u8, b: u8) -> u8 {
    let weighted = LUMA_R * u32::from(r) + LUMA_G * u32::from(g) + LUMA_B * u32::from(b);
    ((weighted + 50) / 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create a synthetic RGBA test frame with a distinct value in every channel.
    fn make_test_frame(width: u32, height: u32) -> RawFrame {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                data.push((x * 37 % 256) as u8); // R
                data.push((y * 53 % 256) as u8); // G
                data.push(((x + y) * 11 % 256) as u8); // B
                data.push((200 + x % 50) as u8); // A
            }
        }
        RawFrame::new(data, width, height, 1234)
    }

    fn single_pixel(rgba: [u8; 4]) -> RawFrame {
        RawFrame::new(rgba.to_vec(), 1, 1, 0)
    }

    #[test]
    fn luminosity_matches_reference_pixel() {
        let out = apply(single_pixel([200, 100, 50, 255]), TransformFlags::GRAYSCALE).unwrap();
        assert_eq!(out.pixel(0, 0), Some([118, 118, 118, 255]));
    }

    #[test]
    fn luminosity_of_white_stays_white() {
        assert_eq!(luminosity(255, 255, 255), 255);
        assert_eq!(luminosity(0, 0, 0), 0);
    }

    #[test]
    fn grayscale_preserves_alpha() {
        let out = apply(single_pixel([10, 20, 30, 77]), TransformFlags::GRAYSCALE).unwrap();
        assert_eq!(out.pixel(0, 0).unwrap()[3], 77);
    }

    #[test]
    fn no_flags_passes_frame_through() {
        let frame = make_test_frame(13, 7);
        let out = apply(frame.clone(), TransformFlags::NONE).unwrap();
        assert_eq!(out.data, frame.data);
        assert_eq!(out.timestamp_us, frame.timestamp_us);
        assert_eq!(out.flags, TransformFlags::NONE);
    }

    #[test]
    fn flip_mirrors_each_row() {
        let frame = make_test_frame(5, 3);
        let out = apply(frame.clone(), TransformFlags::FLIP).unwrap();
        let original = apply(frame, TransformFlags::NONE).unwrap();
        for y in 0..3 {
            for x in 0..5 {
                assert_eq!(out.pixel(4 - x, y), original.pixel(x, y));
            }
        }
    }

    #[test]
    fn flipping_twice_restores_original() {
        let frame = make_test_frame(16, 9);
        let once = apply(frame.clone(), TransformFlags::FLIP).unwrap();
        let twice = apply(once.into(), TransformFlags::FLIP).unwrap();
        assert_eq!(twice.data, frame.data);
    }

    #[test]
    fn grayscale_is_a_fixpoint() {
        let frame = make_test_frame(16, 9);
        let once = apply(frame, TransformFlags::GRAYSCALE).unwrap();
        let twice = apply(once.clone().into(), TransformFlags::GRAYSCALE).unwrap();
        assert_eq!(twice.data, once.data);
    }

    #[test]
    fn flip_then_grayscale_matches_both_flags() {
        let frame = make_test_frame(6, 4);
        let both = apply(
            frame.clone(),
            TransformFlags {
                grayscale: true,
                flip: true,
            },
        )
        .unwrap();
        let flipped = apply(frame, TransformFlags::FLIP).unwrap();
        let stepwise = apply(flipped.into(), TransformFlags::GRAYSCALE).unwrap();
        assert_eq!(both.data, stepwise.data);
    }

    #[test]
    fn zero_width_frame_is_rejected() {
        let result = apply(RawFrame::new(Vec::new(), 0, 10, 0), TransformFlags::NONE);
        assert_eq!(
            result,
            Err(CaptureError::EmptyFrame {
                width: 0,
                height: 10
            })
        );
    }

    #[test]
    fn short_buffer_is_rejected() {
        let result = apply(RawFrame::new(vec![0; 10], 2, 2, 0), TransformFlags::GRAYSCALE);
        assert_eq!(
            result,
            Err(CaptureError::MalformedFrame {
                expected: 16,
                actual: 10
            })
        );
    }
}
