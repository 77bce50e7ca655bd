use serde::{Deserialize, Serialize};

/// Frames are always 8-bit RGBA.
pub const BYTES_PER_PIXEL: usize = 4;

/// Which pixel transforms to apply on a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformFlags {
    pub grayscale: bool,
    pub flip: bool,
}

impl TransformFlags {
    pub const NONE: Self = Self {
        grayscale: false,
        flip: false,
    };
    pub const GRAYSCALE: Self = Self {
        grayscale: true,
        flip: false,
    };
    pub const FLIP: Self = Self {
        grayscale: false,
        flip: true,
    };
}

/// A frame straight from the capture source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    /// Raw pixel data (RGBA, row-major, no padding).
    pub data: Vec<u8>,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Capture timestamp in microseconds.
    pub timestamp_us: u64,
}

impl RawFrame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, timestamp_us: u64) -> Self {
        Self {
            data,
            width,
            height,
            timestamp_us,
        }
    }

    /// Byte length a well-formed buffer of this size must have.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * BYTES_PER_PIXEL
    }
}

/// A frame after the transform stage, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedFrame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub timestamp_us: u64,
    /// Transforms that produced this frame.
    pub flags: TransformFlags,
}

impl ProcessedFrame {
    /// Read the RGBA value of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let px = self.data.get(offset..offset + BYTES_PER_PIXEL)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Feed a processed frame back through the transform stage.
impl From<ProcessedFrame> for RawFrame {
    fn from(frame: ProcessedFrame) -> Self {
        Self {
            data: frame.data,
            width: frame.width,
            height: frame.height,
            timestamp_us: frame.timestamp_us,
        }
    }
}
