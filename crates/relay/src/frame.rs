//! This module declares [RgbaFrame], the one frame representation that
//! flows through the whole pipeline (both the raw frames a source
//! samples and the processed frames a transform returns).

use thiserror::Error;

/// Bytes per RGBA8 pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// A tightly packed RGBA8 frame: `data.len() == width * height * 4`,
/// no row padding (padding for GPU copies is the uploader's concern).
///
/// Frames are immutable once constructed and consumed at most once
/// along the pipeline; ownership moves into the mailbox on publish and
/// out of it on take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaFrame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RgbaFrame {
    /// Create a frame from its parts, validating the shape invariant.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::ZeroDimension { width, height });
        }

        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(FrameError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Create a frame filled with a single RGBA color.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is 0.
    pub fn from_fill(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        assert!(width > 0 && height > 0, "Fill frames can't be empty.");

        let pixel_count = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixel_count * BYTES_PER_PIXEL);
        for _ in 0..pixel_count {
            data.extend_from_slice(&rgba);
        }

        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The packed pixel bytes, length `width * height * 4`.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the frame, returning the packed pixel bytes.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// Indicates that frame parts don't describe a valid RGBA8 frame.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    #[error("Frame dimensions must be positive (got {width}x{height}).")]
    ZeroDimension { width: u32, height: u32 },
    #[error("Buffer size mismatch: expected {expected} bytes, got {actual} bytes.")]
    SizeMismatch { expected: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_frames_are_accepted() {
        let frame = RgbaFrame::new(4, 4, vec![0; 64]).unwrap();
        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 4);
        assert_eq!(frame.data().len(), 64);
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert_eq!(
            RgbaFrame::new(0, 4, vec![]),
            Err(FrameError::ZeroDimension {
                width: 0,
                height: 4
            })
        );
        assert_eq!(
            RgbaFrame::new(4, 0, vec![]),
            Err(FrameError::ZeroDimension {
                width: 4,
                height: 0
            })
        );
    }

    #[test]
    fn wrong_buffer_length_is_rejected() {
        assert_eq!(
            RgbaFrame::new(2, 2, vec![0; 15]),
            Err(FrameError::SizeMismatch {
                expected: 16,
                actual: 15
            })
        );
    }

    #[test]
    fn fill_produces_the_right_bytes() {
        let frame = RgbaFrame::from_fill(2, 2, [255, 0, 0, 255]);
        assert_eq!(frame.data().len(), 16);
        for pixel in frame.data().chunks(4) {
            assert_eq!(pixel, [255, 0, 0, 255]);
        }
    }
}
