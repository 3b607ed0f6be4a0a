//! A synthetic [ImageSource]: a slowly drifting color gradient.
//!
//! Acquiring a real camera device (and its permissions) is the host's
//! concern; this pattern stands in for it so the relay can be run and
//! eyeballed anywhere. Each sample advances a phase counter, so
//! consecutive frames visibly differ and dropped frames are easy to
//! spot.

use relay::{ImageSource, RgbaFrame};

pub struct TestPattern {
    width: u32,
    height: u32,
    phase: u32,
}

impl TestPattern {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            phase: 0,
        }
    }
}

impl ImageSource for TestPattern {
    fn is_ready(&self) -> bool {
        true
    }

    fn sample(&mut self) -> Option<RgbaFrame> {
        let mut data = Vec::with_capacity(self.width as usize * self.height as usize * 4);

        // Widen before multiplying: `phase` grows without bound, so
        // u32 math would eventually overflow in a long session.
        for y in 0..self.height {
            for x in 0..self.width {
                let r = ((x as u64 + self.phase as u64) * 255 / self.width.max(1) as u64) as u8;
                let g = (y as u64 * 255 / self.height.max(1) as u64) as u8;
                let b = (self.phase % 256) as u8;
                data.extend_from_slice(&[r, g, b, 255]);
            }
        }

        self.phase = self.phase.wrapping_add(4);

        // The dimensions and the buffer length are consistent by
        // construction.
        RgbaFrame::new(self.width, self.height, data).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_have_the_declared_shape() {
        let mut pattern = TestPattern::new(8, 6);
        let frame = pattern.sample().unwrap();
        assert_eq!((frame.width(), frame.height()), (8, 6));
        assert_eq!(frame.data().len(), 8 * 6 * 4);
    }

    #[test]
    fn phase_wraparound_keeps_samples_valid() {
        let mut pattern = TestPattern {
            width: 4,
            height: 4,
            phase: u32::MAX - 2,
        };

        // Sampling at the top of the phase range must not overflow,
        // and the wrapped phase keeps producing valid frames.
        let frame = pattern.sample().unwrap();
        assert_eq!(frame.data().len(), 4 * 4 * 4);
        assert!(pattern.phase < 4);
        pattern.sample().unwrap();
    }

    #[test]
    fn consecutive_samples_differ() {
        let mut pattern = TestPattern::new(8, 8);
        let first = pattern.sample().unwrap();
        let second = pattern.sample().unwrap();
        assert_ne!(first.data(), second.data());
    }
}
