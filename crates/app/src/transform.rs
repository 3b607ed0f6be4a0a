//! Demo [TransformCapability] implementations. The relay treats the
//! transform as an opaque injected capability; these are the ones this
//! binary can inject.

use relay::{TransformCapability, TransformError, TransformOutput};

/// Passes frames through untouched.
pub struct Identity;

impl TransformCapability for Identity {
    fn transform(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
    ) -> Result<TransformOutput, TransformError> {
        Ok(TransformOutput {
            width,
            height,
            data: data.to_vec(),
        })
    }
}

/// Standard luminance grayscale.
pub struct Grayscale;

impl TransformCapability for Grayscale {
    fn transform(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
    ) -> Result<TransformOutput, TransformError> {
        let mut out = Vec::with_capacity(data.len());

        for pixel in data.chunks_exact(4) {
            let gray = luma(pixel);
            out.extend_from_slice(&[gray, gray, gray, pixel[3]]);
        }

        Ok(TransformOutput {
            width,
            height,
            data: out,
        })
    }
}

/// Sobel edge extraction: white edges on black, like the edge-detected
/// preview this relay was built to display.
pub struct SobelEdges {
    /// Gradient magnitudes at or above this become full white.
    pub threshold: u16,
}

impl Default for SobelEdges {
    fn default() -> Self {
        Self { threshold: 96 }
    }
}

impl TransformCapability for SobelEdges {
    fn transform(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
    ) -> Result<TransformOutput, TransformError> {
        let (w, h) = (width as usize, height as usize);
        if w < 3 || h < 3 {
            return Err(TransformError::Failed(format!(
                "frame too small for a 3x3 kernel ({width}x{height})"
            )));
        }

        // Grayscale plane first; the kernels run on intensity.
        let gray: Vec<u8> = data.chunks_exact(4).map(luma).collect();

        let mut out = vec![0u8; w * h * 4];
        // Border pixels stay black (no full neighborhood).
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                let at = |dx: isize, dy: isize| {
                    gray[(y as isize + dy) as usize * w + (x as isize + dx) as usize] as i32
                };

                let gx = -at(-1, -1) - 2 * at(-1, 0) - at(-1, 1)
                    + at(1, -1)
                    + 2 * at(1, 0)
                    + at(1, 1);
                let gy = -at(-1, -1) - 2 * at(0, -1) - at(1, -1)
                    + at(-1, 1)
                    + 2 * at(0, 1)
                    + at(1, 1);

                let magnitude = ((gx * gx + gy * gy) as f32).sqrt() as u16;
                let value = if magnitude >= self.threshold { 255 } else { 0 };

                let i = (y * w + x) * 4;
                out[i] = value;
                out[i + 1] = value;
                out[i + 2] = value;
                out[i + 3] = 255;
            }
        }

        Ok(TransformOutput {
            width,
            height,
            data: out,
        })
    }
}

fn luma(pixel: &[u8]) -> u8 {
    // Standard luminance weights.
    (0.299 * pixel[0] as f32 + 0.587 * pixel[1] as f32 + 0.114 * pixel[2] as f32) as u8
}
