//! This module contains the [ProcessingBridge], the call boundary to
//! an injected image-transform capability.
//!
//! The capability is opaque to the pipeline: it may resize the frame,
//! it may error for any reason (unsupported size, internal fault,
//! resource exhaustion), and - since it models a native module - it
//! may even panic. All of that is contained here and converted to a
//! "no result" outcome; nothing crosses this boundary.

use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;

use crate::frame::RgbaFrame;

/// Raw output of a transform capability: reported dimensions plus the
/// bytes that are claimed to match them. The bridge, not the
/// capability, checks that claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutput {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// An injected, synchronous image transform.
///
/// From the pipeline's perspective this is a pure function from RGBA8
/// bytes to RGBA8 bytes. The output may have different dimensions than
/// the input. Whatever internal resources the capability needs are its
/// own concern and should be initialized before the pipeline starts.
pub trait TransformCapability: Send + 'static {
    fn transform(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
    ) -> Result<TransformOutput, TransformError>;
}

/// Blanket impl so plain closures can be injected as capabilities
/// (handy for test doubles simulating success, failure, and latency).
impl<F> TransformCapability for F
where
    F: Fn(&[u8], u32, u32) -> Result<TransformOutput, TransformError> + Send + 'static,
{
    fn transform(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
    ) -> Result<TransformOutput, TransformError> {
        self(data, width, height)
    }
}

/// A failure reported by a transform capability.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("The transform failed: {0}")]
    Failed(String),
}

/// Wraps a [TransformCapability] and contains its failures.
pub struct ProcessingBridge {
    capability: Box<dyn TransformCapability>,
}

impl ProcessingBridge {
    pub fn new(capability: impl TransformCapability) -> Self {
        Self {
            capability: Box::new(capability),
        }
    }

    /// Run the capability on `frame`. Returns [None] on any failure
    /// (a reported error, a panic, or output bytes that don't match
    /// the reported dimensions); the caller treats [None] as "skip
    /// this tick".
    pub fn process(&self, frame: &RgbaFrame) -> Option<RgbaFrame> {
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.capability
                .transform(frame.data(), frame.width(), frame.height())
        }));

        let output = match result {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => {
                log::warn!("Transform failure contained: {err}");
                return None;
            }
            Err(_) => {
                log::warn!("Transform panic contained.");
                return None;
            }
        };

        // The shape check: a capability that reports WxH must hand
        // back exactly W*H*4 bytes, anything else is a failure outcome.
        match RgbaFrame::new(output.width, output.height, output.data) {
            Ok(processed) => Some(processed),
            Err(err) => {
                log::warn!("Transform returned a malformed frame: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> RgbaFrame {
        RgbaFrame::from_fill(2, 2, [10, 20, 30, 255])
    }

    fn passthrough(data: &[u8], width: u32, height: u32) -> Result<TransformOutput, TransformError> {
        Ok(TransformOutput {
            width,
            height,
            data: data.to_vec(),
        })
    }

    #[test]
    fn success_passes_the_frame_through() {
        let bridge = ProcessingBridge::new(passthrough);

        let out = bridge.process(&input()).unwrap();
        assert_eq!(out.data(), input().data());
    }

    #[test]
    fn resizing_transforms_are_allowed() {
        let bridge = ProcessingBridge::new(|_: &[u8], _: u32, _: u32| {
            Ok(TransformOutput {
                width: 3,
                height: 1,
                data: vec![0; 12],
            })
        });

        let out = bridge.process(&input()).unwrap();
        assert_eq!((out.width(), out.height()), (3, 1));
    }

    #[test]
    fn errors_become_no_result() {
        let bridge = ProcessingBridge::new(|_: &[u8], _: u32, _: u32| {
            Err(TransformError::Failed("unsupported size".into()))
        });

        assert!(bridge.process(&input()).is_none());
    }

    #[test]
    fn panics_become_no_result() {
        let bridge = ProcessingBridge::new(
            |_: &[u8], _: u32, _: u32| -> Result<TransformOutput, TransformError> {
                panic!("simulated native fault")
            },
        );

        assert!(bridge.process(&input()).is_none());
    }

    #[test]
    fn malformed_output_becomes_no_result() {
        // Claims 2x2 (16 bytes) but returns 15.
        let bridge = ProcessingBridge::new(|_: &[u8], _: u32, _: u32| {
            Ok(TransformOutput {
                width: 2,
                height: 2,
                data: vec![0; 15],
            })
        });

        assert!(bridge.process(&input()).is_none());
    }

    #[test]
    fn zero_dimension_output_becomes_no_result() {
        let bridge = ProcessingBridge::new(|_: &[u8], _: u32, _: u32| {
            Ok(TransformOutput {
                width: 0,
                height: 0,
                data: vec![],
            })
        });

        assert!(bridge.process(&input()).is_none());
    }
}
