//! The [ImageSource] boundary: where live frames come from.

use crate::frame::RgbaFrame;

/// A live image source (a camera preview, a test pattern, ...).
///
/// Only the capture worker ever calls these methods, so implementors
/// don't need interior synchronization; they do need to be [Send]
/// because the worker owns the source on its own thread. Dropping the
/// source releases the underlying device - this happens exactly once,
/// when the worker shuts down.
pub trait ImageSource: Send + 'static {
    /// Whether the source can currently produce a frame. A tick that
    /// finds the source not ready is skipped.
    fn is_ready(&self) -> bool;

    /// Sample the current frame. [None] means this tick has nothing to
    /// process (not an error; the next tick will try again).
    fn sample(&mut self) -> Option<RgbaFrame>;
}

/// Sources are held as trait objects between pipeline construction and
/// start, then handed to the worker whole.
impl ImageSource for Box<dyn ImageSource> {
    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn sample(&mut self) -> Option<RgbaFrame> {
        (**self).sample()
    }
}
