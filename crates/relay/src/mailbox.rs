//! This module contains [FrameMailbox], the single synchronization
//! point between the capture worker and the render thread.
//!
//! The mailbox is a single-slot buffer with overwrite-on-write and
//! consume-on-read semantics: the producer is never slowed by a slow
//! consumer, the consumer never waits for the producer, and memory is
//! bounded to exactly one frame. This is the back-pressure policy for
//! the whole pipeline (drop-oldest, latest-wins).

use std::sync::Mutex;

use crate::frame::RgbaFrame;

/// A single-slot concurrent handoff buffer for one [RgbaFrame].
///
/// [publish](Self::publish) unconditionally replaces any unread frame;
/// [take_if_available](Self::take_if_available) atomically takes and
/// empties the slot. Neither operation blocks beyond the slot's mutex,
/// which is only ever held for the duration of an [Option] swap. The
/// mutex also guarantees a reader can only observe a fully constructed
/// frame.
#[derive(Debug, Default)]
pub struct FrameMailbox {
    slot: Mutex<Option<RgbaFrame>>,
}

impl FrameMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `frame`, discarding any previously unread frame.
    pub fn publish(&self, frame: RgbaFrame) {
        // The guard lives for exactly the swap; logging (and dropping
        // the displaced frame's buffer) happens with the slot free.
        let displaced = self.slot.lock().expect(POISON_MSG).replace(frame);

        if let Some(dropped) = displaced {
            log::debug!(
                "Dropped an unread {}x{} frame (latest-wins).",
                dropped.width(),
                dropped.height()
            );
        }
    }

    /// Take the stored frame, leaving the slot empty. Returns [None]
    /// if no unread frame is present.
    pub fn take_if_available(&self) -> Option<RgbaFrame> {
        self.slot.lock().expect(POISON_MSG).take()
    }
}

const POISON_MSG: &str = "A thread panicked while holding the mailbox slot.";
