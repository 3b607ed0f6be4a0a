//! The frame-relay core: RGBA frames, the single-slot [FrameMailbox],
//! the [ProcessingBridge] around an injected transform capability, the
//! fixed-interval [CaptureTicker], and the [Pipeline] that ties their
//! lifecycles together.
//!
//! This crate is CPU-only; the GPU half of the system lives in the
//! `engine` crate and meets this one at exactly two seams: the mailbox
//! (frames out) and [RenderNotifier] (redraw requests out).
//!
//! [FrameMailbox]: mailbox::FrameMailbox
//! [ProcessingBridge]: bridge::ProcessingBridge
//! [CaptureTicker]: ticker::CaptureTicker
//! [Pipeline]: pipeline::Pipeline
//! [RenderNotifier]: ticker::RenderNotifier

pub mod bridge;
pub mod frame;
pub mod mailbox;
pub mod pipeline;
pub mod source;
pub mod ticker;

pub use bridge::{ProcessingBridge, TransformCapability, TransformError, TransformOutput};
pub use frame::{FrameError, RgbaFrame};
pub use mailbox::FrameMailbox;
pub use pipeline::{Pipeline, PipelineError, PipelineState};
pub use source::ImageSource;
pub use ticker::{CaptureTicker, RenderNotifier, DEFAULT_TICK_INTERVAL};
