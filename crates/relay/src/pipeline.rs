//! This module contains the [Pipeline] state machine that owns the
//! mailbox and the ticker and ties their lifecycles to the render
//! surface's.
//!
//! States move one way: `Idle -> Active -> Stopped`. [Stopped] is
//! terminal; restarting means constructing a new pipeline. Every
//! teardown path (explicit stop, surface destroyed) converges to the
//! same released state and is idempotent.
//!
//! [Stopped]: PipelineState::Stopped

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::bridge::ProcessingBridge;
use crate::mailbox::FrameMailbox;
use crate::source::ImageSource;
use crate::ticker::{CaptureTicker, RenderNotifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Constructed, not yet started (no worker running).
    Idle,
    /// Ticker running against a valid render surface.
    Active,
    /// Terminal. Ticker halted, source released, mailbox drained.
    Stopped,
}

/// Why a pipeline couldn't start.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineError {
    #[error("The pipeline is already active.")]
    AlreadyActive,
    #[error("The pipeline has been stopped and can't be restarted.")]
    Stopped,
    #[error("The image source isn't available.")]
    SourceUnavailable,
}

/// Owns the capture side of the system and the mailbox it publishes
/// into. The render side holds a clone of [Self::mailbox] and calls
/// [Self::on_surface_destroyed] when its surface goes away.
pub struct Pipeline {
    mailbox: Arc<FrameMailbox>,
    interval: Duration,
    // Held between construction and start, then moved to the worker.
    parts: Option<(Box<dyn ImageSource>, ProcessingBridge)>,
    ticker: Option<CaptureTicker>,
    state: PipelineState,
}

impl Pipeline {
    pub fn new(
        source: impl ImageSource,
        bridge: ProcessingBridge,
        interval: Duration,
    ) -> Self {
        let source: Box<dyn ImageSource> = Box::new(source);
        Self {
            mailbox: Arc::new(FrameMailbox::new()),
            interval,
            parts: Some((source, bridge)),
            ticker: None,
            state: PipelineState::Idle,
        }
    }

    /// The mailbox the render path consumes from.
    pub fn mailbox(&self) -> Arc<FrameMailbox> {
        Arc::clone(&self.mailbox)
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Move `Idle -> Active`: spawn the ticker. The caller must only
    /// invoke this once a valid render surface exists.
    ///
    /// A startup fault (source unavailable) is fatal to starting: an
    /// error is returned, nothing is left running, and the pipeline
    /// stays [Idle](PipelineState::Idle) so the host may retry.
    pub fn start(&mut self, notifier: Arc<dyn RenderNotifier>) -> Result<(), PipelineError> {
        match self.state {
            PipelineState::Idle => {}
            PipelineState::Active => return Err(PipelineError::AlreadyActive),
            PipelineState::Stopped => return Err(PipelineError::Stopped),
        }

        let (source, bridge) = self
            .parts
            .take()
            .expect("Parts should be present in the idle state.");

        if !source.is_ready() {
            self.parts = Some((source, bridge));
            return Err(PipelineError::SourceUnavailable);
        }

        self.ticker = Some(CaptureTicker::spawn(
            source,
            bridge,
            Arc::clone(&self.mailbox),
            notifier,
            self.interval,
        ));
        self.state = PipelineState::Active;

        log::info!("Pipeline active.");
        Ok(())
    }

    /// Move to `Stopped`: halt the ticker, release the source, discard
    /// any unread mailbox content. Idempotent from every state.
    pub fn stop(&mut self) {
        if self.state == PipelineState::Stopped {
            return;
        }

        if let Some(mut ticker) = self.ticker.take() {
            ticker.stop();
        }
        // Never-started pipelines drop their source here instead.
        self.parts = None;

        // A frame published while we were tearing down is unread by
        // definition; drop it. Late publishes after this land in a
        // slot nobody reads, which is safe.
        _ = self.mailbox.take_if_available();

        self.state = PipelineState::Stopped;
        log::info!("Pipeline stopped.");
    }

    /// The surface-lifecycle teardown path. Converges with
    /// [stop](Self::stop).
    pub fn on_surface_destroyed(&mut self) {
        self.stop();
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.stop();
    }
}
