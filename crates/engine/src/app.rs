use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    keyboard::PhysicalKey,
    window::WindowAttributes,
};

use relay::{FrameMailbox, Pipeline, RenderNotifier};

use crate::state::SurfaceState;

/// Events the capture side injects into the winit event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayEvent {
    /// The ticker published a new frame; a redraw should consume it.
    FrameReady,
}

/// Backs [RenderNotifier] with the event-loop proxy, which winit
/// guarantees is callable from any thread (the capture worker calls
/// this).
struct ProxyNotifier(EventLoopProxy<RelayEvent>);

impl RenderNotifier for ProxyNotifier {
    fn request_render(&self) {
        // Failure means the event loop is gone; the frame just goes
        // unrendered, which is the latest-wins policy anyway.
        _ = self.0.send_event(RelayEvent::FrameReady);
    }
}

pub struct RelayApp {
    state: Option<SurfaceState>,
    pipeline: Pipeline,
    mailbox: Arc<FrameMailbox>,
    proxy: EventLoopProxy<RelayEvent>,
}

impl RelayApp {
    pub fn new(pipeline: Pipeline, proxy: EventLoopProxy<RelayEvent>) -> Self {
        let mailbox = pipeline.mailbox();
        Self {
            state: None,
            pipeline,
            mailbox,
            proxy,
        }
    }
}

impl ApplicationHandler<RelayEvent> for RelayApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // Only initialize once; guard against spurious resume events
        if self.state.is_some() {
            return;
        }

        let window = Arc::new(
            event_loop
                .create_window(WindowAttributes::default().with_title("frame relay"))
                .expect("failed to create window"),
        );
        let size = window.inner_size();

        let mut state =
            pollster::block_on(SurfaceState::new(window)).expect("failed to initialize GPU state");
        state.resize(size.width, size.height);
        self.state = Some(state);

        // The surface exists now, so the pipeline may go active.
        let notifier = Arc::new(ProxyNotifier(self.proxy.clone()));
        if let Err(err) = self.pipeline.start(notifier) {
            log::error!("Pipeline failed to start: {err}");
            event_loop.exit();
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: RelayEvent) {
        match event {
            RelayEvent::FrameReady => {
                if let Some(state) = self.state.as_ref() {
                    state.window.request_redraw();
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.pipeline.stop();
                event_loop.exit();
            }

            WindowEvent::Destroyed => {
                self.pipeline.on_surface_destroyed();
            }

            WindowEvent::Resized(size) => {
                if let Some(state) = self.state.as_mut() {
                    state.resize(size.width, size.height);
                }
            }

            WindowEvent::RedrawRequested => {
                let Some(state) = self.state.as_mut() else {
                    return;
                };

                match state.redraw(&self.mailbox) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        state.reconfigure();
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Surface out of memory.");
                        self.pipeline.stop();
                        event_loop.exit();
                    }
                    // Transient; the previous texture is retained and
                    // the next requested pass will try again.
                    Err(err) => log::warn!("Render pass skipped: {err}"),
                }
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                let Some(state) = self.state.as_mut() else {
                    return;
                };
                state.handle_key(event_loop, code, key_state.is_pressed())
            }
            _ => {}
        }
    }
}

/// Build the event loop, wire the pipeline into a [RelayApp], and run
/// until the window closes.
pub fn run(pipeline: Pipeline) -> anyhow::Result<()> {
    let event_loop = EventLoop::<RelayEvent>::with_user_event().build()?;
    let proxy = event_loop.create_proxy();

    let mut app = RelayApp::new(pipeline, proxy);
    event_loop.run_app(&mut app)?;
    Ok(())
}
