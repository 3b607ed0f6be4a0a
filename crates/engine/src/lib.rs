//! The render half of the frame relay: a winit window, a wgpu surface,
//! and a render-on-demand pass that paints the newest mailbox frame on
//! a full-screen quad.

pub mod app;
pub mod errors;
pub mod state;
pub mod uploader;

pub use app::{RelayApp, RelayEvent, run};
pub use errors::EngineError;
pub use state::SurfaceState;
pub use uploader::TextureUploader;
