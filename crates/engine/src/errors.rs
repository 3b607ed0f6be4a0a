use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    // Upload errors
    #[error("Upload failed: texture not initialized")]
    TextureNotInitialized,

    #[error("Upload failed: data size mismatch (expected {expected} bytes, got {actual} bytes)")]
    DataSizeMismatch { expected: usize, actual: usize },

    // Device/surface setup errors
    #[error("Failed to request GPU adapter")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),

    #[error("Failed to request GPU device")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("Failed to create render surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
}
