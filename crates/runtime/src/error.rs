use thiserror::Error;

/// Startup failures. Once the window is up nothing here is raised again.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("pixel surface error: {0}")]
    Surface(#[from] pixels::Error),
    #[error("pixel surface resize failed: {0}")]
    Texture(#[from] pixels::TextureError),
    #[error("audio output unavailable: {0}")]
    Audio(String),
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("scene data error: {0}")]
    Story(#[from] pixel_novel::PnError),
    #[error("asset error: {0}")]
    Asset(#[from] pixel_novel_assets::AssetError),
}
