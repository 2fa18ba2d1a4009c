pub mod backend;
pub mod software;

pub use backend::RenderBackend;
pub use software::PixelsBackend;
