use pixel_novel::Canvas;

use crate::error::RuntimeError;

/// Presents composed frames on a surface.
pub trait RenderBackend {
    /// Resizes the window surface; the logical canvas size never changes.
    fn resize(&mut self, width: u32, height: u32) -> Result<(), RuntimeError>;

    /// Copies `frame` to the surface and presents it.
    fn present(&mut self, frame: &Canvas) -> Result<(), RuntimeError>;
}
