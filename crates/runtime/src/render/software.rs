use std::sync::Arc;

use pixels::{wgpu, Pixels, SurfaceTexture};
use pixel_novel::Canvas;
use winit::window::Window;

use super::backend::RenderBackend;
use crate::error::RuntimeError;

/// `pixels` surface holding the logical canvas. The scaling pass keeps whole
/// multiples with nearest-neighbor filtering and letterboxes the rest.
pub struct PixelsBackend {
    pixels: Pixels<'static>,
}

impl PixelsBackend {
    pub fn new(window: Arc<Window>, canvas: (u32, u32)) -> Result<Self, RuntimeError> {
        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width, size.height, window);
        let mut pixels = Pixels::new(canvas.0, canvas.1, surface)?;
        pixels.clear_color(wgpu::Color::BLACK);
        Ok(Self { pixels })
    }
}

impl RenderBackend for PixelsBackend {
    fn resize(&mut self, width: u32, height: u32) -> Result<(), RuntimeError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels.resize_surface(width, height)?;
        Ok(())
    }

    fn present(&mut self, frame: &Canvas) -> Result<(), RuntimeError> {
        let target = self.pixels.frame_mut();
        if target.len() == frame.as_bytes().len() {
            target.copy_from_slice(frame.as_bytes());
        }
        self.pixels.render()?;
        Ok(())
    }
}
