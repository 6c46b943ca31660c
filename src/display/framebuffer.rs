// Frame Buffer - RGBA video sink
//
// Collects the pixels the scheduler delivers into a 256×240 RGBA image and
// keeps the last presented frame, so a front end can upload it as a
// texture and tests can inspect it.

use super::{Rgb, VideoSink};

/// NES screen width in pixels
pub const SCREEN_WIDTH: usize = 256;

/// NES screen height in pixels
pub const SCREEN_HEIGHT: usize = 240;

/// Total number of pixels in the frame buffer
pub const SCREEN_SIZE: usize = SCREEN_WIDTH * SCREEN_HEIGHT;

/// RGBA frame buffer implementing [`VideoSink`]
///
/// Pixels are drawn into a back buffer; `present_frame` copies it to the
/// front buffer returned by [`FrameBuffer::as_rgba`].
pub struct FrameBuffer {
    back: Vec<u8>,
    front: Vec<u8>,
    frames_presented: u64,
}

impl FrameBuffer {
    /// Create a frame buffer cleared to opaque black
    pub fn new() -> Self {
        let black = Rgb::default().to_rgba();
        let pixels: Vec<u8> = black.iter().copied().cycle().take(SCREEN_SIZE * 4).collect();
        Self {
            back: pixels.clone(),
            front: pixels,
            frames_presented: 0,
        }
    }

    /// Colour of a pixel in the last presented frame
    ///
    /// # Returns
    /// `None` when the coordinates are off screen
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            return None;
        }
        let offset = (y * SCREEN_WIDTH + x) * 4;
        Some(Rgb::new(self.front[offset], self.front[offset + 1], self.front[offset + 2]))
    }

    /// Last presented frame as RGBA bytes, row-major
    pub fn as_rgba(&self) -> &[u8] {
        &self.front
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }
}

impl VideoSink for FrameBuffer {
    fn draw_pixel(&mut self, x: usize, y: usize, color: Rgb) {
        if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            return;
        }
        let offset = (y * SCREEN_WIDTH + x) * 4;
        self.back[offset..offset + 4].copy_from_slice(&color.to_rgba());
    }

    fn present_frame(&mut self) {
        self.front.copy_from_slice(&self.back);
        self.frames_presented += 1;
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
