// Display module - Video output collaborator interface
//
// This module provides:
// - NES color palette (64 entries, 52 unique colors)
// - The `VideoSink` trait the scheduler pushes rendered pixels into
// - Frame buffer sink (256×240 RGBA) and a sink that discards output
//
// Presenting frames on screen is left to whoever implements `VideoSink`.

pub mod framebuffer;
pub mod palette;

pub use framebuffer::{FrameBuffer, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use palette::{palette_to_rgb, NES_PALETTE};

use serde::{Deserialize, Serialize};

/// A display colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Unpack a 0xRRGGBB value
    pub const fn from_u32(rgb: u32) -> Self {
        Rgb {
            r: (rgb >> 16) as u8,
            g: (rgb >> 8) as u8,
            b: rgb as u8,
        }
    }

    /// [R, G, B, A] bytes, fully opaque
    pub const fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 0xFF]
    }
}

/// Consumer of rendered video
///
/// The scheduler calls `draw_pixel` for every delivered pixel of a visible
/// line, then `present_frame` once per frame at the post-render line.
pub trait VideoSink {
    /// Receive one pixel
    ///
    /// # Arguments
    /// * `x` - Column (0-255)
    /// * `y` - Line (0-239)
    /// * `color` - Colour from the system palette
    fn draw_pixel(&mut self, x: usize, y: usize, color: Rgb);

    /// The frame is complete
    fn present_frame(&mut self);
}

/// Sink that drops all output (headless runs and tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl VideoSink for NullSink {
    fn draw_pixel(&mut self, _x: usize, _y: usize, _color: Rgb) {}

    fn present_frame(&mut self) {}
}
