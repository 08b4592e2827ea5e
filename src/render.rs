pub(crate) mod cpu;

use crate::{
    foundation::{core::Canvas, error::SketchResult},
    sketch::draw::DrawList,
};

#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at `(x, y)` as stored, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Turns a tick's draw list into pixels.
pub trait RenderBackend {
    fn render_draw_list(&mut self, canvas: Canvas, list: &DrawList) -> SketchResult<FrameRGBA>;
}

#[derive(Clone, Debug, Default)]
pub struct RenderSettings {
    /// Straight-alpha fill applied before the first command. Transparent when `None`.
    pub clear_rgba: Option<[u8; 4]>,
    /// Flattening tolerance for stroke outlines, in pixels.
    pub tolerance: Option<f64>,
}
