use crate::error::PlotResult;
use crate::render::{RenderFrame, Renderer};

/// No-op renderer used by tests and headless engine usage.
///
/// It still validates frame content so tests can catch invalid geometry
/// without a drawing backend.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames_rendered: usize,
    pub last_line_count: usize,
    pub last_polyline_count: usize,
    pub last_circle_count: usize,
    pub last_text_count: usize,
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &RenderFrame) -> PlotResult<()> {
        frame.validate()?;
        self.frames_rendered += 1;
        self.last_line_count = frame.line_count();
        self.last_polyline_count = frame.polyline_count();
        self.last_circle_count = frame.circle_count();
        self.last_text_count = frame.text_count();
        Ok(())
    }
}
