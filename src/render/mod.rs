mod frame;
mod null_renderer;
mod primitives;
mod svg;

pub use frame::{FrameLayerKind, LayerPrimitives, RenderFrame};
pub use null_renderer::NullRenderer;
pub use primitives::{
    CirclePrimitive, Color, LinePrimitive, PolylinePrimitive, TextHAlign, TextPrimitive,
};
pub use svg::{SvgRenderer, XML_DECLARATION, ensure_xml_declaration};

use crate::core::Viewport;
use crate::error::PlotResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully materialized, deterministic `RenderFrame` so
/// drawing code remains isolated from plot state and interaction logic.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> PlotResult<()>;

    /// Called when the device-pixel size of the drawing surface changes.
    fn resize(&mut self, _viewport: Viewport) -> PlotResult<()> {
        Ok(())
    }
}

/// Backends holding a raster surface that can be snapshotted as PNG.
pub trait RasterSnapshot {
    /// PNG bytes of the last rendered frame.
    fn snapshot_png(&self) -> PlotResult<Vec<u8>>;
}

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::{CairoContextRenderer, CairoRenderStats, CairoRenderer};
