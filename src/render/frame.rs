use serde::{Deserialize, Serialize};

use crate::core::Viewport;
use crate::error::{PlotError, PlotResult};
use crate::render::{CirclePrimitive, Color, LinePrimitive, PolylinePrimitive, TextPrimitive};

/// Paint layers, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameLayerKind {
    Grid,
    Curves,
    Markers,
}

impl FrameLayerKind {
    pub const PAINT_ORDER: [Self; 3] = [Self::Grid, Self::Curves, Self::Markers];

    /// Identifier used for SVG groups.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::Curves => "curves",
            Self::Markers => "markers",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerPrimitives {
    pub kind: FrameLayerKind,
    pub lines: Vec<LinePrimitive>,
    pub polylines: Vec<PolylinePrimitive>,
    pub circles: Vec<CirclePrimitive>,
    pub texts: Vec<TextPrimitive>,
}

impl LayerPrimitives {
    #[must_use]
    pub fn empty(kind: FrameLayerKind) -> Self {
        Self {
            kind,
            lines: Vec::new(),
            polylines: Vec::new(),
            circles: Vec::new(),
            texts: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
            && self.polylines.is_empty()
            && self.circles.is_empty()
            && self.texts.is_empty()
    }
}

/// Backend-agnostic scene for one plot draw pass.
///
/// Layers are stored in paint order (grid, curves, markers); backends draw
/// them back to front without reordering.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub viewport: Viewport,
    pub background: Color,
    pub layers: Vec<LayerPrimitives>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(viewport: Viewport, background: Color) -> Self {
        Self {
            viewport,
            background,
            layers: FrameLayerKind::PAINT_ORDER
                .into_iter()
                .map(LayerPrimitives::empty)
                .collect(),
        }
    }

    #[must_use]
    pub fn layer(&self, kind: FrameLayerKind) -> Option<&LayerPrimitives> {
        self.layers.iter().find(|layer| layer.kind == kind)
    }

    fn layer_mut(&mut self, kind: FrameLayerKind) -> &mut LayerPrimitives {
        let index = match self.layers.iter().position(|layer| layer.kind == kind) {
            Some(index) => index,
            None => {
                self.layers.push(LayerPrimitives::empty(kind));
                self.layers.len() - 1
            }
        };
        &mut self.layers[index]
    }

    pub fn push_line(&mut self, kind: FrameLayerKind, line: LinePrimitive) {
        self.layer_mut(kind).lines.push(line);
    }

    pub fn push_polyline(&mut self, kind: FrameLayerKind, polyline: PolylinePrimitive) {
        self.layer_mut(kind).polylines.push(polyline);
    }

    pub fn push_circle(&mut self, kind: FrameLayerKind, circle: CirclePrimitive) {
        self.layer_mut(kind).circles.push(circle);
    }

    pub fn push_text(&mut self, kind: FrameLayerKind, text: TextPrimitive) {
        self.layer_mut(kind).texts.push(text);
    }

    pub fn validate(&self) -> PlotResult<()> {
        if !self.viewport.is_valid() {
            return Err(PlotError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        self.background.validate()?;

        for layer in &self.layers {
            for line in &layer.lines {
                line.validate()?;
            }
            for polyline in &layer.polylines {
                polyline.validate()?;
            }
            for circle in &layer.circles {
                circle.validate()?;
            }
            for text in &layer.texts {
                text.validate()?;
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(LayerPrimitives::is_empty)
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.lines.len()).sum()
    }

    #[must_use]
    pub fn polyline_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.polylines.len()).sum()
    }

    #[must_use]
    pub fn circle_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.circles.len()).sum()
    }

    #[must_use]
    pub fn text_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.texts.len()).sum()
    }
}
