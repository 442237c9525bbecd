use serde::{Deserialize, Serialize};

use crate::core::{Marker, View, Viewport};
use crate::interaction::{HoverCandidate, InteractionMode};

/// Read-only state snapshot passed to observer hooks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotContext {
    pub viewport: Viewport,
    pub view: View,
    pub expressions_len: usize,
    pub markers_len: usize,
    pub interaction_mode: InteractionMode,
    pub fullscreen: bool,
}

/// Event stream exposed to observers.
#[derive(Debug, Clone, PartialEq)]
pub enum PlotEvent {
    ExpressionsChanged { count: usize },
    ViewChanged(View),
    Hover(HoverCandidate),
    HoverEnded,
    MarkerPlaced(Marker),
    FullscreenChanged { active: bool },
    Resized(Viewport),
    Rendered,
}

/// Extension hook interface for host UI glue (tooltips, toasts, lists).
pub trait PlotObserver {
    fn id(&self) -> &str;
    fn on_event(&mut self, event: &PlotEvent, context: PlotContext);
}
