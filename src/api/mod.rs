//! Host-facing engine API: configuration, scene building, interaction,
//! surface lifecycle and export.

mod engine;
mod engine_config;
mod export;
mod hit_test;
#[cfg(feature = "http-client")]
mod http_transport;
mod interaction_controller;
mod persistence;
mod render_scheduler;
mod render_style;
mod scene_builder;
mod surface;

pub use engine::PlotterEngine;
pub use engine_config::PlotterConfig;
pub use export::{ExportFormat, PngExport, SvgExport, export_file_name};
pub use hit_test::{CurveHit, click_hit, hover_candidate};
#[cfg(feature = "http-client")]
pub use http_transport::ReqwestHistoryTransport;
pub use persistence::ExpressionSink;
pub use render_scheduler::{FrameRequestId, RenderScheduler};
pub use render_style::PlotStyle;
pub use scene_builder::{SceneParams, build_plot_frame};
pub use surface::{
    CanvasSurface, FULLSCREEN_CONTAINER_CLASS, FullscreenSession, ResizeDebouncer, ResizeSource,
    SCROLL_LOCK_BODY_CLASS,
};
