//! Host-facing hooks.
//!
//! Observers replace DOM callbacks: they see engine events without being
//! able to mutate plot state directly.

pub mod observers;

pub use observers::{PlotContext, PlotEvent, PlotObserver};
