use serde::{Deserialize, Serialize};

use crate::core::transform::ScreenTransform;
use crate::core::types::{ScreenPoint, WorldPoint};

const STEP_FLOOR: f64 = 0.001;

/// Tuning for curve sampling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    /// Samples per device pixel are at most `1 / pixel_density`.
    pub pixel_density: f64,
    /// Smallest world-x step, bounding the sample count when zoomed in.
    pub min_step: f64,
    /// A sample farther than `factor * view height` from zero, or from the
    /// previous sample, breaks the current path.
    pub discontinuity_factor: f64,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            pixel_density: 0.75,
            min_step: 0.002,
            discontinuity_factor: 6.0,
        }
    }
}

/// World-x distance between consecutive samples for the given view width.
#[must_use]
pub fn sample_step(x_span: f64, width_px: f64, params: SamplingParams) -> f64 {
    let adaptive = x_span / (width_px * params.pixel_density);
    let adaptive = if adaptive.is_finite() { adaptive } else { 0.0 };
    STEP_FLOOR.max(adaptive).max(params.min_step)
}

/// Samples `evaluate` across the transform's view and returns screen-space
/// subpaths.
///
/// A sample with no value, a value beyond the cutoff, or a jump larger than
/// the cutoff relative to the previous sample ends the current subpath.
/// Subpaths with fewer than two points are dropped since they draw nothing.
pub fn sample_curve<F>(
    mut evaluate: F,
    transform: ScreenTransform,
    params: SamplingParams,
) -> Vec<Vec<ScreenPoint>>
where
    F: FnMut(f64) -> Option<f64>,
{
    let view = transform.view();
    let step = sample_step(view.x_span(), transform.width(), params);
    let cutoff = params.discontinuity_factor * view.y_span();
    let count = (view.x_span() / step).ceil() as usize;

    let mut paths = Vec::new();
    let mut current: Vec<ScreenPoint> = Vec::new();
    let mut previous_y: Option<f64> = None;

    for index in 0..=count {
        let x = (view.xmin() + index as f64 * step).min(view.xmax());
        let sample = evaluate(x).filter(|y| y.is_finite() && y.abs() <= cutoff);
        let Some(y) = sample else {
            flush_path(&mut current, &mut paths);
            previous_y = None;
            continue;
        };
        if previous_y.is_some_and(|prev| (y - prev).abs() > cutoff) {
            flush_path(&mut current, &mut paths);
        }
        current.push(transform.world_to_screen(WorldPoint::new(x, y)));
        previous_y = Some(y);
    }
    flush_path(&mut current, &mut paths);
    paths
}

fn flush_path(current: &mut Vec<ScreenPoint>, paths: &mut Vec<Vec<ScreenPoint>>) {
    if current.len() >= 2 {
        paths.push(std::mem::take(current));
    } else {
        current.clear();
    }
}

/// `count` evenly spaced x values across `[xmin, xmax]`, both ends included.
#[must_use]
pub fn probe_positions(xmin: f64, xmax: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![0.5 * (xmin + xmax)],
        _ => {
            let step = (xmax - xmin) / (count - 1) as f64;
            (0..count).map(|i| xmin + i as f64 * step).collect()
        }
    }
}
