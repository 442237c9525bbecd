use smallvec::SmallVec;

/// Upper bound of grid lines emitted per axis, whatever the span.
pub const MAX_TICKS_PER_AXIS: usize = 256;

pub type TickValues = SmallVec<[f64; 32]>;

/// Human-friendly grid spacing for `span`, snapped to `{1, 2, 5, 10} x 10^k`.
///
/// Targets roughly ten intervals across the span. Non-finite or non-positive
/// spans fall back to `1.0`.
#[must_use]
pub fn nice_step(span: f64) -> f64 {
    if !span.is_finite() || span <= 0.0 {
        return 1.0;
    }
    let raw = span / 10.0;
    let magnitude = 10_f64.powf(raw.log10().floor());
    let mantissa = raw / magnitude;
    let snapped = if mantissa < 1.5 {
        1.0
    } else if mantissa < 3.5 {
        2.0
    } else if mantissa < 7.5 {
        5.0
    } else {
        10.0
    };
    snapped * magnitude
}

/// Multiples of `step` inside `[min, max]`, ascending.
///
/// Values are computed as `k * step` so the zero line is exactly `0.0`.
#[must_use]
pub fn tick_values(min: f64, max: f64, step: f64) -> TickValues {
    let mut ticks = TickValues::new();
    if !min.is_finite() || !max.is_finite() || !step.is_finite() || step <= 0.0 || max < min {
        return ticks;
    }
    let first = (min / step).ceil();
    let last = (max / step).floor();
    if !first.is_finite() || !last.is_finite() {
        return ticks;
    }
    let mut k = first;
    while k <= last && ticks.len() < MAX_TICKS_PER_AXIS {
        ticks.push(k * step);
        k += 1.0;
    }
    ticks
}

/// Formats a tick value with precision chosen by magnitude.
#[must_use]
pub fn format_tick_label(value: f64) -> String {
    if value == 0.0 {
        return "0".to_owned();
    }
    let abs = value.abs();
    if abs >= 1000.0 || abs < 0.01 {
        format!("{value:.0e}")
    } else if abs < 1.0 {
        format!("{value:.2}")
    } else if abs < 10.0 {
        format!("{value:.1}")
    } else {
        format!("{value:.0}")
    }
}
