use ordered_float::OrderedFloat;

use crate::core::{Expression, PlotModel, ScreenPoint, ScreenTransform, WorldPoint};
use crate::interaction::HoverCandidate;

/// Curve point matched by a pointer hit test.
#[derive(Debug, Clone, Copy)]
pub struct CurveHit<'a> {
    pub expression: &'a Expression,
    pub point: WorldPoint,
    /// Distance from the pointer in device pixels.
    pub distance_px: f64,
}

/// Nearest visible curve along y at the cursor's world x.
///
/// Candidates farther than `tolerance_px` (converted to world y) are
/// rejected, so leaving every curve ends the hover.
#[must_use]
pub fn hover_candidate(
    model: &PlotModel,
    transform: ScreenTransform,
    cursor: ScreenPoint,
    tolerance_px: f64,
) -> Option<HoverCandidate> {
    let world = transform.screen_to_world(cursor);
    let (_, units_y) = transform.units_per_pixel();
    let tolerance_world = tolerance_px * units_y;

    model
        .visible_expressions()
        .filter_map(|expression| {
            let y = expression.value_at(world.x)?;
            Some((expression, y, (y - world.y).abs()))
        })
        .filter(|(_, _, distance)| *distance <= tolerance_world)
        .min_by_key(|(_, _, distance)| OrderedFloat(*distance))
        .map(|(expression, y, _)| HoverCandidate {
            expr_id: expression.id().clone(),
            label: expression.label().to_owned(),
            color: expression.color(),
            point: WorldPoint::new(world.x, y),
        })
}

/// Closest visible curve to a click, by Euclidean pixel distance.
///
/// Accepts the match only within `tolerance_px`.
#[must_use]
pub fn click_hit(
    model: &PlotModel,
    transform: ScreenTransform,
    click: ScreenPoint,
    tolerance_px: f64,
) -> Option<CurveHit<'_>> {
    let world_x = transform.screen_to_world(click).x;

    model
        .visible_expressions()
        .filter_map(|expression| {
            let y = expression.value_at(world_x)?;
            let point = WorldPoint::new(world_x, y);
            let distance_px = transform.world_to_screen(point).distance_to(click);
            Some(CurveHit {
                expression,
                point,
                distance_px,
            })
        })
        .min_by_key(|hit| OrderedFloat(hit.distance_px))
        .filter(|hit| hit.distance_px <= tolerance_px)
}
