use ecuplot::ExpressionError;
use ecuplot::core::{
    DEFAULT_PALETTE, Marker, PlotModel, View, ViewBounds, WorldPoint, normalize_expression,
};

fn model_over(xmin: f64, xmax: f64) -> PlotModel {
    let view = View::new(ViewBounds::new(xmin, xmax, -5.0, 5.0), true).expect("view");
    PlotModel::new(view, 3)
}

fn marker_on(model: &PlotModel, index: usize, x: f64) -> Marker {
    let expression = &model.expressions()[index];
    let y = expression.value_at(x).expect("finite value");
    Marker::new(
        expression.id().clone(),
        expression.label(),
        expression.color(),
        WorldPoint::new(x, y),
    )
    .expect("marker")
}

#[test]
fn y_equals_input_is_normalized_to_function_label() {
    let mut model = PlotModel::default();
    let expression = model.add_expression("y = x^2").expect("add");

    assert_eq!(expression.label(), "f(x)=x^2");
    assert_eq!(expression.color(), DEFAULT_PALETTE[0]);
    assert_eq!(expression.color_index(), 0);
    assert!(expression.is_visible());
    assert_eq!(expression.value_at(3.0), Some(9.0));
}

#[test]
fn bare_body_and_named_lhs_are_kept_readable() {
    let bare = normalize_expression("  sin(X) ").expect("normalized");
    assert_eq!(bare.label, "f(x)=sin(x)");
    assert_eq!(bare.body, "sin(x)");

    let named = normalize_expression("g(x) = 2·x").expect("normalized");
    assert_eq!(named.label, "g(x)=2*x");

    assert!(normalize_expression("   ").is_none());
    assert!(normalize_expression("y = ").is_none());
}

#[test]
fn palette_cycles_and_restarts_after_clear() {
    let mut model = PlotModel::default();
    for i in 0..DEFAULT_PALETTE.len() + 1 {
        model.add_expression(&format!("x + {i}")).expect("add");
    }
    let colors: Vec<_> = model.expressions().iter().map(|e| e.color()).collect();
    assert_eq!(colors[DEFAULT_PALETTE.len()], DEFAULT_PALETTE[0]);
    assert_eq!(colors[1], DEFAULT_PALETTE[1]);

    model.clear_expressions();
    assert!(model.expressions().is_empty());
    let next = model.add_expression("x").expect("add");
    assert_eq!(next.color(), DEFAULT_PALETTE[0]);
}

#[test]
fn add_failures_carry_their_kind() {
    let mut model = PlotModel::default();

    let empty = model.add_expression("  ").expect_err("empty input");
    assert_eq!(empty, ExpressionError::Empty);
    assert_eq!(empty.kind(), "empty");

    for source in ["x +* 2", "x +", "x(x+1)"] {
        let compile = model.add_expression(source).expect_err("syntax error");
        assert_eq!(compile.kind(), "compile", "`{source}`");
    }

    let unknown = model.add_expression("x + t").expect_err("unknown variable");
    assert_eq!(unknown.kind(), "compile");

    assert!(model.expressions().is_empty());
}

#[test]
fn reciprocal_is_evaluable_away_from_its_pole() {
    let mut model = model_over(-5.0, 5.0);
    model.add_expression("1/x").expect("1/x has finite samples");
}

#[test]
fn sqrt_of_negative_constant_is_not_evaluable() {
    let mut model = model_over(-5.0, 5.0);
    let err = model.add_expression("sqrt(-1)").expect_err("no real value");
    assert_eq!(err, ExpressionError::NotEvaluable);
    assert!(!err.user_message().is_empty());
}

#[test]
fn marker_capacity_evicts_oldest_first() {
    let mut model = model_over(-5.0, 5.0);
    model.add_expression("x").expect("add");
    let limit = model.markers().limit();
    assert_eq!(limit, 3);

    for i in 0..=limit {
        let marker = marker_on(&model, 0, i as f64);
        model.add_marker(marker);
    }

    assert_eq!(model.markers().len(), limit);
    let xs: Vec<f64> = model.markers().iter().map(|m| m.point().x).collect();
    assert_eq!(xs, vec![3.0, 2.0, 1.0]);
}

#[test]
fn removing_expression_drops_its_markers_only() {
    let mut model = model_over(-5.0, 5.0);
    model.add_expression("x").expect("add");
    model.add_expression("2x").expect("add");
    let first = marker_on(&model, 0, 1.0);
    let second = marker_on(&model, 1, 1.0);
    let first_id = first.expr_id().clone();
    model.add_marker(first);
    model.add_marker(second);

    assert!(model.remove_expression(&first_id));
    assert!(!model.remove_expression(&first_id));
    assert_eq!(model.expressions().len(), 1);
    assert_eq!(model.markers().len(), 1);
    assert_eq!(model.markers().iter().next().map(|m| m.point().y), Some(2.0));
}

#[test]
fn clear_expressions_also_clears_markers() {
    let mut model = model_over(-5.0, 5.0);
    model.add_expression("x").expect("add");
    let marker = marker_on(&model, 0, 0.5);
    model.add_marker(marker);

    model.clear_expressions();
    assert!(model.markers().is_empty());
}

#[test]
fn hidden_expressions_are_skipped() {
    let mut model = model_over(-5.0, 5.0);
    let id = model.add_expression("x").expect("add").id().clone();
    model.add_expression("x^2").expect("add");

    assert!(model.set_expression_visible(&id, false));
    let visible: Vec<_> = model.visible_expressions().map(|e| e.label()).collect();
    assert_eq!(visible, vec!["f(x)=x^2"]);
}

#[test]
fn grid_flag_toggles_and_sets() {
    let mut model = PlotModel::default();
    assert!(model.view().grid_on());
    assert!(!model.toggle_grid());
    assert!(model.toggle_grid());
    assert!(!model.set_grid(false));
    assert!(!model.view().grid_on());
}

#[test]
fn view_operations_reject_degenerate_input() {
    let mut model = PlotModel::default();
    let before = model.view();
    assert!(
        model
            .set_view_bounds(ViewBounds::new(1.0, 1.0, 0.0, 1.0))
            .is_err()
    );
    assert!(model.pan_view(f64::NAN, 0.0).is_err());
    assert!(model.zoom_at(WorldPoint::new(0.0, 0.0), -1.0).is_err());
    assert_eq!(model.view(), before);

    let panned = model.pan_view(1.0, -2.0).expect("pan");
    assert_eq!(panned.xmin(), before.xmin() + 1.0);
    assert_eq!(panned.ymax(), before.ymax() - 2.0);
}
