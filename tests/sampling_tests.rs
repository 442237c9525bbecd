use ecuplot::core::{
    EvalexprCompiler, Evaluator, ExpressionCompiler, SamplingParams, ScreenTransform, View,
    ViewBounds, Viewport, sample_curve, sample_step,
};

fn transform(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> ScreenTransform {
    let view = View::new(ViewBounds::new(xmin, xmax, ymin, ymax), true).expect("view");
    ScreenTransform::new(view, Viewport::new(600, 400)).expect("transform")
}

fn compiled(source: &str) -> Box<dyn Evaluator> {
    EvalexprCompiler.compile(source).expect("compile")
}

#[test]
fn step_matches_adaptive_rule() {
    let params = SamplingParams::default();
    let step = sample_step(20.0, 600.0, params);
    assert!((step - 20.0 / 450.0).abs() <= 1e-15);
    assert_eq!(sample_step(0.5, 600.0, params), 0.002);
}

#[test]
fn tangent_branches_are_not_connected_across_the_pole() {
    let transform = transform(0.0, 3.0, -4.0, 4.0);
    let evaluator = compiled("tan(x)");
    let params = SamplingParams::default();
    let paths = sample_curve(|x| evaluator.evaluate(x).ok(), transform, params);

    assert!(paths.len() >= 2, "expected a break at pi/2, got {}", paths.len());

    let pole = transform.x_to_screen(std::f64::consts::FRAC_PI_2);
    for path in &paths {
        for pair in path.windows(2) {
            let crosses = (pair[0].x - pole) * (pair[1].x - pole) < 0.0;
            assert!(!crosses, "segment crosses the pole at x = {pole}");
        }
    }

    let cutoff_px = 6.0 * 8.0 / transform.units_per_pixel().1;
    for path in &paths {
        for pair in path.windows(2) {
            assert!((pair[1].y - pair[0].y).abs() <= cutoff_px);
        }
    }
}

#[test]
fn reciprocal_splits_at_zero() {
    let transform = transform(-5.0, 5.0, -5.0, 5.0);
    let evaluator = compiled("1/x");
    let paths = sample_curve(
        |x| evaluator.evaluate(x).ok(),
        transform,
        SamplingParams::default(),
    );

    assert_eq!(paths.len(), 2);
    let zero = transform.x_to_screen(0.0);
    assert!(paths[0].iter().all(|p| p.x < zero));
    assert!(paths[1].iter().all(|p| p.x > zero));
}

#[test]
fn undefined_regions_are_skipped() {
    let transform = transform(-4.0, 4.0, -3.0, 3.0);
    let evaluator = compiled("sqrt(x)");
    let paths = sample_curve(
        |x| evaluator.evaluate(x).ok(),
        transform,
        SamplingParams::default(),
    );

    assert_eq!(paths.len(), 1);
    let zero = transform.x_to_screen(0.0);
    assert!(paths[0].iter().all(|p| p.x >= zero - 1e-9));
}
