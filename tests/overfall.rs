use flowcalc_lib::{overfall, CalculationError, LevelSeries, Unit};

#[test]
fn no_flow_below_the_crest() {
    let level = LevelSeries::from_values(vec![0.1]);
    let flow = overfall(&level, 0.2, 0.5, Unit::CubicMetersPerSecond).expect("overfall calc");
    assert_eq!(flow.values(), &[Some(0.0)]);
}

#[test]
fn reference_value_in_liters_per_second() {
    let level = LevelSeries::from_values(vec![0.5]);
    let flow = overfall(&level, 0.3, 0.4, Unit::LitersPerSecond).expect("overfall calc");
    let expected = 1000.0
        * (0.602 + 0.083 * 0.2 / 0.3)
        * (2.0 / 3.0)
        * (2.0 * 9.81_f64).sqrt()
        * 0.4
        * 0.2_f64.powf(1.5);
    let got = flow.values()[0].expect("present");
    assert!(
        (got - expected).abs() < 1e-9 * expected,
        "got={} expected={}",
        got,
        expected
    );
}

#[test]
fn flow_is_monotonic_in_level() {
    let levels: Vec<f64> = (0..200).map(|i| i as f64 * 0.01).collect();
    let flow = overfall(
        &LevelSeries::from_values(levels),
        0.4,
        0.8,
        Unit::CubicMetersPerSecond,
    )
    .expect("overfall calc");
    let values = flow.present_values();
    assert_eq!(values.len(), 200);
    for pair in values.windows(2) {
        assert!(pair[1] >= pair[0], "{} then {}", pair[0], pair[1]);
    }
}

#[test]
fn degenerate_samples_become_zero_and_length_is_kept() {
    let level = LevelSeries::from_values(vec![f64::NAN, -0.5, 0.7]);
    let flow = overfall(&level, 0.3, 0.4, Unit::LitersPerSecond).expect("overfall calc");
    assert_eq!(flow.len(), 3);
    assert_eq!(flow.values()[0], Some(0.0));
    assert_eq!(flow.values()[1], Some(0.0));
    assert!(flow.values()[2].expect("present") > 0.0);
    assert_eq!(flow.missing_count(), 0);
}

#[test]
fn out_of_range_inputs_still_compute() {
    let level = LevelSeries::from_values(vec![0.1, 2.0]);
    let flow = overfall(&level, 0.1, 0.1, Unit::CubicMetersPerSecond).expect("overfall calc");
    assert_eq!(flow.len(), 2);
}

#[test]
fn invalid_weir_dimensions_fail_before_computing() {
    let level = LevelSeries::from_values(vec![0.5]);
    let result = overfall(&level, 0.0, 0.4, Unit::LitersPerSecond);
    assert!(matches!(result, Err(CalculationError::InvalidParameter(_))));
    let result = overfall(&level, 0.3, f64::NAN, Unit::LitersPerSecond);
    assert!(matches!(result, Err(CalculationError::InvalidParameter(_))));
}
