//! Unit tests for crossing detection

use atralert::models::signal::Direction;
use atralert::models::strategy::ConfirmationDepth;
use atralert::signals::crossing::{detect_crossing, CrossingDetector};

fn flat(value: f64, len: usize) -> Vec<f64> {
    vec![value; len]
}

#[test]
fn test_scenario_a_confirmed_up_cross() {
    let closes = [9.0, 9.0, 11.0, 12.0];
    let line = flat(10.0, 4);

    for depth in [ConfirmationDepth::TwoBar, ConfirmationDepth::ThreeBar] {
        let event = detect_crossing(&closes, &line, 4, depth);
        assert_eq!(event.direction, Direction::Up);
        assert!(event.confirmed, "depth {:?}", depth);
        assert_eq!(event.price, 12.0);
        assert_eq!(event.reference, 10.0);
    }
}

#[test]
fn test_confirmed_down_cross() {
    let event = detect_crossing(
        &[11.0, 11.0, 9.0, 8.0],
        &flat(10.0, 4),
        4,
        ConfirmationDepth::ThreeBar,
    );
    assert_eq!(event.direction, Direction::Down);
    assert!(event.confirmed);
}

#[test]
fn test_cross_on_last_bar_depends_on_depth() {
    let closes = [9.0, 9.0, 9.0, 11.0];
    let line = flat(10.0, 4);

    let two = detect_crossing(&closes, &line, 4, ConfirmationDepth::TwoBar);
    assert_eq!(two.direction, Direction::Up);
    assert!(two.confirmed);

    let three = detect_crossing(&closes, &line, 4, ConfirmationDepth::ThreeBar);
    assert_eq!(three.direction, Direction::Up);
    assert!(!three.confirmed);
    assert!(three.is_tentative());
    assert_eq!(three.confirmed_direction(), Direction::Neutral);
}

#[test]
fn test_whipsaw_reports_most_recent_cross() {
    let closes = [9.0, 11.0, 9.0, 11.0];
    let line = flat(10.0, 4);

    let three = detect_crossing(&closes, &line, 4, ConfirmationDepth::ThreeBar);
    assert_eq!(three.direction, Direction::Up);
    assert!(!three.confirmed);

    let two = detect_crossing(&closes, &line, 4, ConfirmationDepth::TwoBar);
    assert!(two.confirmed);
}

#[test]
fn test_no_cross_when_always_above() {
    let event = detect_crossing(
        &[11.0, 12.0, 13.0, 14.0],
        &flat(10.0, 4),
        4,
        ConfirmationDepth::TwoBar,
    );
    assert_eq!(event.direction, Direction::Neutral);
    assert!(!event.confirmed);
}

#[test]
fn test_cross_outside_window_is_ignored() {
    let event = detect_crossing(
        &[9.0, 11.0, 12.0, 13.0, 14.0],
        &flat(10.0, 5),
        4,
        ConfirmationDepth::TwoBar,
    );
    assert_eq!(event.direction, Direction::Neutral);
}

#[test]
fn test_touching_the_line_is_not_a_cross() {
    let line = flat(10.0, 4);

    // Pre-cross bar sits exactly on the line
    let event = detect_crossing(&[9.0, 10.0, 11.0, 12.0], &line, 4, ConfirmationDepth::TwoBar);
    assert_eq!(event.direction, Direction::Neutral);

    // Last bar on the line
    let event = detect_crossing(&[9.0, 9.0, 11.0, 10.0], &line, 4, ConfirmationDepth::TwoBar);
    assert_eq!(event.direction, Direction::Neutral);
}

#[test]
fn test_dip_back_through_line_breaks_confirmation() {
    // Crossed up, dipped below, crossed up again on the last bar
    let event = detect_crossing(
        &[9.0, 11.0, 9.5, 11.0],
        &flat(10.0, 4),
        4,
        ConfirmationDepth::ThreeBar,
    );
    assert_eq!(event.direction, Direction::Up);
    assert!(!event.confirmed);
}

#[test]
fn test_short_series_is_neutral() {
    let event = detect_crossing(&[9.0, 11.0, 12.0], &flat(10.0, 3), 4, ConfirmationDepth::TwoBar);
    assert_eq!(event.direction, Direction::Neutral);
    assert_eq!(event.price, 12.0);
}

#[test]
fn test_non_finite_reference_is_neutral() {
    let line = [f64::NAN, 10.0, 10.0, 10.0];
    let event = detect_crossing(&[9.0, 9.0, 11.0, 12.0], &line, 4, ConfirmationDepth::TwoBar);
    assert_eq!(event.direction, Direction::Neutral);
    assert!(!event.confirmed);
}

#[test]
fn test_window_below_two_never_fires() {
    let event = detect_crossing(&[9.0, 11.0], &flat(10.0, 2), 1, ConfirmationDepth::TwoBar);
    assert_eq!(event.direction, Direction::Neutral);
}

#[test]
fn test_series_aligned_on_last_element() {
    // Longer close history than reference line
    let closes = [1.0, 2.0, 3.0, 9.0, 9.0, 11.0, 12.0];
    let detector = CrossingDetector::new(4, ConfirmationDepth::ThreeBar);
    assert_eq!(detector.window_bars(), 4);
    assert_eq!(detector.depth(), ConfirmationDepth::ThreeBar);

    let event = detector.detect(&closes, &flat(10.0, 4));
    assert_eq!(event.direction, Direction::Up);
    assert!(event.confirmed);
}

#[test]
fn test_moving_reference_line() {
    // Close rises through a falling line
    let closes = [10.0, 10.5, 11.0, 11.5];
    let line = [12.0, 11.0, 10.5, 10.0];
    let event = detect_crossing(&closes, &line, 4, ConfirmationDepth::ThreeBar);
    assert_eq!(event.direction, Direction::Up);
    assert!(event.confirmed);
    assert_eq!(event.reference, 10.0);
}
