use super::*;

#[test]
fn widget_starts_at_zero() {
    let state = MetricsState::at(Duration::ZERO);
    assert!(!state.loaded);
    assert_eq!(state.metrics, Sdg4Metrics::default());
    assert!(state.metrics.tiles().iter().all(|(v, _, _)| *v == 0));
}

#[test]
fn values_stay_zero_just_before_delay() {
    assert_eq!(MetricsState::at(LOAD_DELAY - Duration::from_millis(1)), MetricsState::default());
}

#[test]
fn fixed_values_appear_once_delay_elapses() {
    let state = MetricsState::at(LOAD_DELAY);
    assert!(state.loaded);
    let rendered: Vec<String> = state.metrics.tiles().iter().map(|(v, _, _)| format_percent(*v)).collect();
    assert_eq!(rendered, vec!["95%", "88%", "76%", "82%"]);
    assert_eq!(MetricsState::at(Duration::from_secs(60)), state);
}

#[test]
fn tiles_are_labelled_in_display_order() {
    let labels: Vec<&str> = Sdg4Metrics::CURRENT.tiles().iter().map(|(_, l, _)| *l).collect();
    assert_eq!(labels, vec!["Enrollment Rate", "Attendance", "Literacy Rate", "Completion Rate"]);
}

#[test]
fn metrics_match_server_payload_shape() {
    let json = r#"{"enrollment":95,"attendance":88,"literacy":76,"completion":82}"#;
    let parsed: Sdg4Metrics = serde_json::from_str(json).unwrap();
    assert_eq!(parsed, Sdg4Metrics::CURRENT);
}

#[test]
fn six_key_features_listed() {
    assert_eq!(KEY_FEATURES.len(), 6);
    assert!(KEY_FEATURES[2].contains("M-Pesa"));
}
