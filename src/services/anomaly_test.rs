use super::*;

#[test]
fn short_series_is_never_flagged() {
    assert_eq!(detect_attendance_anomalies(&[]), Vec::<bool>::new());
    assert_eq!(detect_attendance_anomalies(&[0.0, 100.0, 0.0, 100.0]), vec![false; 4]);
}

#[test]
fn constant_series_has_no_anomalies() {
    assert_eq!(detect_attendance_anomalies(&[0.9; 8]), vec![false; 8]);
}

#[test]
fn single_dip_is_flagged() {
    let rates = [0.95, 0.94, 0.96, 0.95, 0.93, 0.95, 0.96, 0.94, 0.95, 0.20];
    let flags = detect_attendance_anomalies(&rates);
    assert_eq!(flags.len(), rates.len());
    assert!(flags[9]);
    assert!(flags[..9].iter().all(|f| !f));
}

#[test]
fn moderate_spread_is_not_flagged() {
    let rates = [0.80, 0.85, 0.90, 0.95, 1.00];
    assert_eq!(detect_attendance_anomalies(&rates), vec![false; 5]);
}

#[test]
fn two_sigma_bound_is_strict() {
    // mean 2.0, population std 2.0, limit 4.0; 6.0 deviates by exactly 4.0.
    let rates = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 6.0, 6.0];
    let flags = detect_attendance_anomalies(&rates);
    assert_eq!(flags, vec![false; 10]);

    let rates = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 11.0];
    let flags = detect_attendance_anomalies(&rates);
    assert!(flags[9]);
}
