use super::*;

const LIMIT: usize = 3;
const WINDOW: Duration = Duration::from_secs(60);

#[test]
fn allows_up_to_limit_then_rejects() {
    let rl = LoginRateLimiter::new(LIMIT, WINDOW);
    let now = Instant::now();

    for i in 0..LIMIT {
        assert!(rl.check_and_record_at("a@school.ke", now).is_ok(), "attempt {i} should succeed");
    }
    assert_eq!(
        rl.check_and_record_at("a@school.ke", now),
        Err(RateLimitError { limit: LIMIT, window_secs: 60 })
    );
}

#[test]
fn keys_are_independent() {
    let rl = LoginRateLimiter::new(1, WINDOW);
    let now = Instant::now();
    assert!(rl.check_and_record_at("a@school.ke", now).is_ok());
    assert!(rl.check_and_record_at("b@school.ke", now).is_ok());
    assert!(rl.check_and_record_at("a@school.ke", now).is_err());
}

#[test]
fn window_expiry_restores_quota() {
    let rl = LoginRateLimiter::new(1, WINDOW);
    let start = Instant::now();
    assert!(rl.check_and_record_at("a@school.ke", start).is_ok());
    assert!(rl.check_and_record_at("a@school.ke", start + Duration::from_secs(30)).is_err());
    assert!(rl.check_and_record_at("a@school.ke", start + Duration::from_secs(61)).is_ok());
}

#[test]
fn idle_keys_are_evicted() {
    let rl = LoginRateLimiter::new(LIMIT, WINDOW);
    let start = Instant::now();
    rl.check_and_record_at("a@school.ke", start).unwrap();
    rl.check_and_record_at("b@school.ke", start).unwrap();
    assert_eq!(rl.tracked_keys(), 2);

    rl.check_and_record_at("c@school.ke", start + Duration::from_secs(120)).unwrap();
    assert_eq!(rl.tracked_keys(), 1);
}

#[test]
fn clones_share_counters() {
    let rl = LoginRateLimiter::new(1, WINDOW);
    let clone = rl.clone();
    let now = Instant::now();
    assert!(rl.check_and_record_at("a@school.ke", now).is_ok());
    assert!(clone.check_and_record_at("a@school.ke", now).is_err());
}
