use crate::utils::{current_date, current_time_millis};

#[test]
fn test_current_time_millis_is_monotonic_enough() {
    let first = current_time_millis();
    let second = current_time_millis();
    assert!(second >= first);
}

#[test]
fn test_current_time_millis_is_past_2020() {
    // 2020-01-01T00:00:00Z in milliseconds
    assert!(current_time_millis() > 1_577_836_800_000);
}

#[test]
fn test_current_date_matches_millis_epoch_day() {
    let date = current_date();
    let days_since_epoch = (current_time_millis() / 86_400_000) as i64;
    let num_days = date
        .signed_duration_since(chrono::NaiveDate::from_ymd_opt(1970, 1, 1).unwrap())
        .num_days();
    // The two clocks are read back to back; allow the midnight edge.
    assert!((num_days - days_since_epoch).abs() <= 1);
}
