use chrono::{NaiveDate, Utc};
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current time in milliseconds since UNIX epoch
pub fn current_time_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}

/// Returns the current UTC calendar date, the granularity of the price history
pub fn current_date() -> NaiveDate {
    Utc::now().date_naive()
}
