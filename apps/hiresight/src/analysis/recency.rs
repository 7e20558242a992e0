use chrono::{DateTime, Datelike, Utc};

const AVG_DAYS_PER_MONTH: f64 = 30.436_875;

/// Fractional months from `start` to `end`; 0.0 when `start` is later.
pub fn months_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let seconds = (end - start).num_seconds() as f64;
    (seconds / (AVG_DAYS_PER_MONTH * 86_400.0)).max(0.0)
}

/// 1.0 at `reference`, decaying linearly to 0.0 at `window_months` back.
/// Never increases as `at` moves further into the past.
pub fn linear_recency(at: DateTime<Utc>, reference: DateTime<Utc>, window_months: f64) -> f64 {
    if window_months <= 0.0 {
        return 0.0;
    }
    (1.0 - months_between(at, reference) / window_months).clamp(0.0, 1.0)
}

/// Calendar month bucket, e.g. 2024-03 → 24291.
pub fn month_index(at: DateTime<Utc>) -> i32 {
    at.year() * 12 + at.month0() as i32
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
