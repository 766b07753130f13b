//! Temporal bucketing for windowed compression.
//!
//! A larger observation set is partitioned into fixed-size day windows
//! before the filter/cluster/summarize pipeline runs on each window
//! independently. Window boundaries are anchored to the calendar day of
//! month, not to a rolling origin; shifting the anchor changes bucket
//! membership, so the snapping rule here is part of the contract.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};

use engram_contracts::PendingObservation;

/// Default window size in days.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Bucket key for a timestamp: the ISO date of its window start.
///
/// The timestamp is truncated to midnight UTC and its day of month
/// snapped to the start of the window period it falls in
/// (`start_day = ((day - 1) / window) * window + 1`). Periods therefore
/// restart at day 1 of every month: days 1..window, window+1..2*window
/// and so on.
pub fn window_key(timestamp: DateTime<Utc>, window_days: i64) -> String {
    let date = timestamp.date_naive();
    let day = date.day0() as i64; // 0-based day of month
    let start_day = (day / window_days) * window_days;
    let start = date
        .with_day0(start_day as u32)
        .unwrap_or(date);

    start.format("%Y-%m-%d").to_string()
}

/// Partition pending observations into window buckets.
///
/// BTreeMap keys are ISO dates, so iteration order is chronological.
pub fn bucket_by_window(
    pending: &[PendingObservation],
    window_days: i64,
) -> BTreeMap<String, Vec<PendingObservation>> {
    let mut buckets: BTreeMap<String, Vec<PendingObservation>> = BTreeMap::new();
    for item in pending {
        let key = window_key(item.observation.timestamp, window_days);
        buckets.entry(key).or_default().push(item.clone());
    }
    buckets
}
