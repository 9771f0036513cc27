//! Staleness filtering of query rows.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::models::DocumentRecord;

/// Check whether a row has spent at least `threshold` in its status.
///
/// Rows stamped in the future are fresh. A threshold that does not fit in a
/// `chrono::Duration` never matches.
pub fn is_stale(record: &DocumentRecord, threshold: Duration, now: DateTime<Utc>) -> bool {
    match chrono::Duration::from_std(threshold) {
        Ok(threshold) => record.age(now) >= threshold,
        Err(_) => false,
    }
}

/// Keep the stale rows, preserving input order.
pub fn filter_stale(
    rows: Vec<DocumentRecord>,
    threshold: Duration,
    now: DateTime<Utc>,
) -> Vec<DocumentRecord> {
    rows.into_iter()
        .filter(|record| is_stale(record, threshold, now))
        .collect()
}
