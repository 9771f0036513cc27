//! Runtime settings for the two loops

use std::time::Duration;

use crate::models::constants::{
    colors, DEFAULT_DETECTOR_INTERVAL_SECS, DEFAULT_RESOLVER_INTERVAL_SECS,
    DEFAULT_SUMMARY_MIN_INTERVAL_SECS,
};
use crate::models::RowFormat;

/// Outstanding-backlog summary alert policy.
///
/// At most one summary per detector cycle, and no closer together than
/// `min_interval`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryPolicy {
    pub enabled: bool,
    pub min_interval: Duration,
    pub color: String,
}

impl Default for SummaryPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            min_interval: Duration::from_secs(DEFAULT_SUMMARY_MIN_INTERVAL_SECS),
            color: colors::ALERT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorSettings {
    pub interval: Duration,
    pub summary: SummaryPolicy,
    pub row_format: RowFormat,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_DETECTOR_INTERVAL_SECS),
            summary: SummaryPolicy::default(),
            row_format: RowFormat::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverSettings {
    pub interval: Duration,
    pub color: String,
    pub row_format: RowFormat,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_RESOLVER_INTERVAL_SECS),
            color: colors::RESOLVED.to_string(),
            row_format: RowFormat::default(),
        }
    }
}
