/// Default pause between two detector cycles.
pub const DEFAULT_DETECTOR_INTERVAL_SECS: u64 = 60;

/// Default pause between two resolver cycles.
pub const DEFAULT_RESOLVER_INTERVAL_SECS: u64 = 30;

/// Minimum spacing between two "outstanding documents" summary alerts.
pub const DEFAULT_SUMMARY_MIN_INTERVAL_SECS: u64 = 1800;

/// Default staleness threshold for a category (30 minutes).
pub const DEFAULT_THRESHOLD_SECS: u64 = 1800;

/// Default connect timeout for the database and the webhook.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Rendered in place of an absent classifier.
pub const MISSING_FIELD_PLACEHOLDER: &str = "n/a";

/// Terminal statuses that close out a previously alerted document.
pub const DEFAULT_RESOLVED_STATUSES: [&str; 2] = ["PROCESSED_DOCUMENT", "FAILED_RESULT_READY"];

/// Severity colors used in webhook attachments.
pub mod colors {
    /// Stale-document and summary alerts.
    pub const ALERT: &str = "#FF0000";

    /// Consolidated resolution notices.
    pub const RESOLVED: &str = "#40ff00";
}

/// Headline templates. `{label}`, `{count}` and `{threshold}` are substituted.
pub mod templates {
    pub const CATEGORY_HEADLINE: &str =
        ":boom: [ALERT] Found {count} documents in status '{label}' for more than {threshold}";

    pub const SUMMARY_HEADLINE: &str = ":boom: [ALERT] Unprocessed documents:";

    pub const RESOLVED_HEADLINE: &str =
        ":white_check_mark: [RESOLVED] Processed {resolved} documents. Remaining {remaining}";
}
