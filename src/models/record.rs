//! Rows read from the pipeline store.

use chrono::{DateTime, Utc};

/// A document as seen by one query.
///
/// Produced fresh on every cycle and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    pub identifier: String,
    /// When the document entered the monitored status
    pub reference_timestamp: DateTime<Utc>,
    /// Action classifier, absent for some statuses
    pub classifier: Option<String>,
}

impl DocumentRecord {
    pub fn new(identifier: impl Into<String>, reference_timestamp: DateTime<Utc>) -> Self {
        Self {
            identifier: identifier.into(),
            reference_timestamp,
            classifier: None,
        }
    }

    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    /// Time spent in the status as of `now`. Negative for future timestamps.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now.signed_duration_since(self.reference_timestamp)
    }
}

/// A backlog document confirmed to have reached a terminal status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDocument {
    pub identifier: String,
    pub status: String,
}
