//! Monitored conditions.
//!
//! A category is a declarative descriptor: which statuses to look at, how far
//! back to look, what to exclude, how old a row must be before it is alerted,
//! and how the alert looks. One parameterized query builder consumes it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::constants::{colors, templates};

/// Which documents (by their document date) a category query considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateWindow {
    /// Documents dated today
    #[default]
    Today,
    /// Documents dated yesterday or today
    SinceYesterday,
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateWindow::Today => write!(f, "today"),
            DateWindow::SinceYesterday => write!(f, "since_yesterday"),
        }
    }
}

/// Row selection for a category.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategoryQuery {
    /// Status values to select. Empty means any status.
    pub statuses: Vec<String>,
    /// Column holding the time the document entered its status
    pub timestamp_column: String,
    pub window: DateWindow,
    /// Classifier codes that never alert
    pub exclude_classifiers: Vec<i64>,
    /// Substrings of the storage link that never alert
    pub exclude_link_patterns: Vec<String>,
    /// Only rows whose business error description contains this substring
    pub error_pattern: Option<String>,
    /// Rows whose business error description contains any of these never alert
    pub exclude_error_patterns: Vec<String>,
}

/// How a category's alert is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertTemplate {
    /// Headline with `{label}`, `{count}` and `{threshold}` placeholders
    pub headline: String,
    pub color: String,
}

impl Default for AlertTemplate {
    fn default() -> Self {
        Self {
            headline: templates::CATEGORY_HEADLINE.to_string(),
            color: colors::ALERT.to_string(),
        }
    }
}

impl AlertTemplate {
    pub fn render_headline(&self, label: &str, count: usize, threshold: Duration) -> String {
        self.headline
            .replace("{label}", label)
            .replace("{count}", &count.to_string())
            .replace("{threshold}", &format_threshold(threshold))
    }
}

/// A statically configured monitored condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Stable name used in logs
    pub name: String,
    /// Human label shown in alerts
    pub label: String,
    pub threshold: Duration,
    pub query: CategoryQuery,
    pub template: AlertTemplate,
}

impl Category {
    pub fn render_headline(&self, count: usize) -> String {
        self.template
            .render_headline(&self.label, count, self.threshold)
    }
}

/// Render a threshold the way operators write it ("30 min", "1 h").
pub fn format_threshold(threshold: Duration) -> String {
    let secs = threshold.as_secs();
    if secs >= 3600 && secs % 3600 == 0 {
        format!("{} h", secs / 3600)
    } else if secs >= 60 && secs % 60 == 0 {
        format!("{} min", secs / 60)
    } else {
        format!("{secs} s")
    }
}
