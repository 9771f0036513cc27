//! Alert events and the webhook payload they render into.

use serde::{Deserialize, Serialize};

use super::category::Category;
use super::constants::{templates, MISSING_FIELD_PLACEHOLDER};
use super::record::{DocumentRecord, ResolvedDocument};

/// Labels used when describing a single row in an alert body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFormat {
    pub id_label: String,
    pub classifier_label: String,
}

impl Default for RowFormat {
    fn default() -> Self {
        Self {
            id_label: "xml_doc_id".to_string(),
            classifier_label: "action_id".to_string(),
        }
    }
}

impl RowFormat {
    pub fn describe(&self, record: &DocumentRecord) -> String {
        let classifier = record
            .classifier
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(MISSING_FIELD_PLACEHOLDER);
        format!(
            "{}: {}, {}: {}",
            self.id_label, record.identifier, self.classifier_label, classifier
        )
    }

    pub fn describe_resolved(&self, resolved: &ResolvedDocument) -> String {
        format!(
            "{}: {}, status: {}",
            self.id_label, resolved.identifier, resolved.status
        )
    }
}

/// One notification, built and sent within a single cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertEvent {
    /// Category name, or `summary` / `resolved` for the loop-level notices
    pub category: String,
    pub color: String,
    pub count: usize,
    pub headline: String,
    /// Newline-delimited entries
    pub body: String,
}

impl AlertEvent {
    /// A category alert covering every stale row of this cycle.
    pub fn stale_documents(category: &Category, stale: &[DocumentRecord], format: &RowFormat) -> Self {
        let body = stale
            .iter()
            .map(|record| format.describe(record))
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            category: category.name.clone(),
            color: category.template.color.clone(),
            count: stale.len(),
            headline: category.render_headline(stale.len()),
            body,
        }
    }

    /// Total of documents alerted but not yet resolved.
    pub fn outstanding_summary(total: usize, color: &str) -> Self {
        Self {
            category: "summary".to_string(),
            color: color.to_string(),
            count: total,
            headline: templates::SUMMARY_HEADLINE.to_string(),
            body: format!("Total {total}"),
        }
    }

    /// Consolidated notice for every document resolved in one resolver cycle.
    pub fn resolved(
        resolved: &[ResolvedDocument],
        remaining: usize,
        color: &str,
        format: &RowFormat,
    ) -> Self {
        let headline = templates::RESOLVED_HEADLINE
            .replace("{resolved}", &resolved.len().to_string())
            .replace("{remaining}", &remaining.to_string());
        let body = resolved
            .iter()
            .map(|r| format.describe_resolved(r))
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            category: "resolved".to_string(),
            color: color.to_string(),
            count: resolved.len(),
            headline,
            body,
        }
    }

    pub fn to_payload(&self) -> AlertPayload {
        AlertPayload {
            text: self.headline.clone(),
            color: self.color.clone(),
            attachments: vec![Attachment {
                color: self.color.clone(),
                text: self.body.clone(),
            }],
        }
    }
}

/// Slack-compatible incoming webhook body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertPayload {
    pub text: String,
    pub color: String,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub color: String,
    pub text: String,
}
