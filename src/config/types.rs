//! On-disk configuration layout.

use serde::Deserialize;

use crate::models::constants::{
    colors, templates, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_DETECTOR_INTERVAL_SECS,
    DEFAULT_RESOLVED_STATUSES, DEFAULT_RESOLVER_INTERVAL_SECS, DEFAULT_SUMMARY_MIN_INTERVAL_SECS,
    DEFAULT_THRESHOLD_SECS,
};
use crate::models::DateWindow;
use crate::source::postgres::TimestampZone;
use crate::source::IdColumnType;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub database: DatabaseConfig,
    pub notifier: NotifierConfig,
    #[serde(default)]
    pub schema: SchemaConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default, rename = "category")]
    pub categories: Vec<CategoryConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub user: String,
    #[serde(default)]
    pub password: String,
    pub dbname: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_statement_timeout_secs")]
    pub statement_timeout_secs: u64,
    #[serde(default)]
    pub timestamp_zone: TimestampZone,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_id_column")]
    pub id_column: String,
    /// SQL type of `id_column`, used to keep resolution lookups indexable
    #[serde(default)]
    pub id_type: Option<IdColumnType>,
    #[serde(default = "default_status_column")]
    pub status_column: String,
    #[serde(default = "default_date_column")]
    pub date_column: String,
    #[serde(default = "default_classifier_column")]
    pub classifier_column: String,
    #[serde(default = "default_link_column")]
    pub link_column: String,
    #[serde(default = "default_error_column")]
    pub error_column: String,
    /// Label for the identifier in alert bodies
    #[serde(default = "default_id_label")]
    pub id_label: String,
    /// Label for the classifier in alert bodies
    #[serde(default = "default_classifier_label")]
    pub classifier_label: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            table: default_table(),
            id_column: default_id_column(),
            id_type: None,
            status_column: default_status_column(),
            date_column: default_date_column(),
            classifier_column: default_classifier_column(),
            link_column: default_link_column(),
            error_column: default_error_column(),
            id_label: default_id_label(),
            classifier_label: default_classifier_label(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotifierConfig {
    pub webhook_url: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetectorConfig {
    #[serde(default = "default_detector_interval_secs")]
    pub interval_secs: u64,
    #[serde(default)]
    pub summary: SummaryConfig,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_detector_interval_secs(),
            summary: SummaryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SummaryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_summary_min_interval_secs")]
    pub min_interval_secs: u64,
    #[serde(default = "default_alert_color")]
    pub color: String,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_interval_secs: default_summary_min_interval_secs(),
            color: default_alert_color(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolverConfig {
    #[serde(default = "default_resolver_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_resolved_statuses")]
    pub statuses: Vec<String>,
    #[serde(default)]
    pub exclude_error_patterns: Vec<String>,
    #[serde(default = "default_resolved_color")]
    pub color: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_resolver_interval_secs(),
            statuses: default_resolved_statuses(),
            exclude_error_patterns: Vec::new(),
            color: default_resolved_color(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryConfig {
    pub name: String,
    /// Shown in the alert headline, defaults to the name
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub statuses: Vec<String>,
    /// Defaults to the schema's date column
    #[serde(default)]
    pub timestamp_column: Option<String>,
    #[serde(default = "default_threshold_secs")]
    pub threshold_secs: u64,
    #[serde(default)]
    pub window: DateWindow,
    #[serde(default)]
    pub exclude_classifiers: Vec<i64>,
    #[serde(default)]
    pub exclude_link_patterns: Vec<String>,
    #[serde(default)]
    pub error_pattern: Option<String>,
    #[serde(default)]
    pub exclude_error_patterns: Vec<String>,
    #[serde(default = "default_alert_color")]
    pub color: String,
    #[serde(default = "default_headline")]
    pub headline: String,
}

fn default_port() -> u16 {
    5432
}

fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

fn default_statement_timeout_secs() -> u64 {
    30
}

fn default_table() -> String {
    "mdlp_meta.outcome_documents".to_string()
}

fn default_id_column() -> String {
    "document_id".to_string()
}

fn default_status_column() -> String {
    "doc_status".to_string()
}

fn default_date_column() -> String {
    "doc_date".to_string()
}

fn default_classifier_column() -> String {
    "action_id".to_string()
}

fn default_link_column() -> String {
    "link".to_string()
}

fn default_error_column() -> String {
    "doc_business_error_desc".to_string()
}

fn default_id_label() -> String {
    "xml_doc_id".to_string()
}

fn default_classifier_label() -> String {
    "action_id".to_string()
}

fn default_detector_interval_secs() -> u64 {
    DEFAULT_DETECTOR_INTERVAL_SECS
}

fn default_resolver_interval_secs() -> u64 {
    DEFAULT_RESOLVER_INTERVAL_SECS
}

fn default_summary_min_interval_secs() -> u64 {
    DEFAULT_SUMMARY_MIN_INTERVAL_SECS
}

fn default_threshold_secs() -> u64 {
    DEFAULT_THRESHOLD_SECS
}

fn default_true() -> bool {
    true
}

fn default_alert_color() -> String {
    colors::ALERT.to_string()
}

fn default_resolved_color() -> String {
    colors::RESOLVED.to_string()
}

fn default_resolved_statuses() -> Vec<String> {
    DEFAULT_RESOLVED_STATUSES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_headline() -> String {
    templates::CATEGORY_HEADLINE.to_string()
}
