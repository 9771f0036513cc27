//! Configuration loaded once at startup.
//!
//! The file is TOML. `${VAR}` references in the database connection fields and
//! the webhook URL are expanded from the environment after parsing, so
//! credentials can stay out of it.

mod env;
mod types;


use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use thiserror::Error;

use crate::models::{AlertTemplate, Category, CategoryQuery, RowFormat};
use crate::monitor::{DetectorSettings, ResolverSettings, SummaryPolicy};
use crate::source::postgres::ConnectionSettings;
use crate::source::query::{is_valid_identifier, is_valid_table_name, TableSchema};
use crate::source::{QueryBuilder, ResolutionRule};

pub use env::expand_env_fields;
pub use types::{
    CategoryConfig, Config, DatabaseConfig, DetectorConfig, NotifierConfig, ResolverConfig,
    SchemaConfig, SummaryConfig,
};

/// Default config path, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "stalewatch.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Environment variable not set: {0}")]
    MissingEnv(String),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("No categories configured")]
    NoCategories,

    #[error("Duplicate category name: {0}")]
    DuplicateCategory(String),

    #[error("Invalid {field}: '{value}'")]
    InvalidIdentifier { field: String, value: String },

    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),

    #[error("Webhook URL must start with http:// or https://")]
    InvalidWebhookUrl,

    #[error("Category '{name}': {reason}")]
    InvalidCategory { name: String, reason: String },

    #[error("Resolver needs at least one terminal status")]
    NoResolvedStatuses,
}

impl Config {
    /// Read, expand, parse and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(raw)?;
        config.expand_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Substitute `${VAR}` in the fields that may carry secrets.
    fn expand_env(&mut self) -> Result<(), ConfigError> {
        let db = &mut self.database;
        expand_env_fields([
            &mut db.host,
            &mut db.user,
            &mut db.password,
            &mut db.dbname,
            &mut self.notifier.webhook_url,
        ])
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.detector.interval_secs == 0 {
            return Err(ConfigError::ZeroInterval("detector.interval_secs"));
        }
        if self.resolver.interval_secs == 0 {
            return Err(ConfigError::ZeroInterval("resolver.interval_secs"));
        }
        if self.resolver.statuses.is_empty() {
            return Err(ConfigError::NoResolvedStatuses);
        }

        let url = self.notifier.webhook_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidWebhookUrl);
        }

        let schema = &self.schema;
        if !is_valid_table_name(&schema.table) {
            return Err(invalid("schema.table", &schema.table));
        }
        for (field, value) in [
            ("schema.id_column", &schema.id_column),
            ("schema.status_column", &schema.status_column),
            ("schema.date_column", &schema.date_column),
            ("schema.classifier_column", &schema.classifier_column),
            ("schema.link_column", &schema.link_column),
            ("schema.error_column", &schema.error_column),
        ] {
            if !is_valid_identifier(value) {
                return Err(invalid(field, value));
            }
        }

        if self.categories.is_empty() {
            return Err(ConfigError::NoCategories);
        }

        let mut seen = HashSet::new();
        for category in &self.categories {
            if !seen.insert(category.name.as_str()) {
                return Err(ConfigError::DuplicateCategory(category.name.clone()));
            }
            validate_category(category)?;
        }

        Ok(())
    }

    /// Categories in configured order.
    pub fn categories(&self) -> Vec<Category> {
        self.categories
            .iter()
            .map(|c| Category {
                name: c.name.clone(),
                label: c.label.clone().unwrap_or_else(|| c.name.clone()),
                threshold: Duration::from_secs(c.threshold_secs),
                query: CategoryQuery {
                    statuses: c.statuses.clone(),
                    timestamp_column: c
                        .timestamp_column
                        .clone()
                        .unwrap_or_else(|| self.schema.date_column.clone()),
                    window: c.window,
                    exclude_classifiers: c.exclude_classifiers.clone(),
                    exclude_link_patterns: c.exclude_link_patterns.clone(),
                    error_pattern: c.error_pattern.clone(),
                    exclude_error_patterns: c.exclude_error_patterns.clone(),
                },
                template: AlertTemplate {
                    headline: c.headline.clone(),
                    color: c.color.clone(),
                },
            })
            .collect()
    }

    pub fn row_format(&self) -> RowFormat {
        RowFormat {
            id_label: self.schema.id_label.clone(),
            classifier_label: self.schema.classifier_label.clone(),
        }
    }

    pub fn detector_settings(&self) -> DetectorSettings {
        DetectorSettings {
            interval: Duration::from_secs(self.detector.interval_secs),
            summary: SummaryPolicy {
                enabled: self.detector.summary.enabled,
                min_interval: Duration::from_secs(self.detector.summary.min_interval_secs),
                color: self.detector.summary.color.clone(),
            },
            row_format: self.row_format(),
        }
    }

    pub fn resolver_settings(&self) -> ResolverSettings {
        ResolverSettings {
            interval: Duration::from_secs(self.resolver.interval_secs),
            color: self.resolver.color.clone(),
            row_format: self.row_format(),
        }
    }

    pub fn connection_settings(&self) -> ConnectionSettings {
        let db = &self.database;
        ConnectionSettings {
            host: db.host.clone(),
            port: db.port,
            user: db.user.clone(),
            password: db.password.clone(),
            dbname: db.dbname.clone(),
            connect_timeout: Duration::from_secs(db.connect_timeout_secs),
            statement_timeout: Duration::from_secs(db.statement_timeout_secs),
            timestamp_zone: db.timestamp_zone,
        }
    }

    pub fn query_builder(&self) -> Result<QueryBuilder> {
        let schema = &self.schema;
        QueryBuilder::new(
            TableSchema {
                table: schema.table.clone(),
                id_column: schema.id_column.clone(),
                id_type: schema.id_type,
                status_column: schema.status_column.clone(),
                date_column: schema.date_column.clone(),
                classifier_column: schema.classifier_column.clone(),
                link_column: schema.link_column.clone(),
                error_column: schema.error_column.clone(),
            },
            ResolutionRule {
                statuses: self.resolver.statuses.clone(),
                exclude_error_patterns: self.resolver.exclude_error_patterns.clone(),
            },
        )
    }

    pub fn webhook_timeout(&self) -> Duration {
        Duration::from_secs(self.notifier.timeout_secs)
    }
}

fn validate_category(category: &CategoryConfig) -> Result<(), ConfigError> {
    let fail = |reason: &str| ConfigError::InvalidCategory {
        name: category.name.clone(),
        reason: reason.to_string(),
    };

    if category.name.trim().is_empty() {
        return Err(fail("name must not be empty"));
    }
    if category.statuses.is_empty() && category.error_pattern.is_none() {
        return Err(fail("needs at least one status or an error_pattern"));
    }
    if let Some(column) = &category.timestamp_column {
        if !is_valid_identifier(column) {
            return Err(invalid(
                &format!("category.{}.timestamp_column", category.name),
                column,
            ));
        }
    }
    Ok(())
}

fn invalid(field: &str, value: &str) -> ConfigError {
    ConfigError::InvalidIdentifier {
        field: field.to_string(),
        value: value.to_string(),
    }
}
