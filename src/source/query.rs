//! SQL for category and resolution queries.
//!
//! Values always travel as bind parameters. Table and column names come from
//! configuration and are validated as plain identifiers before they are
//! spliced into the statement.

use anyhow::{bail, Result};
use serde::Deserialize;
use std::fmt;

use crate::models::constants::DEFAULT_RESOLVED_STATUSES;
use crate::models::{Category, DateWindow};

/// SQL type of the identifier column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdColumnType {
    Text,
    Bigint,
    Integer,
    Uuid,
}

impl IdColumnType {
    fn sql_type(self) -> &'static str {
        match self {
            IdColumnType::Text => "text",
            IdColumnType::Bigint => "bigint",
            IdColumnType::Integer => "integer",
            IdColumnType::Uuid => "uuid",
        }
    }
}

/// Where pipeline documents live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    /// Table name, optionally schema-qualified
    pub table: String,
    pub id_column: String,
    /// When unknown the column is compared as text, which cannot use an index
    pub id_type: Option<IdColumnType>,
    pub status_column: String,
    pub date_column: String,
    pub classifier_column: String,
    pub link_column: String,
    pub error_column: String,
}

impl Default for TableSchema {
    fn default() -> Self {
        Self {
            table: "mdlp_meta.outcome_documents".to_string(),
            id_column: "document_id".to_string(),
            id_type: None,
            status_column: "doc_status".to_string(),
            date_column: "doc_date".to_string(),
            classifier_column: "action_id".to_string(),
            link_column: "link".to_string(),
            error_column: "doc_business_error_desc".to_string(),
        }
    }
}

/// When a backlog document counts as resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRule {
    /// Terminal statuses that close an alert
    pub statuses: Vec<String>,
    /// Business error substrings that keep a terminal document unresolved
    pub exclude_error_patterns: Vec<String>,
}

impl Default for ResolutionRule {
    fn default() -> Self {
        Self {
            statuses: DEFAULT_RESOLVED_STATUSES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exclude_error_patterns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    Text(String),
    TextList(Vec<String>),
    IntList(Vec<i64>),
}

impl fmt::Display for BindValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindValue::Text(s) => write!(f, "'{s}'"),
            BindValue::TextList(items) => write!(f, "{items:?}"),
            BindValue::IntList(items) => write!(f, "{items:?}"),
        }
    }
}

/// A statement and its positional parameters (`$1`, `$2`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltQuery {
    pub sql: String,
    pub binds: Vec<BindValue>,
}

impl BuiltQuery {
    fn new() -> Self {
        Self {
            sql: String::new(),
            binds: Vec::new(),
        }
    }

    /// Register a parameter and return its placeholder.
    fn bind(&mut self, value: BindValue) -> String {
        self.binds.push(value);
        format!("${}", self.binds.len())
    }
}

impl fmt::Display for BuiltQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql)?;
        for (i, value) in self.binds.iter().enumerate() {
            write!(f, "\n  ${} = {}", i + 1, value)?;
        }
        Ok(())
    }
}

/// Builds every statement the monitor runs from declarative descriptors.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    schema: TableSchema,
    resolution: ResolutionRule,
}

impl QueryBuilder {
    pub fn new(schema: TableSchema, resolution: ResolutionRule) -> Result<Self> {
        validate_table_name(&schema.table)?;
        for column in [
            &schema.id_column,
            &schema.status_column,
            &schema.date_column,
            &schema.classifier_column,
            &schema.link_column,
            &schema.error_column,
        ] {
            validate_identifier(column)?;
        }
        if resolution.statuses.is_empty() {
            bail!("Resolution rule needs at least one terminal status");
        }

        Ok(Self { schema, resolution })
    }

    /// Rows of a category: identifier, status-entry timestamp, classifier.
    pub fn category_query(&self, category: &Category) -> Result<BuiltQuery> {
        let s = &self.schema;
        let q = &category.query;
        validate_identifier(&q.timestamp_column)?;

        let mut built = BuiltQuery::new();
        let mut conditions = Vec::new();

        if !q.statuses.is_empty() {
            let p = built.bind(BindValue::TextList(q.statuses.clone()));
            conditions.push(format!("{} = ANY({p})", s.status_column));
        }

        conditions.push(match q.window {
            DateWindow::Today => format!("{}::date = current_date", s.date_column),
            DateWindow::SinceYesterday => {
                format!("{}::date >= current_date - 1", s.date_column)
            }
        });

        if !q.exclude_classifiers.is_empty() {
            let p = built.bind(BindValue::IntList(q.exclude_classifiers.clone()));
            conditions.push(format!(
                "({c} IS NULL OR NOT ({c} = ANY({p})))",
                c = s.classifier_column
            ));
        }

        for pattern in &q.exclude_link_patterns {
            let p = built.bind(BindValue::Text(contains_pattern(pattern)));
            conditions.push(format!(
                "({c} IS NULL OR {c} NOT ILIKE {p})",
                c = s.link_column
            ));
        }

        if let Some(pattern) = &q.error_pattern {
            let p = built.bind(BindValue::Text(contains_pattern(pattern)));
            conditions.push(format!("{} ILIKE {p}", s.error_column));
        }

        for pattern in &q.exclude_error_patterns {
            let p = built.bind(BindValue::Text(contains_pattern(pattern)));
            conditions.push(format!(
                "({c} IS NULL OR {c} NOT ILIKE {p})",
                c = s.error_column
            ));
        }

        built.sql = format!(
            "SELECT {id}::text, {ts}::timestamp, {cls}::text FROM {table} WHERE {conds} ORDER BY {ts}",
            id = s.id_column,
            ts = q.timestamp_column,
            cls = s.classifier_column,
            table = s.table,
            conds = conditions.join(" AND "),
        );
        Ok(built)
    }

    /// Current status of one document, only if it satisfies the resolution rule.
    pub fn resolution_query(&self, identifier: &str) -> BuiltQuery {
        let s = &self.schema;
        let mut built = BuiltQuery::new();

        let id = built.bind(BindValue::Text(identifier.to_string()));
        let statuses = built.bind(BindValue::TextList(self.resolution.statuses.clone()));
        let id_condition = match s.id_type {
            None => format!("{}::text = {id}", s.id_column),
            Some(IdColumnType::Text) => format!("{} = {id}", s.id_column),
            Some(ty) => format!("{} = {id}::{}", s.id_column, ty.sql_type()),
        };
        let mut conditions = vec![
            id_condition,
            format!("{} = ANY({statuses})", s.status_column),
        ];

        for pattern in &self.resolution.exclude_error_patterns {
            let p = built.bind(BindValue::Text(contains_pattern(pattern)));
            conditions.push(format!(
                "({c} IS NULL OR {c} NOT ILIKE {p})",
                c = s.error_column
            ));
        }

        built.sql = format!(
            "SELECT {id_col}::text, {status}::text FROM {table} WHERE {conds} LIMIT 1",
            id_col = s.id_column,
            status = s.status_column,
            table = s.table,
            conds = conditions.join(" AND "),
        );
        built
    }
}

/// `%pattern%` with LIKE metacharacters in `pattern` escaped.
fn contains_pattern(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len() + 2);
    escaped.push('%');
    for c in pattern.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn is_valid_table_name(name: &str) -> bool {
    match name.split_once('.') {
        Some((schema, table)) => is_valid_identifier(schema) && is_valid_identifier(table),
        None => is_valid_identifier(name),
    }
}

fn validate_identifier(name: &str) -> Result<()> {
    if !is_valid_identifier(name) {
        bail!("Invalid column name: '{name}'");
    }
    Ok(())
}

fn validate_table_name(name: &str) -> Result<()> {
    if !is_valid_table_name(name) {
        bail!("Invalid table name: '{name}'");
    }
    Ok(())
}
