//! PostgreSQL pipeline source.
//!
//! The loops are plain threads, so each source owns a small current-thread
//! tokio runtime and drives sqlx with `block_on`. One connection is opened per
//! cycle and closed when the cycle's [`SourceConnection`] is dropped.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgArguments, PgConnectOptions, PgConnection};
use sqlx::query::Query;
use sqlx::{Connection, Postgres, Row};
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::{debug, warn};

use super::query::{BindValue, QueryBuilder};
use super::{PipelineSource, SourceConnection};
use crate::models::{Category, DocumentRecord, ResolvedDocument};

/// How naive `timestamp` values read from the store are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampZone {
    /// Server-local wall clock of the monitoring host
    #[default]
    Local,
    Utc,
}

impl TimestampZone {
    pub fn to_utc(self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            TimestampZone::Utc => Some(Utc.from_utc_datetime(&naive)),
            TimestampZone::Local => Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

/// Connection parameters for the pipeline database.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
    pub connect_timeout: Duration,
    pub statement_timeout: Duration,
    pub timestamp_zone: TimestampZone,
}

pub struct PostgresSource {
    options: PgConnectOptions,
    connect_timeout: Duration,
    zone: TimestampZone,
    queries: QueryBuilder,
    runtime: Runtime,
}

impl PostgresSource {
    pub fn new(settings: &ConnectionSettings, queries: QueryBuilder) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to build database runtime")?;

        let options = PgConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .username(&settings.user)
            .password(&settings.password)
            .database(&settings.dbname)
            .application_name("stalewatch")
            .options([(
                "statement_timeout",
                format!("{}ms", settings.statement_timeout.as_millis()),
            )]);

        Ok(Self {
            options,
            connect_timeout: settings.connect_timeout,
            zone: settings.timestamp_zone,
            queries,
            runtime,
        })
    }
}

impl PipelineSource for PostgresSource {
    fn connect(&self) -> Result<Box<dyn SourceConnection + '_>> {
        let conn = self
            .runtime
            .block_on(async {
                tokio::time::timeout(self.connect_timeout, PgConnection::connect_with(&self.options))
                    .await
            })
            .context("Timed out connecting to the pipeline database")?
            .context("Failed to connect to the pipeline database")?;

        debug!("pipeline database connection opened");
        Ok(Box::new(PostgresConnection {
            conn: Some(conn),
            source: self,
        }))
    }
}

struct PostgresConnection<'a> {
    conn: Option<PgConnection>,
    source: &'a PostgresSource,
}

impl PostgresConnection<'_> {
    fn conn(&mut self) -> Result<&mut PgConnection> {
        self.conn
            .as_mut()
            .context("Database connection already released")
    }
}

impl Drop for PostgresConnection<'_> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            match self.source.runtime.block_on(conn.close()) {
                Ok(()) => debug!("pipeline database connection closed"),
                Err(e) => debug!(error = %e, "pipeline database connection closed uncleanly"),
            }
        }
    }
}

impl SourceConnection for PostgresConnection<'_> {
    fn fetch_category(&mut self, category: &Category) -> Result<Vec<DocumentRecord>> {
        let source = self.source;
        let built = source.queries.category_query(category)?;
        let conn = self.conn()?;

        let rows = source
            .runtime
            .block_on(bind_all(sqlx::query(&built.sql), &built.binds).fetch_all(conn))
            .with_context(|| format!("Category query failed: {}", category.name))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let identifier: Option<String> = row.try_get(0)?;
            let timestamp: Option<NaiveDateTime> = row.try_get(1)?;
            let classifier: Option<String> = row.try_get(2)?;

            let (Some(identifier), Some(timestamp)) = (identifier, timestamp) else {
                warn!(category = %category.name, "skipping row without identifier or timestamp");
                continue;
            };
            let Some(reference_timestamp) = source.zone.to_utc(timestamp) else {
                warn!(category = %category.name, identifier = %identifier, "skipping row with unrepresentable timestamp");
                continue;
            };

            records.push(DocumentRecord {
                identifier,
                reference_timestamp,
                classifier,
            });
        }

        Ok(records)
    }

    fn check_resolved(&mut self, identifier: &str) -> Result<Option<ResolvedDocument>> {
        let source = self.source;
        let built = source.queries.resolution_query(identifier);
        let conn = self.conn()?;

        let row = source
            .runtime
            .block_on(bind_all(sqlx::query(&built.sql), &built.binds).fetch_optional(conn))
            .with_context(|| format!("Resolution check failed for {identifier}"))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let identifier: String = row.try_get(0)?;
        let status: Option<String> = row.try_get(1)?;

        Ok(Some(ResolvedDocument {
            identifier,
            status: status.unwrap_or_default(),
        }))
    }
}

fn bind_all<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    binds: &[BindValue],
) -> Query<'q, Postgres, PgArguments> {
    for value in binds {
        query = match value {
            BindValue::Text(s) => query.bind(s.clone()),
            BindValue::TextList(items) => query.bind(items.clone()),
            BindValue::IntList(items) => query.bind(items.clone()),
        };
    }
    query
}
