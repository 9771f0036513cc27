//! Detector loop: samples every category, alerts on stale rows and admits
//! them to the backlog.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::backlog::Backlog;
use super::config::DetectorSettings;
use super::shutdown::ShutdownSignal;
use super::staleness::filter_stale;
use crate::models::{AlertEvent, Category};
use crate::notify::NotificationSink;
use crate::source::{PipelineSource, SourceConnection};

/// Outcome of one detector cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectorReport {
    /// The cycle could not open a source connection
    pub connection_failed: bool,
    /// Categories whose query failed this cycle
    pub failed_categories: Vec<String>,
    pub stale_rows: usize,
    /// Identifiers newly admitted to the backlog
    pub admitted: usize,
    pub alerts_sent: usize,
    pub alerts_failed: usize,
    pub summary_sent: bool,
}

pub struct Detector {
    source: Box<dyn PipelineSource>,
    sink: Arc<dyn NotificationSink>,
    backlog: Arc<Backlog>,
    categories: Vec<Category>,
    settings: DetectorSettings,
    last_summary_at: Option<DateTime<Utc>>,
}

impl Detector {
    pub fn new(
        source: Box<dyn PipelineSource>,
        sink: Arc<dyn NotificationSink>,
        backlog: Arc<Backlog>,
        categories: Vec<Category>,
        settings: DetectorSettings,
    ) -> Self {
        Self {
            source,
            sink,
            backlog,
            categories,
            settings,
            last_summary_at: None,
        }
    }

    /// Sample immediately, then once per interval until shutdown.
    pub fn run(&mut self, shutdown: &ShutdownSignal) {
        info!(
            categories = self.categories.len(),
            interval_secs = self.settings.interval.as_secs(),
            "detector started"
        );

        while !shutdown.is_triggered() {
            let report = self.run_cycle(Utc::now());
            info!(
                stale = report.stale_rows,
                admitted = report.admitted,
                alerts = report.alerts_sent,
                failed_categories = report.failed_categories.len(),
                backlog = self.backlog.len(),
                "detector cycle finished"
            );

            if !shutdown.sleep(self.settings.interval) {
                break;
            }
        }

        info!("detector stopped");
    }

    /// One Sampling phase. Never fails: every error is logged and folded into
    /// the report.
    pub fn run_cycle(&mut self, now: DateTime<Utc>) -> DetectorReport {
        let mut report = DetectorReport::default();

        match self.source.connect() {
            Ok(mut conn) => {
                for category in &self.categories {
                    self.sample_category(&mut *conn, category, now, &mut report);
                }
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "detector could not connect to pipeline source");
                report.connection_failed = true;
            }
        }

        self.maybe_send_summary(now, &mut report);
        report
    }

    fn sample_category<'c>(
        &self,
        conn: &mut (dyn SourceConnection + 'c),
        category: &Category,
        now: DateTime<Utc>,
        report: &mut DetectorReport,
    ) {
        let rows = match conn.fetch_category(category) {
            Ok(rows) => rows,
            Err(e) => {
                warn!(category = %category.name, error = %format!("{e:#}"), "category query failed");
                report.failed_categories.push(category.name.clone());
                return;
            }
        };

        let fetched = rows.len();
        let stale = filter_stale(rows, category.threshold, now);
        debug!(category = %category.name, fetched, stale = stale.len(), "category sampled");
        if stale.is_empty() {
            return;
        }
        report.stale_rows += stale.len();

        let event = AlertEvent::stale_documents(category, &stale, &self.settings.row_format);
        match self.sink.send(&event.to_payload()) {
            Ok(()) => report.alerts_sent += 1,
            Err(e) => {
                warn!(category = %category.name, error = %format!("{e:#}"), "alert delivery failed");
                report.alerts_failed += 1;
            }
        }

        for record in &stale {
            if self.backlog.add(&record.identifier) {
                report.admitted += 1;
            }
        }
    }

    fn maybe_send_summary(&mut self, now: DateTime<Utc>, report: &mut DetectorReport) {
        let policy = &self.settings.summary;
        if !policy.enabled {
            return;
        }

        let outstanding = self.backlog.len();
        if outstanding == 0 {
            return;
        }

        if let Some(last) = self.last_summary_at {
            let due = chrono::Duration::from_std(policy.min_interval)
                .map(|min| now.signed_duration_since(last) >= min)
                .unwrap_or(false);
            if !due {
                return;
            }
        }

        let event = AlertEvent::outstanding_summary(outstanding, &policy.color);
        match self.sink.send(&event.to_payload()) {
            Ok(()) => {
                self.last_summary_at = Some(now);
                report.summary_sent = true;
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "summary delivery failed");
                report.alerts_failed += 1;
            }
        }
    }
}
