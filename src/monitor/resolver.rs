//! Resolver loop: rechecks backlog members and announces the ones that
//! reached a terminal status.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::backlog::Backlog;
use super::config::ResolverSettings;
use super::shutdown::ShutdownSignal;
use crate::models::{AlertEvent, ResolvedDocument};
use crate::notify::NotificationSink;
use crate::source::PipelineSource;

/// Outcome of one resolver cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverReport {
    /// Identifiers taken over from the detector this cycle
    pub drained: usize,
    /// Identifiers rechecked against the source
    pub checked: usize,
    pub resolved: Vec<ResolvedDocument>,
    pub remaining: usize,
    /// The scan stopped early on a connection or query error
    pub aborted: bool,
    pub notification_sent: bool,
}

pub struct Resolver {
    source: Box<dyn PipelineSource>,
    sink: Arc<dyn NotificationSink>,
    backlog: Arc<Backlog>,
    settings: ResolverSettings,
}

impl Resolver {
    pub fn new(
        source: Box<dyn PipelineSource>,
        sink: Arc<dyn NotificationSink>,
        backlog: Arc<Backlog>,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            source,
            sink,
            backlog,
            settings,
        }
    }

    /// Reconcile immediately, then once per interval until shutdown.
    pub fn run(&mut self, shutdown: &ShutdownSignal) {
        info!(
            interval_secs = self.settings.interval.as_secs(),
            "resolver started"
        );

        while !shutdown.is_triggered() {
            let report = self.run_cycle();
            if report.checked > 0 {
                info!(
                    drained = report.drained,
                    checked = report.checked,
                    resolved = report.resolved.len(),
                    remaining = report.remaining,
                    "resolver cycle finished"
                );
            }

            if !shutdown.sleep(self.settings.interval) {
                break;
            }
        }

        info!("resolver stopped");
    }

    /// One Reconciling phase. Unconfirmed identifiers always stay in the
    /// backlog for the next cycle.
    pub fn run_cycle(&mut self) -> ResolverReport {
        let mut report = ResolverReport {
            drained: self.backlog.drain_all_pending().len(),
            ..ResolverReport::default()
        };

        let working = self.backlog.tracked_snapshot();
        if working.is_empty() {
            return report;
        }
        debug!(drained = report.drained, working = working.len(), "resolver scanning backlog");

        match self.source.connect() {
            Ok(mut conn) => {
                for id in &working {
                    match conn.check_resolved(id) {
                        Ok(Some(resolved)) => report.resolved.push(resolved),
                        Ok(None) => {}
                        Err(e) => {
                            warn!(identifier = %id, error = %format!("{e:#}"), "resolution check failed, ending scan early");
                            report.aborted = true;
                            break;
                        }
                    }
                    report.checked += 1;
                }
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "resolver could not connect to pipeline source");
                report.aborted = true;
            }
        }

        for resolved in &report.resolved {
            self.backlog.remove(&resolved.identifier);
        }
        report.remaining = self.backlog.len();

        if !report.resolved.is_empty() {
            let event = AlertEvent::resolved(
                &report.resolved,
                report.remaining,
                &self.settings.color,
                &self.settings.row_format,
            );
            match self.sink.send(&event.to_payload()) {
                Ok(()) => report.notification_sent = true,
                Err(e) => warn!(error = %format!("{e:#}"), "resolution notice delivery failed"),
            }
        }

        report
    }
}
