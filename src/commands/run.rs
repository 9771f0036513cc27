//! Run command - starts the detector and resolver loops

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::monitor::{run_loops, Backlog, Detector, Resolver, ShutdownSignal};
use crate::notify::{NotificationSink, WebhookSink};
use crate::source::PostgresSource;

/// Load the config and run both loops until SIGINT / SIGTERM.
///
/// With `once`, run a single detector cycle followed by a single resolver
/// cycle and return.
pub fn execute(config_path: &Path, once: bool) -> Result<()> {
    let config = Config::load(config_path)
        .with_context(|| format!("Failed to load config: {}", config_path.display()))?;

    let (mut detector, mut resolver) = build_loops(&config)?;

    if once {
        let detected = detector.run_cycle(Utc::now());
        let resolved = resolver.run_cycle();
        info!(
            stale = detected.stale_rows,
            alerts = detected.alerts_sent,
            failed_categories = detected.failed_categories.len(),
            resolved = resolved.resolved.len(),
            remaining = resolved.remaining,
            "single pass finished"
        );
        return Ok(());
    }

    let shutdown = ShutdownSignal::new();
    shutdown.install_handler()?;

    run_loops(detector, resolver, &shutdown)?;
    info!("stalewatch stopped");
    Ok(())
}

/// Wire both loops to their own source, a shared sink and a shared backlog.
pub fn build_loops(config: &Config) -> Result<(Detector, Resolver)> {
    let connection = config.connection_settings();
    let queries = config.query_builder()?;

    let sink: Arc<dyn NotificationSink> = Arc::new(WebhookSink::new(
        config.notifier.webhook_url.clone(),
        config.webhook_timeout(),
    )?);
    let backlog = Arc::new(Backlog::new());

    let detector = Detector::new(
        Box::new(PostgresSource::new(&connection, queries.clone())?),
        Arc::clone(&sink),
        Arc::clone(&backlog),
        config.categories(),
        config.detector_settings(),
    );
    let resolver = Resolver::new(
        Box::new(PostgresSource::new(&connection, queries)?),
        sink,
        backlog,
        config.resolver_settings(),
    );

    Ok((detector, resolver))
}
