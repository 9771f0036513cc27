//! Both loops running concurrently against the fake pipeline

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use stalewatch::monitor::{
    run_loops, Backlog, Detector, DetectorSettings, Resolver, ResolverSettings, ShutdownSignal,
    SummaryPolicy,
};
use stalewatch::notify::NotificationSink;

use super::helpers::{category, stale_record, wait_for, FakePipeline, RecordingSink};

const WAIT: Duration = Duration::from_secs(10);

fn fast_detector_settings() -> DetectorSettings {
    DetectorSettings {
        interval: Duration::from_millis(20),
        summary: SummaryPolicy {
            enabled: false,
            ..SummaryPolicy::default()
        },
        ..DetectorSettings::default()
    }
}

fn fast_resolver_settings() -> ResolverSettings {
    ResolverSettings {
        interval: Duration::from_millis(20),
        ..ResolverSettings::default()
    }
}

fn build(
    pipeline: &FakePipeline,
    sink: &Arc<RecordingSink>,
    backlog: &Arc<Backlog>,
    categories: Vec<stalewatch::models::Category>,
) -> (Detector, Resolver) {
    let sink: Arc<dyn NotificationSink> = Arc::clone(sink) as Arc<dyn NotificationSink>;
    let detector = Detector::new(
        Box::new(pipeline.clone()),
        Arc::clone(&sink),
        Arc::clone(backlog),
        categories,
        fast_detector_settings(),
    );
    let resolver = Resolver::new(
        Box::new(pipeline.clone()),
        sink,
        Arc::clone(backlog),
        fast_resolver_settings(),
    );
    (detector, resolver)
}

#[test]
fn test_alert_then_resolve_closes_the_loop() {
    let pipeline = FakePipeline::default();
    pipeline.set_rows("processing", vec![stale_record("doc-1"), stale_record("doc-2")]);
    let sink = Arc::new(RecordingSink::default());
    let backlog = Arc::new(Backlog::new());
    let (detector, resolver) = build(
        &pipeline,
        &sink,
        &backlog,
        vec![category("processing", Duration::from_secs(1800))],
    );

    let shutdown = ShutdownSignal::new();
    let runner = {
        let shutdown = shutdown.clone();
        thread::spawn(move || run_loops(detector, resolver, &shutdown))
    };

    assert!(wait_for(WAIT, || backlog.len() == 2));
    assert!(wait_for(WAIT, || !sink.sent().is_empty()));

    pipeline.finish(&["doc-1", "doc-2"], "PROCESSED_DOCUMENT");
    assert!(wait_for(WAIT, || backlog.is_empty()
        && sink.sent().iter().any(|p| p.text.contains("[RESOLVED]"))));

    shutdown.trigger();
    runner.join().unwrap().unwrap();

    let sent = sink.sent();
    let alerts = sent.iter().filter(|p| p.text.contains("[ALERT]")).count();
    assert!(alerts >= 1);
    assert!(sent
        .iter()
        .filter(|p| p.text.contains("[ALERT]"))
        .all(|p| p.text.contains("PROCESSING")));

    let (opened, released) = pipeline.connections();
    assert_eq!(opened, released);
}

#[test]
fn test_failing_category_keeps_loops_alive() {
    let pipeline = FakePipeline::default();
    pipeline.fail_category("uploading");
    pipeline.set_rows("processing", vec![stale_record("doc-9")]);
    let sink = Arc::new(RecordingSink::default());
    let backlog = Arc::new(Backlog::new());
    let (detector, resolver) = build(
        &pipeline,
        &sink,
        &backlog,
        vec![
            category("uploading", Duration::from_secs(60)),
            category("processing", Duration::from_secs(60)),
        ],
    );

    let shutdown = ShutdownSignal::new();
    let runner = {
        let shutdown = shutdown.clone();
        thread::spawn(move || run_loops(detector, resolver, &shutdown))
    };

    // Several detector cycles must pass despite the failing category.
    assert!(wait_for(WAIT, || sink.sent().len() >= 3));
    assert!(!runner.is_finished());
    assert_eq!(backlog.len(), 1);

    shutdown.trigger();
    runner.join().unwrap().unwrap();
}

#[test]
fn test_shutdown_interrupts_long_sleep() {
    let pipeline = FakePipeline::default();
    let sink = Arc::new(RecordingSink::default());
    let backlog = Arc::new(Backlog::new());
    let sink_dyn: Arc<dyn NotificationSink> = Arc::clone(&sink) as Arc<dyn NotificationSink>;

    let detector = Detector::new(
        Box::new(pipeline.clone()),
        Arc::clone(&sink_dyn),
        Arc::clone(&backlog),
        vec![category("processing", Duration::from_secs(60))],
        DetectorSettings {
            interval: Duration::from_secs(3600),
            ..DetectorSettings::default()
        },
    );
    let resolver = Resolver::new(
        Box::new(pipeline.clone()),
        sink_dyn,
        Arc::clone(&backlog),
        ResolverSettings {
            interval: Duration::from_secs(3600),
            ..ResolverSettings::default()
        },
    );

    let shutdown = ShutdownSignal::new();
    let runner = {
        let shutdown = shutdown.clone();
        thread::spawn(move || run_loops(detector, resolver, &shutdown))
    };

    assert!(wait_for(WAIT, || pipeline.connections().0 >= 1));
    let started = Instant::now();
    shutdown.trigger();
    runner.join().unwrap().unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
}
