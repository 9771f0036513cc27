//! Webhook delivery against a local HTTP endpoint

use std::time::Duration;

use stalewatch::models::{AlertEvent, AlertPayload, DocumentRecord, RowFormat};
use stalewatch::notify::{NotificationSink, WebhookSink};

use super::helpers::{category, one_shot_http_server};

fn sample_payload() -> AlertPayload {
    let records = vec![
        DocumentRecord::new("1001", chrono::Utc::now()).with_classifier("415"),
        DocumentRecord::new("1002", chrono::Utc::now()),
    ];
    AlertEvent::stale_documents(
        &category("processing", Duration::from_secs(1800)),
        &records,
        &RowFormat::default(),
    )
    .to_payload()
}

#[test]
fn test_webhook_posts_payload_as_json() {
    let (base, server) = one_shot_http_server(200);
    let sink = WebhookSink::new(format!("{base}/hooks/alerts"), Duration::from_secs(5)).unwrap();
    let payload = sample_payload();

    sink.send(&payload).unwrap();

    let request = server.join().unwrap();
    assert_eq!(request.path, "/hooks/alerts");
    let received: AlertPayload = serde_json::from_str(&request.body).unwrap();
    assert_eq!(received, payload);
    assert!(received.attachments[0].text.contains("xml_doc_id: 1002, action_id: n/a"));
}

#[test]
fn test_webhook_rejection_is_an_error() {
    let (base, server) = one_shot_http_server(500);
    let sink = WebhookSink::new(base, Duration::from_secs(5)).unwrap();

    let err = sink.send(&sample_payload()).unwrap_err();
    server.join().unwrap();

    assert!(err.to_string().contains("HTTP 500"), "got: {err}");
}

#[test]
fn test_webhook_unreachable_is_an_error() {
    // Bind then drop to get a port with nothing listening.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let sink = WebhookSink::new(format!("http://{addr}"), Duration::from_secs(2)).unwrap();

    assert!(sink.send(&sample_payload()).is_err());
}
