//! Shared fakes for the pipeline source and notification sink

use anyhow::{bail, Result};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use stalewatch::models::{
    AlertPayload, AlertTemplate, Category, CategoryQuery, DocumentRecord, ResolvedDocument,
};
use stalewatch::notify::NotificationSink;
use stalewatch::source::{PipelineSource, SourceConnection};

#[derive(Default)]
pub struct PipelineState {
    pub rows: HashMap<String, Vec<DocumentRecord>>,
    pub failing_categories: HashSet<String>,
    pub resolved: HashMap<String, String>,
    pub opened: usize,
    pub released: usize,
}

/// In-memory pipeline whose contents tests can change while loops run.
#[derive(Clone, Default)]
pub struct FakePipeline {
    pub state: Arc<Mutex<PipelineState>>,
}

impl FakePipeline {
    pub fn set_rows(&self, category: &str, rows: Vec<DocumentRecord>) {
        self.state
            .lock()
            .unwrap()
            .rows
            .insert(category.to_string(), rows);
    }

    pub fn fail_category(&self, category: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_categories
            .insert(category.to_string());
    }

    /// Move documents out of every category and into a terminal status.
    pub fn finish(&self, ids: &[&str], status: &str) {
        let mut state = self.state.lock().unwrap();
        for rows in state.rows.values_mut() {
            rows.retain(|r| !ids.contains(&r.identifier.as_str()));
        }
        for id in ids {
            state.resolved.insert(id.to_string(), status.to_string());
        }
    }

    pub fn connections(&self) -> (usize, usize) {
        let state = self.state.lock().unwrap();
        (state.opened, state.released)
    }
}

struct FakeConnection {
    state: Arc<Mutex<PipelineState>>,
}

impl Drop for FakeConnection {
    fn drop(&mut self) {
        self.state.lock().unwrap().released += 1;
    }
}

impl PipelineSource for FakePipeline {
    fn connect(&self) -> Result<Box<dyn SourceConnection + '_>> {
        self.state.lock().unwrap().opened += 1;
        Ok(Box::new(FakeConnection {
            state: Arc::clone(&self.state),
        }))
    }
}

impl SourceConnection for FakeConnection {
    fn fetch_category(&mut self, category: &Category) -> Result<Vec<DocumentRecord>> {
        let state = self.state.lock().unwrap();
        if state.failing_categories.contains(&category.name) {
            bail!("statement timeout");
        }
        Ok(state.rows.get(&category.name).cloned().unwrap_or_default())
    }

    fn check_resolved(&mut self, identifier: &str) -> Result<Option<ResolvedDocument>> {
        let state = self.state.lock().unwrap();
        Ok(state.resolved.get(identifier).map(|status| ResolvedDocument {
            identifier: identifier.to_string(),
            status: status.clone(),
        }))
    }
}

#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<AlertPayload>>,
}

impl RecordingSink {
    pub fn sent(&self) -> Vec<AlertPayload> {
        self.sent.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn send(&self, payload: &AlertPayload) -> Result<()> {
        self.sent.lock().unwrap().push(payload.clone());
        Ok(())
    }
}

pub fn category(name: &str, threshold: Duration) -> Category {
    Category {
        name: name.to_string(),
        label: name.to_uppercase(),
        threshold,
        query: CategoryQuery::default(),
        template: AlertTemplate::default(),
    }
}

pub fn stale_record(id: &str) -> DocumentRecord {
    DocumentRecord::new(id, Utc::now() - chrono::Duration::hours(2)).with_classifier("415")
}

/// Poll `condition` until it holds or `timeout` passes.
pub fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}

/// A captured HTTP request body.
pub struct CapturedRequest {
    pub path: String,
    pub body: String,
}

/// Accept one HTTP request on a local port and answer with `status`.
///
/// Returns the base URL and a handle yielding the captured request.
pub fn one_shot_http_server(status: u16) -> (String, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local addr");

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("Failed to accept");
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();

        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let header_end = loop {
            let n = stream.read(&mut chunk).expect("Failed to read request");
            assert!(n > 0, "connection closed before headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = find(&buf, b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let path = head
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .unwrap_or_default()
            .to_string();
        let content_length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);

        while buf.len() < header_end + content_length {
            let n = stream.read(&mut chunk).expect("Failed to read body");
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

        let response = format!(
            "HTTP/1.1 {status} {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            if status < 300 { "OK" } else { "Error" }
        );
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();

        CapturedRequest { path, body }
    });

    (format!("http://{addr}"), handle)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
