#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use note_mirror::{SyncEvent, SyncObserver};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn listing_page(entries: &[Value]) -> String {
    let payload = json!({ "fileList": entries }).to_string();
    format!(
        "<html><head><script src=\"/static/js/vendor.js\"></script></head><body>\
         <script type=\"text/javascript\">const json = '{payload}'; render(json);</script>\
         </body></html>"
    )
}

fn name_of(uri: &str) -> &str {
    uri.rsplit('/').next().unwrap_or(uri)
}

pub fn file_entry(uri: &str, size: usize) -> Value {
    json!({
        "uri": uri,
        "name": name_of(uri),
        "isDirectory": false,
        "size": size,
        "date": "2024-05-01 09:12",
    })
}

pub fn file_entry_without_size(uri: &str) -> Value {
    json!({ "uri": uri, "name": name_of(uri), "isDirectory": false })
}

pub fn dir_entry(uri: &str) -> Value {
    json!({ "uri": uri, "name": name_of(uri), "isDirectory": true })
}

pub fn body_of(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

pub async fn mount_listing(server: &MockServer, dir: &str, entries: &[Value]) {
    Mock::given(method("GET"))
        .and(path(dir))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(entries)))
        .mount(server)
        .await;
}

pub async fn mount_file(server: &MockServer, uri: &str, len: usize) {
    mount_file_with(server, uri, ResponseTemplate::new(200).set_body_bytes(body_of(len))).await;
}

pub async fn mount_file_expecting(server: &MockServer, uri: &str, len: usize, hits: u64) {
    Mock::given(method("GET"))
        .and(path(uri))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body_of(len)))
        .expect(hits)
        .mount(server)
        .await;
}

pub async fn mount_file_with(server: &MockServer, uri: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(uri))
        .respond_with(template)
        .mount(server)
        .await;
}

/// `Note/` with `a.note` (100), `b.note` (200) and `Sub/c.note` (50).
pub async fn mount_note_tree(server: &MockServer) {
    mount_listing(
        server,
        "/Note",
        &[
            file_entry("/Note/a.note", 100),
            file_entry("/Note/b.note", 200),
            dir_entry("/Note/Sub"),
        ],
    )
    .await;
    mount_listing(server, "/Note/Sub", &[file_entry("/Note/Sub/c.note", 50)]).await;
}

/// A tree of `dirs` directories with `files_per_dir` delayed files each.
pub async fn mount_wide_tree(server: &MockServer, dirs: usize, files_per_dir: usize, delay: Duration) {
    let mut root_entries = Vec::new();
    for d in 0..dirs {
        let dir = format!("/Wide/D{d}");
        root_entries.push(dir_entry(&dir));

        let mut entries = Vec::new();
        for f in 0..files_per_dir {
            let uri = format!("{dir}/f{f}.note");
            entries.push(file_entry(&uri, 64));
            mount_file_with(
                server,
                &uri,
                ResponseTemplate::new(200)
                    .set_body_bytes(body_of(64))
                    .set_delay(delay),
            )
            .await;
        }
        mount_listing(server, &dir, &entries).await;
    }

    for f in 0..files_per_dir {
        let uri = format!("/Wide/top{f}.note");
        root_entries.push(file_entry(&uri, 64));
        mount_file_with(
            server,
            &uri,
            ResponseTemplate::new(200)
                .set_body_bytes(body_of(64))
                .set_delay(delay),
        )
        .await;
    }
    mount_listing(server, "/Wide", &root_entries).await;
}

/// Tracks how many transfers are between `TransferStarted` and
/// `TransferFinished` at once.
#[derive(Default)]
pub struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
    started: AtomicUsize,
}

impl InFlight {
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }
}

impl SyncObserver for InFlight {
    fn on_event(&self, event: &SyncEvent) {
        match event {
            SyncEvent::TransferStarted { .. } => {
                let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak.fetch_max(now, Ordering::SeqCst);
                self.started.fetch_add(1, Ordering::SeqCst);
            }
            SyncEvent::TransferFinished { .. } => {
                self.current.fetch_sub(1, Ordering::SeqCst);
            }
            _ => {}
        }
    }
}

/// Keeps every event for later assertions.
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<SyncEvent>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<SyncEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl SyncObserver for Recorder {
    fn on_event(&self, event: &SyncEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
