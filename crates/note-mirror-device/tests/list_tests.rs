mod common;

use std::time::Duration;

use note_mirror::{DeviceConfig, ListingError};
use note_mirror_device::{AsyncMirror, BlockingMirror};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve_fixture(server: &MockServer) {
    let fixture = include_str!("fixtures/listing_note.html");
    Mock::given(method("GET"))
        .and(path("/Note"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(fixture, "text/html"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn async_list_parses_device_page() {
    let server = MockServer::start().await;
    serve_fixture(&server).await;
    let dir = tempfile::tempdir().unwrap();

    let mirror = AsyncMirror::new(DeviceConfig::new(server.uri(), dir.path())).unwrap();
    let session = mirror.session(4);
    let entries = mirror.list_files(&session, "Note").await.unwrap();
    session.close();

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].name, "a.note");
    assert_eq!(entries[0].size, Some(100));
    assert_eq!(entries[1].date.as_deref(), Some("2024-05-02 18:40"));
    assert!(entries[2].is_directory);
    assert_eq!(entries[2].uri, "/Note/Sub");
    assert_eq!(entries[2].size, None);
}

#[tokio::test]
async fn blocking_list_parses_device_page() {
    let server = MockServer::start().await;
    serve_fixture(&server).await;
    let dir = tempfile::tempdir().unwrap();
    let config = DeviceConfig::new(server.uri(), dir.path());

    let entries = tokio::task::spawn_blocking(move || {
        let mirror = BlockingMirror::new(config).unwrap();
        mirror.list_files("/Note")
    })
    .await
    .unwrap()
    .unwrap();

    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["a.note", "b.note", "Sub"]);
}

#[tokio::test]
async fn empty_directory_lists_nothing() {
    let server = MockServer::start().await;
    common::mount_listing(&server, "/Empty", &[]).await;
    let dir = tempfile::tempdir().unwrap();

    let mirror = AsyncMirror::new(DeviceConfig::new(server.uri(), dir.path())).unwrap();
    let session = mirror.session(1);
    let entries = mirror.list_files(&session, "Empty").await.unwrap();
    session.close();

    assert!(entries.is_empty());
}

#[tokio::test]
async fn root_listing_uses_bare_remote_root() {
    let server = MockServer::start().await;
    common::mount_listing(&server, "/", &[common::dir_entry("/Note")]).await;
    let dir = tempfile::tempdir().unwrap();

    let mirror = AsyncMirror::new(DeviceConfig::new(server.uri(), dir.path())).unwrap();
    let session = mirror.session(1);
    let entries = mirror.list_files(&session, "").await.unwrap();
    session.close();

    assert_eq!(entries.len(), 1);
    assert!(entries[0].is_directory);
}

#[tokio::test]
async fn http_error_is_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    let mirror = AsyncMirror::new(DeviceConfig::new(server.uri(), dir.path())).unwrap();
    let session = mirror.session(1);
    let result = mirror.list_files(&session, "Missing").await;
    session.close();

    assert!(matches!(result, Err(ListingError::Status(404))));
}

#[tokio::test]
async fn page_without_payload_is_missing_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Note"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>login</body></html>"))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    let mirror = AsyncMirror::new(DeviceConfig::new(server.uri(), dir.path())).unwrap();
    let session = mirror.session(1);
    let result = mirror.list_files(&session, "Note").await;
    session.close();

    assert!(matches!(result, Err(ListingError::MissingPayload)));
}

#[tokio::test]
async fn slow_listing_times_out_as_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(common::listing_page(&[]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    let config = DeviceConfig::new(server.uri(), dir.path())
        .with_timeouts(Duration::from_millis(200), Duration::from_secs(5));
    let mirror = AsyncMirror::new(config).unwrap();
    let session = mirror.session(1);
    let result = mirror.list_files(&session, "Slow").await;
    session.close();

    assert!(matches!(result, Err(ListingError::Network(_))));
}
