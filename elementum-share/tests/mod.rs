use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;

use elementum_host::{ForeignMemory, HostEngine, HostError, HostLink, LinearMemory};
use elementum_share::files::{read_snapshot, write_snapshot, DEFAULT_FILE_NAME};
use elementum_share::{HttpShareClient, LoadOutcome, ShareBackend, ShareError, StateTransfer};

/// Accepts snapshots starting with `E`, like a host validating its header.
struct SnapshotEngine {
    state: Vec<u8>,
    mem: LinearMemory,
}

impl SnapshotEngine {
    fn new() -> Self {
        Self {
            state: b"E-initial".to_vec(),
            mem: LinearMemory::new(64),
        }
    }
}

impl HostEngine for SnapshotEngine {
    fn seed(&mut self, _seed: [u32; 6]) -> Result<(), HostError> {
        Ok(())
    }
    fn set_size(&mut self, _w: u32, _h: u32) -> Result<(), HostError> {
        Ok(())
    }
    fn canvas_size(&mut self) -> Result<(u32, u32), HostError> {
        Ok((0, 0))
    }
    fn tick(&mut self) -> Result<(), HostError> {
        self.state.push(b'.');
        Ok(())
    }
    fn draw(&mut self) -> Result<(), HostError> {
        Ok(())
    }
    fn change_scene(&mut self, _scene: i32) -> Result<(), HostError> {
        self.state = b"E-scene".to_vec();
        Ok(())
    }
    fn frame_peak(&mut self) -> Result<f32, HostError> {
        Ok(0.0)
    }
    fn export_snapshot(&mut self) -> Result<Vec<u8>, HostError> {
        Ok(self.state.clone())
    }
    fn import_snapshot(&mut self, bytes: &[u8]) -> Result<bool, HostError> {
        if bytes.first() == Some(&b'E') {
            self.state = bytes.to_vec();
            Ok(true)
        } else {
            Ok(false)
        }
    }
    fn memory(&mut self) -> &mut dyn ForeignMemory {
        &mut self.mem
    }
}

fn attached() -> HostLink {
    let mut link = HostLink::new();
    link.attach(Box::new(SnapshotEngine::new()));
    link
}

fn host_state(link: &mut HostLink) -> Vec<u8> {
    link.engine().unwrap().export_snapshot().unwrap()
}

// ============================================================================
// StateTransfer - Export / Import / Cache
// ============================================================================

#[test]
fn test_not_ready_before_attach() {
    let mut link = HostLink::new();
    let mut transfer = StateTransfer::new();
    assert_eq!(transfer.save(&mut link).unwrap_err(), HostError::NotReady);
    assert_eq!(transfer.load(&mut link).unwrap_err(), HostError::NotReady);
    assert_eq!(transfer.begin_share(&mut link).unwrap_err(), HostError::NotReady);
    assert!(!transfer.is_uploading());
}

#[test]
fn test_import_of_export_is_accepted_and_reexports_identically() {
    let mut link = attached();
    let mut transfer = StateTransfer::new();
    link.engine().unwrap().tick().unwrap();

    let snapshot = transfer.export_state(&mut link).unwrap();
    link.engine().unwrap().change_scene(0).unwrap();
    assert!(transfer.import_state(&mut link, snapshot.clone()).unwrap());
    assert_eq!(transfer.export_state(&mut link).unwrap(), snapshot);
    assert_eq!(transfer.cached(), Some(snapshot.as_slice()));
}

#[test]
fn test_corrupted_import_rejected_and_load_restores_last_good() {
    let mut link = attached();
    let mut transfer = StateTransfer::new();
    let good = transfer.save(&mut link).unwrap();

    link.engine().unwrap().tick().unwrap();
    let before = host_state(&mut link);
    assert!(!transfer.import_state(&mut link, b"garbage".to_vec()).unwrap());
    assert_eq!(host_state(&mut link), before);
    assert_eq!(transfer.cached(), Some(good.as_slice()));

    assert_eq!(transfer.load(&mut link).unwrap(), LoadOutcome::Restored);
    assert_eq!(host_state(&mut link), good);
}

#[test]
fn test_load_without_cache_resets_scene() {
    let mut link = attached();
    let mut transfer = StateTransfer::new();
    assert_eq!(transfer.load(&mut link).unwrap(), LoadOutcome::Reset);
    assert_eq!(host_state(&mut link), b"E-scene".to_vec());
}

// ============================================================================
// StateTransfer - Single-Flight Share
// ============================================================================

#[test]
fn test_second_share_while_busy_is_ignored() {
    let mut link = attached();
    let mut transfer = StateTransfer::new();
    assert!(transfer.begin_share(&mut link).unwrap().is_some());
    assert!(transfer.is_uploading());
    assert!(transfer.begin_share(&mut link).unwrap().is_none());
}

#[test]
fn test_rate_limited_share_clears_busy_and_allows_retry() {
    let mut link = attached();
    let mut transfer = StateTransfer::new();
    transfer.begin_share(&mut link).unwrap();
    transfer.finish_share(&Err(ShareError::RateLimited));
    assert!(!transfer.is_uploading());
    assert!(transfer.begin_share(&mut link).unwrap().is_some());
}

#[test]
fn test_successful_share_stays_busy_until_dialog_closed() {
    let mut link = attached();
    let mut transfer = StateTransfer::new();
    transfer.begin_share(&mut link).unwrap();
    transfer.finish_share(&Ok("abcdefghij_klmnopqr-tu".into()));
    assert!(transfer.is_uploading());
    assert!(transfer.begin_share(&mut link).unwrap().is_none());
    transfer.share_dialog_closed();
    assert!(!transfer.is_uploading());
}

#[test]
fn test_share_caches_snapshot() {
    let mut link = attached();
    let mut transfer = StateTransfer::new();
    let sent = transfer.begin_share(&mut link).unwrap().unwrap();
    assert_eq!(transfer.cached(), Some(sent.as_slice()));
}

// ============================================================================
// ShareError
// ============================================================================

#[test]
fn test_status_mapping() {
    assert_eq!(ShareError::from_status(400), ShareError::InvalidPayload);
    assert_eq!(ShareError::from_status(413), ShareError::TooLarge);
    assert_eq!(ShareError::from_status(429), ShareError::RateLimited);
    assert!(matches!(ShareError::from_status(503), ShareError::Unknown(_)));
}

#[test]
fn test_user_messages_are_distinct() {
    let messages = [
        ShareError::InvalidPayload.user_message(),
        ShareError::RateLimited.user_message(),
        ShareError::TooLarge.user_message(),
        ShareError::Unknown(String::new()).user_message(),
    ];
    for (i, a) in messages.iter().enumerate() {
        for b in &messages[i + 1..] {
            assert_ne!(a, b);
        }
    }
    assert!(ShareError::RateLimited.user_message().contains("3 minutes"));
}

// ============================================================================
// HttpShareClient (against a local axum server)
// ============================================================================

#[derive(Default)]
struct Server {
    status: u16,
    uploads: AtomicUsize,
    headers: Mutex<Option<HeaderMap>>,
    stored: Mutex<HashMap<String, Vec<u8>>>,
}

const ISSUED_ID: &str = "AAAAAAAAAAAAAAAAAAAAAA";

async fn upload(State(srv): State<Arc<Server>>, headers: HeaderMap, body: Bytes) -> (StatusCode, String) {
    srv.uploads.fetch_add(1, Ordering::SeqCst);
    *srv.headers.lock().unwrap() = Some(headers);
    let status = StatusCode::from_u16(srv.status).unwrap();
    if status.is_success() {
        srv.stored.lock().unwrap().insert(ISSUED_ID.to_string(), body.to_vec());
        (status, format!("{ISSUED_ID}\n"))
    } else {
        (status, String::new())
    }
}

async fn fetch(State(srv): State<Arc<Server>>, Query(q): Query<HashMap<String, String>>) -> (StatusCode, Vec<u8>) {
    let id = q.get("f").cloned().unwrap_or_default();
    match srv.stored.lock().unwrap().get(&id) {
        Some(bytes) => (StatusCode::OK, bytes.clone()),
        None => (StatusCode::NOT_FOUND, Vec::new()),
    }
}

async fn serve(status: u16) -> (String, Arc<Server>) {
    let srv = Arc::new(Server {
        status,
        ..Default::default()
    });
    let app = Router::new()
        .route("/elementumstate.emb", post(upload).get(fetch))
        .with_state(srv.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/"), srv)
}

#[tokio::test]
async fn test_upload_success_returns_trimmed_id_and_sends_headers() {
    let (base, srv) = serve(200).await;
    let client = HttpShareClient::new(&base);
    let id = client.upload(b"E-state".to_vec()).await.unwrap();
    assert_eq!(id, ISSUED_ID);

    let headers = srv.headers.lock().unwrap().clone().unwrap();
    assert_eq!(headers["content-type"], "application/octet-stream");
    assert_eq!(headers["content-size"], "7");
}

#[tokio::test]
async fn test_upload_statuses_map_to_errors() {
    for (status, expected) in [
        (400, ShareError::InvalidPayload),
        (413, ShareError::TooLarge),
        (429, ShareError::RateLimited),
    ] {
        let (base, srv) = serve(status).await;
        let err = HttpShareClient::new(&base).upload(vec![1]).await.unwrap_err();
        assert_eq!(err, expected);
        assert_eq!(srv.uploads.load(Ordering::SeqCst), 1);
    }

    let (base, _) = serve(500).await;
    let err = HttpShareClient::new(&base).upload(vec![1]).await.unwrap_err();
    assert!(matches!(err, ShareError::Unknown(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_unknown() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let err = HttpShareClient::new(&format!("http://{addr}"))
        .upload(vec![1])
        .await
        .unwrap_err();
    assert!(matches!(err, ShareError::Unknown(_)));
}

#[tokio::test]
async fn test_fetch_round_trip_and_missing_id() {
    let (base, _) = serve(200).await;
    let client = HttpShareClient::new(&base);
    let id = client.upload(b"E-shared".to_vec()).await.unwrap();

    assert_eq!(client.fetch(&id).await.unwrap(), Some(b"E-shared".to_vec()));
    assert_eq!(client.fetch("BBBBBBBBBBBBBBBBBBBBBB").await.unwrap(), None);
}

#[test]
fn test_link_for_id() {
    let client = HttpShareClient::new("https://example.org/");
    assert_eq!(
        client.link_for("abcdefghij_klmnopqr-tu"),
        "https://example.org/elementum/abcdefghij_klmnopqr-tu/"
    );
}

// ============================================================================
// Snapshot Files
// ============================================================================

#[tokio::test]
async fn test_file_round_trip_forces_extension() {
    let dir = tempfile::tempdir().unwrap();
    let written = write_snapshot(&dir.path().join("mine.bin"), b"E-file").await.unwrap();
    assert_eq!(written.extension().unwrap(), "elem");
    assert_eq!(read_snapshot(&written).await.unwrap(), b"E-file".to_vec());

    let default = write_snapshot(&dir.path().join(DEFAULT_FILE_NAME), b"E").await.unwrap();
    assert!(default.ends_with(DEFAULT_FILE_NAME));
}

#[tokio::test]
async fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(read_snapshot(&dir.path().join("absent.elem")).await.is_err());
}
