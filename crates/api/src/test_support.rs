//! Fakes and helpers shared by route tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{Router, body::Body, http::Request, response::Response};
use chrono::{DateTime, Local, TimeZone};
use http_body_util::BodyExt;
use shareflow_core::relay::{
    FileStore, LogRanges, RelayService, RemoteError, SheetLog, StoredFileRef, UploadedFile,
};
use tower::ServiceExt;

use crate::{AppState, create_router};

/// Recording file store. Calls are recorded once they complete.
#[derive(Default)]
pub struct FakeStore {
    pub files: Mutex<Vec<UploadedFile>>,
    pub fail_with: Option<RemoteError>,
    pub no_id: bool,
    pub delay: Option<Duration>,
}

impl FileStore for FakeStore {
    async fn create_file(&self, file: &UploadedFile) -> Result<Option<StoredFileRef>, RemoteError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.files.lock().unwrap().push(file.clone());
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None if self.no_id => Ok(None),
            None => Ok(Some(StoredFileRef::new("F123"))),
        }
    }
}

/// Recording sheet log. Calls are recorded once they complete.
#[derive(Default)]
pub struct FakeLog {
    pub rows: Mutex<Vec<(String, Vec<String>)>>,
    pub fail_with: Option<RemoteError>,
    pub delay: Option<Duration>,
}

impl SheetLog for FakeLog {
    async fn append_row(&self, range: &str, values: Vec<String>) -> Result<(), RemoteError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.rows.lock().unwrap().push((range.to_string(), values));
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// Test application with handles on its fakes.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<FakeStore>,
    pub log: Arc<FakeLog>,
}

impl TestApp {
    pub fn new(store: FakeStore, log: FakeLog) -> Self {
        Self::with_limit(store, log, 1024 * 1024)
    }

    pub fn with_limit(store: FakeStore, log: FakeLog, max_upload_bytes: usize) -> Self {
        let store = Arc::new(store);
        let log = Arc::new(log);
        let relay = RelayService::new(store.clone(), log.clone(), LogRanges::default())
            .with_clock(fixed_clock);
        let router = create_router(AppState::new(relay, max_upload_bytes));
        Self { router, store, log }
    }

    pub fn stored_count(&self) -> usize {
        self.store.files.lock().unwrap().len()
    }

    pub fn rows(&self) -> Vec<(String, Vec<String>)> {
        self.log.rows.lock().unwrap().clone()
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Serves the router on an ephemeral local port.
    pub async fn serve(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }
}

/// Reads a response body as JSON.
pub async fn json_body(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Reads a response body as text.
pub async fn text_body(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Display form of [`fixed_clock`].
pub const TIMESTAMP: &str = "10/18/2026, 3:04:05\u{202f}PM";

pub fn fixed_clock() -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 10, 18, 15, 4, 5).unwrap()
}
