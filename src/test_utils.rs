//! Scratch databases, upload directories and hand-built requests for tests.

use crate::{
    config::{DbConfig, RuntimeConfiguration},
    data::store::RecordStore,
    state::RosterState,
};
use axum::{
    body::Body,
    http::{Request, header},
    response::Response,
};
use http_body_util::BodyExt;
use std::{collections::HashMap, env::VarError};
use tempfile::TempDir;

const BOUNDARY: &str = "roster-test-boundary";
pub const TEST_MAX_UPLOAD_BYTES: usize = 64 * 1024;

///keep the `TempDir` alive for as long as the store is used
pub async fn scratch_store() -> (TempDir, RecordStore) {
    let dir = TempDir::new().unwrap();
    let store = RecordStore::open(&DbConfig {
        path: dir.path().join("db").join("school.db"),
        max_connections: 2,
    })
    .await
    .unwrap();
    (dir, store)
}

///a full state with its database and static directory inside a fresh `TempDir`
pub async fn scratch_state() -> (TempDir, RosterState) {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let vars: HashMap<&'static str, String> = HashMap::from([
        (
            "ROSTER_DB_PATH",
            root.join("db/school.db").to_string_lossy().into_owned(),
        ),
        (
            "ROSTER_STATIC_DIR",
            root.join("static").to_string_lossy().into_owned(),
        ),
        (
            "ROSTER_UPLOAD_DIR",
            root.join("static/uploads").to_string_lossy().into_owned(),
        ),
        (
            "ROSTER_DEFAULT_IMAGE",
            root.join("static/images/account.jpg")
                .to_string_lossy()
                .into_owned(),
        ),
        ("ROSTER_MAX_UPLOAD_BYTES", TEST_MAX_UPLOAD_BYTES.to_string()),
    ]);

    let config = RuntimeConfiguration::from_lookup(|name| {
        vars.get(name)
            .cloned()
            .ok_or(dotenvy::Error::EnvVar(VarError::NotPresent))
    })
    .unwrap();
    let state = RosterState::new(config).await.unwrap();
    (dir, state)
}

pub async fn body_string(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

///a `multipart/form-data` body, built up one part at a time
#[derive(Default)]
pub struct MultipartBody {
    bytes: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, contents: &[u8]) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        self.bytes.extend_from_slice(contents);
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    pub fn into_request(mut self, uri: &str) -> Request<Body> {
        self.bytes
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::post(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header(header::CONTENT_LENGTH, self.bytes.len())
            .body(Body::from(self.bytes))
            .unwrap()
    }
}
