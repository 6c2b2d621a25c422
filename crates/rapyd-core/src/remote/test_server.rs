//! In-process stand-in for the file service, used by HTTP client tests.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

/// Canned answer for one `/api/files` path.
#[derive(Debug, Clone)]
pub(crate) enum Listing {
    Ok(serde_json::Value),
    Status(u16),
}

#[derive(Debug, Default, Clone)]
pub(crate) struct Fixture {
    listings: HashMap<String, Listing>,
    files: HashMap<String, Vec<u8>>,
    folders: HashMap<String, Vec<u8>>,
}

impl Fixture {
    pub(crate) fn listing(mut self, path: &str, listing: Listing) -> Self {
        self.listings.insert(path.to_string(), listing);
        self
    }

    /// Served by `/api/view`, `/api/thumb` and `/api/download`.
    pub(crate) fn file(mut self, path: &str, bytes: &[u8]) -> Self {
        self.files.insert(path.to_string(), bytes.to_vec());
        self
    }

    /// Served by `/api/download_folder`.
    pub(crate) fn folder(mut self, path: &str, archive: &[u8]) -> Self {
        self.folders.insert(path.to_string(), archive.to_vec());
        self
    }
}

#[derive(Debug, Deserialize)]
struct PathQuery {
    #[serde(default)]
    path: String,
}

/// Starts a server with only listings configured and returns its base URL.
pub(crate) async fn spawn_server(listings: Vec<(&str, Listing)>) -> String {
    let fixture = listings
        .into_iter()
        .fold(Fixture::default(), |f, (path, listing)| f.listing(path, listing));
    spawn(fixture).await
}

/// Starts a server on an ephemeral localhost port and returns its base URL.
pub(crate) async fn spawn(fixture: Fixture) -> String {
    let app = Router::new()
        .route("/api/files", get(files))
        .route("/api/view", get(file_bytes))
        .route("/api/thumb", get(file_bytes))
        .route("/api/download", get(file_bytes))
        .route("/api/download_folder", get(folder_bytes))
        .with_state(Arc::new(fixture));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn files(State(fixture): State<Arc<Fixture>>, Query(query): Query<PathQuery>) -> Response {
    match fixture.listings.get(&query.path) {
        Some(Listing::Ok(body)) => Json(body.clone()).into_response(),
        Some(Listing::Status(code)) => StatusCode::from_u16(*code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn file_bytes(
    State(fixture): State<Arc<Fixture>>,
    Query(query): Query<PathQuery>,
) -> Response {
    match fixture.files.get(&query.path) {
        Some(bytes) => bytes.clone().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn folder_bytes(
    State(fixture): State<Arc<Fixture>>,
    Query(query): Query<PathQuery>,
) -> Response {
    match fixture.folders.get(&query.path) {
        Some(bytes) => bytes.clone().into_response(),
        None => StatusCode::BAD_REQUEST.into_response(),
    }
}
