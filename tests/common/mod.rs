//! Mock parse server used by the integration tests.
//!
//! An axum router serving `/docs` and `/file_parse` with canned responses on
//! its own tokio runtime thread, so the blocking client under test can talk
//! to it from the test thread. Every request is recorded, multipart fields
//! included, before the response goes out.

#![allow(dead_code)]

use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use parse_api_exerciser::{ExerciserConfig, Scenario};
use std::path::Path;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

/// A file part received under the `files` field.
#[derive(Clone, Debug)]
pub struct UploadedPart {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug)]
pub struct Recorded {
    pub method: &'static str,
    pub path: &'static str,
    pub fields: Vec<(String, String)>,
    pub files: Vec<UploadedPart>,
}

impl Recorded {
    /// Values of a text field, in the order they were sent.
    pub fn form_values(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

#[derive(Clone)]
pub struct Canned {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Canned {
    pub fn json(status: u16, body: &str) -> Self {
        Canned {
            status,
            content_type: "application/json",
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn bytes(content_type: &'static str, body: &[u8]) -> Self {
        Canned {
            status: 200,
            content_type,
            body: body.to_vec(),
        }
    }

    pub fn docs_ok() -> Self {
        Canned {
            status: 200,
            content_type: "text/html",
            body: b"<html>docs</html>".to_vec(),
        }
    }
}

impl IntoResponse for Canned {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

#[derive(Clone)]
struct MockState {
    docs: Canned,
    parse: Canned,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockState {
    fn record(&self, request: Recorded) {
        self.requests.lock().unwrap().push(request);
    }
}

async fn docs(State(state): State<MockState>) -> Canned {
    state.record(Recorded {
        method: "GET",
        path: "/docs",
        fields: Vec::new(),
        files: Vec::new(),
    });
    state.docs.clone()
}

async fn file_parse(State(state): State<MockState>, mut multipart: Multipart) -> Canned {
    let mut fields = Vec::new();
    let mut files = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
                files.push(UploadedPart {
                    field: name,
                    file_name,
                    content_type,
                    bytes,
                });
            }
            None => {
                let value = field.text().await.unwrap_or_default();
                fields.push((name, value));
            }
        }
    }
    state.record(Recorded {
        method: "POST",
        path: "/file_parse",
        fields,
        files,
    });
    state.parse.clone()
}

pub struct MockServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockServer {
    /// Serve `docs` on `GET /docs` and `parse` on `POST /file_parse`.
    pub fn start(docs_response: Canned, parse_response: Canned) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            docs: docs_response,
            parse: parse_response,
            requests: Arc::clone(&requests),
        };
        let app = Router::new()
            .route("/docs", get(docs))
            .route("/file_parse", post(file_parse))
            .with_state(state);

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
                tx.send(listener.local_addr().unwrap()).unwrap();
                axum::serve(listener, app).await.unwrap();
            });
        });
        let addr = rx.recv().unwrap();
        MockServer {
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    /// A live server whose parse endpoint answers with `parse_response`.
    pub fn parse_returns(parse_response: Canned) -> Self {
        Self::start(Canned::docs_ok(), parse_response)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn posts(&self) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == "POST")
            .collect()
    }
}

/// A base URL nothing is listening on.
pub fn dead_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Write small stand-in PDFs into `dir`.
pub fn write_samples(dir: &Path, names: &[&str]) {
    for name in names {
        std::fs::write(dir.join(name), format!("%PDF-1.4 {}", name)).unwrap();
    }
}

pub fn config_for(
    base_url: &str,
    sample_dir: &Path,
    output_dir: &Path,
    enabled: Vec<Scenario>,
) -> ExerciserConfig {
    ExerciserConfig {
        base_url: base_url.to_string(),
        sample_dir: sample_dir.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        enabled,
        ..ExerciserConfig::default()
    }
}
