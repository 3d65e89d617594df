// Scenario failures. Every variant ends its own scenario only; the driver
// prints it and moves on to the next one.

use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    /// A configured sample file is not on disk.
    #[error("test file does not exist: {}", path.display())]
    MissingInput { path: PathBuf },

    /// None of the multi-file samples were found.
    #[error("no test files available")]
    NoInputs,

    /// The server could not be reached at all.
    #[error("cannot connect to the API server at {url}, make sure the server is running")]
    Connect { url: String },

    /// The server answered with something other than 200.
    #[error("error response ({status}): {body}")]
    Status { status: StatusCode, body: String },

    #[error("{0}")]
    Request(#[source] reqwest::Error),

    #[error("malformed JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScenarioError {
    /// Sort a transport error into the connect / everything-else buckets.
    pub fn from_request(err: reqwest::Error, url: &str) -> Self {
        if err.is_connect() {
            ScenarioError::Connect { url: url.to_string() }
        } else {
            ScenarioError::Request(err)
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScenarioError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_connect(&self) -> bool {
        matches!(self, ScenarioError::Connect { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_message_is_specific() {
        let err = ScenarioError::Connect {
            url: "http://127.0.0.1:1/file_parse".into(),
        };
        assert!(err.to_string().starts_with("cannot connect to the API server"));
        assert!(err.is_connect());
    }

    #[test]
    fn status_message_carries_body() {
        let err = ScenarioError::Status {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: "{\"detail\":\"bad backend\"}".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("422"));
        assert!(msg.contains("bad backend"));
        assert!(!err.is_connect());
    }

    #[test]
    fn missing_input_names_path() {
        let err = ScenarioError::MissingInput {
            path: PathBuf::from("demo/pdfs/demo2.pdf"),
        };
        assert_eq!(err.to_string(), "test file does not exist: demo/pdfs/demo2.pdf");
    }
}
