// API client module: a small blocking HTTP client for the document parsing
// server. It knows the two endpoints the exerciser needs (`/docs` for the
// liveness probe and `/file_parse` for uploads) and the shape of the JSON the
// parse endpoint returns.

use crate::config::ExerciserConfig;
use crate::error::ScenarioError;
use anyhow::{Context, Result};
use reqwest::blocking::{multipart, Client, Response};
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::debug;

pub const PDF_MIME: &str = "application/pdf";
pub const ZIP_MIME: &str = "application/zip";

/// Blocking client bound to one parse server.
#[derive(Clone)]
pub struct ParseClient {
    client: Client,
    endpoint: String,
    docs_url: String,
}

/// A document read fully into memory, ready to be sent as a `files` part.
#[derive(Clone, Debug)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Form fields sent alongside the uploaded files. `None` fields are left out
/// of the form so the server falls back to its own default.
#[derive(Clone, Debug)]
pub struct ParseOptions {
    pub output_dir: PathBuf,
    pub lang_list: Vec<String>,
    pub backend: String,
    pub parse_method: Option<String>,
    pub formula_enable: bool,
    pub table_enable: bool,
    pub return_md: bool,
    pub return_middle_json: bool,
    pub return_model_output: bool,
    pub return_content_list: bool,
    pub return_images: bool,
    pub response_format_zip: bool,
    pub f_draw_layout_bbox: Option<bool>,
    pub f_draw_span_bbox: Option<bool>,
    pub f_dump_orig_pdf: Option<bool>,
    pub start_page_id: u32,
    pub end_page_id: u32,
}

/// JSON body returned by `/file_parse` when `response_format_zip=false`.
#[derive(Debug, Deserialize)]
pub struct ParseResponse {
    #[serde(default)]
    pub backend: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// File name -> per-document result, in server order.
    #[serde(default)]
    pub results: Map<String, Value>,
}

/// Per-document entry of `ParseResponse::results`. Only the fields the
/// exerciser reports on are modelled; everything else is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct DocumentResult {
    /// Outer `None`: key absent. `Some(None)`: key present but null.
    #[serde(default, deserialize_with = "present")]
    pub md_content: Option<Option<String>>,
    /// Image name -> base64 payload, in server order.
    #[serde(default)]
    pub images: Option<Map<String, Value>>,
}

/// Raw body of a ZIP-format response.
#[derive(Debug)]
pub struct ZipPayload {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

fn present<'de, D, T>(de: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

impl UploadFile {
    /// Read a sample from disk. A missing file is reported as
    /// `MissingInput` so callers can skip it without touching the network.
    pub fn read(path: &Path) -> std::result::Result<Self, ScenarioError> {
        if !path.exists() {
            return Err(ScenarioError::MissingInput {
                path: path.to_path_buf(),
            });
        }
        let bytes = std::fs::read(path).map_err(|e| ScenarioError::io(path, e))?;
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("document.pdf")
            .to_string();
        Ok(UploadFile { file_name, bytes })
    }
}

impl ParseOptions {
    /// Baseline options: one Chinese-language document, `auto` parse
    /// method, formula and table recognition on, nothing returned yet.
    pub fn new(output_dir: impl Into<PathBuf>, backend: impl Into<String>) -> Self {
        ParseOptions {
            output_dir: output_dir.into(),
            lang_list: vec!["ch".into()],
            backend: backend.into(),
            parse_method: Some("auto".into()),
            formula_enable: true,
            table_enable: true,
            return_md: false,
            return_middle_json: false,
            return_model_output: false,
            return_content_list: false,
            return_images: false,
            response_format_zip: false,
            f_draw_layout_bbox: None,
            f_draw_span_bbox: None,
            f_dump_orig_pdf: None,
            start_page_id: 0,
            end_page_id: 99999,
        }
    }

    /// Text fields in the order they are written to the multipart form.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("output_dir", self.output_dir.display().to_string())];
        for lang in &self.lang_list {
            fields.push(("lang_list", lang.clone()));
        }
        fields.push(("backend", self.backend.clone()));
        if let Some(method) = &self.parse_method {
            fields.push(("parse_method", method.clone()));
        }
        let flags = [
            ("formula_enable", self.formula_enable),
            ("table_enable", self.table_enable),
            ("return_md", self.return_md),
            ("return_middle_json", self.return_middle_json),
            ("return_model_output", self.return_model_output),
            ("return_content_list", self.return_content_list),
            ("return_images", self.return_images),
            ("response_format_zip", self.response_format_zip),
        ];
        for (name, value) in flags {
            fields.push((name, value.to_string()));
        }
        let debug_flags = [
            ("f_draw_layout_bbox", self.f_draw_layout_bbox),
            ("f_draw_span_bbox", self.f_draw_span_bbox),
            ("f_dump_orig_pdf", self.f_dump_orig_pdf),
        ];
        for (name, value) in debug_flags {
            if let Some(v) = value {
                fields.push((name, v.to_string()));
            }
        }
        fields.push(("start_page_id", self.start_page_id.to_string()));
        fields.push(("end_page_id", self.end_page_id.to_string()));
        fields
    }
}

impl ParseResponse {
    /// Decode every entry of `results` into a `DocumentResult`.
    pub fn documents(&self) -> std::result::Result<Vec<(String, DocumentResult)>, serde_json::Error> {
        self.results
            .iter()
            .map(|(name, value)| Ok((name.clone(), DocumentResult::deserialize(value)?)))
            .collect()
    }
}

impl DocumentResult {
    /// Markdown length in characters, if the server returned the key.
    pub fn markdown_len(&self) -> Option<usize> {
        self.md_content
            .as_ref()
            .map(|md| md.as_deref().map_or(0, |s| s.chars().count()))
    }

    /// First `max_chars` characters of the markdown, if there is any.
    pub fn markdown_preview(&self, max_chars: usize) -> Option<String> {
        match &self.md_content {
            Some(Some(md)) if !md.is_empty() => Some(md.chars().take(max_chars).collect()),
            _ => None,
        }
    }
}

impl ParseClient {
    pub fn new(config: &ExerciserConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ParseClient {
            client,
            endpoint: config.endpoint(),
            docs_url: config.docs_url(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// GET the documentation page. Only a 200 counts as alive.
    pub fn is_alive(&self, timeout: Duration) -> bool {
        match self.client.get(&self.docs_url).timeout(timeout).send() {
            Ok(res) => {
                debug!(status = %res.status(), url = %self.docs_url, "liveness probe");
                res.status() == StatusCode::OK
            }
            Err(e) => {
                debug!(error = %e, url = %self.docs_url, "liveness probe failed");
                false
            }
        }
    }

    /// POST the files and expect a JSON body back.
    pub fn parse_json(
        &self,
        files: Vec<UploadFile>,
        options: &ParseOptions,
        timeout: Duration,
    ) -> std::result::Result<ParseResponse, ScenarioError> {
        let res = self.post_form(files, options, timeout)?;
        let body = res
            .bytes()
            .map_err(|e| ScenarioError::from_request(e, &self.endpoint))?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// POST the files and keep the body as raw bytes, with its content type.
    pub fn parse_zip(
        &self,
        files: Vec<UploadFile>,
        options: &ParseOptions,
        timeout: Duration,
    ) -> std::result::Result<ZipPayload, ScenarioError> {
        let res = self.post_form(files, options, timeout)?;
        let content_type = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let bytes = res
            .bytes()
            .map_err(|e| ScenarioError::from_request(e, &self.endpoint))?
            .to_vec();
        Ok(ZipPayload {
            content_type,
            bytes,
        })
    }

    fn post_form(
        &self,
        files: Vec<UploadFile>,
        options: &ParseOptions,
        timeout: Duration,
    ) -> std::result::Result<Response, ScenarioError> {
        let mut form = multipart::Form::new();
        for file in files {
            let part = multipart::Part::bytes(file.bytes)
                .file_name(file.file_name)
                .mime_str(PDF_MIME)
                .map_err(ScenarioError::Request)?;
            form = form.part("files", part);
        }
        for (name, value) in options.fields() {
            form = form.text(name, value);
        }

        debug!(url = %self.endpoint, backend = %options.backend, "posting parse request");
        let started = Instant::now();
        let res = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .timeout(timeout)
            .send()
            .map_err(|e| ScenarioError::from_request(e, &self.endpoint))?;
        debug!(status = %res.status(), elapsed_ms = started.elapsed().as_millis() as u64, "parse request finished");

        if res.status() != StatusCode::OK {
            let status = res.status();
            let body = res.text().unwrap_or_default();
            return Err(ScenarioError::Status { status, body });
        }
        Ok(res)
    }
}
