// The five request configurations exercised against `/file_parse`. Each one
// reads its samples, sends a single request and reports on the answer. A
// scenario never panics or aborts the run: failures come back as
// `ScenarioError` for the driver to print.

use crate::api::{ParseClient, ParseOptions, ParseResponse, UploadFile, ZIP_MIME};
use crate::config::{ExerciserConfig, Scenario};
use crate::error::ScenarioError;
use crate::ui::{with_spinner, Report};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

const PREVIEW_CHARS: usize = 200;
const IMAGES_SHOWN: usize = 3;
const ZIP_FILE_NAME: &str = "test_results.zip";

/// Run one scenario, writing its report lines to `report`.
pub fn run(
    scenario: Scenario,
    client: &ParseClient,
    config: &ExerciserConfig,
    report: &mut Report,
) -> Result<(), ScenarioError> {
    match scenario {
        Scenario::JsonResponse => json_response(client, config, report),
        Scenario::ZipResponse => zip_response(client, config, report),
        Scenario::MultipleFiles => multiple_files(client, config, report),
        Scenario::WithImages => with_images(client, config, report),
        Scenario::AlternateBackend => alternate_backend(client, config, report),
    }
}

/// Every output switched on, draw/dump debugging included.
fn full_options(config: &ExerciserConfig, zip: bool) -> ParseOptions {
    ParseOptions {
        return_md: true,
        return_middle_json: true,
        return_model_output: true,
        return_content_list: true,
        return_images: true,
        response_format_zip: zip,
        f_draw_layout_bbox: Some(true),
        f_draw_span_bbox: Some(true),
        f_dump_orig_pdf: Some(true),
        ..ParseOptions::new(config.output_dir.clone(), config.backend.clone())
    }
}

fn json_response(
    client: &ParseClient,
    config: &ExerciserConfig,
    report: &mut Report,
) -> Result<(), ScenarioError> {
    let file = UploadFile::read(&config.sample_path(&config.json_sample))?;
    let options = full_options(config, false);
    let response = with_spinner("Parsing document...", || {
        client.parse_json(vec![file], &options, config.timeout_for(Scenario::JsonResponse))
    })?;
    report.status_ok();
    report_backend(&response, report);
    report.line(format!("Result count: {}", response.results.len()));
    for (name, doc) in response.documents()? {
        report.line(format!("\nFile: {}", name));
        if let Some(len) = doc.markdown_len() {
            report.line(format!("  Markdown length: {} chars", len));
            if let Some(preview) = doc.markdown_preview(PREVIEW_CHARS) {
                report.line(format!(
                    "  Markdown preview (first {} chars): {}...",
                    PREVIEW_CHARS, preview
                ));
            }
        }
    }
    Ok(())
}

fn zip_response(
    client: &ParseClient,
    config: &ExerciserConfig,
    report: &mut Report,
) -> Result<(), ScenarioError> {
    let file = UploadFile::read(&config.sample_path(&config.zip_sample))?;
    let options = full_options(config, true);
    let payload = with_spinner("Parsing document...", || {
        client.parse_zip(vec![file], &options, config.timeout_for(Scenario::ZipResponse))
    })?;
    report.status_ok();
    report.line(format!("Content-Type: {}", payload.content_type));

    if !payload.content_type.contains(ZIP_MIME) {
        report.warning(format!("unexpected content type: {}", payload.content_type));
        return Ok(());
    }
    std::fs::create_dir_all(&config.output_dir)
        .map_err(|e| ScenarioError::io(&config.output_dir, e))?;
    let zip_path = config.output_dir.join(ZIP_FILE_NAME);
    std::fs::write(&zip_path, &payload.bytes).map_err(|e| ScenarioError::io(&zip_path, e))?;
    report.line(format!("ZIP file saved to: {}", zip_path.display()));
    report.line(format!("ZIP file size: {} bytes", payload.bytes.len()));
    Ok(())
}

fn multiple_files(
    client: &ParseClient,
    config: &ExerciserConfig,
    report: &mut Report,
) -> Result<(), ScenarioError> {
    let mut files = Vec::new();
    for name in &config.multi_samples {
        match UploadFile::read(&config.sample_path(name)) {
            Ok(file) => files.push(file),
            Err(ScenarioError::MissingInput { path }) => {
                report.warning(format!("file does not exist: {}", path.display()));
            }
            Err(e) => return Err(e),
        }
    }
    if files.is_empty() {
        return Err(ScenarioError::NoInputs);
    }

    let options = ParseOptions {
        // One language per uploaded file.
        lang_list: vec!["ch".to_string(); files.len()],
        return_md: true,
        f_draw_layout_bbox: Some(false),
        f_draw_span_bbox: Some(false),
        f_dump_orig_pdf: Some(false),
        ..ParseOptions::new(config.output_dir.clone(), config.backend.clone())
    };
    let response = with_spinner("Parsing documents...", || {
        client.parse_json(files, &options, config.timeout_for(Scenario::MultipleFiles))
    })?;
    report.status_ok();
    report.line(format!("Processed {} files", response.results.len()));
    report_markdown_lengths(&response, report)
}

fn with_images(
    client: &ParseClient,
    config: &ExerciserConfig,
    report: &mut Report,
) -> Result<(), ScenarioError> {
    let file = UploadFile::read(&config.sample_path(&config.image_sample))?;
    let options = ParseOptions {
        return_md: true,
        return_images: true,
        ..ParseOptions::new(config.output_dir.clone(), config.backend.clone())
    };
    let response = with_spinner("Parsing document...", || {
        client.parse_json(vec![file], &options, config.timeout_for(Scenario::WithImages))
    })?;
    report.status_ok();

    for (name, doc) in response.documents()? {
        report.line(format!("\nFile: {}", name));
        let Some(images) = doc.images else { continue };
        report.line(format!("  Extracted images: {}", images.len()));
        for (img_name, data) in images.iter().take(IMAGES_SHOWN) {
            let Some(encoded) = data.as_str() else {
                report.line(format!("    Image: {} (not a base64 string)", img_name));
                continue;
            };
            let decoded = match STANDARD.decode(encoded) {
                Ok(bytes) => format!("{} bytes decoded", bytes.len()),
                Err(_) => "not valid base64".to_string(),
            };
            report.line(format!(
                "    Image: {} (base64 length: {} chars, {})",
                img_name,
                encoded.chars().count(),
                decoded
            ));
        }
    }
    Ok(())
}

fn alternate_backend(
    client: &ParseClient,
    config: &ExerciserConfig,
    report: &mut Report,
) -> Result<(), ScenarioError> {
    let file = UploadFile::read(&config.sample_path(&config.backend_sample))?;
    // Leaving parse_method out lets the backend pick its own default.
    let options = ParseOptions {
        parse_method: None,
        return_md: true,
        ..ParseOptions::new(config.output_dir.clone(), config.backend.clone())
    };
    let response = with_spinner("Parsing document...", || {
        client.parse_json(vec![file], &options, config.timeout_for(Scenario::AlternateBackend))
    })?;
    report.status_ok();
    report_backend(&response, report);
    report_markdown_lengths(&response, report)
}

fn report_backend(response: &ParseResponse, report: &mut Report) {
    report.line(format!(
        "Backend: {}",
        response.backend.as_deref().unwrap_or("None")
    ));
    report.line(format!(
        "Version: {}",
        response.version.as_deref().unwrap_or("None")
    ));
}

fn report_markdown_lengths(
    response: &ParseResponse,
    report: &mut Report,
) -> Result<(), ScenarioError> {
    for (name, doc) in response.documents()? {
        report.line(format!("\nFile: {}", name));
        if let Some(len) = doc.markdown_len() {
            report.line(format!("  Markdown length: {} chars", len));
        }
    }
    Ok(())
}
