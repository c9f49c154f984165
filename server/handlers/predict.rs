use tiny_http::Request;
use tracing::info;

use leafscan::pipeline::result::now_iso8601;
use leafscan::RawImageInput;

use crate::routes::{header_value, inference_error, json_response, malformed, read_body, HttpResponse};
use crate::state::{AppState, SharedState};
use crate::util::multipart::{extract_boundary, extract_file_parts};

// ---------------------------------------------------------------------------
// POST /predict
// ---------------------------------------------------------------------------

/// Accepts either a multipart upload (first file part is used) or a raw
/// image body whose Content-Type is taken as the declared media type.
pub fn handle_single(request: &mut Request, state: &SharedState) -> HttpResponse {
    let content_type = header_value(request, "Content-Type").unwrap_or_default();
    let input = match read_body(request, state.max_body_bytes)
        .and_then(|body| single_input(&content_type, body))
    {
        Ok(input) => input,
        Err(response) => return response,
    };
    predict_response(state, input)
}

fn single_input(content_type: &str, body: Vec<u8>) -> Result<RawImageInput, HttpResponse> {
    if !is_multipart(content_type) {
        return Ok(RawImageInput::new(body).with_media_type(content_type));
    }
    let mut inputs = multipart_inputs(content_type, &body)?;
    Ok(inputs.swap_remove(0))
}

fn predict_response(state: &AppState, input: RawImageInput) -> HttpResponse {
    info!(image = %input.label(), bytes = input.bytes.len(), "predict request");
    match state.service.predict(input) {
        Ok(result) => json_response(200, &result.report(&now_iso8601(), state.service.model_version())),
        Err(e) => inference_error(&e),
    }
}

// ---------------------------------------------------------------------------
// POST /batch_predict
// ---------------------------------------------------------------------------

pub fn handle_batch(request: &mut Request, state: &SharedState) -> HttpResponse {
    let content_type = header_value(request, "Content-Type").unwrap_or_default();
    let inputs = match require_multipart(&content_type)
        .and_then(|()| read_body(request, state.max_body_bytes))
        .and_then(|body| multipart_inputs(&content_type, &body))
    {
        Ok(inputs) => inputs,
        Err(response) => return response,
    };
    batch_response(state, inputs)
}

fn batch_response(state: &AppState, inputs: Vec<RawImageInput>) -> HttpResponse {
    info!(files = inputs.len(), "batch request");
    match state.service.predict_batch(inputs) {
        Ok(batch) => json_response(200, &batch.report(&now_iso8601(), state.service.model_version())),
        Err(e) => inference_error(&e),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn is_multipart(content_type: &str) -> bool {
    content_type.trim_start().to_ascii_lowercase().starts_with("multipart/form-data")
}

fn require_multipart(content_type: &str) -> Result<(), HttpResponse> {
    if is_multipart(content_type) {
        Ok(())
    } else {
        Err(malformed("batch uploads must be multipart/form-data"))
    }
}

/// File parts of a multipart body; never empty on success.
fn multipart_inputs(content_type: &str, body: &[u8]) -> Result<Vec<RawImageInput>, HttpResponse> {
    let boundary = extract_boundary(content_type)
        .ok_or_else(|| malformed("multipart request has no boundary"))?;
    let inputs: Vec<RawImageInput> = extract_file_parts(body, &boundary)
        .into_iter()
        .map(|part| part.into_input())
        .collect();
    if inputs.is_empty() {
        return Err(malformed("no file part in upload"));
    }
    Ok(inputs)
}
