use std::io::{Cursor, Read};

use serde::Serialize;
use tiny_http::{Header, Method, Request, Response, StatusCode};
use tracing::{debug, warn};

use leafscan::{ErrorCategory, InferenceError};

use crate::handlers;
use crate::state::SharedState;

pub type HttpResponse = Response<Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn header(field: &str, value: &str) -> Option<Header> {
    Header::from_bytes(field.as_bytes(), value.as_bytes()).ok()
}

/// Browser front-ends are served from another origin.
fn cors_headers() -> Vec<Header> {
    header("Access-Control-Allow-Origin", "*").into_iter().collect()
}

fn json_headers() -> Vec<Header> {
    let mut headers = cors_headers();
    headers.extend(header("Content-Type", "application/json"));
    headers
}

pub fn json_response<T: Serialize>(status: u16, body: &T) -> HttpResponse {
    let bytes = match serde_json::to_vec(body) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "response serialization failed");
            return raw_json(500, br#"{"success":false,"error_kind":"InternalError","category":"service_unavailable","detail":"response serialization failed"}"#.to_vec());
        }
    };
    raw_json(status, bytes)
}

fn raw_json(status: u16, bytes: Vec<u8>) -> HttpResponse {
    let len = bytes.len();
    Response::new(StatusCode(status), json_headers(), Cursor::new(bytes), Some(len), None)
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error_kind: &'a str,
    category: ErrorCategory,
    detail: String,
}

pub fn error_envelope(status: u16, error_kind: &str, category: ErrorCategory, detail: String) -> HttpResponse {
    json_response(status, &ErrorBody { success: false, error_kind, category, detail })
}

/// HTTP status for a pipeline failure.
pub fn status_for(error: &InferenceError) -> u16 {
    match error {
        InferenceError::Decode(_) => 400,
        InferenceError::Preprocess(_) => 500,
        InferenceError::ModelUnavailable => 503,
        InferenceError::Classification(_) => 500,
        InferenceError::BatchTooLarge { .. } => 400,
    }
}

pub fn inference_error(error: &InferenceError) -> HttpResponse {
    error_envelope(status_for(error), error.kind().as_str(), error.category(), error.to_string())
}

pub fn malformed(detail: impl Into<String>) -> HttpResponse {
    error_envelope(400, "MalformedRequest", ErrorCategory::MalformedRequest, detail.into())
}

pub fn not_found(path: &str) -> HttpResponse {
    error_envelope(404, "NotFound", ErrorCategory::MalformedRequest, format!("no route for {}", path))
}

/// Answer to a CORS preflight for any route.
pub fn preflight() -> HttpResponse {
    let mut headers = cors_headers();
    headers.extend(header("Access-Control-Allow-Methods", "GET, POST, OPTIONS"));
    headers.extend(header("Access-Control-Allow-Headers", "Content-Type"));
    headers.extend(header("Access-Control-Max-Age", "600"));
    Response::new(StatusCode(204), headers, Cursor::new(Vec::new()), Some(0), None)
}

pub fn payload_too_large(limit: usize) -> HttpResponse {
    error_envelope(
        413,
        "PayloadTooLarge",
        ErrorCategory::MalformedRequest,
        format!("request body exceeds {} bytes", limit),
    )
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub fn header_value(request: &Request, name: &'static str) -> Option<String> {
    request.headers().iter()
        .find(|h| h.field.equiv(name))
        .map(|h| h.value.as_str().to_owned())
}

/// Reads the whole body, refusing anything over `limit` bytes.
pub fn read_body(request: &mut Request, limit: usize) -> Result<Vec<u8>, HttpResponse> {
    let declared = request.body_length();
    read_limited(request.as_reader(), declared, limit)
}

/// Reads at most `limit` bytes from `reader`; a declared length over the
/// limit is refused without reading.
pub fn read_limited<R: Read>(reader: R, declared: Option<usize>, limit: usize) -> Result<Vec<u8>, HttpResponse> {
    if declared.map_or(false, |len| len > limit) {
        return Err(payload_too_large(limit));
    }
    let mut body = Vec::new();
    reader
        .take(limit as u64 + 1)
        .read_to_end(&mut body)
        .map_err(|e| malformed(format!("could not read request body: {}", e)))?;
    if body.len() > limit {
        return Err(payload_too_large(limit));
    }
    Ok(body)
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

pub fn dispatch(mut request: Request, state: SharedState) {
    let method = request.method().clone();
    let url    = request.url().to_owned();
    let path   = url.split('?').next().unwrap_or("").to_owned();

    let response = match (&method, path.as_str()) {
        (Method::Get,  "/")              => handlers::root::handle(&state),
        (Method::Get,  "/health")        => handlers::health::handle(&state),
        (Method::Get,  "/model/info")    => handlers::model_info::handle(&state),
        (Method::Post, "/predict")       => handlers::predict::handle_single(&mut request, &state),
        (Method::Post, "/batch_predict") => handlers::predict::handle_batch(&mut request, &state),
        (Method::Options, _)             => preflight(),
        _ => not_found(&path),
    };

    debug!(method = %method, path = %path, status = response.status_code().0, "request served");
    let _ = request.respond(response);
}

#[cfg(test)]
mod tests {
    use super::*;

    use leafscan::pipeline::{DecodeError, PreprocessError};
    use leafscan::pipeline::ranker::RankError;
    use tiny_http::TestRequest;

    fn has_header(headers: &[Header], field: &'static str, value: &str) -> bool {
        headers.iter().any(|h| h.field.equiv(field) && h.value.as_str() == value)
    }

    #[test]
    fn every_inference_error_has_a_status() {
        let cases = [
            (InferenceError::Decode(DecodeError::Empty), 400),
            (InferenceError::Preprocess(PreprocessError::EmptyImage { width: 0, height: 0 }), 500),
            (InferenceError::ModelUnavailable, 503),
            (InferenceError::Classification("nan score".into()), 500),
            (InferenceError::BatchTooLarge { requested: 9, limit: 8 }, 400),
            (InferenceError::from(RankError::LengthMismatch { scores: 2, classes: 3 }), 500),
        ];
        for (error, status) in cases {
            assert_eq!(status_for(&error), status, "{:?}", error);
            assert_eq!(inference_error(&error).status_code().0, status);
        }
    }

    #[test]
    fn json_responses_allow_any_origin() {
        let headers = json_headers();
        assert!(has_header(&headers, "Content-Type", "application/json"));
        assert!(has_header(&headers, "Access-Control-Allow-Origin", "*"));
    }

    #[test]
    fn preflight_is_empty_204_with_allowed_methods() {
        let response = preflight();
        assert_eq!(response.status_code().0, 204);
        assert_eq!(response.data_length(), Some(0));
        assert!(has_header(response.headers(), "Access-Control-Allow-Origin", "*"));
        assert!(has_header(response.headers(), "Access-Control-Allow-Methods", "GET, POST, OPTIONS"));
        assert!(has_header(response.headers(), "Access-Control-Allow-Headers", "Content-Type"));
    }

    #[test]
    fn request_headers_and_body_are_read() {
        let content_type = Header::from_bytes(&b"content-type"[..], &b"image/png"[..]).unwrap();
        let mut request: Request = TestRequest::new()
            .with_method(Method::Post)
            .with_path("/predict")
            .with_header(content_type)
            .with_body("0123456789")
            .into();

        assert_eq!(header_value(&request, "Content-Type").as_deref(), Some("image/png"));
        assert_eq!(header_value(&request, "Accept"), None);
        assert_eq!(read_body(&mut request, 4).unwrap_err().status_code().0, 413);
    }

    #[test]
    fn body_over_the_limit_is_413() {
        let read = read_limited(&b"0123456789"[..], None, 4);
        assert_eq!(read.unwrap_err().status_code().0, 413);

        let declared = read_limited(&b""[..], Some(5), 4);
        assert_eq!(declared.unwrap_err().status_code().0, 413);
    }

    #[test]
    fn body_at_the_limit_is_read_whole() {
        let body = read_limited(&b"0123"[..], Some(4), 4).ok().unwrap();
        assert_eq!(body, b"0123");
    }

    #[test]
    fn error_bodies_carry_the_envelope() {
        let response = inference_error(&InferenceError::ModelUnavailable);
        assert!(has_header(response.headers(), "Access-Control-Allow-Origin", "*"));
        let body: serde_json::Value = serde_json::from_reader(response.into_reader()).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error_kind"], "ModelUnavailableError");
        assert_eq!(body["category"], "service_unavailable");
        assert_eq!(malformed("x").status_code().0, 400);
        assert_eq!(not_found("/nope").status_code().0, 404);
    }
}
