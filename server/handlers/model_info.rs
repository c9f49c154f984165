use leafscan::InferenceError;

use crate::routes::{inference_error, json_response, HttpResponse};
use crate::state::SharedState;

// ---------------------------------------------------------------------------
// GET /model/info
// ---------------------------------------------------------------------------

pub fn handle(state: &SharedState) -> HttpResponse {
    match state.service.model_info() {
        Some(info) => json_response(200, &info),
        None => inference_error(&InferenceError::ModelUnavailable),
    }
}
