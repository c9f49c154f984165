use serde_json::json;

use crate::routes::{json_response, HttpResponse};
use crate::state::SharedState;

// ---------------------------------------------------------------------------
// GET /
// ---------------------------------------------------------------------------

pub fn handle(state: &SharedState) -> HttpResponse {
    json_response(200, &json!({
        "name": "leafscan",
        "message": "Plant disease classification API",
        "version": state.service.model_version(),
        "status": "running",
        "endpoints": {
            "health": "GET /health",
            "model_info": "GET /model/info",
            "predict": "POST /predict",
            "batch_predict": "POST /batch_predict",
        },
    }))
}
