use leafscan::pipeline::result::now_iso8601;

use crate::routes::{json_response, HttpResponse};
use crate::state::SharedState;

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Always 200; model readiness is reported in the body.
pub fn handle(state: &SharedState) -> HttpResponse {
    json_response(200, &state.service.health(&now_iso8601()))
}
