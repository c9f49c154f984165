use std::sync::Arc;

use leafscan::InferenceService;

/// Multipart framing allowance on top of the raw image bytes.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub struct AppState {
    pub service: InferenceService,
    /// Largest request body accepted before answering 413.
    pub max_body_bytes: usize,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(service: InferenceService, max_upload_bytes: usize) -> Self {
        let max_body_bytes = max_upload_bytes
            .saturating_mul(service.max_batch_size())
            .saturating_add(MULTIPART_OVERHEAD);
        AppState { service, max_body_bytes }
    }
}
