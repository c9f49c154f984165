use serde::Serialize;

use crate::classifier::ModelInfo;
use crate::pipeline::catalog::ClassCatalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    Loaded,
    NotLoaded,
}

/// Liveness report. The process is healthy even when the model is not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub timestamp: String,
    pub model_status: ModelStatus,
    pub supported_classes: Vec<String>,
}

impl HealthReport {
    pub fn new(model_loaded: bool, catalog: &ClassCatalog, timestamp: &str) -> Self {
        HealthReport {
            status: "healthy",
            timestamp: timestamp.to_owned(),
            model_status: if model_loaded { ModelStatus::Loaded } else { ModelStatus::NotLoaded },
            supported_classes: catalog.iter().map(str::to_owned).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfoReport {
    pub model_loaded: bool,
    pub input_shape: Vec<usize>,
    pub output_shape: Vec<usize>,
    pub total_params: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub classes: Vec<String>,
    pub num_classes: usize,
}

impl ModelInfoReport {
    pub fn new(info: ModelInfo, catalog: &ClassCatalog) -> Self {
        ModelInfoReport {
            model_loaded: true,
            input_shape: info.input_shape,
            output_shape: info.output_shape,
            total_params: info.total_params,
            description: info.description,
            classes: catalog.iter().map(str::to_owned).collect(),
            num_classes: catalog.len(),
        }
    }
}
