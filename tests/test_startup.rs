//! Startup assertions and readiness reporting.

mod common;

use std::sync::Arc;

use common::*;

#[test]
fn test_catalog_width_mismatch_is_fatal() {
    let stub = Arc::new(StubClassifier::new(vec![0.1, 0.2, 0.7]));
    let err = InferenceService::new(stub, &test_config(&["healthy", "blight"])).unwrap_err();
    assert!(matches!(err, StartupError::CatalogMismatch { catalog: 2, model: 3 }));
}

#[test]
fn test_input_length_mismatch_is_fatal() {
    let stub = Arc::new(StubClassifier::new(vec![0.5, 0.5]));
    let config = ServiceConfig {
        target_size: TargetSize::new(16, 16),
        ..test_config(&["healthy", "blight"])
    };
    let err = InferenceService::new(stub, &config).unwrap_err();
    assert!(matches!(
        err,
        StartupError::InputMismatch { expected: 768, model: 192 }
    ));
}

#[test]
fn test_invalid_config_is_fatal() {
    let stub = Arc::new(StubClassifier::new(vec![0.5, 0.5]));
    let config = ServiceConfig { batch_workers: 0, ..test_config(&["healthy", "blight"]) };
    assert!(matches!(InferenceService::new(stub, &config), Err(StartupError::Config(_))));
}

#[test]
fn test_unloaded_model_starts_but_is_not_ready() {
    let service = two_class_service(Arc::new(UnloadedClassifier::default()));

    assert!(!service.is_ready());
    assert!(service.model_info().is_none());

    let health = serde_json::to_value(service.health("t")).unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["model_status"], "not_loaded");
    assert_eq!(health["supported_classes"], serde_json::json!(["healthy", "blight"]));
}

#[test]
fn test_loaded_model_is_ready() {
    let service = two_class_service(Arc::new(StubClassifier::new(vec![0.5, 0.5])));
    assert!(service.is_ready());
    let health = serde_json::to_value(service.health("t")).unwrap();
    assert_eq!(health["model_status"], "loaded");
}
