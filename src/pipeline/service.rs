use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, error, info, warn};

use crate::classifier::ClassifierPort;
use crate::config::ServiceConfig;
use crate::error::{InferenceError, StartupError};
use crate::pipeline::catalog::ClassCatalog;
use crate::pipeline::decoder::ImageDecoder;
use crate::pipeline::input::RawImageInput;
use crate::pipeline::preprocessor::{prepare, TargetSize};
use crate::pipeline::ranker::rank;
use crate::pipeline::result::{
    BatchItem, BatchPredictionResult, FailureRecord, PredictionMetadata, PredictionResult,
};
use crate::pipeline::stage::StageTracker;
use crate::pipeline::status::{HealthReport, ModelInfoReport};

/// Runs images through decode, preprocess, classify and rank.
///
/// Holds no per-request state; one instance is shared by every caller.
pub struct InferenceService {
    classifier: Arc<dyn ClassifierPort>,
    decoder: ImageDecoder,
    target: TargetSize,
    catalog: ClassCatalog,
    max_batch_size: usize,
    model_version: String,
    pool: rayon::ThreadPool,
}

impl InferenceService {
    /// Assembles the service and checks the classifier against the config.
    ///
    /// An unloaded classifier is accepted (the service reports itself not
    /// ready); a loaded one whose widths disagree with the catalog or target
    /// size is not.
    pub fn new(classifier: Arc<dyn ClassifierPort>, config: &ServiceConfig) -> Result<Self, StartupError> {
        config.validate()?;
        let catalog = config.catalog()?;
        let target = config.target_size;

        if let Some(model) = classifier.output_width() {
            if model != catalog.len() {
                return Err(StartupError::CatalogMismatch { catalog: catalog.len(), model });
            }
        }
        if let Some(model) = classifier.input_len() {
            if model != target.input_len() {
                return Err(StartupError::InputMismatch { expected: target.input_len(), model });
            }
        }
        if let Some(info) = classifier.info() {
            if let [height, width, 3] = info.input_shape[..] {
                if (width, height) != (target.width as usize, target.height as usize) {
                    warn!(
                        model = ?(width, height),
                        configured = ?(target.width, target.height),
                        "model declares a different input size than configured"
                    );
                }
            }
            if let Some(labels) = &info.output_labels {
                if !labels.iter().map(String::as_str).eq(catalog.iter()) {
                    warn!("model output labels differ from the configured class catalog");
                }
            }
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.batch_workers)
            .thread_name(|i| format!("leafscan-batch-{}", i))
            .build()?;

        info!(
            classes = catalog.len(),
            target = ?(target.width, target.height),
            max_batch_size = config.max_batch_size,
            workers = config.batch_workers,
            model_loaded = classifier.is_loaded(),
            "inference service ready"
        );

        Ok(InferenceService {
            classifier,
            decoder: ImageDecoder::new(config.decode_limits()),
            target,
            catalog,
            max_batch_size: config.max_batch_size,
            model_version: config.model_version.clone(),
            pool,
        })
    }

    /// Whether predictions can currently be served.
    pub fn is_ready(&self) -> bool {
        self.classifier.is_loaded()
    }

    pub fn catalog(&self) -> &ClassCatalog {
        &self.catalog
    }

    pub fn target_size(&self) -> TargetSize {
        self.target
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    pub fn health(&self, timestamp: &str) -> HealthReport {
        HealthReport::new(self.is_ready(), &self.catalog, timestamp)
    }

    /// `None` while no model is loaded.
    pub fn model_info(&self) -> Option<ModelInfoReport> {
        self.classifier.info().map(|info| ModelInfoReport::new(info, &self.catalog))
    }

    /// Classifies one image. Never returns a partial result.
    pub fn predict(&self, input: RawImageInput) -> Result<PredictionResult, InferenceError> {
        if !self.classifier.is_loaded() {
            warn!(image = %input.label(), "prediction refused: model not loaded");
            return Err(InferenceError::ModelUnavailable);
        }
        let result = self.run(&input);
        if let Ok(prediction) = &result {
            info!(
                image = %input.label(),
                class = %prediction.top_class,
                confidence = prediction.confidence,
                elapsed = prediction.metadata.processing_time,
                "prediction complete"
            );
        }
        result
    }

    /// [`predict_batch_with_limit`](Self::predict_batch_with_limit) with the
    /// configured batch limit.
    pub fn predict_batch(&self, inputs: Vec<RawImageInput>) -> Result<BatchPredictionResult, InferenceError> {
        self.predict_batch_with_limit(inputs, self.max_batch_size)
    }

    /// Classifies every input independently on the batch worker pool.
    ///
    /// The whole call is rejected, before any item is looked at, when the
    /// batch is over `max_batch_size` or no model is loaded. An unloaded model
    /// fails the batch the same way it fails a single [`predict`](Self::predict):
    /// one `ModelUnavailable` for the call, never one per item. Otherwise each
    /// failing item becomes a [`FailureRecord`] in its own slot; items come
    /// back in input order.
    pub fn predict_batch_with_limit(
        &self,
        inputs: Vec<RawImageInput>,
        max_batch_size: usize,
    ) -> Result<BatchPredictionResult, InferenceError> {
        if inputs.len() > max_batch_size {
            warn!(requested = inputs.len(), limit = max_batch_size, "batch rejected: too large");
            return Err(InferenceError::BatchTooLarge { requested: inputs.len(), limit: max_batch_size });
        }
        if !self.classifier.is_loaded() {
            warn!(requested = inputs.len(), "batch refused: model not loaded");
            return Err(InferenceError::ModelUnavailable);
        }

        let started = Instant::now();
        let items: Vec<BatchItem> = self.pool.install(|| {
            inputs.par_iter()
                .enumerate()
                .map(|(index, input)| self.batch_item(index, input))
                .collect()
        });
        let items_elapsed: f64 = items.iter().map(BatchItem::processing_time).sum();

        let batch = BatchPredictionResult::from_items(items, items_elapsed, started.elapsed().as_secs_f64());
        info!(
            total = batch.total_processed,
            successful = batch.successful,
            failed = batch.failed,
            elapsed = batch.batch_elapsed,
            "batch complete"
        );
        Ok(batch)
    }

    fn batch_item(&self, index: usize, input: &RawImageInput) -> BatchItem {
        let filename = input.filename.clone();
        let started = Instant::now();
        match self.run(input) {
            Ok(result) => BatchItem::Success { index, filename, result },
            Err(e) => BatchItem::Failure(FailureRecord {
                index,
                filename,
                error_kind: e.kind(),
                message: e.to_string(),
                processing_time: started.elapsed().as_secs_f64(),
            }),
        }
    }

    fn run(&self, input: &RawImageInput) -> Result<PredictionResult, InferenceError> {
        let mut tracker = StageTracker::new(input.label());
        let outcome = self.run_stages(input, &mut tracker);
        if let Err(e) = &outcome {
            tracker.fail(e.to_string());
            match e {
                InferenceError::Preprocess(_) | InferenceError::Classification(_) => {
                    error!(image = %input.label(), stage = ?e.stage(), error = %e, "prediction failed");
                }
                _ => debug!(image = %input.label(), stage = ?e.stage(), error = %e, "prediction failed"),
            }
        }
        outcome
    }

    fn run_stages(&self, input: &RawImageInput, tracker: &mut StageTracker) -> Result<PredictionResult, InferenceError> {
        let started = Instant::now();

        tracker.advance();
        let image = self.decoder.decode(input)?;

        tracker.advance();
        let tensor = prepare(&image, self.target)?;

        tracker.advance();
        let mut rows = self.classifier.score(&tensor)?;
        if rows.len() != 1 {
            return Err(InferenceError::Classification(format!(
                "classifier returned {} score rows for one image",
                rows.len()
            )));
        }
        let scores = rows.swap_remove(0);

        tracker.advance();
        let ranking = rank(&scores, &self.catalog)?;

        tracker.advance();
        let metadata = PredictionMetadata {
            processing_time: started.elapsed().as_secs_f64(),
            image_dims: image.dims(),
        };
        Ok(PredictionResult::from_ranking(ranking, metadata))
    }
}

impl std::fmt::Debug for InferenceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceService")
            .field("ready", &self.is_ready())
            .field("catalog", &self.catalog)
            .field("target", &self.target)
            .field("max_batch_size", &self.max_batch_size)
            .finish_non_exhaustive()
    }
}
