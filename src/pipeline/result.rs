use chrono::{SecondsFormat, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::error::ErrorKind;
use crate::pipeline::advice::{self, DiseaseInfo};
use crate::pipeline::ranker::{RankedClass, Ranking};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionMetadata {
    /// Wall-clock seconds spent on this image, decode through rank.
    pub processing_time: f64,
    /// `(width, height)` of the decoded upload, before resizing.
    pub image_dims: (u32, u32),
}

/// Finished prediction for one image. Immutable once returned.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub top_class: String,
    pub confidence: f64,
    pub ranked: Vec<RankedClass>,
    pub metadata: PredictionMetadata,
}

impl PredictionResult {
    pub fn from_ranking(ranking: Ranking, metadata: PredictionMetadata) -> Self {
        PredictionResult {
            top_class: ranking.top_class,
            confidence: ranking.confidence,
            ranked: ranking.ranked,
            metadata,
        }
    }

    /// JSON-facing view stamped with the time it leaves the service.
    pub fn report(&self, timestamp: &str, model_version: &str) -> PredictionReport {
        PredictionReport {
            success: true,
            predicted_class: self.top_class.clone(),
            confidence: self.confidence,
            all_predictions: OrderedScores(self.ranked.clone()),
            processing_time: self.metadata.processing_time,
            image_dims: [self.metadata.image_dims.0, self.metadata.image_dims.1],
            timestamp: timestamp.to_owned(),
            model_version: model_version.to_owned(),
            disease_info: advice::lookup(&self.top_class),
        }
    }
}

/// Per-item failure inside a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureRecord {
    pub index: usize,
    pub filename: Option<String>,
    pub error_kind: ErrorKind,
    pub message: String,
    /// Seconds spent on the item before it failed.
    pub processing_time: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BatchItem {
    Success {
        index: usize,
        filename: Option<String>,
        result: PredictionResult,
    },
    Failure(FailureRecord),
}

impl BatchItem {
    pub fn index(&self) -> usize {
        match self {
            BatchItem::Success { index, .. } => *index,
            BatchItem::Failure(f) => f.index,
        }
    }

    pub fn prediction(&self) -> Option<&PredictionResult> {
        match self {
            BatchItem::Success { result, .. } => Some(result),
            BatchItem::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&FailureRecord> {
        match self {
            BatchItem::Success { .. } => None,
            BatchItem::Failure(f) => Some(f),
        }
    }

    /// Seconds spent on this item, whether it succeeded or not.
    pub fn processing_time(&self) -> f64 {
        match self {
            BatchItem::Success { result, .. } => result.metadata.processing_time,
            BatchItem::Failure(f) => f.processing_time,
        }
    }
}

/// Outcome of a batch call that ran to completion. Items are index-aligned
/// with the inputs; individual items may still have failed.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchPredictionResult {
    pub items: Vec<BatchItem>,
    pub total_processed: usize,
    pub successful: usize,
    pub failed: usize,
    /// Sum of every item's processing time, failed ones included, in seconds.
    pub items_elapsed: f64,
    /// Wall-clock seconds for the whole batch call.
    pub batch_elapsed: f64,
}

impl BatchPredictionResult {
    pub fn from_items(items: Vec<BatchItem>, items_elapsed: f64, batch_elapsed: f64) -> Self {
        let successful = items.iter().filter(|i| i.prediction().is_some()).count();
        BatchPredictionResult {
            total_processed: items.len(),
            successful,
            failed: items.len() - successful,
            items,
            items_elapsed,
            batch_elapsed,
        }
    }

    pub fn report(&self, timestamp: &str, model_version: &str) -> BatchReport {
        let results = self.items.iter().map(|item| match item {
            BatchItem::Success { index, filename, result } => BatchEntryReport::Success {
                index: *index,
                filename: filename.clone(),
                prediction: result.report(timestamp, model_version),
            },
            BatchItem::Failure(f) => BatchEntryReport::Failure {
                success: false,
                index: f.index,
                filename: f.filename.clone(),
                error_kind: f.error_kind,
                message: f.message.clone(),
                processing_time: f.processing_time,
            },
        }).collect();

        BatchReport {
            results,
            total_processed: self.total_processed,
            successful: self.successful,
            failed: self.failed,
            processing_time: self.batch_elapsed,
            items_processing_time: self.items_elapsed,
            timestamp: timestamp.to_owned(),
        }
    }
}

/// Class → score pairs serialized as a JSON object in ranking order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedScores(pub Vec<RankedClass>);

impl Serialize for OrderedScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in &self.0 {
            map.serialize_entry(&entry.class, &entry.score)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionReport {
    pub success: bool,
    pub predicted_class: String,
    pub confidence: f64,
    pub all_predictions: OrderedScores,
    pub processing_time: f64,
    pub image_dims: [u32; 2],
    pub timestamp: String,
    pub model_version: String,
    /// Notes for the predicted class, when it is a known disease.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disease_info: Option<&'static DiseaseInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BatchEntryReport {
    Success {
        index: usize,
        filename: Option<String>,
        #[serde(flatten)]
        prediction: PredictionReport,
    },
    Failure {
        success: bool,
        index: usize,
        filename: Option<String>,
        error_kind: ErrorKind,
        message: String,
        processing_time: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub results: Vec<BatchEntryReport>,
    pub total_processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub processing_time: f64,
    pub items_processing_time: f64,
    pub timestamp: String,
}

/// ISO-8601 UTC timestamp with millisecond precision.
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> PredictionResult {
        PredictionResult {
            top_class: "blight".into(),
            confidence: 0.8,
            ranked: vec![
                RankedClass { class: "blight".into(), score: 0.8 },
                RankedClass { class: "healthy".into(), score: 0.2 },
            ],
            metadata: PredictionMetadata { processing_time: 0.5, image_dims: (640, 480) },
        }
    }

    #[test]
    fn all_predictions_keep_rank_order() {
        let json = serde_json::to_string(&result().report("t", "v")).unwrap();
        let blight = json.find("\"blight\":0.8").unwrap();
        let healthy = json.find("\"healthy\":0.2").unwrap();
        assert!(blight < healthy);
        assert!(json.contains("\"predicted_class\":\"blight\""));
        assert!(json.contains("\"image_dims\":[640,480]"));
    }

    #[test]
    fn batch_counts_and_entry_shapes() {
        let items = vec![
            BatchItem::Success { index: 0, filename: Some("a.png".into()), result: result() },
            BatchItem::Failure(FailureRecord {
                index: 1,
                filename: None,
                error_kind: ErrorKind::DecodeError,
                message: "image data is empty".into(),
                processing_time: 0.25,
            }),
        ];
        assert_eq!(items[1].processing_time(), 0.25);
        let batch = BatchPredictionResult::from_items(items, 0.75, 0.8);
        assert_eq!((batch.total_processed, batch.successful, batch.failed), (2, 1, 1));

        let value = serde_json::to_value(batch.report("t", "v")).unwrap();
        assert_eq!(value["results"][0]["filename"], "a.png");
        assert_eq!(value["results"][0]["success"], true);
        assert_eq!(value["results"][1]["success"], false);
        assert_eq!(value["results"][1]["error_kind"], "DecodeError");
        assert_eq!(value["results"][1]["processing_time"], 0.25);
        assert_eq!(value["items_processing_time"], 0.75);
    }

    #[test]
    fn known_classes_carry_disease_info() {
        let value = serde_json::to_value(result().report("t", "v")).unwrap();
        assert!(value.get("disease_info").is_none());

        let mut late_blight = result();
        late_blight.top_class = "Potato___Late_blight".into();
        let value = serde_json::to_value(late_blight.report("t", "v")).unwrap();
        assert_eq!(value["disease_info"]["name"], "Late Blight");
        assert_eq!(value["disease_info"]["severity"], "critical");
        assert!(value["disease_info"]["treatment"].as_str().unwrap().contains("fungicides"));
    }

    #[test]
    fn timestamp_is_rfc3339() {
        let ts = now_iso8601();
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
        assert!(ts.ends_with('Z'));
    }
}
