//! # Canonical result shapes
//!
//! The inference service answers with loosely structured JSON whose field names vary between
//! missions and versions. The services normalize those payloads into the types below, which
//! are what the session stores and what the projections read.
//!
//! Every field has a neutral value (empty map, empty vector, `None`), so a partial response
//! still yields a complete, renderable result.
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::constants::{ClassCounts, ClassLabel};

/// Fitness diagnosis of a trained model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ModelStatus {
    Overfitting,
    Underfitting,
    Suitable,
    #[default]
    Unknown,
}

impl ModelStatus {
    /// Parse the backend status string; `"Balanced"` is the training job's word for suitable.
    pub fn from_backend(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "overfitting" => ModelStatus::Overfitting,
            "underfitting" => ModelStatus::Underfitting,
            "suitable" | "balanced" => ModelStatus::Suitable,
            _ => ModelStatus::Unknown,
        }
    }
}

impl fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ModelStatus::Overfitting => "Overfitting",
            ModelStatus::Underfitting => "Underfitting",
            ModelStatus::Suitable => "Suitable",
            ModelStatus::Unknown => "Status not available",
        };
        f.write_str(s)
    }
}

/// Precision/recall/F1 of one row of a classification report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub label: String,
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    pub f1: Option<f64>,
    pub support: Option<f64>,
}

/// Structured per-class report computed by the backend on labelled data.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ClassificationReport {
    pub classes: Vec<ReportRow>,
    pub accuracy: Option<f64>,
    pub macro_avg: Option<ReportRow>,
    pub weighted_avg: Option<ReportRow>,
}

/// Counts of actual (rows) against predicted (columns) labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfusionMatrix {
    pub labels: Vec<String>,
    pub cells: Vec<Vec<u64>>,
}

/// One point of a precision–recall curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PrPoint {
    pub threshold: f64,
    pub precision: f64,
    pub recall: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Quality metrics of a model, as reported after a prediction on labelled data or a
/// retraining job.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Metrics {
    pub accuracy: Option<f64>,
    pub train_accuracy: Option<f64>,
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    pub f1: Option<f64>,
    pub status: ModelStatus,
    pub model_artifact_ref: Option<String>,
    pub report: Option<ClassificationReport>,
    pub confusion_matrix: Option<ConfusionMatrix>,
    pub pr_curve: Option<Vec<PrPoint>>,
    pub feature_importance: Option<Vec<FeatureImportance>>,
}

/// Classification of a single manually entered feature vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SingleInputPrediction {
    /// Label exactly as returned by the model.
    pub label: String,
    /// `label` parsed into a known disposition, when possible.
    pub class: Option<ClassLabel>,
    /// Probability of the positive class, when the model reported it.
    pub probability: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PredictionResult {
    pub class_counts: ClassCounts,
    pub metrics: Option<Metrics>,
    pub light_curve_samples: Vec<Value>,
    pub raw_sample: Vec<Value>,
    pub single_input_prediction: Option<SingleInputPrediction>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RetrainResult {
    pub metrics: Metrics,
    pub status: ModelStatus,
    pub model_artifact_ref: Option<String>,
    pub message: Option<String>,
}
