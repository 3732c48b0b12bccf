//! # Constants and type definitions for Exoclass
//!
//! This module centralizes the **endpoint locations**, **class labels**, and **common type
//! definitions** used throughout the `exoclass` library.
//!
//! ## Overview
//!
//! - Default location of the inference service and its routes
//! - The three dispositions returned by the classifiers
//! - Core type aliases for feature vectors and backend counts

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// -------------------------------------------------------------------------------------------------
// Inference service
// -------------------------------------------------------------------------------------------------

/// Default base URL of the inference/training service
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Default HTTP timeout in seconds; retraining jobs run synchronously on the server
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Route accepting bulk files or a single feature vector
pub const PREDICT_PATH: &str = "/predict";

/// Route launching a retraining job
pub const RETRAIN_PATH: &str = "/retrain";

/// Route serving trained model artifacts
pub const DOWNLOAD_MODEL_PATH: &str = "/download_model";

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Identifier of a mission in the catalog (`"kepler"`, `"k2"`, `"tess"`)
pub type MissionId = &'static str;

/// Canonical id of a feature or hyperparameter field
pub type FieldId = String;

/// Manually entered feature values, keyed by field id.
/// A `BTreeMap` keeps the outgoing JSON payload deterministic.
pub type FeatureVector = BTreeMap<FieldId, f64>;

/// Per-label prediction counts as returned by the backend
pub type ClassCounts = BTreeMap<String, u64>;

/// Hyperparameter values entered by a researcher, keyed by field id
pub type HyperparamOverrides = BTreeMap<FieldId, f64>;

// -------------------------------------------------------------------------------------------------
// Dispositions
// -------------------------------------------------------------------------------------------------

/// Disposition predicted for an exoplanet candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClassLabel {
    Confirmed,
    Candidate,
    FalsePositive,
}

impl ClassLabel {
    /// All labels in display order.
    pub const ALL: [ClassLabel; 3] = [
        ClassLabel::Confirmed,
        ClassLabel::Candidate,
        ClassLabel::FalsePositive,
    ];

    /// Label as shown to the operator and as used in the backend `counts` keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassLabel::Confirmed => "Confirmed",
            ClassLabel::Candidate => "Candidate",
            ClassLabel::FalsePositive => "False Positive",
        }
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a backend disposition string.
///
/// The models emit upper-cased labels (`"CONFIRMED"`), the count aggregation
/// title-cases them (`"False Positive"`), and K2 archives still use
/// `"REFUTED"` for false positives. All of these are accepted.
impl FromStr for ClassLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "confirmed" => Ok(ClassLabel::Confirmed),
            "candidate" => Ok(ClassLabel::Candidate),
            "falsepositive" | "refuted" => Ok(ClassLabel::FalsePositive),
            _ => Err(format!("Unknown disposition: {s}")),
        }
    }
}
