//! # Prediction service
//!
//! Builds `POST /predict` requests from the collected input and normalizes the response
//! into a [`PredictionResult`].
//!
//! Payloads
//! -----------------
//! * File mode: `multipart/form-data` with `file` (the dataset) and `mission`.
//! * Manual mode: JSON `{"features": {<field id>: <number>, ..}, "mission": <id>}` carrying
//!   every feature field of the mission.
//!
//! Response aliases
//! -----------------
//! | canonical             | accepted keys                                    |
//! |-----------------------|--------------------------------------------------|
//! | `class_counts`        | `counts`, `class_counts`, `classCounts`          |
//! | `light_curve_samples` | `light_curve`, `lightCurve`, `light_curve_samples` |
//! | `raw_sample`          | `sample`, `raw_sample`, `rawSample`              |
//! | `metrics`             | `metrics`                                        |
//!
//! For a manual single-vector request the label and positive-class probability are read from
//! the top-level `prediction`/`prediction_prob_1` keys, or from the first sample row when the
//! service only echoes them there.
use itertools::Itertools;
use serde_json::{json, Map, Value};

use super::{first_present, metrics::parse_metrics};
use crate::{
    constants::{ClassCounts, ClassLabel, PREDICT_PATH},
    exoclass_errors::{ExoclassError, ValidationError},
    input::{InputMode, InputState},
    missions::Mission,
    results::{PredictionResult, SingleInputPrediction},
    transport::{FormPart, OutgoingRequest, RequestBody},
};

const COUNT_KEYS: &[&str] = &["counts", "class_counts", "classCounts"];
const LIGHT_CURVE_KEYS: &[&str] = &["light_curve", "lightCurve", "light_curve_samples"];
const SAMPLE_KEYS: &[&str] = &["sample", "raw_sample", "rawSample"];
const LABEL_KEYS: &[&str] = &["prediction", "label"];
const PROBABILITY_KEYS: &[&str] = &["prediction_prob_1", "probability"];

/// Which input shape a request was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionOrigin {
    File,
    Manual,
}

impl From<InputMode> for PredictionOrigin {
    fn from(mode: InputMode) -> Self {
        match mode {
            InputMode::File => PredictionOrigin::File,
            InputMode::Manual => PredictionOrigin::Manual,
        }
    }
}

/// Build the `/predict` request for the current input.
///
/// Arguments
/// -----------------
/// * `mission`: the active mission; its id is sent as `mission`.
/// * `input`: the collected input; its mode selects the payload shape.
///
/// Return
/// ----------
/// * The request, or a [`ValidationError`] when the input is incomplete:
///   [`ValidationError::MissingDataset`] in file mode, [`ValidationError::MissingFeatures`]
///   listing the missing field ids in manual mode.
pub fn build_request(
    mission: &Mission,
    input: &InputState,
) -> Result<OutgoingRequest, ExoclassError> {
    let body = match input.mode {
        InputMode::File => {
            let file = input.file.as_ref().ok_or(ValidationError::MissingDataset)?;
            RequestBody::Multipart(vec![
                FormPart::File {
                    name: "file".into(),
                    file_name: file.name().to_string(),
                    content: file.content().to_vec(),
                },
                FormPart::text("mission", mission.id),
            ])
        }
        InputMode::Manual => {
            let missing = mission
                .feature_ids()
                .filter(|id| {
                    !input
                        .feature_vector
                        .get(*id)
                        .is_some_and(|v| v.is_finite())
                })
                .join(", ");
            if !missing.is_empty() {
                return Err(ValidationError::MissingFeatures(missing).into());
            }

            let features: Map<String, Value> = mission
                .feature_ids()
                .filter_map(|id| {
                    let value = input.feature_vector.get(id)?;
                    Some((id.to_string(), json!(value)))
                })
                .collect();
            RequestBody::Json(json!({
                "features": features,
                "mission": mission.id,
            }))
        }
    };

    Ok(OutgoingRequest {
        path: PREDICT_PATH,
        body,
    })
}

fn parse_counts(value: &Value) -> ClassCounts {
    let Some(obj) = value.as_object() else {
        return ClassCounts::new();
    };
    obj.iter()
        .filter_map(|(label, count)| {
            let count = count.as_u64().or_else(|| {
                count
                    .as_f64()
                    .filter(|c| c.is_finite() && *c >= 0.0)
                    .map(|c| c.round() as u64)
            })?;
            Some((label.clone(), count))
        })
        .collect()
}

fn array_or_empty(value: Option<&Value>) -> Vec<Value> {
    value
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

fn label_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn single_from(obj: &Map<String, Value>) -> Option<SingleInputPrediction> {
    let label = first_present(obj, LABEL_KEYS).and_then(label_text)?;
    let probability = first_present(obj, PROBABILITY_KEYS)
        .and_then(Value::as_f64)
        .filter(|p| p.is_finite());
    Some(SingleInputPrediction {
        class: label.parse::<ClassLabel>().ok(),
        label,
        probability,
    })
}

/// Normalize a decoded `/predict` response.
///
/// Never fails: missing or unreadable fields take their neutral value.
///
/// Arguments
/// -----------------
/// * `body`: the decoded top-level object (see [`super::decode_json`]).
/// * `origin`: the input shape of the request; the single-vector prediction is only
///   extracted for [`PredictionOrigin::Manual`].
pub fn normalize(body: &Map<String, Value>, origin: PredictionOrigin) -> PredictionResult {
    let raw_sample = array_or_empty(first_present(body, SAMPLE_KEYS));

    let single_input_prediction = match origin {
        PredictionOrigin::File => None,
        PredictionOrigin::Manual => single_from(body).or_else(|| {
            raw_sample
                .first()
                .and_then(Value::as_object)
                .and_then(single_from)
        }),
    };

    PredictionResult {
        class_counts: first_present(body, COUNT_KEYS)
            .map(parse_counts)
            .unwrap_or_default(),
        metrics: body.get("metrics").and_then(parse_metrics),
        light_curve_samples: array_or_empty(first_present(body, LIGHT_CURVE_KEYS)),
        raw_sample,
        single_input_prediction,
    }
}
