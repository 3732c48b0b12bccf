//! # Retrain service
//!
//! Builds `POST /retrain` requests and normalizes the training job's answer into a
//! [`RetrainResult`].
//!
//! ## Preconditions
//!
//! Checked in this order, all before any network activity:
//!
//! 1. a non-empty dataset file is present,
//! 2. the mission accepts retraining,
//! 3. when the file reads as CSV, it has the mission's label column,
//! 4. every override for a field of the mission is finite, and whole for integer parameters.
//!
//! ## Payload
//!
//! `multipart/form-data` with `mission`, `file`, then one text field per hyperparameter of the
//! mission. Overrides replace the field's default; overrides naming parameters the mission
//! does not have are ignored. Integer parameters are sent without decimals.
use serde_json::{Map, Value};
use tracing::debug;

use super::{first_present, metrics::parse_metrics};
use crate::{
    constants::{HyperparamOverrides, RETRAIN_PATH},
    exoclass_errors::{ExoclassError, ValidationError},
    input::DatasetFile,
    missions::{
        advisor::{classify_field, Band},
        HyperparamField, Mission,
    },
    results::{ModelStatus, RetrainResult},
    transport::{FormPart, OutgoingRequest, RequestBody},
};

/// Effective value of one hyperparameter and its fitness band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HyperparamAdvice {
    pub field: &'static HyperparamField,
    pub value: f64,
    pub band: Band,
}

/// Effective values: each field's default, replaced by a matching override.
fn effective_values<'m>(
    mission: &'m Mission,
    overrides: &HyperparamOverrides,
) -> Result<Vec<(&'m HyperparamField, f64)>, ExoclassError> {
    mission
        .hyperparam_fields
        .iter()
        .map(|field| {
            let value = overrides
                .get(field.id)
                .copied()
                .unwrap_or(field.default_value);
            Ok((field, field.check_value(value)?))
        })
        .collect()
}

/// Per-field bands for the values a retrain with `overrides` would use.
///
/// Available as soon as the researcher edits a value; no response is needed.
pub fn bands(
    mission: &'static Mission,
    overrides: &HyperparamOverrides,
) -> Result<Vec<HyperparamAdvice>, ExoclassError> {
    effective_values(mission, overrides)?
        .into_iter()
        .map(|(field, value)| {
            Ok(HyperparamAdvice {
                field,
                value,
                band: classify_field(field, value)?,
            })
        })
        .collect()
}

fn check_label_column(mission: &Mission, dataset: &DatasetFile) -> Result<(), ExoclassError> {
    let Some(column) = mission.label_column else {
        return Ok(());
    };
    // non-CSV uploads (FITS, ...) are left to the server
    let Ok(summary) = dataset.inspect_csv() else {
        debug!(file = dataset.name(), "dataset is not CSV, skipping column check");
        return Ok(());
    };
    if summary.columns.is_empty() || summary.has_column(column) {
        return Ok(());
    }
    Err(ValidationError::MissingLabelColumn {
        column: column.to_string(),
        available: summary.columns.join(", "),
    }
    .into())
}

/// Build the `/retrain` request.
///
/// Arguments
/// -----------------
/// * `mission`: the mission whose model is retrained.
/// * `overrides`: hyperparameter values chosen by the researcher, by parameter id.
/// * `dataset`: the labelled training file.
///
/// Return
/// ----------
/// * The request, or the [`ValidationError`] of the first failed precondition
///   (see the module documentation).
pub fn build_request(
    mission: &Mission,
    overrides: &HyperparamOverrides,
    dataset: Option<&DatasetFile>,
) -> Result<OutgoingRequest, ExoclassError> {
    let dataset = dataset
        .filter(|d| !d.is_empty())
        .ok_or(ValidationError::MissingDataset)?;
    if !mission.supports_retrain {
        return Err(ValidationError::RetrainUnsupported(mission.id.to_string()).into());
    }
    check_label_column(mission, dataset)?;
    let values = effective_values(mission, overrides)?;

    let mut parts = vec![
        FormPart::text("mission", mission.id),
        FormPart::File {
            name: "file".into(),
            file_name: dataset.name().to_string(),
            content: dataset.content().to_vec(),
        },
    ];
    parts.extend(
        values
            .into_iter()
            .map(|(field, value)| FormPart::text(field.id, field.format_value(value))),
    );

    Ok(OutgoingRequest {
        path: RETRAIN_PATH,
        body: RequestBody::Multipart(parts),
    })
}

/// Normalize a decoded `/retrain` response.
///
/// The top-level `status` wins over a status nested in `metrics`, and the artifact
/// reference is looked up at top level first. Missing metrics yield default metrics
/// carrying the top-level status.
pub fn normalize(body: &Map<String, Value>) -> RetrainResult {
    let mut metrics = body
        .get("metrics")
        .and_then(parse_metrics)
        .unwrap_or_default();

    let status = first_present(body, &["status"])
        .and_then(Value::as_str)
        .map(ModelStatus::from_backend)
        .unwrap_or(metrics.status);
    metrics.status = status;

    let model_artifact_ref = first_present(body, &["model_path", "model_artifact_ref"])
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| metrics.model_artifact_ref.clone());
    metrics.model_artifact_ref = model_artifact_ref.clone();

    RetrainResult {
        metrics,
        status,
        model_artifact_ref,
        message: first_present(body, &["message"])
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}
