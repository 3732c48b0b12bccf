//! Qualitative fitness bands for hyperparameter values.
//!
//! Every [`HyperparamField`] carries a `[low, high]` window. A value strictly below the window
//! is likely to **underfit**, a value strictly above it to **overfit**; the bounds themselves
//! are considered suitable.
//!
//! The functions here are pure: the same `(mission, param, value)` always yields the same band,
//! so the advice can be shown while the researcher types, long before a retraining job answers.
use std::cmp::Ordering;
use std::fmt;

use super::{get_mission, HyperparamField};
use crate::exoclass_errors::{ExoclassError, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    Underfit,
    Suitable,
    Overfit,
}

impl Band {
    /// Short advice shown next to the parameter input.
    pub fn hint(&self) -> &'static str {
        match self {
            Band::Underfit => "Low (Underfitting)",
            Band::Suitable => "Suitable",
            Band::Overfit => "High (Overfitting)",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hint())
    }
}

/// Classify a value against the thresholds of a field already in hand.
///
/// Return
/// ----------
/// * `Ok(Band)` for finite values.
/// * [`ValidationError::NonFiniteValue`] for NaN or infinities, which have no meaningful band.
pub fn classify_field(field: &HyperparamField, value: f64) -> Result<Band, ExoclassError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue(field.id.to_string()).into());
    }
    let t = field.thresholds;
    let band = match (value.partial_cmp(&t.low), value.partial_cmp(&t.high)) {
        (Some(Ordering::Less), _) => Band::Underfit,
        (_, Some(Ordering::Greater)) => Band::Overfit,
        _ => Band::Suitable,
    };
    Ok(band)
}

/// Classify a hyperparameter value for a mission.
///
/// Arguments
/// -----------------
/// * `mission_id`: catalog id of the mission.
/// * `param_id`: hyperparameter id, e.g. `"learning_rate"`.
/// * `value`: the candidate value.
///
/// Return
/// ----------
/// * The [`Band`] of the value.
/// * [`ExoclassError::MissionNotFound`] for an unknown mission,
///   [`ExoclassError::UnknownHyperparameter`] if the mission does not expose `param_id`.
///
/// See also
/// ------------
/// * [`classify_field`] – same rule without the catalog lookup.
pub fn classify(mission_id: &str, param_id: &str, value: f64) -> Result<Band, ExoclassError> {
    let mission = get_mission(mission_id)?;
    let field =
        mission
            .hyperparam_field(param_id)
            .ok_or_else(|| ExoclassError::UnknownHyperparameter {
                mission: mission.id.to_string(),
                param: param_id.to_string(),
            })?;
    classify_field(field, value)
}
