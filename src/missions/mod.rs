//! # Mission catalog
//!
//! A **mission** is one survey whose observations can be classified: Kepler, K2 or TESS.
//! Each mission carries everything the rest of the crate needs to know about it:
//!
//! - the ordered **feature schema** used by the manual-entry form and the `/predict` payload,
//! - the **hyperparameter schema** (defaults and fitness thresholds) used by retraining,
//! - display metadata (name, icon, model kind and summary),
//! - whether the backend accepts retraining for it and which dataset column holds the label.
//!
//! ## Public API
//!
//! - [`get_mission`](crate::missions::get_mission) – case-insensitive lookup in the static catalog.
//! - [`missions`](crate::missions::missions) – the whole catalog in display order.
//! - [`advisor`] – qualitative bands for hyperparameter values.
//!
//! Missions are `&'static` data defined at build time. Components hold references to them
//! and never branch on a mission id: adding a survey only requires a new entry in
//! `catalog.rs`.
//!
//! ```rust
//! use exoclass::missions::get_mission;
//!
//! let kepler = get_mission("Kepler").unwrap();
//! assert_eq!(kepler.feature_fields.len(), 10);
//! assert_eq!(kepler.model_kind.label(), "XGBoost");
//! ```
use std::fmt;

use crate::{
    constants::MissionId,
    exoclass_errors::{ExoclassError, ValidationError},
};

pub mod advisor;
mod catalog;

/// One scalar numeric input of a mission schema.
#[derive(Debug, PartialEq)]
pub struct FeatureField {
    /// Canonical key: dataset column, form key and payload key.
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

/// Numeric domain of a hyperparameter, used when formatting the retrain form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Integer,
    Float,
}

/// Inclusive fitness window of a hyperparameter.
///
/// Values strictly below `low` tend to underfit, values strictly above `high` to overfit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandThresholds {
    pub low: f64,
    pub high: f64,
}

/// One tunable training parameter of a mission.
#[derive(Debug, PartialEq)]
pub struct HyperparamField {
    pub id: &'static str,
    pub label: &'static str,
    pub default_value: f64,
    pub kind: ParamKind,
    pub thresholds: BandThresholds,
}

impl HyperparamField {
    /// Check that `value` can be sent for this parameter.
    ///
    /// Return
    /// ----------
    /// * The value itself when it is finite and, for integer parameters, whole.
    /// * [`ValidationError::NonFiniteValue`] or [`ValidationError::NonIntegerValue`] otherwise,
    ///   so the band shown for a value is always the band of the value sent.
    pub fn check_value(&self, value: f64) -> Result<f64, ExoclassError> {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteValue(self.id.to_string()).into());
        }
        if self.kind == ParamKind::Integer && value.fract() != 0.0 {
            return Err(ValidationError::NonIntegerValue {
                param: self.id.to_string(),
                value,
            }
            .into());
        }
        Ok(value)
    }

    /// Render a checked value the way the training endpoint parses it.
    ///
    /// Integer parameters are written without decimals (`6.0` → `"6"`), floats keep
    /// their shortest round-trip representation.
    pub fn format_value(&self, value: f64) -> String {
        match self.kind {
            ParamKind::Integer => format!("{}", value.trunc() as i64),
            ParamKind::Float => format!("{value}"),
        }
    }
}

/// Family of the model the backend runs for a mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    XGBoost,
    LightGBM,
    NeuralNetwork,
}

impl ModelKind {
    pub fn label(&self) -> &'static str {
        match self {
            ModelKind::XGBoost => "XGBoost",
            ModelKind::LightGBM => "LightGBM",
            ModelKind::NeuralNetwork => "Neural Network",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Static description of a supported survey.
#[derive(Debug, PartialEq)]
pub struct Mission {
    pub id: MissionId,
    pub display_name: &'static str,
    pub icon: &'static str,
    pub feature_fields: &'static [FeatureField],
    pub hyperparam_fields: &'static [HyperparamField],
    pub model_kind: ModelKind,
    /// One-line explanation of why this model family is used for the mission.
    pub model_summary: &'static str,
    /// Column holding the ground-truth disposition in training datasets.
    pub label_column: Option<&'static str>,
    pub supports_retrain: bool,
}

impl Mission {
    /// Find a feature field of this mission by id.
    pub fn feature_field(&self, field_id: &str) -> Option<&FeatureField> {
        self.feature_fields.iter().find(|f| f.id == field_id)
    }

    /// Find a hyperparameter of this mission by id.
    pub fn hyperparam_field(&self, param_id: &str) -> Option<&HyperparamField> {
        self.hyperparam_fields.iter().find(|f| f.id == param_id)
    }

    /// Feature ids in schema order.
    pub fn feature_ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.feature_fields.iter().map(|f| f.id)
    }
}

impl fmt::Display for Mission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.display_name, self.icon)
    }
}

/// The full catalog in display order.
pub fn missions() -> &'static [Mission] {
    catalog::MISSIONS
}

/// Look up a mission by id.
///
/// The comparison ignores ASCII case, as the inference service lower-cases mission ids.
///
/// Arguments
/// -----------------
/// * `id`: mission identifier, e.g. `"kepler"`.
///
/// Return
/// ----------
/// * The shared static [`Mission`], or [`ExoclassError::MissionNotFound`].
pub fn get_mission(id: &str) -> Result<&'static Mission, ExoclassError> {
    catalog::MISSIONS
        .iter()
        .find(|m| m.id.eq_ignore_ascii_case(id.trim()))
        .ok_or_else(|| ExoclassError::MissionNotFound(id.to_string()))
}

#[cfg(test)]
mod missions_test {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_get_mission() {
        let k2 = get_mission("k2").unwrap();
        assert_eq!(k2.display_name, "K2");
        assert!(std::ptr::eq(k2, get_mission(" K2 ").unwrap()));

        assert_eq!(
            get_mission("hubble"),
            Err(ExoclassError::MissionNotFound("hubble".into()))
        );
    }

    #[test]
    fn test_catalog_order() {
        let ids: Vec<&str> = missions().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["kepler", "tess", "k2"]);
    }

    #[test]
    fn test_schema_sizes() {
        for mission in missions() {
            let n = mission.feature_fields.len();
            assert!((9..=10).contains(&n), "{} has {n} features", mission.id);
            assert!(mission.hyperparam_fields.len() <= 3);

            let unique: HashSet<&str> = mission.feature_ids().collect();
            assert_eq!(unique.len(), n, "duplicate feature id in {}", mission.id);

            for param in mission.hyperparam_fields {
                assert!(param.thresholds.low <= param.thresholds.high);
                assert!(param.default_value >= param.thresholds.low);
                assert!(param.default_value <= param.thresholds.high);
            }
        }
    }

    #[test]
    fn test_field_lookup() {
        let kepler = get_mission("kepler").unwrap();
        assert_eq!(kepler.feature_field("koi_prad").unwrap().label, "Planetary Radius");
        assert!(kepler.feature_field("pl_rade").is_none());
        assert_eq!(kepler.hyperparam_field("max_depth").unwrap().default_value, 6.0);
    }

    #[test]
    fn test_format_value() {
        let kepler = get_mission("kepler").unwrap();
        let depth = kepler.hyperparam_field("max_depth").unwrap();
        assert_eq!(depth.format_value(6.0), "6");
        let lr = kepler.hyperparam_field("learning_rate").unwrap();
        assert_eq!(lr.format_value(0.1), "0.1");
    }

    #[test]
    fn test_check_value_integer_kind() {
        let kepler = get_mission("kepler").unwrap();
        let depth = kepler.hyperparam_field("max_depth").unwrap();
        assert_eq!(depth.check_value(10.0).unwrap(), 10.0);
        assert_eq!(
            depth.check_value(10.5).unwrap_err(),
            ExoclassError::Validation(ValidationError::NonIntegerValue {
                param: "max_depth".into(),
                value: 10.5
            })
        );
        assert_eq!(
            depth.check_value(f64::NAN).unwrap_err(),
            ExoclassError::Validation(ValidationError::NonFiniteValue("max_depth".into()))
        );
        let lr = kepler.hyperparam_field("learning_rate").unwrap();
        assert_eq!(lr.check_value(0.25).unwrap(), 0.25);
    }
}
