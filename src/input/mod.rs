//! # Observation input collection
//!
//! The operator feeds a mission's classifier in one of two ways:
//!
//! - **File** mode – a bulk CSV/FITS file handed over as a [`DatasetFile`],
//! - **Manual** mode – one value per feature field of the active mission.
//!
//! [`InputCollector`] tracks both at once (switching mode keeps what was entered in the
//! other one) and answers a single question: *is the input complete enough to predict?*
//!
//! Readiness rules
//! -----------------
//! * File mode: a file handle is present.
//! * Manual mode: every feature field of the active mission holds a finite number.
//!
//! The collector only mutates its own [`InputState`]; it never talks to the network.
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    constants::FeatureVector,
    exoclass_errors::{ExoclassError, ValidationError},
    missions::{FeatureField, Mission},
};

mod dataset;

pub use dataset::{DatasetFile, DatasetSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    #[default]
    File,
    Manual,
}

/// Everything the operator has entered so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    pub mode: InputMode,
    pub file: Option<DatasetFile>,
    pub feature_vector: FeatureVector,
}

#[derive(Debug, Clone)]
pub struct InputCollector {
    mission: &'static Mission,
    state: InputState,
}

impl InputCollector {
    pub fn new(mission: &'static Mission) -> Self {
        InputCollector {
            mission,
            state: InputState::default(),
        }
    }

    pub fn mission(&self) -> &'static Mission {
        self.mission
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    pub fn mode(&self) -> InputMode {
        self.state.mode
    }

    pub fn set_mode(&mut self, mode: InputMode) {
        self.state.mode = mode;
    }

    /// Switch to another mission schema.
    ///
    /// Feature values are dropped because the field sets differ between missions;
    /// the mode and the selected file are kept.
    pub fn set_mission(&mut self, mission: &'static Mission) {
        if !std::ptr::eq(self.mission, mission) {
            debug!(from = self.mission.id, to = mission.id, "switching input schema");
            self.state.feature_vector.clear();
        }
        self.mission = mission;
    }

    fn schema_field(&self, field_id: &str) -> Result<&'static FeatureField, ExoclassError> {
        let mission = self.mission;
        mission.feature_field(field_id).ok_or_else(|| {
            ValidationError::UnknownField {
                mission: mission.id.to_string(),
                field: field_id.to_string(),
            }
            .into()
        })
    }

    /// Record a manually entered value.
    ///
    /// Arguments
    /// -----------------
    /// * `field_id`: a feature id of the active mission.
    /// * `value`: the numeric value; must be finite.
    ///
    /// Return
    /// ----------
    /// * [`ValidationError::UnknownField`] if the field is not part of the schema,
    ///   [`ValidationError::NonFiniteValue`] for NaN or infinities.
    pub fn set_feature_value(&mut self, field_id: &str, value: f64) -> Result<(), ExoclassError> {
        let field = self.schema_field(field_id)?;
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteValue(field.id.to_string()).into());
        }
        self.state.feature_vector.insert(field.id.to_string(), value);
        Ok(())
    }

    /// Record a value typed as text.
    ///
    /// Blank text clears the field. Text that does not parse as a number is rejected
    /// with [`ValidationError::InvalidNumber`] rather than silently turned into `0`,
    /// and the previously stored value is left untouched.
    ///
    /// Return
    /// ----------
    /// * `Some(value)` when a number was stored, `None` when the field was cleared.
    pub fn set_raw_feature_value(
        &mut self,
        field_id: &str,
        raw: &str,
    ) -> Result<Option<f64>, ExoclassError> {
        let field = self.schema_field(field_id)?;
        let raw = raw.trim();
        if raw.is_empty() {
            self.state.feature_vector.remove(field.id);
            return Ok(None);
        }
        let value: f64 = raw.parse().map_err(|_| ValidationError::InvalidNumber {
            field: field.id.to_string(),
            raw: raw.to_string(),
        })?;
        self.set_feature_value(field_id, value)?;
        Ok(Some(value))
    }

    pub fn clear_feature_value(&mut self, field_id: &str) -> Result<(), ExoclassError> {
        let field = self.schema_field(field_id)?;
        self.state.feature_vector.remove(field.id);
        Ok(())
    }

    pub fn feature_value(&self, field_id: &str) -> Option<f64> {
        self.state.feature_vector.get(field_id).copied()
    }

    pub fn feature_vector(&self) -> &FeatureVector {
        &self.state.feature_vector
    }

    pub fn set_file(&mut self, file: DatasetFile) {
        debug!(name = file.name(), bytes = file.len(), "input file selected");
        self.state.file = Some(file);
    }

    pub fn clear_file(&mut self) {
        self.state.file = None;
    }

    pub fn file(&self) -> Option<&DatasetFile> {
        self.state.file.as_ref()
    }

    /// Forget every entered value and the selected file; the mode is kept.
    pub fn reset(&mut self) {
        self.state.feature_vector.clear();
        self.state.file = None;
    }

    /// Feature ids of the active mission that still lack a finite value, in schema order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.mission
            .feature_ids()
            .filter(|id| {
                !self
                    .state
                    .feature_vector
                    .get(*id)
                    .is_some_and(|v| v.is_finite())
            })
            .collect()
    }

    /// Whether the active mode's completeness rule holds.
    pub fn is_ready(&self) -> bool {
        match self.state.mode {
            InputMode::File => self.state.file.is_some(),
            InputMode::Manual => self.missing_fields().is_empty(),
        }
    }
}

#[cfg(test)]
mod input_test {
    use super::*;
    use crate::missions::{get_mission, missions};

    fn fill_all(collector: &mut InputCollector) {
        for (i, id) in collector.mission().feature_ids().enumerate() {
            collector.set_feature_value(id, i as f64 + 0.5).unwrap();
        }
    }

    #[test]
    fn test_manual_readiness_for_every_mission() {
        for mission in missions() {
            let mut collector = InputCollector::new(mission);
            collector.set_mode(InputMode::Manual);
            assert!(!collector.is_ready());

            fill_all(&mut collector);
            assert!(collector.is_ready(), "{} should be ready", mission.id);

            let last = mission.feature_fields.last().unwrap().id;
            collector.clear_feature_value(last).unwrap();
            assert!(!collector.is_ready());
            assert_eq!(collector.missing_fields(), vec![last]);
        }
    }

    #[test]
    fn test_file_readiness() {
        let mut collector = InputCollector::new(get_mission("tess").unwrap());
        assert_eq!(collector.mode(), InputMode::File);
        assert!(!collector.is_ready());

        collector.set_file(DatasetFile::new("toi.csv", "pl_orbper\n1.0\n"));
        assert!(collector.is_ready());

        // manual mode ignores the file
        collector.set_mode(InputMode::Manual);
        assert!(!collector.is_ready());

        collector.set_mode(InputMode::File);
        collector.clear_file();
        assert!(!collector.is_ready());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut collector = InputCollector::new(get_mission("kepler").unwrap());
        let err = collector.set_feature_value("pl_rade", 1.0).unwrap_err();
        assert_eq!(
            err,
            ExoclassError::Validation(ValidationError::UnknownField {
                mission: "kepler".into(),
                field: "pl_rade".into()
            })
        );
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut collector = InputCollector::new(get_mission("kepler").unwrap());
        assert!(collector.set_feature_value("koi_prad", f64::INFINITY).is_err());
        assert!(collector.set_feature_value("koi_prad", f64::NAN).is_err());
        assert_eq!(collector.feature_value("koi_prad"), None);
    }

    #[test]
    fn test_raw_values() {
        let mut collector = InputCollector::new(get_mission("kepler").unwrap());
        assert_eq!(
            collector.set_raw_feature_value("koi_prad", " 2.5 "),
            Ok(Some(2.5))
        );

        let err = collector.set_raw_feature_value("koi_prad", "abc").unwrap_err();
        assert_eq!(
            err,
            ExoclassError::Validation(ValidationError::InvalidNumber {
                field: "koi_prad".into(),
                raw: "abc".into()
            })
        );
        // the earlier value survives a rejected edit
        assert_eq!(collector.feature_value("koi_prad"), Some(2.5));

        assert_eq!(collector.set_raw_feature_value("koi_prad", ""), Ok(None));
        assert_eq!(collector.feature_value("koi_prad"), None);
    }

    #[test]
    fn test_raw_value_unknown_field_first() {
        let mut collector = InputCollector::new(get_mission("kepler").unwrap());
        let unknown = ExoclassError::Validation(ValidationError::UnknownField {
            mission: "kepler".into(),
            field: "pl_rade".into(),
        });
        assert_eq!(
            collector.set_raw_feature_value("pl_rade", "abc").unwrap_err(),
            unknown
        );
        assert_eq!(
            collector.set_raw_feature_value("pl_rade", "  ").unwrap_err(),
            unknown
        );
    }

    #[test]
    fn test_zero_is_a_value() {
        let mut collector = InputCollector::new(get_mission("kepler").unwrap());
        collector.set_mode(InputMode::Manual);
        for id in collector.mission().feature_ids() {
            collector.set_feature_value(id, 0.0).unwrap();
        }
        assert!(collector.is_ready());
    }

    #[test]
    fn test_mission_switch_clears_features() {
        let mut collector = InputCollector::new(get_mission("kepler").unwrap());
        fill_all(&mut collector);
        collector.set_file(DatasetFile::new("a.csv", "x\n1\n"));
        collector.set_mode(InputMode::Manual);

        collector.set_mission(get_mission("kepler").unwrap());
        assert_eq!(collector.feature_vector().len(), 10);

        collector.set_mission(get_mission("k2").unwrap());
        assert!(collector.feature_vector().is_empty());
        assert_eq!(collector.mode(), InputMode::Manual);
        assert!(collector.file().is_some());
    }

    #[test]
    fn test_reset() {
        let mut collector = InputCollector::new(get_mission("k2").unwrap());
        collector.set_mode(InputMode::Manual);
        fill_all(&mut collector);
        collector.set_file(DatasetFile::new("a.csv", "x\n1\n"));

        collector.reset();
        assert!(collector.feature_vector().is_empty());
        assert!(collector.file().is_none());
        assert_eq!(collector.mode(), InputMode::Manual);
    }
}
