//! # Session state
//!
//! [`SessionState`] is the single owner of everything that changes while an operator works:
//! the selected mission, the collected input, the researcher's hyperparameters and training
//! file, the two request state machines and which result panels are visible.
//!
//! ## Sharing
//!
//! The controller and any observer share one [`SessionStore`] (`Arc<Mutex<SessionState>>`).
//! The lock is only held for synchronous transitions, never across a network call, so every
//! observer sees a request either before or after its resolution, never halfway.
//!
//! ```rust
//! use exoclass::missions::get_mission;
//! use exoclass::session::{lock_session, new_store};
//!
//! let store = new_store();
//! lock_session(&store).select_mission(get_mission("k2").unwrap());
//! assert_eq!(lock_session(&store).mission().map(|m| m.id), Some("k2"));
//! ```
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::info;

use crate::{
    constants::HyperparamOverrides,
    exoclass_errors::{ExoclassError, ValidationError},
    input::{DatasetFile, InputCollector},
    missions::Mission,
    request::{RequestKind, RequestState},
    results::{Metrics, PredictionResult, RetrainResult},
};

/// Visibility of the optional result panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewFlags {
    pub researcher_dashboard: bool,
    pub visualization: bool,
    pub confusion_matrix: bool,
    pub pr_curve: bool,
    pub feature_importance: bool,
}

impl Default for ViewFlags {
    fn default() -> Self {
        ViewFlags {
            researcher_dashboard: false,
            visualization: false,
            confusion_matrix: true,
            pr_curve: true,
            feature_importance: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionState {
    input: Option<InputCollector>,
    hyperparameters: HyperparamOverrides,
    training_file: Option<DatasetFile>,
    prediction: RequestState<PredictionResult>,
    retrain: RequestState<RetrainResult>,
    views: ViewFlags,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState {
            input: None,
            hyperparameters: HyperparamOverrides::new(),
            training_file: None,
            prediction: RequestState::new(RequestKind::Predict),
            retrain: RequestState::new(RequestKind::Retrain),
            views: ViewFlags::default(),
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mission(&self) -> Option<&'static Mission> {
        self.input.as_ref().map(InputCollector::mission)
    }

    /// Make `mission` the active one.
    ///
    /// Selecting another mission drops its feature values, hyperparameters and results
    /// (they belong to the previous model) and discards any response still in flight.
    /// The input mode and the selected input file are kept. Selecting the active mission
    /// again changes nothing.
    pub fn select_mission(&mut self, mission: &'static Mission) {
        if let Some(input) = self.input.as_mut() {
            if std::ptr::eq(input.mission(), mission) {
                return;
            }
            input.set_mission(mission);
        } else {
            self.input = Some(InputCollector::new(mission));
        }
        info!(mission = mission.id, "mission selected");
        self.hyperparameters.clear();
        self.prediction.reset();
        self.retrain.reset();
    }

    pub fn input(&self) -> Result<&InputCollector, ExoclassError> {
        self.input
            .as_ref()
            .ok_or_else(|| ValidationError::NoMissionSelected.into())
    }

    pub fn input_mut(&mut self) -> Result<&mut InputCollector, ExoclassError> {
        self.input
            .as_mut()
            .ok_or_else(|| ValidationError::NoMissionSelected.into())
    }

    pub fn hyperparameters(&self) -> &HyperparamOverrides {
        &self.hyperparameters
    }

    /// Override one hyperparameter of the active mission.
    ///
    /// Return
    /// ----------
    /// * [`ExoclassError::UnknownHyperparameter`] if the mission has no such parameter,
    ///   [`ValidationError::NonFiniteValue`] for NaN or infinities,
    ///   [`ValidationError::NonIntegerValue`] for a fractional value of an integer parameter.
    pub fn set_hyperparameter(&mut self, param_id: &str, value: f64) -> Result<(), ExoclassError> {
        let mission = self.input()?.mission();
        let field = mission
            .hyperparam_field(param_id)
            .ok_or_else(|| ExoclassError::UnknownHyperparameter {
                mission: mission.id.to_string(),
                param: param_id.to_string(),
            })?;
        let value = field.check_value(value)?;
        self.hyperparameters.insert(field.id.to_string(), value);
        Ok(())
    }

    /// Restore every hyperparameter to its default.
    pub fn reset_hyperparameters(&mut self) {
        self.hyperparameters.clear();
    }

    pub fn training_file(&self) -> Option<&DatasetFile> {
        self.training_file.as_ref()
    }

    pub fn set_training_file(&mut self, file: Option<DatasetFile>) {
        self.training_file = file;
    }

    pub fn prediction(&self) -> &RequestState<PredictionResult> {
        &self.prediction
    }

    pub(crate) fn prediction_mut(&mut self) -> &mut RequestState<PredictionResult> {
        &mut self.prediction
    }

    pub fn retrain(&self) -> &RequestState<RetrainResult> {
        &self.retrain
    }

    pub(crate) fn retrain_mut(&mut self) -> &mut RequestState<RetrainResult> {
        &mut self.retrain
    }

    pub fn views(&self) -> &ViewFlags {
        &self.views
    }

    pub fn views_mut(&mut self) -> &mut ViewFlags {
        &mut self.views
    }

    /// Metrics shown on the researcher dashboard: those of the last successful retrain,
    /// otherwise those reported with the last prediction.
    pub fn current_metrics(&self) -> Option<&Metrics> {
        self.retrain
            .result()
            .map(|r| &r.metrics)
            .or_else(|| self.prediction.result().and_then(|p| p.metrics.as_ref()))
    }
}

/// Shared handle on a session.
pub type SessionStore = Arc<Mutex<SessionState>>;

/// A fresh, empty session behind a shareable handle.
pub fn new_store() -> SessionStore {
    Arc::new(Mutex::new(SessionState::new()))
}

/// Lock the session.
///
/// A panic while the lock was held cannot leave a transition half-applied (every transition
/// is a handful of assignments), so a poisoned lock is recovered rather than propagated.
pub fn lock_session(store: &SessionStore) -> MutexGuard<'_, SessionState> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}
