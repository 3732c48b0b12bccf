//! # Exoclass: the mission orchestration controller
//!
//! This module defines [`Exoclass`], the façade that wires together:
//!
//! 1. **Transport** ([`Transport`]) to the inference/training service, by default the
//!    `reqwest`-backed [`ExoclassEnv`].
//! 2. **Session store** ([`SessionStore`]): selected mission, collected input, hyperparameters
//!    and the two request state machines.
//! 3. **Services** ([`prediction`], [`retrain`]) that build payloads and normalize responses.
//! 4. **Projections** ([`crate::projection`]) from the stored results to view models.
//!
//! ## Request lifecycle
//!
//! ```text
//! predict()/retrain()
//!   ├─ lock ─ validate input ─ begin() ─ unlock       (synchronous, may fail fast)
//!   ├─ transport.post(..).await                        (no lock held)
//!   └─ lock ─ resolve(ticket, outcome) ─ unlock
//! ```
//!
//! Validation errors are returned before any state transition and before any network
//! activity. A second submission of the same kind while one is pending is rejected with
//! [`ExoclassError::RequestInFlight`]. If the awaiting task is dropped mid-flight, its request
//! is abandoned and the state returns to its previous phase.
//!
//! ## Typical usage
//!
//! ```rust, no_run
//! use exoclass::config::ClientConfig;
//! use exoclass::exoclass::Exoclass;
//! use exoclass::input::InputMode;
//!
//! # async fn run() -> Result<(), exoclass::exoclass_errors::ExoclassError> {
//! let controller = Exoclass::new(ClientConfig::default())?;
//! controller.select_mission("kepler")?;
//! controller.set_input_mode(InputMode::Manual)?;
//! controller.set_feature_value("koi_score", 0.98)?;
//! // ... the nine other kepler fields
//! let result = controller.predict().await?;
//! println!("{:?}", result.single_input_prediction);
//! # Ok(())
//! # }
//! ```
//!
//! ## See also
//! ------------
//! * [`RequestState`] – Single-flight state machine with generation-based cancellation.
//! * [`SessionState`] – What the controller mutates and observers read.
use std::{fmt, path::Path, sync::Arc};

use serde_json::{Map, Value};
use tracing::info;
use url::Url;

use crate::{
    config::ClientConfig,
    constants::{HyperparamOverrides, DOWNLOAD_MODEL_PATH},
    env_state::ExoclassEnv,
    exoclass_errors::ExoclassError,
    input::{DatasetFile, InputMode},
    missions::{get_mission, Mission},
    projection::{
        self, ClassReportView, ClassShare, ConfusionView, Projection, SinglePredictionView,
    },
    request::{RequestKind, RequestState, RequestTicket},
    results::{FeatureImportance, PrPoint, PredictionResult, RetrainResult},
    services::{
        decode_json,
        prediction::{self, PredictionOrigin},
        retrain::{self, HyperparamAdvice},
    },
    session::{lock_session, new_store, SessionState, SessionStore},
    transport::{OutgoingRequest, Transport},
};

type Selector<T> = fn(&mut SessionState) -> &mut RequestState<T>;

/// An admitted request whose outcome has not been applied yet.
///
/// Dropping it without [`InFlight::finish`] abandons the request, so a caller that stops
/// awaiting cannot leave the session stuck in `Pending`.
struct InFlight<'a, T> {
    session: &'a SessionStore,
    select: Selector<T>,
    ticket: Option<RequestTicket>,
}

impl<'a, T: Clone> InFlight<'a, T> {
    fn new(session: &'a SessionStore, select: Selector<T>, ticket: RequestTicket) -> Self {
        InFlight {
            session,
            select,
            ticket: Some(ticket),
        }
    }

    fn finish(mut self, outcome: &Result<T, ExoclassError>) -> bool {
        let Some(ticket) = self.ticket.take() else {
            return false;
        };
        let mut session = lock_session(self.session);
        (self.select)(&mut *session).resolve(ticket, outcome.as_ref().map(T::clone))
    }
}

impl<T> Drop for InFlight<'_, T> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            let kind = ticket.kind();
            let mut session = lock_session(self.session);
            if (self.select)(&mut *session).abandon(ticket) {
                info!(%kind, "request abandoned by its caller");
            }
        }
    }
}

#[derive(Clone)]
pub struct Exoclass {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
    session: SessionStore,
}

impl fmt::Debug for Exoclass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exoclass")
            .field("base_url", &self.config.base_url.as_str())
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl Exoclass {
    /// Construct a controller talking HTTP to the configured service.
    ///
    /// Arguments
    /// -----------------
    /// * `config`: location of the service and HTTP client settings.
    ///
    /// Return
    /// ----------
    /// * A controller with an empty session, or the error raised while building the HTTP client.
    pub fn new(config: ClientConfig) -> Result<Self, ExoclassError> {
        let env = ExoclassEnv::new(config.clone())?;
        Ok(Self::with_transport(config, Arc::new(env)))
    }

    /// Construct a controller over any [`Transport`], e.g. a test double.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Exoclass {
            transport,
            config,
            session: new_store(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Shared handle on the session, for observers.
    pub fn session(&self) -> SessionStore {
        Arc::clone(&self.session)
    }

    /// Read the session under its lock.
    pub fn with_session<R>(&self, read: impl FnOnce(&SessionState) -> R) -> R {
        read(&*lock_session(&self.session))
    }

    fn with_session_mut<R>(&self, write: impl FnOnce(&mut SessionState) -> R) -> R {
        write(&mut *lock_session(&self.session))
    }

    // ---------------------------------------------------------------------------------------------
    // Mission and input
    // ---------------------------------------------------------------------------------------------

    /// Make a mission active, by id (case-insensitive).
    pub fn select_mission(&self, mission_id: &str) -> Result<&'static Mission, ExoclassError> {
        let mission = get_mission(mission_id)?;
        self.with_session_mut(|s| s.select_mission(mission));
        Ok(mission)
    }

    pub fn mission(&self) -> Option<&'static Mission> {
        self.with_session(SessionState::mission)
    }

    pub fn set_input_mode(&self, mode: InputMode) -> Result<(), ExoclassError> {
        self.with_session_mut(|s| s.input_mut().map(|i| i.set_mode(mode)))
    }

    pub fn set_feature_value(&self, field_id: &str, value: f64) -> Result<(), ExoclassError> {
        self.with_session_mut(|s| s.input_mut()?.set_feature_value(field_id, value))
    }

    /// Record a value typed as text; see [`crate::input::InputCollector::set_raw_feature_value`].
    pub fn set_raw_feature_value(
        &self,
        field_id: &str,
        raw: &str,
    ) -> Result<Option<f64>, ExoclassError> {
        self.with_session_mut(|s| s.input_mut()?.set_raw_feature_value(field_id, raw))
    }

    pub fn clear_feature_value(&self, field_id: &str) -> Result<(), ExoclassError> {
        self.with_session_mut(|s| s.input_mut()?.clear_feature_value(field_id))
    }

    pub fn set_input_file(&self, file: DatasetFile) -> Result<(), ExoclassError> {
        self.with_session_mut(|s| s.input_mut().map(|i| i.set_file(file)))
    }

    pub fn clear_input_file(&self) -> Result<(), ExoclassError> {
        self.with_session_mut(|s| s.input_mut().map(|i| i.clear_file()))
    }

    pub fn reset_input(&self) -> Result<(), ExoclassError> {
        self.with_session_mut(|s| s.input_mut().map(|i| i.reset()))
    }

    /// Whether a prediction may be submitted; `false` while no mission is selected.
    pub fn is_ready(&self) -> bool {
        self.with_session(|s| s.input().is_ok_and(|i| i.is_ready()))
    }

    pub fn missing_fields(&self) -> Result<Vec<&'static str>, ExoclassError> {
        self.with_session(|s| s.input().map(|i| i.missing_fields()))
    }

    // ---------------------------------------------------------------------------------------------
    // Hyperparameters
    // ---------------------------------------------------------------------------------------------

    pub fn set_hyperparameter(&self, param_id: &str, value: f64) -> Result<(), ExoclassError> {
        self.with_session_mut(|s| s.set_hyperparameter(param_id, value))
    }

    pub fn reset_hyperparameters(&self) {
        self.with_session_mut(SessionState::reset_hyperparameters)
    }

    pub fn set_training_file(&self, file: Option<DatasetFile>) {
        self.with_session_mut(|s| s.set_training_file(file))
    }

    /// Band of every hyperparameter of the active mission for the values a retrain would use.
    pub fn hyperparameter_bands(&self) -> Result<Vec<HyperparamAdvice>, ExoclassError> {
        self.with_session(|s| retrain::bands(s.input()?.mission(), s.hyperparameters()))
    }

    // ---------------------------------------------------------------------------------------------
    // Requests
    // ---------------------------------------------------------------------------------------------

    async fn exchange(&self, request: OutgoingRequest) -> Result<Map<String, Value>, ExoclassError> {
        let response = self.transport.post(request).await?;
        decode_json(response)
    }

    /// Classify the collected input.
    ///
    /// Return
    /// ----------
    /// * The normalized result of this exchange. It is also stored in the session unless the
    ///   request was cancelled meanwhile.
    /// * A validation error or [`ExoclassError::RequestInFlight`] before any network activity;
    ///   otherwise the transport, server or response error, which is also recorded as the
    ///   prediction state's error message.
    pub async fn predict(&self) -> Result<PredictionResult, ExoclassError> {
        let (request, origin, in_flight) = {
            let mut session = lock_session(&self.session);
            let input = session.input()?;
            let origin = PredictionOrigin::from(input.mode());
            let request = prediction::build_request(input.mission(), input.state())?;
            let ticket = session.prediction_mut().begin()?;
            (
                request,
                origin,
                InFlight::new(&self.session, SessionState::prediction_mut, ticket),
            )
        };

        info!(kind = %RequestKind::Predict, ?origin, "submitting prediction");
        let outcome = self
            .exchange(request)
            .await
            .map(|body| prediction::normalize(&body, origin));
        in_flight.finish(&outcome);
        outcome
    }

    /// Retrain the active mission's model with the session's hyperparameters and training file.
    pub async fn retrain(&self) -> Result<RetrainResult, ExoclassError> {
        let (overrides, dataset) = self.with_session(|s| {
            (s.hyperparameters().clone(), s.training_file().cloned())
        });
        self.retrain_with(&overrides, dataset.as_ref()).await
    }

    /// Retrain the active mission's model.
    ///
    /// Arguments
    /// -----------------
    /// * `overrides`: hyperparameter values replacing the mission defaults.
    /// * `dataset`: labelled training file; required.
    ///
    /// Return
    /// ----------
    /// * The normalized training answer, whose metrics replace the previous ones in the session.
    /// * Errors as for [`Exoclass::predict`].
    pub async fn retrain_with(
        &self,
        overrides: &HyperparamOverrides,
        dataset: Option<&DatasetFile>,
    ) -> Result<RetrainResult, ExoclassError> {
        let (request, in_flight) = {
            let mut session = lock_session(&self.session);
            let mission = session.input()?.mission();
            let request = retrain::build_request(mission, overrides, dataset)?;
            let ticket = session.retrain_mut().begin()?;
            (
                request,
                InFlight::new(&self.session, SessionState::retrain_mut, ticket),
            )
        };

        info!(kind = %RequestKind::Retrain, "submitting retraining job");
        let outcome = self
            .exchange(request)
            .await
            .map(|body| retrain::normalize(&body));
        in_flight.finish(&outcome);
        outcome
    }

    /// Abandon the pending request of `kind`; its response will be ignored.
    pub fn cancel(&self, kind: RequestKind) -> bool {
        self.with_session_mut(|s| match kind {
            RequestKind::Predict => s.prediction_mut().cancel(),
            RequestKind::Retrain => s.retrain_mut().cancel(),
        })
    }

    // ---------------------------------------------------------------------------------------------
    // Model artifact
    // ---------------------------------------------------------------------------------------------

    /// URL serving the active mission's model, retrained or pre-trained.
    ///
    /// `<base>/download_model?mission=<id>&retrained=<bool>`
    pub fn download_url(&self, retrained: bool) -> Result<Url, ExoclassError> {
        let mission = self.with_session(|s| s.input().map(|i| i.mission()))?;
        let mut url = self.config.endpoint(DOWNLOAD_MODEL_PATH)?;
        url.query_pairs_mut()
            .append_pair("mission", mission.id)
            .append_pair("retrained", if retrained { "true" } else { "false" });
        Ok(url)
    }

    /// Stream the model artifact to `destination`.
    ///
    /// Arguments
    /// -----------------
    /// * `destination`: file to create or overwrite.
    /// * `retrained`: fetch the model of the last successful retrain instead of the pre-trained
    ///   one; fails with [`ExoclassError::NoModelArtifact`] if no retrain produced an artifact.
    ///
    /// Return
    /// ----------
    /// * The number of bytes written.
    pub async fn save_model_artifact(
        &self,
        destination: &Path,
        retrained: bool,
    ) -> Result<u64, ExoclassError> {
        if retrained {
            let artifact = self.with_session(|s| {
                let mission = s.input()?.mission();
                let artifact = s
                    .retrain()
                    .result()
                    .and_then(|r| r.model_artifact_ref.clone());
                artifact.ok_or_else(|| ExoclassError::NoModelArtifact(mission.id.to_string()))
            })?;
            info!(%artifact, "saving retrained model");
        }
        let url = self.download_url(retrained)?;
        self.transport.download(&url, destination).await
    }

    // ---------------------------------------------------------------------------------------------
    // Projections
    // ---------------------------------------------------------------------------------------------

    /// Class shares of the last prediction; empty when nothing was predicted.
    pub fn probability_distribution(&self) -> Vec<ClassShare> {
        self.with_session(|s| {
            s.prediction()
                .result()
                .map(|r| projection::probability_distribution(&r.class_counts))
                .unwrap_or_default()
        })
    }

    pub fn single_prediction_view(&self) -> Projection<SinglePredictionView> {
        self.with_session(|s| {
            s.prediction()
                .result()
                .map_or(Projection::NoData, projection::single_prediction_view)
        })
    }

    pub fn confusion_view(&self) -> Projection<ConfusionView> {
        self.with_session(|s| projection::confusion_view(s.current_metrics()))
    }

    pub fn pr_curve_view(&self) -> Projection<Vec<PrPoint>> {
        self.with_session(|s| projection::pr_curve_view(s.current_metrics()))
    }

    pub fn feature_importance_view(&self) -> Projection<Vec<FeatureImportance>> {
        self.with_session(|s| projection::feature_importance_view(s.current_metrics()))
    }

    pub fn class_report_view(&self) -> Projection<ClassReportView> {
        self.with_session(|s| projection::class_report_view(s.current_metrics()))
    }
}
