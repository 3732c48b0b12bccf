use thiserror::Error;

use crate::request::RequestKind;

/// Input problems detected before any network activity.
///
/// These never move a request state machine: the action is refused
/// synchronously and the caller surfaces the message to the operator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("No mission selected")]
    NoMissionSelected,

    #[error("Missing values for feature fields: {0}")]
    MissingFeatures(String),

    #[error("No dataset file selected")]
    MissingDataset,

    #[error("Field '{field}' is not part of the '{mission}' schema")]
    UnknownField { mission: String, field: String },

    #[error("Value '{raw}' entered for '{field}' is not a number")]
    InvalidNumber { field: String, raw: String },

    #[error("Value for '{0}' must be a finite number")]
    NonFiniteValue(String),

    #[error("Value {value} for '{param}' must be a whole number")]
    NonIntegerValue { param: String, value: f64 },

    #[error("Retraining is not supported for mission '{0}', use the pre-trained model")]
    RetrainUnsupported(String),

    #[error("Dataset is missing the label column '{column}' (available columns: {available})")]
    MissingLabelColumn { column: String, available: String },
}

#[derive(Error, Debug)]
pub enum ExoclassError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Mission not found: {0}")]
    MissionNotFound(String),

    #[error("Hyperparameter '{param}' is not defined for mission '{mission}'")]
    UnknownHyperparameter { mission: String, param: String },

    #[error("A {0} request is already in flight")]
    RequestInFlight(RequestKind),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Server error: status {status}")]
    Server { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Backend rejected the request: {0}")]
    BackendRejected(String),

    #[error("No retrained model artifact is available for mission '{0}'")]
    NoModelArtifact(String),

    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

impl From<serde_json::Error> for ExoclassError {
    fn from(err: serde_json::Error) -> Self {
        ExoclassError::MalformedResponse(err.to_string())
    }
}

impl ExoclassError {
    /// True for errors raised before the request left the process.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ExoclassError::Validation(_)
                | ExoclassError::MissionNotFound(_)
                | ExoclassError::UnknownHyperparameter { .. }
        )
    }
}

impl PartialEq for ExoclassError {
    fn eq(&self, other: &Self) -> bool {
        use ExoclassError::*;
        match (self, other) {
            (Validation(a), Validation(b)) => a == b,
            (MissionNotFound(a), MissionNotFound(b)) => a == b,
            (
                UnknownHyperparameter {
                    mission: m1,
                    param: p1,
                },
                UnknownHyperparameter {
                    mission: m2,
                    param: p2,
                },
            ) => m1 == m2 && p1 == p2,
            (RequestInFlight(a), RequestInFlight(b)) => a == b,
            (Transport(a), Transport(b)) => a == b,
            (Server { status: a, .. }, Server { status: b, .. }) => a == b,
            (MalformedResponse(a), MalformedResponse(b)) => a == b,
            (BackendRejected(a), BackendRejected(b)) => a == b,
            (NoModelArtifact(a), NoModelArtifact(b)) => a == b,
            (InvalidConfig(a), InvalidConfig(b)) => a == b,
            (InvalidUrl(a), InvalidUrl(b)) => a == b,

            // not comparable: same variant is enough
            (IoError(_), IoError(_)) => true,
            (ReqwestError(_), ReqwestError(_)) => true,
            (CsvError(_), CsvError(_)) => true,

            _ => false,
        }
    }
}
