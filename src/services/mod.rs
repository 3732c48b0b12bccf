//! # Request services
//!
//! Stateless translation between the controller and the inference/training service:
//!
//! - [`prediction`]: builds `/predict` requests and normalizes their responses.
//! - [`retrain`]: builds `/retrain` requests, normalizes their responses and computes
//!   hyperparameter bands for the effective values.
//! - `metrics`: lenient parsing of the `metrics` object both routes may return.
//!
//! Both services share the response decoding rules below.
//!
//! Response decoding
//! -----------------
//! * A non-2xx status is [`ExoclassError::Server`].
//! * A body that is not a JSON object is [`ExoclassError::MalformedResponse`].
//! * An object carrying an `error` key is [`ExoclassError::BackendRejected`]: the service
//!   reports its own failures with a success status.
use serde_json::{Map, Value};
use tracing::warn;

use crate::{exoclass_errors::ExoclassError, transport::RawResponse};

mod metrics;
pub mod prediction;
pub mod retrain;

/// First non-null value among `keys`, in order.
pub(crate) fn first_present<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

/// Decode a raw response into its top-level JSON object.
///
/// Arguments
/// -----------------
/// * `response`: the completed exchange returned by the transport.
///
/// Return
/// ----------
/// * The JSON object, or the error described in the module documentation.
pub fn decode_json(response: RawResponse) -> Result<Map<String, Value>, ExoclassError> {
    if !response.is_success() {
        let body = response.body_text();
        warn!(status = response.status, "service answered with an error status");
        return Err(ExoclassError::Server {
            status: response.status,
            body,
        });
    }

    let value: Value = serde_json::from_slice(&response.body)?;
    let Value::Object(obj) = value else {
        return Err(ExoclassError::MalformedResponse(format!(
            "expected a JSON object, got {value}"
        )));
    };

    if let Some(error) = obj.get("error").filter(|e| !e.is_null()) {
        let message = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        warn!(%message, "service rejected the request");
        return Err(ExoclassError::BackendRejected(message));
    }

    Ok(obj)
}
