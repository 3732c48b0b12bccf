//! # Single-flight request state machine
//!
//! Each backend operation kind (predict, retrain) owns one [`RequestState`]. It follows
//!
//! ```text
//! idle ──begin──▶ pending ──resolve(Ok)──▶ success
//!                 pending ──resolve(Err)─▶ error
//! success/error ──begin──▶ pending
//! pending ──begin──▶ rejected with RequestInFlight, no transition
//! ```
//!
//! Terminal states are not sticky: a new submission from `success` or `error` goes back to
//! `pending` while keeping the previous result visible until the new one lands.
//!
//! ## Generations
//!
//! [`RequestState::begin`] hands out a [`RequestTicket`] stamped with a generation number.
//! [`RequestState::resolve`] applies an outcome only if its ticket is still current, so a
//! response that arrives after [`RequestState::cancel`] can never overwrite newer state.
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::exoclass_errors::ExoclassError;

/// The two backend operations that are tracked independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Predict,
    Retrain,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::Predict => f.write_str("predict"),
            RequestKind::Retrain => f.write_str("retrain"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestPhase {
    #[default]
    Idle,
    Pending,
    Success,
    Error,
}

/// Proof that a submission was admitted; required to resolve it.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a ticket must be resolved or the request stays pending"]
pub struct RequestTicket {
    kind: RequestKind,
    generation: u64,
}

impl RequestTicket {
    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone)]
pub struct RequestState<T> {
    kind: RequestKind,
    phase: RequestPhase,
    /// Phase to fall back to when a pending request is cancelled.
    settled_phase: RequestPhase,
    result: Option<T>,
    error_message: Option<String>,
    generation: u64,
}

impl<T> RequestState<T> {
    pub fn new(kind: RequestKind) -> Self {
        RequestState {
            kind,
            phase: RequestPhase::Idle,
            settled_phase: RequestPhase::Idle,
            result: None,
            error_message: None,
            generation: 0,
        }
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn phase(&self) -> RequestPhase {
        self.phase
    }

    pub fn is_pending(&self) -> bool {
        self.phase == RequestPhase::Pending
    }

    /// Last successful result, kept while a newer request is pending.
    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Admit a new submission.
    ///
    /// Return
    /// ----------
    /// * A [`RequestTicket`] for the new generation, the state is now `Pending`.
    /// * [`ExoclassError::RequestInFlight`] if a request of this kind is already pending;
    ///   nothing changes in that case.
    pub fn begin(&mut self) -> Result<RequestTicket, ExoclassError> {
        if self.is_pending() {
            warn!(kind = %self.kind, "submission rejected, request already in flight");
            return Err(ExoclassError::RequestInFlight(self.kind));
        }
        self.settled_phase = self.phase;
        self.phase = RequestPhase::Pending;
        self.generation += 1;
        debug!(kind = %self.kind, generation = self.generation, "request pending");
        Ok(RequestTicket {
            kind: self.kind,
            generation: self.generation,
        })
    }

    /// Apply the outcome of an admitted submission.
    ///
    /// A success replaces the stored result and clears the error message; a failure keeps
    /// the previous result but records the error message. The error is borrowed: the caller
    /// usually hands it on to whoever awaited the request.
    ///
    /// Return
    /// ----------
    /// * `true` if the outcome was applied, `false` if the ticket is stale (the request was
    ///   cancelled or belongs to another kind) and the outcome was discarded.
    pub fn resolve(&mut self, ticket: RequestTicket, outcome: Result<T, &ExoclassError>) -> bool {
        if ticket.kind != self.kind || ticket.generation != self.generation || !self.is_pending()
        {
            debug!(
                kind = %self.kind,
                generation = ticket.generation,
                current = self.generation,
                "stale response discarded"
            );
            return false;
        }
        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.error_message = None;
                self.phase = RequestPhase::Success;
            }
            Err(err) => {
                warn!(kind = %self.kind, error = %err, "request failed");
                self.error_message = Some(err.to_string());
                self.phase = RequestPhase::Error;
            }
        }
        self.settled_phase = self.phase;
        true
    }

    /// Abandon the pending request, if any.
    ///
    /// The generation is bumped so that the abandoned response is ignored when it arrives,
    /// and the phase returns to what it was before the submission.
    ///
    /// Return
    /// ----------
    /// * `true` if a pending request was cancelled.
    pub fn cancel(&mut self) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.generation += 1;
        self.phase = self.settled_phase;
        debug!(kind = %self.kind, generation = self.generation, "pending request cancelled");
        true
    }

    /// Cancel the pending request only if `ticket` is the one in flight.
    ///
    /// Used when the task awaiting a response goes away before resolving it.
    pub fn abandon(&mut self, ticket: RequestTicket) -> bool {
        if ticket.kind != self.kind || ticket.generation != self.generation {
            return false;
        }
        self.cancel()
    }

    /// Forget the stored result and error, and return to `Idle`.
    ///
    /// The generation keeps increasing, so a response still in flight is discarded.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.phase = RequestPhase::Idle;
        self.settled_phase = RequestPhase::Idle;
        self.result = None;
        self.error_message = None;
    }
}
