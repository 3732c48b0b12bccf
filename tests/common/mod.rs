#![allow(dead_code)]

use std::{
    collections::VecDeque,
    path::Path,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use exoclass::{
    config::ClientConfig,
    exoclass::Exoclass,
    exoclass_errors::ExoclassError,
    input::InputMode,
    transport::{OutgoingRequest, RawResponse, Transport},
};
use serde_json::Value;
use tokio::sync::Notify;
use url::Url;

pub const ARTIFACT_BYTES: &[u8] = b"pickled-model";

/// Transport double: records every request and answers with queued responses.
///
/// Without a queued response the answer is `200 {}`. A gated transport parks every `post`
/// until [`MockTransport::release`] is called, so tests can observe the pending state.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<RawResponse, ExoclassError>>>,
    calls: Mutex<Vec<OutgoingRequest>>,
    downloads: Mutex<Vec<Url>>,
    gated: bool,
    entered: Notify,
    gate: Notify,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated() -> Self {
        MockTransport {
            gated: true,
            ..Default::default()
        }
    }

    pub fn respond_json(self, body: Value) -> Self {
        self.push(Ok(RawResponse::new(200, body.to_string())))
    }

    pub fn respond_raw(self, status: u16, body: &str) -> Self {
        self.push(Ok(RawResponse::new(status, body)))
    }

    pub fn fail(self, err: ExoclassError) -> Self {
        self.push(Err(err))
    }

    fn push(self, response: Result<RawResponse, ExoclassError>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<OutgoingRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn downloads(&self) -> Vec<Url> {
        self.downloads.lock().unwrap().clone()
    }

    /// Wait until a gated `post` has been entered.
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    /// Let one parked `post` complete.
    pub fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post(&self, request: OutgoingRequest) -> Result<RawResponse, ExoclassError> {
        self.calls.lock().unwrap().push(request);
        if self.gated {
            self.entered.notify_one();
            self.gate.notified().await;
        }
        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(RawResponse::new(200, "{}")))
    }

    async fn download(&self, url: &Url, destination: &Path) -> Result<u64, ExoclassError> {
        self.downloads.lock().unwrap().push(url.clone());
        tokio::fs::write(destination, ARTIFACT_BYTES).await?;
        Ok(ARTIFACT_BYTES.len() as u64)
    }
}

pub fn controller(mock: &Arc<MockTransport>) -> Exoclass {
    Exoclass::with_transport(ClientConfig::default(), mock.clone())
}

/// Select kepler in manual mode with every feature filled.
pub fn kepler_manual(controller: &Exoclass) {
    let kepler = controller.select_mission("kepler").unwrap();
    controller.set_input_mode(InputMode::Manual).unwrap();
    for (i, id) in kepler.feature_ids().enumerate() {
        controller.set_feature_value(id, 0.1 * i as f64).unwrap();
    }
    assert!(controller.is_ready());
}
