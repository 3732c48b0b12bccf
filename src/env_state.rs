//! # Exoclass environment state
//!
//! This module defines [`crate::env_state::ExoclassEnv`], the **HTTP environment** through which
//! the controller reaches the inference/training service. It provides:
//!
//! - A persistent [`reqwest::Client`] configured from a [`ClientConfig`]
//!   (timeout, user agent).
//! - The [`Transport`] implementation used in production: JSON and multipart `POST`s, and
//!   streamed artifact downloads.
//!
//! ## Structure
//!
//! ```text
//! ExoclassEnv
//! ├── http_client (reqwest::Client)
//! └── config      (ClientConfig: base URL, timeout, user agent)
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use exoclass::config::ClientConfig;
//! use exoclass::env_state::ExoclassEnv;
//!
//! let env = ExoclassEnv::new(ClientConfig::default()).unwrap();
//! assert_eq!(env.config().base_url.as_str(), "http://127.0.0.1:8000/");
//! ```
//!
//! ## Notes
//!
//! - [`ExoclassEnv`] is cheaply cloneable: `reqwest::Client` shares its connection pool.
//! - No retry is attempted. A failed exchange surfaces as [`ExoclassError::Transport`].
use std::path::Path;

use async_trait::async_trait;
use reqwest::{
    header::CONTENT_TYPE,
    multipart::{Form, Part},
    Client, Response,
};
use tokio::{fs::File, io::AsyncWriteExt};
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    config::ClientConfig,
    exoclass_errors::ExoclassError,
    services::decode_json,
    transport::{FormPart, OutgoingRequest, RawResponse, RequestBody, Transport},
};

#[derive(Debug, Clone)]
pub struct ExoclassEnv {
    http_client: Client,
    config: ClientConfig,
}

impl ExoclassEnv {
    /// Build the HTTP client for a configuration.
    ///
    /// Return
    /// ------
    /// * A new environment, or [`ExoclassError::ReqwestError`] if the TLS backend
    ///   cannot be initialised.
    pub fn new(config: ClientConfig) -> Result<Self, ExoclassError> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(ExoclassEnv {
            http_client: builder.build()?,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

fn multipart_form(parts: Vec<FormPart>) -> Form {
    parts.into_iter().fold(Form::new(), |form, part| match part {
        FormPart::Text { name, value } => form.text(name, value),
        FormPart::File {
            name,
            file_name,
            content,
        } => form.part(name, Part::bytes(content).file_name(file_name)),
    })
}

fn transport_error(url: &Url, err: reqwest::Error) -> ExoclassError {
    ExoclassError::Transport(format!("{url}: {err}"))
}

#[async_trait]
impl Transport for ExoclassEnv {
    async fn post(&self, request: OutgoingRequest) -> Result<RawResponse, ExoclassError> {
        let url = self.config.endpoint(request.path)?;
        debug!(%url, "sending request");

        let builder = self.http_client.post(url.clone());
        let builder = match request.body {
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(parts) => builder.multipart(multipart_form(parts)),
        };

        let response = builder.send().await.map_err(|e| transport_error(&url, e))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(&url, e))?;

        debug!(%url, status, bytes = body.len(), "response received");
        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }

    /// Download a possibly large artifact in chunks.
    ///
    /// The body is streamed into `destination` with tokio's async file I/O, so the model
    /// never needs to fit in memory. A non-success status is reported as
    /// [`ExoclassError::Server`] and a JSON answer carrying `error` as
    /// [`ExoclassError::BackendRejected`]; nothing is written in either case. A file left
    /// incomplete by a failed transfer is removed.
    async fn download(&self, url: &Url, destination: &Path) -> Result<u64, ExoclassError> {
        info!(%url, "downloading model artifact");
        let response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExoclassError::Server {
                status: status.as_u16(),
                body,
            });
        }

        // the service reports a missing model as a JSON body with a success status
        if is_json(&response) {
            let body = response
                .bytes()
                .await
                .map_err(|e| transport_error(url, e))?;
            decode_json(RawResponse::new(status.as_u16(), body.to_vec()))?;
            return Err(ExoclassError::MalformedResponse(
                "expected a model artifact, got a JSON document".into(),
            ));
        }

        let written = match stream_to_file(response, url, destination).await {
            Ok(written) => written,
            Err(err) => {
                warn!(path = %destination.display(), error = %err, "download interrupted");
                let _ = tokio::fs::remove_file(destination).await;
                return Err(err);
            }
        };

        info!(%url, path = %destination.display(), bytes = written, "artifact saved");
        Ok(written)
    }
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim_start().starts_with("application/json"))
}

async fn stream_to_file(
    response: Response,
    url: &Url,
    destination: &Path,
) -> Result<u64, ExoclassError> {
    let mut file = File::create(destination).await?;
    let mut stream = response.bytes_stream();
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| transport_error(url, e))?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}
