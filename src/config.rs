//! # Client configuration
//!
//! [`ClientConfig`] locates the inference/training service and tunes the HTTP client
//! used to reach it. Endpoint locations are collaborator configuration: the core never
//! reads them from the environment.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use exoclass::config::ClientConfig;
//!
//! let config = ClientConfig::builder()
//!     .base_url("http://localhost:8000/")
//!     .timeout(Duration::from_secs(120))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.endpoint("/predict").unwrap().as_str(), "http://localhost:8000/predict");
//! ```
use std::time::Duration;

use url::Url;

use crate::{
    constants::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS},
    exoclass_errors::ExoclassError,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Root of the service; routes are joined onto it.
    pub base_url: Url,
    /// Global timeout of one HTTP exchange. `None` waits forever.
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl ClientConfig {
    /// Configuration pointing at the default local service.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Absolute URL of a service route.
    ///
    /// Arguments
    /// -----------------
    /// * `path`: a route such as `"/predict"`; a leading slash is optional.
    pub fn endpoint(&self, path: &str) -> Result<Url, ExoclassError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: Url::parse(DEFAULT_BASE_URL)
                .expect("DEFAULT_BASE_URL is a valid absolute URL"),
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            user_agent: format!("exoclass/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    base_url: String,
    timeout: Option<Duration>,
    user_agent: String,
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientConfigBuilder {
    /// Create a new builder initialized with default values.
    pub fn new() -> Self {
        let defaults = ClientConfig::default();
        Self {
            base_url: defaults.base_url.to_string(),
            timeout: defaults.timeout,
            user_agent: defaults.user_agent,
        }
    }

    pub fn base_url(mut self, v: impl Into<String>) -> Self {
        self.base_url = v.into();
        self
    }
    pub fn timeout(mut self, v: Duration) -> Self {
        self.timeout = Some(v);
        self
    }
    pub fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }
    pub fn user_agent(mut self, v: impl Into<String>) -> Self {
        self.user_agent = v.into();
        self
    }

    /// Finalize the builder and produce a [`ClientConfig`].
    ///
    /// Validation rules
    /// -----------------
    /// * `base_url` must parse as an absolute `http` or `https` URL without query or fragment.
    /// * `timeout`, when set, must be non-zero.
    /// * `user_agent` must not be blank.
    ///
    /// A trailing slash is appended to the base URL so that routes are joined below it
    /// (`http://host/api` + `predict` → `http://host/api/predict`).
    ///
    /// Returns
    /// -----------------
    /// * `Ok(ClientConfig)` if every rule holds, `Err(ExoclassError::InvalidConfig)` otherwise.
    pub fn build(self) -> Result<ClientConfig, ExoclassError> {
        let mut base_url = Url::parse(self.base_url.trim()).map_err(|e| {
            ExoclassError::InvalidConfig(format!("base_url '{}': {e}", self.base_url))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ExoclassError::InvalidConfig(format!(
                "base_url scheme must be http or https, got '{}'",
                base_url.scheme()
            )));
        }
        if base_url.query().is_some() || base_url.fragment().is_some() {
            return Err(ExoclassError::InvalidConfig(
                "base_url must not carry a query or fragment".into(),
            ));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(ExoclassError::InvalidConfig(
                "timeout must be greater than zero".into(),
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ExoclassError::InvalidConfig(
                "user_agent must not be empty".into(),
            ));
        }

        Ok(ClientConfig {
            base_url,
            timeout: self.timeout,
            user_agent: self.user_agent,
        })
    }
}
