//! # avsync-adapter-yamaha: receiver control over HTTP/XML
//!
//! Implements [`DeviceProxy`] for receivers that expose the
//! `YamahaRemoteControl` endpoint. Every call is one POST of a `YAMAHA_AV`
//! document; the proxy keeps no state between calls.
//!
//! ## Example
//!
//! ```toml
//! [devices.zone2]
//! host = "192.168.1.20"
//! ```

pub mod config;
pub mod error;
pub mod protocol;

use std::time::Duration;

use xmltree::Element;

use avsync_app::ports::DeviceProxy;
use avsync_domain::error::CommunicationError;
use avsync_domain::state::DeviceState;

pub use config::ReceiverConfig;
pub use error::YamahaError;

/// [`DeviceProxy`] speaking the receiver's HTTP/XML control protocol.
#[derive(Debug, Clone)]
pub struct YamahaProxy {
    host: String,
    url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl YamahaProxy {
    /// Create a proxy for the receiver at `host`, bounding every exchange by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`YamahaError::Http`] if the HTTP client cannot be built.
    pub fn new(host: impl Into<String>, timeout: Duration) -> Result<Self, YamahaError> {
        let host = host.into();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(YamahaError::Http)?;
        Ok(Self {
            url: format!("http://{host}{}", protocol::CONTROL_PATH),
            host,
            timeout,
            client,
        })
    }

    /// Build a proxy from its configuration section.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn from_config(config: &ReceiverConfig, timeout: Duration) -> Result<Self, YamahaError> {
        Self::new(config.host.clone(), timeout)
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Names of the inputs that can be selected on the main zone.
    ///
    /// # Errors
    ///
    /// Returns a [`YamahaError`] if the exchange fails or the response lacks
    /// the input list.
    pub async fn list_inputs(&self) -> Result<Vec<String>, YamahaError> {
        let response = self.exchange(&protocol::input_list_request()).await?;
        protocol::parse_input_list(&response)
    }

    async fn exchange(&self, request: &Element) -> Result<Element, YamahaError> {
        let body = protocol::encode(request)?;
        tracing::trace!(host = %self.host, "posting control request");

        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "text/xml; charset=utf-8")
            .body(body)
            .send()
            .await
            .map_err(|err| self.classify(err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(YamahaError::Status(status));
        }

        let bytes = response.bytes().await.map_err(|err| self.classify(err))?;
        protocol::decode(&bytes)
    }

    fn classify(&self, err: reqwest::Error) -> YamahaError {
        if err.is_timeout() {
            YamahaError::Timeout(self.timeout)
        } else {
            YamahaError::Http(err)
        }
    }
}

impl DeviceProxy for YamahaProxy {
    fn address(&self) -> &str {
        &self.host
    }

    async fn get_state(&self) -> Result<DeviceState, CommunicationError> {
        let response = self.exchange(&protocol::basic_status_request()).await?;
        Ok(protocol::parse_basic_status(&response)?)
    }

    async fn set_power(&self, on: bool) -> Result<(), CommunicationError> {
        self.exchange(&protocol::power_request(on)).await?;
        Ok(())
    }

    async fn set_mute(&self, mute: bool) -> Result<(), CommunicationError> {
        self.exchange(&protocol::mute_request(mute)).await?;
        Ok(())
    }

    async fn set_volume_db(&self, db: f64) -> Result<(), CommunicationError> {
        self.exchange(&protocol::volume_request(db)).await?;
        Ok(())
    }

    async fn set_input(&self, name: &str) -> Result<(), CommunicationError> {
        self.exchange(&protocol::input_request(name)).await?;
        Ok(())
    }

    async fn set_surround_program(&self, name: &str) -> Result<(), CommunicationError> {
        self.exchange(&protocol::surround_program_request(name))
            .await?;
        Ok(())
    }
}
