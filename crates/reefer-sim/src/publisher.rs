//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Telemetry publishing to the ThingsBoard device API."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reefer_common::config::ThingsboardConfig;
use reqwest::{Client, StatusCode};
use tracing::debug;
use url::Url;

use crate::errors::PublishError;
use crate::frames::TelemetryPayload;

/// Destination for one reading per tick.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn publish(&self, payload: &TelemetryPayload) -> Result<(), PublishError>;
}

/// Posts readings to `http://{host}/api/v1/{token}/telemetry`. One attempt
/// per call, bounded by the client timeout.
#[derive(Debug, Clone)]
pub struct HttpTelemetryPublisher {
    client: Client,
    endpoint: Url,
}

impl HttpTelemetryPublisher {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, PublishError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn from_config(config: &ThingsboardConfig) -> anyhow::Result<Self> {
        let endpoint = config.telemetry_url()?;
        Self::new(endpoint, config.request_timeout).context("failed to build telemetry client")
    }

    /// Full endpoint, access token included. Do not log.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl TelemetrySink for HttpTelemetryPublisher {
    async fn publish(&self, payload: &TelemetryPayload) -> Result<(), PublishError> {
        debug!(host = ?self.endpoint.host_str(), "posting telemetry");
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(payload)
            .send()
            .await?;
        let status = response.status();
        if status == StatusCode::OK {
            return Ok(());
        }
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                debug!(%status, error = %err, "unable to read rejection body");
                format!("<unreadable body: {err}>")
            }
        };
        Err(PublishError::Rejected { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_uses_device_endpoint() {
        let config = ThingsboardConfig {
            host: "localhost:8080".into(),
            access_token: "TOKEN".into(),
            request_timeout: Duration::from_secs(1),
        };
        let publisher = HttpTelemetryPublisher::from_config(&config).unwrap();
        assert_eq!(
            publisher.endpoint().as_str(),
            "http://localhost:8080/api/v1/TOKEN/telemetry"
        );
    }

    #[test]
    fn rejected_error_carries_response_text() {
        let err = PublishError::Rejected {
            status: StatusCode::UNAUTHORIZED,
            body: "Invalid access token".into(),
        };
        assert_eq!(
            err.to_string(),
            "endpoint answered 401 Unauthorized: Invalid access token"
        );
    }
}
