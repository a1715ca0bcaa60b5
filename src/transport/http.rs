//! Blocking HTTP transport against an SDMX REST endpoint
//!
//! Requests `<base_url>/<resource>/<agency>/<id>` (agency `all` when the
//! reference names none) and decodes the JSON body with [`JsonReader`].

use super::{ResourceRequest, Response, Transport, TransportError};
use crate::models::StructureMessage;
use crate::reader::JsonReader;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Agency path segment used when a request names no agency
const ANY_AGENCY: &str = "all";

/// Configuration for [`HttpTransport`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpTransportConfig {
    /// Base URL of the REST service, e.g. `https://data-api.ecb.europa.eu/service`
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Optional `User-Agent` header value
    pub user_agent: Option<String>,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: 30,
            user_agent: None,
        }
    }
}

impl HttpTransportConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn builder() -> HttpTransportConfigBuilder {
        HttpTransportConfigBuilder::default()
    }
}

/// Builder for HttpTransportConfig
#[derive(Debug, Default)]
pub struct HttpTransportConfigBuilder {
    config: HttpTransportConfig,
}

impl HttpTransportConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the request timeout; zero is raised to one second
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs.max(1);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> HttpTransportConfig {
        self.config
    }
}

/// Transport fetching structure messages over HTTP
pub struct HttpTransport {
    config: HttpTransportConfig,
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(config: HttpTransportConfig) -> Result<Self, TransportError> {
        let mut builder =
            reqwest::blocking::Client::builder().timeout(Duration::from_secs(config.timeout_secs));
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Network(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &HttpTransportConfig {
        &self.config
    }

    /// URL a request is sent to
    pub fn url_for(&self, request: &ResourceRequest) -> String {
        let agency = request.agency_id.as_deref().unwrap_or(ANY_AGENCY);
        format!(
            "{}/{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            request.resource.as_str(),
            urlencoding::encode(agency),
            urlencoding::encode(&request.id)
        )
    }
}

impl Transport for HttpTransport {
    fn fetch(&self, request: &ResourceRequest) -> Result<Response, TransportError> {
        let url = self.url_for(request);
        debug!("Fetching {}", url);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .map_err(|e| TransportError::Network(format!("Failed to fetch {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(TransportError::Http {
                status: response.status().as_u16(),
                url,
            });
        }

        let body = response
            .text()
            .map_err(|e| TransportError::Network(format!("Failed to read response from {}: {}", url, e)))?;
        let reader = JsonReader::parse(&body).map_err(|e| TransportError::Decode(e.to_string()))?;
        let message = StructureMessage::build(&reader, &reader.root())
            .map_err(|e| TransportError::Decode(e.to_string()))?;

        Ok(Response {
            url: Some(url),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ResourceType;

    #[test]
    fn test_config_defaults() {
        let config = HttpTransportConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = HttpTransportConfig::builder()
            .base_url("https://example.org/rest/")
            .timeout_secs(0)
            .user_agent("sdmx-model")
            .build();
        assert_eq!(config.timeout_secs, 1);
        assert_eq!(config.user_agent.as_deref(), Some("sdmx-model"));
    }

    #[test]
    fn test_config_deserialize() {
        let config: HttpTransportConfig =
            serde_json::from_str(r#"{"baseUrl": "https://example.org/rest"}"#).unwrap();
        assert_eq!(config.base_url, "https://example.org/rest");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_url_for() {
        let transport =
            HttpTransport::new(HttpTransportConfig::new("https://example.org/rest/")).unwrap();
        let request = ResourceRequest {
            resource: ResourceType::Codelist,
            id: "CL_FREQ".to_string(),
            agency_id: Some("ECB".to_string()),
        };
        assert_eq!(
            transport.url_for(&request),
            "https://example.org/rest/codelist/ECB/CL_FREQ"
        );

        let request = ResourceRequest {
            resource: ResourceType::Dataflow,
            id: "EXR 1".to_string(),
            agency_id: None,
        };
        assert_eq!(
            transport.url_for(&request),
            "https://example.org/rest/dataflow/all/EXR%201"
        );
    }
}
