//! Transport capability used by the resolver's remote fallback
//!
//! A transport fetches a whole structure message for one resource. The
//! resolver applies the same lookup to the fetched message as it does to the
//! local one, so a transport only has to deliver a [`StructureMessage`].

#[cfg(feature = "api-backend")]
pub mod http;

use crate::models::StructureMessage;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[cfg(feature = "api-backend")]
pub use http::{HttpTransport, HttpTransportConfig, HttpTransportConfigBuilder};

/// Transport-specific errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error {status} when fetching {url}")]
    Http { status: u16, url: String },

    #[error("Decode error: {0}")]
    Decode(String),
}

/// Kinds of resource a transport can be asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Dataflow,
    Codelist,
    ConceptScheme,
    CategoryScheme,
    DataStructure,
    ProvisionAgreement,
    ContentConstraint,
    Categorisation,
}

impl ResourceType {
    /// Resource name as used in SDMX REST paths
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::Dataflow => "dataflow",
            ResourceType::Codelist => "codelist",
            ResourceType::ConceptScheme => "conceptscheme",
            ResourceType::CategoryScheme => "categoryscheme",
            ResourceType::DataStructure => "datastructure",
            ResourceType::ProvisionAgreement => "provisionagreement",
            ResourceType::ContentConstraint => "contentconstraint",
            ResourceType::Categorisation => "categorisation",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the resolver asks a transport for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceRequest {
    pub resource: ResourceType,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agency_id: Option<String>,
}

/// A fetched message plus where it came from
#[derive(Debug)]
pub struct Response {
    pub url: Option<String>,
    pub message: StructureMessage,
}

/// Fetches remote structure messages.
///
/// Calls are blocking; timeouts are the implementation's concern.
pub trait Transport {
    fn fetch(&self, request: &ResourceRequest) -> Result<Response, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_names() {
        assert_eq!(ResourceType::DataStructure.as_str(), "datastructure");
        assert_eq!(ResourceType::ContentConstraint.to_string(), "contentconstraint");
    }

    #[test]
    fn test_error_display() {
        let err = TransportError::Http {
            status: 404,
            url: "https://example.org/codelist/ECB/CL_FREQ".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "HTTP error 404 when fetching https://example.org/codelist/ECB/CL_FREQ"
        );
    }
}
