//! Error types for building and navigating the SDMX model

use crate::reader::Field;
use crate::transport::TransportError;
use thiserror::Error;

/// Errors raised while building artefacts or navigating the model.
///
/// Absence (a missing optional field, an unresolvable reference) is never
/// reported through this type; it surfaces as `None`, an empty collection
/// or [`crate::resolver::Resolved::Absent`].
#[derive(Error, Debug)]
pub enum SdmxError {
    /// A reference names a target class the resolver has no collection for
    #[error("Unsupported reference class: {class}")]
    UnsupportedReference { class: String },

    /// A series or group was attached to an owner of the wrong kind
    #[error("Invalid association: {0}")]
    InvalidAssociation(String),

    /// A scalar could not be parsed as the expected type
    #[error("Malformed value for {field}: '{value}' is not a valid {expected}")]
    MalformedScalar {
        field: Field,
        value: String,
        expected: &'static str,
    },

    /// A required scalar is missing from the source node
    #[error("Missing required field {field} on {context}")]
    MissingField { field: Field, context: &'static str },

    /// Two children of one container share an id
    #[error("Duplicate id '{id}' in {container}")]
    DuplicateId { container: String, id: String },

    /// A structural invariant does not hold (e.g. dimension positions)
    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    /// Remote resolution was requested but no transport is configured
    #[error("Remote resolution requested but no transport is configured")]
    TransportUnavailable,

    /// The transport failed while fetching a remote artefact
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// A node document could not be loaded
    #[error("Document error: {0}")]
    Document(String),
}

impl From<serde_json::Error> for SdmxError {
    fn from(e: serde_json::Error) -> Self {
        SdmxError::Document(e.to_string())
    }
}

/// Result type for model operations
pub type Result<T> = std::result::Result<T, SdmxError>;
