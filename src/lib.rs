//! SDMX Model - cross-referenced, in-memory SDMX information model
//!
//! Provides:
//! - Typed structural artefacts (code lists, concept schemes, data structures,
//!   dataflows, constraints, categorisations) with urn-based identity
//! - Reference resolution against a message, with optional remote fallback
//! - Cube-region constraint evaluation over partial keys
//! - Lazy traversal of generic data sets, series, groups and observations
//!
//! Artefacts are built from any [`reader::Reader`]; a JSON/YAML reader is
//! bundled as [`reader::JsonReader`].

pub mod data;
pub mod error;
pub mod models;
pub mod reader;
pub mod resolver;
pub mod transport;

pub use error::{Result, SdmxError};

// Re-export reader types
pub use reader::{Field, FromReader, JsonReader, Reader};

// Re-export models
pub use models::{
    Categorisation, CategorisationIndex, Category, CategoryScheme, Code, Codelist, Concept,
    ConceptScheme, ContentConstraint, CubeRegion, DataMessage, DataStructureDefinition, Dataflow,
    Dimension, DimensionKey, Identifiable, Item, LocalizedText, Maintainable, Nameable,
    ProvisionAgreement, Ref, StructureMessage, Urn, Versionable,
};

// Re-export data traversal
pub use data::{Attributes, DataSet, Group, Key, Observation, ObservationOptions, Series, ValueMap};

// Re-export resolution and transport
pub use resolver::{Artefact, ResolveOptions, Resolved, Resolver};
#[cfg(feature = "api-backend")]
pub use transport::HttpTransport;
pub use transport::{ResourceRequest, ResourceType, Response, Transport, TransportError};
