//! Structural artefacts of the SDMX information model
//!
//! Every artefact is built once from a [`crate::reader::Reader`] and is
//! read-only afterwards. Identity, equality, ordering and hashing follow the
//! artefact's urn.

pub mod categorisation;
pub mod constraint;
pub mod container;
pub mod identity;
pub mod item_scheme;
pub mod message;
pub mod reference;
pub mod structure;
pub mod urn;

pub use categorisation::{Categorisation, CategorisationIndex};
pub use constraint::{ContentConstraint, CubeRegion, DimensionKey, KeyValue};
pub use container::{Container, Ordered};
pub use identity::{
    Annotation, Identifiable, Identity, LocalizedText, Maintainable, Maintenance, Nameable,
    Naming, Versionable, Versioning,
};
pub use item_scheme::{
    Category, CategoryScheme, CategorySchemeKind, Code, Codelist, CodelistKind, Concept,
    ConceptScheme, ConceptSchemeKind, Item, ItemScheme, SchemeKind,
};
pub use message::{DataMessage, Footer, Header, StructureMessage};
pub use reference::Ref;
pub use structure::{
    AttributeDescriptor, Component, ComponentList, DataAttribute, DataStructureDefinition,
    Dataflow, Dimension, DimensionDescriptor, DimensionKind, ListedComponent, MeasureDescriptor,
    PrimaryMeasure, ProvisionAgreement, Representation,
};
pub use urn::Urn;
