//! Reader capability
//!
//! The model never decodes a wire format itself. A [`Reader`] hands out typed
//! scalars, localized text, pair lists and child nodes for a fixed vocabulary
//! of [`Field`]s, and every artefact is assembled from those calls exactly once
//! through [`FromReader`]. Once built, structural artefacts keep no reader
//! handle; only data sets pull from the reader lazily while being iterated.
//!
//! Every accessor treats a missing field as absence (`None`, empty list),
//! never as an error.

pub mod json;
pub mod scalar;

use crate::error::{Result, SdmxError};
use crate::models::LocalizedText;
use chrono::{DateTime, Utc};
use std::fmt;

pub use json::{JsonNode, JsonReader};

/// The closed set of fields an artefact builder may ask a [`Reader`] for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    // Identity, naming, versioning, maintenance
    Id,
    Urn,
    Uri,
    Name,
    Description,
    Version,
    ValidFrom,
    ValidTo,
    IsFinal,
    IsExternalReference,
    AgencyId,
    StructureUrl,
    ServiceUrl,
    IsPartial,

    // Annotations
    Annotations,
    AnnotationTitle,
    AnnotationType,
    AnnotationUrl,
    AnnotationText,

    // References
    Ref,
    RefClass,
    RefPackage,
    MaintainableParentId,
    Parent,

    // Message content
    Header,
    Footer,
    Prepared,
    Sender,
    Receiver,
    HeaderError,
    FooterText,
    Severity,
    Code,
    Codelists,
    ConceptSchemes,
    CategorySchemes,
    Dataflows,
    DataStructures,
    ProvisionAgreements,
    Constraints,
    Categorisations,

    // Item schemes
    Codes,
    Concepts,
    Categories,

    // Structures
    Structure,
    StructureUsage,
    DimensionAtObservation,
    DimensionList,
    MeasureList,
    AttributeList,
    Dimensions,
    TimeDimension,
    MeasureDimension,
    PrimaryMeasure,
    Attributes,
    ConceptIdentity,
    LocalRepresentation,
    Enumeration,
    TextType,
    MaxLength,
    Position,
    AttributeRelationship,
    UsageStatus,

    // Constraints and categorisations
    ConstraintAttachment,
    CubeRegions,
    Include,
    KeyValues,
    Values,
    Source,
    Target,

    // Data
    DataSet,
    Series,
    Groups,
    Observations,
    SeriesKey,
    GroupKey,
    ObsKey,
    ObsValue,
    AttributeValues,
}

impl Field {
    /// The node key this field is stored under
    pub fn key(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Urn => "urn",
            Field::Uri => "uri",
            Field::Name => "name",
            Field::Description => "description",
            Field::Version => "version",
            Field::ValidFrom => "validFrom",
            Field::ValidTo => "validTo",
            Field::IsFinal => "isFinal",
            Field::IsExternalReference => "isExternalReference",
            Field::AgencyId => "agencyID",
            Field::StructureUrl => "structureURL",
            Field::ServiceUrl => "serviceURL",
            Field::IsPartial => "isPartial",
            Field::Annotations => "annotations",
            Field::AnnotationTitle => "title",
            Field::AnnotationType => "type",
            Field::AnnotationUrl => "url",
            Field::AnnotationText => "text",
            Field::Ref => "ref",
            Field::RefClass => "class",
            Field::RefPackage => "package",
            Field::MaintainableParentId => "maintainableParentID",
            Field::Parent => "parent",
            Field::Header => "header",
            Field::Footer => "footer",
            Field::Prepared => "prepared",
            Field::Sender => "sender",
            Field::Receiver => "receiver",
            Field::HeaderError => "error",
            Field::FooterText => "text",
            Field::Severity => "severity",
            Field::Code => "code",
            Field::Codelists => "codelists",
            Field::ConceptSchemes => "conceptSchemes",
            Field::CategorySchemes => "categorySchemes",
            Field::Dataflows => "dataflows",
            Field::DataStructures => "dataStructures",
            Field::ProvisionAgreements => "provisionAgreements",
            Field::Constraints => "constraints",
            Field::Categorisations => "categorisations",
            Field::Codes => "codes",
            Field::Concepts => "concepts",
            Field::Categories => "categories",
            Field::Structure => "structure",
            Field::StructureUsage => "structureUsage",
            Field::DimensionAtObservation => "dimensionAtObservation",
            Field::DimensionList => "dimensionList",
            Field::MeasureList => "measureList",
            Field::AttributeList => "attributeList",
            Field::Dimensions => "dimensions",
            Field::TimeDimension => "timeDimension",
            Field::MeasureDimension => "measureDimension",
            Field::PrimaryMeasure => "primaryMeasure",
            Field::Attributes => "attributes",
            Field::ConceptIdentity => "conceptIdentity",
            Field::LocalRepresentation => "localRepresentation",
            Field::Enumeration => "enumeration",
            Field::TextType => "textType",
            Field::MaxLength => "maxLength",
            Field::Position => "position",
            Field::AttributeRelationship => "attributeRelationship",
            Field::UsageStatus => "assignmentStatus",
            Field::ConstraintAttachment => "constraintAttachment",
            Field::CubeRegions => "cubeRegions",
            Field::Include => "include",
            Field::KeyValues => "keyValues",
            Field::Values => "values",
            Field::Source => "source",
            Field::Target => "target",
            Field::DataSet => "dataSet",
            Field::Series => "series",
            Field::Groups => "groups",
            Field::Observations => "observations",
            Field::SeriesKey => "seriesKey",
            Field::GroupKey => "groupKey",
            Field::ObsKey => "obsKey",
            Field::ObsValue => "obsValue",
            Field::AttributeValues => "attributes",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Typed access to a decoded message tree.
///
/// `Node` is a cheap handle to a position in the source tree; builders clone it
/// freely. Implementations decide how a field maps onto their wire format.
pub trait Reader {
    /// Handle to a node in the source tree
    type Node: Clone;

    /// Read a single scalar, `None` if absent
    fn read_str(&self, field: Field, node: &Self::Node) -> Result<Option<String>>;

    /// Read every scalar stored under `field`, in document order
    fn read_strs(&self, field: Field, node: &Self::Node) -> Result<Vec<String>>;

    /// Read an ordered list of id/value pairs (keys and attribute values)
    fn read_pairs(&self, field: Field, node: &Self::Node) -> Result<Vec<(String, String)>>;

    /// Read a language-tagged text field
    fn localized(&self, field: Field, node: &Self::Node) -> Result<LocalizedText>;

    /// The first child node stored under `field`
    fn child(&self, field: Field, node: &Self::Node) -> Option<Self::Node>;

    /// All child nodes stored under `field`, pulled lazily
    fn children<'a>(
        &'a self,
        field: Field,
        node: &Self::Node,
    ) -> Box<dyn Iterator<Item = Self::Node> + 'a>;

    /// Read a scalar that must be present
    fn required_str(&self, field: Field, node: &Self::Node, context: &'static str) -> Result<String>
    where
        Self: Sized,
    {
        self.read_str(field, node)?
            .ok_or(SdmxError::MissingField { field, context })
    }

    /// Read a boolean flag; an absent flag reads as `false`
    fn read_bool(&self, field: Field, node: &Self::Node) -> Result<bool>
    where
        Self: Sized,
    {
        match self.read_str(field, node)? {
            Some(raw) => scalar::parse_bool(field, &raw),
            None => Ok(false),
        }
    }

    /// Read an optional integer
    fn read_int(&self, field: Field, node: &Self::Node) -> Result<Option<i64>>
    where
        Self: Sized,
    {
        self.read_str(field, node)?
            .map(|raw| scalar::parse_int(field, &raw))
            .transpose()
    }

    /// Read an optional timestamp
    fn read_timestamp(&self, field: Field, node: &Self::Node) -> Result<Option<DateTime<Utc>>>
    where
        Self: Sized,
    {
        self.read_str(field, node)?
            .map(|raw| scalar::parse_timestamp(field, &raw))
            .transpose()
    }

    /// Build the artefact stored under `field`, if any
    fn read_instance<T: FromReader>(&self, field: Field, node: &Self::Node) -> Result<Option<T>>
    where
        Self: Sized,
    {
        self.child(field, node)
            .map(|child| T::from_reader(self, &child))
            .transpose()
    }

    /// Build every artefact stored under `field`, in document order
    fn read_instances<T: FromReader>(&self, field: Field, node: &Self::Node) -> Result<Vec<T>>
    where
        Self: Sized,
    {
        self.children(field, node)
            .map(|child| T::from_reader(self, &child))
            .collect()
    }
}

/// Build phase of an artefact: called once per source node.
pub trait FromReader: Sized {
    fn from_reader<R: Reader>(reader: &R, node: &R::Node) -> Result<Self>;
}
