//! Data structure definitions, their components, and structure usages

use super::container::{Container, Ordered};
use super::identity::{Identity, Maintenance, Naming, Versioning, identifiable, maintainable};
use super::item_scheme::Concept;
use super::message::StructureMessage;
use super::reference::Ref;
use super::Identifiable;
use crate::error::{Result, SdmxError};
use crate::reader::{Field, FromReader, Reader};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Local value representation of a component
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Representation {
    /// Values are taken from a code list
    Enumerated(Ref),
    /// Values are free text of a primitive type
    Text {
        #[serde(skip_serializing_if = "Option::is_none")]
        text_type: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_length: Option<u32>,
    },
}

impl FromReader for Representation {
    fn from_reader<R: Reader>(reader: &R, node: &R::Node) -> Result<Self> {
        if let Some(enumeration) = reader.read_instance::<Ref>(Field::Enumeration, node)? {
            return Ok(Representation::Enumerated(enumeration));
        }
        let max_length = reader
            .read_int(Field::MaxLength, node)?
            .map(|len| {
                u32::try_from(len).map_err(|_| SdmxError::MalformedScalar {
                    field: Field::MaxLength,
                    value: len.to_string(),
                    expected: "non-negative length",
                })
            })
            .transpose()?;
        Ok(Representation::Text {
            text_type: reader.read_str(Field::TextType, node)?,
            max_length,
        })
    }
}

/// Identity, concept and representation shared by all components
#[derive(Debug, Clone, Serialize)]
pub struct Component {
    pub identity: Identity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept_identity: Option<Ref>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_representation: Option<Representation>,
}

identifiable!(Component, identity);

impl Ordered for Component {}

impl FromReader for Component {
    fn from_reader<R: Reader>(reader: &R, node: &R::Node) -> Result<Self> {
        Ok(Self {
            identity: Identity::read(reader, node, "component")?,
            concept_identity: reader.read_instance(Field::ConceptIdentity, node)?,
            local_representation: reader.read_instance(Field::LocalRepresentation, node)?,
        })
    }
}

impl Component {
    /// The concept this component takes its semantics from, if it is in `message`
    pub fn concept<'m>(&self, message: &'m StructureMessage) -> Option<&'m Concept> {
        let identity = self.concept_identity.as_ref()?;
        let scheme_id = identity.maintainable_parent_id.as_deref()?;
        message.concept_schemes.get(scheme_id)?.get(&identity.id)
    }

    /// The code list enumerating this component's values, if any
    pub fn enumeration(&self) -> Option<&Ref> {
        match &self.local_representation {
            Some(Representation::Enumerated(reference)) => Some(reference),
            _ => None,
        }
    }
}

pub type PrimaryMeasure = Component;

/// Regular dimensions and the two reserved kinds share one position space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionKind {
    Dimension,
    Time,
    Measure,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dimension {
    pub component: Component,
    pub position: i64,
    pub kind: DimensionKind,
}

identifiable!(Dimension, component.identity);

impl Ordered for Dimension {
    fn sort_cmp(&self, other: &Self) -> Ordering {
        self.position.cmp(&other.position)
    }
}

impl Dimension {
    fn read<R: Reader>(reader: &R, node: &R::Node, kind: DimensionKind) -> Result<Self> {
        let component = Component::from_reader(reader, node)?;
        let position = reader
            .read_int(Field::Position, node)?
            .ok_or(SdmxError::MissingField {
                field: Field::Position,
                context: "dimension",
            })?;
        Ok(Self {
            component,
            position,
            kind,
        })
    }
}

impl FromReader for Dimension {
    fn from_reader<R: Reader>(reader: &R, node: &R::Node) -> Result<Self> {
        Self::read(reader, node, DimensionKind::Dimension)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DataAttribute {
    pub component: Component,
    /// Id of the component the attribute is attached to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_to: Option<String>,
    /// Assignment status, e.g. `Mandatory` or `Conditional`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_status: Option<String>,
}

identifiable!(DataAttribute, component.identity);

impl Ordered for DataAttribute {}

impl FromReader for DataAttribute {
    fn from_reader<R: Reader>(reader: &R, node: &R::Node) -> Result<Self> {
        let related_to = match reader.child(Field::AttributeRelationship, node) {
            Some(relationship) => match reader.child(Field::Ref, &relationship) {
                Some(target) => reader.read_str(Field::Id, &target)?,
                None => reader.read_str(Field::Id, &relationship)?,
            },
            None => None,
        };
        Ok(Self {
            component: Component::from_reader(reader, node)?,
            related_to,
            usage_status: reader.read_str(Field::UsageStatus, node)?,
        })
    }
}

/// How a component type populates and checks its list
pub trait ListedComponent: Ordered + Sized {
    /// Default id of the list when the reader does not describe one
    const LIST_ID: &'static str;

    fn read_components<R: Reader>(
        reader: &R,
        node: &R::Node,
        into: &mut Container<Self>,
    ) -> Result<()>;

    fn validate(_components: &Container<Self>) -> Result<()> {
        Ok(())
    }
}

impl ListedComponent for Dimension {
    const LIST_ID: &'static str = "DimensionDescriptor";

    /// Time and measure dimensions join the regular ones in one container
    fn read_components<R: Reader>(
        reader: &R,
        node: &R::Node,
        into: &mut Container<Self>,
    ) -> Result<()> {
        for (field, kind) in [
            (Field::Dimensions, DimensionKind::Dimension),
            (Field::TimeDimension, DimensionKind::Time),
            (Field::MeasureDimension, DimensionKind::Measure),
        ] {
            into.read_with(reader, node, field, |reader, node| {
                Dimension::read(reader, node, kind)
            })?;
        }
        Ok(())
    }

    /// Positions must be unique and contiguous.
    ///
    /// Both 0-based and 1-based runs are accepted; SDMX-ML documents number
    /// dimensions from 1.
    fn validate(components: &Container<Self>) -> Result<()> {
        let positions: BTreeSet<i64> = components.iter().map(|d| d.position).collect();
        if positions.len() != components.len() {
            return Err(SdmxError::InvalidStructure(
                "dimension positions are not unique".to_string(),
            ));
        }
        if let (Some(&first), Some(&last)) = (positions.first(), positions.last()) {
            let dense = (first == 0 || first == 1)
                && last
                    .checked_sub(first)
                    .and_then(|span| span.checked_add(1))
                    .is_some_and(|count| count == positions.len() as i64);
            if !dense {
                return Err(SdmxError::InvalidStructure(format!(
                    "dimension positions {:?} are not contiguous from 0 or 1",
                    positions
                )));
            }
        }
        Ok(())
    }
}

impl ListedComponent for Component {
    const LIST_ID: &'static str = "MeasureDescriptor";

    fn read_components<R: Reader>(
        reader: &R,
        node: &R::Node,
        into: &mut Container<Self>,
    ) -> Result<()> {
        into.read_with(reader, node, Field::PrimaryMeasure, Component::from_reader::<R>)
    }
}

impl ListedComponent for DataAttribute {
    const LIST_ID: &'static str = "AttributeDescriptor";

    fn read_components<R: Reader>(
        reader: &R,
        node: &R::Node,
        into: &mut Container<Self>,
    ) -> Result<()> {
        into.read_with(reader, node, Field::Attributes, DataAttribute::from_reader::<R>)
    }
}

/// An identifiable, ordered list of components.
///
/// Unlike an item scheme it carries no name.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentList<T> {
    pub identity: Identity,
    pub components: Container<T>,
}

identifiable!(ComponentList<T>, identity);

impl<T: ListedComponent> FromReader for ComponentList<T> {
    fn from_reader<R: Reader>(reader: &R, node: &R::Node) -> Result<Self> {
        let identity = Identity::read(reader, node, "component list")?;
        let mut components = Container::new(format!("component list {}", identity.id));
        T::read_components(reader, node, &mut components)?;
        T::validate(&components)?;
        Ok(Self {
            identity,
            components,
        })
    }
}

impl<T: ListedComponent> ComponentList<T> {
    /// Empty list standing in for one the reader did not describe
    fn empty(owner_urn: &str) -> Self {
        Self {
            identity: Identity::derived(owner_urn, T::LIST_ID),
            components: Container::new(T::LIST_ID),
        }
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.components.get(id)
    }

    pub fn as_ordered(&self) -> Vec<&T> {
        self.components.as_ordered()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

pub type DimensionDescriptor = ComponentList<Dimension>;
pub type MeasureDescriptor = ComponentList<PrimaryMeasure>;
pub type AttributeDescriptor = ComponentList<DataAttribute>;

impl ComponentList<Dimension> {
    pub fn time_dimension(&self) -> Option<&Dimension> {
        self.components.iter().find(|d| d.kind == DimensionKind::Time)
    }

    pub fn measure_dimension(&self) -> Option<&Dimension> {
        self.components.iter().find(|d| d.kind == DimensionKind::Measure)
    }
}

/// A data structure definition: dimensions, measures and attributes
#[derive(Debug, Clone, Serialize)]
pub struct DataStructureDefinition {
    pub identity: Identity,
    pub naming: Naming,
    pub versioning: Versioning,
    pub maintenance: Maintenance,
    pub dimensions: DimensionDescriptor,
    pub measures: MeasureDescriptor,
    pub attributes: AttributeDescriptor,
}

maintainable!(DataStructureDefinition);

impl Ordered for DataStructureDefinition {}

impl FromReader for DataStructureDefinition {
    fn from_reader<R: Reader>(reader: &R, node: &R::Node) -> Result<Self> {
        let identity = Identity::read(reader, node, "data structure")?;
        let dimensions: DimensionDescriptor = reader
            .read_instance(Field::DimensionList, node)?
            .ok_or(SdmxError::MissingField {
                field: Field::DimensionList,
                context: "data structure",
            })?;
        let measures: MeasureDescriptor = reader
            .read_instance(Field::MeasureList, node)?
            .unwrap_or_else(|| ComponentList::empty(&identity.urn));
        let attributes: AttributeDescriptor = reader
            .read_instance(Field::AttributeList, node)?
            .unwrap_or_else(|| ComponentList::empty(&identity.urn));
        Ok(Self {
            naming: Naming::from_reader(reader, node)?,
            versioning: Versioning::from_reader(reader, node)?,
            maintenance: Maintenance::from_reader(reader, node)?,
            identity,
            dimensions,
            measures,
            attributes,
        })
    }
}

impl DataStructureDefinition {
    /// Dimension ids in position order
    pub fn dimension_ids(&self) -> Vec<&str> {
        self.dimensions
            .as_ordered()
            .into_iter()
            .map(|d| d.id())
            .collect()
    }
}

/// A dataflow: a structure usage pointing at its data structure
#[derive(Debug, Clone, Serialize)]
pub struct Dataflow {
    pub identity: Identity,
    pub naming: Naming,
    pub versioning: Versioning,
    pub maintenance: Maintenance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<Ref>,
}

maintainable!(Dataflow);

impl Ordered for Dataflow {}

impl FromReader for Dataflow {
    fn from_reader<R: Reader>(reader: &R, node: &R::Node) -> Result<Self> {
        Ok(Self {
            identity: Identity::read(reader, node, "dataflow")?,
            naming: Naming::from_reader(reader, node)?,
            versioning: Versioning::from_reader(reader, node)?,
            maintenance: Maintenance::from_reader(reader, node)?,
            structure: reader.read_instance(Field::Structure, node)?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvisionAgreement {
    pub identity: Identity,
    pub naming: Naming,
    pub versioning: Versioning,
    pub maintenance: Maintenance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure_usage: Option<Ref>,
}

maintainable!(ProvisionAgreement);

impl Ordered for ProvisionAgreement {}

impl FromReader for ProvisionAgreement {
    fn from_reader<R: Reader>(reader: &R, node: &R::Node) -> Result<Self> {
        Ok(Self {
            identity: Identity::read(reader, node, "provision agreement")?,
            naming: Naming::from_reader(reader, node)?,
            versioning: Versioning::from_reader(reader, node)?,
            maintenance: Maintenance::from_reader(reader, node)?,
            structure_usage: reader.read_instance(Field::StructureUsage, node)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::JsonReader;
    use serde_json::json;

    fn dimension_list(dims: serde_json::Value) -> Result<DimensionDescriptor> {
        let reader = JsonReader::new(json!({
            "id": "DimensionDescriptor",
            "urn": "urn:dd",
            "dimensions": dims
        }));
        DimensionDescriptor::from_reader(&reader, &reader.root())
    }

    #[test]
    fn test_dimensions_ordered_by_position() {
        let list = dimension_list(json!([
            {"id": "dim1", "urn": "urn:dim1", "position": 2},
            {"id": "dim2", "urn": "urn:dim2", "position": 1},
            {"id": "dim3", "urn": "urn:dim3", "position": 0}
        ]))
        .unwrap();
        let ids: Vec<&str> = list.as_ordered().iter().map(|d| d.id()).collect();
        assert_eq!(ids, vec!["dim3", "dim2", "dim1"]);
    }

    #[test]
    fn test_duplicate_position_rejected() {
        let result = dimension_list(json!([
            {"id": "dim1", "urn": "urn:dim1", "position": 0},
            {"id": "dim2", "urn": "urn:dim2", "position": 0}
        ]));
        assert!(matches!(result, Err(SdmxError::InvalidStructure(_))));
    }

    #[test]
    fn test_gap_in_positions_rejected() {
        let result = dimension_list(json!([
            {"id": "dim1", "urn": "urn:dim1", "position": 0},
            {"id": "dim2", "urn": "urn:dim2", "position": 2}
        ]));
        assert!(matches!(result, Err(SdmxError::InvalidStructure(_))));
    }

    #[test]
    fn test_extreme_positions_rejected() {
        let result = dimension_list(json!([
            {"id": "dim1", "urn": "urn:dim1", "position": -1},
            {"id": "dim2", "urn": "urn:dim2", "position": i64::MAX}
        ]));
        assert!(matches!(result, Err(SdmxError::InvalidStructure(_))));

        let result = dimension_list(json!([
            {"id": "dim1", "urn": "urn:dim1", "position": 0},
            {"id": "dim2", "urn": "urn:dim2", "position": i64::MAX}
        ]));
        assert!(matches!(result, Err(SdmxError::InvalidStructure(_))));
    }

    #[test]
    fn test_one_based_positions_accepted() {
        let list = dimension_list(json!([
            {"id": "dim1", "urn": "urn:dim1", "position": 1},
            {"id": "dim2", "urn": "urn:dim2", "position": 2}
        ]))
        .unwrap();
        assert_eq!(list.len(), 2);

        let result = dimension_list(json!([
            {"id": "dim1", "urn": "urn:dim1", "position": 2},
            {"id": "dim2", "urn": "urn:dim2", "position": 3}
        ]));
        assert!(matches!(result, Err(SdmxError::InvalidStructure(_))));
    }

    #[test]
    fn test_malformed_position() {
        let result = dimension_list(json!([
            {"id": "dim1", "urn": "urn:dim1", "position": "first"}
        ]));
        assert!(matches!(
            result,
            Err(SdmxError::MalformedScalar { field: Field::Position, .. })
        ));
    }

    #[test]
    fn test_representation() {
        let read = |doc: serde_json::Value| {
            let reader = JsonReader::new(doc);
            Representation::from_reader(&reader, &reader.root())
        };

        let enumerated = read(json!({
            "enumeration": {"class": "Codelist", "id": "CL_FREQ", "agencyID": "ECB"}
        }))
        .unwrap();
        assert_eq!(
            enumerated,
            Representation::Enumerated(Ref::new("Codelist", "CL_FREQ").with_agency("ECB"))
        );

        let text = read(json!({"textType": "String", "maxLength": "12"})).unwrap();
        assert_eq!(
            text,
            Representation::Text {
                text_type: Some("String".to_string()),
                max_length: Some(12)
            }
        );

        assert!(read(json!({"maxLength": -1})).is_err());
    }

    #[test]
    fn test_missing_lists_default_to_empty() {
        let reader = JsonReader::new(json!({
            "id": "ECB_EXR1",
            "urn": "urn:sdmx:org.sdmx.infomodel.datastructure.DataStructure=ECB:ECB_EXR1(1.0)",
            "dimensionList": {
                "id": "DimensionDescriptor",
                "urn": "urn:dd",
                "dimensions": [{"id": "FREQ", "urn": "urn:freq", "position": 1}],
                "timeDimension": {"id": "TIME_PERIOD", "urn": "urn:time", "position": 2}
            }
        }));
        let dsd = DataStructureDefinition::from_reader(&reader, &reader.root()).unwrap();
        assert!(dsd.measures.is_empty());
        assert!(dsd.attributes.is_empty());
        assert_eq!(dsd.attributes.id(), "AttributeDescriptor");
        assert_eq!(dsd.dimension_ids(), vec!["FREQ", "TIME_PERIOD"]);
        assert_eq!(
            dsd.dimensions.time_dimension().map(|d| d.id()),
            Some("TIME_PERIOD")
        );
        assert!(dsd.dimensions.measure_dimension().is_none());
    }

    #[test]
    fn test_dimension_list_is_required() {
        let reader = JsonReader::new(json!({"id": "DSD", "urn": "urn:dsd"}));
        let result = DataStructureDefinition::from_reader(&reader, &reader.root());
        assert!(matches!(
            result,
            Err(SdmxError::MissingField { field: Field::DimensionList, .. })
        ));
    }
}
