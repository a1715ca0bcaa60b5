//! Typed references between artefacts

use super::urn::Urn;
use crate::error::{Result, SdmxError};
use crate::reader::{Field, FromReader, Reader};
use serde::Serialize;
use std::fmt;

/// An unresolved, typed pointer to another artefact.
///
/// Resolving it is a separate step, see [`crate::resolver::Resolver`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Ref {
    /// Class tag of the target, e.g. `Codelist` or `Concept`
    pub class: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    pub id: String,
    /// Id of the maintainable that owns the target, for items and components
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintainable_parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agency_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urn: Option<String>,
}

impl Ref {
    /// Reference to a maintainable artefact
    pub fn new(class: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            package: None,
            id: id.into(),
            maintainable_parent_id: None,
            agency_id: None,
            version: None,
            urn: None,
        }
    }

    /// Reference to an item or component owned by `parent_id`
    pub fn item(class: impl Into<String>, parent_id: impl Into<String>, id: impl Into<String>) -> Self {
        Self::new(class, id).with_parent(parent_id)
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.maintainable_parent_id = Some(parent_id.into());
        self
    }

    pub fn with_agency(mut self, agency_id: impl Into<String>) -> Self {
        self.agency_id = Some(agency_id.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Build a reference from an SDMX URN
    pub fn from_urn(raw: &str) -> Option<Self> {
        let urn = Urn::parse(raw)?;
        let mut reference = Self::new(urn.class.clone(), urn.target_id());
        if urn.item_id.is_some() {
            reference.maintainable_parent_id = Some(urn.id.clone());
        }
        reference.package = Some(urn.package);
        reference.agency_id = Some(urn.agency_id);
        reference.version = Some(urn.version);
        reference.urn = Some(raw.to_string());
        Some(reference)
    }
}

impl FromReader for Ref {
    /// Explicit fields win; whatever is missing is taken from the node's URN.
    fn from_reader<R: Reader>(reader: &R, node: &R::Node) -> Result<Self> {
        let urn = reader.read_str(Field::Urn, node)?;
        let parsed = urn.as_deref().and_then(Urn::parse);

        let id = match reader.read_str(Field::Id, node)? {
            Some(id) => id,
            None => parsed
                .as_ref()
                .map(|u| u.target_id().to_string())
                .ok_or(SdmxError::MissingField {
                    field: Field::Id,
                    context: "reference",
                })?,
        };
        let class = match reader.read_str(Field::RefClass, node)? {
            Some(class) => class,
            None => parsed
                .as_ref()
                .map(|u| u.class.clone())
                .ok_or(SdmxError::MissingField {
                    field: Field::RefClass,
                    context: "reference",
                })?,
        };
        let maintainable_parent_id = reader
            .read_str(Field::MaintainableParentId, node)?
            .or_else(|| {
                parsed
                    .as_ref()
                    .filter(|u| u.item_id.is_some())
                    .map(|u| u.id.clone())
            });

        Ok(Self {
            class,
            package: reader
                .read_str(Field::RefPackage, node)?
                .or_else(|| parsed.as_ref().map(|u| u.package.clone())),
            id,
            maintainable_parent_id,
            agency_id: reader
                .read_str(Field::AgencyId, node)?
                .or_else(|| parsed.as_ref().map(|u| u.agency_id.clone())),
            version: reader
                .read_str(Field::Version, node)?
                .or_else(|| parsed.as_ref().map(|u| u.version.clone())),
            urn,
        })
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=", self.class)?;
        if let Some(agency) = &self.agency_id {
            write!(f, "{}:", agency)?;
        }
        if let Some(parent) = &self.maintainable_parent_id {
            write!(f, "{}.", parent)?;
        }
        write!(f, "{}", self.id)?;
        if let Some(version) = &self.version {
            write!(f, "({})", version)?;
        }
        Ok(())
    }
}
