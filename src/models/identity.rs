//! Artefact identity, naming, versioning and maintenance blocks
//!
//! Artefacts are composed from these blocks instead of a class chain: every
//! artefact embeds an [`Identity`], nameable ones add [`Naming`], and
//! maintainable ones add [`Versioning`] and [`Maintenance`]. Equality,
//! ordering and hashing of every artefact are defined by its urn alone.

use crate::error::Result;
use crate::reader::{Field, FromReader, Reader};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Text keyed by language tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
    /// Text for one language
    pub fn get(&self, lang: &str) -> Option<&str> {
        self.0.get(lang).map(String::as_str)
    }

    /// Text for the first matching language, falling back to any available text
    pub fn preferred(&self, langs: &[&str]) -> Option<&str> {
        langs
            .iter()
            .find_map(|lang| self.get(lang))
            .or_else(|| self.0.values().next().map(String::as_str))
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for LocalizedText {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Annotation attached to an identifiable artefact
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "LocalizedText::is_empty")]
    pub text: LocalizedText,
}

impl FromReader for Annotation {
    fn from_reader<R: Reader>(reader: &R, node: &R::Node) -> Result<Self> {
        Ok(Self {
            id: reader.read_str(Field::Id, node)?,
            title: reader.read_str(Field::AnnotationTitle, node)?,
            annotation_type: reader.read_str(Field::AnnotationType, node)?,
            url: reader.read_str(Field::AnnotationUrl, node)?,
            text: reader.localized(Field::AnnotationText, node)?,
        })
    }
}

/// Identity block shared by every artefact
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    pub id: String,
    pub urn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl Identity {
    /// Read the identity of the artefact at `node`.
    ///
    /// When the node carries a nested reference its id wins over the node's own.
    pub fn read<R: Reader>(reader: &R, node: &R::Node, context: &'static str) -> Result<Self> {
        let id = match reader.child(Field::Ref, node) {
            Some(reference) => reader.required_str(Field::Id, &reference, context)?,
            None => reader.required_str(Field::Id, node, context)?,
        };
        Ok(Self {
            id,
            urn: reader.required_str(Field::Urn, node, context)?,
            uri: reader.read_str(Field::Uri, node)?,
            annotations: reader.read_instances(Field::Annotations, node)?,
        })
    }

    /// Identity for a block the reader did not describe, derived from its owner
    pub(crate) fn derived(owner_urn: &str, id: &str) -> Self {
        Self {
            id: id.to_string(),
            urn: format!("{}.{}", owner_urn, id),
            uri: None,
            annotations: Vec::new(),
        }
    }
}

/// Naming block
#[derive(Debug, Clone, Default, Serialize)]
pub struct Naming {
    pub name: LocalizedText,
    #[serde(skip_serializing_if = "LocalizedText::is_empty")]
    pub description: LocalizedText,
}

impl FromReader for Naming {
    fn from_reader<R: Reader>(reader: &R, node: &R::Node) -> Result<Self> {
        Ok(Self {
            name: reader.localized(Field::Name, node)?,
            description: reader.localized(Field::Description, node)?,
        })
    }
}

/// Versioning block
#[derive(Debug, Clone, Default, Serialize)]
pub struct Versioning {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<DateTime<Utc>>,
}

impl FromReader for Versioning {
    fn from_reader<R: Reader>(reader: &R, node: &R::Node) -> Result<Self> {
        Ok(Self {
            version: reader.read_str(Field::Version, node)?,
            valid_from: reader.read_timestamp(Field::ValidFrom, node)?,
            valid_to: reader.read_timestamp(Field::ValidTo, node)?,
        })
    }
}

/// Maintenance block: owning agency and lifecycle flags
#[derive(Debug, Clone, Default, Serialize)]
pub struct Maintenance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintainer: Option<String>,
    pub is_final: bool,
    pub is_external_ref: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
}

impl FromReader for Maintenance {
    fn from_reader<R: Reader>(reader: &R, node: &R::Node) -> Result<Self> {
        Ok(Self {
            maintainer: reader.read_str(Field::AgencyId, node)?,
            is_final: reader.read_bool(Field::IsFinal, node)?,
            is_external_ref: reader.read_bool(Field::IsExternalReference, node)?,
            structure_url: reader.read_str(Field::StructureUrl, node)?,
            service_url: reader.read_str(Field::ServiceUrl, node)?,
        })
    }
}

/// An artefact with an id and a urn
pub trait Identifiable {
    fn identity(&self) -> &Identity;

    fn id(&self) -> &str {
        &self.identity().id
    }

    fn urn(&self) -> &str {
        &self.identity().urn
    }

    fn uri(&self) -> Option<&str> {
        self.identity().uri.as_deref()
    }

    fn annotations(&self) -> &[Annotation] {
        &self.identity().annotations
    }
}

/// An identifiable artefact with a name and description
pub trait Nameable: Identifiable {
    fn naming(&self) -> &Naming;

    fn name(&self) -> &LocalizedText {
        &self.naming().name
    }

    fn description(&self) -> &LocalizedText {
        &self.naming().description
    }
}

pub trait Versionable: Nameable {
    fn versioning(&self) -> &Versioning;

    fn version(&self) -> Option<&str> {
        self.versioning().version.as_deref()
    }

    fn valid_from(&self) -> Option<DateTime<Utc>> {
        self.versioning().valid_from
    }

    fn valid_to(&self) -> Option<DateTime<Utc>> {
        self.versioning().valid_to
    }
}

/// A versionable artefact owned by an agency
pub trait Maintainable: Versionable {
    fn maintenance(&self) -> &Maintenance;

    fn maintainer(&self) -> Option<&str> {
        self.maintenance().maintainer.as_deref()
    }

    fn is_final(&self) -> bool {
        self.maintenance().is_final
    }

    fn is_external_ref(&self) -> bool {
        self.maintenance().is_external_ref
    }
}

/// Implements [`Identifiable`] plus urn-based `Eq`, `Ord` and `Hash`.
macro_rules! identifiable {
    ($ty:ident $(<$g:ident>)?, $($path:ident).+) => {
        impl$(<$g>)? $crate::models::Identifiable for $ty$(<$g>)? {
            fn identity(&self) -> &$crate::models::Identity {
                &self.$($path).+
            }
        }

        impl$(<$g>)? PartialEq for $ty$(<$g>)? {
            fn eq(&self, other: &Self) -> bool {
                $crate::models::Identifiable::urn(self) == $crate::models::Identifiable::urn(other)
            }
        }

        impl$(<$g>)? Eq for $ty$(<$g>)? {}

        impl$(<$g>)? PartialOrd for $ty$(<$g>)? {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl$(<$g>)? Ord for $ty$(<$g>)? {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                $crate::models::Identifiable::urn(self).cmp($crate::models::Identifiable::urn(other))
            }
        }

        impl$(<$g>)? std::hash::Hash for $ty$(<$g>)? {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                std::hash::Hash::hash($crate::models::Identifiable::urn(self), state)
            }
        }
    };
}

/// Implements [`identifiable!`] plus [`Nameable`] from `identity` and `naming` fields.
macro_rules! nameable {
    ($ty:ident $(<$g:ident>)?) => {
        $crate::models::identity::identifiable!($ty $(<$g>)?, identity);

        impl$(<$g>)? $crate::models::Nameable for $ty$(<$g>)? {
            fn naming(&self) -> &$crate::models::Naming {
                &self.naming
            }
        }
    };
}

/// Implements the full maintainable chain from the four block fields.
macro_rules! maintainable {
    ($ty:ident $(<$g:ident>)?) => {
        $crate::models::identity::nameable!($ty $(<$g>)?);

        impl$(<$g>)? $crate::models::Versionable for $ty$(<$g>)? {
            fn versioning(&self) -> &$crate::models::Versioning {
                &self.versioning
            }
        }

        impl$(<$g>)? $crate::models::Maintainable for $ty$(<$g>)? {
            fn maintenance(&self) -> &$crate::models::Maintenance {
                &self.maintenance
            }
        }
    };
}

pub(crate) use identifiable;
pub(crate) use maintainable;
pub(crate) use nameable;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::JsonReader;
    use serde_json::json;

    #[test]
    fn test_identity_prefers_nested_reference_id() {
        let reader = JsonReader::new(json!({
            "id": "OWN",
            "urn": "urn:x",
            "ref": {"id": "FROM_REF"}
        }));
        let identity = Identity::read(&reader, &reader.root(), "test").unwrap();
        assert_eq!(identity.id, "FROM_REF");
    }

    #[test]
    fn test_identity_requires_urn() {
        let reader = JsonReader::new(json!({"id": "X"}));
        let err = Identity::read(&reader, &reader.root(), "code").unwrap_err();
        assert!(err.to_string().contains("urn"));
    }

    #[test]
    fn test_maintenance_flags() {
        let reader = JsonReader::new(json!({
            "agencyID": "ECB",
            "isFinal": "true",
            "isExternalReference": false
        }));
        let maintenance = Maintenance::from_reader(&reader, &reader.root()).unwrap();
        assert_eq!(maintenance.maintainer.as_deref(), Some("ECB"));
        assert!(maintenance.is_final);
        assert!(!maintenance.is_external_ref);
    }

    #[test]
    fn test_localized_text_preference() {
        let text: LocalizedText = [
            ("de".to_string(), "Frequenz".to_string()),
            ("en".to_string(), "Frequency".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(text.preferred(&["fr", "en"]), Some("Frequency"));
        assert_eq!(text.preferred(&["fr"]), Some("Frequenz"));
        assert_eq!(LocalizedText::default().preferred(&["en"]), None);
    }
}
