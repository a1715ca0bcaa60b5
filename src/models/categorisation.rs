//! Categorisations and their reverse index

use super::container::{Container, Ordered};
use super::identity::{Identity, Maintenance, Naming, Versioning, maintainable};
use super::reference::Ref;
use super::Identifiable;
use crate::error::{Result, SdmxError};
use crate::reader::{Field, FromReader, Reader};
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

/// Links a category to a categorised artefact, typically a dataflow
#[derive(Debug, Clone, Serialize)]
pub struct Categorisation {
    pub identity: Identity,
    pub naming: Naming,
    pub versioning: Versioning,
    pub maintenance: Maintenance,
    /// The category
    pub categorised_by: Ref,
    /// The categorised artefact
    pub artefact: Ref,
}

maintainable!(Categorisation);

impl Ordered for Categorisation {}

impl FromReader for Categorisation {
    fn from_reader<R: Reader>(reader: &R, node: &R::Node) -> Result<Self> {
        let categorised_by = reader
            .read_instance(Field::Target, node)?
            .ok_or(SdmxError::MissingField {
                field: Field::Target,
                context: "categorisation",
            })?;
        let artefact = reader
            .read_instance(Field::Source, node)?
            .ok_or(SdmxError::MissingField {
                field: Field::Source,
                context: "categorisation",
            })?;
        Ok(Self {
            identity: Identity::read(reader, node, "categorisation")?,
            naming: Naming::from_reader(reader, node)?,
            versioning: Versioning::from_reader(reader, node)?,
            maintenance: Maintenance::from_reader(reader, node)?,
            categorised_by,
            artefact,
        })
    }
}

/// Key of a group: category scheme id and category id
type CategoryKey = (String, String);

/// Categorisations grouped by the category they point at.
///
/// Within a group, categorisations keep reader order.
#[derive(Debug, Clone, Serialize)]
pub struct CategorisationIndex {
    categorisations: Container<Categorisation>,
    #[serde(skip)]
    groups: HashMap<CategoryKey, Vec<String>>,
}

impl Default for CategorisationIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl CategorisationIndex {
    pub fn new() -> Self {
        Self {
            categorisations: Container::new("categorisations"),
            groups: HashMap::new(),
        }
    }

    /// Index categorisations in the given order
    pub fn build<I: IntoIterator<Item = Categorisation>>(categorisations: I) -> Result<Self> {
        let mut index = Self::new();
        for categorisation in categorisations {
            index.insert(categorisation)?;
        }
        Ok(index)
    }

    /// Read and index every categorisation stored under `field`
    pub fn read<R: Reader>(reader: &R, node: &R::Node, field: Field) -> Result<Self> {
        let mut index = Self::new();
        for child in reader.children(field, node) {
            index.insert(Categorisation::from_reader(reader, &child)?)?;
        }
        Ok(index)
    }

    fn insert(&mut self, categorisation: Categorisation) -> Result<()> {
        let category = &categorisation.categorised_by;
        if category.maintainable_parent_id.is_none() {
            warn!(
                "Categorisation {} points at category {} without a scheme id",
                categorisation.id(),
                category.id
            );
        }
        let key = (
            category.maintainable_parent_id.clone().unwrap_or_default(),
            category.id.clone(),
        );
        let id = categorisation.id().to_string();
        self.categorisations.insert(categorisation)?;
        self.groups.entry(key).or_default().push(id);
        Ok(())
    }

    /// Categorisations under one category; empty when there are none
    pub fn get(&self, scheme_id: &str, category_id: &str) -> Vec<&Categorisation> {
        self.groups
            .get(&(scheme_id.to_string(), category_id.to_string()))
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.categorisations.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Look a categorisation up by its own id
    pub fn find(&self, id: &str) -> Option<&Categorisation> {
        self.categorisations.get(id)
    }

    pub fn len(&self) -> usize {
        self.categorisations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categorisations.is_empty()
    }

    /// Every categorisation in reader order
    pub fn iter(&self) -> impl Iterator<Item = &Categorisation> {
        self.categorisations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::JsonReader;
    use serde_json::json;

    fn categorisation(id: &str, scheme: &str, category: &str, dataflow: &str) -> serde_json::Value {
        json!({
            "id": id,
            "urn": format!("urn:sdmx:org.sdmx.infomodel.categoryscheme.Categorisation=ECB:{}(1.0)", id),
            "source": {"class": "Dataflow", "id": dataflow},
            "target": {"class": "Category", "id": category, "maintainableParentID": scheme}
        })
    }

    fn index() -> CategorisationIndex {
        let reader = JsonReader::new(json!({"categorisations": [
            categorisation("CAT1", "S1", "C1", "D1"),
            categorisation("CAT2", "S1", "C1", "D2"),
            categorisation("CAT3", "S1", "C2", "D3")
        ]}));
        CategorisationIndex::read(&reader, &reader.root(), Field::Categorisations).unwrap()
    }

    #[test]
    fn test_grouped_in_reader_order() {
        let index = index();
        let flows: Vec<&str> = index
            .get("S1", "C1")
            .iter()
            .map(|c| c.artefact.id.as_str())
            .collect();
        assert_eq!(flows, vec!["D1", "D2"]);
        assert_eq!(index.get("S1", "C2").len(), 1);
        assert!(index.get("S1", "C3").is_empty());
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_build_from_categorisations() {
        let categorisations = [
            categorisation("CAT1", "S1", "C1", "D1"),
            categorisation("CAT2", "S1", "C1", "D2"),
            categorisation("CAT3", "S1", "C2", "D3"),
        ]
        .into_iter()
        .map(|doc| {
            let reader = JsonReader::new(doc);
            Categorisation::from_reader(&reader, &reader.root()).unwrap()
        });
        let index = CategorisationIndex::build(categorisations).unwrap();

        let flows: Vec<&str> = index
            .get("S1", "C1")
            .iter()
            .map(|c| c.artefact.id.as_str())
            .collect();
        assert_eq!(flows, vec!["D1", "D2"]);
        let flows: Vec<&str> = index
            .get("S1", "C2")
            .iter()
            .map(|c| c.artefact.id.as_str())
            .collect();
        assert_eq!(flows, vec!["D3"]);
    }

    #[test]
    fn test_build_rejects_duplicate_ids() {
        let duplicates = ["CAT1", "CAT1"].into_iter().map(|id| {
            let reader = JsonReader::new(categorisation(id, "S1", "C1", "D1"));
            Categorisation::from_reader(&reader, &reader.root()).unwrap()
        });
        assert!(matches!(
            CategorisationIndex::build(duplicates),
            Err(SdmxError::DuplicateId { .. })
        ));
    }

    #[test]
    fn test_find_by_id() {
        let index = index();
        assert_eq!(index.find("CAT3").map(|c| c.artefact.id.as_str()), Some("D3"));
        assert!(index.find("CAT9").is_none());
    }

    #[test]
    fn test_source_is_required() {
        let reader = JsonReader::new(json!({
            "id": "CAT1",
            "urn": "urn:cat1",
            "target": {"class": "Category", "id": "C1"}
        }));
        let result = Categorisation::from_reader(&reader, &reader.root());
        assert!(matches!(
            result,
            Err(SdmxError::MissingField { field: Field::Source, .. })
        ));
    }
}
