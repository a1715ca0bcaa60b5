//! Keyed, deterministically ordered artefact containers
//!
//! Backs item schemes, component lists and the collections of a structure
//! message. Children are keyed by id, which must be unique within one
//! container.

use super::Identifiable;
use crate::error::{Result, SdmxError};
use crate::reader::{Field, FromReader, Reader};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Sort order of a container's children.
///
/// Ascending by id unless the artefact type says otherwise.
pub trait Ordered: Identifiable {
    fn sort_cmp(&self, other: &Self) -> Ordering {
        self.id().cmp(other.id())
    }
}

/// Id-keyed collection of artefacts, kept in reader order
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Container<T> {
    items: Vec<T>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    #[serde(skip)]
    label: String,
}

impl<T: Ordered> Container<T> {
    /// Create an empty container; `label` names it in error messages
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
            label: label.into(),
        }
    }

    /// Read every child stored under `field`
    pub fn read<R: Reader>(
        reader: &R,
        node: &R::Node,
        field: Field,
        label: impl Into<String>,
    ) -> Result<Self>
    where
        T: FromReader,
    {
        let mut container = Self::new(label);
        container.read_with(reader, node, field, T::from_reader::<R>)?;
        Ok(container)
    }

    /// Read every child stored under `field` with a custom builder
    pub fn read_with<R, F>(&mut self, reader: &R, node: &R::Node, field: Field, build: F) -> Result<()>
    where
        R: Reader,
        F: Fn(&R, &R::Node) -> Result<T>,
    {
        for child in reader.children(field, node) {
            self.insert(build(reader, &child)?)?;
        }
        Ok(())
    }

    /// Add a child; an id that is already present is an error
    pub fn insert(&mut self, item: T) -> Result<()> {
        if self.index.contains_key(item.id()) {
            return Err(SdmxError::DuplicateId {
                container: self.label.clone(),
                id: item.id().to_string(),
            });
        }
        self.index.insert(item.id().to_string(), self.items.len());
        self.items.push(item);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Children in the order the reader produced them
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Children sorted by the container's sort key
    pub fn as_ordered(&self) -> Vec<&T> {
        let mut ordered: Vec<&T> = self.items.iter().collect();
        ordered.sort_by(|a, b| a.sort_cmp(b));
        ordered
    }
}

impl<'a, T> IntoIterator for &'a Container<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Code;
    use crate::reader::JsonReader;
    use serde_json::json;

    fn codes(doc: serde_json::Value) -> Result<Container<Code>> {
        let reader = JsonReader::new(doc);
        Container::read(&reader, &reader.root(), Field::Codes, "codelist CL_TEST")
    }

    #[test]
    fn test_ordered_by_id() {
        let container = codes(json!({"codes": [
            {"id": "b", "urn": "urn:b"},
            {"id": "a", "urn": "urn:a"},
            {"id": "c", "urn": "urn:c"}
        ]}))
        .unwrap();

        let ids: Vec<&str> = container.as_ordered().iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        let reader_order: Vec<&str> = container.iter().map(|c| c.id()).collect();
        assert_eq!(reader_order, vec!["b", "a", "c"]);
        assert_eq!(container.as_ordered(), container.as_ordered());
    }

    #[test]
    fn test_get_and_missing() {
        let container = codes(json!({"codes": [{"id": "A", "urn": "urn:A"}]})).unwrap();
        assert_eq!(container.get("A").map(|c| c.urn()), Some("urn:A"));
        assert!(container.get("Z").is_none());
        assert!(container.contains("A"));
        assert_eq!(container.len(), 1);
    }

    #[test]
    fn test_duplicate_id_is_an_error() {
        let result = codes(json!({"codes": [
            {"id": "A", "urn": "urn:A1"},
            {"id": "A", "urn": "urn:A2"}
        ]}));
        match result {
            Err(SdmxError::DuplicateId { container, id }) => {
                assert_eq!(container, "codelist CL_TEST");
                assert_eq!(id, "A");
            }
            other => panic!("expected duplicate id error, got {:?}", other),
        }
    }
}
