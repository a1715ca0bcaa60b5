//! Items and item schemes: code lists, concept schemes, category schemes

use super::container::{Container, Ordered};
use super::identity::{Identity, Maintenance, Naming, Versioning, maintainable, nameable};
use crate::error::Result;
use crate::reader::{Field, FromReader, Reader};
use serde::Serialize;
use std::marker::PhantomData;

/// A nameable member of an item scheme
#[derive(Debug, Clone, Serialize)]
pub struct Item {
    pub identity: Identity,
    pub naming: Naming,
    /// Id of the parent item within the same scheme
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

nameable!(Item);

impl Ordered for Item {}

impl FromReader for Item {
    fn from_reader<R: Reader>(reader: &R, node: &R::Node) -> Result<Self> {
        let parent = match reader.child(Field::Parent, node) {
            Some(parent) => reader.read_str(Field::Id, &parent)?,
            None => reader.read_str(Field::Parent, node)?,
        };
        Ok(Self {
            identity: Identity::read(reader, node, "item")?,
            naming: Naming::from_reader(reader, node)?,
            parent,
        })
    }
}

pub type Code = Item;
pub type Concept = Item;
pub type Category = Item;

/// Declares which children an item scheme holds
pub trait SchemeKind {
    /// Field the scheme's items are stored under
    const ITEMS: Field;
    /// Human readable kind, used in error messages
    const LABEL: &'static str;
}

#[derive(Debug, Clone, Copy)]
pub struct CodelistKind;

#[derive(Debug, Clone, Copy)]
pub struct ConceptSchemeKind;

#[derive(Debug, Clone, Copy)]
pub struct CategorySchemeKind;

impl SchemeKind for CodelistKind {
    const ITEMS: Field = Field::Codes;
    const LABEL: &'static str = "codelist";
}

impl SchemeKind for ConceptSchemeKind {
    const ITEMS: Field = Field::Concepts;
    const LABEL: &'static str = "concept scheme";
}

impl SchemeKind for CategorySchemeKind {
    const ITEMS: Field = Field::Categories;
    const LABEL: &'static str = "category scheme";
}

/// A maintainable, named collection of items
#[derive(Debug, Clone, Serialize)]
pub struct ItemScheme<K> {
    pub identity: Identity,
    pub naming: Naming,
    pub versioning: Versioning,
    pub maintenance: Maintenance,
    pub is_partial: bool,
    pub items: Container<Item>,
    #[serde(skip)]
    kind: PhantomData<K>,
}

maintainable!(ItemScheme<K>);

impl<K> Ordered for ItemScheme<K> {}

pub type Codelist = ItemScheme<CodelistKind>;
pub type ConceptScheme = ItemScheme<ConceptSchemeKind>;
pub type CategoryScheme = ItemScheme<CategorySchemeKind>;

impl<K: SchemeKind> FromReader for ItemScheme<K> {
    fn from_reader<R: Reader>(reader: &R, node: &R::Node) -> Result<Self> {
        let identity = Identity::read(reader, node, K::LABEL)?;
        let label = format!("{} {}", K::LABEL, identity.id);
        Ok(Self {
            items: Container::read(reader, node, K::ITEMS, label)?,
            is_partial: reader.read_bool(Field::IsPartial, node)?,
            naming: Naming::from_reader(reader, node)?,
            versioning: Versioning::from_reader(reader, node)?,
            maintenance: Maintenance::from_reader(reader, node)?,
            identity,
            kind: PhantomData,
        })
    }
}

impl<K> ItemScheme<K> {
    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.get(id)
    }

    /// Items ascending by id
    pub fn as_ordered(&self) -> Vec<&Item> {
        self.items.as_ordered()
    }

    /// Direct children of an item, ascending by id
    pub fn children_of(&self, parent_id: &str) -> Vec<&Item> {
        self.items
            .as_ordered()
            .into_iter()
            .filter(|item| item.parent.as_deref() == Some(parent_id))
            .collect()
    }

    /// Items without a parent, ascending by id
    pub fn roots(&self) -> Vec<&Item> {
        self.items
            .as_ordered()
            .into_iter()
            .filter(|item| item.parent.is_none())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
