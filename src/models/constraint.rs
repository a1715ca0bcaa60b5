//! Content constraints and cube-region evaluation
//!
//! Evaluation is pure: it runs over already built regions and never touches
//! a reader. Partially specified keys are treated leniently, see
//! [`CubeRegion::permits`].

use super::container::Ordered;
use super::identity::{Identity, Maintenance, Naming, Versioning, maintainable};
use super::reference::Ref;
use crate::error::{Result, SdmxError};
use crate::reader::{Field, FromReader, Reader, scalar};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A (possibly partial) observation key: dimension id to value
pub trait DimensionKey {
    fn value_of(&self, dimension: &str) -> Option<&str>;
}

impl DimensionKey for HashMap<String, String> {
    fn value_of(&self, dimension: &str) -> Option<&str> {
        self.get(dimension).map(String::as_str)
    }
}

impl DimensionKey for BTreeMap<String, String> {
    fn value_of(&self, dimension: &str) -> Option<&str> {
        self.get(dimension).map(String::as_str)
    }
}

impl DimensionKey for HashMap<&str, &str> {
    fn value_of(&self, dimension: &str) -> Option<&str> {
        self.get(dimension).copied()
    }
}

/// The allowed values of one dimension inside a cube region
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyValue {
    pub id: String,
    pub values: BTreeSet<String>,
}

impl FromReader for KeyValue {
    fn from_reader<R: Reader>(reader: &R, node: &R::Node) -> Result<Self> {
        Ok(Self {
            id: reader.required_str(Field::Id, node, "key value")?,
            values: reader.read_strs(Field::Values, node)?.into_iter().collect(),
        })
    }
}

/// An include or exclude region in dimension-value space
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CubeRegion {
    pub include: bool,
    pub key_values: BTreeMap<String, BTreeSet<String>>,
}

impl FromReader for CubeRegion {
    /// A region without an explicit `include` flag is an inclusion region.
    fn from_reader<R: Reader>(reader: &R, node: &R::Node) -> Result<Self> {
        let include = match reader.read_str(Field::Include, node)? {
            Some(raw) => scalar::parse_bool(Field::Include, &raw)?,
            None => true,
        };
        let mut key_values = BTreeMap::new();
        for key_value in reader.read_instances::<KeyValue>(Field::KeyValues, node)? {
            if key_values.contains_key(&key_value.id) {
                return Err(SdmxError::DuplicateId {
                    container: "cube region".to_string(),
                    id: key_value.id,
                });
            }
            key_values.insert(key_value.id, key_value.values);
        }
        Ok(Self {
            include,
            key_values,
        })
    }
}

impl CubeRegion {
    pub fn new<I, D, V>(include: bool, key_values: I) -> Self
    where
        I: IntoIterator<Item = (D, V)>,
        D: Into<String>,
        V: IntoIterator,
        V::Item: Into<String>,
    {
        Self {
            include,
            key_values: key_values
                .into_iter()
                .map(|(dim, values)| (dim.into(), values.into_iter().map(Into::into).collect()))
                .collect(),
        }
    }

    /// Whether the region lets `key` through.
    ///
    /// Inclusion: every constrained dimension present in `key` must hold an
    /// allowed value; dimensions missing from `key` are not checked.
    ///
    /// Exclusion: only a key that sets every constrained dimension can be
    /// excluded, and only when all of its values fall in the region. Any
    /// partial key is permitted.
    pub fn permits<K: DimensionKey + ?Sized>(&self, key: &K) -> bool {
        let matched: Vec<bool> = self
            .key_values
            .iter()
            .filter_map(|(dim, allowed)| key.value_of(dim).map(|v| allowed.contains(v)))
            .collect();
        if self.include {
            matched.iter().all(|m| *m)
        } else if matched.len() == self.key_values.len() {
            !matched.iter().all(|m| *m)
        } else {
            true
        }
    }
}

/// A maintainable constraint made of cube regions
#[derive(Debug, Clone, Serialize)]
pub struct ContentConstraint {
    pub identity: Identity,
    pub naming: Naming,
    pub versioning: Versioning,
    pub maintenance: Maintenance,
    /// What the constraint applies to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Ref>,
    pub cube_regions: Vec<CubeRegion>,
}

maintainable!(ContentConstraint);

impl Ordered for ContentConstraint {}

impl FromReader for ContentConstraint {
    fn from_reader<R: Reader>(reader: &R, node: &R::Node) -> Result<Self> {
        Ok(Self {
            identity: Identity::read(reader, node, "content constraint")?,
            naming: Naming::from_reader(reader, node)?,
            versioning: Versioning::from_reader(reader, node)?,
            maintenance: Maintenance::from_reader(reader, node)?,
            attachment: reader.read_instance(Field::ConstraintAttachment, node)?,
            cube_regions: reader.read_instances(Field::CubeRegions, node)?,
        })
    }
}

impl ContentConstraint {
    /// True when any region permits `key`; a constraint without regions permits everything
    pub fn permits<K: DimensionKey + ?Sized>(&self, key: &K) -> bool {
        self.cube_regions.is_empty() || self.cube_regions.iter().any(|r| r.permits(key))
    }
}
