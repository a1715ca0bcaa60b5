//! Data set, series and group traversal
//!
//! A [`DataSet`] keeps its reader and node and pulls series and observations
//! on every call, so each iteration is fresh and independent. Groups and the
//! data set attributes are read once and memoized; the cells are not `Sync`,
//! a data set is meant to be traversed from one thread.

use super::{Attributes, Key, Observation, ObservationOptions, ValueMap};
use crate::error::{Result, SdmxError};
use crate::reader::{Field, Reader};
use once_cell::unsync::OnceCell;
use tracing::debug;

/// `dimensionAtObservation` value of a flat data set
pub const ALL_DIMENSIONS: &str = "AllDimensions";

fn read_values<R: Reader>(reader: &R, field: Field, node: &R::Node) -> Result<ValueMap> {
    Ok(reader.read_pairs(field, node)?.into_iter().collect())
}

fn read_observation<R: Reader>(
    reader: &R,
    node: &R::Node,
    options: ObservationOptions,
) -> Result<Observation> {
    let value = if options.with_values {
        reader.read_str(Field::ObsValue, node)?
    } else {
        None
    };
    let attributes = if options.with_attributes {
        Some(read_values(reader, Field::AttributeValues, node)?)
    } else {
        None
    };
    Ok(Observation {
        key: read_values(reader, Field::ObsKey, node)?,
        value,
        attributes,
    })
}

pub struct DataSet<'r, R: Reader> {
    reader: &'r R,
    node: R::Node,
    dim_at_obs: Option<String>,
    attributes: OnceCell<Attributes>,
    groups: OnceCell<Vec<Group>>,
}

impl<'r, R: Reader> DataSet<'r, R> {
    /// A data set over `node`; nothing is read until it is traversed
    pub fn new(reader: &'r R, node: R::Node, dim_at_obs: Option<String>) -> Self {
        Self {
            reader,
            node,
            dim_at_obs,
            attributes: OnceCell::new(),
            groups: OnceCell::new(),
        }
    }

    pub fn dim_at_obs(&self) -> Option<&str> {
        self.dim_at_obs.as_deref()
    }

    /// A flat data set holds observations directly and has no series
    pub fn is_flat(&self) -> bool {
        self.dim_at_obs.as_deref() == Some(ALL_DIMENSIONS)
    }

    /// Data set level attributes
    pub fn attributes(&self) -> Result<&Attributes> {
        self.attributes
            .get_or_try_init(|| read_values(self.reader, Field::AttributeValues, &self.node))
    }

    /// Groups in declaration order
    pub fn groups(&self) -> Result<&[Group]> {
        let groups = self.groups.get_or_try_init(|| {
            let groups = self
                .reader
                .children(Field::Groups, &self.node)
                .map(|node| Group::new(self, &node))
                .collect::<Result<Vec<_>>>()?;
            debug!("Read {} groups", groups.len());
            Ok::<_, SdmxError>(groups)
        })?;
        Ok(groups.as_slice())
    }

    /// Observations held directly by the data set.
    ///
    /// `options.reverse` does not apply here.
    pub fn observations(
        &self,
        options: &ObservationOptions,
    ) -> impl Iterator<Item = Result<Observation>> + '_ {
        let options = *options;
        self.reader
            .children(Field::Observations, &self.node)
            .map(move |node| read_observation(self.reader, &node, options))
    }

    /// Series in reader order
    pub fn series(&self) -> impl Iterator<Item = Result<Series<'_, R>>> + '_ {
        self.reader
            .children(Field::Series, &self.node)
            .map(move |node| Series::new(self, node))
    }
}

/// A series of observations sharing one key
pub struct Series<'a, R: Reader> {
    dataset: &'a DataSet<'a, R>,
    node: R::Node,
    key: Key,
    attributes: Attributes,
    group_attributes: OnceCell<Attributes>,
}

impl<'a, R: Reader> Series<'a, R> {
    /// Build the series at `node`; a flat data set cannot own series
    pub fn new(dataset: &'a DataSet<'a, R>, node: R::Node) -> Result<Self> {
        if dataset.is_flat() {
            return Err(SdmxError::InvalidAssociation(
                "a series cannot belong to a flat data set".to_string(),
            ));
        }
        Ok(Self {
            key: read_values(dataset.reader, Field::SeriesKey, &node)?,
            attributes: read_values(dataset.reader, Field::AttributeValues, &node)?,
            dataset,
            node,
            group_attributes: OnceCell::new(),
        })
    }

    pub fn dataset(&self) -> &'a DataSet<'a, R> {
        self.dataset
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Series level attributes only
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Observations of this series, first to last unless `options.reverse` is set
    pub fn observations(
        &self,
        options: &ObservationOptions,
    ) -> Box<dyn Iterator<Item = Result<Observation>> + '_> {
        let options = *options;
        let reader = self.dataset.reader;
        let nodes = reader.children(Field::Observations, &self.node);
        if options.reverse {
            let nodes: Vec<R::Node> = nodes.collect();
            Box::new(
                nodes
                    .into_iter()
                    .rev()
                    .map(move |node| read_observation(reader, &node, options)),
            )
        } else {
            Box::new(nodes.map(move |node| read_observation(reader, &node, options)))
        }
    }

    /// Attributes of every group this series belongs to, concatenated in group order
    pub fn group_attributes(&self) -> Result<&Attributes> {
        self.group_attributes.get_or_try_init(|| {
            let mut attributes = ValueMap::new();
            for group in self.dataset.groups()? {
                if group.includes(&self.key) {
                    for (id, value) in group.attributes().iter() {
                        attributes.push(id, value);
                    }
                }
            }
            Ok::<_, SdmxError>(attributes)
        })
    }

    /// Union of data set, group and series attributes; later scopes win
    pub fn effective_attributes(&self) -> Result<Attributes> {
        let mut attributes = self.dataset.attributes()?.clone();
        for (id, value) in self.group_attributes()?.iter() {
            attributes.set(id, value);
        }
        for (id, value) in self.attributes.iter() {
            attributes.set(id, value);
        }
        Ok(attributes)
    }
}

/// A partial key with attributes shared by the series it matches
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    key: Key,
    attributes: Attributes,
}

impl Group {
    /// Build the group at `node`; a flat data set cannot own groups
    pub fn new<R: Reader>(dataset: &DataSet<'_, R>, node: &R::Node) -> Result<Self> {
        if dataset.is_flat() {
            return Err(SdmxError::InvalidAssociation(
                "a group cannot belong to a flat data set".to_string(),
            ));
        }
        Ok(Self {
            key: read_values(dataset.reader, Field::GroupKey, node)?,
            attributes: read_values(dataset.reader, Field::AttributeValues, node)?,
        })
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// True when `key` agrees with every dimension the group fixes
    pub fn includes(&self, key: &Key) -> bool {
        self.key.iter().all(|(dim, value)| key.get(dim) == Some(value))
    }

    /// True when `series` is a member of this group
    pub fn contains<R: Reader>(&self, series: &Series<'_, R>) -> bool {
        self.includes(series.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::JsonReader;
    use serde_json::json;

    #[test]
    fn test_group_includes_partial_key() {
        let group = Group {
            key: [("dim1", "X")].into_iter().collect(),
            attributes: ValueMap::new(),
        };
        let member: Key = [("dim1", "X"), ("dim2", "Y")].into_iter().collect();
        let other: Key = [("dim1", "Z"), ("dim2", "Y")].into_iter().collect();
        assert!(group.includes(&member));
        assert!(!group.includes(&other));
    }

    #[test]
    fn test_flat_data_set_rejects_series() {
        let reader = JsonReader::new(json!({
            "series": [{"seriesKey": {"FREQ": "M"}}],
            "observations": [{"obsKey": {"FREQ": "M", "TIME_PERIOD": "2020-01"}, "obsValue": "1.1"}]
        }));
        let dataset = DataSet::new(&reader, reader.root(), Some(ALL_DIMENSIONS.to_string()));
        assert!(dataset.is_flat());
        let first = dataset.series().next().unwrap();
        assert!(matches!(first, Err(SdmxError::InvalidAssociation(_))));
        assert_eq!(dataset.observations(&ObservationOptions::default()).count(), 1);
    }
}
