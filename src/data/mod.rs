//! Generic data sets: lazy traversal of series, groups and observations
//!
//! Keys and attribute values are ordered id/value maps. Observations are
//! plain records produced per iteration and never cached.

pub mod dataset;

use crate::models::DimensionKey;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

pub use dataset::{ALL_DIMENSIONS, DataSet, Group, Series};

/// Ordered id to value pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueMap(Vec<(String, String)>);

/// Dimension id to value
pub type Key = ValueMap;

/// Attribute id to value
pub type Attributes = ValueMap;

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of the first entry with this id
    pub fn get(&self, id: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == id)
            .map(|(_, v)| v.as_str())
    }

    /// Set `id`, replacing an existing entry in place
    pub fn set(&mut self, id: impl Into<String>, value: impl Into<String>) {
        let id = id.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == id) {
            Some(entry) => entry.1 = value,
            None => self.0.push((id, value)),
        }
    }

    /// Append without replacing; ids may repeat
    pub fn push(&mut self, id: impl Into<String>, value: impl Into<String>) {
        self.0.push((id.into(), value.into()));
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl Serialize for ValueMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl DimensionKey for ValueMap {
    fn value_of(&self, dimension: &str) -> Option<&str> {
        self.get(dimension)
    }
}

/// One observation as produced by an iteration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub key: Key,
    /// `None` when values were not requested or the observation has none
    pub value: Option<String>,
    /// `None` when attributes were not requested
    pub attributes: Option<Attributes>,
}

/// Switches for observation iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObservationOptions {
    /// Decode observation values
    pub with_values: bool,

    /// Decode observation attributes
    pub with_attributes: bool,

    /// Yield observations last to first; honoured by series only
    pub reverse: bool,
}

impl Default for ObservationOptions {
    fn default() -> Self {
        Self {
            with_values: true,
            with_attributes: true,
            reverse: false,
        }
    }
}

impl ObservationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ObservationOptionsBuilder {
        ObservationOptionsBuilder::default()
    }
}

/// Builder for ObservationOptions
#[derive(Debug, Default)]
pub struct ObservationOptionsBuilder {
    options: ObservationOptions,
}

impl ObservationOptionsBuilder {
    pub fn with_values(mut self, enabled: bool) -> Self {
        self.options.with_values = enabled;
        self
    }

    pub fn with_attributes(mut self, enabled: bool) -> Self {
        self.options.with_attributes = enabled;
        self
    }

    pub fn reverse(mut self, reverse: bool) -> Self {
        self.options.reverse = reverse;
        self
    }

    pub fn build(self) -> ObservationOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_in_place() {
        let mut map: ValueMap = [("UNIT", "EUR"), ("DECIMALS", "2")].into_iter().collect();
        map.set("UNIT", "USD");
        map.set("TITLE", "Rates");
        let entries: Vec<(&str, &str)> = map.iter().collect();
        assert_eq!(
            entries,
            vec![("UNIT", "USD"), ("DECIMALS", "2"), ("TITLE", "Rates")]
        );
    }

    #[test]
    fn test_push_keeps_duplicates() {
        let mut map = ValueMap::new();
        map.push("UNIT", "EUR");
        map.push("UNIT", "USD");
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("UNIT"), Some("EUR"));
    }

    #[test]
    fn test_serializes_as_map() {
        let map: ValueMap = [("FREQ", "M"), ("CURRENCY", "USD")].into_iter().collect();
        assert_eq!(
            serde_json::to_string(&map).unwrap(),
            r#"{"FREQ":"M","CURRENCY":"USD"}"#
        );
    }

    #[test]
    fn test_options_builder() {
        let options = ObservationOptions::builder()
            .with_values(false)
            .reverse(true)
            .build();
        assert!(!options.with_values);
        assert!(options.with_attributes);
        assert!(options.reverse);
    }
}
