//! Reader over a `serde_json::Value` node tree
//!
//! Nodes are addressed by JSON pointers into one owned document, so a node
//! handle is a plain string and stays valid for the reader's lifetime.
//!
//! Layout conventions:
//! - every field is stored under [`Field::key`]
//! - scalars may be strings, numbers or booleans
//! - localized text is an object of language tag to text; a bare string is
//!   stored under the `und` tag
//! - pair lists are objects (document order is kept) or arrays of
//!   `{"id": .., "value": ..}` records
//! - a single object where a list is expected counts as a one-element list

use super::{Field, Reader};
use crate::error::{Result, SdmxError};
use crate::models::LocalizedText;
use serde_json::Value;

/// Language tag used for text given without one
pub const UNDETERMINED_LANGUAGE: &str = "und";

/// Position of a node inside a [`JsonReader`] document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JsonNode {
    pointer: String,
}

impl JsonNode {
    /// The document root
    pub fn root() -> Self {
        Self {
            pointer: String::new(),
        }
    }

    /// The JSON pointer of this node
    pub fn pointer(&self) -> &str {
        &self.pointer
    }

    fn join(&self, key: &str) -> Self {
        Self {
            pointer: format!("{}/{}", self.pointer, key),
        }
    }

    fn index(&self, i: usize) -> Self {
        Self {
            pointer: format!("{}/{}", self.pointer, i),
        }
    }
}

/// Reader over an in-memory JSON document
#[derive(Debug, Clone)]
pub struct JsonReader {
    document: Value,
}

impl JsonReader {
    /// Wrap an already parsed document
    pub fn new(document: Value) -> Self {
        Self { document }
    }

    /// Parse a document from JSON text
    pub fn parse(text: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(text)?;
        Self::from_document(document)
    }

    /// Parse a document from YAML text, using the same layout conventions
    pub fn parse_yaml(text: &str) -> Result<Self> {
        let document: Value =
            serde_yaml::from_str(text).map_err(|e| SdmxError::Document(e.to_string()))?;
        Self::from_document(document)
    }

    fn from_document(document: Value) -> Result<Self> {
        if !document.is_object() {
            return Err(SdmxError::Document(
                "expected an object at the document root".to_string(),
            ));
        }
        Ok(Self::new(document))
    }

    /// Handle to the document root
    pub fn root(&self) -> JsonNode {
        JsonNode::root()
    }

    /// The underlying document
    pub fn document(&self) -> &Value {
        &self.document
    }

    fn value(&self, field: Field, node: &JsonNode) -> Option<&Value> {
        self.document
            .pointer(node.pointer())?
            .get(field.key())
            .filter(|v| !v.is_null())
    }
}

fn scalar(field: Field, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(SdmxError::MalformedScalar {
            field,
            value: other.to_string(),
            expected: "scalar",
        }),
    }
}

impl Reader for JsonReader {
    type Node = JsonNode;

    fn read_str(&self, field: Field, node: &JsonNode) -> Result<Option<String>> {
        match self.value(field, node) {
            None => Ok(None),
            Some(Value::Array(items)) => items.first().map(|v| scalar(field, v)).transpose(),
            Some(v) => scalar(field, v).map(Some),
        }
    }

    fn read_strs(&self, field: Field, node: &JsonNode) -> Result<Vec<String>> {
        match self.value(field, node) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items.iter().map(|v| scalar(field, v)).collect(),
            Some(v) => Ok(vec![scalar(field, v)?]),
        }
    }

    fn read_pairs(&self, field: Field, node: &JsonNode) -> Result<Vec<(String, String)>> {
        match self.value(field, node) {
            None => Ok(Vec::new()),
            Some(Value::Object(map)) => map
                .iter()
                .map(|(k, v)| Ok((k.clone(), scalar(field, v)?)))
                .collect(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    let id = item.get("id").map(|v| scalar(field, v)).transpose()?;
                    let value = item.get("value").map(|v| scalar(field, v)).transpose()?;
                    match (id, value) {
                        (Some(id), Some(value)) => Ok((id, value)),
                        _ => Err(SdmxError::MalformedScalar {
                            field,
                            value: item.to_string(),
                            expected: "id/value pair",
                        }),
                    }
                })
                .collect(),
            Some(other) => Err(SdmxError::MalformedScalar {
                field,
                value: other.to_string(),
                expected: "id/value pairs",
            }),
        }
    }

    fn localized(&self, field: Field, node: &JsonNode) -> Result<LocalizedText> {
        match self.value(field, node) {
            None => Ok(LocalizedText::default()),
            Some(Value::Object(map)) => map
                .iter()
                .map(|(lang, v)| Ok((lang.clone(), scalar(field, v)?)))
                .collect(),
            Some(v) => Ok(std::iter::once((UNDETERMINED_LANGUAGE.to_string(), scalar(field, v)?))
                .collect()),
        }
    }

    fn child(&self, field: Field, node: &JsonNode) -> Option<JsonNode> {
        match self.value(field, node)? {
            Value::Object(_) => Some(node.join(field.key())),
            Value::Array(items) if items.first().is_some_and(Value::is_object) => {
                Some(node.join(field.key()).index(0))
            }
            _ => None,
        }
    }

    fn children<'a>(
        &'a self,
        field: Field,
        node: &JsonNode,
    ) -> Box<dyn Iterator<Item = JsonNode> + 'a> {
        let base = node.join(field.key());
        match self.value(field, node) {
            Some(Value::Array(items)) => {
                let len = items.len();
                Box::new((0..len).map(move |i| base.index(i)))
            }
            Some(Value::Object(_)) => Box::new(std::iter::once(base)),
            _ => Box::new(std::iter::empty()),
        }
    }
}
