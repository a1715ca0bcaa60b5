//! Structure and data messages
//!
//! A message owns the whole artefact graph built from one decoded document.
//! Artefacts never reach into another message; cross-message references go
//! through the resolver's remote path.

use super::categorisation::CategorisationIndex;
use super::constraint::ContentConstraint;
use super::container::Container;
use super::item_scheme::{CategoryScheme, Codelist, ConceptScheme};
use super::reference::Ref;
use super::structure::{DataStructureDefinition, Dataflow, ProvisionAgreement};
use super::Identifiable;
use crate::data::DataSet;
use crate::error::{Result, SdmxError};
use crate::reader::{Field, FromReader, Reader, scalar};
use crate::resolver::{ResolveOptions, Resolved, Resolver};
use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Reads a party (sender, receiver) given either as a node with an id or as a scalar
fn read_party<R: Reader>(reader: &R, field: Field, node: &R::Node) -> Result<Option<String>> {
    match reader.child(field, node) {
        Some(party) => reader.read_str(Field::Id, &party),
        None => reader.read_str(field, node),
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Header {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prepared: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Structure the data in a data message conforms to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_by: Option<Ref>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dim_at_obs: Option<String>,
}

impl FromReader for Header {
    fn from_reader<R: Reader>(reader: &R, node: &R::Node) -> Result<Self> {
        Ok(Self {
            id: reader.read_str(Field::Id, node)?,
            prepared: reader.read_timestamp(Field::Prepared, node)?,
            sender: read_party(reader, Field::Sender, node)?,
            receiver: read_party(reader, Field::Receiver, node)?,
            error: reader.read_str(Field::HeaderError, node)?,
            structured_by: reader.read_instance(Field::Structure, node)?,
            dim_at_obs: reader.read_str(Field::DimensionAtObservation, node)?,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Footer {
    pub text: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
}

impl FromReader for Footer {
    fn from_reader<R: Reader>(reader: &R, node: &R::Node) -> Result<Self> {
        let code = reader
            .read_str(Field::Code, node)?
            .map(|raw| scalar::parse_int(Field::Code, &raw))
            .transpose()?;
        Ok(Self {
            text: reader.read_strs(Field::FooterText, node)?,
            severity: reader.read_str(Field::Severity, node)?,
            code,
        })
    }
}

/// A message carrying structural metadata
#[derive(Debug, Serialize)]
pub struct StructureMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<Header>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<Footer>,
    pub codelists: Container<Codelist>,
    pub concept_schemes: Container<ConceptScheme>,
    pub category_schemes: Container<CategoryScheme>,
    pub dataflows: Container<Dataflow>,
    pub data_structures: Container<DataStructureDefinition>,
    pub provision_agreements: Container<ProvisionAgreement>,
    pub constraints: Container<ContentConstraint>,
    pub categorisations: CategorisationIndex,
    /// Attachment urn to constraint ids, built on first use
    #[serde(skip)]
    constraint_index: OnceCell<HashMap<String, Vec<String>>>,
}

impl StructureMessage {
    /// Build every collection of the message rooted at `root`
    pub fn build<R: Reader>(reader: &R, root: &R::Node) -> Result<Self> {
        let message = Self {
            header: reader.read_instance(Field::Header, root)?,
            footer: reader.read_instance(Field::Footer, root)?,
            codelists: Container::read(reader, root, Field::Codelists, "codelists")?,
            concept_schemes: Container::read(reader, root, Field::ConceptSchemes, "concept schemes")?,
            category_schemes: Container::read(reader, root, Field::CategorySchemes, "category schemes")?,
            dataflows: Container::read(reader, root, Field::Dataflows, "dataflows")?,
            data_structures: Container::read(reader, root, Field::DataStructures, "data structures")?,
            provision_agreements: Container::read(
                reader,
                root,
                Field::ProvisionAgreements,
                "provision agreements",
            )?,
            constraints: Container::read(reader, root, Field::Constraints, "constraints")?,
            categorisations: CategorisationIndex::read(reader, root, Field::Categorisations)?,
            constraint_index: OnceCell::new(),
        };
        debug!(
            "Built structure message: {} codelists, {} concept schemes, {} category schemes, \
             {} dataflows, {} data structures, {} provision agreements, {} constraints, \
             {} categorisations",
            message.codelists.len(),
            message.concept_schemes.len(),
            message.category_schemes.len(),
            message.dataflows.len(),
            message.data_structures.len(),
            message.provision_agreements.len(),
            message.constraints.len(),
            message.categorisations.len()
        );
        Ok(message)
    }

    /// Resolve `reference` against this message, see [`Resolver::resolve`]
    pub fn resolve(&self, reference: &Ref, options: &ResolveOptions) -> Result<Resolved<'_>> {
        Resolver::new(self).resolve(reference, options)
    }

    /// Dataflows categorised under a category, in categorisation order.
    ///
    /// Categorisations whose dataflow is not in this message are skipped.
    pub fn categorised<'a>(
        &'a self,
        scheme_id: &str,
        category_id: &str,
    ) -> impl Iterator<Item = &'a Dataflow> + use<'a> {
        self.categorisations
            .get(scheme_id, category_id)
            .into_iter()
            .filter_map(move |categorisation| {
                let found = self.dataflows.get(&categorisation.artefact.id);
                if found.is_none() {
                    debug!(
                        "Skipping categorisation {}: dataflow {} not in message",
                        categorisation.id(),
                        categorisation.artefact.id
                    );
                }
                found
            })
    }

    /// Content constraints attached to `artefact`.
    ///
    /// An attachment counts when it resolves locally to an artefact with the
    /// same urn. The attachment index is computed once per message.
    pub fn constrained_by<A: Identifiable + ?Sized>(
        &self,
        artefact: &A,
    ) -> Result<Vec<&ContentConstraint>> {
        let index = self
            .constraint_index
            .get_or_try_init(|| self.index_constraints())?;
        Ok(index
            .get(artefact.urn())
            .map(|ids| ids.iter().filter_map(|id| self.constraints.get(id)).collect())
            .unwrap_or_default())
    }

    fn index_constraints(&self) -> Result<HashMap<String, Vec<String>>> {
        let resolver = Resolver::new(self);
        let mut index: HashMap<String, Vec<String>> = HashMap::new();
        for constraint in &self.constraints {
            let Some(attachment) = &constraint.attachment else {
                continue;
            };
            match resolver.lookup(attachment)? {
                Some(target) => index
                    .entry(target.urn().to_string())
                    .or_default()
                    .push(constraint.id().to_string()),
                None => debug!(
                    "Constraint {} is attached to {} which is not in this message",
                    constraint.id(),
                    attachment
                ),
            }
        }
        Ok(index)
    }
}

/// A message carrying one data set
pub struct DataMessage<'r, R: Reader> {
    pub header: Option<Header>,
    pub footer: Option<Footer>,
    pub data_set: Option<DataSet<'r, R>>,
}

impl<'r, R: Reader> DataMessage<'r, R> {
    /// Read header and footer; the data set itself is pulled lazily while iterated
    pub fn build(reader: &'r R, root: &R::Node) -> Result<Self> {
        let header: Option<Header> = reader.read_instance(Field::Header, root)?;
        let data_set = match reader.child(Field::DataSet, root) {
            Some(node) => {
                let dim_at_obs = reader
                    .read_str(Field::DimensionAtObservation, &node)?
                    .or_else(|| header.as_ref().and_then(|h| h.dim_at_obs.clone()));
                Some(DataSet::new(reader, node, dim_at_obs))
            }
            None => None,
        };
        Ok(Self {
            header,
            footer: reader.read_instance(Field::Footer, root)?,
            data_set,
        })
    }

    /// The data set, or an error when the message has none
    pub fn require_data_set(&self) -> Result<&DataSet<'r, R>> {
        self.data_set.as_ref().ok_or(SdmxError::MissingField {
            field: Field::DataSet,
            context: "data message",
        })
    }
}
