//! Reference resolution
//!
//! A [`Ref`] is looked up in the owning message first: its class picks the
//! collection, a maintainable parent id descends into that scheme, and the id
//! picks the artefact. Any miss along that path is simply absence. When the
//! caller asks for it, a miss falls back to a [`Transport`] and the same
//! lookup runs against the fetched message.

pub mod config;

use crate::error::{Result, SdmxError};
use crate::models::{
    Categorisation, Category, CategoryScheme, Code, Codelist, Concept, ConceptScheme,
    ContentConstraint, DataStructureDefinition, Dataflow, Identifiable, Identity,
    ProvisionAgreement, Ref, StructureMessage,
};
use crate::transport::{ResourceRequest, ResourceType, Response, Transport};
use std::borrow::Cow;
use tracing::{debug, info};

pub use config::{ResolveOptions, ResolveOptionsBuilder};

/// Map a class tag onto its collection; the flag marks item classes,
/// which live inside a scheme and need a maintainable parent id
pub fn classify(class: &str) -> Result<(ResourceType, bool)> {
    let target = match class {
        "Dataflow" => (ResourceType::Dataflow, false),
        "Codelist" => (ResourceType::Codelist, false),
        "Code" => (ResourceType::Codelist, true),
        "ConceptScheme" => (ResourceType::ConceptScheme, false),
        "Concept" => (ResourceType::ConceptScheme, true),
        "CategoryScheme" => (ResourceType::CategoryScheme, false),
        "Category" => (ResourceType::CategoryScheme, true),
        "DataStructure" => (ResourceType::DataStructure, false),
        "ProvisionAgreement" => (ResourceType::ProvisionAgreement, false),
        "ContentConstraint" => (ResourceType::ContentConstraint, false),
        "Categorisation" => (ResourceType::Categorisation, false),
        other => {
            return Err(SdmxError::UnsupportedReference {
                class: other.to_string(),
            });
        }
    };
    Ok(target)
}

/// A resolved artefact, borrowed from the local message or owned when fetched
#[derive(Debug, Clone)]
pub enum Artefact<'a> {
    Dataflow(Cow<'a, Dataflow>),
    Codelist(Cow<'a, Codelist>),
    Code(Cow<'a, Code>),
    ConceptScheme(Cow<'a, ConceptScheme>),
    Concept(Cow<'a, Concept>),
    CategoryScheme(Cow<'a, CategoryScheme>),
    Category(Cow<'a, Category>),
    DataStructure(Cow<'a, DataStructureDefinition>),
    ProvisionAgreement(Cow<'a, ProvisionAgreement>),
    ContentConstraint(Cow<'a, ContentConstraint>),
    Categorisation(Cow<'a, Categorisation>),
}

impl Identifiable for Artefact<'_> {
    fn identity(&self) -> &Identity {
        match self {
            Artefact::Dataflow(a) => a.identity(),
            Artefact::Codelist(a) => a.identity(),
            Artefact::Code(a) => a.identity(),
            Artefact::ConceptScheme(a) => a.identity(),
            Artefact::Concept(a) => a.identity(),
            Artefact::CategoryScheme(a) => a.identity(),
            Artefact::Category(a) => a.identity(),
            Artefact::DataStructure(a) => a.identity(),
            Artefact::ProvisionAgreement(a) => a.identity(),
            Artefact::ContentConstraint(a) => a.identity(),
            Artefact::Categorisation(a) => a.identity(),
        }
    }
}

impl Artefact<'_> {
    /// Detach from the message the artefact was found in
    pub fn into_owned(self) -> Artefact<'static> {
        fn owned<T: Clone + 'static>(cow: Cow<'_, T>) -> Cow<'static, T> {
            Cow::Owned(cow.into_owned())
        }
        match self {
            Artefact::Dataflow(a) => Artefact::Dataflow(owned(a)),
            Artefact::Codelist(a) => Artefact::Codelist(owned(a)),
            Artefact::Code(a) => Artefact::Code(owned(a)),
            Artefact::ConceptScheme(a) => Artefact::ConceptScheme(owned(a)),
            Artefact::Concept(a) => Artefact::Concept(owned(a)),
            Artefact::CategoryScheme(a) => Artefact::CategoryScheme(owned(a)),
            Artefact::Category(a) => Artefact::Category(owned(a)),
            Artefact::DataStructure(a) => Artefact::DataStructure(owned(a)),
            Artefact::ProvisionAgreement(a) => Artefact::ProvisionAgreement(owned(a)),
            Artefact::ContentConstraint(a) => Artefact::ContentConstraint(owned(a)),
            Artefact::Categorisation(a) => Artefact::Categorisation(owned(a)),
        }
    }

    /// True when the artefact was found in the local message
    pub fn is_local(&self) -> bool {
        match self {
            Artefact::Dataflow(a) => matches!(a, Cow::Borrowed(_)),
            Artefact::Codelist(a) => matches!(a, Cow::Borrowed(_)),
            Artefact::Code(a) => matches!(a, Cow::Borrowed(_)),
            Artefact::ConceptScheme(a) => matches!(a, Cow::Borrowed(_)),
            Artefact::Concept(a) => matches!(a, Cow::Borrowed(_)),
            Artefact::CategoryScheme(a) => matches!(a, Cow::Borrowed(_)),
            Artefact::Category(a) => matches!(a, Cow::Borrowed(_)),
            Artefact::DataStructure(a) => matches!(a, Cow::Borrowed(_)),
            Artefact::ProvisionAgreement(a) => matches!(a, Cow::Borrowed(_)),
            Artefact::ContentConstraint(a) => matches!(a, Cow::Borrowed(_)),
            Artefact::Categorisation(a) => matches!(a, Cow::Borrowed(_)),
        }
    }
}

/// Outcome of resolving a reference
#[derive(Debug)]
pub enum Resolved<'a> {
    /// Not found; a normal outcome for optional references
    Absent,
    Artefact(Artefact<'a>),
    /// The whole remote response, when the caller did not ask for the target only
    Response(Box<Response>),
}

impl<'a> Resolved<'a> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Resolved::Absent)
    }

    pub fn artefact(&self) -> Option<&Artefact<'a>> {
        match self {
            Resolved::Artefact(artefact) => Some(artefact),
            _ => None,
        }
    }

    pub fn into_artefact(self) -> Option<Artefact<'a>> {
        match self {
            Resolved::Artefact(artefact) => Some(artefact),
            _ => None,
        }
    }
}

/// Resolves references against one message, optionally backed by a transport
pub struct Resolver<'a> {
    message: &'a StructureMessage,
    transport: Option<&'a dyn Transport>,
}

impl<'a> Resolver<'a> {
    pub fn new(message: &'a StructureMessage) -> Self {
        Self {
            message,
            transport: None,
        }
    }

    /// Use `transport` for remote fallback
    pub fn with_transport(mut self, transport: &'a dyn Transport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Look `reference` up in the local message only
    pub fn lookup(&self, reference: &Ref) -> Result<Option<Artefact<'a>>> {
        lookup_in(self.message, reference)
    }

    /// Resolve `reference`.
    ///
    /// A local hit never touches the transport. A local miss is
    /// [`Resolved::Absent`] unless `options.remote` is set, in which case the
    /// transport is called once and its errors are returned as they are.
    pub fn resolve(&self, reference: &Ref, options: &ResolveOptions) -> Result<Resolved<'a>> {
        let (resource, _) = classify(&reference.class)?;
        if let Some(found) = self.lookup(reference)? {
            return Ok(Resolved::Artefact(found));
        }
        debug!("{} not found in local message", reference);
        if !options.remote {
            return Ok(Resolved::Absent);
        }

        let transport = self.transport.ok_or(SdmxError::TransportUnavailable)?;
        let request = ResourceRequest {
            resource,
            id: reference
                .maintainable_parent_id
                .clone()
                .unwrap_or_else(|| reference.id.clone()),
            agency_id: reference.agency_id.clone(),
        };
        info!(
            "Fetching {} {} from remote service for {}",
            request.resource, request.id, reference
        );
        let response = transport.fetch(&request)?;

        if !options.target_only {
            return Ok(Resolved::Response(Box::new(response)));
        }
        Ok(match lookup_in(&response.message, reference)? {
            Some(found) => Resolved::Artefact(found.into_owned()),
            None => {
                debug!("{} not found in remote response either", reference);
                Resolved::Absent
            }
        })
    }
}

fn lookup_in<'m>(message: &'m StructureMessage, reference: &Ref) -> Result<Option<Artefact<'m>>> {
    let (resource, is_item) = classify(&reference.class)?;
    let id = reference.id.as_str();
    let found = match (resource, reference.maintainable_parent_id.as_deref()) {
        (ResourceType::Codelist, Some(parent)) => message
            .codelists
            .get(parent)
            .and_then(|scheme| scheme.get(id))
            .map(|item| Artefact::Code(Cow::Borrowed(item))),
        (ResourceType::ConceptScheme, Some(parent)) => message
            .concept_schemes
            .get(parent)
            .and_then(|scheme| scheme.get(id))
            .map(|item| Artefact::Concept(Cow::Borrowed(item))),
        (ResourceType::CategoryScheme, Some(parent)) => message
            .category_schemes
            .get(parent)
            .and_then(|scheme| scheme.get(id))
            .map(|item| Artefact::Category(Cow::Borrowed(item))),
        (_, Some(_)) => None,
        (_, None) if is_item => None,
        (ResourceType::Dataflow, None) => message
            .dataflows
            .get(id)
            .map(|a| Artefact::Dataflow(Cow::Borrowed(a))),
        (ResourceType::Codelist, None) => message
            .codelists
            .get(id)
            .map(|a| Artefact::Codelist(Cow::Borrowed(a))),
        (ResourceType::ConceptScheme, None) => message
            .concept_schemes
            .get(id)
            .map(|a| Artefact::ConceptScheme(Cow::Borrowed(a))),
        (ResourceType::CategoryScheme, None) => message
            .category_schemes
            .get(id)
            .map(|a| Artefact::CategoryScheme(Cow::Borrowed(a))),
        (ResourceType::DataStructure, None) => message
            .data_structures
            .get(id)
            .map(|a| Artefact::DataStructure(Cow::Borrowed(a))),
        (ResourceType::ProvisionAgreement, None) => message
            .provision_agreements
            .get(id)
            .map(|a| Artefact::ProvisionAgreement(Cow::Borrowed(a))),
        (ResourceType::ContentConstraint, None) => message
            .constraints
            .get(id)
            .map(|a| Artefact::ContentConstraint(Cow::Borrowed(a))),
        (ResourceType::Categorisation, None) => message
            .categorisations
            .find(id)
            .map(|a| Artefact::Categorisation(Cow::Borrowed(a))),
    };
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify("Code").unwrap(), (ResourceType::Codelist, true));
        assert_eq!(classify("DataStructure").unwrap(), (ResourceType::DataStructure, false));
        assert!(matches!(
            classify("HierarchicalCodelist"),
            Err(SdmxError::UnsupportedReference { .. })
        ));
    }
}
