//! SDMX URN parsing
//!
//! `urn:sdmx:org.sdmx.infomodel.<package>.<Class>=<agency>:<id>(<version>)[.<item>]`

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

static URN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^urn:sdmx:org\.sdmx\.infomodel\.(?P<package>[a-z]+)\.(?P<class>[A-Za-z]+)=(?P<agency>[^:]+):(?P<id>[^(]+)\((?P<version>[^)]+)\)(?:\.(?P<item>.+))?$",
    )
    .unwrap()
});

/// The parts of an SDMX URN
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Urn {
    pub package: String,
    pub class: String,
    pub agency_id: String,
    /// Id of the maintainable artefact
    pub id: String,
    pub version: String,
    /// Id of the item or component inside the maintainable, if any
    pub item_id: Option<String>,
}

impl Urn {
    /// Split a URN into its parts; `None` if it is not an SDMX URN
    pub fn parse(urn: &str) -> Option<Self> {
        let caps = URN_REGEX.captures(urn.trim())?;
        Some(Self {
            package: caps["package"].to_string(),
            class: caps["class"].to_string(),
            agency_id: caps["agency"].to_string(),
            id: caps["id"].to_string(),
            version: caps["version"].to_string(),
            item_id: caps.name("item").map(|m| m.as_str().to_string()),
        })
    }

    /// Id of the artefact the URN points at
    pub fn target_id(&self) -> &str {
        self.item_id.as_deref().unwrap_or(&self.id)
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "urn:sdmx:org.sdmx.infomodel.{}.{}={}:{}({})",
            self.package, self.class, self.agency_id, self.id, self.version
        )?;
        if let Some(item) = &self.item_id {
            write!(f, ".{}", item)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_maintainable_urn() {
        let urn = Urn::parse("urn:sdmx:org.sdmx.infomodel.codelist.Codelist=ECB:CL_FREQ(1.0)").unwrap();
        assert_eq!(urn.package, "codelist");
        assert_eq!(urn.class, "Codelist");
        assert_eq!(urn.agency_id, "ECB");
        assert_eq!(urn.id, "CL_FREQ");
        assert_eq!(urn.version, "1.0");
        assert_eq!(urn.item_id, None);
        assert_eq!(urn.target_id(), "CL_FREQ");
    }

    #[test]
    fn test_parse_item_urn() {
        let raw = "urn:sdmx:org.sdmx.infomodel.conceptscheme.Concept=ECB:ECB_CONCEPTS(1.0).FREQ";
        let urn = Urn::parse(raw).unwrap();
        assert_eq!(urn.class, "Concept");
        assert_eq!(urn.id, "ECB_CONCEPTS");
        assert_eq!(urn.item_id.as_deref(), Some("FREQ"));
        assert_eq!(urn.target_id(), "FREQ");
        assert_eq!(urn.to_string(), raw);
    }

    #[test]
    fn test_reject_foreign_urn() {
        assert!(Urn::parse("urn:isbn:0451450523").is_none());
        assert!(Urn::parse("").is_none());
    }
}
