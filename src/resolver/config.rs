//! Options for reference resolution

use serde::{Deserialize, Serialize};

/// How a reference is resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolveOptions {
    /// Fall back to the transport when the target is not in the local message
    pub remote: bool,

    /// Return only the resolved artefact rather than the whole remote response.
    /// Ignored unless `remote` is set.
    pub target_only: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            remote: false,
            target_only: true,
        }
    }
}

impl ResolveOptions {
    /// Local lookup only
    pub fn new() -> Self {
        Self::default()
    }

    /// Local lookup with remote fallback returning the artefact
    pub fn remote() -> Self {
        Self::builder().remote(true).build()
    }

    pub fn builder() -> ResolveOptionsBuilder {
        ResolveOptionsBuilder::default()
    }
}

/// Builder for ResolveOptions
#[derive(Debug, Default)]
pub struct ResolveOptionsBuilder {
    options: ResolveOptions,
}

impl ResolveOptionsBuilder {
    /// Enable or disable the remote fallback
    pub fn remote(mut self, remote: bool) -> Self {
        self.options.remote = remote;
        self
    }

    /// Return the artefact only, or the whole remote response
    pub fn target_only(mut self, target_only: bool) -> Self {
        self.options.target_only = target_only;
        self
    }

    pub fn build(self) -> ResolveOptions {
        self.options
    }
}
