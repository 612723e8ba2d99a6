//! Capability names advertised by language services.
//!
//! A capability is a named boolean feature. Services answer
//! [`LanguageService::supports`](crate::service::LanguageService::supports)
//! for a [`Capability`]; [`CapabilitySet`] is a ready-made answer built from
//! an LSP `ServerCapabilities` object.

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Features a language service may advertise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    /// Highlighting related occurrences of the symbol under the cursor
    #[default]
    DocumentHighlight,
    Hover,
    Definition,
    References,
    Rename,
    Formatting,
    CodeAction,
    SignatureHelp,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::DocumentHighlight => "documentHighlight",
            Capability::Hover => "hover",
            Capability::Definition => "definition",
            Capability::References => "references",
            Capability::Rename => "rename",
            Capability::Formatting => "formatting",
            Capability::CodeAction => "codeAction",
            Capability::SignatureHelp => "signatureHelp",
        }
    }

    /// Key of this capability inside an LSP `ServerCapabilities` object.
    pub fn provider_key(&self) -> &'static str {
        match self {
            Capability::DocumentHighlight => "documentHighlightProvider",
            Capability::Hover => "hoverProvider",
            Capability::Definition => "definitionProvider",
            Capability::References => "referencesProvider",
            Capability::Rename => "renameProvider",
            Capability::Formatting => "documentFormattingProvider",
            Capability::CodeAction => "codeActionProvider",
            Capability::SignatureHelp => "signatureHelpProvider",
        }
    }

    pub fn all() -> &'static [Capability] {
        &[
            Capability::DocumentHighlight,
            Capability::Hover,
            Capability::Definition,
            Capability::References,
            Capability::Rename,
            Capability::Formatting,
            Capability::CodeAction,
            Capability::SignatureHelp,
        ]
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown capability: {0}")]
pub struct UnknownCapability(pub String);

impl FromStr for Capability {
    type Err = UnknownCapability;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::all()
            .iter()
            .find(|c| c.as_str() == s || c.provider_key() == s)
            .copied()
            .ok_or_else(|| UnknownCapability(s.to_string()))
    }
}

/// A fixed set of advertised capabilities.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    capabilities: HashSet<Capability>,
}

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    pub fn insert(&mut self, capability: Capability) -> bool {
        self.capabilities.insert(capability)
    }

    pub fn remove(&mut self, capability: Capability) -> bool {
        self.capabilities.remove(&capability)
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// Reads an LSP `ServerCapabilities` object.
    ///
    /// Provider fields are `boolean | Options`: `true` or any object counts as
    /// supported, `false`, `null` and a missing key do not.
    pub fn from_server_capabilities(value: &Value) -> Self {
        let capabilities = Capability::all()
            .iter()
            .filter(|c| match value.get(c.provider_key()) {
                None | Some(Value::Null) | Some(Value::Bool(false)) => false,
                Some(_) => true,
            })
            .copied()
            .collect();
        Self { capabilities }
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self {
            capabilities: iter.into_iter().collect(),
        }
    }
}
