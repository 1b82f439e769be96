//! Policy for external orchestration adapters.
//!
//! Adapters are recorded as data, never trusted as authority. The same
//! [`assert_policy`] check runs when an artifact is built and when it is
//! verified.

use crate::error::{RakError, RakResult};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Integrations known to the kernel. None of them may contribute reasoning.
pub const KNOWN_EXTERNAL_ADAPTERS: [&str; 6] =
    ["autogen", "crewai", "langchain", "langgraph", "n8n", "zapier"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExternalAdapterPolicyEntry {
    pub name: String,
    pub authoritative: bool,
    pub emits_reasoning_artifacts: bool,
    pub bypasses_governance: bool,
    pub bypasses_determinism: bool,
    pub bypasses_consent: bool,
}

impl ExternalAdapterPolicyEntry {
    /// The only entry shape the policy accepts: every flag false.
    pub fn non_authoritative(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            authoritative: false,
            emits_reasoning_artifacts: false,
            bypasses_governance: false,
            bypasses_determinism: false,
            bypasses_consent: false,
        }
    }

    /// Name of the first flag this entry illegally sets, if any.
    fn violated_flag(&self) -> Option<&'static str> {
        [
            ("authoritative", self.authoritative),
            ("emits_reasoning_artifacts", self.emits_reasoning_artifacts),
            ("bypasses_governance", self.bypasses_governance),
            ("bypasses_determinism", self.bypasses_determinism),
            ("bypasses_consent", self.bypasses_consent),
        ]
        .into_iter()
        .find(|(_, set)| *set)
        .map(|(flag, _)| flag)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExternalAdapterPolicy {
    pub entries: Vec<ExternalAdapterPolicyEntry>,
    pub notes: Vec<String>,
}

impl ExternalAdapterPolicy {
    pub fn new(entries: Vec<ExternalAdapterPolicyEntry>, notes: Vec<String>) -> Self {
        Self { entries, notes }
    }

    pub fn entry(&self, name: &str) -> Option<&ExternalAdapterPolicyEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

static DEFAULT_POLICY: OnceLock<ExternalAdapterPolicy> = OnceLock::new();

/// The fixed policy shipped with the kernel.
pub fn default_policy() -> &'static ExternalAdapterPolicy {
    DEFAULT_POLICY.get_or_init(|| ExternalAdapterPolicy {
        entries: KNOWN_EXTERNAL_ADAPTERS
            .iter()
            .map(|name| ExternalAdapterPolicyEntry::non_authoritative(*name))
            .collect(),
        notes: vec![
            "External adapters are non-authoritative and never emit reasoning artifacts."
                .to_string(),
            "Adapters cannot bypass governance, determinism, or consent.".to_string(),
            "Any recorded adapter usage invalidates the artifact.".to_string(),
        ],
    })
}

/// Reject policies that grant authority and any recorded adapter usage.
pub fn assert_policy(policy: &ExternalAdapterPolicy, usage: &[String]) -> RakResult<()> {
    for entry in &policy.entries {
        if let Some(flag) = entry.violated_flag() {
            return Err(RakError::PolicyViolation {
                adapter: entry.name.clone(),
                reason: format!("'{}' must be false", flag),
            });
        }
    }

    if let Some(used) = usage.iter().find(|u| !u.trim().is_empty()) {
        return Err(RakError::PolicyViolation {
            adapter: used.clone(),
            reason: "external adapters are non-authoritative and cannot contribute reasoning"
                .to_string(),
        });
    }

    Ok(())
}
