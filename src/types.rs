//! Core data types for reasoning artifacts.

use crate::deployment::DeploymentFingerprint;
use crate::error::{RakError, RakResult};
use crate::hash::digest;
use crate::policy::ExternalAdapterPolicy;
use crate::synthesis::Uncertainty;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const ARTIFACT_VERSION: &str = "reasoning-artifact/v1";

/// Opaque digests of the external governance state reasoning was bound to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GovernanceSnapshot {
    pub registry_hash: String,
    pub evolution_hash: String,
}

impl GovernanceSnapshot {
    pub fn new(registry_hash: impl Into<String>, evolution_hash: impl Into<String>) -> Self {
        Self {
            registry_hash: registry_hash.into(),
            evolution_hash: evolution_hash.into(),
        }
    }

    /// Value a deployment fingerprint must carry as `governance_snapshot_hash`.
    pub fn snapshot_hash(&self) -> RakResult<String> {
        digest(self)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    #[default]
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UncertaintySource {
    SignalGap,
    SignalConflict,
    SyntheticContext,
    GovernanceBlock,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersonaJudgment {
    pub topic: String,
    /// `topic:judgment:summary`; identical reasoning yields an identical string.
    pub position: String,
    pub rationale_digests: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersonaUncertainty {
    pub id: String,
    pub topic: String,
    pub confidence_level: ConfidenceLevel,
    pub sources: Vec<UncertaintySource>,
    pub irreducible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersonaProvenance {
    pub origin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersonaArtifact {
    pub persona_id: String,
    pub persona_type: String,
    pub inputs_digest: String,
    pub judgments: Vec<PersonaJudgment>,
    pub uncertainties: Vec<PersonaUncertainty>,
    pub provenance: PersonaProvenance,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConsensusEntry {
    pub topic: String,
    pub position: String,
    pub personas: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PositionEntry {
    pub persona_id: String,
    pub position: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisagreementEntry {
    pub topic: String,
    pub positions: Vec<PositionEntry>,
}

impl DisagreementEntry {
    pub fn distinct_positions(&self) -> usize {
        self.positions
            .iter()
            .map(|p| p.position.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Fail unless the entry still records more than one distinct position.
    pub fn ensure_not_collapsed(&self) -> RakResult<()> {
        let distinct = self.distinct_positions();
        if self.positions.len() <= 1 || distinct <= 1 {
            return Err(RakError::CollapsedDisagreement {
                topic: self.topic.clone(),
                distinct_positions: distinct,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SynthesisSection {
    pub consensus: Vec<ConsensusEntry>,
    pub disagreements: Vec<DisagreementEntry>,
    pub uncertainties: Vec<Uncertainty>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactProvenance {
    pub system: String,
    pub system_version: String,
    pub phase: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genome_hash: Option<String>,
    pub governance: GovernanceSnapshot,
    pub deployment: DeploymentFingerprint,
    pub external_adapters: ExternalAdapterPolicy,
    #[serde(default)]
    pub external_adapter_usage: Vec<String>,
}

/// Digests identifying the input state that was reasoned over.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactInputsDigests {
    pub analytics: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simcity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust: Option<String>,
}

impl ArtifactInputsDigests {
    pub fn new(analytics: impl Into<String>) -> Self {
        Self {
            analytics: analytics.into(),
            simcity: None,
            audit: None,
            trust: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactIdentity {
    pub version_tag: String,
    pub artifact_id: String,
    pub logical_time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wall_time: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Guarantees {
    pub deterministic: bool,
    pub replayable: bool,
    pub non_agency: bool,
    pub disclaimers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerificationHooks {
    pub hash_algorithm: String,
    pub replay_seed: String,
    pub steps: Vec<String>,
}

/// Optional human review attached at build time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HumanReview {
    pub reviewer: String,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<u64>,
}

/// Sealed, content-addressed record of one multi-persona reasoning pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReasoningArtifact {
    pub identity: ArtifactIdentity,
    pub provenance: ArtifactProvenance,
    pub inputs: ArtifactInputsDigests,
    pub personas: Vec<PersonaArtifact>,
    pub synthesis: SynthesisSection,
    pub guarantees: Guarantees,
    pub verification: VerificationHooks,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human: Option<HumanReview>,
}

impl ReasoningArtifact {
    pub fn artifact_id(&self) -> &str {
        &self.identity.artifact_id
    }

    /// Digest of the artifact with `identity.artifact_id` blanked.
    pub fn compute_id(&self) -> RakResult<String> {
        let mut blank = self.clone();
        blank.identity.artifact_id = String::new();
        digest(&blank)
    }

    /// `artifact_id:topic` for every recorded disagreement.
    pub fn disagreement_keys(&self) -> impl Iterator<Item = String> + '_ {
        self.synthesis
            .disagreements
            .iter()
            .map(move |d| format!("{}:{}", self.identity.artifact_id, d.topic))
    }

    /// `artifact_id:uncertainty_id` for every recorded uncertainty.
    pub fn uncertainty_keys(&self) -> impl Iterator<Item = String> + '_ {
        self.synthesis
            .uncertainties
            .iter()
            .map(move |u| format!("{}:{}", self.identity.artifact_id, u.id))
    }
}
