//! Reasoning artifact construction.
//!
//! Building is two-phase: [`ArtifactBuilder::draft`] validates every binding
//! and assembles the artifact with a blank identity, then
//! [`ArtifactDraft::seal`] hashes the draft and embeds the digest.

use crate::config::KernelConfig;
use crate::deployment::FingerprintContext;
use crate::error::{RakError, RakResult};
use crate::hash::{digest, HASH_ALGORITHM};
use crate::policy::assert_policy;
use crate::synthesis::{PersonaAssessment, ReasoningSynthesis, Uncertainty};
use crate::types::{
    ArtifactIdentity, ArtifactInputsDigests, ArtifactProvenance, ConfidenceLevel, ConsensusEntry,
    DisagreementEntry, Guarantees, HumanReview, PersonaArtifact, PersonaJudgment,
    PersonaProvenance, PersonaUncertainty, PositionEntry, ReasoningArtifact, SynthesisSection,
    UncertaintySource, VerificationHooks, ARTIFACT_VERSION,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Everything needed to build one reasoning artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildArtifactOptions {
    pub synthesis: ReasoningSynthesis,
    pub inputs: ArtifactInputsDigests,
    pub provenance: ArtifactProvenance,
    pub logical_time: u64,
    pub wall_time: Option<u64>,
    pub replay_seed: String,
    /// Input digest each persona reasoned over; defaults to `inputs.analytics`.
    pub persona_inputs: BTreeMap<String, String>,
    pub persona_types: BTreeMap<String, String>,
    pub human: Option<HumanReview>,
    pub external_adapter_usage: Vec<String>,
}

impl BuildArtifactOptions {
    pub fn new(
        synthesis: ReasoningSynthesis,
        inputs: ArtifactInputsDigests,
        provenance: ArtifactProvenance,
        logical_time: u64,
        replay_seed: impl Into<String>,
    ) -> Self {
        Self {
            synthesis,
            inputs,
            provenance,
            logical_time,
            wall_time: None,
            replay_seed: replay_seed.into(),
            persona_inputs: BTreeMap::new(),
            persona_types: BTreeMap::new(),
            human: None,
            external_adapter_usage: Vec::new(),
        }
    }
}

/// Fully validated artifact whose identity has not been computed yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactDraft {
    artifact: ReasoningArtifact,
}

impl ArtifactDraft {
    /// The unsealed artifact; `identity.artifact_id` is empty.
    pub fn artifact(&self) -> &ReasoningArtifact {
        &self.artifact
    }

    pub fn seal(self) -> RakResult<ReasoningArtifact> {
        let mut artifact = self.artifact;
        artifact.identity.artifact_id = artifact.compute_id()?;
        debug!(
            artifact_id = %artifact.identity.artifact_id,
            fingerprint_id = %artifact.provenance.deployment.fingerprint_id,
            personas = artifact.personas.len(),
            "reasoning artifact sealed"
        );
        Ok(artifact)
    }
}

/// Builds sealed reasoning artifacts.
#[derive(Debug, Clone, Default)]
pub struct ArtifactBuilder {
    config: KernelConfig,
}

impl ArtifactBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: KernelConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, options: BuildArtifactOptions) -> RakResult<ReasoningArtifact> {
        self.draft(options)?.seal()
    }

    pub fn draft(&self, options: BuildArtifactOptions) -> RakResult<ArtifactDraft> {
        let usage: Vec<String> = options
            .external_adapter_usage
            .iter()
            .filter(|u| !u.trim().is_empty())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        assert_policy(&options.provenance.external_adapters, &usage)?;

        let deployment = &options.provenance.deployment;
        deployment.verify(&FingerprintContext::default())?;

        let governance_hash = options.provenance.governance.snapshot_hash()?;
        if deployment.governance_snapshot_hash != governance_hash {
            return Err(RakError::BindingMismatch {
                binding: "governance_snapshot_hash".to_string(),
                expected: governance_hash,
                actual: deployment.governance_snapshot_hash.clone(),
            });
        }
        if deployment.genome_hash != options.provenance.genome_hash {
            return Err(RakError::BindingMismatch {
                binding: "genome_hash".to_string(),
                expected: describe(options.provenance.genome_hash.as_deref()),
                actual: describe(deployment.genome_hash.as_deref()),
            });
        }

        let assessments = &options.synthesis.assessments;
        if assessments.len() > self.config.max_personas {
            return Err(RakError::ResourceLimit {
                resource: "personas".to_string(),
                limit: self.config.max_personas,
                actual: assessments.len(),
            });
        }

        let personas = assessments
            .iter()
            .map(|assessment| persona_artifact(&options, assessment))
            .collect::<RakResult<Vec<_>>>()?;

        let disagreements = project_disagreements(&options.synthesis);
        for entry in &disagreements {
            entry.ensure_not_collapsed()?;
        }

        let uncertainties = if options.synthesis.uncertainties.is_empty() {
            vec![Uncertainty {
                id: "synthesis-uncertainty".to_string(),
                topic: "coverage".to_string(),
                description: "Uncertainty required".to_string(),
                signals: Vec::new(),
                severity: Some(ConfidenceLevel::Low),
            }]
        } else {
            options.synthesis.uncertainties.clone()
        };

        let mut provenance = options.provenance.clone();
        provenance.external_adapter_usage = usage;

        let artifact = ReasoningArtifact {
            identity: ArtifactIdentity {
                version_tag: ARTIFACT_VERSION.to_string(),
                artifact_id: String::new(),
                logical_time: options.logical_time,
                wall_time: options.wall_time,
            },
            provenance,
            inputs: options.inputs.clone(),
            personas,
            synthesis: SynthesisSection {
                consensus: consensus(assessments),
                disagreements,
                uncertainties,
            },
            guarantees: guarantees(),
            verification: verification_hooks(&options.replay_seed),
            human: options.human.clone(),
        };

        Ok(ArtifactDraft { artifact })
    }
}

/// Build and seal an artifact with the default configuration.
pub fn build_reasoning_artifact(options: BuildArtifactOptions) -> RakResult<ReasoningArtifact> {
    ArtifactBuilder::new().build(options)
}

fn describe(value: Option<&str>) -> String {
    value.unwrap_or("<none>").to_string()
}

fn persona_artifact(
    options: &BuildArtifactOptions,
    assessment: &PersonaAssessment,
) -> RakResult<PersonaArtifact> {
    let persona_type = options
        .persona_types
        .get(&assessment.persona)
        .cloned()
        .or_else(|| assessment.scope.clone())
        .unwrap_or_else(|| "unspecified".to_string());
    let inputs_digest = options
        .persona_inputs
        .get(&assessment.persona)
        .cloned()
        .unwrap_or_else(|| options.inputs.analytics.clone());

    let judgments = assessment
        .findings
        .iter()
        .map(|finding| {
            let topic = finding.effective_topic().to_string();
            let rationale = digest(&serde_json::json!({
                "signals": finding.signals,
                "assumptions": finding.assumptions,
                "provenance": finding.provenance.clone().unwrap_or_default(),
            }))?;
            Ok(PersonaJudgment {
                position: finding.position(&topic),
                topic,
                rationale_digests: vec![rationale],
            })
        })
        .collect::<RakResult<Vec<_>>>()?;

    Ok(PersonaArtifact {
        persona_id: assessment.persona.clone(),
        persona_type,
        inputs_digest,
        judgments,
        uncertainties: persona_uncertainties(&assessment.uncertainties),
        provenance: PersonaProvenance {
            origin: format!("phase-{}", options.provenance.phase),
            version: Some(options.provenance.phase.clone()),
        },
    })
}

fn persona_uncertainties(uncertainties: &[Uncertainty]) -> Vec<PersonaUncertainty> {
    if uncertainties.is_empty() {
        return vec![PersonaUncertainty {
            id: "unspecified-uncertainty".to_string(),
            topic: "unspecified".to_string(),
            confidence_level: ConfidenceLevel::Low,
            sources: vec![UncertaintySource::SignalGap],
            irreducible: true,
        }];
    }

    uncertainties
        .iter()
        .map(|u| PersonaUncertainty {
            id: u.id.clone(),
            topic: u.topic.clone(),
            confidence_level: u.severity.unwrap_or_default(),
            sources: vec![uncertainty_source(&u.signals)],
            irreducible: true,
        })
        .collect()
}

fn uncertainty_source(signals: &[String]) -> UncertaintySource {
    match signals.len() {
        0 => UncertaintySource::SignalGap,
        1 => UncertaintySource::Other,
        _ => UncertaintySource::SignalConflict,
    }
}

/// Positions reached by at least two distinct personas, ordered by topic.
fn consensus(assessments: &[PersonaAssessment]) -> Vec<ConsensusEntry> {
    let mut groups: BTreeMap<(String, String), BTreeSet<String>> = BTreeMap::new();
    for assessment in assessments {
        for finding in &assessment.findings {
            let topic = finding.effective_topic().to_string();
            let position = finding.position(&topic);
            groups
                .entry((topic, position))
                .or_default()
                .insert(assessment.persona.clone());
        }
    }

    groups
        .into_iter()
        .filter(|(_, personas)| personas.len() >= 2)
        .map(|((topic, position), personas)| ConsensusEntry {
            topic,
            position,
            personas: personas.into_iter().collect(),
        })
        .collect()
}

fn project_disagreements(synthesis: &ReasoningSynthesis) -> Vec<DisagreementEntry> {
    synthesis
        .disagreements
        .iter()
        .map(|entry| DisagreementEntry {
            topic: entry.topic.clone(),
            positions: entry
                .positions
                .iter()
                .map(|p| PositionEntry {
                    persona_id: p.persona.clone(),
                    position: p.finding.position(&entry.topic),
                })
                .collect(),
        })
        .collect()
}

fn guarantees() -> Guarantees {
    Guarantees {
        deterministic: true,
        replayable: true,
        non_agency: true,
        disclaimers: vec![
            "Artifact encodes reasoning only; no actions or interventions are produced."
                .to_string(),
            "Artifact does not guarantee correctness or completeness.".to_string(),
            "Artifact does not imply real-world outcomes.".to_string(),
        ],
    }
}

fn verification_hooks(replay_seed: &str) -> VerificationHooks {
    VerificationHooks {
        hash_algorithm: HASH_ALGORITHM.to_string(),
        replay_seed: replay_seed.to_string(),
        steps: vec![
            "Recompute deterministic hash of artifact body (excluding artifact_id).".to_string(),
            "Compare recomputed hash to artifact_id for integrity.".to_string(),
            "Validate governance snapshot hashes against expected registry and evolution digests."
                .to_string(),
            "Validate deployment fingerprint hash, environment, and governance binding."
                .to_string(),
            "Confirm replay_seed matches observed replay inputs.".to_string(),
        ],
    }
}
