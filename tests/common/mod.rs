//! Shared fixtures for RAK integration tests.
#![allow(dead_code)]

use rak::{
    build_reasoning_artifact, default_policy, ArtifactInputsDigests, ArtifactProvenance,
    BuildArtifactOptions, ConfigHashEntry, DeploymentEnvironment, DeploymentFingerprint,
    EnvironmentClassification, Finding, FingerprintInputs, GovernanceSnapshot, PersonaAssessment,
    ReasoningArtifact, ReasoningSynthesis, Uncertainty,
};
use std::collections::BTreeMap;

pub fn governance() -> GovernanceSnapshot {
    GovernanceSnapshot::new("registry-hash", "evolution-hash")
}

pub fn fingerprint_inputs(commit: &str) -> FingerprintInputs {
    let mut schemas = BTreeMap::new();
    schemas.insert("reasoning-artifact".to_string(), "v1".to_string());
    schemas.insert("full-disclosure-audit".to_string(), "v1".to_string());

    let mut inputs = FingerprintInputs::new(
        DeploymentEnvironment::labeled(EnvironmentClassification::Staging, "staging-blue"),
        commit,
        schemas,
        governance().snapshot_hash().expect("governance digest"),
    );
    inputs.build_id = Some("build-456".to_string());
    inputs.config_hashes = vec![
        ConfigHashEntry::new("reasoning.timeout.ms", "100"),
        ConfigHashEntry::new("reasoning.parallelism", "2"),
    ];
    inputs
}

pub fn fingerprint() -> DeploymentFingerprint {
    DeploymentFingerprint::build(fingerprint_inputs("commit-123")).expect("fingerprint")
}

pub fn provenance_for(deployment: DeploymentFingerprint) -> ArtifactProvenance {
    ArtifactProvenance {
        system: "bookiji".to_string(),
        system_version: "1.0.0".to_string(),
        phase: "12".to_string(),
        genome_hash: None,
        governance: governance(),
        deployment,
        external_adapters: default_policy().clone(),
        external_adapter_usage: Vec::new(),
    }
}

pub fn inputs() -> ArtifactInputsDigests {
    ArtifactInputsDigests {
        analytics: "digest-analytics".to_string(),
        simcity: Some("digest-simcity".to_string()),
        audit: Some("digest-audit".to_string()),
        trust: Some("digest-trust".to_string()),
    }
}

pub fn finding(id: &str, topic: &str, summary: &str, judgment: &str) -> Finding {
    let mut finding = Finding::new(id, topic, summary, judgment);
    finding.signals = vec!["p95".to_string()];
    finding
}

/// Two personas disagreeing on latency; one reports an uncertainty.
pub fn latency_synthesis() -> ReasoningSynthesis {
    let mut reliability = PersonaAssessment::new(
        "reliability",
        vec![finding("rel-lat", "latency", "latency increasing", "risk")],
    );
    reliability.scope = Some("reliability".to_string());
    let mut uncertainty = Uncertainty::new("rel-uncertainty", "latency", "p95 window limited");
    uncertainty.signals = vec!["p95".to_string()];
    reliability.uncertainties = vec![uncertainty];

    let mut governance = PersonaAssessment::new(
        "governance",
        vec![finding("gov-lat", "latency", "latency acceptable", "observation")],
    );
    governance.scope = Some("governance".to_string());

    ReasoningSynthesis::from_assessments("Is latency stable?", vec![reliability, governance])
}

pub fn options_with(
    synthesis: ReasoningSynthesis,
    deployment: DeploymentFingerprint,
    logical_time: u64,
) -> BuildArtifactOptions {
    let mut options = BuildArtifactOptions::new(
        synthesis,
        inputs(),
        provenance_for(deployment),
        logical_time,
        format!("seed-{}", logical_time),
    );
    options
        .persona_inputs
        .insert("reliability".to_string(), "digest-analytics".to_string());
    options
        .persona_inputs
        .insert("governance".to_string(), "digest-governance".to_string());
    options
}

pub fn options(logical_time: u64) -> BuildArtifactOptions {
    options_with(latency_synthesis(), fingerprint(), logical_time)
}

pub fn artifact(logical_time: u64) -> ReasoningArtifact {
    build_reasoning_artifact(options(logical_time)).expect("artifact should build")
}

/// Recompute the artifact id after a deliberate mutation.
pub fn reseal(mut artifact: ReasoningArtifact) -> ReasoningArtifact {
    artifact.identity.artifact_id = artifact.compute_id().expect("recompute id");
    artifact
}
