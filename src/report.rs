//! Full-disclosure audit reports aggregating reasoning artifacts.
//!
//! A report embeds every artifact verbatim, lists each disagreement and
//! uncertainty they carry, and closes over their input digests so that a
//! verifier can prove nothing was dropped between the artifacts and the
//! report.

use crate::config::KernelConfig;
use crate::deployment::{
    ConfigHashEntry, DeploymentEnvironment, DeploymentFingerprint, FingerprintContext,
};
use crate::error::{RakError, RakResult};
use crate::hash::{digest, is_canonical_digest};
use crate::types::{ArtifactInputsDigests, GovernanceSnapshot, ReasoningArtifact};
use crate::verifier::{ArtifactVerificationContext, ArtifactVerifier};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

pub const REPORT_VERSION: &str = "full-disclosure-audit/v1";

/// Fallback irreducible uncertainty when no artifact lists one.
pub const UNSPECIFIED_UNCERTAINTY: &str = "uncertainty:unspecified";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactEvidence {
    pub artifact: ReasoningArtifact,
    pub artifact_hash: String,
    pub governance: GovernanceSnapshot,
    pub deployment: DeploymentFingerprint,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InputClosureEntry {
    pub artifact_id: String,
    pub digests: ArtifactInputsDigests,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InputClosure {
    pub inputs: Vec<InputClosureEntry>,
    pub closed_world: String,
    pub hash_closure: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SystemPosture {
    pub system_version: String,
    pub active_phases: Vec<String>,
    pub non_capabilities: Vec<String>,
    pub invariants: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReasoningEvidence {
    pub artifacts: Vec<ArtifactEvidence>,
    pub preserved_disagreements: Vec<String>,
    pub preserved_uncertainties: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeploymentDisclosure {
    pub fingerprint: DeploymentFingerprint,
    pub environment: DeploymentEnvironment,
    pub config_hashes: Vec<ConfigHashEntry>,
    pub determinism: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisclosureLimits {
    pub non_claims: Vec<String>,
    pub blind_spots: Vec<String>,
    pub irreducible_uncertainty: Vec<String>,
}

impl DisclosureLimits {
    pub fn ensure_complete(&self) -> RakResult<()> {
        for (list, values) in [
            ("non_claims", &self.non_claims),
            ("blind_spots", &self.blind_spots),
            ("irreducible_uncertainty", &self.irreducible_uncertainty),
        ] {
            if values.is_empty() {
                return Err(RakError::IncompleteLimits { list: list.to_string() });
            }
        }
        Ok(())
    }
}

/// Caller overrides for the disclosed limits; `None` keeps the default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LimitsOverride {
    pub non_claims: Option<Vec<String>>,
    pub blind_spots: Option<Vec<String>>,
    pub irreducible_uncertainty: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportVerification {
    pub instructions: Vec<String>,
    pub invalid_conditions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FullDisclosureAuditReport {
    pub version_tag: String,
    pub report_id: String,
    pub issued_at: u64,
    pub machine_generated: bool,
    pub system_posture: SystemPosture,
    pub reasoning_evidence: ReasoningEvidence,
    pub input_closure: InputClosure,
    pub deployment_disclosure: DeploymentDisclosure,
    pub limits: DisclosureLimits,
    pub verification: ReportVerification,
}

impl FullDisclosureAuditReport {
    /// Digest of the report with `report_id` blanked.
    pub fn compute_id(&self) -> RakResult<String> {
        let mut blank = self.clone();
        blank.report_id = String::new();
        digest(&blank)
    }
}

/// Inputs for [`AuditReportBuilder::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    pub system_version: String,
    pub active_phases: Vec<String>,
    pub artifacts: Vec<ReasoningArtifact>,
    pub deployment: DeploymentFingerprint,
    pub invariants: Option<Vec<String>>,
    pub non_capabilities: Option<Vec<String>>,
    pub limits: LimitsOverride,
    /// Milliseconds since the Unix epoch; defaults to now.
    pub issued_at: Option<u64>,
}

impl ReportOptions {
    pub fn new(
        system_version: impl Into<String>,
        artifacts: Vec<ReasoningArtifact>,
        deployment: DeploymentFingerprint,
    ) -> Self {
        Self {
            system_version: system_version.into(),
            active_phases: Vec::new(),
            artifacts,
            deployment,
            invariants: None,
            non_capabilities: None,
            limits: LimitsOverride::default(),
            issued_at: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportVerificationContext {
    pub expected_deployment_fingerprint_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AuditReportBuilder {
    config: KernelConfig,
}

impl AuditReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: KernelConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, options: ReportOptions) -> RakResult<FullDisclosureAuditReport> {
        if options.artifacts.is_empty() {
            return Err(RakError::validation(
                "artifacts",
                "at least one reasoning artifact is required for an audit report",
            ));
        }
        if options.artifacts.len() > self.config.max_report_artifacts {
            return Err(RakError::ResourceLimit {
                resource: "report_artifacts".to_string(),
                limit: self.config.max_report_artifacts,
                actual: options.artifacts.len(),
            });
        }

        let deployment = &options.deployment;
        deployment.verify(&FingerprintContext::default())?;

        let verifier = ArtifactVerifier::with_config(self.config.clone());
        let mut evidence = Vec::with_capacity(options.artifacts.len());
        for artifact in &options.artifacts {
            let bound = &artifact.provenance.deployment.fingerprint_id;
            if bound != &deployment.fingerprint_id {
                return Err(RakError::DeploymentBindingMismatch {
                    artifact_id: artifact.identity.artifact_id.clone(),
                    expected: deployment.fingerprint_id.clone(),
                    actual: bound.clone(),
                });
            }
            verifier.verify(artifact, &self_bound_context(artifact, deployment))?;
            evidence.push(ArtifactEvidence {
                artifact: artifact.clone(),
                artifact_hash: artifact.identity.artifact_id.clone(),
                governance: artifact.provenance.governance.clone(),
                deployment: artifact.provenance.deployment.clone(),
            });
        }

        let disagreements = collect_disagreements(&options.artifacts);
        let uncertainties = collect_uncertainties(&options.artifacts);
        let inputs = closure_inputs(&options.artifacts);
        let hash_closure = closure_hash(&inputs)?;
        let limits = build_limits(&uncertainties, options.limits)?;

        let mut report = FullDisclosureAuditReport {
            version_tag: REPORT_VERSION.to_string(),
            report_id: String::new(),
            issued_at: options.issued_at.unwrap_or_else(now_millis),
            machine_generated: true,
            system_posture: SystemPosture {
                system_version: options.system_version,
                active_phases: options.active_phases,
                non_capabilities: options.non_capabilities.unwrap_or_else(|| {
                    to_strings(&["no_agency", "no_intervention", "no_autonomy"])
                }),
                invariants: options.invariants.unwrap_or_else(|| {
                    to_strings(&[
                        "Deterministic, hash-closed reasoning artifacts.",
                        "Governance-bound provenance with preserved disagreement.",
                        "Deployment fingerprint binding with hash integrity.",
                        "Mandatory uncertainty disclosure.",
                    ])
                }),
            },
            reasoning_evidence: ReasoningEvidence {
                artifacts: evidence,
                preserved_disagreements: disagreements,
                preserved_uncertainties: uncertainties,
            },
            input_closure: InputClosure {
                inputs,
                closed_world: "Only listed digests were used as inputs; absence implies exclusion."
                    .to_string(),
                hash_closure,
            },
            deployment_disclosure: DeploymentDisclosure {
                environment: deployment.environment.clone(),
                config_hashes: deployment.config_hashes.clone(),
                fingerprint: options.deployment.clone(),
                determinism: to_strings(&[
                    "Deployment fingerprint is deterministic and independent of secrets.",
                    "All artifacts reference the same fingerprint_id.",
                    "Config allowlist is hashable and order-insensitive.",
                    "Input closure hashing is deterministic regardless of artifact ordering or scale.",
                ]),
            },
            limits,
            verification: ReportVerification {
                instructions: to_strings(&[
                    "Recompute report_id with report_id set to an empty string.",
                    "Recompute input_closure.hash_closure from listed inputs.",
                    "Recompute deployment fingerprint hash and compare to fingerprint_id.",
                    "Verify each artifact against the declared deployment fingerprint and environment.",
                    "Validate governance snapshot hash and genome hash bindings for each artifact.",
                ]),
                invalid_conditions: to_strings(&[
                    "Any hash recomputation mismatch.",
                    "Artifacts bound to a different deployment fingerprint.",
                    "Missing disagreement or uncertainty relative to embedded artifacts.",
                    "Environment classification mismatch during verification.",
                ]),
            },
        };
        report.report_id = report.compute_id()?;
        debug!(
            report_id = %report.report_id,
            fingerprint_id = %report.deployment_disclosure.fingerprint.fingerprint_id,
            artifacts = report.reasoning_evidence.artifacts.len(),
            "audit report sealed"
        );
        Ok(report)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuditReportVerifier {
    config: KernelConfig,
}

impl AuditReportVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: KernelConfig) -> Self {
        Self { config }
    }

    pub fn verify(
        &self,
        report: &FullDisclosureAuditReport,
        context: &ReportVerificationContext,
    ) -> RakResult<()> {
        match self.run_checks(report, context) {
            Ok(()) => {
                debug!(report_id = %report.report_id, "audit report verified");
                Ok(())
            }
            Err(e) => {
                warn!(report_id = %report.report_id, error = %e, "audit report rejected");
                Err(e)
            }
        }
    }

    fn run_checks(
        &self,
        report: &FullDisclosureAuditReport,
        context: &ReportVerificationContext,
    ) -> RakResult<()> {
        if report.version_tag != REPORT_VERSION {
            return Err(RakError::UnsupportedVersion {
                subject: "audit report".to_string(),
                expected: REPORT_VERSION.to_string(),
                actual: report.version_tag.clone(),
            });
        }

        if self.config.strict_digest_format && !is_canonical_digest(&report.report_id) {
            return Err(RakError::HashMismatch {
                subject: "audit report".to_string(),
                expected: "64 lowercase hex characters".to_string(),
                actual: report.report_id.clone(),
            });
        }
        let recomputed = report.compute_id()?;
        if recomputed != report.report_id {
            return Err(RakError::HashMismatch {
                subject: "audit report".to_string(),
                expected: recomputed,
                actual: report.report_id.clone(),
            });
        }

        let disclosed = &report.deployment_disclosure.fingerprint;
        let expected_fingerprint_id = context
            .expected_deployment_fingerprint_id
            .clone()
            .unwrap_or_else(|| disclosed.fingerprint_id.clone());
        disclosed.verify(&FingerprintContext {
            expected_fingerprint_id: Some(expected_fingerprint_id.clone()),
            expected_environment: None,
        })?;

        let closure = &report.input_closure;
        let recomputed_closure = closure_hash(&closure.inputs)?;
        if recomputed_closure != closure.hash_closure {
            return Err(RakError::HashMismatch {
                subject: "input closure".to_string(),
                expected: recomputed_closure,
                actual: closure.hash_closure.clone(),
            });
        }

        let evidence = &report.reasoning_evidence;
        if evidence.artifacts.is_empty() {
            return Err(RakError::validation(
                "reasoning_evidence.artifacts",
                "audit report embeds no reasoning artifacts",
            ));
        }
        let artifacts: Vec<ReasoningArtifact> =
            evidence.artifacts.iter().map(|e| e.artifact.clone()).collect();

        for entry in closure_inputs(&artifacts) {
            if !closure.inputs.contains(&entry) {
                return Err(RakError::DisclosureOmission {
                    category: "input".to_string(),
                    entry: entry.artifact_id,
                });
            }
        }
        if closure.inputs.len() != artifacts.len() {
            return Err(RakError::validation(
                "input_closure.inputs",
                "closure lists inputs not backed by an embedded artifact",
            ));
        }

        ensure_listed(
            "disagreement",
            &collect_disagreements(&artifacts),
            &evidence.preserved_disagreements,
        )?;
        ensure_listed(
            "uncertainty",
            &collect_uncertainties(&artifacts),
            &evidence.preserved_uncertainties,
        )?;

        report.limits.ensure_complete()?;

        let verifier = ArtifactVerifier::with_config(self.config.clone());
        let environment = report.deployment_disclosure.environment.classification;
        for entry in &evidence.artifacts {
            let artifact_id = &entry.artifact.identity.artifact_id;
            if &entry.artifact_hash != artifact_id {
                return Err(RakError::HashMismatch {
                    subject: "artifact evidence".to_string(),
                    expected: artifact_id.clone(),
                    actual: entry.artifact_hash.clone(),
                });
            }
            if entry.deployment.fingerprint_id != expected_fingerprint_id {
                return Err(RakError::DeploymentBindingMismatch {
                    artifact_id: artifact_id.clone(),
                    expected: expected_fingerprint_id.clone(),
                    actual: entry.deployment.fingerprint_id.clone(),
                });
            }
            verifier.verify(
                &entry.artifact,
                &ArtifactVerificationContext {
                    registry_hash: Some(entry.governance.registry_hash.clone()),
                    evolution_hash: Some(entry.governance.evolution_hash.clone()),
                    genome_hash: entry.artifact.provenance.genome_hash.clone(),
                    deployment_fingerprint_id: Some(expected_fingerprint_id.clone()),
                    deployment_fingerprint: None,
                    environment: Some(environment),
                },
            )?;
        }

        Ok(())
    }
}

/// Build and seal a report with the default configuration.
pub fn build_full_disclosure_audit_report(
    options: ReportOptions,
) -> RakResult<FullDisclosureAuditReport> {
    AuditReportBuilder::new().build(options)
}

/// Verify a report with the default configuration.
pub fn verify_full_disclosure_audit_report(
    report: &FullDisclosureAuditReport,
    context: &ReportVerificationContext,
) -> RakResult<()> {
    AuditReportVerifier::new().verify(report, context)
}

/// Bind an artifact to its own governance and the report's deployment.
fn self_bound_context(
    artifact: &ReasoningArtifact,
    deployment: &DeploymentFingerprint,
) -> ArtifactVerificationContext {
    let governance = &artifact.provenance.governance;
    ArtifactVerificationContext {
        registry_hash: Some(governance.registry_hash.clone()),
        evolution_hash: Some(governance.evolution_hash.clone()),
        genome_hash: artifact.provenance.genome_hash.clone(),
        deployment_fingerprint_id: Some(deployment.fingerprint_id.clone()),
        deployment_fingerprint: None,
        environment: Some(deployment.environment.classification),
    }
}

fn collect_disagreements(artifacts: &[ReasoningArtifact]) -> Vec<String> {
    artifacts
        .iter()
        .flat_map(|a| a.disagreement_keys())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn collect_uncertainties(artifacts: &[ReasoningArtifact]) -> Vec<String> {
    artifacts
        .iter()
        .flat_map(|a| a.uncertainty_keys())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn closure_inputs(artifacts: &[ReasoningArtifact]) -> Vec<InputClosureEntry> {
    let mut inputs: Vec<InputClosureEntry> = artifacts
        .iter()
        .map(|a| InputClosureEntry {
            artifact_id: a.identity.artifact_id.clone(),
            digests: a.inputs.clone(),
        })
        .collect();
    inputs.sort_by(|a, b| a.artifact_id.cmp(&b.artifact_id));
    inputs
}

fn closure_hash(inputs: &[InputClosureEntry]) -> RakResult<String> {
    digest(&serde_json::json!({ "inputs": inputs }))
}

fn ensure_listed(category: &str, expected: &[String], listed: &[String]) -> RakResult<()> {
    match expected.iter().find(|e| !listed.contains(e)) {
        Some(missing) => Err(RakError::DisclosureOmission {
            category: category.to_string(),
            entry: missing.clone(),
        }),
        None => Ok(()),
    }
}

fn build_limits(
    uncertainties: &[String],
    overrides: LimitsOverride,
) -> RakResult<DisclosureLimits> {
    let limits = DisclosureLimits {
        non_claims: overrides.non_claims.unwrap_or_else(|| {
            to_strings(&[
                "No claim of correctness or truth of the reasoning.",
                "No claim of completeness of inputs or scenarios.",
                "No promise of outcomes, interventions, or actions.",
            ])
        }),
        blind_spots: overrides.blind_spots.unwrap_or_else(|| {
            to_strings(&[
                "Inputs not listed in the closure digests are excluded.",
                "Post-deployment drift beyond the fingerprint is not captured.",
            ])
        }),
        irreducible_uncertainty: overrides.irreducible_uncertainty.unwrap_or_else(|| {
            if uncertainties.is_empty() {
                vec![UNSPECIFIED_UNCERTAINTY.to_string()]
            } else {
                uncertainties.to_vec()
            }
        }),
    };
    limits.ensure_complete()?;
    Ok(limits)
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
