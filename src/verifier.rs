//! Standalone verifier for reasoning artifacts.

use crate::config::KernelConfig;
use crate::deployment::{DeploymentFingerprint, EnvironmentClassification, FingerprintContext};
use crate::error::{RakError, RakResult};
use crate::hash::is_canonical_digest;
use crate::policy::assert_policy;
use crate::types::{ReasoningArtifact, ARTIFACT_VERSION};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Optional expectations an artifact is checked against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtifactVerificationContext {
    pub registry_hash: Option<String>,
    pub evolution_hash: Option<String>,
    pub genome_hash: Option<String>,
    pub deployment_fingerprint_id: Option<String>,
    pub deployment_fingerprint: Option<DeploymentFingerprint>,
    pub environment: Option<EnvironmentClassification>,
}

/// Verification result for a single artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerificationOutcome {
    pub artifact_id: String,
    pub success: bool,
    pub error: Option<String>,
}

/// Re-derives every hash and binding of a sealed artifact.
#[derive(Debug, Clone, Default)]
pub struct ArtifactVerifier {
    config: KernelConfig,
}

impl ArtifactVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: KernelConfig) -> Self {
        Self { config }
    }

    /// Verify an artifact, failing on the first violated check.
    pub fn verify(
        &self,
        artifact: &ReasoningArtifact,
        context: &ArtifactVerificationContext,
    ) -> RakResult<()> {
        match self.run_checks(artifact, context) {
            Ok(()) => {
                debug!(artifact_id = %artifact.identity.artifact_id, "reasoning artifact verified");
                Ok(())
            }
            Err(e) => {
                warn!(
                    artifact_id = %artifact.identity.artifact_id,
                    error = %e,
                    "reasoning artifact rejected"
                );
                Err(e)
            }
        }
    }

    fn run_checks(
        &self,
        artifact: &ReasoningArtifact,
        context: &ArtifactVerificationContext,
    ) -> RakResult<()> {
        let identity = &artifact.identity;
        if identity.version_tag != ARTIFACT_VERSION {
            return Err(RakError::UnsupportedVersion {
                subject: "reasoning artifact".to_string(),
                expected: ARTIFACT_VERSION.to_string(),
                actual: identity.version_tag.clone(),
            });
        }

        if self.config.strict_digest_format && !is_canonical_digest(&identity.artifact_id) {
            return Err(RakError::HashMismatch {
                subject: "artifact".to_string(),
                expected: "64 lowercase hex characters".to_string(),
                actual: identity.artifact_id.clone(),
            });
        }
        let recomputed = artifact.compute_id()?;
        if recomputed != identity.artifact_id {
            return Err(RakError::HashMismatch {
                subject: "artifact".to_string(),
                expected: recomputed,
                actual: identity.artifact_id.clone(),
            });
        }

        let provenance = &artifact.provenance;
        let governance = &provenance.governance;
        expect_binding(
            "registry hash",
            context.registry_hash.as_deref(),
            &governance.registry_hash,
        )?;
        expect_binding(
            "evolution hash",
            context.evolution_hash.as_deref(),
            &governance.evolution_hash,
        )?;
        if let Some(expected) = &context.genome_hash {
            if provenance.genome_hash.as_ref() != Some(expected) {
                return Err(RakError::BindingMismatch {
                    binding: "genome hash".to_string(),
                    expected: expected.clone(),
                    actual: describe(provenance.genome_hash.as_deref()),
                });
            }
        }

        assert_policy(&provenance.external_adapters, &provenance.external_adapter_usage)?;

        let governance_hash = governance.snapshot_hash()?;
        if provenance.deployment.governance_snapshot_hash != governance_hash {
            return Err(RakError::BindingMismatch {
                binding: "governance_snapshot_hash".to_string(),
                expected: governance_hash,
                actual: provenance.deployment.governance_snapshot_hash.clone(),
            });
        }
        if provenance.deployment.genome_hash != provenance.genome_hash {
            return Err(RakError::BindingMismatch {
                binding: "genome_hash".to_string(),
                expected: describe(provenance.genome_hash.as_deref()),
                actual: describe(provenance.deployment.genome_hash.as_deref()),
            });
        }

        let fingerprint_context = FingerprintContext {
            expected_fingerprint_id: context.deployment_fingerprint_id.clone().or_else(|| {
                context
                    .deployment_fingerprint
                    .as_ref()
                    .map(|f| f.fingerprint_id.clone())
            }),
            expected_environment: context.environment.or_else(|| {
                context
                    .deployment_fingerprint
                    .as_ref()
                    .map(|f| f.environment.classification)
            }),
        };
        provenance.deployment.verify(&fingerprint_context)?;

        if artifact.synthesis.uncertainties.is_empty() {
            return Err(RakError::MissingUncertainty {
                section: "synthesis.uncertainties".to_string(),
            });
        }

        for entry in &artifact.synthesis.disagreements {
            entry.ensure_not_collapsed()?;
        }

        Ok(())
    }

    /// Verify and report the outcome as data instead of an error.
    pub fn check(
        &self,
        artifact: &ReasoningArtifact,
        context: &ArtifactVerificationContext,
    ) -> VerificationOutcome {
        let result = self.verify(artifact, context);
        VerificationOutcome {
            artifact_id: artifact.identity.artifact_id.clone(),
            success: result.is_ok(),
            error: result.err().map(|e| e.to_string()),
        }
    }

    /// Verify and return the outcome as JSON.
    pub fn check_json(
        &self,
        artifact: &ReasoningArtifact,
        context: &ArtifactVerificationContext,
    ) -> serde_json::Value {
        let outcome = self.check(artifact, context);
        serde_json::to_value(&outcome).unwrap_or_else(|_| {
            serde_json::json!({
                "artifact_id": artifact.identity.artifact_id,
                "success": false,
                "error": "Failed to serialize verification outcome"
            })
        })
    }
}

/// Verify an artifact with the default configuration.
pub fn verify_reasoning_artifact(
    artifact: &ReasoningArtifact,
    context: &ArtifactVerificationContext,
) -> RakResult<()> {
    ArtifactVerifier::new().verify(artifact, context)
}

fn expect_binding(binding: &str, expected: Option<&str>, actual: &str) -> RakResult<()> {
    match expected {
        Some(expected) if expected != actual => Err(RakError::BindingMismatch {
            binding: binding.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }),
        _ => Ok(()),
    }
}

fn describe(value: Option<&str>) -> String {
    value.unwrap_or("<none>").to_string()
}
