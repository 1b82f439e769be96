//! RAK - Reasoning Artifact Kernel
//!
//! Content-addressed, tamper-evident records of multi-persona reasoning and
//! the full-disclosure audit reports that aggregate them.

pub mod error;
pub mod builder;
pub mod config;
pub mod deployment;
pub mod hash;
pub mod policy;
pub mod report;
pub mod synthesis;
pub mod types;
pub mod verifier;

pub use error::{ErrorKind, RakError, RakResult};
pub use builder::{build_reasoning_artifact, ArtifactBuilder, ArtifactDraft, BuildArtifactOptions};
pub use config::KernelConfig;
pub use deployment::{
    ConfigHashEntry, DeploymentEnvironment, DeploymentFingerprint, EnvironmentClassification,
    FingerprintContext, FingerprintInputs,
};
pub use hash::{digest, digest_value, HASH_ALGORITHM};
pub use policy::{assert_policy, default_policy, ExternalAdapterPolicy, ExternalAdapterPolicyEntry};
pub use report::{
    build_full_disclosure_audit_report, verify_full_disclosure_audit_report, AuditReportBuilder,
    AuditReportVerifier, FullDisclosureAuditReport, LimitsOverride, ReportOptions,
    ReportVerificationContext,
};
pub use synthesis::{
    Disagreement, DisagreementPosition, Finding, PersonaAssessment, ReasoningSynthesis,
    Uncertainty,
};
pub use types::{
    ArtifactInputsDigests, ArtifactProvenance, ConfidenceLevel, GovernanceSnapshot,
    ReasoningArtifact, UncertaintySource,
};
pub use verifier::{
    verify_reasoning_artifact, ArtifactVerificationContext, ArtifactVerifier, VerificationOutcome,
};
