//! Error types for RAK.

use std::fmt;

/// Coarse failure taxonomy shared by every builder and verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    UnsupportedVersion,
    HashMismatch,
    BindingMismatch,
    PolicyViolation,
    CollapsedDisagreement,
    MissingUncertainty,
    IncompleteLimits,
    DeploymentBindingMismatch,
    DisclosureOmission,
    ResourceLimit,
    Serialization,
}

/// Unified error type for all RAK operations.
///
/// Every error is terminal: nothing in this crate performs I/O, so there is
/// no transient failure to retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RakError {
    /// Malformed input with field context
    Validation { field: String, message: String },
    /// Version tag not recognized
    UnsupportedVersion { subject: String, expected: String, actual: String },
    /// Recomputed digest differs from the stored identity
    HashMismatch { subject: String, expected: String, actual: String },
    /// Deployment fingerprint digest does not recompute
    FingerprintMismatch { expected: String, actual: String },
    /// Deployment fingerprint is not the one the caller expected
    FingerprintIdentityMismatch { expected: String, actual: String },
    /// Deployment environment classification differs from expectation
    EnvironmentMismatch { expected: String, actual: String },
    /// Governance snapshot, genome, or registry cross-check failed
    BindingMismatch { binding: String, expected: String, actual: String },
    /// External adapter policy claimed authority or was used
    PolicyViolation { adapter: String, reason: String },
    /// Disagreement entry with one or fewer distinct positions
    CollapsedDisagreement { topic: String, distinct_positions: usize },
    /// Uncertainty section is empty
    MissingUncertainty { section: String },
    /// Audit report limit list is empty
    IncompleteLimits { list: String },
    /// Artifact bound to a different deployment than the report
    DeploymentBindingMismatch { artifact_id: String, expected: String, actual: String },
    /// Report omits a disagreement, uncertainty, or input present in its artifacts
    DisclosureOmission { category: String, entry: String },
    /// Resource limit exceeded
    ResourceLimit { resource: String, limit: usize, actual: usize },
    /// Serialization error
    Serialization { message: String },
}

impl RakError {
    /// Map the error onto its taxonomy kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::UnsupportedVersion { .. } => ErrorKind::UnsupportedVersion,
            Self::HashMismatch { .. } | Self::FingerprintMismatch { .. } => ErrorKind::HashMismatch,
            Self::FingerprintIdentityMismatch { .. }
            | Self::EnvironmentMismatch { .. }
            | Self::BindingMismatch { .. } => ErrorKind::BindingMismatch,
            Self::PolicyViolation { .. } => ErrorKind::PolicyViolation,
            Self::CollapsedDisagreement { .. } => ErrorKind::CollapsedDisagreement,
            Self::MissingUncertainty { .. } => ErrorKind::MissingUncertainty,
            Self::IncompleteLimits { .. } => ErrorKind::IncompleteLimits,
            Self::DeploymentBindingMismatch { .. } => ErrorKind::DeploymentBindingMismatch,
            Self::DisclosureOmission { .. } => ErrorKind::DisclosureOmission,
            Self::ResourceLimit { .. } => ErrorKind::ResourceLimit,
            Self::Serialization { .. } => ErrorKind::Serialization,
        }
    }

    pub(crate) fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for RakError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation { field, message } => {
                write!(f, "validation error on '{}': {}", field, message)
            }
            Self::UnsupportedVersion { subject, expected, actual } => {
                write!(f, "unsupported {} version '{}' (expected '{}')", subject, actual, expected)
            }
            Self::HashMismatch { subject, expected, actual } => {
                write!(f, "{} hash mismatch: expected '{}', got '{}'", subject, expected, actual)
            }
            Self::FingerprintMismatch { expected, actual } => {
                write!(f, "deployment fingerprint hash mismatch: expected '{}', got '{}'",
                       expected, actual)
            }
            Self::FingerprintIdentityMismatch { expected, actual } => {
                write!(f, "deployment fingerprint '{}' does not match expected '{}'",
                       actual, expected)
            }
            Self::EnvironmentMismatch { expected, actual } => {
                write!(f, "deployment environment mismatch: expected '{}', got '{}'",
                       expected, actual)
            }
            Self::BindingMismatch { binding, expected, actual } => {
                write!(f, "{} mismatch: expected '{}', got '{}'", binding, expected, actual)
            }
            Self::PolicyViolation { adapter, reason } => {
                write!(f, "external adapter '{}' violates policy: {}", adapter, reason)
            }
            Self::CollapsedDisagreement { topic, distinct_positions } => {
                write!(f, "disagreement on '{}' collapsed to {} distinct position(s)",
                       topic, distinct_positions)
            }
            Self::MissingUncertainty { section } => {
                write!(f, "uncertainty missing from {}", section)
            }
            Self::IncompleteLimits { list } => {
                write!(f, "audit limits incomplete: '{}' is empty", list)
            }
            Self::DeploymentBindingMismatch { artifact_id, expected, actual } => {
                write!(f, "artifact '{}' bound to deployment '{}', expected '{}'",
                       artifact_id, actual, expected)
            }
            Self::DisclosureOmission { category, entry } => {
                write!(f, "{} '{}' omitted from audit report", category, entry)
            }
            Self::ResourceLimit { resource, limit, actual } => {
                write!(f, "{} limit exceeded: {} > {}", resource, actual, limit)
            }
            Self::Serialization { message } => {
                write!(f, "serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for RakError {}

/// Result type alias for RAK operations.
pub type RakResult<T> = Result<T, RakError>;

impl From<serde_json::Error> for RakError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization { message: e.to_string() }
    }
}
