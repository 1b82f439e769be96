//! Kernel configuration.

use crate::error::{RakError, RakResult};
use serde::{Deserialize, Serialize};

/// Resource limits and strictness switches for builders and verifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Maximum persona artifacts embedded in one reasoning artifact.
    pub max_personas: usize,
    /// Maximum reasoning artifacts aggregated into one audit report.
    pub max_report_artifacts: usize,
    /// Reject identity fields that are not 64 lowercase hex characters
    /// before recomputing them.
    pub strict_digest_format: bool,
}

impl KernelConfig {
    pub const DEFAULT_MAX_PERSONAS: usize = 64;
    pub const DEFAULT_MAX_REPORT_ARTIFACTS: usize = 10_000;

    /// Parse a configuration from JSON, filling omitted fields with defaults.
    pub fn from_json_str(raw: &str) -> RakResult<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> RakResult<()> {
        if self.max_personas == 0 {
            return Err(RakError::validation("max_personas", "must be at least 1"));
        }
        if self.max_report_artifacts == 0 {
            return Err(RakError::validation("max_report_artifacts", "must be at least 1"));
        }
        Ok(())
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            max_personas: Self::DEFAULT_MAX_PERSONAS,
            max_report_artifacts: Self::DEFAULT_MAX_REPORT_ARTIFACTS,
            strict_digest_format: true,
        }
    }
}
