//! Deployment fingerprints binding artifacts to a build and environment.

use crate::error::{RakError, RakResult};
use crate::hash::digest;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

pub const FINGERPRINT_VERSION: &str = "deployment-fingerprint/v1";

/// Placeholder stored instead of the hash of a secret config entry.
pub const REDACTED_HASH: &str = "redacted";

/// Deployment environment class.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentClassification {
    Local,
    Dev,
    Staging,
    Prod,
    /// Caller-named environment; requires a label.
    Explicit,
}

impl EnvironmentClassification {
    pub fn parse(s: &str) -> RakResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "dev" | "development" => Ok(Self::Dev),
            "staging" => Ok(Self::Staging),
            "prod" | "production" => Ok(Self::Prod),
            "explicit" => Ok(Self::Explicit),
            _ => Err(RakError::validation(
                "environment.classification",
                format!("unknown classification '{}'", s),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Dev => "dev",
            Self::Staging => "staging",
            Self::Prod => "prod",
            Self::Explicit => "explicit",
        }
    }
}

impl std::fmt::Display for EnvironmentClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EnvironmentClassification {
    type Err = RakError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeploymentEnvironment {
    pub classification: EnvironmentClassification,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl DeploymentEnvironment {
    pub fn new(classification: EnvironmentClassification) -> Self {
        Self { classification, label: None }
    }

    pub fn labeled(classification: EnvironmentClassification, label: impl Into<String>) -> Self {
        Self {
            classification,
            label: Some(label.into()),
        }
    }

    pub fn validate(&self) -> RakResult<()> {
        let has_label = self.label.as_deref().map_or(false, |l| !l.trim().is_empty());
        if self.classification == EnvironmentClassification::Explicit && !has_label {
            return Err(RakError::validation(
                "environment.label",
                "explicit environments must carry a label",
            ));
        }
        Ok(())
    }
}

/// Allow-listed configuration value that influences reasoning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigHashEntry {
    pub name: String,
    pub hash: String,
    #[serde(default)]
    pub secret: bool,
}

impl ConfigHashEntry {
    pub fn new(name: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hash: hash.into(),
            secret: false,
        }
    }

    pub fn secret(name: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hash: hash.into(),
            secret: true,
        }
    }
}

/// Inputs for [`DeploymentFingerprint::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct FingerprintInputs {
    pub environment: DeploymentEnvironment,
    pub commit: String,
    pub build_id: Option<String>,
    pub artifact_schema_versions: BTreeMap<String, String>,
    pub governance_snapshot_hash: String,
    pub genome_hash: Option<String>,
    pub config_hashes: Vec<ConfigHashEntry>,
}

impl FingerprintInputs {
    pub fn new(
        environment: DeploymentEnvironment,
        commit: impl Into<String>,
        artifact_schema_versions: BTreeMap<String, String>,
        governance_snapshot_hash: impl Into<String>,
    ) -> Self {
        Self {
            environment,
            commit: commit.into(),
            build_id: None,
            artifact_schema_versions,
            governance_snapshot_hash: governance_snapshot_hash.into(),
            genome_hash: None,
            config_hashes: Vec::new(),
        }
    }
}

/// Expectations checked by [`DeploymentFingerprint::verify`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FingerprintContext {
    pub expected_fingerprint_id: Option<String>,
    pub expected_environment: Option<EnvironmentClassification>,
}

/// Hash-bound descriptor of the environment an artifact was produced in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeploymentFingerprint {
    pub version_tag: String,
    pub fingerprint_id: String,
    pub environment: DeploymentEnvironment,
    pub commit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_id: Option<String>,
    pub artifact_schema_versions: BTreeMap<String, String>,
    pub governance_snapshot_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genome_hash: Option<String>,
    pub config_hashes: Vec<ConfigHashEntry>,
}

impl DeploymentFingerprint {
    /// Normalize the inputs into an unsealed fingerprint and seal it.
    pub fn build(inputs: FingerprintInputs) -> RakResult<Self> {
        inputs.environment.validate()?;
        if inputs.commit.trim().is_empty() {
            return Err(RakError::validation("commit", "deployment commit must be non-empty"));
        }

        let mut config_hashes = inputs.config_hashes;
        config_hashes.sort_by(|a, b| a.name.cmp(&b.name));
        let mut seen = BTreeSet::new();
        for entry in &mut config_hashes {
            if !seen.insert(entry.name.clone()) {
                return Err(RakError::validation(
                    "config_hashes",
                    format!("duplicate config entry '{}'", entry.name),
                ));
            }
            if entry.secret {
                entry.hash = REDACTED_HASH.to_string();
            }
        }

        let mut fingerprint = Self {
            version_tag: FINGERPRINT_VERSION.to_string(),
            fingerprint_id: String::new(),
            environment: inputs.environment,
            commit: inputs.commit,
            build_id: inputs.build_id,
            artifact_schema_versions: inputs.artifact_schema_versions,
            governance_snapshot_hash: inputs.governance_snapshot_hash,
            genome_hash: inputs.genome_hash,
            config_hashes,
        };
        fingerprint.fingerprint_id = fingerprint.compute_id()?;
        debug!(fingerprint_id = %fingerprint.fingerprint_id, "deployment fingerprint sealed");
        Ok(fingerprint)
    }

    /// Digest of this fingerprint with `fingerprint_id` blanked.
    pub fn compute_id(&self) -> RakResult<String> {
        let mut blank = self.clone();
        blank.fingerprint_id = String::new();
        digest(&blank)
    }

    pub fn verify(&self, context: &FingerprintContext) -> RakResult<()> {
        if self.version_tag != FINGERPRINT_VERSION {
            return Err(RakError::UnsupportedVersion {
                subject: "deployment fingerprint".to_string(),
                expected: FINGERPRINT_VERSION.to_string(),
                actual: self.version_tag.clone(),
            });
        }
        self.environment.validate()?;

        let recomputed = self.compute_id()?;
        if recomputed != self.fingerprint_id {
            return Err(RakError::FingerprintMismatch {
                expected: recomputed,
                actual: self.fingerprint_id.clone(),
            });
        }

        if let Some(expected) = &context.expected_fingerprint_id {
            if expected != &self.fingerprint_id {
                return Err(RakError::FingerprintIdentityMismatch {
                    expected: expected.clone(),
                    actual: self.fingerprint_id.clone(),
                });
            }
        }

        if let Some(expected) = context.expected_environment {
            if expected != self.environment.classification {
                return Err(RakError::EnvironmentMismatch {
                    expected: expected.to_string(),
                    actual: self.environment.classification.to_string(),
                });
            }
        }

        Ok(())
    }
}
