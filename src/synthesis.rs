//! Shape of the multi-persona synthesis consumed by the artifact builder.
//!
//! The synthesis is produced upstream; this module only models it and
//! offers a deterministic way to derive its disagreement and uncertainty
//! lists from raw persona assessments.

use crate::types::ConfidenceLevel;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Finding {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    pub summary: String,
    pub judgment: String,
    #[serde(default)]
    pub signals: Vec<String>,
    #[serde(default)]
    pub assumptions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Vec<String>>,
}

impl Finding {
    pub fn new(
        id: impl Into<String>,
        topic: impl Into<String>,
        summary: impl Into<String>,
        judgment: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            topic: Some(topic.into()),
            summary: summary.into(),
            judgment: judgment.into(),
            signals: Vec::new(),
            assumptions: Vec::new(),
            provenance: None,
        }
    }

    /// Topic used for grouping: explicit topic, else id, else summary.
    pub fn effective_topic(&self) -> &str {
        match self.topic.as_deref() {
            Some(topic) if !topic.is_empty() => topic,
            _ if !self.id.is_empty() => self.id.as_str(),
            _ => self.summary.as_str(),
        }
    }

    /// Position string recorded for this finding under `topic`.
    pub fn position(&self, topic: &str) -> String {
        format!("{}:{}:{}", topic, self.judgment, self.summary)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Uncertainty {
    pub id: String,
    pub topic: String,
    pub description: String,
    #[serde(default)]
    pub signals: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<ConfidenceLevel>,
}

impl Uncertainty {
    pub fn new(
        id: impl Into<String>,
        topic: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            topic: topic.into(),
            description: description.into(),
            signals: Vec::new(),
            severity: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersonaAssessment {
    pub persona: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default)]
    pub findings: Vec<Finding>,
    #[serde(default)]
    pub uncertainties: Vec<Uncertainty>,
}

impl PersonaAssessment {
    pub fn new(persona: impl Into<String>, findings: Vec<Finding>) -> Self {
        Self {
            persona: persona.into(),
            scope: None,
            findings,
            uncertainties: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisagreementPosition {
    pub persona: String,
    pub finding: Finding,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Disagreement {
    pub id: String,
    pub topic: String,
    pub positions: Vec<DisagreementPosition>,
}

/// Output of an upstream multi-persona reasoning pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReasoningSynthesis {
    pub question: String,
    #[serde(default)]
    pub disagreements: Vec<Disagreement>,
    #[serde(default)]
    pub uncertainties: Vec<Uncertainty>,
    #[serde(default)]
    pub assessments: Vec<PersonaAssessment>,
}

impl ReasoningSynthesis {
    /// Derive disagreements and uncertainties from raw assessments.
    ///
    /// A topic is a disagreement when more than one position exists and the
    /// positions do not all encode to the same [`Finding::position`] string.
    /// Uncertainties keep the first occurrence of each id.
    pub fn from_assessments(
        question: impl Into<String>,
        assessments: Vec<PersonaAssessment>,
    ) -> Self {
        let mut topics: BTreeMap<String, Vec<DisagreementPosition>> = BTreeMap::new();
        let mut uncertainties: BTreeMap<String, Uncertainty> = BTreeMap::new();

        for assessment in &assessments {
            for finding in &assessment.findings {
                topics
                    .entry(finding.effective_topic().to_string())
                    .or_default()
                    .push(DisagreementPosition {
                        persona: assessment.persona.clone(),
                        finding: finding.clone(),
                    });
            }
            for uncertainty in &assessment.uncertainties {
                uncertainties
                    .entry(uncertainty.id.clone())
                    .or_insert_with(|| uncertainty.clone());
            }
        }

        let disagreements = topics
            .into_iter()
            .filter_map(|(topic, mut positions)| {
                let distinct: BTreeSet<String> =
                    positions.iter().map(|p| p.finding.position(&topic)).collect();
                if positions.len() < 2 || distinct.len() < 2 {
                    return None;
                }
                positions.sort_by(|a, b| a.persona.cmp(&b.persona));
                Some(Disagreement {
                    id: topic.clone(),
                    topic,
                    positions,
                })
            })
            .collect();

        Self {
            question: question.into(),
            disagreements,
            uncertainties: uncertainties.into_values().collect(),
            assessments,
        }
    }
}
