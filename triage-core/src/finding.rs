use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{Severity, TriageError};

/// Anything graded on the severity scale.
pub trait Finding {
    fn severity(&self) -> Severity;
}

/// An observation about the encounter and why it was graded as it was.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Observation {
    #[serde(alias = "Severity")]
    pub severity: Severity,
    #[serde(alias = "Reason")]
    pub reason: String,
}

/// A suggested action, graded by how urgently it should be taken.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recommendation {
    #[serde(alias = "Severity")]
    pub severity: Severity,
    #[serde(alias = "Action")]
    pub action: String,
}

impl Finding for Observation {
    fn severity(&self) -> Severity {
        self.severity
    }
}

impl Finding for Recommendation {
    fn severity(&self) -> Severity {
        self.severity
    }
}

/// Findings returned by one AI call. Never empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawResponsePayload")]
pub struct ResponsePayload {
    #[serde(rename = "Response")]
    observations: Vec<Observation>,
    #[serde(rename = "Recommendations")]
    recommendations: Vec<Recommendation>,
}

#[derive(Deserialize)]
struct RawResponsePayload {
    #[serde(rename = "Response", default)]
    observations: Vec<Observation>,
    #[serde(rename = "Recommendations", default)]
    recommendations: Vec<Recommendation>,
}

impl TryFrom<RawResponsePayload> for ResponsePayload {
    type Error = TriageError;

    fn try_from(raw: RawResponsePayload) -> Result<Self, Self::Error> {
        ResponsePayload::new(raw.observations, raw.recommendations)
    }
}

impl ResponsePayload {
    /// Rejects a payload with neither observations nor recommendations.
    pub fn new(
        observations: Vec<Observation>,
        recommendations: Vec<Recommendation>,
    ) -> Result<Self, TriageError> {
        if observations.is_empty() && recommendations.is_empty() {
            return Err(TriageError::EmptyResponse);
        }
        Ok(Self {
            observations,
            recommendations,
        })
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn recommendations(&self) -> &[Recommendation] {
        &self.recommendations
    }

    /// Severities of observations and recommendations pooled into one set.
    pub fn severities_seen(&self) -> BTreeSet<Severity> {
        self.observations
            .iter()
            .map(Finding::severity)
            .chain(self.recommendations.iter().map(Finding::severity))
            .collect()
    }

    pub fn worst_severity(&self) -> Severity {
        match self.severities_seen().last() {
            Some(worst) => *worst,
            None => unreachable!("ResponsePayload is validated non-empty at construction"),
        }
    }
}
