use serde::{Deserialize, Serialize};
use triage_core::{TriageError, TriageResult};

use crate::{normalize_investigations, NotesConfig, DIAGNOSIS, HISTORY, INVESTIGATIONS, TREATMENT};

/// Encounter documentation as exported by the clinic record system.
///
/// Only gender and age are always present. Anything else may be missing, and a
/// missing value renders as "Not recorded".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClinicalDocumentation {
    #[serde(alias = "Gender")]
    pub gender: String,
    #[serde(alias = "Age")]
    pub age: String,
    #[serde(alias = "Allergies", default)]
    pub allergies: Option<String>,
    #[serde(alias = "CC", default)]
    pub cc: Option<String>,
    #[serde(alias = "ChronicIllness", default)]
    pub chronic_illness: Option<String>,
    #[serde(alias = "ClinicalNotes", default)]
    pub clinical_notes: Option<String>,
    #[serde(alias = "ClinicalNotes_clean", default)]
    pub clinical_notes_clean: Option<String>,
    #[serde(alias = "Dx", default)]
    pub dx: Option<String>,
    #[serde(alias = "Examination", default)]
    pub examination: Option<String>,
    #[serde(alias = "LabTest", default)]
    pub lab_test: Option<String>,
    #[serde(default)]
    pub obs: Option<String>,
    #[serde(alias = "Referrals", default)]
    pub referrals: Option<String>,
    #[serde(alias = "Rx", default)]
    pub rx: Option<String>,
    #[serde(alias = "SocialHistory", default)]
    pub social_history: Option<String>,
    #[serde(default)]
    pub doc_bpr: Option<String>,
    #[serde(default)]
    pub doc_hgt: Option<f64>,
    #[serde(default)]
    pub doc_muc: Option<String>,
    #[serde(default)]
    pub doc_bpm: Option<f64>,
    #[serde(default)]
    pub doc_tmp: Option<f64>,
    #[serde(default)]
    pub doc_wgt: Option<f64>,
    #[serde(default)]
    pub doc_rr: Option<f64>,
    #[serde(default)]
    pub doc_sp2: Option<f64>,
}

/// The four text blocks a report is built from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenderedNote {
    pub history: String,
    pub investigations: String,
    pub diagnosis: String,
    pub treatment: String,
}

impl ClinicalDocumentation {
    /// A record with only the always-present fields filled in.
    pub fn new(gender: impl Into<String>, age: impl Into<String>) -> Self {
        Self {
            gender: gender.into(),
            age: age.into(),
            allergies: None,
            cc: None,
            chronic_illness: None,
            clinical_notes: None,
            clinical_notes_clean: None,
            dx: None,
            examination: None,
            lab_test: None,
            obs: None,
            referrals: None,
            rx: None,
            social_history: None,
            doc_bpr: None,
            doc_hgt: None,
            doc_muc: None,
            doc_bpm: None,
            doc_tmp: None,
            doc_wgt: None,
            doc_rr: None,
            doc_sp2: None,
        }
    }

    /// Lab results in canonical sorted form, `None` when never captured.
    pub fn lab_test_clean(&self, config: &NotesConfig) -> TriageResult<Option<String>> {
        self.lab_test
            .as_deref()
            .map(|text| normalize_investigations(text, config))
            .transpose()
    }

    pub fn history(&self, config: &NotesConfig) -> TriageResult<String> {
        HISTORY.render(self, config)
    }

    pub fn investigations(&self, config: &NotesConfig) -> TriageResult<String> {
        INVESTIGATIONS.render(self, config)
    }

    pub fn diagnosis(&self, config: &NotesConfig) -> TriageResult<String> {
        DIAGNOSIS.render(self, config)
    }

    pub fn treatment(&self, config: &NotesConfig) -> TriageResult<String> {
        TREATMENT.render(self, config)
    }

    pub fn render_all(&self, config: &NotesConfig) -> TriageResult<RenderedNote> {
        Ok(RenderedNote {
            history: self.history(config)?,
            investigations: self.investigations(config)?,
            diagnosis: self.diagnosis(config)?,
            treatment: self.treatment(config)?,
        })
    }
}

/// Read a documentation record from JSON.
pub fn documentation_from_str(json: &str) -> TriageResult<ClinicalDocumentation> {
    serde_json::from_str(json).map_err(|err| TriageError::Json(err.to_string()))
}

/// Render a measurement the way the export displays floats: whole numbers keep one
/// decimal place (`70.0`), anything else uses the shortest exact form (`36.6`).
pub(crate) fn format_measurement(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
