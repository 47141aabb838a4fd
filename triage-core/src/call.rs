use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{ResponsePayload, Severity, TriageError};

/// Clinical-decision rule a call was made for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    #[serde(rename = "Treatment Recommendation")]
    TreatmentRecommendation,
    #[serde(rename = "Diagnosis Evaluation")]
    DiagnosisEvaluation,
    #[serde(rename = "Clinical Notes")]
    ClinicalNotes,
    #[serde(rename = "Vitals & Chief Complaint Evaluation")]
    VitalsChiefComplaintEvaluation,
    #[serde(rename = "Investigation Recommendations")]
    InvestigationRecommendations,
}

impl Category {
    /// Every category, including ones that may be absent from a given data set.
    pub const ALL: [Category; 5] = [
        Category::TreatmentRecommendation,
        Category::DiagnosisEvaluation,
        Category::ClinicalNotes,
        Category::VitalsChiefComplaintEvaluation,
        Category::InvestigationRecommendations,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::TreatmentRecommendation => "Treatment Recommendation",
            Category::DiagnosisEvaluation => "Diagnosis Evaluation",
            Category::ClinicalNotes => "Clinical Notes",
            Category::VitalsChiefComplaintEvaluation => "Vitals & Chief Complaint Evaluation",
            Category::InvestigationRecommendations => "Investigation Recommendations",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| TriageError::Parse(format!("unknown category {s:?}")))
    }
}

/// Clinician thumbs up / thumbs down on a call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Feedback {
    Up,
    Down,
    None,
}

/// Whether the call was shown to the clinician.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Presence {
    Active,
    Silent,
}

/// One AI assessment tied to an encounter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Call {
    #[serde(rename = "rule")]
    category: Category,
    response: ResponsePayload,
    user_id: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    time: DateTime<Utc>,
    #[serde(rename = "thumbs_up_down")]
    feedback: Feedback,
    user_role_prompt: String,
    #[serde(rename = "silent")]
    presence: Presence,
    #[serde(default)]
    acknowledged: Option<bool>,
}

impl Call {
    pub fn new(
        category: Category,
        response: ResponsePayload,
        user_id: impl Into<String>,
        time: DateTime<Utc>,
    ) -> Self {
        Self {
            category,
            response,
            user_id: user_id.into(),
            time,
            feedback: Feedback::None,
            user_role_prompt: String::new(),
            presence: Presence::Active,
            acknowledged: None,
        }
    }

    pub fn with_feedback(mut self, feedback: Feedback) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn with_user_role_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.user_role_prompt = prompt.into();
        self
    }

    pub fn with_presence(mut self, presence: Presence) -> Self {
        self.presence = presence;
        self
    }

    pub fn with_acknowledged(mut self, acknowledged: bool) -> Self {
        self.acknowledged = Some(acknowledged);
        self
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn response(&self) -> &ResponsePayload {
        &self.response
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    pub fn feedback(&self) -> Feedback {
        self.feedback
    }

    pub fn user_role_prompt(&self) -> &str {
        &self.user_role_prompt
    }

    pub fn presence(&self) -> Presence {
        self.presence
    }

    pub fn acknowledged(&self) -> Option<bool> {
        self.acknowledged
    }

    /// Worst severity across every observation and recommendation of the call.
    pub fn color(&self) -> Severity {
        self.response.worst_severity()
    }
}

/// Timestamps arrive as text or as Unix epoch numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Seconds(i64),
    Fractional(f64),
    Text(String),
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Seconds(value) => from_epoch(value as f64),
        RawTimestamp::Fractional(value) => from_epoch(value),
        RawTimestamp::Text(raw) => {
            return parse_timestamp(&raw)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp {raw:?}")));
        }
    };
    parsed.ok_or_else(|| serde::de::Error::custom("timestamp out of range"))
}

/// RFC 3339, an ISO-8601 timestamp with or without seconds or offset, a bare date, or
/// epoch seconds written as text. Anything without an offset is taken as UTC.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    let with_offset = [
        "%Y-%m-%dT%H:%M:%S%.f%z",
        "%Y-%m-%d %H:%M:%S%.f%z",
        "%Y-%m-%dT%H:%M%z",
        "%Y-%m-%d %H:%M%z",
    ]
    .iter()
    .find_map(|format| DateTime::parse_from_str(value, format).ok())
    .map(|dt| dt.with_timezone(&Utc));
    if with_offset.is_some() {
        return with_offset;
    }

    let naive = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ]
    .iter()
    .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
    .or_else(|| {
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    });
    if let Some(naive) = naive {
        return Some(naive.and_utc());
    }

    value.parse::<f64>().ok().and_then(from_epoch)
}

/// Epoch seconds, or milliseconds once the magnitude is past what seconds can
/// plausibly be (2e10 s is in the year 2603).
fn from_epoch(value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() {
        return None;
    }
    let seconds = if value.abs() > 2e10 { value / 1000.0 } else { value };
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
}
