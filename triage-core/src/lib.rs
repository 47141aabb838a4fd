//! Core model for aggregating AI clinical-decision calls into severity signals.
//!
//! A [`Call`] carries one or more graded findings; its colour is the worst of them.
//! A [`CallCollection`] answers "first", "final", "worst" and "ever" questions per
//! category and across categories.

mod call;
mod collection;
mod finding;
mod ingest;
mod severity;
mod summary;

pub use call::{Call, Category, Feedback, Presence};
pub use collection::CallCollection;
pub use finding::{Finding, Observation, Recommendation, ResponsePayload};
pub use ingest::{calls_from_str, calls_from_value};
pub use severity::{parse_severity, Severity};
pub use summary::{CategorySignal, SignalSummary};

/// Errors shared by every crate in the workspace.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TriageError {
    #[error("invalid severity: {0}")]
    InvalidSeverity(String),
    #[error("AI response must have at least one response value or at least one recommendation value")]
    EmptyResponse,
    #[error("the {query} call is not defined for a collection with no category scope")]
    NoScope { query: &'static str },
    #[error("could not parse investigation text: {0}")]
    Parse(String),
    #[error("field {field:?} is not in the field order for {investigation:?}")]
    UnknownField { investigation: String, field: String },
    #[error("template error: {0}")]
    Template(String),
    #[error("call {index} rejected: {reason}")]
    InvalidCall { index: usize, reason: String },
    #[error("could not read JSON: {0}")]
    Json(String),
}

pub type TriageResult<T> = std::result::Result<T, TriageError>;
