//! Clinical documentation to rendered note text, including lab-report normalization.

mod documentation;
mod investigations;
mod template;

use serde::{Deserialize, Serialize};

pub use documentation::{documentation_from_str, ClinicalDocumentation, RenderedNote};
pub use investigations::{
    field_order, normalize_investigations, split_blocks, split_pairs, InvestigationBlock,
};
pub use template::{Slot, Template, DIAGNOSIS, HISTORY, INVESTIGATIONS, TREATMENT};

/// Text rendered in place of any value that was never captured.
pub const NOT_RECORDED: &str = "Not recorded";

/// What to do with a field that a known investigation's field order does not list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnknownFieldPolicy {
    /// Place it after the listed fields, alphabetically.
    #[default]
    AppendAlphabetical,
    /// Fail the normalization.
    Reject,
}

/// Knobs for note rendering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotesConfig {
    /// Header the upstream export prepends to lab results; stripped before parsing.
    pub boilerplate_header: String,
    pub unknown_field_policy: UnknownFieldPolicy,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            boilerplate_header: "**Investigations conducted:**\n".to_string(),
            unknown_field_policy: UnknownFieldPolicy::AppendAlphabetical,
        }
    }
}
