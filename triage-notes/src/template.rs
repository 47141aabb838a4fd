//! Note templates with explicit placeholder bindings.
//!
//! Every placeholder a template body mentions is bound to an accessor on
//! [`ClinicalDocumentation`]. An accessor yields `None` for a value that was never
//! captured, which renders as [`NOT_RECORDED`]; an empty string renders as-is.

use triage_core::{TriageError, TriageResult};

use crate::documentation::format_measurement;
use crate::{ClinicalDocumentation, NotesConfig, NOT_RECORDED};

pub type Accessor = fn(&ClinicalDocumentation, &NotesConfig) -> TriageResult<Option<String>>;

/// Binds one `{placeholder}` to the value it is filled with.
#[derive(Clone, Copy)]
pub struct Slot {
    pub placeholder: &'static str,
    pub accessor: Accessor,
}

#[derive(Clone, Copy)]
pub struct Template {
    pub name: &'static str,
    pub body: &'static str,
    pub slots: &'static [Slot],
}

impl Template {
    /// Fill every placeholder in a single pass, so a substituted value is never
    /// scanned for placeholders itself. The result is trimmed.
    pub fn render(
        &self,
        doc: &ClinicalDocumentation,
        config: &NotesConfig,
    ) -> TriageResult<String> {
        let mut rendered = String::with_capacity(self.body.len());
        let mut rest = self.body;

        while let Some(open) = rest.find('{') {
            rendered.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(|| {
                TriageError::Template(format!("unclosed placeholder in {} template", self.name))
            })?;

            let placeholder = &after[..close];
            let slot = self
                .slots
                .iter()
                .find(|slot| slot.placeholder == placeholder)
                .ok_or_else(|| {
                    TriageError::Template(format!(
                        "{} template has no binding for {{{placeholder}}}",
                        self.name
                    ))
                })?;

            let value = (slot.accessor)(doc, config)?;
            rendered.push_str(value.as_deref().unwrap_or(NOT_RECORDED));
            rest = &after[close + 1..];
        }
        rendered.push_str(rest);

        Ok(rendered.trim().to_string())
    }
}

pub const HISTORY: Template = Template {
    name: "history",
    body: "**Age:** {age}
**Gender:** {gender}

**Allergies:** {allergies}
**Social history:** {social_history}
**History of chronic illness:** {chronic_illness}
**Obstetric history:** {obs}

**Vitals:**
**Height:** {doc_hgt}
**Weight:** {doc_wgt}
**Heart rate:** {doc_bpm}
**Blood pressure:** {doc_bpr}
**Mean upper arm circumference:** {doc_muc}
**Temperature:** {doc_tmp}
**Respiratory rate:** {doc_rr}
**SpO2:** {doc_sp2}

**Chief complaint:** {cc}

**Clinical notes:**
{clinical_notes_clean}

**Structured examinations recorded:** {examination}",
    slots: &[
        Slot {
            placeholder: "age",
            accessor: |doc, _| Ok(Some(doc.age.clone())),
        },
        Slot {
            placeholder: "gender",
            accessor: |doc, _| Ok(Some(doc.gender.clone())),
        },
        Slot {
            placeholder: "allergies",
            accessor: |doc, _| Ok(doc.allergies.clone()),
        },
        Slot {
            placeholder: "social_history",
            accessor: |doc, _| Ok(doc.social_history.clone()),
        },
        Slot {
            placeholder: "chronic_illness",
            accessor: |doc, _| Ok(doc.chronic_illness.clone()),
        },
        Slot {
            placeholder: "obs",
            accessor: |doc, _| Ok(doc.obs.clone()),
        },
        Slot {
            placeholder: "doc_hgt",
            accessor: |doc, _| Ok(doc.doc_hgt.map(format_measurement)),
        },
        Slot {
            placeholder: "doc_wgt",
            accessor: |doc, _| Ok(doc.doc_wgt.map(format_measurement)),
        },
        Slot {
            placeholder: "doc_bpm",
            accessor: |doc, _| Ok(doc.doc_bpm.map(format_measurement)),
        },
        Slot {
            placeholder: "doc_bpr",
            accessor: |doc, _| Ok(doc.doc_bpr.clone()),
        },
        Slot {
            placeholder: "doc_muc",
            accessor: |doc, _| Ok(doc.doc_muc.clone()),
        },
        Slot {
            placeholder: "doc_tmp",
            accessor: |doc, _| Ok(doc.doc_tmp.map(format_measurement)),
        },
        Slot {
            placeholder: "doc_rr",
            accessor: |doc, _| Ok(doc.doc_rr.map(format_measurement)),
        },
        Slot {
            placeholder: "doc_sp2",
            accessor: |doc, _| Ok(doc.doc_sp2.map(format_measurement)),
        },
        Slot {
            placeholder: "cc",
            accessor: |doc, _| Ok(doc.cc.clone()),
        },
        Slot {
            placeholder: "clinical_notes_clean",
            accessor: |doc, _| Ok(doc.clinical_notes_clean.clone()),
        },
        Slot {
            placeholder: "examination",
            accessor: |doc, _| Ok(doc.examination.clone()),
        },
    ],
};

pub const INVESTIGATIONS: Template = Template {
    name: "investigations",
    body: "**Investigations conducted:**
{lab_test_clean}",
    slots: &[Slot {
        placeholder: "lab_test_clean",
        accessor: |doc, config| doc.lab_test_clean(config),
    }],
};

pub const DIAGNOSIS: Template = Template {
    name: "diagnosis",
    body: "**Diagnoses:**
{dx}",
    slots: &[Slot {
        placeholder: "dx",
        accessor: |doc, _| Ok(doc.dx.clone()),
    }],
};

pub const TREATMENT: Template = Template {
    name: "treatment",
    body: "**Referrals:**
{referrals}

**Medications:**
{rx}",
    slots: &[
        Slot {
            placeholder: "referrals",
            accessor: |doc, _| Ok(doc.referrals.clone()),
        },
        Slot {
            placeholder: "rx",
            accessor: |doc, _| Ok(doc.rx.clone()),
        },
    ],
};
