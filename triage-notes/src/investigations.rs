//! Normalization of the free-text lab results field.
//!
//! The upstream export writes each investigation as `Name: key: value, key: value`,
//! separates investigations with a blank line and is loose with punctuation. Values
//! may contain commas (`13,400`) and further colons, so splitting is driven by what
//! follows a comma rather than by the comma itself.

use std::cmp::Ordering;

use tracing::{debug, warn};
use triage_core::{TriageError, TriageResult};

use crate::{NotesConfig, UnknownFieldPolicy, NOT_RECORDED};

const FULL_HAEMOGRAM: &[&str] = &[
    "Result..",
    "WBC",
    "HGB",
    "HCT",
    "Plt",
    "RBC (Full Haemogram)",
    "MCV",
    "MCH",
    "MCHC",
    "RDW-CV",
    "RDW-SD",
    "Neutrophill percentage",
    "Mid-granulocyte Percentage",
    "Lymphocyte Percentage",
    "Neutrophill count",
    "Mid-granulocytes Count",
    "Lymphocytes Count",
    "MPV",
    "PDW",
    "PCT",
    "P-LCR",
    "P-LCC",
];

const URINE_ANALYSIS: &[&str] = &[
    "Result..",
    "Colour.",
    "Appearance (Urine Analysis)",
    "pH (Dipstick)",
    "Specific Gravity",
    "Glucose",
    "Ketones",
    "Proteins",
    "Blood (Dipstick)",
    "Leukocytes",
    "Nitrate",
    "Urobilinogen",
    "Pus cells",
    "RBC's (Urinalysis-Microscopy)",
    "Epithelial Cells",
    "Crystals -- Amount (Microscopy)",
    "Parasites (Urine Microscopy)",
    "Trichomonads (Urinalysis-Microscopy)",
    "Yeast cells (Microscopy)",
    "Amount of yeast cells",
    "Bilirubin.",
    "Casts - type",
    "Crystals -- Type",
];

const STOOL_MICROSCOPY: &[&str] = &[
    "Result..",
    "Colour",
    "Consistency",
    "Blood (Gross Appearance)",
    "Mucous",
    "RBC's (Microscopy)",
    "Pus cells",
    "Parasites",
    "Yeast cells (Microscopy)",
    "Amount of yeast cells",
    "Crystals -- Amount",
    "Crystals -- Type",
];

/// Declared field order for a known lab panel.
pub fn field_order(investigation: &str) -> Option<&'static [&'static str]> {
    match investigation {
        "Full Haemogram (FHG)" => Some(FULL_HAEMOGRAM),
        "Urine Analysis" => Some(URINE_ANALYSIS),
        "Stool Microscopy" => Some(STOOL_MICROSCOPY),
        _ => None,
    }
}

/// Rewrite lab results into one sorted bullet list per investigation.
///
/// Empty input stays empty and the `Not recorded` sentinel passes through untouched.
pub fn normalize_investigations(text: &str, config: &NotesConfig) -> TriageResult<String> {
    if text.is_empty() {
        return Ok(String::new());
    }
    if text == NOT_RECORDED {
        return Ok(text.to_string());
    }

    let mut cleaned = text.replace("\r\n", "\n");
    if !config.boilerplate_header.is_empty() {
        cleaned = cleaned.replace(&config.boilerplate_header, "");
    }
    // The export sometimes doubles the key/value separator.
    let cleaned = cleaned.replace("::", ":");

    let rendered = split_blocks(&cleaned)
        .map(|block| InvestigationBlock::parse(block)?.render(config))
        .collect::<TriageResult<Vec<_>>>()?;

    debug!(blocks = rendered.len(), "normalized investigation text");
    Ok(rendered.join("\n\n"))
}

/// Investigations are separated by a blank line. Blank blocks are skipped.
pub fn split_blocks(text: &str) -> impl Iterator<Item = &str> {
    text.split("\n\n").filter(|block| !block.trim().is_empty())
}

/// Split an investigation body into `key: value` chunks.
///
/// A comma separates two pairs only when what follows it (up to the next comma) is a
/// non-empty run of text ending in a colon, i.e. the start of a new `key:`. Any other
/// comma belongs to the value.
pub fn split_pairs(body: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;

    for (index, ch) in body.char_indices() {
        if ch == ',' && opens_pair(&body[index + 1..]) {
            chunks.push(&body[start..index]);
            start = index + 1;
        }
    }
    chunks.push(&body[start..]);
    chunks
}

fn opens_pair(rest: &str) -> bool {
    match rest.find(|c: char| c == ',' || c == ':') {
        Some(pos) => pos > 0 && rest[pos..].starts_with(':'),
        None => false,
    }
}

fn is_result_key(key: &str) -> bool {
    key.ends_with('.') && key.to_lowercase().contains("result")
}

/// One named investigation and its fields in the order they were written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvestigationBlock {
    name: String,
    fields: Vec<(String, String)>,
}

impl InvestigationBlock {
    pub fn parse(block: &str) -> TriageResult<Self> {
        let (name, body) = block.split_once(':').ok_or_else(|| {
            TriageError::Parse(format!(
                "investigation has no name separator: {:?}",
                block.trim()
            ))
        })?;

        let mut fields: Vec<(String, String)> = Vec::new();
        for chunk in split_pairs(body.trim()) {
            let (key, value) = chunk.split_once(':').ok_or_else(|| {
                TriageError::Parse(format!(
                    "{:?} in {:?} is not a key: value pair",
                    chunk.trim(),
                    name.trim()
                ))
            })?;
            let (key, value) = (key.trim(), value.trim());

            // a repeated key keeps its first position and takes the later value
            match fields.iter_mut().find(|(existing, _)| existing == key) {
                Some(field) => field.1 = value.to_string(),
                None => fields.push((key.to_string(), value.to_string())),
            }
        }

        Ok(Self {
            name: name.trim().to_string(),
            fields,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// `Name: ` then result fields as written, then every other field sorted.
    pub fn render(&self, config: &NotesConfig) -> TriageResult<String> {
        let (results, mut remaining): (Vec<_>, Vec<_>) = self
            .fields
            .iter()
            .partition(|(key, _)| is_result_key(key));
        self.sort_fields(&mut remaining, config.unknown_field_policy)?;

        let mut rendered = format!("{}: ", self.name);
        for (key, value) in results.into_iter().chain(remaining) {
            rendered.push_str(&format!("\n* {key}: {value}"));
        }
        Ok(rendered)
    }

    fn sort_fields(
        &self,
        fields: &mut [&(String, String)],
        policy: UnknownFieldPolicy,
    ) -> TriageResult<()> {
        let Some(order) = field_order(&self.name) else {
            fields.sort_by(|a, b| a.0.cmp(&b.0));
            return Ok(());
        };

        let position = |key: &str| order.iter().position(|known| *known == key);

        for (key, _) in fields.iter().filter(|(key, _)| position(key.as_str()).is_none()) {
            match policy {
                UnknownFieldPolicy::Reject => {
                    return Err(TriageError::UnknownField {
                        investigation: self.name.clone(),
                        field: key.clone(),
                    })
                }
                UnknownFieldPolicy::AppendAlphabetical => {
                    warn!(
                        investigation = %self.name,
                        field = %key,
                        "field missing from investigation order, placing it alphabetically"
                    );
                }
            }
        }

        fields.sort_by(|a, b| match (position(a.0.as_str()), position(b.0.as_str())) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_inside_value_does_not_split() {
        assert_eq!(
            split_pairs("WBC: 7.2, HGB: 13,400"),
            vec!["WBC: 7.2", " HGB: 13,400"]
        );
    }

    #[test]
    fn comma_before_free_text_stays_in_value() {
        assert_eq!(
            split_pairs("Comment: turbid, dark, Colour.: Amber"),
            vec!["Comment: turbid, dark", " Colour.: Amber"]
        );
    }

    #[test]
    fn comma_followed_by_colon_needs_a_key() {
        // nothing between the comma and the colon: not a new pair
        assert_eq!(split_pairs("A: 1,: 2"), vec!["A: 1,: 2"]);
        // whitespace alone counts as a key run
        assert_eq!(split_pairs("A: 1, : 2"), vec!["A: 1", " : 2"]);
    }

    #[test]
    fn value_may_hold_more_colons() {
        let block =
            InvestigationBlock::parse("Malaria RDT: Time: 10:45, Result.: Negative").unwrap();
        assert_eq!(block.name(), "Malaria RDT");
        assert_eq!(
            block.fields(),
            &[
                ("Time".to_string(), "10:45".to_string()),
                ("Result.".to_string(), "Negative".to_string()),
            ]
        );
    }

    #[test]
    fn repeated_key_keeps_position_takes_last_value() {
        let block = InvestigationBlock::parse("Panel: B: 1, A: 2, B: 3").unwrap();
        assert_eq!(
            block.fields(),
            &[
                ("B".to_string(), "3".to_string()),
                ("A".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn result_keys_need_trailing_period() {
        assert!(is_result_key("Result.."));
        assert!(is_result_key("Final RESULT."));
        assert!(!is_result_key("Result"));
        assert!(!is_result_key("Colour."));
    }

    #[test]
    fn known_panels_have_field_orders() {
        assert_eq!(field_order("Full Haemogram (FHG)").map(|o| o[1]), Some("WBC"));
        assert_eq!(field_order("Stool Microscopy").map(<[_]>::len), Some(12));
        assert!(field_order("Widal Test").is_none());
    }
}
