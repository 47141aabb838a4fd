//! Framework-neutral WASM <-> JavaScript bridge.

use serde::Deserialize;
use serde_wasm_bindgen::{from_value, to_value};
use triage_core::TriageError;
use triage_notes::{ClinicalDocumentation, NotesConfig, UnknownFieldPolicy};
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
struct JsNotesConfig {
    #[serde(default)]
    boilerplate_header: Option<String>,
    #[serde(default)]
    unknown_field_policy: Option<UnknownFieldPolicy>,
}

impl From<JsNotesConfig> for NotesConfig {
    fn from(cfg: JsNotesConfig) -> Self {
        let mut base = NotesConfig::default();
        if let Some(header) = cfg.boilerplate_header {
            base.boilerplate_header = header;
        }
        if let Some(policy) = cfg.unknown_field_policy {
            base.unknown_field_policy = policy;
        }
        base
    }
}

fn notes_config(config: Option<JsValue>) -> Result<NotesConfig, JsValue> {
    match config {
        Some(js_cfg) => {
            let cfg: JsNotesConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Could not read config: {err}")))?;
            Ok(NotesConfig::from(cfg))
        }
        None => Ok(NotesConfig::default()),
    }
}

/// Summarize an array of AI calls (or `{ calls: [...] }`) into severity signals.
#[wasm_bindgen]
pub fn summarize_calls(input_calls: JsValue) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let calls_value = from_value::<serde_json::Value>(input_calls)
        .map_err(|err| JsValue::from_str(&format!("Could not read calls JSON: {err}")))?;

    let calls = triage_core::calls_from_value(&calls_value)
        .map_err(|err| JsValue::from_str(&format_triage_error(err)))?;

    to_value(&calls.summarize())
        .map_err(|err| JsValue::from_str(&format!("Could not serialize summary: {err}")))
}

/// Render the history, investigations, diagnosis and treatment blocks of a record.
#[wasm_bindgen]
pub fn render_note(record: JsValue, config: Option<JsValue>) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let doc: ClinicalDocumentation = from_value(record)
        .map_err(|err| JsValue::from_str(&format!("Could not read record: {err}")))?;
    let cfg = notes_config(config)?;

    let note = doc
        .render_all(&cfg)
        .map_err(|err| JsValue::from_str(&format_triage_error(err)))?;

    to_value(&note).map_err(|err| JsValue::from_str(&format!("Could not serialize note: {err}")))
}

/// Normalize a lab-results text block.
#[wasm_bindgen]
pub fn normalize_investigations(text: &str, config: Option<JsValue>) -> Result<String, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let cfg = notes_config(config)?;
    triage_notes::normalize_investigations(text, &cfg)
        .map_err(|err| JsValue::from_str(&format_triage_error(err)))
}

fn format_triage_error(err: TriageError) -> String {
    format!("Triage error: {err}")
}
