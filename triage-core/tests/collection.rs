use std::collections::BTreeSet;
use std::fs;

use chrono::{DateTime, TimeZone, Utc};
use triage_core::{
    calls_from_str, Call, CallCollection, Category, Observation, Recommendation,
    ResponsePayload, Severity, SignalSummary, TriageError,
};

fn fixture_path(name: &str) -> String {
    format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, minute, 0).unwrap()
}

fn observation(severity: Severity) -> Observation {
    Observation {
        severity,
        reason: format!("{severity} finding"),
    }
}

fn recommendation(severity: Severity) -> Recommendation {
    Recommendation {
        severity,
        action: format!("{severity} action"),
    }
}

fn call(category: Category, minute: u32, color: Severity) -> Call {
    let payload = ResponsePayload::new(vec![observation(color)], Vec::new()).unwrap();
    Call::new(category, payload, "clin-001", at(minute))
}

#[test]
fn empty_payload_is_rejected() {
    assert_eq!(
        ResponsePayload::new(Vec::new(), Vec::new()),
        Err(TriageError::EmptyResponse)
    );
    assert!(ResponsePayload::new(vec![observation(Severity::Green)], Vec::new()).is_ok());
    assert!(ResponsePayload::new(Vec::new(), vec![recommendation(Severity::Green)]).is_ok());
}

#[test]
fn empty_payload_is_rejected_when_deserialized() {
    let err = serde_json::from_str::<ResponsePayload>(r#"{"Response": [], "Recommendations": []}"#)
        .unwrap_err();
    assert!(err.to_string().contains("at least one response value"));

    let err = serde_json::from_str::<ResponsePayload>("{}").unwrap_err();
    assert!(err.to_string().contains("at least one response value"));
}

#[test]
fn call_color_pools_both_finding_kinds() {
    let payload = ResponsePayload::new(
        vec![observation(Severity::Green), observation(Severity::Red)],
        vec![recommendation(Severity::Yellow)],
    )
    .unwrap();
    let call = Call::new(Category::ClinicalNotes, payload, "clin-001", at(0));

    assert_eq!(call.color(), Severity::Red);
    assert_eq!(
        call.response().severities_seen(),
        BTreeSet::from([Severity::Green, Severity::Yellow, Severity::Red])
    );
}

#[test]
fn recommendation_alone_sets_color() {
    let payload = ResponsePayload::new(
        vec![observation(Severity::Green)],
        vec![recommendation(Severity::Yellow), recommendation(Severity::Yellow)],
    )
    .unwrap();
    let call = Call::new(Category::TreatmentRecommendation, payload, "clin-001", at(0));
    assert_eq!(call.color(), Severity::Yellow);
}

#[test]
fn for_category_filters_scopes_and_keeps_order() {
    let calls: CallCollection = vec![
        call(Category::DiagnosisEvaluation, 30, Severity::Green),
        call(Category::ClinicalNotes, 10, Severity::Red),
        call(Category::DiagnosisEvaluation, 20, Severity::Yellow),
    ]
    .into_iter()
    .collect();

    let diagnosis = calls.for_category(Category::DiagnosisEvaluation);

    assert_eq!(diagnosis.scope(), Some(Category::DiagnosisEvaluation));
    assert_eq!(diagnosis.len(), 2);
    let minutes: Vec<_> = diagnosis.calls().iter().map(|c| c.time()).collect();
    assert_eq!(minutes, vec![at(30), at(20)]);
    assert!(diagnosis.final_call().is_ok());

    // source untouched
    assert_eq!(calls.len(), 3);
    assert_eq!(calls.scope(), None);
}

#[test]
fn for_categories_leaves_scope_unset() {
    let calls = CallCollection::new(vec![
        call(Category::DiagnosisEvaluation, 0, Severity::Green),
        call(Category::ClinicalNotes, 1, Severity::Red),
        call(Category::TreatmentRecommendation, 2, Severity::Yellow),
    ]);

    let subset = calls.for_categories(&[Category::DiagnosisEvaluation, Category::ClinicalNotes]);

    assert_eq!(subset.len(), 2);
    assert_eq!(subset.scope(), None);
    assert_eq!(
        subset.final_call().unwrap_err(),
        TriageError::NoScope { query: "final" }
    );
    assert_eq!(
        subset.first_color().unwrap_err(),
        TriageError::NoScope { query: "first" }
    );
}

#[test]
fn temporal_queries_pick_earliest_and_latest() {
    let calls = CallCollection::new(vec![
        call(Category::DiagnosisEvaluation, 20, Severity::Red),
        call(Category::DiagnosisEvaluation, 10, Severity::Yellow),
    ]);
    let scoped = calls.for_category(Category::DiagnosisEvaluation);

    assert_eq!(scoped.final_call().unwrap().map(Call::time), Some(at(20)));
    assert_eq!(scoped.final_color(), Ok(Some(Severity::Red)));
    assert_eq!(scoped.first().unwrap().map(Call::time), Some(at(10)));
    assert_eq!(scoped.first_color(), Ok(Some(Severity::Yellow)));
    assert_eq!(scoped.final_red(), Ok(Some(true)));
    assert_eq!(scoped.first_red(), Ok(Some(false)));
    assert_eq!(scoped.final_red_yellow(), Ok(Some(true)));

    assert!(calls.any_final_color(Severity::Red));
    assert!(!calls.any_final_color(Severity::Green));
    assert!(calls.any_first_color(Severity::Yellow));
    assert!(!calls.any_first_red());
}

#[test]
fn equal_timestamps_resolve_deterministically() {
    let calls = CallCollection::new(vec![
        call(Category::ClinicalNotes, 5, Severity::Green),
        call(Category::ClinicalNotes, 5, Severity::Red),
    ])
    .for_category(Category::ClinicalNotes);

    for _ in 0..3 {
        assert_eq!(calls.first_color(), Ok(Some(Severity::Green)));
        assert_eq!(calls.final_color(), Ok(Some(Severity::Red)));
    }
}

#[test]
fn empty_collection_has_no_data_rather_than_errors() {
    let scoped = CallCollection::default().for_category(Category::ClinicalNotes);
    assert_eq!(scoped.first().unwrap(), None);
    assert_eq!(scoped.final_call().unwrap(), None);
    assert_eq!(scoped.final_is_color(Severity::Red), Ok(None));
    assert_eq!(scoped.first_is_color(Severity::Red), Ok(None));

    let unscoped = CallCollection::default();
    assert_eq!(unscoped.colors_seen(), None);
    assert_eq!(unscoped.worst_color(), None);
    assert_eq!(unscoped.ever_had_color(Severity::Green), None);
    assert_eq!(unscoped.ever_red_yellow(), None);
    assert!(!unscoped.any_final_red_yellow());
}

#[test]
fn existential_queries_ignore_scope() {
    let calls = CallCollection::new(vec![
        call(Category::ClinicalNotes, 0, Severity::Green),
        call(Category::TreatmentRecommendation, 1, Severity::Yellow),
    ]);

    assert_eq!(
        calls.colors_seen(),
        Some(BTreeSet::from([Severity::Green, Severity::Yellow]))
    );
    assert_eq!(calls.worst_color(), Some(Severity::Yellow));
    assert_eq!(calls.ever_red(), Some(false));
    assert_eq!(calls.ever_had_color(Severity::Green), Some(true));
    assert_eq!(calls.ever_red_yellow(), Some(true));
    assert!(calls.any_final_red_yellow());
    assert!(!calls.any_final_red());
}

#[test]
fn encounter_fixture_matches_golden_summary() {
    let raw = fs::read_to_string(fixture_path("encounter_calls.json"))
        .expect("could not read encounter fixture");
    let calls = calls_from_str(&raw).expect("fixture calls should load");

    let expected = fs::read_to_string(fixture_path("encounter_summary.json"))
        .expect("could not read golden summary");
    let expected: SignalSummary = serde_json::from_str(&expected).expect("golden is invalid");

    assert_eq!(calls.summarize(), expected);

    let treatment = calls.for_category(Category::TreatmentRecommendation);
    let first = treatment.first().unwrap().unwrap();
    assert_eq!(first.acknowledged(), Some(true));
    assert_eq!(first.user_id(), "clin-014");
}

#[test]
fn summary_edges_agree_with_scoped_queries() {
    let calls: CallCollection = vec![
        call(Category::DiagnosisEvaluation, 20, Severity::Red),
        call(Category::DiagnosisEvaluation, 5, Severity::Green),
        call(Category::ClinicalNotes, 12, Severity::Yellow),
    ]
    .into_iter()
    .collect();
    let summary = calls.summarize();

    for category in Category::ALL {
        let scoped = calls.for_category(category);
        let signal = summary.category(category).unwrap();
        assert_eq!(signal.first_color, scoped.first_color().unwrap(), "{category}");
        assert_eq!(signal.final_color, scoped.final_color().unwrap(), "{category}");
    }

    let diagnosis = summary.category(Category::DiagnosisEvaluation).unwrap();
    assert_eq!(diagnosis.first_color, Some(Severity::Green));
    assert_eq!(diagnosis.final_color, Some(Severity::Red));
    let vitals = summary.category(Category::VitalsChiefComplaintEvaluation).unwrap();
    assert_eq!((vitals.calls, vitals.first_color), (0, None));
}

#[test]
fn epoch_and_short_timestamps_load() {
    let raw = r#"[
        {
            "rule": "Clinical Notes",
            "response": { "Response": [{ "Severity": "Green", "Reason": "ok" }] },
            "user_id": "clin-001",
            "time": 1714554000,
            "thumbs_up_down": "None",
            "user_role_prompt": "",
            "silent": "Active"
        },
        {
            "rule": "Clinical Notes",
            "response": { "Response": [{ "Severity": "Red", "Reason": "worse" }] },
            "user_id": "clin-001",
            "time": "2024-05-01T09:30",
            "thumbs_up_down": "Up",
            "user_role_prompt": "",
            "silent": "Active"
        }
    ]"#;

    let calls = calls_from_str(raw).unwrap();
    let notes = calls.for_category(Category::ClinicalNotes);
    assert_eq!(notes.first().unwrap().unwrap().time(), at(0));
    assert_eq!(notes.final_color().unwrap(), Some(Severity::Red));
}

#[test]
fn one_bad_call_rejects_the_load() {
    let raw = r#"[
        {
            "rule": "Clinical Notes",
            "response": { "Response": [{ "Severity": "Amber", "Reason": "?" }], "Recommendations": [] },
            "user_id": "clin-001",
            "time": "2024-05-01T09:00:00Z",
            "thumbs_up_down": "None",
            "user_role_prompt": "",
            "silent": "Active"
        }
    ]"#;

    match calls_from_str(raw) {
        Err(TriageError::InvalidCall { index, reason }) => {
            assert_eq!(index, 0);
            assert!(reason.contains("invalid severity: Amber"), "{reason}");
        }
        other => panic!("expected rejected call, got {other:?}"),
    }

    assert!(matches!(calls_from_str("42"), Err(TriageError::Json(_))));
}
