//! Shared helpers for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use mediate::schemas::{IntakeStep, ResolutionPayload, StepPayload, INTAKE_STEPS};
use mediate::timeline::MemoryTimelineSink;
use mediate::{Actor, Config, DocumentStore, Mediation};
use serde_json::json;

pub fn service() -> (Mediation<DocumentStore>, Arc<MemoryTimelineSink>) {
    let sink = Arc::new(MemoryTimelineSink::new());
    let m = Mediation::new(DocumentStore::in_memory(), Config::default()).with_timeline(sink.clone());
    (m, sink)
}

pub fn admin() -> Actor {
    Actor::admin("admin-1")
}

/// Step payloads as a client would send them
pub fn step_json(step: IntakeStep, party_name: &str) -> StepPayload {
    let value = match step {
        IntakeStep::CaseOverview => json!({
            "step": "case_overview",
            "title": "Unpaid invoice for kitchen refit",
            "description": "Contractor says the final invoice is due; client disputes quality",
            "case_type": "commercial",
            "priority": "high"
        }),
        IntakeStep::Parties => json!({
            "step": "parties",
            "parties": [{ "name": party_name, "contact": "+44 20 7946 0000", "role": "respondent" }]
        }),
        IntakeStep::Background => json!({
            "step": "background",
            "timeline": "Work finished in March; invoice sent in April",
            "key_issues": ["tiling quality", "late completion"]
        }),
        IntakeStep::DesiredOutcomes => json!({
            "step": "desired_outcomes",
            "desired_outcome": "Partial refund"
        }),
        IntakeStep::Scheduling => json!({
            "step": "scheduling",
            "availability": ["weekday evenings"],
            "preferred_format": "online",
            "timezone": "Europe/London"
        }),
        IntakeStep::Documents => json!({
            "step": "documents",
            "documents": [{ "name": "invoice.pdf", "storage_key": "uploads/abc123" }],
            "confidentiality_acknowledged": true
        }),
    };
    serde_json::from_value(value).expect("fixture payload should deserialize")
}

pub fn complete_intake(m: &Mediation<DocumentStore>, actor: &Actor, session_id: &str) {
    for &step in INTAKE_STEPS {
        m.submit_step(actor, session_id, step, step_json(step, &actor.id))
            .unwrap();
    }
}

/// Party A intake through finalize; returns (session_id, case_id)
pub fn party_a_case(m: &Mediation<DocumentStore>, owner: &str) -> (String, String) {
    let actor = Actor::party(owner);
    let session = m.create_session(&actor).unwrap();
    complete_intake(m, &actor, &session.session_id);
    let case_id = m.finalize(&actor, &session.session_id).unwrap();
    (session.session_id, case_id)
}

pub fn register(m: &Mediation<DocumentStore>, ids: &[&str], max: Option<usize>) {
    for id in ids {
        m.register_panelist(&admin(), id, &format!("Panelist {}", id), max)
            .unwrap();
    }
}

pub fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

pub fn resolution() -> ResolutionPayload {
    serde_json::from_value(json!({
        "resolution_status": "resolved",
        "notes": "Both parties accept a 30% refund against the final invoice for the tiling.",
        "outcome": "30% refund",
        "recommendations": "Written snag list before final payment"
    }))
    .expect("fixture resolution should deserialize")
}
