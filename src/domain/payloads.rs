//! Field-level rules for intake steps and resolution payloads

use crate::errors::FieldError;
use crate::schemas::{
    Background, CaseOverview, Config, DesiredOutcomes, Documents, PartiesStep, ResolutionOutcome,
    ResolutionPayload, Scheduling, StepPayload, MIN_RESOLUTION_NOTES,
};

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn require(errors: &mut Vec<FieldError>, field: &str, value: &str) {
    if blank(value) {
        errors.push(FieldError::new(field, "is required"));
    }
}

/// Validate one step's payload. An empty result means the payload is valid.
pub fn validate_step(payload: &StepPayload, config: &Config) -> Vec<FieldError> {
    match payload {
        StepPayload::CaseOverview(p) => validate_overview(p, config.max_title_length),
        StepPayload::Parties(p) => validate_parties(p),
        StepPayload::Background(p) => validate_background(p),
        StepPayload::DesiredOutcomes(p) => validate_desired_outcomes(p),
        StepPayload::Scheduling(p) => validate_scheduling(p),
        StepPayload::Documents(p) => validate_documents(p),
    }
}

fn validate_overview(p: &CaseOverview, max_title_length: usize) -> Vec<FieldError> {
    let mut errors = Vec::new();
    require(&mut errors, "title", &p.title);
    if p.title.trim().chars().count() > max_title_length {
        errors.push(FieldError::new(
            "title",
            format!("must be at most {} characters", max_title_length),
        ));
    }
    require(&mut errors, "description", &p.description);
    errors
}

fn validate_parties(p: &PartiesStep) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if p.parties.is_empty() {
        errors.push(FieldError::new("parties", "must list at least one party"));
    }
    for (i, party) in p.parties.iter().enumerate() {
        require(&mut errors, &format!("parties[{}].name", i), &party.name);
        require(&mut errors, &format!("parties[{}].contact", i), &party.contact);
    }
    errors
}

fn validate_background(p: &Background) -> Vec<FieldError> {
    let mut errors = Vec::new();
    require(&mut errors, "timeline", &p.timeline);
    if p.key_issues.iter().all(|issue| blank(issue)) {
        errors.push(FieldError::new(
            "key_issues",
            "must contain at least one issue",
        ));
    }
    errors
}

fn validate_desired_outcomes(p: &DesiredOutcomes) -> Vec<FieldError> {
    let mut errors = Vec::new();
    require(&mut errors, "desired_outcome", &p.desired_outcome);
    errors
}

fn validate_scheduling(p: &Scheduling) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if p.availability.iter().all(|slot| blank(slot)) {
        errors.push(FieldError::new(
            "availability",
            "must contain at least one slot",
        ));
    }
    require(&mut errors, "timezone", &p.timezone);
    errors
}

fn validate_documents(p: &Documents) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if !p.confidentiality_acknowledged {
        errors.push(FieldError::new(
            "confidentiality_acknowledged",
            "must be accepted",
        ));
    }
    for (i, doc) in p.documents.iter().enumerate() {
        require(&mut errors, &format!("documents[{}].name", i), &doc.name);
        require(
            &mut errors,
            &format!("documents[{}].storage_key", i),
            &doc.storage_key,
        );
    }
    errors
}

/// Validate a resolution for submission.
///
/// `min_notes` below [`MIN_RESOLUTION_NOTES`] is raised to it.
pub fn validate_resolution(payload: &ResolutionPayload, min_notes: usize) -> Vec<FieldError> {
    let min_notes = min_notes.max(MIN_RESOLUTION_NOTES);
    let mut errors = Vec::new();
    match payload.resolution_status {
        None => errors.push(FieldError::new(
            "resolution_status",
            "must be resolved or no_outcome",
        )),
        Some(ResolutionOutcome::Resolved) => {
            let missing = payload.outcome.as_deref().map(blank).unwrap_or(true);
            if missing {
                errors.push(FieldError::new(
                    "outcome",
                    "is required when the case is resolved",
                ));
            }
        }
        Some(ResolutionOutcome::NoOutcome) => {}
    }
    let notes_len = payload.notes.trim().chars().count();
    if notes_len < min_notes {
        errors.push(FieldError::new(
            "notes",
            format!("must be at least {} characters (got {})", min_notes, notes_len),
        ));
    }
    errors
}
