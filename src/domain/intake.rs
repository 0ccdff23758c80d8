//! Intake step application
//!
//! Pure function that validates a step payload and folds it into a session.

use serde::{Deserialize, Serialize};

use crate::errors::{MediateError, Result};
use crate::schemas::{Config, IntakeStep, Session, StepPayload};

use super::payloads::validate_step;

/// Where the party goes after a successful step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "step")]
pub enum NextStep {
    Step(IntakeStep),
    FinalSubmission,
}

impl std::fmt::Display for NextStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NextStep::Step(step) => write!(f, "step {} ({})", step.number(), step),
            NextStep::FinalSubmission => write!(f, "final_submission"),
        }
    }
}

/// Validate `payload` for `step` and return the updated session.
///
/// The input session is never modified; on error nothing is merged and
/// `current_step` stays where it was. Resubmitting a completed step
/// overwrites its draft slot and keeps it completed. Once every step is
/// completed, `current_step` stays on the step just submitted and the
/// session reports [`Session::is_complete`].
pub fn apply_step(
    session: &Session,
    step: IntakeStep,
    payload: StepPayload,
    config: &Config,
) -> Result<(Session, NextStep)> {
    if session.archived {
        return Err(MediateError::SessionArchived(session.session_id.clone()));
    }
    if payload.step() != step {
        return Err(MediateError::invalid_field(
            Some(step),
            "step",
            format!("payload is for step {}", payload.step()),
        ));
    }

    let errors = validate_step(&payload, config);
    if !errors.is_empty() {
        return Err(MediateError::Validation {
            step: Some(step),
            errors,
        });
    }

    let mut next = session.clone();
    next.draft.merge(payload);
    next.completed_steps.insert(step);
    let next_step = match next.next_incomplete_after(step) {
        Some(s) => {
            next.current_step = s;
            NextStep::Step(s)
        }
        None => NextStep::FinalSubmission,
    };
    next.touch();

    Ok((next, next_step))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::schemas::{
        Background, CaseOverview, CaseType, DesiredOutcomes, Documents, IntakeStep,
        MeetingFormat, PartiesStep, Party, Scheduling, StepPayload,
    };

    /// A valid payload for every step
    pub fn valid_payload(step: IntakeStep) -> StepPayload {
        match step {
            IntakeStep::CaseOverview => StepPayload::CaseOverview(CaseOverview {
                title: "Fence line dispute".into(),
                description: "Neighbours disagree on where the fence goes".into(),
                case_type: CaseType::Neighborhood,
                priority: None,
                amount_in_dispute: None,
            }),
            IntakeStep::Parties => StepPayload::Parties(PartiesStep {
                parties: vec![Party {
                    name: "Robin".into(),
                    contact: "robin@example.com".into(),
                    role: "claimant".into(),
                }],
            }),
            IntakeStep::Background => StepPayload::Background(Background {
                timeline: "Survey in May, fence built in June".into(),
                key_issues: vec!["boundary".into()],
                prior_attempts: None,
            }),
            IntakeStep::DesiredOutcomes => StepPayload::DesiredOutcomes(DesiredOutcomes {
                desired_outcome: "Move the fence".into(),
                acceptable_compromises: Some("Share the cost".into()),
                non_negotiables: None,
            }),
            IntakeStep::Scheduling => StepPayload::Scheduling(Scheduling {
                availability: vec!["Saturdays".into()],
                preferred_format: MeetingFormat::InPerson,
                timezone: "Europe/London".into(),
            }),
            IntakeStep::Documents => StepPayload::Documents(Documents {
                documents: vec![],
                confidentiality_acknowledged: true,
            }),
        }
    }

    /// An invalid payload for every step
    pub fn invalid_payload(step: IntakeStep) -> StepPayload {
        match valid_payload(step) {
            StepPayload::CaseOverview(mut p) => {
                p.title.clear();
                StepPayload::CaseOverview(p)
            }
            StepPayload::Parties(mut p) => {
                p.parties.clear();
                StepPayload::Parties(p)
            }
            StepPayload::Background(mut p) => {
                p.timeline.clear();
                StepPayload::Background(p)
            }
            StepPayload::DesiredOutcomes(mut p) => {
                p.desired_outcome.clear();
                StepPayload::DesiredOutcomes(p)
            }
            StepPayload::Scheduling(mut p) => {
                p.timezone.clear();
                StepPayload::Scheduling(p)
            }
            StepPayload::Documents(mut p) => {
                p.confidentiality_acknowledged = false;
                StepPayload::Documents(p)
            }
        }
    }
}
