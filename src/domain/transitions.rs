//! State transition logic
//!
//! Pure functions for applying status transitions to cases.

use crate::errors::{MediateError, Result};
use crate::schemas::{Case, CaseStatus, TimelineEntry};

use super::validation::{validate_transition, ValidationContext};

/// A successfully applied transition
#[derive(Debug, Clone)]
pub struct Transitioned {
    /// The case with updated status, timeline and timestamp
    pub case: Case,

    /// The timeline entry that was appended
    pub entry: TimelineEntry,
}

/// Pure function that applies a status transition to a case.
///
/// Never mutates the input. On success the returned case carries the new
/// status and one appended `status_changed` timeline entry; on failure an
/// `InvalidTransition` error is returned.
pub fn apply_status_transition(
    case: &Case,
    target: CaseStatus,
    actor: &str,
    ctx: &ValidationContext,
) -> Result<Transitioned> {
    let validation = validate_transition(case.status, target, ctx);
    if !validation.valid {
        return Err(MediateError::InvalidTransition {
            from: case.status,
            to: target,
            reason: validation
                .reason
                .unwrap_or_else(|| "Transition validation failed".to_string()),
        });
    }

    let entry = TimelineEntry::status_change(actor, case.status, target);
    let mut next = case.clone().with_status(target).with_timeline_entry(entry.clone());
    if target == CaseStatus::Resolved && ctx.admin_override.is_some() && !ctx.progress.is_complete()
    {
        next.admin_resolution = ctx.admin_override.clone();
    }

    Ok(Transitioned { case: next, entry })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::fixtures::case;
    use crate::schemas::{AdminResolution, Progress, TimelineKind};

    #[test]
    fn test_transition_open_to_assigned() {
        let mut c = case(CaseStatus::Open);
        c.assigned_to = Some("admin-1".into());
        let ctx = ValidationContext::for_case(&c, Progress::default());

        let result = apply_status_transition(&c, CaseStatus::Assigned, "admin-1", &ctx).unwrap();
        assert_eq!(result.case.status, CaseStatus::Assigned);
        assert_eq!(result.entry.kind, TimelineKind::StatusChanged);
        assert_eq!(result.entry.actor, "admin-1");
        assert_eq!(result.case.timeline.len(), c.timeline.len() + 1);
    }

    #[test]
    fn test_transition_missing_admin() {
        let c = case(CaseStatus::Open);
        let ctx = ValidationContext::for_case(&c, Progress::default());

        let err = apply_status_transition(&c, CaseStatus::Assigned, "admin-1", &ctx).unwrap_err();
        match err {
            MediateError::InvalidTransition { from, to, reason } => {
                assert_eq!(from, CaseStatus::Open);
                assert_eq!(to, CaseStatus::Assigned);
                assert!(reason.contains("admin"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_transition_from_closed_fails() {
        let c = case(CaseStatus::Closed);
        let ctx = ValidationContext::default().by_admin();
        let err = apply_status_transition(&c, CaseStatus::Open, "admin", &ctx).unwrap_err();
        assert_eq!(err.code(), "INVALID_TRANSITION");
    }

    #[test]
    fn test_transition_does_not_mutate_original() {
        let c = case(CaseStatus::InProgress);
        let before = c.clone();
        let ctx = ValidationContext {
            progress: Progress { submitted: 1, total: 1 },
            ..Default::default()
        };
        let _ = apply_status_transition(&c, CaseStatus::Resolved, "system", &ctx);
        assert_eq!(c, before);
    }

    #[test]
    fn test_override_is_recorded() {
        let c = case(CaseStatus::InProgress);
        let ctx = ValidationContext::default()
            .by_admin()
            .with_override(Some(AdminResolution {
                feedback: "Settled outside mediation".into(),
                next_steps: "Archive after 30 days".into(),
            }));
        let result = apply_status_transition(&c, CaseStatus::Resolved, "admin", &ctx).unwrap();
        assert_eq!(result.case.status, CaseStatus::Resolved);
        assert_eq!(
            result.case.admin_resolution.unwrap().feedback,
            "Settled outside mediation"
        );
    }
}
