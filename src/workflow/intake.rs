//! Intake sessions and Party B join

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{apply_step, NextStep};
use crate::errors::{MediateError, Result};
use crate::schemas::{Actor, IntakeStep, PartyRole, Role, Session, StepPayload};
use crate::store::{CaseStore, Claim, LinkKind};

use super::{new_id, require_role, Mediation};

/// Result of a successful step submission
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub next: NextStep,
    pub session: Session,
}

pub(super) fn require_owner(session: &Session, actor: &Actor) -> Result<()> {
    if session.owner == actor.id {
        Ok(())
    } else {
        warn!(
            session_id = %session.session_id,
            actor = %actor.id,
            "Rejected access to another party's session"
        );
        Err(MediateError::Forbidden(format!(
            "session {} belongs to another party",
            session.session_id
        )))
    }
}

impl<S: CaseStore> Mediation<S> {
    /// Start a new Party A intake session
    pub fn create_session(&self, actor: &Actor) -> Result<Session> {
        require_role(actor, Role::Party, "create_session")?;
        let session = Session::new(new_id(), actor.id.clone());
        if !self.store.insert_session(session.clone())? {
            return Err(MediateError::wrap(
                format!("session id {} already taken", session.session_id),
                "create_session",
            ));
        }
        info!(session_id = %session.session_id, owner = %actor.id, "Created intake session");
        Ok(session)
    }

    /// Read a session for resumption. Admins may read any session.
    pub fn get_session(&self, actor: &Actor, session_id: &str) -> Result<Session> {
        let session = self.store.get_session(session_id)?;
        if !actor.is_admin() {
            require_owner(&session, actor)?;
        }
        Ok(session)
    }

    /// Validate and save one intake step.
    ///
    /// On any error the stored session is untouched.
    pub fn submit_step(
        &self,
        actor: &Actor,
        session_id: &str,
        step: IntakeStep,
        payload: StepPayload,
    ) -> Result<StepOutcome> {
        let mut next = NextStep::Step(step);
        let session = self
            .store
            .update_session(session_id, &mut |session| {
                require_owner(session, actor)?;
                let (updated, next_step) =
                    apply_step(session, step, payload.clone(), &self.config)?;
                *session = updated;
                next = next_step;
                Ok(())
            })
            .inspect_err(|e| {
                warn!(session_id, step = %step, code = e.code(), "Step rejected");
            })?;

        debug!(
            session_id,
            step = %step,
            next = %next,
            completed = session.completed_steps.len(),
            "Saved intake step"
        );
        Ok(StepOutcome { next, session })
    }

    /// Open a Party B session against Party A's session.
    pub fn join_case(&self, actor: &Actor, parent_session_id: &str) -> Result<Session> {
        require_role(actor, Role::Party, "join_case")?;

        let parent = self.store.get_session(parent_session_id)?;
        if parent.role != PartyRole::PartyA {
            return Err(MediateError::not_found("party_a session", parent_session_id));
        }
        if parent.owner == actor.id {
            return Err(MediateError::Forbidden(
                "cannot join your own case as party B".to_string(),
            ));
        }
        if self.store.get_link(LinkKind::PartyB, parent_session_id)?.is_some() {
            return Err(MediateError::AlreadyJoined(parent_session_id.to_string()));
        }
        if let Some(case_id) = self.store.get_link(LinkKind::FinalizedCase, parent_session_id)? {
            let case = self.store.get_case(&case_id)?;
            if case.party_b_submission.is_some() || case.is_closed() {
                return Err(MediateError::not_found("joinable case", parent_session_id));
            }
        }

        let session = Session::joining(new_id(), actor.id.clone(), parent_session_id.to_string());
        if let Claim::Existing(_) =
            self.store
                .claim_link(LinkKind::PartyB, parent_session_id, &session.session_id)?
        {
            warn!(parent_session_id, actor = %actor.id, "Lost join race");
            return Err(MediateError::AlreadyJoined(parent_session_id.to_string()));
        }

        let inserted = self.store.insert_session(session.clone()).and_then(|ok| {
            if ok {
                Ok(())
            } else {
                Err(MediateError::wrap(
                    format!("session id {} already taken", session.session_id),
                    "join_case",
                ))
            }
        });
        if let Err(e) = inserted {
            self.store.release_link(LinkKind::PartyB, parent_session_id)?;
            return Err(e);
        }

        info!(
            session_id = %session.session_id,
            parent_session_id,
            owner = %actor.id,
            "Party B joined"
        );
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::intake::fixtures::{invalid_payload, valid_payload};
    use crate::schemas::CaseStatus;
    use crate::workflow::fixtures::*;

    #[test]
    fn test_create_session_starts_at_step_one() {
        let (m, _) = mediation();
        let s = m.create_session(&Actor::party("user-a")).unwrap();
        assert_eq!(s.current_step, IntakeStep::CaseOverview);
        assert!(s.completed_steps.is_empty());
        assert_eq!(s.role, PartyRole::PartyA);
        assert!(m.create_session(&admin()).is_err());
    }

    #[test]
    fn test_submit_step_advances_and_persists() {
        let (m, _) = mediation();
        let actor = Actor::party("user-a");
        let s = m.create_session(&actor).unwrap();

        let outcome = m
            .submit_step(
                &actor,
                &s.session_id,
                IntakeStep::CaseOverview,
                valid_payload(IntakeStep::CaseOverview),
            )
            .unwrap();
        assert_eq!(outcome.next, NextStep::Step(IntakeStep::Parties));

        let resumed = m.get_session(&actor, &s.session_id).unwrap();
        assert_eq!(resumed.current_step, IntakeStep::Parties);
        assert!(resumed.draft.case_overview.is_some());
    }

    #[test]
    fn test_empty_timeline_rejected_without_advancing() {
        let (m, _) = mediation();
        let actor = Actor::party("user-a");
        let s = m.create_session(&actor).unwrap();
        for step in [IntakeStep::CaseOverview, IntakeStep::Parties] {
            m.submit_step(&actor, &s.session_id, step, valid_payload(step))
                .unwrap();
        }

        let err = m
            .submit_step(
                &actor,
                &s.session_id,
                IntakeStep::Background,
                invalid_payload(IntakeStep::Background),
            )
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        let session = m.get_session(&actor, &s.session_id).unwrap();
        assert_eq!(session.current_step, IntakeStep::Background);
        assert!(session.draft.background.is_none());
    }

    #[test]
    fn test_last_step_reports_final_submission() {
        let (m, _) = mediation();
        let actor = Actor::party("user-a");
        let s = m.create_session(&actor).unwrap();
        let mut last = None;
        for &step in crate::schemas::INTAKE_STEPS {
            last = Some(
                m.submit_step(&actor, &s.session_id, step, valid_payload(step))
                    .unwrap()
                    .next,
            );
        }
        assert_eq!(last, Some(NextStep::FinalSubmission));
    }

    #[test]
    fn test_other_party_cannot_write_or_read() {
        let (m, _) = mediation();
        let s = m.create_session(&Actor::party("user-a")).unwrap();
        let intruder = Actor::party("user-x");
        let err = m
            .submit_step(
                &intruder,
                &s.session_id,
                IntakeStep::CaseOverview,
                valid_payload(IntakeStep::CaseOverview),
            )
            .unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
        assert_eq!(m.get_session(&intruder, &s.session_id).unwrap_err().code(), "FORBIDDEN");
        assert!(m.get_session(&admin(), &s.session_id).is_ok());
    }

    #[test]
    fn test_join_creates_party_b_session() {
        let (m, _) = mediation();
        let parent = completed_session(&m, "user-a");
        let child = m.join_case(&Actor::party("user-b"), &parent).unwrap();
        assert_eq!(child.role, PartyRole::PartyB);
        assert_eq!(child.parent_session_id.as_deref(), Some(parent.as_str()));
        assert_eq!(child.current_step, IntakeStep::CaseOverview);
    }

    #[test]
    fn test_second_join_is_already_joined() {
        let (m, _) = mediation();
        let parent = completed_session(&m, "user-a");
        m.join_case(&Actor::party("user-b"), &parent).unwrap();
        let err = m.join_case(&Actor::party("user-c"), &parent).unwrap_err();
        assert_eq!(err.code(), "ALREADY_JOINED");
    }

    #[test]
    fn test_join_rejections() {
        let (m, _) = mediation();
        assert_eq!(
            m.join_case(&Actor::party("user-b"), "missing").unwrap_err().code(),
            "NOT_FOUND"
        );

        let parent = completed_session(&m, "user-a");
        assert_eq!(
            m.join_case(&Actor::party("user-a"), &parent).unwrap_err().code(),
            "FORBIDDEN"
        );

        let child = m.join_case(&Actor::party("user-b"), &parent).unwrap();
        // a party_b session cannot be joined
        assert_eq!(
            m.join_case(&Actor::party("user-c"), &child.session_id)
                .unwrap_err()
                .code(),
            "NOT_FOUND"
        );
    }

    #[test]
    fn test_join_closed_case_is_not_found() {
        let (m, _) = mediation();
        let parent = completed_session(&m, "user-a");
        let case_id = m.finalize(&Actor::party("user-a"), &parent).unwrap();
        m.update_status(&admin(), &case_id, CaseStatus::Closed, None)
            .unwrap();
        let err = m.join_case(&Actor::party("user-b"), &parent).unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_concurrent_joins_have_one_winner() {
        let (m, _) = mediation();
        let parent = completed_session(&m, "user-a");
        let m = Arc::new(m);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let m = Arc::clone(&m);
                let parent = parent.clone();
                std::thread::spawn(move || m.join_case(&Actor::party(format!("user-{}", i)), &parent))
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert_eq!(err.code(), "ALREADY_JOINED");
        }
    }
}
