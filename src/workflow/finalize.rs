//! Case finalization
//!
//! Turns a completed intake session into a case (Party A) or attaches it to
//! an existing case (Party B). The session → case link is claimed before
//! any case write, so finalizing twice returns the first case id.

use tracing::{info, warn};

use crate::errors::{MediateError, Result};
use crate::schemas::{Actor, Case, PartyRole, Session, Submission, TimelineEntry, TimelineKind};
use crate::store::{CaseStore, Claim, LinkKind};

use super::intake::require_owner;
use super::{new_case_id, Mediation};

impl<S: CaseStore> Mediation<S> {
    /// Finalize a session and return the id of its case.
    pub fn finalize(&self, actor: &Actor, session_id: &str) -> Result<String> {
        let session = self.store.get_session(session_id)?;
        require_owner(&session, actor)?;

        if let Some(case_id) = self.store.get_link(LinkKind::FinalizedCase, session_id)? {
            if !session.archived {
                self.archive(session_id, &case_id)?;
            }
            return Ok(case_id);
        }

        if let Some(missing_step) = session.first_missing_step() {
            warn!(session_id, missing = %missing_step, "Finalize on incomplete session");
            return Err(MediateError::IncompleteSubmission { missing_step });
        }
        let submission = session
            .draft
            .to_submission()
            .map_err(|missing_step| MediateError::IncompleteSubmission { missing_step })?;

        let case_id = match session.role {
            PartyRole::PartyA => self.finalize_party_a(&session, submission)?,
            PartyRole::PartyB => self.finalize_party_b(&session, submission)?,
        };
        self.archive(session_id, &case_id)?;
        Ok(case_id)
    }

    fn finalize_party_a(&self, session: &Session, submission: Submission) -> Result<String> {
        let session_id = session.session_id.as_str();
        let case_id = new_case_id();
        if let Claim::Existing(existing) =
            self.store
                .claim_link(LinkKind::FinalizedCase, session_id, &case_id)?
        {
            return Ok(existing);
        }

        let case = Case::from_submission(
            case_id.clone(),
            session.owner.clone(),
            session_id.to_string(),
            submission,
        );
        let inserted = self.store.insert_case(case.clone()).and_then(|ok| {
            if ok {
                Ok(())
            } else {
                Err(MediateError::wrap(
                    format!("case id {} already taken", case_id),
                    "finalize",
                ))
            }
        });
        if let Err(e) = inserted {
            self.store.release_link(LinkKind::FinalizedCase, session_id)?;
            return Err(e);
        }

        info!(case_id = %case_id, session_id, owner = %session.owner, "Case created");
        self.emit(&case_id, &case.timeline);
        Ok(case_id)
    }

    fn finalize_party_b(&self, session: &Session, submission: Submission) -> Result<String> {
        let session_id = session.session_id.as_str();
        let parent_id = session
            .parent_session_id
            .as_deref()
            .ok_or_else(|| MediateError::not_found("parent session", session_id))?;
        let case_id = self
            .store
            .get_link(LinkKind::FinalizedCase, parent_id)?
            .ok_or_else(|| MediateError::not_found("case for session", parent_id))?;

        if let Claim::Existing(existing) =
            self.store
                .claim_link(LinkKind::FinalizedCase, session_id, &case_id)?
        {
            return Ok(existing);
        }

        let entry = TimelineEntry::new(
            TimelineKind::PartyBJoined,
            &session.owner,
            "Party B submission attached",
        );
        let result = self.store.update_case(&case_id, &mut |case| {
            if case.is_closed() {
                return Err(MediateError::CaseClosed(case.case_id.clone()));
            }
            if case.party_b_submission.is_some() {
                return Err(MediateError::AlreadyJoined(parent_id.to_string()));
            }
            case.parties
                .extend(submission.parties.parties.iter().cloned());
            case.party_b_submission = Some(submission.clone());
            case.joined_by = Some(session.owner.clone());
            case.timeline.push(entry.clone());
            case.touch();
            Ok(())
        });
        if let Err(e) = result {
            warn!(case_id = %case_id, session_id, code = e.code(), "Party B attach rejected");
            self.store.release_link(LinkKind::FinalizedCase, session_id)?;
            return Err(e);
        }

        info!(case_id = %case_id, session_id, owner = %session.owner, "Party B submission attached");
        self.emit(&case_id, std::slice::from_ref(&entry));
        Ok(case_id)
    }

    fn archive(&self, session_id: &str, case_id: &str) -> Result<Session> {
        self.store.update_session(session_id, &mut |session| {
            session.archived = true;
            session.case_id = Some(case_id.to_string());
            session.touch();
            Ok(())
        })
    }
}
