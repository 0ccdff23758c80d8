//! Case reads and admin-driven case changes

use tracing::{info, warn};

use crate::domain::{apply_status_transition, compute_progress, ValidationContext};
use crate::errors::{MediateError, Result};
use crate::schemas::{
    Actor, AdminResolution, Case, CaseNote, CaseStatus, TimelineEntry, TimelineKind,
};
use crate::store::CaseStore;

use super::{require_admin, Mediation};

pub(super) fn require_viewer(case: &Case, actor: &Actor) -> Result<()> {
    if actor.is_admin() || case.involves(&actor.id) {
        Ok(())
    } else {
        warn!(case_id = %case.case_id, actor = %actor.id, "Rejected case read");
        Err(MediateError::Forbidden(format!(
            "not a participant in case {}",
            case.case_id
        )))
    }
}

impl<S: CaseStore> Mediation<S> {
    /// Read a case. Parties and panelists see only their own cases.
    pub fn get_case(&self, actor: &Actor, case_id: &str) -> Result<Case> {
        let case = self.store.get_case(case_id)?;
        require_viewer(&case, actor)?;
        Ok(case)
    }

    /// Cases visible to the caller, newest first, optionally by status
    pub fn list_cases(&self, actor: &Actor, status: Option<CaseStatus>) -> Result<Vec<Case>> {
        let mut cases: Vec<Case> = self
            .store
            .list_cases()?
            .into_iter()
            .filter(|c| actor.is_admin() || c.involves(&actor.id))
            .filter(|c| status.map_or(true, |s| c.status == s))
            .collect();
        cases.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(cases)
    }

    /// Set the owning admin; an open case moves to `assigned`.
    pub fn assign_admin(&self, actor: &Actor, case_id: &str, admin_id: &str) -> Result<Case> {
        require_admin(actor, "assign_admin")?;
        if admin_id.trim().is_empty() {
            return Err(MediateError::invalid_field(
                None,
                "admin_id",
                "must not be empty",
            ));
        }

        let mut entries = Vec::new();
        let case = self.store.update_case(case_id, &mut |case| {
            entries.clear();
            if case.is_closed() {
                return Err(MediateError::CaseClosed(case.case_id.clone()));
            }
            case.assigned_to = Some(admin_id.to_string());
            let entry = TimelineEntry::new(
                TimelineKind::AdminAssigned,
                &actor.id,
                format!("Admin {} assigned", admin_id),
            );
            case.timeline.push(entry.clone());
            entries.push(entry);
            case.touch();

            if case.status == CaseStatus::Open {
                let ctx = ValidationContext::for_case(case, Default::default()).by_admin();
                let moved = apply_status_transition(case, CaseStatus::Assigned, &actor.id, &ctx)?;
                *case = moved.case;
                entries.push(moved.entry);
            }
            Ok(())
        })?;

        info!(case_id, admin_id, status = %case.status, "Admin assigned");
        self.emit(case_id, &entries);
        Ok(case)
    }

    /// Move a case to `target`.
    ///
    /// `admin_override` lets an admin resolve an in-progress case before
    /// every panelist has submitted. Closing releases panel capacity.
    pub fn update_status(
        &self,
        actor: &Actor,
        case_id: &str,
        target: CaseStatus,
        admin_override: Option<AdminResolution>,
    ) -> Result<Case> {
        require_admin(actor, "update_status")?;

        let mut entries = Vec::new();
        let mut released = Vec::new();
        let case = self
            .store
            .update_case(case_id, &mut |case| {
                entries.clear();
                let resolutions = self.store.list_resolutions(case_id)?;
                let ctx = ValidationContext::for_case(case, compute_progress(case, &resolutions))
                    .by_admin()
                    .with_override(admin_override.clone());
                let moved = apply_status_transition(case, target, &actor.id, &ctx)?;
                if target == CaseStatus::Closed {
                    released = case
                        .active_panelists()
                        .into_iter()
                        .map(String::from)
                        .collect();
                }
                *case = moved.case;
                entries.push(moved.entry);
                Ok(())
            })
            .inspect_err(|e| {
                warn!(case_id, target = %target, code = e.code(), "Status change rejected");
            })?;

        for panelist_id in &released {
            self.release_slot(panelist_id, case_id);
        }
        info!(case_id, status = %case.status, actor = %actor.id, "Case status changed");
        self.emit(case_id, &entries);
        Ok(case)
    }

    /// Append an internal note. Allowed on closed cases.
    pub fn add_note(&self, actor: &Actor, case_id: &str, text: &str) -> Result<Case> {
        require_admin(actor, "add_note")?;
        let text = text.trim();
        if text.is_empty() {
            return Err(MediateError::invalid_field(None, "text", "must not be empty"));
        }

        let entry = TimelineEntry::new(TimelineKind::NoteAdded, &actor.id, "Note added");
        let case = self.store.update_case(case_id, &mut |case| {
            case.notes.push(CaseNote {
                author: actor.id.clone(),
                text: text.to_string(),
                created_at: entry.timestamp.clone(),
            });
            case.timeline.push(entry.clone());
            case.touch();
            Ok(())
        })?;

        info!(case_id, author = %actor.id, "Note added");
        self.emit(case_id, std::slice::from_ref(&entry));
        Ok(case)
    }
}
