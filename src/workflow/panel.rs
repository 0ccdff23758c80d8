//! Panelist registry and panel assignment
//!
//! A panelist's load is the set of non-closed cases holding one of their
//! capacity slots. Slots are reserved inside the panelist's atomic update,
//! nested in the case update that records the assignment, so concurrent
//! batches cannot push a panelist past `max_active_cases`.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::{apply_status_transition, has_panel_stage, ValidationContext};
use crate::errors::{FieldError, MediateError, Result};
use crate::schemas::{
    Actor, AssignmentStatus, Case, CaseStatus, PanelAssignment, Panelist, TimelineEntry,
    TimelineKind,
};
use crate::store::CaseStore;

use super::{require_admin, Mediation};

/// Why one id in an `assign_panel` batch was not seated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectionReason {
    AlreadyActive,
    CapacityExceeded { load: usize, max: usize },
    UnknownPanelist,
    DuplicateInRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelRejection {
    pub panelist_id: String,
    #[serde(flatten)]
    pub reason: RejectionReason,
}

impl PanelRejection {
    /// The error this rejection would be as a standalone call
    pub fn to_error(&self, case_id: &str) -> MediateError {
        match &self.reason {
            RejectionReason::CapacityExceeded { load, max } => MediateError::CapacityExceeded {
                panelist_id: self.panelist_id.clone(),
                load: *load,
                max: *max,
            },
            RejectionReason::UnknownPanelist => {
                MediateError::not_found("panelist", self.panelist_id.clone())
            }
            RejectionReason::AlreadyActive => MediateError::invalid_field(
                None,
                "panelist_ids",
                format!(
                    "{} is already active on {}",
                    self.panelist_id, case_id
                ),
            ),
            RejectionReason::DuplicateInRequest => MediateError::invalid_field(
                None,
                "panelist_ids",
                format!("{} is listed more than once", self.panelist_id),
            ),
        }
    }
}

/// Outcome of an `assign_panel` batch; partial batches are valid
#[derive(Debug, Clone, Serialize)]
pub struct PanelAssignmentReport {
    pub case: Case,
    pub accepted: Vec<String>,
    pub rejected: Vec<PanelRejection>,
}

impl<S: CaseStore> Mediation<S> {
    /// Add a panelist to the registry
    pub fn register_panelist(
        &self,
        actor: &Actor,
        panelist_id: &str,
        name: &str,
        max_active_cases: Option<usize>,
    ) -> Result<Panelist> {
        require_admin(actor, "register_panelist")?;
        let panelist_id = panelist_id.trim();
        let name = name.trim();
        let max = max_active_cases.unwrap_or(self.config.default_max_active_cases);

        let mut errors = Vec::new();
        if panelist_id.is_empty() {
            errors.push(FieldError::new("panelist_id", "must not be empty"));
        }
        if name.is_empty() {
            errors.push(FieldError::new("name", "must not be empty"));
        }
        if max == 0 {
            errors.push(FieldError::new(
                "max_active_cases",
                "must be at least 1",
            ));
        }
        if !errors.is_empty() {
            return Err(MediateError::Validation { step: None, errors });
        }

        let panelist = Panelist::new(panelist_id.to_string(), name.to_string(), max);
        if !self.store.insert_panelist(panelist.clone())? {
            return Err(MediateError::invalid_field(
                None,
                "panelist_id",
                format!("{} is already registered", panelist_id),
            ));
        }
        info!(panelist_id, max_active_cases = max, "Panelist registered");
        Ok(panelist)
    }

    pub fn list_panelists(&self, actor: &Actor) -> Result<Vec<Panelist>> {
        require_admin(actor, "list_panelists")?;
        self.store.list_panelists()
    }

    /// Seat a batch of panelists on a case.
    ///
    /// Each id is accepted or rejected on its own. The first accepted
    /// panelist moves an `open` or `assigned` case to `panel_assigned`.
    pub fn assign_panel(
        &self,
        actor: &Actor,
        case_id: &str,
        panelist_ids: &[String],
    ) -> Result<PanelAssignmentReport> {
        require_admin(actor, "assign_panel")?;
        if panelist_ids.is_empty() {
            return Err(MediateError::invalid_field(
                None,
                "panelist_ids",
                "at least one panelist is required",
            ));
        }

        let mut accepted: Vec<String> = Vec::new();
        let mut rejected: Vec<PanelRejection> = Vec::new();
        let mut entries: Vec<TimelineEntry> = Vec::new();

        let result = self.store.update_case(case_id, &mut |case| {
            if case.is_closed() {
                return Err(MediateError::CaseClosed(case.case_id.clone()));
            }

            let mut seen = HashSet::new();
            for id in panelist_ids {
                let reason = if !seen.insert(id.as_str()) {
                    Some(RejectionReason::DuplicateInRequest)
                } else if case.active_assignment(id).is_some() {
                    Some(RejectionReason::AlreadyActive)
                } else {
                    self.reserve_slot(id, case_id)?
                };
                if let Some(reason) = reason {
                    rejected.push(PanelRejection {
                        panelist_id: id.clone(),
                        reason,
                    });
                    continue;
                }

                let entry = TimelineEntry::new(
                    TimelineKind::PanelistAssigned,
                    &actor.id,
                    format!("Panelist {} assigned", id),
                );
                case.assigned_panelists.push(PanelAssignment {
                    panelist_id: id.clone(),
                    status: AssignmentStatus::Active,
                    assigned_at: entry.timestamp.clone(),
                    assigned_by: actor.id.clone(),
                    removed_at: None,
                });
                case.timeline.push(entry.clone());
                entries.push(entry);
                accepted.push(id.clone());
            }

            if !accepted.is_empty() && !has_panel_stage(case.status) {
                let ctx = ValidationContext::for_case(case, Default::default()).by_admin();
                let moved =
                    apply_status_transition(case, CaseStatus::PanelAssigned, &actor.id, &ctx)?;
                *case = moved.case;
                entries.push(moved.entry);
            }
            case.touch();
            Ok(())
        });

        let case = match result {
            Ok(case) => case,
            Err(e) => {
                for id in &accepted {
                    self.release_slot(id, case_id);
                }
                return Err(e);
            }
        };

        for rejection in &rejected {
            warn!(
                case_id,
                panelist_id = %rejection.panelist_id,
                reason = ?rejection.reason,
                "Panelist not assigned"
            );
        }
        info!(
            case_id,
            accepted = accepted.len(),
            rejected = rejected.len(),
            status = %case.status,
            "Panel assignment processed"
        );
        self.emit(case_id, &entries);
        Ok(PanelAssignmentReport {
            case,
            accepted,
            rejected,
        })
    }

    /// Take one capacity slot on `panelist_id` for `case_id`.
    ///
    /// Returns the rejection reason when the slot cannot be taken.
    fn reserve_slot(&self, panelist_id: &str, case_id: &str) -> Result<Option<RejectionReason>> {
        let result = self.store.update_panelist(panelist_id, &mut |p| {
            if p.active_cases.contains(case_id) {
                return Ok(());
            }
            if !p.has_capacity() {
                return Err(MediateError::CapacityExceeded {
                    panelist_id: p.panelist_id.clone(),
                    load: p.load(),
                    max: p.max_active_cases,
                });
            }
            p.active_cases.insert(case_id.to_string());
            Ok(())
        });
        match result {
            Ok(_) => Ok(None),
            Err(MediateError::NotFound { .. }) => Ok(Some(RejectionReason::UnknownPanelist)),
            Err(MediateError::CapacityExceeded { load, max, .. }) => {
                Ok(Some(RejectionReason::CapacityExceeded { load, max }))
            }
            Err(e) => Err(e),
        }
    }

    /// Mark a panelist's active assignment removed and free their slot.
    ///
    /// Their resolution, if any, is kept. Progress is recomputed afterwards,
    /// which may resolve the case.
    pub fn remove_panelist(&self, actor: &Actor, case_id: &str, panelist_id: &str) -> Result<Case> {
        require_admin(actor, "remove_panelist")?;

        let entry = TimelineEntry::new(
            TimelineKind::PanelistRemoved,
            &actor.id,
            format!("Panelist {} removed", panelist_id),
        );
        self.store.update_case(case_id, &mut |case| {
            if case.is_closed() {
                return Err(MediateError::CaseClosed(case.case_id.clone()));
            }
            let assignment = case
                .assigned_panelists
                .iter_mut()
                .find(|a| a.is_active() && a.panelist_id == panelist_id)
                .ok_or_else(|| {
                    MediateError::not_found("active assignment", format!("{}/{}", case_id, panelist_id))
                })?;
            assignment.status = AssignmentStatus::Removed;
            assignment.removed_at = Some(entry.timestamp.clone());
            case.timeline.push(entry.clone());
            case.touch();
            Ok(())
        })?;

        self.release_slot(panelist_id, case_id);
        info!(case_id, panelist_id, "Panelist removed");
        self.emit(case_id, std::slice::from_ref(&entry));

        let (case, _, _) = self.reconcile(case_id, &actor.id)?;
        Ok(case)
    }
}
