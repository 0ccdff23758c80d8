//! Panelist resolutions and progress aggregation

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{
    apply_status_transition, compute_progress, should_auto_resolve, validate_resolution,
    ValidationContext,
};
use crate::errors::{MediateError, Result};
use crate::schemas::{
    Actor, AssignmentStatus, Case, CaseStatus, Progress, Resolution, ResolutionOutcome,
    ResolutionPayload, ResolutionState, Role, TimelineEntry, TimelineKind,
};
use crate::store::CaseStore;

use super::admin::require_viewer;
use super::Mediation;

/// Result of a successful `submit_resolution`
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    pub resolution: Resolution,
    /// True only for the call that completed the panel and resolved the case
    pub resolution_complete: bool,
    pub progress: Progress,
}

/// One panelist's line in a [`ResolutionReport`]
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionEntry {
    pub panelist_id: String,
    pub assignment_status: AssignmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<ResolutionState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution_status: Option<ResolutionOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolutionReport {
    pub case_id: String,
    pub status: CaseStatus,
    pub progress: Progress,
    pub entries: Vec<ResolutionEntry>,
}

fn require_panelist(actor: &Actor, panelist_id: &str) -> Result<()> {
    if actor.role == Role::Panelist && actor.id == panelist_id {
        Ok(())
    } else {
        warn!(actor = %actor.id, panelist_id, "Rejected resolution write");
        Err(MediateError::Forbidden(format!(
            "only {} may write this resolution",
            panelist_id
        )))
    }
}

/// The case must be open to panel work and the panelist actively seated on it
fn require_active_seat(case: &Case, panelist_id: &str) -> Result<()> {
    if case.is_closed() {
        return Err(MediateError::CaseClosed(case.case_id.clone()));
    }
    if case.active_assignment(panelist_id).is_none() {
        return Err(MediateError::not_found(
            "active assignment",
            format!("{}/{}", case.case_id, panelist_id),
        ));
    }
    Ok(())
}

impl<S: CaseStore> Mediation<S> {
    /// Save work in progress. Never changes counts or case status.
    pub fn save_draft(
        &self,
        actor: &Actor,
        case_id: &str,
        panelist_id: &str,
        payload: ResolutionPayload,
    ) -> Result<Resolution> {
        require_panelist(actor, panelist_id)?;

        let mut saved = None;
        self.store.update_case(case_id, &mut |case| {
            require_active_seat(case, panelist_id)?;
            let draft = self
                .store
                .upsert_resolution(case_id, panelist_id, &mut |existing| match existing {
                    Some(r) if r.is_submitted() => Err(MediateError::AlreadySubmitted {
                        case_id: case_id.to_string(),
                        panelist_id: panelist_id.to_string(),
                    }),
                    Some(r) => Ok(r.clone().with_payload(&payload)),
                    None => Ok(Resolution::draft(case_id, panelist_id).with_payload(&payload)),
                })?;
            saved = Some(draft);
            Ok(())
        })?;
        let resolution = saved.ok_or_else(|| {
            MediateError::not_found("resolution", format!("{}/{}", case_id, panelist_id))
        })?;
        debug!(case_id, panelist_id, "Resolution draft saved");
        Ok(resolution)
    }

    /// Submit a panelist's resolution.
    ///
    /// The seat check, the resolution write and the case update happen under
    /// the case lock. If the case update fails, the resolution is restored to
    /// what it was before the call. The first submission on a `panel_assigned`
    /// case moves it to `in_progress`; the submission that completes the panel
    /// resolves it.
    pub fn submit_resolution(
        &self,
        actor: &Actor,
        case_id: &str,
        panelist_id: &str,
        payload: ResolutionPayload,
    ) -> Result<SubmissionOutcome> {
        require_panelist(actor, panelist_id)?;
        let errors = validate_resolution(&payload, self.config.min_resolution_notes);
        if !errors.is_empty() {
            warn!(case_id, panelist_id, errors = errors.len(), "Resolution rejected");
            return Err(MediateError::Validation { step: None, errors });
        }

        let submitted = TimelineEntry::new(
            TimelineKind::ResolutionSubmitted,
            &actor.id,
            format!("Panelist {} submitted a resolution", panelist_id),
        );
        let mut entries = Vec::new();
        let mut progress = Progress::default();
        let mut resolution_complete = false;
        let mut stored: Option<Resolution> = None;
        // Some(previous) once the resolution write has committed
        let mut written: Option<Option<Resolution>> = None;

        let result = self.store.update_case(case_id, &mut |case| {
            require_active_seat(case, panelist_id)?;

            let mut previous = None;
            let resolution =
                self.store
                    .upsert_resolution(case_id, panelist_id, &mut |existing| {
                        let base = match existing {
                            Some(r) if r.is_submitted() => {
                                return Err(MediateError::AlreadySubmitted {
                                    case_id: case_id.to_string(),
                                    panelist_id: panelist_id.to_string(),
                                })
                            }
                            Some(r) => r.clone(),
                            None => Resolution::draft(case_id, panelist_id),
                        };
                        previous = existing.cloned();
                        Ok(base.with_payload(&payload).as_submitted())
                    })?;
            written = Some(previous);
            stored = Some(resolution);

            let resolutions = self.store.list_resolutions(case_id)?;
            progress = compute_progress(case, &resolutions);

            case.timeline.push(submitted.clone());
            entries.push(submitted.clone());

            if case.status == CaseStatus::PanelAssigned {
                let ctx = ValidationContext::for_case(case, progress);
                let moved = apply_status_transition(case, CaseStatus::InProgress, &actor.id, &ctx)?;
                *case = moved.case;
                entries.push(moved.entry);
            }
            if should_auto_resolve(case, progress) {
                let ctx = ValidationContext::for_case(case, progress);
                let moved = apply_status_transition(case, CaseStatus::Resolved, &actor.id, &ctx)?;
                *case = moved.case;
                entries.push(moved.entry);
                resolution_complete = true;
            }
            case.touch();
            Ok(())
        });

        let case = match result {
            Ok(case) => case,
            Err(e) => {
                warn!(case_id, panelist_id, code = e.code(), "Resolution submit rejected");
                if let Some(previous) = written {
                    self.restore_resolution(case_id, panelist_id, previous);
                }
                return Err(e);
            }
        };
        let resolution = stored.ok_or_else(|| {
            MediateError::not_found("resolution", format!("{}/{}", case_id, panelist_id))
        })?;

        info!(
            case_id,
            panelist_id,
            progress = %progress,
            status = %case.status,
            resolution_complete,
            "Resolution submitted"
        );
        self.emit(case_id, &entries);
        Ok(SubmissionOutcome {
            resolution,
            resolution_complete,
            progress,
        })
    }

    /// Put a resolution back the way it was before a failed submission.
    fn restore_resolution(&self, case_id: &str, panelist_id: &str, previous: Option<Resolution>) {
        let restored = match previous {
            Some(r) => self
                .store
                .upsert_resolution(case_id, panelist_id, &mut |_| Ok(r.clone()))
                .map(|_| ()),
            None => self.store.remove_resolution(case_id, panelist_id),
        };
        if let Err(e) = restored {
            warn!(case_id, panelist_id, error = %e, "Failed to restore resolution");
        }
    }

    /// Progress over the active panel plus every panelist's state.
    ///
    /// Resolves an in-progress case whose panel is already complete.
    pub fn resolution_status(&self, actor: &Actor, case_id: &str) -> Result<ResolutionReport> {
        require_viewer(&self.store.get_case(case_id)?, actor)?;
        let (case, progress, _) = self.reconcile(case_id, &actor.id)?;
        let resolutions = self.store.list_resolutions(case_id)?;

        let entries = case
            .assigned_panelists
            .iter()
            .map(|a| {
                let resolution = resolutions.iter().find(|r| r.panelist_id == a.panelist_id);
                ResolutionEntry {
                    panelist_id: a.panelist_id.clone(),
                    assignment_status: a.status,
                    state: resolution.map(|r| r.state),
                    resolution_status: resolution.and_then(|r| r.resolution_status),
                    submitted_at: resolution.and_then(|r| r.submitted_at.clone()),
                }
            })
            .collect();

        Ok(ResolutionReport {
            case_id: case.case_id.clone(),
            status: case.status,
            progress,
            entries,
        })
    }

    /// Recompute progress and resolve the case if it is due.
    ///
    /// Returns the case, its progress, and whether this call resolved it.
    pub(super) fn reconcile(&self, case_id: &str, actor_id: &str) -> Result<(Case, Progress, bool)> {
        let case = self.store.get_case(case_id)?;
        let progress = compute_progress(&case, &self.store.list_resolutions(case_id)?);
        if !should_auto_resolve(&case, progress) {
            return Ok((case, progress, false));
        }

        let mut entries = Vec::new();
        let mut progress = progress;
        let case = self.store.update_case(case_id, &mut |case| {
            entries.clear();
            progress = compute_progress(case, &self.store.list_resolutions(case_id)?);
            if should_auto_resolve(case, progress) {
                let ctx = ValidationContext::for_case(case, progress);
                let moved = apply_status_transition(case, CaseStatus::Resolved, actor_id, &ctx)?;
                *case = moved.case;
                entries.push(moved.entry);
            }
            Ok(())
        })?;

        let resolved = !entries.is_empty();
        if resolved {
            info!(case_id, progress = %progress, "Case resolved on progress check");
            self.emit(case_id, &entries);
        }
        Ok((case, progress, resolved))
    }
}
