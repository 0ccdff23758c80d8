//! Resolution progress over a case's live panel

use crate::schemas::{Case, CaseStatus, Progress, Resolution};

/// Count submitted resolutions among actively assigned panelists.
///
/// Resolutions from removed panelists stay on record but do not count.
pub fn compute_progress(case: &Case, resolutions: &[Resolution]) -> Progress {
    let active = case.active_panelists();
    let submitted = resolutions
        .iter()
        .filter(|r| r.case_id == case.case_id)
        .filter(|r| r.is_submitted())
        .filter(|r| active.contains(&r.panelist_id.as_str()))
        .count();
    Progress {
        submitted,
        total: active.len(),
    }
}

/// Whether the case should move to `resolved` on its own.
pub fn should_auto_resolve(case: &Case, progress: Progress) -> bool {
    case.status == CaseStatus::InProgress && progress.is_complete()
}
