//! Validation rules for case status transitions

use crate::schemas::{AdminResolution, Case, CaseStatus, Progress};

use super::get_allowed_next_statuses;

/// Context required for validating status transitions
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    /// Whether an owning admin is set on the case
    pub has_assigned_admin: bool,

    /// Number of active panel assignments
    pub active_panelists: usize,

    /// Resolution progress over the active panel
    pub progress: Progress,

    /// Admin-supplied disposition for resolving without full progress
    pub admin_override: Option<AdminResolution>,

    /// Whether the caller is an admin
    pub actor_is_admin: bool,
}

impl ValidationContext {
    /// Context derived from the case's own fields
    pub fn for_case(case: &Case, progress: Progress) -> Self {
        ValidationContext {
            has_assigned_admin: case.assigned_to.is_some(),
            active_panelists: case.active_panel_count(),
            progress,
            admin_override: None,
            actor_is_admin: false,
        }
    }

    pub fn by_admin(mut self) -> Self {
        self.actor_is_admin = true;
        self
    }

    pub fn with_override(mut self, admin_override: Option<AdminResolution>) -> Self {
        self.admin_override = admin_override;
        self
    }
}

/// Result of a validation check
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the validation passed
    pub valid: bool,

    /// Reason for failure (if valid is false)
    pub reason: Option<String>,
}

impl ValidationResult {
    /// Create a successful validation result
    pub fn success() -> Self {
        ValidationResult {
            valid: true,
            reason: None,
        }
    }

    /// Create a failed validation result
    pub fn failure(reason: impl Into<String>) -> Self {
        ValidationResult {
            valid: false,
            reason: Some(reason.into()),
        }
    }
}

/// Validate entering the "assigned" state
pub fn can_enter_assigned(has_assigned_admin: bool) -> ValidationResult {
    if !has_assigned_admin {
        return ValidationResult::failure("no owning admin is assigned");
    }
    ValidationResult::success()
}

/// Validate entering the "panel_assigned" state
pub fn can_enter_panel_assigned(active_panelists: usize) -> ValidationResult {
    if active_panelists == 0 {
        return ValidationResult::failure("no active panelist is assigned");
    }
    ValidationResult::success()
}

/// Validate entering the "in_progress" state
pub fn can_enter_in_progress(active_panelists: usize) -> ValidationResult {
    if active_panelists == 0 {
        return ValidationResult::failure("no active panelist is assigned");
    }
    ValidationResult::success()
}

/// Validate entering the "resolved" state
pub fn can_enter_resolved(
    progress: Progress,
    admin_override: Option<&AdminResolution>,
    actor_is_admin: bool,
) -> ValidationResult {
    if progress.is_complete() {
        return ValidationResult::success();
    }
    match admin_override {
        None => ValidationResult::failure(format!(
            "only {} resolutions submitted and no override supplied",
            progress
        )),
        Some(_) if !actor_is_admin => {
            ValidationResult::failure("only an admin may resolve a case by override")
        }
        Some(o) if o.feedback.trim().is_empty() || o.next_steps.trim().is_empty() => {
            ValidationResult::failure("override requires feedback and next steps")
        }
        Some(_) => ValidationResult::success(),
    }
}

/// Validate entering the "closed" state
pub fn can_enter_closed(actor_is_admin: bool) -> ValidationResult {
    if !actor_is_admin {
        return ValidationResult::failure("only an admin may close a case");
    }
    ValidationResult::success()
}

/// Validate a status transition
pub fn validate_transition(
    current: CaseStatus,
    target: CaseStatus,
    ctx: &ValidationContext,
) -> ValidationResult {
    let allowed = get_allowed_next_statuses(current);
    if !allowed.contains(&target) {
        return ValidationResult::failure(format!(
            "cannot transition from {} to {}",
            current, target
        ));
    }

    match target {
        CaseStatus::Assigned => can_enter_assigned(ctx.has_assigned_admin),
        CaseStatus::PanelAssigned => can_enter_panel_assigned(ctx.active_panelists),
        CaseStatus::InProgress => can_enter_in_progress(ctx.active_panelists),
        CaseStatus::Resolved => can_enter_resolved(
            ctx.progress,
            ctx.admin_override.as_ref(),
            ctx.actor_is_admin,
        ),
        CaseStatus::Closed => can_enter_closed(ctx.actor_is_admin),
        CaseStatus::Open => ValidationResult::failure("cannot transition to open state"),
    }
}
