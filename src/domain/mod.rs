//! Domain logic for intake, case statuses and transitions

pub(crate) mod intake;
mod payloads;
mod progress;
mod states;
mod transitions;
mod validation;


pub use intake::{apply_step, NextStep};
pub use payloads::{validate_resolution, validate_step};
pub use progress::{compute_progress, should_auto_resolve};
pub use states::{
    get_allowed_next_statuses, get_status_index, has_panel_stage, is_terminal_status,
    CASE_STATUSES,
};
pub use transitions::{apply_status_transition, Transitioned};
pub use validation::{
    can_enter_assigned, can_enter_closed, can_enter_in_progress, can_enter_panel_assigned,
    can_enter_resolved, validate_transition, ValidationContext, ValidationResult,
};
