//! Case state machine definitions
//!
//! The main line is linear:
//! open → assigned → panel_assigned → in_progress → resolved → closed
//!
//! Two shortcuts exist: an open case may receive its panel before an owning
//! admin (open → panel_assigned), and any non-closed case may be closed.

use crate::schemas::CaseStatus;

/// The canonical ordering of case statuses.
pub const CASE_STATUSES: &[CaseStatus] = &[
    CaseStatus::Open,
    CaseStatus::Assigned,
    CaseStatus::PanelAssigned,
    CaseStatus::InProgress,
    CaseStatus::Resolved,
    CaseStatus::Closed,
];

/// Get the 0-based index of a status in the progression.
///
/// Returns the position in CASE_STATUSES, or usize::MAX if not found.
pub fn get_status_index(status: CaseStatus) -> usize {
    CASE_STATUSES
        .iter()
        .position(|&s| s == status)
        .unwrap_or(usize::MAX)
}

/// Returns the statuses reachable from `current` in one transition.
pub fn get_allowed_next_statuses(current: CaseStatus) -> Vec<CaseStatus> {
    match current {
        CaseStatus::Open => vec![
            CaseStatus::Assigned,
            CaseStatus::PanelAssigned,
            CaseStatus::Closed,
        ],
        CaseStatus::Assigned => vec![CaseStatus::PanelAssigned, CaseStatus::Closed],
        CaseStatus::PanelAssigned => vec![CaseStatus::InProgress, CaseStatus::Closed],
        CaseStatus::InProgress => vec![CaseStatus::Resolved, CaseStatus::Closed],
        CaseStatus::Resolved => vec![CaseStatus::Closed],
        CaseStatus::Closed => vec![],
    }
}

/// Check if a status is the terminal status (closed).
pub fn is_terminal_status(status: CaseStatus) -> bool {
    status == CaseStatus::Closed
}

/// Whether the case has reached `panel_assigned` or beyond (excluding closed).
pub fn has_panel_stage(status: CaseStatus) -> bool {
    matches!(
        status,
        CaseStatus::PanelAssigned | CaseStatus::InProgress | CaseStatus::Resolved
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_statuses_order() {
        assert_eq!(CASE_STATUSES.len(), 6);
        assert_eq!(get_status_index(CaseStatus::Open), 0);
        assert_eq!(get_status_index(CaseStatus::PanelAssigned), 2);
        assert_eq!(get_status_index(CaseStatus::Closed), 5);
    }

    #[test]
    fn test_allowed_next_statuses_only_move_forward() {
        for &status in CASE_STATUSES {
            for next in get_allowed_next_statuses(status) {
                assert!(get_status_index(next) > get_status_index(status));
            }
        }
    }

    #[test]
    fn test_every_open_status_can_close() {
        for &status in CASE_STATUSES {
            let allowed = get_allowed_next_statuses(status);
            assert_eq!(allowed.contains(&CaseStatus::Closed), !is_terminal_status(status));
        }
    }

    #[test]
    fn test_no_skip_to_resolved() {
        assert!(!get_allowed_next_statuses(CaseStatus::Open).contains(&CaseStatus::Resolved));
        assert!(!get_allowed_next_statuses(CaseStatus::PanelAssigned).contains(&CaseStatus::Resolved));
    }

    #[test]
    fn test_is_terminal_status() {
        assert!(!is_terminal_status(CaseStatus::Resolved));
        assert!(is_terminal_status(CaseStatus::Closed));
        assert!(get_allowed_next_statuses(CaseStatus::Closed).is_empty());
    }
}
