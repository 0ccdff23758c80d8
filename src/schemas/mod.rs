//! Schema types for the mediation core
//!
//! Every persisted document is a serde type with snake_case JSON names.

mod actor;
mod case;
mod config;
mod panelist;
mod resolution;
mod session;

#[cfg(test)]
pub(crate) use case::fixtures;

pub use actor::{Actor, Role};
pub use case::{
    AdminResolution, AssignmentStatus, Case, CaseNote, CaseStatus, CaseType, PanelAssignment,
    Party, Priority, TimelineEntry, TimelineKind,
};
pub use config::{Config, MIN_RESOLUTION_NOTES};
pub use panelist::Panelist;
pub use resolution::{Progress, Resolution, ResolutionOutcome, ResolutionPayload, ResolutionState};
pub use session::{
    Background, CaseOverview, DesiredOutcomes, DocumentRef, Documents, Draft, IntakeStep,
    MeetingFormat, PartiesStep, PartyRole, Scheduling, Session, StepPayload, Submission,
    INTAKE_STEPS,
};
