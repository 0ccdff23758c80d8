//! Mediation workflow
//!
//! [`Mediation`] is the request surface of the crate. Each operation takes
//! the calling [`Actor`], checks what that caller may do, runs the pure
//! domain functions inside the store's atomic updates, and forwards every
//! timeline entry it appended to the [`TimelineSink`].
//!
//! - `intake`: sessions, step submission, Party B join
//! - `finalize`: session → case
//! - `admin`: case reads, admin assignment, status changes, notes
//! - `panel`: panelist registry and panel assignment
//! - `resolution`: drafts, submissions, progress

mod admin;
mod finalize;
mod intake;
mod panel;
mod resolution;

pub use intake::StepOutcome;
pub use panel::{PanelAssignmentReport, PanelRejection, RejectionReason};
pub use resolution::{ResolutionEntry, ResolutionReport, SubmissionOutcome};

use tracing::warn;

use crate::errors::{MediateError, Result};
use crate::schemas::{Actor, Config, Role, TimelineEntry};
use crate::store::CaseStore;
use crate::timeline::{NoTimelineSink, TimelineEvent, TimelineSink};

/// The mediation service over a [`CaseStore`]
pub struct Mediation<S: CaseStore> {
    store: S,
    config: Config,
    timeline: Box<dyn TimelineSink>,
}

impl<S: CaseStore> Mediation<S> {
    pub fn new(store: S, config: Config) -> Self {
        Mediation {
            store,
            config,
            timeline: Box::new(NoTimelineSink),
        }
    }

    /// Replace the timeline sink
    pub fn with_timeline(mut self, sink: impl TimelineSink + 'static) -> Self {
        self.timeline = Box::new(sink);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn emit(&self, case_id: &str, entries: &[TimelineEntry]) {
        for entry in entries {
            self.timeline.record(TimelineEvent::from_entry(case_id, entry));
        }
    }

    /// Release `case_id`'s capacity slot on a panelist.
    ///
    /// Failures are logged; a stale slot only lowers that panelist's
    /// headroom until it is released by hand.
    fn release_slot(&self, panelist_id: &str, case_id: &str) {
        let result = self.store.update_panelist(panelist_id, &mut |p| {
            p.active_cases.remove(case_id);
            Ok(())
        });
        if let Err(e) = result {
            warn!(
                panelist_id,
                case_id,
                error = %e,
                "Could not release panelist capacity slot"
            );
        }
    }
}

fn require_role(actor: &Actor, role: Role, action: &str) -> Result<()> {
    if actor.role == role {
        Ok(())
    } else {
        warn!(actor = %actor.id, role = %actor.role, action, "Rejected caller role");
        Err(MediateError::Forbidden(format!(
            "{} requires the {} role",
            action, role
        )))
    }
}

fn require_admin(actor: &Actor, action: &str) -> Result<()> {
    require_role(actor, Role::Admin, action)
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn new_case_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("case-{}", &hex[..12])
}
