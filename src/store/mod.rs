//! Durable document store
//!
//! The workflow depends only on the [`CaseStore`] trait. Every write goes
//! through an atomic read-modify-write: the caller's closure runs against a
//! copy of the document while the collection is locked, and the copy is
//! committed only if the closure returns `Ok`. A closure must not call back
//! into the collection it is updating.

mod collection;
mod document_store;

pub use document_store::DocumentStore;

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::schemas::{Case, Panelist, Resolution, Session};

/// Unique one-to-one mappings kept by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// Party A session id → the Party B session that joined it
    PartyB,
    /// Session id → the case it was finalized into
    FinalizedCase,
}

/// Outcome of an insert-if-absent on a link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// The link did not exist and now points at the requested value
    Claimed,
    /// The link already existed; carries its value
    Existing(String),
}

/// Store interface consumed by the workflow.
pub trait CaseStore: Send + Sync {
    // ===== SESSIONS =====

    /// Insert a new session. Returns false if the id is taken.
    fn insert_session(&self, session: Session) -> Result<bool>;
    fn get_session(&self, session_id: &str) -> Result<Session>;
    fn update_session(
        &self,
        session_id: &str,
        op: &mut dyn FnMut(&mut Session) -> Result<()>,
    ) -> Result<Session>;

    // ===== CASES =====

    /// Insert a new case. Returns false if the id is taken.
    fn insert_case(&self, case: Case) -> Result<bool>;
    fn get_case(&self, case_id: &str) -> Result<Case>;
    fn update_case(
        &self,
        case_id: &str,
        op: &mut dyn FnMut(&mut Case) -> Result<()>,
    ) -> Result<Case>;
    fn list_cases(&self) -> Result<Vec<Case>>;

    // ===== PANELISTS =====

    /// Insert a new panelist. Returns false if the id is taken.
    fn insert_panelist(&self, panelist: Panelist) -> Result<bool>;
    fn get_panelist(&self, panelist_id: &str) -> Result<Panelist>;
    fn update_panelist(
        &self,
        panelist_id: &str,
        op: &mut dyn FnMut(&mut Panelist) -> Result<()>,
    ) -> Result<Panelist>;
    fn list_panelists(&self) -> Result<Vec<Panelist>>;

    // ===== RESOLUTIONS =====

    fn get_resolution(&self, case_id: &str, panelist_id: &str) -> Result<Option<Resolution>>;

    /// Create or replace the (case, panelist) resolution atomically.
    /// `op` receives the current record, if any, and returns the new one.
    fn upsert_resolution(
        &self,
        case_id: &str,
        panelist_id: &str,
        op: &mut dyn FnMut(Option<&Resolution>) -> Result<Resolution>,
    ) -> Result<Resolution>;
    fn list_resolutions(&self, case_id: &str) -> Result<Vec<Resolution>>;
    /// Drop a resolution written by an operation that then failed.
    fn remove_resolution(&self, case_id: &str, panelist_id: &str) -> Result<()>;

    // ===== LINKS =====

    /// Point `key` at `value` unless a link for `key` already exists.
    fn claim_link(&self, kind: LinkKind, key: &str, value: &str) -> Result<Claim>;
    fn get_link(&self, kind: LinkKind, key: &str) -> Result<Option<String>>;
    /// Drop a link claimed by an operation that then failed.
    fn release_link(&self, kind: LinkKind, key: &str) -> Result<()>;
}

/// A stored document addressable by a string key
pub(crate) trait Document {
    fn key(&self) -> String;
}

impl Document for Session {
    fn key(&self) -> String {
        self.session_id.clone()
    }
}

impl Document for Case {
    fn key(&self) -> String {
        self.case_id.clone()
    }
}

impl Document for Panelist {
    fn key(&self) -> String {
        self.panelist_id.clone()
    }
}

impl Document for Resolution {
    fn key(&self) -> String {
        resolution_key(&self.case_id, &self.panelist_id)
    }
}

pub(crate) fn resolution_key(case_id: &str, panelist_id: &str) -> String {
    format!("{}/{}", case_id, panelist_id)
}

/// A persisted link record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Link {
    pub key: String,
    pub value: String,
}

impl Document for Link {
    fn key(&self) -> String {
        self.key.clone()
    }
}
