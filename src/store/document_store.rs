//! `CaseStore` backed by in-process collections or by JSON files under
//! `.mediate/`.
//!
//! Layout on disk:
//!
//! ```text
//! .mediate/
//!   sessions/<session_id>.json
//!   cases/<case_id>.json
//!   panelists/<panelist_id>.json
//!   resolutions/<case_id>%2F<panelist_id>.json
//!   links/party_b/<parent_session_id>.json
//!   links/finalized_case/<session_id>.json
//! ```
//!
//! Each collection directory also holds a `.lock` file. File-backed writes
//! take it exclusively and re-read the document under it, so any number of
//! handles and processes may share one store. Nested updates lock `cases`
//! before `panelists` or `resolutions`, never the reverse.

use std::path::Path;

use crate::errors::Result;
use crate::fs;
use crate::schemas::{Case, Panelist, Resolution, Session};

use super::collection::Collection;
use super::{resolution_key, CaseStore, Claim, Link, LinkKind};

pub struct DocumentStore {
    sessions: Collection<Session>,
    cases: Collection<Case>,
    panelists: Collection<Panelist>,
    resolutions: Collection<Resolution>,
    party_b_links: Collection<Link>,
    case_links: Collection<Link>,
}

impl DocumentStore {
    /// A store that lives only as long as the value.
    pub fn in_memory() -> Self {
        DocumentStore {
            sessions: Collection::in_memory("session"),
            cases: Collection::in_memory("case"),
            panelists: Collection::in_memory("panelist"),
            resolutions: Collection::in_memory("resolution"),
            party_b_links: Collection::in_memory("link"),
            case_links: Collection::in_memory("link"),
        }
    }

    /// Open (or create) the file-backed store under `root/.mediate`.
    pub fn open(root: &Path) -> Result<Self> {
        let dir = |name: &str| fs::get_collection_dir(root, name);
        Ok(DocumentStore {
            sessions: Collection::open("session", dir("sessions"))?,
            cases: Collection::open("case", dir("cases"))?,
            panelists: Collection::open("panelist", dir("panelists"))?,
            resolutions: Collection::open("resolution", dir("resolutions"))?,
            party_b_links: Collection::open("link", dir("links").join("party_b"))?,
            case_links: Collection::open("link", dir("links").join("finalized_case"))?,
        })
    }

    fn links(&self, kind: LinkKind) -> &Collection<Link> {
        match kind {
            LinkKind::PartyB => &self.party_b_links,
            LinkKind::FinalizedCase => &self.case_links,
        }
    }
}

impl CaseStore for DocumentStore {
    fn insert_session(&self, session: Session) -> Result<bool> {
        self.sessions.insert(session)
    }

    fn get_session(&self, session_id: &str) -> Result<Session> {
        self.sessions.require(session_id)
    }

    fn update_session(
        &self,
        session_id: &str,
        op: &mut dyn FnMut(&mut Session) -> Result<()>,
    ) -> Result<Session> {
        self.sessions.update(session_id, op)
    }

    fn insert_case(&self, case: Case) -> Result<bool> {
        self.cases.insert(case)
    }

    fn get_case(&self, case_id: &str) -> Result<Case> {
        self.cases.require(case_id)
    }

    fn update_case(
        &self,
        case_id: &str,
        op: &mut dyn FnMut(&mut Case) -> Result<()>,
    ) -> Result<Case> {
        self.cases.update(case_id, op)
    }

    fn list_cases(&self) -> Result<Vec<Case>> {
        self.cases.values_where(|_| true)
    }

    fn insert_panelist(&self, panelist: Panelist) -> Result<bool> {
        self.panelists.insert(panelist)
    }

    fn get_panelist(&self, panelist_id: &str) -> Result<Panelist> {
        self.panelists.require(panelist_id)
    }

    fn update_panelist(
        &self,
        panelist_id: &str,
        op: &mut dyn FnMut(&mut Panelist) -> Result<()>,
    ) -> Result<Panelist> {
        self.panelists.update(panelist_id, op)
    }

    fn list_panelists(&self) -> Result<Vec<Panelist>> {
        self.panelists.values_where(|_| true)
    }

    fn get_resolution(&self, case_id: &str, panelist_id: &str) -> Result<Option<Resolution>> {
        self.resolutions.get(&resolution_key(case_id, panelist_id))
    }

    fn upsert_resolution(
        &self,
        case_id: &str,
        panelist_id: &str,
        op: &mut dyn FnMut(Option<&Resolution>) -> Result<Resolution>,
    ) -> Result<Resolution> {
        self.resolutions
            .upsert(&resolution_key(case_id, panelist_id), op)
    }

    fn list_resolutions(&self, case_id: &str) -> Result<Vec<Resolution>> {
        self.resolutions.values_where(|r| r.case_id == case_id)
    }

    fn remove_resolution(&self, case_id: &str, panelist_id: &str) -> Result<()> {
        self.resolutions.remove(&resolution_key(case_id, panelist_id))
    }

    fn claim_link(&self, kind: LinkKind, key: &str, value: &str) -> Result<Claim> {
        let mut claimed = true;
        let link = self.links(kind).upsert(key, &mut |existing| match existing {
            Some(link) => {
                claimed = false;
                Ok(link.clone())
            }
            None => Ok(Link {
                key: key.to_string(),
                value: value.to_string(),
            }),
        })?;
        if claimed {
            Ok(Claim::Claimed)
        } else {
            Ok(Claim::Existing(link.value))
        }
    }

    fn get_link(&self, kind: LinkKind, key: &str) -> Result<Option<String>> {
        Ok(self.links(kind).get(key)?.map(|l| l.value))
    }

    fn release_link(&self, kind: LinkKind, key: &str) -> Result<()> {
        self.links(kind).remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::fixtures::case;
    use crate::schemas::CaseStatus;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_claim_link_is_insert_if_absent() {
        let store = DocumentStore::in_memory();
        assert_eq!(
            store.claim_link(LinkKind::PartyB, "s-a", "s-b1").unwrap(),
            Claim::Claimed
        );
        assert_eq!(
            store.claim_link(LinkKind::PartyB, "s-a", "s-b2").unwrap(),
            Claim::Existing("s-b1".into())
        );
        // separate namespaces per kind
        assert_eq!(
            store.claim_link(LinkKind::FinalizedCase, "s-a", "case-1").unwrap(),
            Claim::Claimed
        );
        store.release_link(LinkKind::PartyB, "s-a").unwrap();
        assert_eq!(store.get_link(LinkKind::PartyB, "s-a").unwrap(), None);
    }

    #[test]
    fn test_concurrent_claims_have_one_winner() {
        let store = Arc::new(DocumentStore::in_memory());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store
                        .claim_link(LinkKind::PartyB, "parent", &format!("child-{}", i))
                        .unwrap()
                })
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|c| *c == Claim::Claimed)
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn test_resolutions_listed_per_case() {
        let store = DocumentStore::in_memory();
        for (case_id, panelist) in [("c1", "p1"), ("c1", "p2"), ("c2", "p1")] {
            store
                .upsert_resolution(case_id, panelist, &mut |_| {
                    Ok(Resolution::draft(case_id, panelist))
                })
                .unwrap();
        }
        assert_eq!(store.list_resolutions("c1").unwrap().len(), 2);
        assert!(store.get_resolution("c2", "p1").unwrap().is_some());
        assert!(store.get_resolution("c2", "p2").unwrap().is_none());
    }

    #[test]
    fn test_two_file_handles_share_links_and_documents() {
        let temp = TempDir::new().unwrap();
        let a = DocumentStore::open(temp.path()).unwrap();
        let b = DocumentStore::open(temp.path()).unwrap();

        assert_eq!(
            a.claim_link(LinkKind::PartyB, "s-a", "s-b1").unwrap(),
            Claim::Claimed
        );
        assert_eq!(
            b.claim_link(LinkKind::PartyB, "s-a", "s-b2").unwrap(),
            Claim::Existing("s-b1".into())
        );

        a.insert_case(case(CaseStatus::Open)).unwrap();
        assert!(!b.insert_case(case(CaseStatus::Open)).unwrap());
        b.update_case("case-001", &mut |c| {
            c.assigned_to = Some("admin-2".into());
            Ok(())
        })
        .unwrap();
        assert_eq!(
            a.get_case("case-001").unwrap().assigned_to.as_deref(),
            Some("admin-2")
        );
    }

    #[test]
    fn test_concurrent_claims_across_file_handles() {
        let temp = TempDir::new().unwrap();
        let root = Arc::new(temp.path().to_path_buf());
        let handles: Vec<_> = (0..6)
            .map(|i| {
                let root = Arc::clone(&root);
                std::thread::spawn(move || {
                    DocumentStore::open(&root)
                        .unwrap()
                        .claim_link(LinkKind::FinalizedCase, "session-a", &format!("case-{}", i))
                        .unwrap()
                })
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|c| *c == Claim::Claimed)
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn test_file_store_round_trip() {
        let temp = TempDir::new().unwrap();
        {
            let store = DocumentStore::open(temp.path()).unwrap();
            store.insert_case(case(CaseStatus::Open)).unwrap();
            store
                .update_case("case-001", &mut |c| {
                    c.assigned_to = Some("admin-1".into());
                    Ok(())
                })
                .unwrap();
            store
                .claim_link(LinkKind::FinalizedCase, "session-a", "case-001")
                .unwrap();
        }
        let store = DocumentStore::open(temp.path()).unwrap();
        let reloaded = store.get_case("case-001").unwrap();
        assert_eq!(reloaded.assigned_to.as_deref(), Some("admin-1"));
        assert_eq!(
            store.get_link(LinkKind::FinalizedCase, "session-a").unwrap(),
            Some("case-001".into())
        );
        assert!(temp.path().join(".mediate").join("cases").join("case-001.json").exists());
    }
}
