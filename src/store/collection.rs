//! One lockable collection of documents, in memory or on disk
//!
//! The in-memory form keeps every document behind one `Mutex`. The disk form
//! keeps nothing in memory: each write takes the collection's directory lock,
//! re-reads the document from disk, applies the change and writes it back, so
//! handles in separate processes never act on stale state.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::errors::{MediateError, Result};
use crate::fs::{self, DirLock};

use super::Document;

enum Backing<T> {
    Memory(Mutex<BTreeMap<String, T>>),
    Disk { dir: PathBuf, guard: Mutex<()> },
}

/// Held for the duration of one disk write
struct DiskLock<'a> {
    _file: DirLock,
    _thread: MutexGuard<'a, ()>,
}

pub(crate) struct Collection<T> {
    kind: &'static str,
    backing: Backing<T>,
}

impl<T> Collection<T>
where
    T: Document + Clone + Serialize + DeserializeOwned,
{
    pub fn in_memory(kind: &'static str) -> Self {
        Collection {
            kind,
            backing: Backing::Memory(Mutex::new(BTreeMap::new())),
        }
    }

    /// A collection stored as one JSON file per document under `dir`.
    pub fn open(kind: &'static str, dir: PathBuf) -> Result<Self> {
        debug!(collection = kind, dir = %dir.display(), "opened collection");
        Ok(Collection {
            kind,
            backing: Backing::Disk {
                dir,
                guard: Mutex::new(()),
            },
        })
    }

    fn poisoned<E: std::fmt::Display>(&self, e: E) -> MediateError {
        MediateError::wrap(e, format!("{} collection lock poisoned", self.kind))
    }

    fn lock_memory<'a>(
        &self,
        docs: &'a Mutex<BTreeMap<String, T>>,
    ) -> Result<MutexGuard<'a, BTreeMap<String, T>>> {
        docs.lock().map_err(|e| self.poisoned(e))
    }

    fn lock_disk<'a>(&self, dir: &Path, guard: &'a Mutex<()>) -> Result<DiskLock<'a>> {
        let thread = guard.lock().map_err(|e| self.poisoned(e))?;
        let file = DirLock::acquire(dir)?;
        Ok(DiskLock {
            _file: file,
            _thread: thread,
        })
    }

    fn read_doc(dir: &Path, key: &str) -> Result<Option<T>> {
        match fs::read_json(&fs::get_document_path(dir, key)) {
            Ok(doc) => Ok(Some(doc)),
            Err(MediateError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write_doc(dir: &Path, key: &str, doc: &T) -> Result<()> {
        fs::write_json(&fs::get_document_path(dir, key), doc)
    }

    pub fn get(&self, key: &str) -> Result<Option<T>> {
        match &self.backing {
            Backing::Memory(docs) => Ok(self.lock_memory(docs)?.get(key).cloned()),
            Backing::Disk { dir, .. } => Self::read_doc(dir, key),
        }
    }

    /// Like `get`, but a missing document is a `NotFound` error.
    pub fn require(&self, key: &str) -> Result<T> {
        self.get(key)?
            .ok_or_else(|| MediateError::not_found(self.kind, key))
    }

    pub fn insert(&self, doc: T) -> Result<bool> {
        let key = doc.key();
        match &self.backing {
            Backing::Memory(docs) => {
                let mut docs = self.lock_memory(docs)?;
                if docs.contains_key(&key) {
                    return Ok(false);
                }
                docs.insert(key, doc);
            }
            Backing::Disk { dir, guard } => {
                let _lock = self.lock_disk(dir, guard)?;
                if Self::read_doc(dir, &key)?.is_some() {
                    return Ok(false);
                }
                Self::write_doc(dir, &key, &doc)?;
            }
        }
        Ok(true)
    }

    /// Atomically modify an existing document.
    pub fn update(&self, key: &str, op: &mut dyn FnMut(&mut T) -> Result<()>) -> Result<T> {
        match &self.backing {
            Backing::Memory(docs) => {
                let mut docs = self.lock_memory(docs)?;
                let mut doc = docs
                    .get(key)
                    .cloned()
                    .ok_or_else(|| MediateError::not_found(self.kind, key))?;
                op(&mut doc)?;
                docs.insert(key.to_string(), doc.clone());
                Ok(doc)
            }
            Backing::Disk { dir, guard } => {
                let _lock = self.lock_disk(dir, guard)?;
                let mut doc = Self::read_doc(dir, key)?
                    .ok_or_else(|| MediateError::not_found(self.kind, key))?;
                op(&mut doc)?;
                Self::write_doc(dir, key, &doc)?;
                Ok(doc)
            }
        }
    }

    /// Atomically create or replace a document.
    pub fn upsert(&self, key: &str, op: &mut dyn FnMut(Option<&T>) -> Result<T>) -> Result<T> {
        match &self.backing {
            Backing::Memory(docs) => {
                let mut docs = self.lock_memory(docs)?;
                let doc = op(docs.get(key))?;
                self.check_key(key, &doc)?;
                docs.insert(key.to_string(), doc.clone());
                Ok(doc)
            }
            Backing::Disk { dir, guard } => {
                let _lock = self.lock_disk(dir, guard)?;
                let current = Self::read_doc(dir, key)?;
                let doc = op(current.as_ref())?;
                self.check_key(key, &doc)?;
                Self::write_doc(dir, key, &doc)?;
                Ok(doc)
            }
        }
    }

    fn check_key(&self, key: &str, doc: &T) -> Result<()> {
        if doc.key() == key {
            return Ok(());
        }
        Err(MediateError::wrap(
            format!("document key {} does not match {}", doc.key(), key),
            format!("{} upsert", self.kind),
        ))
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        match &self.backing {
            Backing::Memory(docs) => {
                self.lock_memory(docs)?.remove(key);
                Ok(())
            }
            Backing::Disk { dir, guard } => {
                let _lock = self.lock_disk(dir, guard)?;
                fs::remove_json(&fs::get_document_path(dir, key))
            }
        }
    }

    /// Snapshot of all documents matching `filter`.
    pub fn values_where(&self, filter: impl Fn(&T) -> bool) -> Result<Vec<T>> {
        match &self.backing {
            Backing::Memory(docs) => Ok(self
                .lock_memory(docs)?
                .values()
                .filter(|d| filter(d))
                .cloned()
                .collect()),
            Backing::Disk { dir, .. } => {
                let mut out = Vec::new();
                for path in fs::list_json_files(dir)? {
                    // removed between listing and reading
                    let doc: T = match fs::read_json(&path) {
                        Ok(doc) => doc,
                        Err(MediateError::NotFound { .. }) => continue,
                        Err(e) => return Err(e),
                    };
                    if filter(&doc) {
                        out.push(doc);
                    }
                }
                Ok(out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::Panelist;
    use tempfile::TempDir;

    #[test]
    fn test_failed_update_is_not_committed() {
        let c: Collection<Panelist> = Collection::in_memory("panelist");
        c.insert(Panelist::new("p1".into(), "Pat".into(), 1)).unwrap();

        let result = c.update("p1", &mut |p| {
            p.max_active_cases = 9;
            Err(MediateError::Forbidden("no".into()))
        });
        assert!(result.is_err());
        assert_eq!(c.require("p1").unwrap().max_active_cases, 1);
    }

    #[test]
    fn test_insert_is_insert_if_absent() {
        let c: Collection<Panelist> = Collection::in_memory("panelist");
        assert!(c.insert(Panelist::new("p1".into(), "Pat".into(), 1)).unwrap());
        assert!(!c.insert(Panelist::new("p1".into(), "Other".into(), 3)).unwrap());
        assert_eq!(c.require("p1").unwrap().name, "Pat");
    }

    #[test]
    fn test_missing_update_is_not_found() {
        let c: Collection<Panelist> = Collection::in_memory("panelist");
        let err = c.update("nobody", &mut |_| Ok(())).unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_disk_handles_see_each_others_writes() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("panelists");
        let a: Collection<Panelist> = Collection::open("panelist", dir.clone()).unwrap();
        let b: Collection<Panelist> = Collection::open("panelist", dir).unwrap();

        assert!(a.insert(Panelist::new("p1".into(), "Pat".into(), 2)).unwrap());
        assert!(!b.insert(Panelist::new("p1".into(), "Other".into(), 9)).unwrap());

        b.update("p1", &mut |p| {
            p.active_cases.insert("case-1".into());
            Ok(())
        })
        .unwrap();
        a.update("p1", &mut |p| {
            p.active_cases.insert("case-2".into());
            Ok(())
        })
        .unwrap();
        assert_eq!(b.require("p1").unwrap().load(), 2);

        a.remove("p1").unwrap();
        assert!(b.get("p1").unwrap().is_none());
        assert!(b.values_where(|_| true).unwrap().is_empty());
    }

    #[test]
    fn test_concurrent_disk_handles_do_not_lose_updates() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("panelists");
        let seed: Collection<Panelist> = Collection::open("panelist", dir.clone()).unwrap();
        seed.insert(Panelist::new("p1".into(), "Pat".into(), 100)).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let dir = dir.clone();
                std::thread::spawn(move || {
                    let c: Collection<Panelist> = Collection::open("panelist", dir).unwrap();
                    for j in 0..5 {
                        c.update("p1", &mut |p| {
                            p.active_cases.insert(format!("case-{}-{}", i, j));
                            Ok(())
                        })
                        .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(seed.require("p1").unwrap().load(), 20);
    }

    #[test]
    fn test_open_reloads_persisted_documents() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("panelists");
        {
            let c: Collection<Panelist> = Collection::open("panelist", dir.clone()).unwrap();
            c.insert(Panelist::new("p1".into(), "Pat".into(), 2)).unwrap();
            c.update("p1", &mut |p| {
                p.active_cases.insert("case-1".into());
                Ok(())
            })
            .unwrap();
        }
        let reopened: Collection<Panelist> = Collection::open("panelist", dir).unwrap();
        assert_eq!(reopened.require("p1").unwrap().load(), 1);
    }
}
