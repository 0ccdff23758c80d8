//! Path resolution utilities for the `.mediate` store
//!
//! Provides functions to locate the store root and construct paths to the
//! document collections inside it.

use std::path::{Path, PathBuf};

use crate::errors::{MediateError, Result};

/// Name of the store directory
pub const STORE_DIR: &str = ".mediate";

/// Find the nearest directory containing a `.mediate` directory.
///
/// Walks up the directory tree from the starting directory.
///
/// # Errors
/// * `StoreNotFound` - If no ancestor contains `.mediate`
pub fn find_store_root(start_cwd: &Path) -> Result<PathBuf> {
    let mut current = start_cwd
        .canonicalize()
        .map_err(|e| MediateError::StoreNotFound(format!("Cannot resolve path: {}", e)))?;

    loop {
        if current.join(STORE_DIR).is_dir() {
            return Ok(current);
        }

        match current.parent() {
            Some(parent) if parent != current => {
                current = parent.to_path_buf();
            }
            _ => {
                return Err(MediateError::StoreNotFound(
                    "Could not find a .mediate directory; run `mediate init` first".to_string(),
                ));
            }
        }
    }
}

/// Resolve the current working directory, optionally using an override.
pub fn resolve_cwd(cwd_option: Option<&Path>) -> PathBuf {
    match cwd_option {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Get the path to the .mediate directory.
pub fn get_store_dir(root: &Path) -> PathBuf {
    root.join(STORE_DIR)
}

/// Get the path to the config.json file.
pub fn get_config_path(root: &Path) -> PathBuf {
    get_store_dir(root).join("config.json")
}

/// Get the path to the timeline event log.
pub fn get_timeline_log_path(root: &Path) -> PathBuf {
    get_store_dir(root).join("timeline.jsonl")
}

/// Get the directory holding one document collection.
pub fn get_collection_dir(root: &Path, collection: &str) -> PathBuf {
    get_store_dir(root).join(collection)
}

/// Get the path of one document inside a collection directory.
///
/// Keys may contain characters that are unsafe in file names; anything
/// outside `[A-Za-z0-9_-]` is percent-encoded.
pub fn get_document_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{}.json", encode_key(key)))
}

fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}
