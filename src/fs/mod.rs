//! File system utilities for the `.mediate` store
//!
//! Provides path resolution, JSON file operations and directory locks.

mod json;
mod lock;
mod paths;

pub use json::{list_json_files, read_config, read_json, remove_json, write_json};
pub use lock::DirLock;
pub use paths::{
    find_store_root, get_collection_dir, get_config_path, get_document_path, get_store_dir,
    get_timeline_log_path, resolve_cwd, STORE_DIR,
};
