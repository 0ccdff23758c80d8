//! Mediate - Case intake and panel resolution for dispute mediation
//!
//! This library provides the core functionality for the mediate CLI, including:
//! - Schema definitions for sessions, cases, panelists and resolutions
//! - Domain logic for intake steps, case statuses and transitions
//! - A document store with atomic read-modify-write updates
//! - File system utilities for reading/writing JSON
//! - The mediation workflow (intake, finalize, panel, resolution, admin)

pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod fs;
pub mod schemas;
pub mod store;
pub mod timeline;
pub mod workflow;

// Re-export commonly used types
pub use errors::{MediateError, Result};
pub use schemas::{Actor, Case, CaseStatus, Config, Role, Session};
pub use store::{CaseStore, DocumentStore};
pub use workflow::Mediation;
