//! CLI command implementations

pub mod case;
pub mod init;
pub mod panel;
pub mod resolution;
pub mod session;

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::load_config;
use crate::errors::{MediateError, Result};
use crate::fs;
use crate::schemas::Actor;
use crate::store::DocumentStore;
use crate::timeline::{CompositeTimelineSink, JsonlTimelineSink, TimelineSink, TracingTimelineSink};
use crate::workflow::Mediation;

/// Shared state for commands that work on an existing store
pub struct CommandContext {
    pub root: PathBuf,
    pub actor: Actor,
    pub json: bool,
}

impl CommandContext {
    /// Locate the store above `cwd` for `actor`
    pub fn locate(cwd: Option<&Path>, actor: Actor, json: bool) -> Result<Self> {
        let root = fs::find_store_root(&fs::resolve_cwd(cwd))?;
        Ok(CommandContext { root, actor, json })
    }

    /// Open the file-backed mediation service
    pub fn open(&self) -> Result<Mediation<DocumentStore>> {
        let config = load_config(&self.root)?;
        let store = DocumentStore::open(&self.root)?;

        let mut sinks: Vec<Box<dyn TimelineSink>> = vec![Box::new(TracingTimelineSink)];
        if config.timeline_log {
            if let Some(jsonl) = JsonlTimelineSink::open(fs::get_timeline_log_path(&self.root)) {
                sinks.push(Box::new(jsonl));
            }
        }
        Ok(Mediation::new(store, config).with_timeline(CompositeTimelineSink::new(sinks)))
    }

    /// Print `value` as JSON or through `human`
    pub fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            let out = serde_json::to_string_pretty(value)
                .map_err(|e| MediateError::wrap(e, "serialize output"))?;
            println!("{}", out);
        } else {
            human(value);
        }
        Ok(())
    }
}

/// Read a command payload from a JSON file
pub fn read_payload<T: DeserializeOwned>(path: &Path) -> Result<T> {
    fs::read_json(path)
}
