//! Timeline sink: the audit-log collaborator
//!
//! Every entry appended to a case's timeline is also forwarded to a
//! [`TimelineSink`]. The sink is fire-and-forget: a failing sink never fails
//! the operation that produced the event.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::schemas::{TimelineEntry, TimelineKind};

/// Audit record handed to the sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub case_id: String,
    #[serde(rename = "type")]
    pub kind: TimelineKind,
    pub actor: String,
    pub timestamp: String,
    pub description: String,
}

impl TimelineEvent {
    pub fn from_entry(case_id: &str, entry: &TimelineEntry) -> Self {
        TimelineEvent {
            case_id: case_id.to_string(),
            kind: entry.kind,
            actor: entry.actor.clone(),
            timestamp: entry.timestamp.clone(),
            description: entry.description.clone(),
        }
    }
}

/// Port for recording timeline events outside the case document.
pub trait TimelineSink: Send + Sync {
    fn record(&self, event: TimelineEvent);
}

/// Discards everything.
pub struct NoTimelineSink;

impl TimelineSink for NoTimelineSink {
    fn record(&self, _event: TimelineEvent) {}
}

/// Emits each event as a `tracing` info record.
pub struct TracingTimelineSink;

impl TimelineSink for TracingTimelineSink {
    fn record(&self, event: TimelineEvent) {
        info!(
            case_id = %event.case_id,
            kind = %event.kind,
            actor = %event.actor,
            "{}",
            event.description
        );
    }
}

/// Appends one JSON object per line to a file.
pub struct JsonlTimelineSink {
    writer: Mutex<BufWriter<std::fs::File>>,
    path: PathBuf,
}

impl JsonlTimelineSink {
    /// Open `path` for appending, creating it and its parent directory.
    ///
    /// Returns `None` if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!("Could not create timeline directory {}: {}", parent.display(), e);
                return None;
            }
        }
        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open timeline log {}: {}", path.display(), e);
                return None;
            }
        };
        Some(JsonlTimelineSink {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TimelineSink for JsonlTimelineSink {
    fn record(&self, event: TimelineEvent) {
        let Ok(line) = serde_json::to_string(&event) else {
            return;
        };
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

/// Fans events out to several sinks.
pub struct CompositeTimelineSink {
    sinks: Vec<Box<dyn TimelineSink>>,
}

impl CompositeTimelineSink {
    pub fn new(sinks: Vec<Box<dyn TimelineSink>>) -> Self {
        CompositeTimelineSink { sinks }
    }
}

impl TimelineSink for CompositeTimelineSink {
    fn record(&self, event: TimelineEvent) {
        for sink in &self.sinks {
            sink.record(event.clone());
        }
    }
}

/// Collects events in memory; used by tests.
#[derive(Default)]
pub struct MemoryTimelineSink {
    events: Mutex<Vec<TimelineEvent>>,
}

impl MemoryTimelineSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TimelineEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl TimelineSink for MemoryTimelineSink {
    fn record(&self, event: TimelineEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl<T: TimelineSink + ?Sized> TimelineSink for std::sync::Arc<T> {
    fn record(&self, event: TimelineEvent) {
        (**self).record(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::CaseStatus;

    #[test]
    fn test_jsonl_sink_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("timeline.jsonl");

        let sink = JsonlTimelineSink::open(&path).unwrap();
        let entry = TimelineEntry::status_change("admin", CaseStatus::Open, CaseStatus::Assigned);
        sink.record(TimelineEvent::from_entry("case-1", &entry));
        sink.record(TimelineEvent::from_entry("case-2", &entry));
        drop(sink);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["type"], "status_changed");
        assert_eq!(first["case_id"], "case-1");

        // Reopening appends rather than truncating
        let sink = JsonlTimelineSink::open(&path).unwrap();
        sink.record(TimelineEvent::from_entry("case-3", &entry));
        drop(sink);
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 3);
    }

    #[test]
    fn test_composite_fans_out() {
        let a = std::sync::Arc::new(MemoryTimelineSink::new());
        let b = std::sync::Arc::new(MemoryTimelineSink::new());
        let sink = CompositeTimelineSink::new(vec![Box::new(a.clone()), Box::new(b.clone())]);
        let entry = TimelineEntry::new(TimelineKind::NoteAdded, "admin", "Note added");
        sink.record(TimelineEvent::from_entry("case-1", &entry));
        assert_eq!(a.events().len(), 1);
        assert_eq!(b.events().len(), 1);
    }
}
