//! Config schema - Tunables for the mediation core

use serde::{Deserialize, Serialize};

/// Floor for `min_resolution_notes`; config may raise it, never lower it
pub const MIN_RESOLUTION_NOTES: usize = 50;

/// Main configuration, read from `.mediate/config.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Schema version for forward compatibility
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Minimum length of a submitted resolution's notes, in characters
    #[serde(default = "default_min_resolution_notes")]
    pub min_resolution_notes: usize,

    /// Case load cap for panelists registered without an explicit maximum
    #[serde(default = "default_max_active_cases")]
    pub default_max_active_cases: usize,

    /// Maximum length of a case title
    #[serde(default = "default_max_title_length")]
    pub max_title_length: usize,

    /// Append timeline events to `.mediate/timeline.jsonl`
    #[serde(default = "default_timeline_log")]
    pub timeline_log: bool,
}

fn default_schema_version() -> u32 {
    1
}

fn default_min_resolution_notes() -> usize {
    MIN_RESOLUTION_NOTES
}

fn default_max_active_cases() -> usize {
    5
}

fn default_max_title_length() -> usize {
    200
}

fn default_timeline_log() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Config {
            schema_version: 1,
            min_resolution_notes: MIN_RESOLUTION_NOTES,
            default_max_active_cases: 5,
            max_title_length: 200,
            timeline_log: true,
        }
    }
}
