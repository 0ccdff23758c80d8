//! JSON file operations with schema validation
//!
//! Provides functions to read and write JSON documents with serde.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{MediateError, Result};
use crate::schemas::Config;

use super::paths::get_config_path;

/// Read and deserialize a JSON file.
///
/// # Errors
/// * `NotFound` - If the file does not exist
/// * `InvalidJson` - If the file contents do not match the expected schema
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            MediateError::not_found("file", path.display().to_string())
        } else {
            MediateError::Io(e)
        }
    })?;

    serde_json::from_str(&content).map_err(|e| {
        MediateError::InvalidJson(format!("Invalid JSON in file {}: {}", path.display(), e))
    })
}

/// Write a value to a JSON file with pretty formatting.
///
/// Uses atomic write (write to temp file, then rename) to avoid partial writes.
pub fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let content =
        serde_json::to_string_pretty(data).map_err(|e| MediateError::InvalidJson(e.to_string()))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("json.tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(content.as_bytes())?;
    file.write_all(b"\n")?;
    file.sync_all()?;
    drop(file);

    fs::rename(&temp_path, path)?;

    Ok(())
}

/// Delete a JSON document; a missing file is not an error.
pub fn remove_json(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(MediateError::Io(e)),
    }
}

/// List the `.json` documents in a directory, sorted by file name.
///
/// A missing directory yields an empty list.
pub fn list_json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(MediateError::Io(e)),
    };
    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Read the config.json file for a store.
///
/// Returns the default config if the file doesn't exist.
pub fn read_config(root: &Path) -> Result<Config> {
    let path = get_config_path(root);
    if !path.exists() {
        return Ok(Config::default());
    }
    read_json(&path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::Panelist;
    use tempfile::TempDir;

    #[test]
    fn test_read_json_file_not_found() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nonexistent.json");

        let result: Result<Panelist> = read_json(&path);
        assert!(matches!(result.unwrap_err(), MediateError::NotFound { .. }));
    }

    #[test]
    fn test_read_json_invalid_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("invalid.json");
        fs::write(&path, "not valid json {").unwrap();

        let result: Result<Panelist> = read_json(&path);
        assert!(matches!(result.unwrap_err(), MediateError::InvalidJson(_)));
    }

    #[test]
    fn test_write_json_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("dir").join("p1.json");

        let panelist = Panelist::new("p1".into(), "Pat".into(), 2);
        write_json(&path, &panelist).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let read: Panelist = read_json(&path).unwrap();
        assert_eq!(read, panelist);
    }

    #[test]
    fn test_list_json_files() {
        let temp = TempDir::new().unwrap();
        assert!(list_json_files(&temp.path().join("missing")).unwrap().is_empty());

        fs::write(temp.path().join("b.json"), "{}").unwrap();
        fs::write(temp.path().join("a.json"), "{}").unwrap();
        fs::write(temp.path().join("notes.txt"), "x").unwrap();
        let files = list_json_files(temp.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }

    #[test]
    fn test_remove_json_missing_is_ok() {
        let temp = TempDir::new().unwrap();
        assert!(remove_json(&temp.path().join("gone.json")).is_ok());
    }

    #[test]
    fn test_read_config_default_when_missing() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(".mediate")).unwrap();

        let config = read_config(temp.path()).unwrap();
        assert_eq!(config.min_resolution_notes, 50);
    }
}
