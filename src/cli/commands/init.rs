//! Init command - Create a .mediate store

use std::path::Path;

use crate::config::init_store;
use crate::errors::Result;
use crate::fs;

/// Initialize a store in the working directory
pub fn run(cwd: Option<&Path>, force: bool, json: bool) -> Result<()> {
    let root = fs::resolve_cwd(cwd);
    let config = init_store(&root, force)?;
    if json {
        let out = serde_json::to_string_pretty(&config)
            .map_err(|e| crate::errors::MediateError::wrap(e, "serialize output"))?;
        println!("{}", out);
    } else {
        println!("Initialized {}", fs::get_store_dir(&root).display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_config() {
        let temp = TempDir::new().unwrap();
        run(Some(temp.path()), false, false).unwrap();
        assert!(fs::get_config_path(temp.path()).exists());
        // running again is harmless
        run(Some(temp.path()), false, true).unwrap();
    }
}
