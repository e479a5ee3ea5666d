//! Paths inside the `.divergence/` store directory.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

pub const STORE_DIR: &str = ".divergence";

/// Walk upward from `start` to find the directory containing
/// `.divergence/timeline.json`.
pub fn find_root_from(start: &Path) -> Result<PathBuf> {
    let mut dir = start;
    loop {
        if data_path(dir).exists() {
            return Ok(dir.to_path_buf());
        }
        match dir.parent() {
            Some(parent) => dir = parent,
            None => bail!("no timeline store found: run `divergence init` first"),
        }
    }
}

/// Walk upward from the current working directory.
pub fn find_root() -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    find_root_from(&cwd)
}

pub fn store_dir(root: &Path) -> PathBuf {
    root.join(STORE_DIR)
}

pub fn data_path(root: &Path) -> PathBuf {
    store_dir(root).join("timeline.json")
}

pub fn config_path(root: &Path) -> PathBuf {
    store_dir(root).join("config.toml")
}

pub fn log_path(root: &Path) -> PathBuf {
    store_dir(root).join("divergence.log")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn init_store(dir: &TempDir) {
        fs::create_dir_all(store_dir(dir.path())).unwrap();
        fs::write(data_path(dir.path()), "{}").unwrap();
    }

    #[test]
    fn find_root_from_direct() {
        let dir = TempDir::new().unwrap();
        init_store(&dir);
        assert_eq!(find_root_from(dir.path()).unwrap(), dir.path());
    }

    #[test]
    fn find_root_from_nested_directory() {
        let dir = TempDir::new().unwrap();
        init_store(&dir);
        fs::create_dir_all(dir.path().join("notes/2022")).unwrap();
        let root = find_root_from(&dir.path().join("notes/2022")).unwrap();
        assert_eq!(root, dir.path());
    }

    #[test]
    fn find_root_needs_the_data_file() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(store_dir(dir.path())).unwrap();
        assert!(find_root_from(dir.path()).is_err());
    }
}
