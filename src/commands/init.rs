//! `divergence init`: create the `.divergence/` store in the current directory.

use std::fs;
use std::path::Path;

use anyhow::{Result, bail};
use crossterm::style::Stylize;
use tracing::info;

use crate::config;
use crate::data::file::FileStore;
use crate::data::seed;
use crate::store;

/// Entry point called from `main`.
pub fn run() -> Result<()> {
    let root = std::env::current_dir()?;
    run_in(&root)
}

/// Run init inside `root`.
pub fn run_in(root: &Path) -> Result<()> {
    let data_path = store::data_path(root);
    if data_path.exists() {
        bail!(
            "divergence is already initialised ({} exists).",
            data_path.display()
        );
    }
    fs::create_dir_all(store::store_dir(root))?;

    let doc = seed::document();
    FileStore::create(data_path.clone(), &doc)?;
    println!(
        "  {} {}/timeline.json  {}",
        "Created".green().bold(),
        store::STORE_DIR,
        format!(
            "({} worldlines, {} events)",
            doc.worldlines.len(),
            doc.events.len()
        )
        .dark_grey()
    );

    let config_path = store::config_path(root);
    if !config_path.exists() {
        fs::write(&config_path, config::DEFAULT_CONTENTS)?;
        println!("  {} {}/config.toml", "Created".green().bold(), store::STORE_DIR);
    }

    info!(root = %root.display(), "store initialised");
    println!();
    println!(
        "  Run {} to open the meter.",
        "divergence view".cyan().bold()
    );
    Ok(())
}
