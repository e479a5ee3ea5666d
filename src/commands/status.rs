//! `divergence status`: health-check the data source and summarise its contents.

use anyhow::Result;
use crossterm::style::Stylize;

use crate::commands;
use crate::data::DataSource;
use crate::data::cache::DataCache;
use crate::model::is_root_scope;
use crate::model::linkage::parse_ref;

pub fn run() -> Result<()> {
    let (source, _) = commands::open_source(None)?;
    let report = compute(source.as_ref());
    print_report(&report);
    Ok(())
}

#[derive(Debug, Default)]
pub struct StatusReport {
    pub source: String,
    pub healthy: bool,
    pub load_error: Option<String>,
    pub worldlines: usize,
    pub events: usize,
    pub root_events: usize,
    /// Events whose scope names no worldline.
    pub orphaned_events: Vec<String>,
    /// Events with destination text that does not parse as a reference.
    pub unreadable_targets: Vec<String>,
}

pub fn compute(source: &dyn DataSource) -> StatusReport {
    let data = DataCache::load(source);
    let orphaned_events = data
        .events
        .iter()
        .filter(|e| !is_root_scope(&e.scope) && data.worldline(&e.scope).is_none())
        .map(|e| format!("{} (scope `{}`)", e.id, e.scope))
        .collect();
    let unreadable_targets = data
        .events
        .iter()
        .filter_map(|e| {
            let to = e.to_text()?;
            parse_ref(to).is_none().then(|| format!("{}: `{}`", e.id, to))
        })
        .collect();
    StatusReport {
        source: source.describe(),
        healthy: data.load_error.is_none(),
        load_error: data.load_error.clone(),
        worldlines: data.worldlines.len(),
        events: data.events.len(),
        root_events: data.root_events().len(),
        orphaned_events,
        unreadable_targets,
    }
}

fn print_report(report: &StatusReport) {
    println!("  {} {}", "Source".cyan().bold(), report.source);
    if !report.healthy {
        println!(
            "  {} {}",
            "Unreachable".red().bold(),
            report.load_error.as_deref().unwrap_or("health check failed")
        );
        return;
    }
    println!(
        "  {} {} worldlines, {} events ({} on the root axis)",
        "Healthy".green().bold(),
        report.worldlines,
        report.events,
        report.root_events
    );
    for id in &report.orphaned_events {
        println!("  {} {}", "Orphaned".yellow().bold(), id);
    }
    for id in &report.unreadable_targets {
        println!("  {} {}", "No target".yellow().bold(), id);
    }
}
