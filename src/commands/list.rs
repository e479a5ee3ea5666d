//! `divergence list`: print worldlines and events from the data source.

use anyhow::Result;

use crate::commands;
use crate::core::sequencer::format_value;
use crate::data::DataSource;
use crate::model::{Event, Worldline};

pub fn run(scope: Option<String>) -> Result<()> {
    let (source, _) = commands::open_source(None)?;
    let lines = list_lines(source.as_ref(), scope.as_deref())?;
    if lines.is_empty() {
        println!("  Nothing to list.");
    } else {
        for line in lines {
            println!("  {}", line);
        }
    }
    Ok(())
}

/// Worldlines then events; only the scope's events when `scope` is given.
fn list_lines(source: &dyn DataSource, scope: Option<&str>) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    if scope.is_none() {
        lines.extend(source.list_worldlines()?.iter().map(worldline_line));
    }
    lines.extend(source.list_events(scope)?.iter().map(event_line));
    Ok(lines)
}

fn worldline_line(wl: &Worldline) -> String {
    format!("{} {} : {}%", wl.id, wl.name, format_value(wl.percentage))
}

fn event_line(ev: &Event) -> String {
    let mut line = format!(
        "[{}] {} @ {} : {} ({})",
        ev.scope, ev.id, ev.position, ev.title, ev.date
    );
    match (ev.from_text(), ev.to_text()) {
        (None, None) => {}
        (from, to) => {
            line.push_str(&format!(" {} -> {}", from.unwrap_or("?"), to.unwrap_or("?")));
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::MemoryStore;

    #[test]
    fn lists_worldlines_before_events_in_position_order() {
        let store = MemoryStore::seeded();
        let lines = list_lines(&store, None).unwrap();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "alpha α : 0.000000%");
        assert_eq!(
            lines[4],
            "[beta] april2020 @ 18.33 : Alpha-Beta Worldline Convergence (April 2020) α: 0.000000% -> β: 1.040402%"
        );
    }

    #[test]
    fn scope_filter_lists_only_that_scope() {
        let store = MemoryStore::seeded();
        let lines = list_lines(&store, Some("beta")).unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.starts_with("[beta]")));
        assert!(lines[1].ends_with("? -> β: 1.075432%"));
    }

    #[test]
    fn unknown_scope_is_empty() {
        let store = MemoryStore::seeded();
        assert!(list_lines(&store, Some("omega")).unwrap().is_empty());
    }
}
