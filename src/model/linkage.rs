//! Worldline reference text (`"<name>: <percentage>%"`) and branch-parent
//! resolution between events.

use std::sync::OnceLock;

use regex::Regex;

use super::timeline::Event;

/// A parsed `"<name>: <percentage>%"` reference.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldlineRef {
    pub name: String,
    pub percentage: f64,
}

fn reference_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"^\s*(?P<name>[^:]+?)\s*:\s*(?P<pct>[-+]?\d+(?:\.\d+)?)\s*%\s*$").ok()
        })
        .as_ref()
}

/// Parse a worldline reference. Returns `None` for anything malformed.
pub fn parse_ref(text: &str) -> Option<WorldlineRef> {
    let caps = reference_pattern()?.captures(text)?;
    let percentage: f64 = caps["pct"].parse().ok()?;
    if !percentage.is_finite() {
        return None;
    }
    Some(WorldlineRef {
        name: caps["name"].to_string(),
        percentage,
    })
}

/// Transition target for activating `event`, if its destination parses.
pub fn transition_target(event: &Event) -> Option<f64> {
    event.to_text().and_then(parse_ref).map(|r| r.percentage)
}

/// Find the event `event` branches from within `events`.
///
/// Candidates are walked in order; the first one whose id equals the
/// `from_worldline` text, whose id is contained in it, or whose
/// `to_worldline` equals it exactly, wins. `None` means the event forks
/// from the main line.
pub fn resolve_parent<'a>(event: &Event, events: &'a [Event]) -> Option<&'a Event> {
    let from = event.from_text()?;
    events.iter().filter(|c| c.id != event.id).find(|c| {
        let id_match = !c.id.is_empty() && (c.id == from || from.contains(c.id.as_str()));
        id_match || c.to_text() == Some(from)
    })
}

/// `root` plus every event whose parent chain leads back to it, ordered by
/// position.
pub fn descendant_chain<'a>(root: &'a Event, events: &'a [Event]) -> Vec<&'a Event> {
    let mut chain: Vec<&Event> = vec![root];
    let mut frontier = vec![root.id.as_str()];
    while let Some(parent_id) = frontier.pop() {
        for ev in events {
            if chain.iter().any(|c| c.id == ev.id) {
                continue;
            }
            if resolve_parent(ev, events).is_some_and(|p| p.id == parent_id) {
                chain.push(ev);
                frontier.push(ev.id.as_str());
            }
        }
    }
    chain.sort_by(|a, b| a.position.total_cmp(&b.position));
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(id: &str, position: f64, from: Option<&str>, to: Option<&str>) -> Event {
        Event {
            id: id.into(),
            date: String::new(),
            title: id.into(),
            position,
            from_worldline: from.map(Into::into),
            to_worldline: to.map(Into::into),
            lore: None,
            kind: None,
            scope: "beta".into(),
        }
    }

    #[test]
    fn parse_ref_reads_name_and_percentage() {
        let r = parse_ref("β: 1.130205%").unwrap();
        assert_eq!(r.name, "β");
        assert_eq!(r.percentage, 1.130205);
        assert_eq!(parse_ref("  α :0.060502 % ").unwrap().percentage, 0.060502);
        assert_eq!(parse_ref("Ω: -3%").unwrap().percentage, -3.0);
    }

    #[test]
    fn parse_ref_rejects_malformed_text() {
        for text in ["", "β 1.13%", "β: abc%", "β: 1.13", ": 1.0%", "β: 1.2.3%"] {
            assert_eq!(parse_ref(text), None, "{text:?} should not parse");
        }
    }

    #[test]
    fn transition_target_is_none_without_destination() {
        assert_eq!(transition_target(&ev("a", 0.0, None, None)), None);
        assert_eq!(transition_target(&ev("a", 0.0, None, Some("garbage"))), None);
        assert_eq!(
            transition_target(&ev("a", 0.0, None, Some("β: 1.075432%"))),
            Some(1.075432)
        );
    }

    #[test]
    fn parent_found_through_matching_destination() {
        let events = vec![
            ev("x2020", 18.0, Some("α: 0.000000%"), Some("β: 1.130205%")),
            ev("x2022", 20.0, Some("β: 1.130205%"), Some("α: 0.060502%")),
        ];
        let parent = resolve_parent(&events[1], &events).map(|p| p.id.as_str());
        assert_eq!(parent, Some("x2020"));
        assert!(resolve_parent(&events[0], &events).is_none());
    }

    #[test]
    fn parent_found_by_id_equality_and_containment() {
        let events = vec![
            ev("split", 5.0, None, None),
            ev("child", 9.0, Some("split"), None),
            ev("nested", 12.0, Some("after split: 2.0%"), None),
        ];
        assert_eq!(resolve_parent(&events[1], &events).unwrap().id, "split");
        assert_eq!(resolve_parent(&events[2], &events).unwrap().id, "split");
    }

    #[test]
    fn first_candidate_in_order_wins() {
        let events = vec![
            ev("first", 1.0, None, Some("γ: 2.0%")),
            ev("second", 2.0, None, Some("γ: 2.0%")),
            ev("child", 3.0, Some("γ: 2.0%"), None),
        ];
        assert_eq!(resolve_parent(&events[2], &events).unwrap().id, "first");
    }

    #[test]
    fn event_never_resolves_to_itself() {
        let events = vec![ev("loop", 1.0, Some("γ: 2.0%"), Some("γ: 2.0%"))];
        assert!(resolve_parent(&events[0], &events).is_none());
    }

    #[test]
    fn descendant_chain_follows_links_in_position_order() {
        let events = vec![
            ev("late", 30.0, Some("δ: 4.0%"), None),
            ev("root", 10.0, None, Some("γ: 2.0%")),
            ev("mid", 20.0, Some("γ: 2.0%"), Some("δ: 4.0%")),
            ev("other", 15.0, None, None),
        ];
        let chain: Vec<&str> = descendant_chain(&events[1], &events)
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(chain, vec!["root", "mid", "late"]);
    }
}
