//! Initial data written by `divergence init` and served in demo mode.

use super::document::TimelineDocument;
use crate::model::{Event, TimelineConfig, Worldline};

const WORLDLINES: &[(&str, &str, f64, &str)] = &[
    ("alpha", "α", 0.000000, "rgba(255, 102, 0, 0.8)"),
    ("beta", "β", 1.130205, "rgba(136, 255, 136, 0.8)"),
    ("gamma", "γ", 2.615074, "rgba(255, 68, 68, 0.8)"),
    ("delta", "δ", 4.091842, "rgba(68, 170, 255, 0.8)"),
];

pub fn worldlines() -> Vec<Worldline> {
    WORLDLINES
        .iter()
        .map(|&(id, name, percentage, color)| Worldline {
            id: id.into(),
            name: name.into(),
            percentage,
            color: color.into(),
        })
        .collect()
}

pub fn events() -> Vec<Event> {
    vec![
        Event {
            id: "december2022".into(),
            date: "December 2022".into(),
            title: "Beta-Alpha Worldline Regression".into(),
            position: 20.92,
            from_worldline: Some("β: 1.130205%".into()),
            to_worldline: Some("α: 0.060502%".into()),
            lore: Some(DECEMBER_2022.into()),
            kind: Some("regression".into()),
            scope: "alpha".into(),
        },
        Event {
            id: "april2020".into(),
            date: "April 2020".into(),
            title: "Alpha-Beta Worldline Convergence".into(),
            position: 18.33,
            from_worldline: Some("α: 0.000000%".into()),
            to_worldline: Some("β: 1.040402%".into()),
            lore: Some(APRIL_2020.into()),
            kind: Some("convergence".into()),
            scope: "beta".into(),
        },
        Event {
            id: "may2025".into(),
            date: "May 2025".into(),
            title: "Internship Beginning".into(),
            position: 23.42,
            from_worldline: None,
            to_worldline: Some("β: 1.075432%".into()),
            lore: Some(MAY_2025.into()),
            kind: Some("career".into()),
            scope: "beta".into(),
        },
    ]
}

pub fn document() -> TimelineDocument {
    TimelineDocument {
        worldlines: worldlines(),
        events: events(),
        timeline: Some(TimelineConfig::default()),
    }
}

// ---------------------------------------------------------------------------
// Lore
// ---------------------------------------------------------------------------

const DECEMBER_2022: &str = "\
[LOG - CLASSIFICATION: TEMPORAL CATASTROPHE]
[DATE: December 2022 - Regression Point Confirmed]

A warning arrived three seconds before the message was sent. It was ignored.

The attractor field collapsed the moment the read receipt appeared. The meter
spiralled back to 0.060502%, into the Alpha field.

[END LOG]";

const APRIL_2020: &str = "\
[LOG - CLASSIFICATION: TEMPORAL ANOMALY]
[DATE: April 2020 - Convergence Point Identified]

Four in the morning, a long call, and a sentence years in the making.

The answer was yes. The meter climbed past one percent and the Beta
attractor field took hold.

[END LOG]";

const MAY_2025: &str = "\
[LOG - CLASSIFICATION: TEMPORAL SHIFT]
[DATE: May 2025 - Career Convergence Point]

First day on a new campus. Every late night of study converged into a
single door.

[STATUS: Timeline stability increasing. Convergence at 1.075432% and holding.]

[END LOG]";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_worldline_ids_are_unique() {
        let wls = worldlines();
        for (i, a) in wls.iter().enumerate() {
            assert!(
                wls.iter().skip(i + 1).all(|b| b.id != a.id),
                "duplicate worldline id {}",
                a.id
            );
        }
    }

    #[test]
    fn seed_timeline_spans_a_century() {
        let doc = document();
        assert_eq!(doc.timeline.unwrap().span(), 100);
    }
}
