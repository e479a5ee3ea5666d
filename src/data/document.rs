//! The in-memory timeline document shared by the file and memory stores.

use serde::{Deserialize, Serialize};

use super::{DataError, DataResult, require_fields};
use crate::model::{Event, EventPatch, TimelineConfig, Worldline, WorldlinePatch};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineDocument {
    #[serde(default)]
    pub worldlines: Vec<Worldline>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<TimelineConfig>,
}

impl TimelineDocument {
    pub fn worldlines_sorted(&self) -> Vec<Worldline> {
        let mut out = self.worldlines.clone();
        out.sort_by(|a, b| a.percentage.total_cmp(&b.percentage));
        out
    }

    pub fn events_sorted(&self, scope: Option<&str>) -> Vec<Event> {
        let mut out: Vec<Event> = self
            .events
            .iter()
            .filter(|e| scope.is_none_or(|s| e.scope == s))
            .cloned()
            .collect();
        out.sort_by(|a, b| a.position.total_cmp(&b.position));
        out
    }

    /// Insert or replace by id.
    pub fn put_worldline(&mut self, worldline: &Worldline) -> DataResult<Worldline> {
        require_fields(&[
            ("id", &worldline.id),
            ("name", &worldline.name),
            ("color", &worldline.color),
        ])?;
        match self.worldlines.iter_mut().find(|w| w.id == worldline.id) {
            Some(existing) => *existing = worldline.clone(),
            None => self.worldlines.push(worldline.clone()),
        }
        Ok(worldline.clone())
    }

    pub fn patch_worldline(&mut self, id: &str, patch: &WorldlinePatch) -> DataResult<Worldline> {
        let wl = self
            .worldlines
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| not_found("worldline", id))?;
        patch.apply(wl);
        Ok(wl.clone())
    }

    pub fn remove_worldline(&mut self, id: &str) -> DataResult<()> {
        let before = self.worldlines.len();
        self.worldlines.retain(|w| w.id != id);
        if self.worldlines.len() == before {
            return Err(not_found("worldline", id));
        }
        Ok(())
    }

    pub fn put_event(&mut self, event: &Event) -> DataResult<Event> {
        require_fields(&[
            ("id", &event.id),
            ("date", &event.date),
            ("title", &event.title),
            ("scope", &event.scope),
        ])?;
        match self.events.iter_mut().find(|e| e.id == event.id) {
            Some(existing) => *existing = event.clone(),
            None => self.events.push(event.clone()),
        }
        Ok(event.clone())
    }

    pub fn patch_event(&mut self, id: &str, patch: &EventPatch) -> DataResult<Event> {
        let ev = self
            .events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| not_found("event", id))?;
        patch.apply(ev);
        Ok(ev.clone())
    }

    pub fn remove_event(&mut self, id: &str) -> DataResult<()> {
        let before = self.events.len();
        self.events.retain(|e| e.id != id);
        if self.events.len() == before {
            return Err(not_found("event", id));
        }
        Ok(())
    }
}

fn not_found(kind: &'static str, id: &str) -> DataError {
    DataError::NotFound {
        kind,
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::seed;

    #[test]
    fn worldlines_listed_by_percentage() {
        let mut doc = seed::document();
        doc.worldlines.reverse();
        let ids: Vec<String> = doc.worldlines_sorted().into_iter().map(|w| w.id).collect();
        assert_eq!(ids, vec!["alpha", "beta", "gamma", "delta"]);
    }

    #[test]
    fn events_filtered_by_scope_and_ordered() {
        let doc = seed::document();
        let beta: Vec<String> = doc
            .events_sorted(Some("beta"))
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(beta, vec!["april2020", "may2025"]);
        assert_eq!(doc.events_sorted(None).len(), doc.events.len());
    }

    #[test]
    fn put_worldline_replaces_existing_id() {
        let mut doc = seed::document();
        let mut alpha = doc.worldlines[0].clone();
        alpha.name = "A".into();
        doc.put_worldline(&alpha).unwrap();
        assert_eq!(doc.worldlines.len(), 4);
        assert_eq!(doc.worldlines[0].name, "A");
    }

    #[test]
    fn put_event_requires_fields() {
        let mut doc = TimelineDocument::default();
        let mut ev = seed::document().events[0].clone();
        ev.title.clear();
        assert!(matches!(
            doc.put_event(&ev),
            Err(DataError::MissingFields(f)) if f == "title"
        ));
        assert!(doc.events.is_empty());
    }

    #[test]
    fn patch_and_remove_unknown_ids_are_not_found() {
        let mut doc = seed::document();
        assert!(matches!(
            doc.patch_event("nope", &EventPatch::default()),
            Err(DataError::NotFound { kind: "event", .. })
        ));
        assert!(doc.remove_worldline("nope").is_err());
        doc.remove_worldline("gamma").unwrap();
        assert_eq!(doc.worldlines.len(), 3);
    }
}
