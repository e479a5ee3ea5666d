use super::document::TimelineDocument;
use super::{DataResult, DataSource, seed};
use crate::model::{Event, EventPatch, TimelineConfig, Worldline, WorldlinePatch};

/// Volatile store backing demo mode.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    doc: TimelineDocument,
}

impl MemoryStore {
    pub fn new(doc: TimelineDocument) -> Self {
        Self { doc }
    }

    pub fn seeded() -> Self {
        Self::new(seed::document())
    }
}

impl DataSource for MemoryStore {
    fn describe(&self) -> String {
        "demo data (in memory)".to_string()
    }

    fn list_worldlines(&self) -> DataResult<Vec<Worldline>> {
        Ok(self.doc.worldlines_sorted())
    }

    fn list_events(&self, scope: Option<&str>) -> DataResult<Vec<Event>> {
        Ok(self.doc.events_sorted(scope))
    }

    fn timeline_config(&self) -> DataResult<Option<TimelineConfig>> {
        Ok(self.doc.timeline)
    }

    fn health_check(&self) -> bool {
        true
    }

    fn create_worldline(&mut self, worldline: &Worldline) -> DataResult<Worldline> {
        self.doc.put_worldline(worldline)
    }

    fn update_worldline(&mut self, id: &str, patch: &WorldlinePatch) -> DataResult<Worldline> {
        self.doc.patch_worldline(id, patch)
    }

    fn delete_worldline(&mut self, id: &str) -> DataResult<()> {
        self.doc.remove_worldline(id)
    }

    fn create_event(&mut self, event: &Event) -> DataResult<Event> {
        self.doc.put_event(event)
    }

    fn update_event(&mut self, id: &str, patch: &EventPatch) -> DataResult<Event> {
        self.doc.patch_event(id, patch)
    }

    fn delete_event(&mut self, id: &str) -> DataResult<()> {
        self.doc.remove_event(id)
    }
}
