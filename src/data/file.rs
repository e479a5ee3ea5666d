//! JSON file store under `.divergence/timeline.json`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::document::TimelineDocument;
use super::{DataResult, DataSource};
use crate::model::{Event, EventPatch, TimelineConfig, Worldline, WorldlinePatch};

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `doc` as a fresh store file.
    pub fn create(path: impl Into<PathBuf>, doc: &TimelineDocument) -> DataResult<Self> {
        let store = Self::new(path);
        store.write(doc)?;
        Ok(store)
    }

    fn read(&self) -> DataResult<TimelineDocument> {
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write(&self, doc: &TimelineDocument) -> DataResult<()> {
        let mut content = serde_json::to_string_pretty(doc)?;
        content.push('\n');
        fs::write(&self.path, content)?;
        debug!(path = %self.path.display(), "timeline document written");
        Ok(())
    }

    fn mutate<T>(
        &mut self,
        op: impl FnOnce(&mut TimelineDocument) -> DataResult<T>,
    ) -> DataResult<T> {
        let mut doc = self.read()?;
        let out = op(&mut doc)?;
        self.write(&doc)?;
        Ok(out)
    }
}

impl DataSource for FileStore {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn list_worldlines(&self) -> DataResult<Vec<Worldline>> {
        Ok(self.read()?.worldlines_sorted())
    }

    fn list_events(&self, scope: Option<&str>) -> DataResult<Vec<Event>> {
        Ok(self.read()?.events_sorted(scope))
    }

    fn timeline_config(&self) -> DataResult<Option<TimelineConfig>> {
        Ok(self.read()?.timeline)
    }

    fn health_check(&self) -> bool {
        self.read().is_ok()
    }

    fn create_worldline(&mut self, worldline: &Worldline) -> DataResult<Worldline> {
        self.mutate(|doc| doc.put_worldline(worldline))
    }

    fn update_worldline(&mut self, id: &str, patch: &WorldlinePatch) -> DataResult<Worldline> {
        self.mutate(|doc| doc.patch_worldline(id, patch))
    }

    fn delete_worldline(&mut self, id: &str) -> DataResult<()> {
        self.mutate(|doc| doc.remove_worldline(id))
    }

    fn create_event(&mut self, event: &Event) -> DataResult<Event> {
        self.mutate(|doc| doc.put_event(event))
    }

    fn update_event(&mut self, id: &str, patch: &EventPatch) -> DataResult<Event> {
        self.mutate(|doc| doc.patch_event(id, patch))
    }

    fn delete_event(&mut self, id: &str) -> DataResult<()> {
        self.mutate(|doc| doc.remove_event(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataError, seed};
    use tempfile::TempDir;

    fn seeded_store(dir: &TempDir) -> FileStore {
        FileStore::create(dir.path().join("timeline.json"), &seed::document()).unwrap()
    }

    #[test]
    fn reads_back_seeded_document() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);
        assert!(store.health_check());
        assert_eq!(store.list_worldlines().unwrap().len(), 4);
        assert_eq!(store.list_events(Some("alpha")).unwrap().len(), 1);
        assert_eq!(
            store.timeline_config().unwrap(),
            Some(TimelineConfig::default())
        );
    }

    #[test]
    fn health_check_false_for_missing_or_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let missing = FileStore::new(dir.path().join("absent.json"));
        assert!(!missing.health_check());

        let corrupt_path = dir.path().join("corrupt.json");
        fs::write(&corrupt_path, "{ not json").unwrap();
        let corrupt = FileStore::new(&corrupt_path);
        assert!(!corrupt.health_check());
        assert!(matches!(corrupt.list_worldlines(), Err(DataError::Json(_))));
    }

    #[test]
    fn mutations_persist_to_disk() {
        let dir = TempDir::new().unwrap();
        let mut store = seeded_store(&dir);
        store
            .update_worldline(
                "gamma",
                &WorldlinePatch {
                    percentage: Some(9.5),
                    ..WorldlinePatch::default()
                },
            )
            .unwrap();
        store.delete_event("may2025").unwrap();

        let reopened = FileStore::new(store.path());
        let gamma = reopened
            .list_worldlines()
            .unwrap()
            .into_iter()
            .find(|w| w.id == "gamma")
            .unwrap();
        assert_eq!(gamma.percentage, 9.5);
        assert_eq!(reopened.list_events(None).unwrap().len(), 2);
    }

    #[test]
    fn failed_mutation_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let mut store = seeded_store(&dir);
        let before = fs::read_to_string(store.path()).unwrap();
        assert!(store.delete_worldline("omega").is_err());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    }
}
