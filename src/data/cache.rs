//! In-memory snapshot of the data source, loaded at startup and refreshed
//! after every admin mutation.

use tracing::{info, warn};

use super::{DataResult, DataSource};
use crate::model::{Event, TimelineConfig, Worldline, is_root_scope};

#[derive(Debug, Clone, Default)]
pub struct DataCache {
    /// Ordered by percentage.
    pub worldlines: Vec<Worldline>,
    /// Every scope, ordered by position.
    pub events: Vec<Event>,
    pub timeline: TimelineConfig,
    /// Message from the last failed load, if any.
    pub load_error: Option<String>,
}

impl DataCache {
    /// Load everything from `source`. Failures degrade to an empty cache.
    pub fn load(source: &dyn DataSource) -> Self {
        let mut cache = Self::default();
        cache.refresh(source);
        cache
    }

    /// Re-fetch all lists. Each read degrades on its own: a failed list
    /// becomes empty, a failed config becomes the default, and every
    /// failure message lands in `load_error`.
    pub fn refresh(&mut self, source: &dyn DataSource) {
        if !source.health_check() {
            warn!(source = %source.describe(), "data source unreachable");
            self.clear(format!("data source unreachable: {}", source.describe()));
            return;
        }
        let mut errors = Vec::new();
        self.worldlines = degrade(source.list_worldlines(), "worldlines", &mut errors);
        self.events = degrade(source.list_events(None), "events", &mut errors);
        self.timeline = degrade(source.timeline_config(), "timeline config", &mut errors)
            .unwrap_or_default();
        info!(
            worldlines = self.worldlines.len(),
            events = self.events.len(),
            failures = errors.len(),
            "timeline data loaded"
        );
        self.load_error = (!errors.is_empty()).then(|| errors.join("; "));
    }

    fn clear(&mut self, message: String) {
        self.worldlines.clear();
        self.events.clear();
        self.timeline = TimelineConfig::default();
        self.load_error = Some(message);
    }

    pub fn worldline(&self, id: &str) -> Option<&Worldline> {
        self.worldlines.iter().find(|w| w.id == id)
    }

    pub fn event(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Events in `scope`, in position order.
    pub fn events_in(&self, scope: &str) -> Vec<&Event> {
        self.events.iter().filter(|e| e.scope == scope).collect()
    }

    /// Owned copy of a scope's events, for linkage resolution.
    pub fn scope_events(&self, scope: &str) -> Vec<Event> {
        self.events_in(scope).into_iter().cloned().collect()
    }

    /// Cross-cutting events shown on the root view only.
    pub fn root_events(&self) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| is_root_scope(&e.scope))
            .collect()
    }
}

fn degrade<T: Default>(result: DataResult<T>, what: &str, errors: &mut Vec<String>) -> T {
    result.unwrap_or_else(|err| {
        warn!(error = %err, "failed to load {what}");
        errors.push(format!("{what}: {err}"));
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::http::HttpSource;
    use crate::data::memory::MemoryStore;
    use crate::data::{DataError, DataSource, seed};
    use crate::model::{EventPatch, WorldlinePatch};

    /// Seeded store whose chosen reads answer with a server error.
    struct Flaky {
        inner: MemoryStore,
        fail_events: bool,
        fail_config: bool,
    }

    fn server_error(what: &str) -> DataError {
        DataError::Status {
            code: 500,
            message: format!("{what} table missing"),
        }
    }

    impl DataSource for Flaky {
        fn describe(&self) -> String {
            "flaky".into()
        }
        fn list_worldlines(&self) -> DataResult<Vec<Worldline>> {
            self.inner.list_worldlines()
        }
        fn list_events(&self, scope: Option<&str>) -> DataResult<Vec<Event>> {
            if self.fail_events {
                return Err(server_error("events"));
            }
            self.inner.list_events(scope)
        }
        fn timeline_config(&self) -> DataResult<Option<TimelineConfig>> {
            if self.fail_config {
                return Err(server_error("config"));
            }
            self.inner.timeline_config()
        }
        fn health_check(&self) -> bool {
            true
        }
        fn create_worldline(&mut self, worldline: &Worldline) -> DataResult<Worldline> {
            self.inner.create_worldline(worldline)
        }
        fn update_worldline(&mut self, id: &str, patch: &WorldlinePatch) -> DataResult<Worldline> {
            self.inner.update_worldline(id, patch)
        }
        fn delete_worldline(&mut self, id: &str) -> DataResult<()> {
            self.inner.delete_worldline(id)
        }
        fn create_event(&mut self, event: &Event) -> DataResult<Event> {
            self.inner.create_event(event)
        }
        fn update_event(&mut self, id: &str, patch: &EventPatch) -> DataResult<Event> {
            self.inner.update_event(id, patch)
        }
        fn delete_event(&mut self, id: &str) -> DataResult<()> {
            self.inner.delete_event(id)
        }
    }

    #[test]
    fn load_reads_every_list() {
        let cache = DataCache::load(&MemoryStore::seeded());
        assert_eq!(cache.worldlines.len(), 4);
        assert_eq!(cache.events.len(), 3);
        assert_eq!(cache.timeline.start_year, 2002);
        assert!(cache.load_error.is_none());
        assert_eq!(cache.events_in("beta").len(), 2);
        assert!(cache.root_events().is_empty());
    }

    #[test]
    fn unreachable_source_degrades_to_empty() {
        let cache = DataCache::load(&HttpSource::new("http://127.0.0.1:9/api"));
        assert!(cache.worldlines.is_empty());
        assert!(cache.events.is_empty());
        assert_eq!(cache.timeline, TimelineConfig::default());
        assert!(
            cache.load_error.as_deref().unwrap().contains("unreachable"),
            "load error should explain the failure"
        );
    }

    #[test]
    fn missing_timeline_falls_back_to_default() {
        let mut doc = seed::document();
        doc.timeline = None;
        let cache = DataCache::load(&MemoryStore::new(doc));
        assert_eq!(cache.timeline, TimelineConfig::default());
    }

    #[test]
    fn refresh_picks_up_mutations() {
        let mut store = MemoryStore::seeded();
        let mut cache = DataCache::load(&store);
        store
            .update_worldline(
                "alpha",
                &WorldlinePatch {
                    percentage: Some(9.0),
                    ..WorldlinePatch::default()
                },
            )
            .unwrap();
        assert_eq!(cache.worldline("alpha").unwrap().percentage, 0.0);
        cache.refresh(&store);
        assert_eq!(cache.worldline("alpha").unwrap().percentage, 9.0);
        assert_eq!(cache.worldlines.last().unwrap().id, "alpha");
    }

    #[test]
    fn failed_config_keeps_the_lists() {
        let source = Flaky {
            inner: MemoryStore::seeded(),
            fail_events: false,
            fail_config: true,
        };
        let cache = DataCache::load(&source);
        assert_eq!(cache.worldlines.len(), 4);
        assert_eq!(cache.events.len(), 3);
        assert_eq!(cache.timeline, TimelineConfig::default());
        assert_eq!(
            cache.load_error.as_deref(),
            Some("timeline config: data source responded 500: config table missing")
        );
    }

    #[test]
    fn failed_events_keep_the_worldlines() {
        let source = Flaky {
            inner: MemoryStore::seeded(),
            fail_events: true,
            fail_config: true,
        };
        let cache = DataCache::load(&source);
        assert_eq!(cache.worldlines.len(), 4);
        assert!(cache.events.is_empty());
        let err = cache.load_error.unwrap();
        assert!(err.starts_with("events: "));
        assert!(err.contains("; timeline config: "));
    }

    #[test]
    fn successful_refresh_clears_the_error() {
        let mut source = Flaky {
            inner: MemoryStore::seeded(),
            fail_events: true,
            fail_config: false,
        };
        let mut cache = DataCache::load(&source);
        assert!(cache.load_error.is_some());
        source.fail_events = false;
        cache.refresh(&source);
        assert!(cache.load_error.is_none());
        assert_eq!(cache.events.len(), 3);
    }

    #[test]
    fn cross_attractor_events_sit_on_the_root_axis() {
        let mut doc = seed::document();
        for (id, scope) in [("steiner", "crossAttractor"), ("legacy", "root")] {
            doc.events.push(Event {
                id: id.into(),
                date: "2010".into(),
                title: id.into(),
                position: 8.0,
                from_worldline: None,
                to_worldline: None,
                lore: None,
                kind: None,
                scope: scope.into(),
            });
        }
        let cache = DataCache::load(&MemoryStore::new(doc));
        let ids: Vec<&str> = cache.root_events().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["steiner", "legacy"]);
        assert!(cache.events_in("alpha").iter().all(|e| e.id != "steiner"));
    }
}
