//! Data access: the `DataSource` seam and its implementations.

pub mod cache;
pub mod document;
pub mod file;
pub mod http;
pub mod memory;
pub mod seed;

use thiserror::Error;

use crate::model::{Event, EventPatch, TimelineConfig, Worldline, WorldlinePatch};

#[derive(Debug, Error)]
pub enum DataError {
    #[error("{kind} `{id}` not found")]
    NotFound { kind: &'static str, id: String },
    #[error("missing required fields: {0}")]
    MissingFields(String),
    #[error("data source responded {code}: {message}")]
    Status { code: u16, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type DataResult<T> = Result<T, DataError>;

/// Everything the viewer reads and the admin panel writes.
pub trait DataSource {
    /// Human-readable origin for status lines.
    fn describe(&self) -> String;

    fn list_worldlines(&self) -> DataResult<Vec<Worldline>>;
    /// Events ordered by position, optionally restricted to one scope.
    fn list_events(&self, scope: Option<&str>) -> DataResult<Vec<Event>>;
    fn timeline_config(&self) -> DataResult<Option<TimelineConfig>>;
    /// `false` on any failure; never errors.
    fn health_check(&self) -> bool;

    fn create_worldline(&mut self, worldline: &Worldline) -> DataResult<Worldline>;
    fn update_worldline(&mut self, id: &str, patch: &WorldlinePatch) -> DataResult<Worldline>;
    fn delete_worldline(&mut self, id: &str) -> DataResult<()>;

    fn create_event(&mut self, event: &Event) -> DataResult<Event>;
    fn update_event(&mut self, id: &str, patch: &EventPatch) -> DataResult<Event>;
    fn delete_event(&mut self, id: &str) -> DataResult<()>;
}

/// Reject creates missing any required text field.
pub fn require_fields(fields: &[(&str, &str)]) -> DataResult<()> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DataError::MissingFields(missing.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_fields_lists_every_blank_field() {
        let err = require_fields(&[("id", ""), ("name", "β"), ("color", "  ")]).unwrap_err();
        assert_eq!(err.to_string(), "missing required fields: id, color");
        assert!(require_fields(&[("id", "a")]).is_ok());
    }
}
