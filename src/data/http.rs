//! Blocking client for the worldlines REST API.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{DataError, DataResult, DataSource};
use crate::model::{Event, EventPatch, TimelineConfig, Worldline, WorldlinePatch};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001/api";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub struct HttpSource {
    base_url: String,
    client: Client,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn send(&self, request: RequestBuilder) -> DataResult<Response> {
        let response = request.send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|b| b.error)
            .unwrap_or(text);
        warn!(code = status.as_u16(), %message, "data source request failed");
        Err(DataError::Status {
            code: status.as_u16(),
            message,
        })
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> DataResult<T> {
        let url = self.url(path);
        debug!(%url, "GET");
        Ok(self.send(self.client.get(&url).query(query))?.json()?)
    }
}

impl DataSource for HttpSource {
    fn describe(&self) -> String {
        self.base_url.clone()
    }

    fn list_worldlines(&self) -> DataResult<Vec<Worldline>> {
        self.get("temporal-fields", &[])
    }

    fn list_events(&self, scope: Option<&str>) -> DataResult<Vec<Event>> {
        match scope {
            Some(scope) => self.get("temporal-events", &[("scope", scope)]),
            None => self.get("temporal-events", &[]),
        }
    }

    fn timeline_config(&self) -> DataResult<Option<TimelineConfig>> {
        self.get("temporal-config", &[])
    }

    fn health_check(&self) -> bool {
        match self.send(self.client.get(self.url("status"))) {
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, "health check failed");
                false
            }
        }
    }

    fn create_worldline(&mut self, worldline: &Worldline) -> DataResult<Worldline> {
        let request = self.client.post(self.url("temporal-fields")).json(worldline);
        Ok(self.send(request)?.json()?)
    }

    fn update_worldline(&mut self, id: &str, patch: &WorldlinePatch) -> DataResult<Worldline> {
        let request = self
            .client
            .put(self.url(&format!("temporal-fields/{id}")))
            .json(patch);
        Ok(self.send(request)?.json()?)
    }

    fn delete_worldline(&mut self, id: &str) -> DataResult<()> {
        self.send(self.client.delete(self.url(&format!("temporal-fields/{id}"))))?;
        Ok(())
    }

    fn create_event(&mut self, event: &Event) -> DataResult<Event> {
        let request = self.client.post(self.url("temporal-events")).json(event);
        Ok(self.send(request)?.json()?)
    }

    fn update_event(&mut self, id: &str, patch: &EventPatch) -> DataResult<Event> {
        let request = self
            .client
            .put(self.url(&format!("temporal-events/{id}")))
            .json(patch);
        Ok(self.send(request)?.json()?)
    }

    fn delete_event(&mut self, id: &str) -> DataResult<()> {
        self.send(self.client.delete(self.url(&format!("temporal-events/{id}"))))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slashes() {
        let source = HttpSource::new("http://localhost:3001/api/");
        assert_eq!(
            source.url("/temporal-fields"),
            "http://localhost:3001/api/temporal-fields"
        );
        assert_eq!(source.describe(), "http://localhost:3001/api");
    }

    #[test]
    fn health_check_is_false_when_unreachable() {
        let source = HttpSource::new("http://127.0.0.1:9/api");
        assert!(!source.health_check());
    }

    #[test]
    fn unreachable_reads_surface_http_errors() {
        let source = HttpSource::new("http://127.0.0.1:9/api");
        assert!(matches!(source.list_worldlines(), Err(DataError::Http(_))));
    }
}
