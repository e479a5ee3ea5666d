use serde::{Deserialize, Serialize};

/// Scope name for cross-cutting events shown only on the root view.
pub const ROOT_SCOPE: &str = "crossAttractor";
/// Older stores name the cross-cutting bucket this way.
const ROOT_SCOPE_ALIAS: &str = "root";

pub fn is_root_scope(scope: &str) -> bool {
    scope == ROOT_SCOPE || scope == ROOT_SCOPE_ALIAS
}

pub const DEFAULT_START_YEAR: i32 = 2002;
pub const DEFAULT_END_YEAR: i32 = 2102;

/// A named branch of the timeline with its divergence percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worldline {
    pub id: String,
    pub name: String,
    /// Unbounded; negatives and values above 100 are displayed as-is.
    pub percentage: f64,
    /// `rgba(r, g, b, a)` text.
    pub color: String,
}

/// A narrative event anchored to a position on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    /// Free-form display date.
    pub date: String,
    pub title: String,
    /// 0–100 percent of the configured year span. Not clamped.
    pub position: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_worldline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_worldline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lore: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub scope: String,
}

impl Event {
    pub fn from_text(&self) -> Option<&str> {
        non_empty(self.from_worldline.as_deref())
    }

    pub fn to_text(&self) -> Option<&str> {
        non_empty(self.to_worldline.as_deref())
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineConfig {
    pub start_year: i32,
    pub end_year: i32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            start_year: DEFAULT_START_YEAR,
            end_year: DEFAULT_END_YEAR,
        }
    }
}

impl TimelineConfig {
    /// Number of years covered, never zero.
    pub fn span(&self) -> i32 {
        (self.end_year - self.start_year).max(1)
    }

    /// Fractional year for an event position.
    pub fn year_at(&self, position: f64) -> f64 {
        self.start_year as f64 + position / 100.0 * self.span() as f64
    }
}

/// Partial worldline update. Omitted fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldlinePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl WorldlinePatch {
    pub fn apply(&self, wl: &mut Worldline) {
        if let Some(name) = &self.name {
            wl.name = name.clone();
        }
        if let Some(pct) = self.percentage {
            wl.percentage = pct;
        }
        if let Some(color) = &self.color {
            wl.color = color.clone();
        }
    }
}

/// Partial event update.
///
/// For the optional text fields, `Some(String::new())` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_worldline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_worldline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lore: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl EventPatch {
    pub fn apply(&self, ev: &mut Event) {
        if let Some(date) = &self.date {
            ev.date = date.clone();
        }
        if let Some(title) = &self.title {
            ev.title = title.clone();
        }
        if let Some(position) = self.position {
            ev.position = position;
        }
        if let Some(scope) = &self.scope {
            ev.scope = scope.clone();
        }
        merge_optional(&mut ev.from_worldline, &self.from_worldline);
        merge_optional(&mut ev.to_worldline, &self.to_worldline);
        merge_optional(&mut ev.lore, &self.lore);
        merge_optional(&mut ev.kind, &self.kind);
    }
}

fn merge_optional(slot: &mut Option<String>, patch: &Option<String>) {
    match patch.as_deref() {
        None => {}
        Some("") => *slot = None,
        Some(v) => *slot = Some(v.to_string()),
    }
}
