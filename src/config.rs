//! `.divergence/config.toml` settings.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::core::sequencer::PhaseTimings;
use crate::core::viewport::{MAX_ZOOM, MIN_ZOOM};
use crate::data::http::DEFAULT_BASE_URL;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source: SourceSettings,
    pub transition: PhaseTimings,
    pub viewport: ViewportSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    File,
    Http,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub kind: SourceKind,
    pub url: String,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            kind: SourceKind::File,
            url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    pub zoom_step: f64,
    /// Share of the viewport width scrolled by Left/Right.
    pub pan_fraction: f64,
    pub drag_multiplier: f64,
    pub scroll_animation_ms: u64,
    /// Plain mouse wheel zooms around the cursor.
    pub wheel_zoom: bool,
}

impl ViewportSettings {
    /// Zoom snaps to tenths, so smaller steps would never move it.
    pub const MIN_ZOOM_STEP: f64 = 0.1;

    fn validate(&self) -> Result<()> {
        let step = self.zoom_step;
        ensure!(
            step.is_finite() && (Self::MIN_ZOOM_STEP..=MAX_ZOOM - MIN_ZOOM).contains(&step),
            "viewport.zoom_step must be between {} and {}, got {step}",
            Self::MIN_ZOOM_STEP,
            MAX_ZOOM - MIN_ZOOM
        );
        Ok(())
    }
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            zoom_step: 0.2,
            pan_fraction: 0.3,
            drag_multiplier: 1.5,
            scroll_animation_ms: 250,
            wheel_zoom: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Read settings from `path`; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::parse(&content).with_context(|| format!("invalid config in {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content)?;
        settings.viewport.validate()?;
        Ok(settings)
    }
}

pub const DEFAULT_CONTENTS: &str = r#"# divergence configuration

[source]
# "file" reads .divergence/timeline.json, "http" talks to the REST API.
kind = "file"
url = "http://localhost:3001/api"

[transition]
flash_ms = 500
reveal_ms = 3000
scramble_ms = 1000
scramble_tick_ms = 50
converge_ms = 1000
converge_tick_ms = 16
shrink_ms = 2000
fade_out_ms = 2000

[viewport]
zoom_step = 0.2
pan_fraction = 0.3
drag_multiplier = 1.5
scroll_animation_ms = 250
wheel_zoom = true

[log]
# Overridden by RUST_LOG when set.
level = "info"
"#;
