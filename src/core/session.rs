//! The owned state container for one viewer session.
//!
//! Created when the viewer starts and dropped when it exits. Input intents,
//! clock ticks and data reloads all go through here; nothing else holds UI
//! state.

use tracing::{debug, info};

use super::meter::{Meter, MeterMode};
use super::navigation::{NavChange, NavInput, Navigator, ViewMode};
use super::sequencer::{RunToken, Sequencer, SequencerEvent};
use super::unlock::{SecretKey, SecretSequence};
use super::viewport::{StripKind, ViewportSync};
use crate::config::Settings;
use crate::data::DataSource;
use crate::data::cache::DataCache;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    Nav(NavInput),
    ZoomIn,
    ZoomOut,
    /// Wheel zoom at a column relative to the active strip.
    ZoomAt { steps: i32, column: f64 },
    /// Animated page pan, -1 or 1.
    Pan(i32),
    /// Immediate horizontal scroll in columns.
    ScrollBy(f64),
    DragStart(f64),
    DragTo(f64),
    DragEnd,
    Cursor(Option<f64>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    pub change: Option<NavChange>,
    pub started: Option<RunToken>,
    /// A drag ended after moving; the release is not a click.
    pub dragged: bool,
}

pub struct Session {
    data: DataCache,
    nav: Navigator,
    sequencer: Sequencer,
    viewport: ViewportSync,
    unlock: SecretSequence,
    meter: Meter,
    admin_visible: bool,
}

impl Session {
    pub fn new(data: DataCache, settings: &Settings) -> Self {
        let initial = initial_value(&data);
        let sequencer = Sequencer::new(settings.transition.clone(), initial);
        Self::with_sequencer(data, settings, sequencer)
    }

    pub fn with_sequencer(data: DataCache, settings: &Settings, sequencer: Sequencer) -> Self {
        Self {
            data,
            nav: Navigator::new(),
            sequencer,
            viewport: ViewportSync::new(settings.viewport.clone()),
            unlock: SecretSequence::default(),
            meter: Meter::default(),
            admin_visible: false,
        }
    }

    pub fn data(&self) -> &DataCache {
        &self.data
    }

    pub fn nav(&self) -> &Navigator {
        &self.nav
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn viewport(&self) -> &ViewportSync {
        &self.viewport
    }

    /// Layout passes write measured strip widths through this.
    pub fn viewport_mut(&mut self) -> &mut ViewportSync {
        &mut self.viewport
    }

    pub fn meter(&self) -> &Meter {
        &self.meter
    }

    /// Next meter mode, or `None` while a shift owns the meter.
    pub fn cycle_meter(&mut self, now_ms: u64) -> Option<MeterMode> {
        if self.sequencer.is_active() {
            return None;
        }
        let mode = self.meter.cycle(now_ms);
        debug!(?mode, "meter mode changed");
        Some(mode)
    }

    /// Type into the custom meter value. False when not accepted.
    pub fn meter_input(&mut self, c: char) -> bool {
        !self.sequencer.is_active() && self.meter.push_custom(c)
    }

    pub fn meter_erase(&mut self) -> bool {
        !self.sequencer.is_active() && self.meter.erase_custom()
    }

    pub fn active_strip(&self) -> StripKind {
        self.nav.view().strip()
    }

    pub fn admin_visible(&self) -> bool {
        self.admin_visible
    }

    pub fn hide_admin(&mut self) {
        self.admin_visible = false;
    }

    /// True while anything animates; the host ticks at frame rate meanwhile.
    pub fn is_animating(&self) -> bool {
        self.sequencer.has_pending() || self.viewport.is_animating()
    }

    /// Track raw keys for the hidden admin sequence. Returns true when the
    /// admin panel visibility flipped.
    pub fn observe_key(&mut self, key: SecretKey) -> bool {
        if self.unlock.feed(key) {
            self.admin_visible = !self.admin_visible;
            info!(visible = self.admin_visible, "admin panel toggled");
            return true;
        }
        false
    }

    pub fn handle(&mut self, intent: Intent, now_ms: u64) -> Outcome {
        let strip = self.active_strip();
        match intent {
            Intent::Nav(input) => return self.navigate(input, now_ms),
            Intent::ZoomIn => {
                self.viewport.zoom_by(strip, 1, None);
            }
            Intent::ZoomOut => {
                self.viewport.zoom_by(strip, -1, None);
            }
            Intent::ZoomAt { steps, column } => {
                self.viewport.set_cursor(Some(column));
                self.viewport.zoom_by(strip, steps, Some(column));
            }
            Intent::Pan(direction) => self.viewport.pan(strip, direction, now_ms),
            Intent::ScrollBy(delta) => self.viewport.scroll_by(strip, delta),
            Intent::DragStart(x) => self.viewport.begin_drag(strip, x),
            Intent::DragTo(x) => {
                self.viewport.drag_to(x);
            }
            Intent::DragEnd => {
                return Outcome {
                    dragged: self.viewport.end_drag(),
                    ..Outcome::default()
                };
            }
            Intent::Cursor(x) => self.viewport.set_cursor(x),
        }
        Outcome::default()
    }

    fn navigate(&mut self, input: NavInput, now_ms: u64) -> Outcome {
        let result = self.nav.apply(input, &self.data, self.sequencer.is_active());
        if let NavChange::Entered(view) = &result.change {
            if *view != ViewMode::Root {
                self.viewport.reset_scroll(view.strip());
            }
            debug!(?view, "view changed");
        }
        let started = result.jump.map(|target| self.sequencer.start(target, now_ms));
        if started.is_some() {
            self.meter.show_divergence();
        }
        Outcome {
            change: Some(result.change),
            started,
            dragged: false,
        }
    }

    /// Advance the clock for the sequencer and scroll animation.
    pub fn tick(&mut self, now_ms: u64) -> Vec<SequencerEvent> {
        self.viewport.tick(now_ms);
        self.sequencer.tick(now_ms)
    }

    /// Re-fetch everything after a mutation or on request.
    pub fn reload(&mut self, source: &dyn DataSource) {
        self.data.refresh(source);
        self.nav.reconcile(&self.data);
    }

    /// End of the session: pending transition work is abandoned.
    pub fn shutdown(&mut self) {
        self.sequencer.cancel();
    }
}

fn initial_value(data: &DataCache) -> f64 {
    data.worldlines.first().map_or(0.0, |w| w.percentage)
}
