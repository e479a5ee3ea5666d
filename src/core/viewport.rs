//! Zoom and horizontal scroll for the three timeline strips.
//!
//! A zoom request records where the cursor sits as a fraction of the
//! content width. The new content width is only known once the next draw
//! lays the strip out, so the anchor is resolved in [`ViewportSync::on_layout`].

use tracing::trace;

use crate::config::ViewportSettings;

pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StripKind {
    Root,
    Branch,
    Individual,
}

impl StripKind {
    fn index(self) -> usize {
        match self {
            StripKind::Root => 0,
            StripKind::Branch => 1,
            StripKind::Individual => 2,
        }
    }
}

/// Scroll geometry of one strip, in terminal columns.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Strip {
    pub scroll: f64,
    pub content_width: f64,
    pub viewport_width: f64,
}

impl Strip {
    pub fn max_scroll(&self) -> f64 {
        (self.content_width - self.viewport_width).max(0.0)
    }

    fn clamp(&self, scroll: f64) -> f64 {
        if scroll.is_finite() {
            scroll.clamp(0.0, self.max_scroll())
        } else {
            0.0
        }
    }
}

/// Content width as a percentage of the viewport for `zoom`.
pub fn content_width_percent(zoom: f64) -> f64 {
    if zoom < 3.0 {
        zoom * 100.0
    } else if zoom < 4.0 {
        zoom * 250.0
    } else {
        zoom * 1500.0
    }
}

/// Clamp to the zoom range, rounded to one decimal.
pub fn clamp_zoom(zoom: f64) -> f64 {
    ((zoom * 10.0).round() / 10.0).clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Scroll offset that keeps the content under `cursor_x` fixed.
pub fn anchored_scroll(anchor_ratio: f64, new_width: f64, cursor_x: f64, viewport_width: f64) -> f64 {
    let max = (new_width - viewport_width).max(0.0);
    let scroll = anchor_ratio * new_width - cursor_x;
    if scroll.is_finite() {
        scroll.clamp(0.0, max)
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingAnchor {
    strip: StripKind,
    ratio: f64,
    cursor_x: f64,
}

#[derive(Debug, Clone, Copy)]
struct ScrollAnimation {
    strip: StripKind,
    from: f64,
    to: f64,
    start_ms: u64,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    strip: StripKind,
    origin_x: f64,
    origin_scroll: f64,
    moved: bool,
}

#[derive(Debug, Clone)]
pub struct ViewportSync {
    zoom: f64,
    settings: ViewportSettings,
    strips: [Strip; 3],
    pending: Option<PendingAnchor>,
    animation: Option<ScrollAnimation>,
    drag: Option<Drag>,
    /// Last known mouse column, relative to the strip's left edge.
    cursor: Option<f64>,
}

impl ViewportSync {
    pub fn new(settings: ViewportSettings) -> Self {
        Self {
            zoom: MIN_ZOOM,
            settings,
            strips: [Strip::default(); 3],
            pending: None,
            animation: None,
            drag: None,
            cursor: None,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn settings(&self) -> &ViewportSettings {
        &self.settings
    }

    pub fn strip(&self, kind: StripKind) -> &Strip {
        &self.strips[kind.index()]
    }

    fn strip_mut(&mut self, kind: StripKind) -> &mut Strip {
        &mut self.strips[kind.index()]
    }

    pub fn has_pending_anchor(&self) -> bool {
        self.pending.is_some()
    }

    pub fn set_cursor(&mut self, x: Option<f64>) {
        self.cursor = x;
    }

    /// Step the zoom by `steps` increments, anchored at `cursor_x` (or the
    /// last known cursor, or the strip center). Returns true if it changed.
    pub fn zoom_by(&mut self, kind: StripKind, steps: i32, cursor_x: Option<f64>) -> bool {
        let next = clamp_zoom(self.zoom + self.settings.zoom_step * steps as f64);
        if next == self.zoom {
            return false;
        }
        let strip = *self.strip(kind);
        let cursor_x = cursor_x
            .or(self.cursor)
            .unwrap_or(strip.viewport_width / 2.0)
            .clamp(0.0, strip.viewport_width.max(0.0));
        let ratio = if strip.content_width > 0.0 {
            (strip.scroll + cursor_x) / strip.content_width
        } else {
            0.0
        };
        trace!(from = self.zoom, to = next, ratio, "zoom requested");
        self.zoom = next;
        self.animation = None;
        self.pending = Some(PendingAnchor {
            strip: kind,
            ratio,
            cursor_x,
        });
        true
    }

    /// Layout pass for `kind`: record the measured width, recompute the
    /// content width for the current zoom, and resolve any pending anchor.
    pub fn on_layout(&mut self, kind: StripKind, viewport_width: f64) -> Strip {
        let zoom = self.zoom;
        let pending = self.pending.filter(|p| p.strip == kind);
        if pending.is_some() {
            self.pending = None;
        }
        let strip = self.strip_mut(kind);
        strip.viewport_width = viewport_width.max(0.0);
        strip.content_width = strip.viewport_width * content_width_percent(zoom) / 100.0;
        strip.scroll = match pending {
            Some(anchor) => anchored_scroll(
                anchor.ratio,
                strip.content_width,
                anchor.cursor_x,
                strip.viewport_width,
            ),
            None => strip.clamp(strip.scroll),
        };
        *strip
    }

    /// Jump a strip back to the start of the timeline.
    pub fn reset_scroll(&mut self, kind: StripKind) {
        self.strip_mut(kind).scroll = 0.0;
        if self.animation.is_some_and(|a| a.strip == kind) {
            self.animation = None;
        }
    }

    /// Immediate horizontal scroll by `delta` columns.
    pub fn scroll_by(&mut self, kind: StripKind, delta: f64) {
        self.animation = None;
        let strip = self.strip_mut(kind);
        strip.scroll = strip.clamp(strip.scroll + delta);
    }

    /// Start an animated pan of one page fraction in `direction` (-1 or 1).
    pub fn pan(&mut self, kind: StripKind, direction: i32, now_ms: u64) {
        let strip = *self.strip(kind);
        let base = match self.animation {
            Some(a) if a.strip == kind => a.to,
            _ => strip.scroll,
        };
        let to = strip.clamp(base + direction as f64 * strip.viewport_width * self.settings.pan_fraction);
        if to == strip.scroll {
            self.animation = None;
            return;
        }
        self.animation = Some(ScrollAnimation {
            strip: kind,
            from: strip.scroll,
            to,
            start_ms: now_ms,
        });
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Advance the pan animation.
    pub fn tick(&mut self, now_ms: u64) {
        let Some(anim) = self.animation else {
            return;
        };
        let duration = self.settings.scroll_animation_ms;
        let t = if duration == 0 {
            1.0
        } else {
            (now_ms.saturating_sub(anim.start_ms) as f64 / duration as f64).min(1.0)
        };
        let eased = 1.0 - (1.0 - t).powi(2);
        let strip = self.strip_mut(anim.strip);
        strip.scroll = strip.clamp(anim.from + (anim.to - anim.from) * eased);
        if t >= 1.0 {
            self.animation = None;
        }
    }

    pub fn begin_drag(&mut self, kind: StripKind, x: f64) {
        self.animation = None;
        self.drag = Some(Drag {
            strip: kind,
            origin_x: x,
            origin_scroll: self.strip(kind).scroll,
            moved: false,
        });
    }

    /// Pan to follow the pointer. Returns true once the pointer has moved.
    pub fn drag_to(&mut self, x: f64) -> bool {
        let Some(mut drag) = self.drag else {
            return false;
        };
        let dx = x - drag.origin_x;
        if dx.abs() >= 1.0 {
            drag.moved = true;
        }
        let multiplier = self.settings.drag_multiplier;
        let strip = self.strip_mut(drag.strip);
        strip.scroll = strip.clamp(drag.origin_scroll - dx * multiplier);
        self.drag = Some(drag);
        drag.moved
    }

    /// Finish a drag. Returns true if it moved (so it was not a click).
    pub fn end_drag(&mut self) -> bool {
        self.drag.take().is_some_and(|d| d.moved)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }
}
