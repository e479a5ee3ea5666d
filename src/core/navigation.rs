//! Root → Branch → Individual view state and per-view selection.

use tracing::debug;

use super::viewport::StripKind;
use crate::data::cache::DataCache;
use crate::model::linkage::{descendant_chain, transition_target};
use crate::model::{Event, Worldline};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewMode {
    Root,
    Branch { worldline: String },
    /// One event and its descendants on a single line.
    Individual { worldline: String, event: String },
}

impl ViewMode {
    pub fn strip(&self) -> StripKind {
        match self {
            ViewMode::Root => StripKind::Root,
            ViewMode::Branch { .. } => StripKind::Branch,
            ViewMode::Individual { .. } => StripKind::Individual,
        }
    }

    pub fn worldline(&self) -> Option<&str> {
        match self {
            ViewMode::Root => None,
            ViewMode::Branch { worldline } | ViewMode::Individual { worldline, .. } => {
                Some(worldline)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavInput {
    Up,
    Down,
    /// Enter on the highlighted item.
    Activate,
    /// Direct click on the item at this index.
    Select(usize),
    Back,
    Escape,
    Drill,
}

impl NavInput {
    /// Inputs that may start a transition or change the view forward.
    pub fn is_navigation_trigger(self) -> bool {
        matches!(self, NavInput::Activate | NavInput::Select(_) | NavInput::Drill)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NavChange {
    None,
    /// Blocked while a transition runs.
    Rejected,
    Moved,
    Entered(ViewMode),
    ModalOpened(String),
    ModalClosed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavResult {
    pub change: NavChange,
    /// Divergence value to transition to.
    pub jump: Option<f64>,
}

impl NavResult {
    fn of(change: NavChange) -> Self {
        Self { change, jump: None }
    }
}

#[derive(Debug, Clone)]
pub struct Navigator {
    view: ViewMode,
    root_index: usize,
    branch_index: usize,
    individual_index: usize,
    modal: Option<String>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            view: ViewMode::Root,
            root_index: 0,
            branch_index: 0,
            individual_index: 0,
            modal: None,
        }
    }

    pub fn view(&self) -> &ViewMode {
        &self.view
    }

    /// Event id shown in the detail modal.
    pub fn modal(&self) -> Option<&str> {
        self.modal.as_deref()
    }

    /// Selection index of the current view.
    pub fn selected_index(&self) -> usize {
        match self.view {
            ViewMode::Root => self.root_index,
            ViewMode::Branch { .. } => self.branch_index,
            ViewMode::Individual { .. } => self.individual_index,
        }
    }

    pub fn root_index(&self) -> usize {
        self.root_index
    }

    pub fn branch_index(&self) -> usize {
        self.branch_index
    }

    fn index_mut(&mut self) -> &mut usize {
        match self.view {
            ViewMode::Root => &mut self.root_index,
            ViewMode::Branch { .. } => &mut self.branch_index,
            ViewMode::Individual { .. } => &mut self.individual_index,
        }
    }

    /// Events listed in the current view, in display order.
    pub fn visible_events(&self, data: &DataCache) -> Vec<Event> {
        match &self.view {
            ViewMode::Root => Vec::new(),
            ViewMode::Branch { worldline } => data.scope_events(worldline),
            ViewMode::Individual { worldline, event } => {
                let scoped = data.scope_events(worldline);
                match scoped.iter().find(|e| &e.id == event) {
                    Some(root) => descendant_chain(root, &scoped).into_iter().cloned().collect(),
                    None => Vec::new(),
                }
            }
        }
    }

    fn item_count(&self, data: &DataCache) -> usize {
        match self.view {
            ViewMode::Root => data.worldlines.len(),
            _ => self.visible_events(data).len(),
        }
    }

    pub fn current_worldline<'a>(&self, data: &'a DataCache) -> Option<&'a Worldline> {
        match &self.view {
            ViewMode::Root => data.worldlines.get(self.root_index),
            other => other.worldline().and_then(|id| data.worldline(id)),
        }
    }

    pub fn selected_event(&self, data: &DataCache) -> Option<Event> {
        self.visible_events(data).into_iter().nth(self.selected_index())
    }

    pub fn apply(&mut self, input: NavInput, data: &DataCache, transition_active: bool) -> NavResult {
        if transition_active && input.is_navigation_trigger() {
            debug!(?input, "navigation blocked during transition");
            return NavResult::of(NavChange::Rejected);
        }
        if self.modal.is_some() {
            return match input {
                NavInput::Escape | NavInput::Back => {
                    self.modal = None;
                    NavResult::of(NavChange::ModalClosed)
                }
                _ => NavResult::of(NavChange::None),
            };
        }
        match input {
            NavInput::Up => self.step(-1, data),
            NavInput::Down => self.step(1, data),
            NavInput::Activate => self.activate(data),
            NavInput::Select(index) => {
                if index >= self.item_count(data) {
                    return NavResult::of(NavChange::None);
                }
                *self.index_mut() = index;
                self.activate(data)
            }
            NavInput::Back | NavInput::Escape => self.back(),
            NavInput::Drill => self.drill(data),
        }
    }

    fn step(&mut self, delta: isize, data: &DataCache) -> NavResult {
        let len = self.item_count(data);
        let index = self.index_mut();
        let next = clamp_index(*index as isize + delta, len);
        if next == *index {
            return NavResult::of(NavChange::None);
        }
        *index = next;
        NavResult::of(NavChange::Moved)
    }

    fn activate(&mut self, data: &DataCache) -> NavResult {
        if self.view == ViewMode::Root {
            let Some(wl) = data.worldlines.get(self.root_index) else {
                return NavResult::of(NavChange::None);
            };
            self.view = ViewMode::Branch {
                worldline: wl.id.clone(),
            };
            self.branch_index = 0;
            debug!(worldline = %wl.id, "entered branch view");
            return NavResult {
                change: NavChange::Entered(self.view.clone()),
                jump: Some(wl.percentage),
            };
        }
        let Some(event) = self.selected_event(data) else {
            return NavResult::of(NavChange::None);
        };
        self.modal = Some(event.id.clone());
        NavResult {
            jump: transition_target(&event),
            change: NavChange::ModalOpened(event.id),
        }
    }

    fn drill(&mut self, data: &DataCache) -> NavResult {
        let ViewMode::Branch { worldline } = &self.view else {
            return NavResult::of(NavChange::None);
        };
        let worldline = worldline.clone();
        let Some(event) = self.selected_event(data) else {
            return NavResult::of(NavChange::None);
        };
        self.view = ViewMode::Individual {
            worldline,
            event: event.id,
        };
        self.individual_index = 0;
        NavResult::of(NavChange::Entered(self.view.clone()))
    }

    fn back(&mut self) -> NavResult {
        self.view = match &self.view {
            ViewMode::Root => return NavResult::of(NavChange::None),
            ViewMode::Branch { .. } => {
                self.branch_index = 0;
                ViewMode::Root
            }
            ViewMode::Individual { worldline, .. } => ViewMode::Branch {
                worldline: worldline.clone(),
            },
        };
        NavResult::of(NavChange::Entered(self.view.clone()))
    }

    /// Re-validate view and selection after the data changed underneath.
    pub fn reconcile(&mut self, data: &DataCache) {
        if let Some(id) = self.view.worldline()
            && data.worldline(id).is_none()
        {
            self.view = ViewMode::Root;
            self.branch_index = 0;
        }
        if let ViewMode::Individual { worldline, event } = &self.view
            && data.event(event).is_none()
        {
            self.view = ViewMode::Branch {
                worldline: worldline.clone(),
            };
        }
        if self.modal.as_deref().is_some_and(|id| data.event(id).is_none()) {
            self.modal = None;
        }
        self.root_index = clamp_index(self.root_index as isize, data.worldlines.len());
        let len = self.item_count(data);
        let index = self.index_mut();
        *index = clamp_index(*index as isize, len);
    }
}

fn clamp_index(index: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    index.clamp(0, len as isize - 1) as usize
}
