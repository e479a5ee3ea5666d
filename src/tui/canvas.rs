use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseEvent,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::{Frame, Terminal};
use tracing::{info, warn};

use crate::commands;
use crate::config::Settings;
use crate::core::meter::MeterMode;
use crate::core::navigation::{NavChange, NavInput, ViewMode};
use crate::core::sequencer::{SequencerEvent, format_value};
use crate::core::session::{Intent, Outcome, Session};
use crate::data::DataSource;
use crate::data::cache::DataCache;
use crate::data::memory::MemoryStore;
use crate::tui::admin::{self, AdminEvent, AdminPanelState};
use crate::tui::input::{self, Action, Direction, MouseAction};
use crate::tui::render::{self, HitMap, RenderData};

const IDLE_POLL_MS: u64 = 200;
const FRAME_POLL_MS: u64 = 16;

#[derive(Debug, Clone, Default)]
pub struct ViewOptions {
    /// Seeded in-memory data; nothing is written.
    pub demo: bool,
    /// REST API base URL, overriding the configured source.
    pub api: Option<String>,
}

/// Where the left button went down.
#[derive(Debug, Clone, Copy)]
struct Press {
    item: Option<usize>,
}

struct AppState {
    session: Session,
    source: Box<dyn DataSource>,
    admin: AdminPanelState,
    show_help: bool,
    modal_scroll: u16,
    status_message: Option<String>,
    hits: HitMap,
    press: Option<Press>,
    started: Instant,
}

impl AppState {
    fn load(options: &ViewOptions) -> Result<Self> {
        if options.demo {
            let settings = Settings::default();
            let source: Box<dyn DataSource> = Box::new(MemoryStore::seeded());
            let mut app = Self::with_source(source, &settings);
            app.status_message = Some("demo mode: changes are in-memory only".to_string());
            return Ok(app);
        }

        let cwd = std::env::current_dir()?;
        let opened = commands::open_viewer_source_from(&cwd, options.api.as_deref())?;
        let mut app = Self::with_source(opened.source, &opened.settings);
        if opened.missing_store {
            app.status_message =
                Some("no timeline store here: run `divergence init` to create one".to_string());
        }
        Ok(app)
    }

    fn with_source(source: Box<dyn DataSource>, settings: &Settings) -> Self {
        let data = DataCache::load(source.as_ref());
        info!(
            source = %source.describe(),
            worldlines = data.worldlines.len(),
            events = data.events.len(),
            "viewer started"
        );
        let status_message = data
            .load_error
            .as_ref()
            .map(|err| format!("load failed: {err}"));
        Self {
            session: Session::new(data, settings),
            source,
            admin: AdminPanelState::default(),
            show_help: false,
            modal_scroll: 0,
            status_message,
            hits: HitMap::default(),
            press: None,
            started: Instant::now(),
        }
    }

    fn now_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn tick(&mut self, now_ms: u64) {
        for event in self.session.tick(now_ms) {
            if let SequencerEvent::Completed { target, .. } = event {
                self.status_message = Some(format!("worldline converged: {}%", format_value(target)));
            }
        }
    }

    fn draw(&mut self, frame: &mut Frame, now_ms: u64) {
        let areas = render::layout(frame.area());
        let kind = self.session.active_strip();
        self.session
            .viewport_mut()
            .on_layout(kind, f64::from(areas.strip.width));
        let hints = self.hints();
        let data = RenderData {
            session: &self.session,
            now_ms,
            hints: &hints,
            message: self.status_message.as_deref(),
            show_help: self.show_help,
            modal_scroll: self.modal_scroll,
        };
        self.hits = render::draw(frame, &data);
        if self.session.admin_visible() {
            admin::draw(frame, &self.admin, self.session.data());
        }
    }

    fn hints(&self) -> String {
        if self.session.admin_visible() {
            return if self.admin.form.is_some() {
                "type to edit  [↑↓/Tab] field  [Enter] save  [Esc] cancel".to_string()
            } else {
                "[j/k] select  [Enter] edit  [n] new  [d] delete  [Tab] worldlines/events  [Esc] close"
                    .to_string()
            };
        }
        if self.show_help {
            return "[?/Esc] close help".to_string();
        }
        if self.session.nav().modal().is_some() {
            return "[j/k/↑↓] scroll  [Esc/Backspace] close".to_string();
        }
        if self.session.meter().mode() == MeterMode::Custom {
            return "[0-9 .] type value  [Del] erase  [m] next meter mode  [q] quit".to_string();
        }
        match self.session.nav().view() {
            ViewMode::Root => {
                "[j/k/↑↓] select  [Enter] enter worldline  [h/l] pan  [+/-] zoom  [m] meter  [r] reload  [q] quit"
                    .to_string()
            }
            ViewMode::Branch { .. } => {
                "[j/k/↑↓] select  [Enter] details  [i] chain  [h/l] pan  [+/-] zoom  [Backspace] back"
                    .to_string()
            }
            ViewMode::Individual { .. } => {
                "[j/k/↑↓] select  [Enter] details  [h/l] pan  [+/-] zoom  [Backspace] back".to_string()
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent, now_ms: u64) -> Result<bool> {
        if self.session.observe_key(input::secret_key(key)) {
            if self.session.admin_visible() {
                self.admin = AdminPanelState::default();
                self.status_message = Some("admin panel unlocked".to_string());
            } else {
                self.status_message = None;
            }
            return Ok(false);
        }

        if self.session.admin_visible() {
            let event = admin::handle_key(
                key,
                &mut self.admin,
                self.session.data(),
                self.source.as_mut(),
            );
            match event {
                AdminEvent::Mutated => self.session.reload(self.source.as_ref()),
                AdminEvent::Close => self.session.hide_admin(),
                AdminEvent::None => {}
            }
            return Ok(false);
        }

        self.status_message = None;

        if self.show_help {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
                self.show_help = false;
            }
            return Ok(false);
        }

        let action = input::action_for_key(key);
        if self.session.nav().modal().is_some() {
            match action {
                Action::Move(Direction::Up) => {
                    self.modal_scroll = self.modal_scroll.saturating_sub(1);
                    return Ok(false);
                }
                Action::Move(Direction::Down) => {
                    self.modal_scroll = self.modal_scroll.saturating_add(1);
                    return Ok(false);
                }
                _ => {}
            }
        }

        let intent = match action {
            Action::Quit => return Ok(true),
            Action::ToggleHelp => {
                self.show_help = true;
                return Ok(false);
            }
            Action::Reload => {
                self.reload();
                return Ok(false);
            }
            Action::CycleMeter => {
                self.status_message = Some(match self.session.cycle_meter(now_ms) {
                    Some(mode) => format!("meter: {}", mode.label().to_lowercase()),
                    None => "worldline shift in progress".to_string(),
                });
                return Ok(false);
            }
            Action::MeterInput(c) => {
                self.session.meter_input(c);
                return Ok(false);
            }
            Action::MeterErase => {
                self.session.meter_erase();
                return Ok(false);
            }
            Action::Noop => return Ok(false),
            Action::Move(Direction::Up) => Intent::Nav(NavInput::Up),
            Action::Move(Direction::Down) => Intent::Nav(NavInput::Down),
            Action::Move(Direction::Left) => Intent::Pan(-1),
            Action::Move(Direction::Right) => Intent::Pan(1),
            Action::Activate => Intent::Nav(NavInput::Activate),
            Action::Back => Intent::Nav(NavInput::Back),
            Action::Cancel => Intent::Nav(NavInput::Escape),
            Action::Drill => Intent::Nav(NavInput::Drill),
            Action::ZoomIn => Intent::ZoomIn,
            Action::ZoomOut => Intent::ZoomOut,
        };
        let outcome = self.session.handle(intent, now_ms);
        self.apply_outcome(outcome);
        Ok(false)
    }

    fn apply_outcome(&mut self, outcome: Outcome) {
        match outcome.change {
            Some(NavChange::Rejected) => {
                self.status_message = Some("worldline shift in progress".to_string());
            }
            Some(NavChange::ModalOpened(_)) => self.modal_scroll = 0,
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, now_ms: u64) {
        if self.session.admin_visible() || self.show_help {
            return;
        }
        let wheel_zoom = self.session.viewport().settings().wheel_zoom;
        match input::action_for_mouse(mouse, wheel_zoom) {
            MouseAction::Press { column, row } => {
                self.press = Some(Press {
                    item: self.hits.item_at(column, row),
                });
                if let Some(x) = self.hits.strip_column(column, row) {
                    self.session.handle(Intent::DragStart(x), now_ms);
                }
            }
            MouseAction::Drag { column, .. } => {
                if let Some(strip) = self.hits.strip
                    && self.session.viewport().is_dragging()
                {
                    let x = f64::from(column) - f64::from(strip.x);
                    self.session.handle(Intent::DragTo(x), now_ms);
                }
            }
            MouseAction::Release { column, row } => {
                let dragged = self.session.viewport().is_dragging()
                    && self.session.handle(Intent::DragEnd, now_ms).dragged;
                if let Some(Press { item: Some(item) }) = self.press.take()
                    && !dragged
                    && self.hits.item_at(column, row) == Some(item)
                {
                    let outcome = self.session.handle(Intent::Nav(NavInput::Select(item)), now_ms);
                    self.apply_outcome(outcome);
                }
            }
            MouseAction::Hover { column, row } => {
                let x = self.hits.strip_column(column, row);
                self.session.handle(Intent::Cursor(x), now_ms);
            }
            MouseAction::Zoom { steps, column, row } => {
                if let Some(x) = self.hits.strip_column(column, row) {
                    self.session.handle(Intent::ZoomAt { steps, column: x }, now_ms);
                }
            }
            MouseAction::Scroll { delta } => {
                self.session.handle(Intent::ScrollBy(f64::from(delta)), now_ms);
            }
            MouseAction::Noop => {}
        }
    }

    fn reload(&mut self) {
        self.session.reload(self.source.as_ref());
        self.status_message = Some(match &self.session.data().load_error {
            Some(err) => {
                warn!(error = %err, "manual reload failed");
                format!("reload failed: {err}")
            }
            None => format!("reloaded from {}", self.source.describe()),
        });
    }
}

pub fn run(options: ViewOptions) -> Result<()> {
    let mut app = AppState::load(&options)?;

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let _guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    loop {
        let now = app.now_ms();
        app.tick(now);
        terminal.draw(|f| app.draw(f, now))?;
        let timeout = if app.session.is_animating() {
            FRAME_POLL_MS
        } else {
            IDLE_POLL_MS
        };
        if !event::poll(Duration::from_millis(timeout))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) => {
                if matches!(key.kind, KeyEventKind::Release | KeyEventKind::Repeat) {
                    continue;
                }
                if app.handle_key(key, app.now_ms())? {
                    break;
                }
            }
            Event::Mouse(mouse) => app.handle_mouse(mouse, app.now_ms()),
            _ => {}
        }
    }

    app.session.shutdown();
    info!("viewer closed");
    Ok(())
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, DisableMouseCapture, LeaveAlternateScreen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::unlock::ADMIN_SEQUENCE;
    use crate::core::unlock::SecretKey;
    use crossterm::event::{KeyModifiers, MouseButton, MouseEventKind};
    use ratatui::backend::TestBackend;

    fn demo() -> AppState {
        AppState::load(&ViewOptions {
            demo: true,
            api: None,
        })
        .unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn draw(app: &mut AppState, now_ms: u64) {
        let mut terminal = Terminal::new(TestBackend::new(120, 36)).unwrap();
        terminal.draw(|f| app.draw(f, now_ms)).unwrap();
    }

    fn run_until_idle(app: &mut AppState, mut now: u64) -> u64 {
        while app.session.sequencer().is_active() {
            now += 16;
            app.tick(now);
        }
        now
    }

    #[test]
    fn demo_load_uses_seeded_data() {
        let app = demo();
        assert_eq!(app.session.data().worldlines.len(), 4);
        assert_eq!(
            app.status_message.as_deref(),
            Some("demo mode: changes are in-memory only")
        );
    }

    #[test]
    fn entering_beta_reports_convergence() {
        let mut app = demo();
        app.handle_key(key(KeyCode::Char('j')), 0).unwrap();
        app.handle_key(key(KeyCode::Enter), 0).unwrap();
        assert!(app.session.sequencer().is_active());

        app.handle_key(key(KeyCode::Enter), 10).unwrap();
        assert_eq!(
            app.status_message.as_deref(),
            Some("worldline shift in progress"),
            "activation is locked during a run"
        );

        run_until_idle(&mut app, 0);
        assert_eq!(
            app.status_message.as_deref(),
            Some("worldline converged: 1.130205%")
        );
    }

    #[test]
    fn modal_scrolls_with_vertical_keys() {
        let mut app = demo();
        app.handle_key(key(KeyCode::Down), 0).unwrap();
        app.handle_key(key(KeyCode::Enter), 0).unwrap();
        let now = run_until_idle(&mut app, 0);
        app.handle_key(key(KeyCode::Enter), now).unwrap();
        assert_eq!(app.session.nav().modal(), Some("april2020"));

        app.handle_key(key(KeyCode::Char('j')), now).unwrap();
        app.handle_key(key(KeyCode::Char('j')), now).unwrap();
        assert_eq!(app.modal_scroll, 2);
        assert_eq!(app.session.nav().selected_index(), 0, "selection unchanged");

        app.handle_key(key(KeyCode::Esc), now).unwrap();
        assert_eq!(app.session.nav().modal(), None);
        assert_eq!(app.session.nav().view().worldline(), Some("beta"));
    }

    #[test]
    fn secret_sequence_routes_keys_to_admin() {
        let mut app = demo();
        for k in ADMIN_SEQUENCE {
            let code = match k {
                SecretKey::Up => KeyCode::Up,
                SecretKey::Down => KeyCode::Down,
                SecretKey::Left => KeyCode::Left,
                SecretKey::Right => KeyCode::Right,
                SecretKey::Char(c) => KeyCode::Char(c),
                SecretKey::Other => KeyCode::Null,
            };
            app.handle_key(key(code), 0).unwrap();
        }
        assert!(app.session.admin_visible());

        app.handle_key(key(KeyCode::Char('d')), 0).unwrap();
        app.handle_key(key(KeyCode::Char('y')), 0).unwrap();
        assert_eq!(
            app.session.data().worldlines.len(),
            3,
            "admin delete reloads the session cache"
        );

        app.handle_key(key(KeyCode::Esc), 0).unwrap();
        assert!(!app.session.admin_visible());
    }

    #[test]
    fn click_on_a_row_activates_it() {
        let mut app = demo();
        draw(&mut app, 0);
        let (rect, index) = app.hits.items[2];
        assert_eq!(index, 2);
        let (x, y) = (rect.x + 1, rect.y);
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), x, y), 0);
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), x, y), 0);
        assert_eq!(app.session.nav().view().worldline(), Some("gamma"));
    }

    #[test]
    fn drag_release_is_not_a_click() {
        let mut app = demo();
        app.handle_key(key(KeyCode::Char('+')), 0).unwrap();
        app.handle_key(key(KeyCode::Char('+')), 0).unwrap();
        draw(&mut app, 0);
        let (rect, _) = app.hits.items[1];
        let strip = app.hits.strip.unwrap();
        let y = rect.y;
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), strip.x + 20, y), 0);
        app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), strip.x + 10, y), 0);
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), strip.x + 10, y), 0);
        assert_eq!(app.session.nav().view(), &ViewMode::Root);
        assert!(app.session.viewport().strip(app.session.active_strip()).scroll > 0.0);
    }

    #[test]
    fn help_swallows_keys_until_closed() {
        let mut app = demo();
        app.handle_key(key(KeyCode::Char('?')), 0).unwrap();
        assert!(app.show_help);
        app.handle_key(key(KeyCode::Enter), 0).unwrap();
        assert_eq!(app.session.nav().view(), &ViewMode::Root);
        app.handle_key(key(KeyCode::Esc), 0).unwrap();
        assert!(!app.show_help);
        assert!(app.handle_key(key(KeyCode::Char('q')), 0).unwrap());
    }

    #[test]
    fn reload_reports_the_source() {
        let mut app = demo();
        app.handle_key(key(KeyCode::Char('r')), 0).unwrap();
        let message = app.status_message.clone().unwrap_or_default();
        assert!(message.starts_with("reloaded from"), "{message}");
    }

    #[test]
    fn meter_mode_keys_edit_the_custom_value() {
        let mut app = demo();
        app.handle_key(key(KeyCode::Char('m')), 0).unwrap();
        assert_eq!(app.status_message.as_deref(), Some("meter: clock"));
        app.handle_key(key(KeyCode::Char('m')), 0).unwrap();
        assert_eq!(app.session.meter().mode(), MeterMode::Custom);
        assert!(app.hints().contains("[Del] erase"));

        app.handle_key(key(KeyCode::Delete), 0).unwrap();
        app.handle_key(key(KeyCode::Char('9')), 0).unwrap();
        assert_eq!(app.session.meter().custom(), "12345679");
        app.handle_key(key(KeyCode::Char('x')), 0).unwrap();
        assert_eq!(app.session.meter().custom(), "12345679");
    }
}
