use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::core::unlock::SecretKey;

/// Columns scrolled per horizontal wheel notch.
pub const WHEEL_SCROLL_COLUMNS: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Move(Direction),
    Activate,
    Back,
    Cancel,
    Drill,
    ZoomIn,
    ZoomOut,
    Reload,
    Quit,
    ToggleHelp,
    CycleMeter,
    /// Digit or dot for the custom meter value.
    MeterInput(char),
    MeterErase,
    Noop,
}

pub fn action_for_key(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Action::Move(Direction::Up),
        KeyCode::Down | KeyCode::Char('j') => Action::Move(Direction::Down),
        KeyCode::Left | KeyCode::Char('h') => Action::Move(Direction::Left),
        KeyCode::Right | KeyCode::Char('l') => Action::Move(Direction::Right),
        KeyCode::Enter => Action::Activate,
        KeyCode::Backspace => Action::Back,
        KeyCode::Esc => Action::Cancel,
        KeyCode::Char('i') => Action::Drill,
        KeyCode::Char('+') | KeyCode::Char('=') => Action::ZoomIn,
        KeyCode::Char('-') => Action::ZoomOut,
        KeyCode::Char('r') => Action::Reload,
        KeyCode::Char('?') => Action::ToggleHelp,
        KeyCode::Char('m') => Action::CycleMeter,
        KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => Action::MeterInput(c),
        KeyCode::Delete => Action::MeterErase,
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
        _ => Action::Noop,
    }
}

/// Raw key as seen by the hidden admin sequence. Vim keys do not count.
pub fn secret_key(key: KeyEvent) -> SecretKey {
    match key.code {
        KeyCode::Up => SecretKey::Up,
        KeyCode::Down => SecretKey::Down,
        KeyCode::Left => SecretKey::Left,
        KeyCode::Right => SecretKey::Right,
        KeyCode::Char(c) => SecretKey::Char(c),
        _ => SecretKey::Other,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseAction {
    Press { column: u16, row: u16 },
    Drag { column: u16, row: u16 },
    Release { column: u16, row: u16 },
    Hover { column: u16, row: u16 },
    /// Zoom steps at the pointer, positive zooms in.
    Zoom { steps: i32, column: u16, row: u16 },
    /// Horizontal scroll in columns.
    Scroll { delta: i32 },
    Noop,
}

/// Map a mouse event. Shift+wheel and horizontal wheels always scroll;
/// the plain vertical wheel zooms when `wheel_zoom` is on.
pub fn action_for_mouse(mouse: MouseEvent, wheel_zoom: bool) -> MouseAction {
    let (column, row) = (mouse.column, mouse.row);
    let shift = mouse.modifiers.contains(KeyModifiers::SHIFT);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => MouseAction::Press { column, row },
        MouseEventKind::Drag(MouseButton::Left) => MouseAction::Drag { column, row },
        MouseEventKind::Up(MouseButton::Left) => MouseAction::Release { column, row },
        MouseEventKind::Moved => MouseAction::Hover { column, row },
        MouseEventKind::ScrollUp if shift => MouseAction::Scroll {
            delta: -WHEEL_SCROLL_COLUMNS,
        },
        MouseEventKind::ScrollDown if shift => MouseAction::Scroll {
            delta: WHEEL_SCROLL_COLUMNS,
        },
        MouseEventKind::ScrollLeft => MouseAction::Scroll {
            delta: -WHEEL_SCROLL_COLUMNS,
        },
        MouseEventKind::ScrollRight => MouseAction::Scroll {
            delta: WHEEL_SCROLL_COLUMNS,
        },
        MouseEventKind::ScrollUp if wheel_zoom => MouseAction::Zoom {
            steps: 1,
            column,
            row,
        },
        MouseEventKind::ScrollDown if wheel_zoom => MouseAction::Zoom {
            steps: -1,
            column,
            row,
        },
        _ => MouseAction::Noop,
    }
}
