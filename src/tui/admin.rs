//! Hidden admin panel: create, edit and delete worldlines and events.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph};
use tracing::{error, info};

use super::render::centered_rect;
use crate::data::cache::DataCache;
use crate::data::{DataResult, DataSource};
use crate::model::{Event, EventPatch, ROOT_SCOPE, Worldline, WorldlinePatch};

const NEW_WORLDLINE_COLOR: &str = "rgba(255, 255, 255, 0.8)";
const DEFAULT_EVENT_SCOPE: &str = "alpha";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminEvent {
    None,
    /// The data source changed; the caller reloads.
    Mutated,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminTab {
    #[default]
    Worldlines,
    Events,
}

impl AdminTab {
    fn toggle(self) -> Self {
        match self {
            AdminTab::Worldlines => AdminTab::Events,
            AdminTab::Events => AdminTab::Worldlines,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormKind {
    NewWorldline,
    EditWorldline(String),
    NewEvent,
    EditEvent(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminForm {
    pub kind: FormKind,
    pub fields: Vec<FormField>,
    pub focus: usize,
}

impl AdminForm {
    fn new(kind: FormKind, fields: &[(&'static str, String)]) -> Self {
        Self {
            kind,
            fields: fields
                .iter()
                .map(|(label, value)| FormField {
                    label: *label,
                    value: value.clone(),
                })
                .collect(),
            focus: 0,
        }
    }

    fn new_worldline() -> Self {
        Self::new(
            FormKind::NewWorldline,
            &[
                ("id", String::new()),
                ("name", String::new()),
                ("percentage", "0".into()),
                ("color", NEW_WORLDLINE_COLOR.into()),
            ],
        )
    }

    fn edit_worldline(wl: &Worldline) -> Self {
        Self::new(
            FormKind::EditWorldline(wl.id.clone()),
            &[
                ("name", wl.name.clone()),
                ("percentage", wl.percentage.to_string()),
                ("color", wl.color.clone()),
            ],
        )
    }

    fn new_event(scope: &str) -> Self {
        Self::new(
            FormKind::NewEvent,
            &[
                ("id", String::new()),
                ("date", String::new()),
                ("title", String::new()),
                ("position", "0".into()),
                ("scope", scope.to_string()),
                ("type", String::new()),
                ("from worldline", String::new()),
                ("to worldline", String::new()),
                ("lore", String::new()),
            ],
        )
    }

    fn edit_event(ev: &Event) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Self::new(
            FormKind::EditEvent(ev.id.clone()),
            &[
                ("date", ev.date.clone()),
                ("title", ev.title.clone()),
                ("position", ev.position.to_string()),
                ("scope", ev.scope.clone()),
                ("type", text(&ev.kind)),
                ("from worldline", text(&ev.from_worldline)),
                ("to worldline", text(&ev.to_worldline)),
                ("lore", text(&ev.lore)),
            ],
        )
    }

    fn value(&self, label: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map_or("", |f| f.value.as_str())
    }

    fn optional(&self, label: &str) -> Option<String> {
        let value = self.value(label).trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    fn number(&self, label: &str) -> Result<f64, String> {
        let raw = self.value(label).trim();
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("{label} must be a number, got `{raw}`"))
    }

    fn title(&self) -> String {
        match &self.kind {
            FormKind::NewWorldline => "new worldline".into(),
            FormKind::EditWorldline(id) => format!("edit worldline {id}"),
            FormKind::NewEvent => "new event".into(),
            FormKind::EditEvent(id) => format!("edit event {id}"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdminPanelState {
    pub tab: AdminTab,
    pub selected_row: usize,
    pub form: Option<AdminForm>,
    /// Id awaiting a `y` to confirm deletion.
    pub confirm_delete: Option<String>,
    pub message: Option<String>,
}

fn row_count(state: &AdminPanelState, data: &DataCache) -> usize {
    let items = match state.tab {
        AdminTab::Worldlines => data.worldlines.len(),
        AdminTab::Events => data.events.len(),
    };
    // Trailing "+ new" row.
    items + 1
}

fn selected_id(state: &AdminPanelState, data: &DataCache) -> Option<String> {
    match state.tab {
        AdminTab::Worldlines => data.worldlines.get(state.selected_row).map(|w| w.id.clone()),
        AdminTab::Events => data.events.get(state.selected_row).map(|e| e.id.clone()),
    }
}

pub fn handle_key(
    key: KeyEvent,
    state: &mut AdminPanelState,
    data: &DataCache,
    source: &mut dyn DataSource,
) -> AdminEvent {
    if state.form.is_some() {
        return handle_form_key(key, state, source);
    }
    if let Some(id) = state.confirm_delete.take() {
        if key.code == KeyCode::Char('y') {
            return delete(state, &id, source);
        }
        state.message = Some("delete cancelled".into());
        return AdminEvent::None;
    }
    state.selected_row = state.selected_row.min(row_count(state, data) - 1);
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => AdminEvent::Close,
        KeyCode::Up | KeyCode::Char('k') => {
            state.selected_row = state.selected_row.saturating_sub(1);
            AdminEvent::None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            state.selected_row = (state.selected_row + 1).min(row_count(state, data) - 1);
            AdminEvent::None
        }
        KeyCode::Tab | KeyCode::Left | KeyCode::Right => {
            state.tab = state.tab.toggle();
            state.selected_row = 0;
            state.message = None;
            AdminEvent::None
        }
        KeyCode::Char('n') => {
            open_new_form(state, data);
            AdminEvent::None
        }
        KeyCode::Enter => {
            match state.tab {
                AdminTab::Worldlines => match data.worldlines.get(state.selected_row) {
                    Some(wl) => state.form = Some(AdminForm::edit_worldline(wl)),
                    None => open_new_form(state, data),
                },
                AdminTab::Events => match data.events.get(state.selected_row) {
                    Some(ev) => state.form = Some(AdminForm::edit_event(ev)),
                    None => open_new_form(state, data),
                },
            }
            AdminEvent::None
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            if let Some(id) = selected_id(state, data) {
                state.message = Some(format!("delete `{id}`? [y] confirm"));
                state.confirm_delete = Some(id);
            }
            AdminEvent::None
        }
        _ => AdminEvent::None,
    }
}

fn open_new_form(state: &mut AdminPanelState, data: &DataCache) {
    state.message = None;
    state.form = Some(match state.tab {
        AdminTab::Worldlines => AdminForm::new_worldline(),
        AdminTab::Events => AdminForm::new_event(
            data.worldlines
                .first()
                .map_or(DEFAULT_EVENT_SCOPE, |w| w.id.as_str()),
        ),
    });
}

fn handle_form_key(key: KeyEvent, state: &mut AdminPanelState, source: &mut dyn DataSource) -> AdminEvent {
    let Some(form) = state.form.as_mut() else {
        return AdminEvent::None;
    };
    match key.code {
        KeyCode::Esc => {
            state.form = None;
            state.message = None;
        }
        KeyCode::Up => form.focus = form.focus.saturating_sub(1),
        KeyCode::Down | KeyCode::Tab => {
            form.focus = (form.focus + 1).min(form.fields.len().saturating_sub(1));
        }
        KeyCode::Backspace => {
            if let Some(field) = form.fields.get_mut(form.focus) {
                field.value.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(field) = form.fields.get_mut(form.focus) {
                field.value.push(c);
            }
        }
        KeyCode::Enter => return submit(state, source),
        _ => {}
    }
    AdminEvent::None
}

/// Run the form's mutation. On failure the form stays open for a resubmit.
fn submit(state: &mut AdminPanelState, source: &mut dyn DataSource) -> AdminEvent {
    let Some(form) = state.form.as_ref() else {
        return AdminEvent::None;
    };
    let result = match apply_form(form, source) {
        Ok(result) => result,
        Err(message) => {
            state.message = Some(message);
            return AdminEvent::None;
        }
    };
    match result {
        Ok(done) => {
            info!(action = %done, "admin mutation applied");
            state.message = Some(done);
            state.form = None;
            AdminEvent::Mutated
        }
        Err(err) => {
            error!(form = %form.title(), error = %err, "admin mutation failed");
            state.message = Some(format!("error: {err}"));
            AdminEvent::None
        }
    }
}

/// Outer error: the form did not validate. Inner: the source rejected it.
fn apply_form(form: &AdminForm, source: &mut dyn DataSource) -> Result<DataResult<String>, String> {
    Ok(match &form.kind {
        FormKind::NewWorldline => {
            let worldline = Worldline {
                id: form.value("id").trim().to_string(),
                name: form.value("name").to_string(),
                percentage: form.number("percentage")?,
                color: form.value("color").trim().to_string(),
            };
            source
                .create_worldline(&worldline)
                .map(|w| format!("created worldline {}", w.id))
        }
        FormKind::EditWorldline(id) => {
            let patch = WorldlinePatch {
                name: Some(form.value("name").to_string()),
                percentage: Some(form.number("percentage")?),
                color: Some(form.value("color").trim().to_string()),
            };
            source
                .update_worldline(id, &patch)
                .map(|w| format!("updated worldline {}", w.id))
        }
        FormKind::NewEvent => {
            let event = Event {
                id: form.value("id").trim().to_string(),
                date: form.value("date").to_string(),
                title: form.value("title").to_string(),
                position: form.number("position")?,
                from_worldline: form.optional("from worldline"),
                to_worldline: form.optional("to worldline"),
                lore: form.optional("lore"),
                kind: form.optional("type"),
                scope: form.value("scope").trim().to_string(),
            };
            source
                .create_event(&event)
                .map(|e| format!("created event {}", e.id))
        }
        FormKind::EditEvent(id) => {
            let patch = EventPatch {
                date: Some(form.value("date").to_string()),
                title: Some(form.value("title").to_string()),
                position: Some(form.number("position")?),
                from_worldline: Some(form.value("from worldline").trim().to_string()),
                to_worldline: Some(form.value("to worldline").trim().to_string()),
                lore: Some(form.value("lore").to_string()),
                kind: Some(form.value("type").trim().to_string()),
                scope: Some(form.value("scope").trim().to_string()),
            };
            source
                .update_event(id, &patch)
                .map(|e| format!("updated event {}", e.id))
        }
    })
}

fn delete(state: &mut AdminPanelState, id: &str, source: &mut dyn DataSource) -> AdminEvent {
    let (kind, result) = match state.tab {
        AdminTab::Worldlines => ("worldline", source.delete_worldline(id)),
        AdminTab::Events => ("event", source.delete_event(id)),
    };
    match result {
        Ok(()) => {
            info!(kind, id, "admin delete applied");
            state.message = Some(format!("deleted {kind} {id}"));
            state.selected_row = state.selected_row.saturating_sub(1);
            AdminEvent::Mutated
        }
        Err(err) => {
            error!(kind, id, error = %err, "admin delete failed");
            state.message = Some(format!("error: {err}"));
            AdminEvent::None
        }
    }
}

pub fn draw(frame: &mut Frame, state: &AdminPanelState, data: &DataCache) {
    let area = centered_rect(frame.area(), 64, 72);
    frame.render_widget(Clear, area);

    let title = Line::from(vec![
        Span::styled(
            "Admin",
            Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("[Tab] switch  [n] new  [d] delete  [Esc] close", Style::default().fg(Color::Gray)),
    ]);

    let tab_style = |tab: AdminTab| {
        if state.tab == tab {
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };
    let mut lines = vec![
        Line::from(vec![
            Span::styled("WORLDLINES", tab_style(AdminTab::Worldlines)),
            Span::raw("   "),
            Span::styled("EVENTS", tab_style(AdminTab::Events)),
        ]),
        Line::from(""),
    ];

    let selected_row = state.selected_row.min(row_count(state, data) - 1);
    let listing = state.form.is_none();
    match state.tab {
        AdminTab::Worldlines => {
            for (i, wl) in data.worldlines.iter().enumerate() {
                lines.push(admin_row(
                    listing && selected_row == i,
                    &wl.id,
                    &format!("{}  {}%  {}", wl.name, wl.percentage, wl.color),
                ));
            }
        }
        AdminTab::Events => {
            for (i, ev) in data.events.iter().enumerate() {
                lines.push(admin_row(
                    listing && selected_row == i,
                    &ev.id,
                    &format!("[{}] {} @ {}", ev.scope, ev.title, ev.position),
                ));
            }
        }
    }
    lines.push(admin_row(
        listing && selected_row == row_count(state, data) - 1,
        "+ new",
        "",
    ));

    if let Some(form) = &state.form {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            form.title(),
            Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
        )));
        for (i, field) in form.fields.iter().enumerate() {
            lines.push(form_row(i == form.focus, field));
        }
        if matches!(form.kind, FormKind::NewEvent | FormKind::EditEvent(_)) {
            lines.push(Line::from(Span::styled(
                format!("Scope: a worldline id, or {ROOT_SCOPE} for the root axis."),
                Style::default().fg(Color::DarkGray),
            )));
        }
        lines.push(Line::from(Span::styled(
            "Up/Down field, type to edit, Enter save, Esc cancel.",
            Style::default().fg(Color::DarkGray),
        )));
    }
    if let Some(message) = &state.message {
        lines.push(Line::from(""));
        let color = if message.starts_with("error") {
            Color::LightRed
        } else {
            Color::Green
        };
        lines.push(Line::from(Span::styled(message.clone(), Style::default().fg(color))));
    }

    let panel = Paragraph::new(lines).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::LightRed))
            .padding(Padding::new(1, 1, 1, 0)),
    );
    frame.render_widget(panel, area);
}

fn admin_row(selected: bool, key: &str, detail: &str) -> Line<'static> {
    let indicator = if selected { ">" } else { " " };
    let base_style = if selected {
        Style::default()
            .fg(Color::White)
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    Line::from(vec![
        Span::styled(format!("{indicator} {key:<16}"), base_style),
        Span::styled(detail.to_string(), Style::default().fg(Color::DarkGray)),
    ])
}

fn form_row(focused: bool, field: &FormField) -> Line<'static> {
    let label_style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let mut value = field.value.replace('\n', "⏎");
    if focused {
        value.push('▏');
    }
    Line::from(vec![
        Span::styled(format!("  {:<16}", field.label), label_style),
        Span::styled(value, Style::default().fg(Color::White)),
    ])
}
