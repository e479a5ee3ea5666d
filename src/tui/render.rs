use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Margin, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph, Wrap};

use super::nixie;
use crate::core::meter::{MeterMode, WallTime};
use crate::core::navigation::ViewMode;
use crate::core::sequencer::{Sequencer, format_value};
use crate::core::session::Session;
use crate::core::ticks::{column_for_position, tick_marks};
use crate::core::viewport::Strip;
use crate::model::linkage::resolve_parent;
use crate::model::{Event, Worldline, color};

/// Nixie tube orange.
pub const NIXIE: Color = Color::Rgb(255, 140, 0);
const LABEL_WIDTH: u16 = 24;
/// Rows above the item list: tick labels and the axis.
const AXIS_ROWS: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    pub meter: Rect,
    pub pane: Rect,
    pub labels: Rect,
    pub strip: Rect,
    pub status: Rect,
}

/// Screen regions for `area`. Shared by the layout pass and the draw.
pub fn layout(area: Rect) -> FrameLayout {
    let outer = area.inner(Margin {
        horizontal: 2,
        vertical: 1,
    });
    let inner = frame_block(Line::default(), Color::DarkGray).inner(outer);
    let [meter, _gap, pane, status] = Layout::vertical([
        Constraint::Length(5),
        Constraint::Length(1),
        Constraint::Min(6),
        Constraint::Length(4),
    ])
    .areas(inner);
    let pane_inner = pane_block(Line::default(), Color::DarkGray).inner(pane);
    let [labels, strip] =
        Layout::horizontal([Constraint::Length(LABEL_WIDTH), Constraint::Min(1)]).areas(pane_inner);
    FrameLayout {
        meter,
        pane,
        labels,
        strip,
        status,
    }
}

fn frame_block(title: Line<'static>, border: Color) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(border))
        .padding(Padding::new(2, 2, 1, 1))
        .title(title)
}

fn pane_block(title: Line<'static>, border: Color) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .padding(Padding::new(1, 1, 0, 0))
        .title(title)
}

/// Clickable regions recorded during the last draw.
#[derive(Debug, Clone, Default)]
pub struct HitMap {
    pub strip: Option<Rect>,
    pub items: Vec<(Rect, usize)>,
}

impl HitMap {
    pub fn item_at(&self, column: u16, row: u16) -> Option<usize> {
        let pos = Position::new(column, row);
        self.items
            .iter()
            .find(|(rect, _)| rect.contains(pos))
            .map(|&(_, index)| index)
    }

    /// Column relative to the strip's left edge, if the pointer is over it.
    pub fn strip_column(&self, column: u16, row: u16) -> Option<f64> {
        let strip = self.strip?;
        strip
            .contains(Position::new(column, row))
            .then(|| f64::from(column - strip.x))
    }
}

pub struct RenderData<'a> {
    pub session: &'a Session,
    pub now_ms: u64,
    pub hints: &'a str,
    pub message: Option<&'a str>,
    pub show_help: bool,
    pub modal_scroll: u16,
}

pub fn draw(frame: &mut Frame, data: &RenderData<'_>) -> HitMap {
    let session = data.session;
    let areas = layout(frame.area());
    let outer = frame.area().inner(Margin {
        horizontal: 2,
        vertical: 1,
    });
    let mut title_spans = vec![
        Span::styled("divergence", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled("[?] help", Style::default().fg(Color::DarkGray)),
        Span::raw("  "),
        Span::styled("[q] quit", Style::default().fg(Color::DarkGray)),
    ];
    let border = if session.admin_visible() {
        title_spans.push(Span::raw("  "));
        title_spans.push(Span::styled(
            "[ADMIN]",
            Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
        ));
        Color::LightRed
    } else {
        Color::DarkGray
    };
    frame.render_widget(frame_block(Line::from(title_spans), border), outer);

    render_meter(frame, areas.meter, session, data.now_ms);

    let mut hits = HitMap {
        strip: Some(areas.strip),
        items: Vec::new(),
    };
    let strip = *session.viewport().strip(session.active_strip());
    let (title, pane_border) = pane_title(session);
    frame.render_widget(pane_block(title, pane_border), areas.pane);
    render_axis(frame, &areas, session, &strip);
    match session.nav().view() {
        ViewMode::Root => render_root(frame, &areas, session, &strip, &mut hits),
        ViewMode::Branch { worldline } => {
            if let Some(wl) = session.data().worldline(worldline) {
                render_branch(frame, &areas, session, wl, &strip, &mut hits);
            }
        }
        ViewMode::Individual { worldline, .. } => {
            if let Some(wl) = session.data().worldline(worldline) {
                render_individual(frame, &areas, session, wl, &strip, &mut hits);
            }
        }
    }

    render_status(frame, areas.status, data);

    if let Some(event) = session.nav().modal().and_then(|id| session.data().event(id)) {
        render_event_modal(frame, event, data.modal_scroll);
    }
    render_transition(frame, session.sequencer(), data.now_ms);
    if data.show_help {
        render_help_overlay(frame);
    }
    hits
}

fn pane_title(session: &Session) -> (Line<'static>, Color) {
    let heading = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    let detail = Style::default().fg(Color::DarkGray);
    let zoom = format!("zoom {:.1}x", session.viewport().zoom());
    let current = session.nav().current_worldline(session.data());
    match (session.nav().view(), current) {
        (ViewMode::Branch { .. }, Some(wl)) => (
            Line::from(vec![
                Span::styled(format!("WORLDLINE {}", wl.name), heading),
                Span::raw("  "),
                Span::styled(format!("{}%  {zoom}", format_value(wl.percentage)), detail),
            ]),
            worldline_color(wl, false),
        ),
        (ViewMode::Individual { event, .. }, Some(wl)) => {
            let title = session
                .data()
                .event(event)
                .map_or_else(|| event.clone(), |e| e.title.clone());
            (
                Line::from(vec![
                    Span::styled(format!("{} / {title}", wl.name), heading),
                    Span::raw("  "),
                    Span::styled(zoom, detail),
                ]),
                worldline_color(wl, false),
            )
        }
        _ => (
            Line::from(vec![
                Span::styled("WORLDLINES", heading),
                Span::raw("  "),
                Span::styled(zoom, detail),
            ]),
            Color::DarkGray,
        ),
    }
}

fn worldline_color(wl: &Worldline, selected: bool) -> Color {
    if selected {
        color::parse_or_default(&color::glow(&wl.color))
    } else {
        color::parse_or_default(&wl.color)
    }
}

fn render_meter(frame: &mut Frame, area: Rect, session: &Session, now_ms: u64) {
    let sequencer = session.sequencer();
    let meter = session.meter();
    let (readout, mode) = if sequencer.is_active() {
        (sequencer.readout().text(), MeterMode::Divergence)
    } else {
        let wall = match meter.mode() {
            MeterMode::Clock => WallTime::now(),
            _ => WallTime {
                hour: 0,
                minute: 0,
                second: 0,
            },
        };
        let settled = format_value(sequencer.settled());
        (meter.text(&settled, now_ms, wall), meter.mode())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            mode.label(),
            Style::default().fg(NIXIE).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(
        Paragraph::new(readout_lines(&readout, inner.width, Style::default().fg(NIXIE)))
            .alignment(Alignment::Center),
        inner,
    );
}

/// Nixie glyphs when they fit in `width`, plain text otherwise.
fn readout_lines(text: &str, width: u16, style: Style) -> Vec<Line<'static>> {
    if nixie::width(text) <= usize::from(width) {
        nixie::glyph_lines(text)
            .into_iter()
            .map(|row| Line::from(Span::styled(row, style)))
            .collect()
    } else {
        vec![
            Line::default(),
            Line::from(Span::styled(text.to_string(), style.add_modifier(Modifier::BOLD))),
        ]
    }
}

/// One row of the visible slice of a strip.
struct RowCanvas {
    cells: Vec<(char, Style)>,
    scroll: f64,
}

impl RowCanvas {
    fn new(width: u16, scroll: f64) -> Self {
        Self {
            cells: vec![(' ', Style::default()); usize::from(width)],
            scroll,
        }
    }

    fn visible(&self, content_col: f64) -> Option<usize> {
        let x = (content_col - self.scroll).round();
        (x >= 0.0 && (x as usize) < self.cells.len()).then_some(x as usize)
    }

    fn put(&mut self, content_col: f64, ch: char, style: Style) {
        if let Some(x) = self.visible(content_col) {
            self.cells[x] = (ch, style);
        }
    }

    fn hline(&mut self, from: f64, to: f64, ch: char, style: Style) {
        let (lo, hi) = (from.min(to) - 0.5, from.max(to) + 0.5);
        for (x, cell) in self.cells.iter_mut().enumerate() {
            let col = x as f64 + self.scroll;
            if col >= lo && col < hi {
                *cell = (ch, style);
            }
        }
    }

    fn text(&mut self, content_col: f64, text: &str, style: Style) {
        for (i, ch) in text.chars().enumerate() {
            self.put(content_col + i as f64, ch, style);
        }
    }

    fn into_line(self) -> Line<'static> {
        let mut spans: Vec<Span<'static>> = Vec::new();
        let mut run = String::new();
        let mut run_style: Option<Style> = None;
        for (ch, style) in self.cells {
            if run_style.is_some_and(|s| s != style) {
                spans.push(Span::styled(std::mem::take(&mut run), run_style.unwrap_or_default()));
            }
            run_style = Some(style);
            run.push(ch);
        }
        if let Some(style) = run_style {
            spans.push(Span::styled(run, style));
        }
        Line::from(spans)
    }
}

fn marker_column(position: f64, strip: &Strip) -> f64 {
    column_for_position(position, strip.content_width).clamp(0.0, (strip.content_width - 1.0).max(0.0))
}

fn row_rect(area: Rect, offset: u16) -> Option<Rect> {
    (offset < area.height).then(|| Rect::new(area.x, area.y + offset, area.width, 1))
}

fn render_row(frame: &mut Frame, areas: &FrameLayout, offset: u16, label: Line<'static>, row: RowCanvas) {
    if let Some(rect) = row_rect(areas.labels, offset) {
        frame.render_widget(Paragraph::new(label), rect);
    }
    if let Some(rect) = row_rect(areas.strip, offset) {
        frame.render_widget(Paragraph::new(row.into_line()), rect);
    }
}

fn render_axis(frame: &mut Frame, areas: &FrameLayout, session: &Session, strip: &Strip) {
    let zoom = session.viewport().zoom();
    let axis_style = Style::default().fg(Color::DarkGray);
    let mut labels = RowCanvas::new(areas.strip.width, strip.scroll);
    let mut axis = RowCanvas::new(areas.strip.width, strip.scroll);
    axis.hline(0.0, (strip.content_width - 1.0).max(0.0), '─', axis_style);
    for mark in tick_marks(&session.data().timeline, zoom, strip.content_width) {
        let style = if mark.major {
            Style::default().fg(Color::Gray)
        } else {
            axis_style
        };
        axis.put(mark.offset, if mark.major { '┼' } else { '┬' }, style);
        labels.text(mark.offset, &mark.label, style);
    }
    if *session.nav().view() == ViewMode::Root {
        for event in session.data().root_events() {
            axis.put(
                marker_column(event.position, strip),
                '◆',
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            );
        }
    }
    let tl = &session.data().timeline;
    render_row(
        frame,
        areas,
        0,
        Line::from(Span::styled(format!("{}-{}", tl.start_year, tl.end_year), axis_style)),
        labels,
    );
    render_row(frame, areas, 1, Line::default(), axis);
}

/// First item row to show so `selected` stays on screen.
fn first_visible(selected: usize, visible: usize) -> usize {
    if visible == 0 {
        return selected;
    }
    selected.saturating_sub(visible - 1)
}

fn label_line(text: String, selected: bool, color: Color) -> Line<'static> {
    let prefix = if selected { "> " } else { "  " };
    let style = if selected {
        Style::default()
            .fg(Color::White)
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(color)
    };
    Line::from(Span::styled(
        truncate_text(&format!("{prefix}{text}"), usize::from(LABEL_WIDTH - 1)),
        style,
    ))
}

fn item_rect(areas: &FrameLayout, offset: u16) -> Option<Rect> {
    let pane = Rect::new(
        areas.labels.x,
        areas.labels.y,
        areas.labels.width + areas.strip.width,
        areas.labels.height,
    );
    row_rect(pane, offset)
}

fn render_root(frame: &mut Frame, areas: &FrameLayout, session: &Session, strip: &Strip, hits: &mut HitMap) {
    let data = session.data();
    if data.worldlines.is_empty() {
        let message = match &data.load_error {
            Some(err) => format!("  no worldlines ({err})"),
            None => "  no worldlines".to_string(),
        };
        render_row(
            frame,
            areas,
            AXIS_ROWS,
            Line::from(Span::styled(message, Style::default().fg(Color::DarkGray))),
            RowCanvas::new(0, 0.0),
        );
        return;
    }
    let visible = usize::from(areas.labels.height.saturating_sub(AXIS_ROWS));
    let selected = session.nav().root_index();
    let first = first_visible(selected, visible);
    let last_col = (strip.content_width - 1.0).max(0.0);
    for (row, (index, wl)) in data.worldlines.iter().enumerate().skip(first).take(visible).enumerate() {
        let is_selected = index == selected;
        let line_color = worldline_color(wl, is_selected);
        let mut style = Style::default().fg(line_color);
        if is_selected {
            style = style.add_modifier(Modifier::BOLD);
        }
        let mut canvas = RowCanvas::new(areas.strip.width, strip.scroll);
        canvas.hline(0.0, last_col, if is_selected { '━' } else { '─' }, style);
        for event in data.events_in(&wl.id) {
            canvas.put(marker_column(event.position, strip), '●', style);
        }
        let offset = AXIS_ROWS + row as u16;
        let label = format!("{} {}%", wl.name, format_value(wl.percentage));
        render_row(frame, areas, offset, label_line(label, is_selected, line_color), canvas);
        if let Some(rect) = item_rect(areas, offset) {
            hits.items.push((rect, index));
        }
    }
}

fn render_branch(
    frame: &mut Frame,
    areas: &FrameLayout,
    session: &Session,
    wl: &Worldline,
    strip: &Strip,
    hits: &mut HitMap,
) {
    let events = session.nav().visible_events(session.data());
    let main_style = Style::default().fg(worldline_color(wl, true)).add_modifier(Modifier::BOLD);
    let last_col = (strip.content_width - 1.0).max(0.0);

    let mut main = RowCanvas::new(areas.strip.width, strip.scroll);
    main.hline(0.0, last_col, '━', main_style);
    for event in &events {
        if resolve_parent(event, &events).is_none() {
            main.put(marker_column(event.position, strip), '┯', main_style);
        }
    }
    render_row(
        frame,
        areas,
        AXIS_ROWS,
        Line::from(Span::styled(format!("  {}", wl.name), main_style)),
        main,
    );

    let list_top = AXIS_ROWS + 1;
    if events.is_empty() {
        render_row(
            frame,
            areas,
            list_top,
            Line::from(Span::styled("  no events", Style::default().fg(Color::DarkGray))),
            RowCanvas::new(0, 0.0),
        );
        return;
    }
    let visible = usize::from(areas.labels.height.saturating_sub(list_top));
    let selected = session.nav().selected_index();
    let first = first_visible(selected, visible);
    let fork_color = worldline_color(wl, false);
    for (row, (index, event)) in events.iter().enumerate().skip(first).take(visible).enumerate() {
        let is_selected = index == selected;
        let mut style = Style::default().fg(if is_selected { worldline_color(wl, true) } else { fork_color });
        if is_selected {
            style = style.add_modifier(Modifier::BOLD);
        }
        let col = marker_column(event.position, strip);
        let from = resolve_parent(event, &events).map_or(col, |p| marker_column(p.position, strip));
        let mut canvas = RowCanvas::new(areas.strip.width, strip.scroll);
        if (from - col).abs() >= 1.0 {
            canvas.hline(from, col, '─', style);
            canvas.put(from, '└', style);
        }
        canvas.put(col, '●', style);
        canvas.text(col + 2.0, &event.title, style);
        let offset = list_top + row as u16;
        render_row(
            frame,
            areas,
            offset,
            label_line(event.date.clone(), is_selected, fork_color),
            canvas,
        );
        if let Some(rect) = item_rect(areas, offset) {
            hits.items.push((rect, index));
        }
    }
}

fn render_individual(
    frame: &mut Frame,
    areas: &FrameLayout,
    session: &Session,
    wl: &Worldline,
    strip: &Strip,
    hits: &mut HitMap,
) {
    let chain = session.nav().visible_events(session.data());
    let selected = session.nav().selected_index();
    let style = Style::default().fg(worldline_color(wl, true)).add_modifier(Modifier::BOLD);
    let mut line = RowCanvas::new(areas.strip.width, strip.scroll);
    if let (Some(first), Some(last)) = (chain.first(), chain.last()) {
        line.hline(
            marker_column(first.position, strip),
            marker_column(last.position, strip),
            '━',
            style,
        );
    }
    for (index, event) in chain.iter().enumerate() {
        let ch = if index == selected { '◉' } else { '●' };
        line.put(marker_column(event.position, strip), ch, style);
    }
    render_row(
        frame,
        areas,
        AXIS_ROWS,
        Line::from(Span::styled(format!("  {}", wl.name), style)),
        line,
    );

    let list_top = AXIS_ROWS + 1;
    let visible = usize::from(areas.labels.height.saturating_sub(list_top));
    let first = first_visible(selected, visible);
    let dim = worldline_color(wl, false);
    for (row, (index, event)) in chain.iter().enumerate().skip(first).take(visible).enumerate() {
        let is_selected = index == selected;
        let mut canvas = RowCanvas::new(areas.strip.width, strip.scroll);
        let col = marker_column(event.position, strip);
        let row_style = if is_selected { style } else { Style::default().fg(dim) };
        canvas.put(col, '│', row_style);
        canvas.text(col + 2.0, &event.title, row_style);
        let offset = list_top + row as u16;
        render_row(
            frame,
            areas,
            offset,
            label_line(event.date.clone(), is_selected, dim),
            canvas,
        );
        if let Some(rect) = item_rect(areas, offset) {
            hits.items.push((rect, index));
        }
    }
}

fn selected_label(session: &Session) -> String {
    let data = session.data();
    match session.nav().view() {
        ViewMode::Root => session
            .nav()
            .current_worldline(data)
            .map_or_else(|| "—".to_string(), |wl| format!("{} {}%", wl.name, format_value(wl.percentage))),
        _ => session
            .nav()
            .selected_event(data)
            .map_or_else(|| "—".to_string(), |e| format!("{} ({})", e.title, e.date)),
    }
}

fn render_status(frame: &mut Frame, area: Rect, data: &RenderData<'_>) {
    let session = data.session;
    let view_label = match session.nav().view() {
        ViewMode::Root => "root",
        ViewMode::Branch { .. } => "branch",
        ViewMode::Individual { .. } => "individual",
    };
    let mut top_status = format!("SELECTED: {}   view: {view_label}", selected_label(session));
    if let Some(phase) = session.sequencer().phase() {
        top_status.push_str(&format!("   [{}]", phase.label()));
    }
    let mut hint_line = data.hints.to_string();
    if let Some(msg) = data.message {
        hint_line.push_str("   ");
        hint_line.push_str(msg);
    }
    let status = Paragraph::new(vec![
        Line::from(Span::styled(
            top_status,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(hint_line, Style::default().fg(Color::DarkGray))),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray))
            .padding(Padding::new(1, 1, 0, 0)),
    );
    frame.render_widget(status, area);
}

fn render_event_modal(frame: &mut Frame, event: &Event, scroll: u16) {
    let area = centered_rect(frame.area(), 70, 64);
    frame.render_widget(Clear, area);
    let key = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::from(vec![Span::styled("date  ", key), Span::raw(event.date.clone())]),
    ];
    if let Some(kind) = &event.kind {
        lines.push(Line::from(vec![Span::styled("type  ", key), Span::raw(kind.clone())]));
    }
    if event.from_text().is_some() || event.to_text().is_some() {
        lines.push(Line::from(vec![
            Span::styled("shift ", key),
            Span::raw(event.from_text().unwrap_or("?").to_string()),
            Span::styled(" → ", key),
            Span::styled(
                event.to_text().unwrap_or("?").to_string(),
                Style::default().fg(NIXIE).add_modifier(Modifier::BOLD),
            ),
        ]));
    }
    lines.push(Line::default());
    match &event.lore {
        Some(lore) => lines.extend(lore.lines().map(|l| Line::from(l.to_string()))),
        None => lines.push(Line::from(Span::styled("(no record)", key))),
    }
    let modal = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Cyan))
                .padding(Padding::new(1, 1, 1, 0))
                .title(Line::from(Span::styled(
                    event.title.clone(),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                )))
                .title_bottom(Line::from(Span::styled(" [j/k] scroll  [Esc] close ", key))),
        );
    frame.render_widget(modal, area);
}

/// Overlay sized by the run's scale and dimmed by its opacity.
fn render_transition(frame: &mut Frame, sequencer: &Sequencer, now_ms: u64) {
    if !sequencer.is_active() {
        return;
    }
    let visual = sequencer.visual(now_ms);
    let text = sequencer.readout().text();
    let area = frame.area();
    let base_width = (nixie::width(&format_value(0.0)) + 4) as f64;
    let base_height = 5.0;
    let width = ((base_width * visual.scale).round() as u16).clamp(3, area.width.max(3));
    let height = ((base_height * visual.scale).round() as u16).clamp(3, area.height.max(3));
    let rect = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width.min(area.width),
        height.min(area.height),
    );
    let tint = color::fade(NIXIE, visual.opacity);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(tint))
        .title(Span::styled(
            sequencer.phase().map_or("", |p| p.label()),
            Style::default().fg(tint),
        ));
    let inner = block.inner(rect);
    frame.render_widget(Clear, rect);
    frame.render_widget(block, rect);
    let mut lines = readout_lines(&text, inner.width, Style::default().fg(tint));
    let pad = usize::from(inner.height).saturating_sub(lines.len()) / 2;
    for _ in 0..pad {
        lines.insert(0, Line::default());
    }
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect(frame.area(), 72, 70);
    frame.render_widget(Clear, area);
    let help = Paragraph::new(vec![
        Line::from("ROOT: every worldline on one shared time axis"),
        Line::from("  ◆ root event   ● event on that worldline"),
        Line::from(""),
        Line::from("FLOW"),
        Line::from("  1) Up/down (j/k or arrows) to highlight a worldline"),
        Line::from("  2) Enter shifts the meter and opens its branch view"),
        Line::from("  3) In a branch: Enter opens an event, i drills into its chain"),
        Line::from("  4) Backspace goes back one level; Esc closes the event first"),
        Line::from(""),
        Line::from("TIME AXIS"),
        Line::from("  h/l or arrows pan, +/- zoom, wheel zooms at the pointer"),
        Line::from("  shift+wheel scrolls, drag to pan"),
        Line::from(""),
        Line::from("METER"),
        Line::from("  m cycles divergence, clock, custom and counter"),
        Line::from("  in custom mode type digits and one dot, Del erases"),
        Line::from(""),
        Line::from("r reloads the data source."),
    ])
    .block(Block::default().title("Help").borders(Borders::ALL));
    frame.render_widget(help, area);
}

fn truncate_text(text: &str, max_width: usize) -> String {
    if text.chars().count() <= max_width {
        return text.to_string();
    }
    if max_width <= 3 {
        return text.chars().take(max_width).collect();
    }
    let mut out = text
        .chars()
        .take(max_width.saturating_sub(3))
        .collect::<String>();
    out.push_str("...");
    out
}

pub fn centered_rect(area: Rect, width_percent: u16, height_percent: u16) -> Rect {
    let vertical = Layout::vertical([
        Constraint::Percentage((100 - height_percent) / 2),
        Constraint::Percentage(height_percent),
        Constraint::Percentage((100 - height_percent) / 2),
    ])
    .flex(Flex::Center)
    .split(area);
    Layout::horizontal([
        Constraint::Percentage((100 - width_percent) / 2),
        Constraint::Percentage(width_percent),
        Constraint::Percentage((100 - width_percent) / 2),
    ])
    .flex(Flex::Center)
    .split(vertical[1])[1]
}
