use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use std::f64::consts::{FRAC_PI_2, TAU};
use time::Month;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::{AppState, OverlayState};
use crate::calendar::grid::{DayCell, GridCell};
use crate::calendar::DateKey;
use crate::config::emotions::EmotionRegistry;
use crate::diary::DiaryEntry;
use crate::stats::radial::LayoutEntry;
use crate::stats::MonthlyStats;

pub fn draw_app(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(2)])
        .split(frame.size());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
        .split(vertical[0]);

    render_calendar(frame, state, columns[0]);
    render_stats(frame, state, columns[1]);

    let status = build_status_line(state);
    let status_paragraph = Paragraph::new(status).style(Style::default().fg(Color::Gray));
    frame.render_widget(status_paragraph, vertical[1]);

    render_overlay(frame, state, list_state);
}

fn render_calendar(frame: &mut Frame, state: &AppState, area: Rect) {
    let grid = state.grid();
    let block_style = if state.selection.is_idle() {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let block = Block::default()
        .title(format!(
            "{} {}",
            month_name(state.month.month()),
            state.month.year()
        ))
        .borders(Borders::ALL)
        .border_style(block_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let header = grid
        .weekdays
        .iter()
        .map(|label| format!("{label}  "))
        .collect::<String>();
    let mut lines = Vec::with_capacity(2 + grid.cells.len() / 7);
    lines.push(Line::from(Span::styled(
        header,
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )));
    for week in grid.weeks() {
        let mut spans = Vec::with_capacity(week.len() * 4);
        for cell in week {
            match cell {
                GridCell::Blank => spans.push(Span::raw("     ")),
                GridCell::Day(day) => spans.extend(day_cell_spans(
                    day,
                    state.cursor,
                    &state.registry,
                    state.show_count_badge,
                )),
            }
        }
        lines.push(Line::from(spans));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

/// One calendar cell is five columns: a right-aligned day number, a mood
/// marker, a count badge, and a separator space.
fn day_cell_spans(
    cell: &DayCell,
    cursor: DateKey,
    registry: &EmotionRegistry,
    show_badge: bool,
) -> Vec<Span<'static>> {
    let selected = cell.date == cursor;
    let base = if selected {
        Style::default()
            .bg(Color::Blue)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    } else if cell.is_today {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else if cell.is_clickable() {
        Style::default()
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let mut spans = vec![Span::styled(format!("{:>2}", cell.day), base)];
    match &cell.emotion {
        Some(tag) => {
            let mut marker = Style::default().fg(emotion_color(registry, tag));
            if selected {
                marker = marker.bg(Color::Blue);
            }
            spans.push(Span::styled("●", marker));
        }
        None => spans.push(Span::styled(" ", base)),
    }
    if show_badge && cell.entry_count > 1 {
        let badge = if cell.entry_count > 9 {
            '+'
        } else {
            (b'0' + cell.entry_count as u8) as char
        };
        let style = if selected {
            base
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(badge.to_string(), style));
    } else {
        spans.push(Span::styled(" ", base));
    }
    spans.push(Span::raw(" "));
    spans
}

fn render_stats(frame: &mut Frame, state: &AppState, area: Rect) {
    let stats = state.month_stats();
    let legend = legend_lines(&stats, &state.registry);
    let legend_height = (legend.len() as u16).min(10) + 2;
    let panels = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(7), Constraint::Length(legend_height)])
        .split(area);

    render_mood_wheel(frame, state, &stats, panels[0]);

    let legend_paragraph = Paragraph::new(legend)
        .block(Block::default().title("This Month").borders(Borders::ALL));
    frame.render_widget(legend_paragraph, panels[1]);
}

fn render_mood_wheel(frame: &mut Frame, state: &AppState, stats: &MonthlyStats, area: Rect) {
    let block = Block::default().title("Mood Wheel").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width < 8 || inner.height < 4 {
        return;
    }

    if stats.is_empty() {
        let message = "No diary entries this month";
        let pad = usize::from(inner.width).saturating_sub(message.width()) / 2;
        let mut lines = vec![Line::from(""); usize::from(inner.height / 2)];
        lines.push(Line::from(Span::styled(
            format!("{}{message}", " ".repeat(pad)),
            Style::default().fg(Color::DarkGray),
        )));
        frame.render_widget(Paragraph::new(lines), inner);
        return;
    }

    // A terminal cell is roughly twice as tall as it is wide, so horizontal
    // distances are halved to keep the disc round on screen.
    let radius = f64::from(inner.height.min(inner.width / 2)) / 2.0;
    let layout = state.chart.layout(stats, radius);
    let lines = wheel_lines(&layout, &state.registry, inner.width, inner.height, radius);
    frame.render_widget(Paragraph::new(lines), inner);
}

fn wheel_lines(
    layout: &[LayoutEntry],
    registry: &EmotionRegistry,
    width: u16,
    height: u16,
    radius: f64,
) -> Vec<Line<'static>> {
    let width = usize::from(width);
    let height = usize::from(height);
    let cx = width as f64 / 2.0;
    let cy = height as f64 / 2.0;

    let mut cells = vec![vec![(' ', Style::default()); width]; height];
    for (row, row_cells) in cells.iter_mut().enumerate() {
        for (col, cell) in row_cells.iter_mut().enumerate() {
            let dx = (col as f64 - cx + 0.5) * 0.5;
            let dy = row as f64 - cy + 0.5;
            if (dx * dx + dy * dy).sqrt() > radius {
                continue;
            }
            if let Some(entry) = segment_at(layout, screen_angle(dx, dy)) {
                *cell = (
                    '█',
                    Style::default().fg(emotion_color(registry, &entry.emotion)),
                );
            }
        }
    }

    let label_style = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    for entry in layout {
        let label = format!("{} ({:.1}%)", entry.count, entry.fraction * 100.0);
        let row = (cy + entry.label_y).round();
        if row < 0.0 || row >= height as f64 {
            continue;
        }
        let row = row as usize;
        let anchor = cx + entry.label_x * 2.0;
        let start = (anchor - label.len() as f64 / 2.0).round() as isize;
        let start = start.clamp(0, (width as isize - label.len() as isize).max(0)) as usize;
        for (offset, ch) in label.chars().enumerate() {
            let col = start + offset;
            if col >= width {
                break;
            }
            cells[row][col] = (ch, label_style);
        }
    }

    cells
        .into_iter()
        .map(|row| {
            let mut spans = Vec::new();
            let mut run = String::new();
            let mut run_style = Style::default();
            for (ch, style) in row {
                if style != run_style && !run.is_empty() {
                    spans.push(Span::styled(std::mem::take(&mut run), run_style));
                }
                run_style = style;
                run.push(ch);
            }
            if !run.is_empty() {
                spans.push(Span::styled(run, run_style));
            }
            Line::from(spans)
        })
        .collect()
}

/// One legend row per configured mood, zero counts included, plus a trailing
/// row for any tag found in the diary that the active set does not know,
/// styled like the default mood but labelled with its own tag.
fn legend_lines(stats: &MonthlyStats, registry: &EmotionRegistry) -> Vec<Line<'static>> {
    let mut lines = Vec::with_capacity(registry.all().len());
    for style in registry.all() {
        lines.push(legend_row(
            style.glyph,
            style.label,
            style.color,
            stats.count_for(style.tag),
            stats.total,
        ));
    }
    for stat in &stats.stats {
        if !registry.contains(&stat.emotion) {
            let fallback = registry.style_or_default(&stat.emotion);
            lines.push(legend_row(
                fallback.glyph,
                &stat.emotion,
                fallback.color,
                stat.count,
                stats.total,
            ));
        }
    }
    lines
}

fn legend_row(
    glyph: &str,
    label: &str,
    color: Color,
    count: usize,
    total: usize,
) -> Line<'static> {
    let percent = if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    };
    let count_style = if count == 0 {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    Line::from(vec![
        Span::styled("■ ", Style::default().fg(color)),
        Span::raw(format!("{glyph} {:<12}", truncate_to_width(label, 12))),
        Span::styled(format!("{count:>3}"), count_style),
        Span::styled(
            format!("  {percent:>5.1}%"),
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

fn build_status_line(state: &AppState) -> Text<'static> {
    let stats = state.month_stats();
    let mut spans = vec![
        Span::styled(
            format!("{} {}", month_name(state.month.month()), state.month.year()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            " · {} {} this month",
            stats.total,
            if stats.total == 1 { "entry" } else { "entries" }
        )),
        Span::raw(" | Day: "),
        Span::styled(
            state.cursor.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | Moods: "),
        Span::raw(state.registry.set().to_string()),
    ];
    if let Some(message) = &state.status_message {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            message.clone(),
            Style::default().fg(Color::Cyan),
        ));
    }

    let mut lines = Vec::with_capacity(2);
    lines.push(Line::from(spans));

    let mut keys = Vec::new();
    keys.push(Span::styled(
        "Keys: ",
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::BOLD),
    ));
    keys.push(Span::styled(
        "h/l month • arrows move • Enter open • j/k entries • d delete • t today • r reload • ? help • q quit",
        Style::default().fg(Color::DarkGray),
    ));
    lines.push(Line::from(keys));

    Text::from(lines)
}

fn month_name(month: Month) -> &'static str {
    match month {
        Month::January => "January",
        Month::February => "February",
        Month::March => "March",
        Month::April => "April",
        Month::May => "May",
        Month::June => "June",
        Month::July => "July",
        Month::August => "August",
        Month::September => "September",
        Month::October => "October",
        Month::November => "November",
        Month::December => "December",
    }
}

/// Maps a screen-space offset (x right, y down) onto the wheel's angle
/// domain, which starts at twelve o'clock and grows clockwise.
fn screen_angle(dx: f64, dy: f64) -> f64 {
    let angle = dy.atan2(dx);
    if angle < -FRAC_PI_2 {
        angle + TAU
    } else {
        angle
    }
}

fn segment_at(layout: &[LayoutEntry], angle: f64) -> Option<&LayoutEntry> {
    layout
        .iter()
        .find(|entry| angle < entry.end_angle())
        .or_else(|| layout.last())
}

fn emotion_color(registry: &EmotionRegistry, tag: &str) -> Color {
    registry.style_or_default(tag).color
}

fn truncate_to_width(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if text.width() <= max_width {
        return text.to_string();
    }
    let limit = max_width.saturating_sub(1);
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > limit {
            break;
        }
        used += ch_width;
        out.push(ch);
    }
    out.push('…');
    out
}


fn render_overlay(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    if !state.selection.is_idle() {
        render_detail(frame, state, list_state);
    }
    match &state.overlay {
        Some(OverlayState::Help) => render_help(frame),
        Some(OverlayState::ConfirmDelete { title, .. }) => render_confirm_delete(frame, title),
        None => {}
    }
}

fn render_detail(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    let Some(date) = state.selection.selected_date() else {
        return;
    };
    let entries = state.selected_entries();
    let area = centered_rect(64, 70, frame.size());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(format!(
            "{date} · {} {}",
            entries.len(),
            if entries.len() == 1 { "entry" } else { "entries" }
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let expanded = state.expanded_entry();
    let (list_area, body_area) = if expanded.is_some() {
        let halves = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(inner);
        (halves[0], Some(halves[1]))
    } else {
        (inner, None)
    };

    let mut items: Vec<ListItem> = entries
        .iter()
        .map(|entry| list_item_for(entry, state))
        .collect();
    if items.is_empty() {
        items.push(ListItem::new("No entries on this day."));
    }
    let list = List::new(items)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");
    frame.render_stateful_widget(list, list_area, list_state);

    if let (Some(entry), Some(body_area)) = (expanded, body_area) {
        render_expanded_entry(frame, state, entry, body_area);
    }
}

fn list_item_for(entry: &DiaryEntry, state: &AppState) -> ListItem<'static> {
    let glyph = state.registry.style_or_default(&entry.emotion).glyph;
    let mut spans = vec![
        Span::raw(format!("{glyph} ")),
        Span::styled(
            entry.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ];
    if let Some(written) = state.created_at_label(entry) {
        spans.push(Span::styled(
            format!("  {written}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    ListItem::new(Line::from(spans))
}

fn render_expanded_entry(frame: &mut Frame, state: &AppState, entry: &DiaryEntry, area: Rect) {
    let style = state.registry.style_or_default(&entry.emotion);
    let lines = expanded_entry_lines(entry, state, usize::from(area.width));

    let title_width = usize::from(area.width).saturating_sub(4);
    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(truncate_to_width(&entry.title, title_width))
                .borders(Borders::TOP)
                .border_style(Style::default().fg(style.border)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// Body of the expanded entry: an emotion chip, the authoring time, the
/// content, then one line per attached image reference. Tags outside the
/// active set take the default mood's styling but keep their own name.
fn expanded_entry_lines(entry: &DiaryEntry, state: &AppState, width: usize) -> Vec<Line<'static>> {
    let style = state.registry.style_or_default(&entry.emotion);
    let label = state
        .registry
        .style(&entry.emotion)
        .map(|known| known.label.to_string())
        .unwrap_or_else(|| entry.emotion.clone());

    let mut lines = Vec::new();
    lines.push(Line::from(Span::styled(
        format!(" {} {label} ", style.glyph),
        Style::default()
            .fg(style.color)
            .bg(style.background)
            .add_modifier(Modifier::BOLD),
    )));
    if let Some(written) = state.created_at_label(entry) {
        lines.push(Line::from(Span::styled(
            format!("written {written}"),
            Style::default().fg(Color::Gray),
        )));
    }
    lines.push(Line::from(""));
    if entry.content.trim().is_empty() {
        lines.push(Line::from(Span::styled(
            "(no content)",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        lines.extend(entry.content.lines().map(|line| Line::from(line.to_string())));
    }
    if !entry.images.is_empty() {
        lines.push(Line::from(""));
        for image in &entry.images {
            lines.push(Line::from(Span::styled(
                truncate_to_width(image, width),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }
    lines
}

fn render_confirm_delete(frame: &mut Frame, title: &str) {
    let area = centered_rect(50, 24, frame.size());
    frame.render_widget(Clear, area);
    let paragraph = Paragraph::new(vec![
        Line::from(Span::styled(
            "Delete Entry",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("Delete '{title}' for good?")),
        Line::from(""),
        Line::from(Span::styled(
            "y delete • n / Esc keep",
            Style::default().fg(Color::Gray),
        )),
    ])
    .block(
        Block::default()
            .title("Confirm Delete")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    )
    .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

const HELP_ROWS: &[(&str, &str)] = &[
    ("h / l", "previous / next month"),
    ("arrows", "move the cursor by day, up/down by week"),
    ("t", "jump to today"),
    ("Enter", "open the highlighted day, expand an entry"),
    ("j / k", "walk the entries of an open day"),
    ("d", "delete the highlighted entry"),
    ("Esc", "close the day view"),
    ("r", "reload the diary file"),
    ("?", "this help"),
    ("q", "quit"),
];

fn render_help(frame: &mut Frame) {
    let area = centered_rect(60, 60, frame.size());
    frame.render_widget(Clear, area);
    let mut lines = vec![
        Line::from(Span::styled(
            "Keys",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    for (keys, action) in HELP_ROWS {
        lines.push(Line::from(vec![
            Span::styled(format!("{keys:>8}"), Style::default().fg(Color::Cyan)),
            Span::raw("  "),
            Span::raw(*action),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(Color::Gray),
    )));
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title("Help")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta)),
    );
    frame.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(vertical[1])[1]
}
