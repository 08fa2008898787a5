use crate::app::{App, Focus};
use crate::diary_entry::DiaryEntry;
use crate::diary_state::NotificationKind;
use crate::entry_item::can_edit;
use color_eyre::Result;
use crossterm::{
    event::{self, Event, KeyEvent},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io::{self, stdout, Stdout};
use std::time::Duration;
use unicode_width::UnicodeWidthChar;

const PLACEHOLDER: &str = "What's on your mind today?";
const EMPTY_LIST: &str = "No entries yet. Start writing your first diary entry above!";

pub struct UI {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

/// Installs color-eyre with a panic hook that gives the terminal back before
/// the report is printed, so it does not vanish with the alternate screen.
pub fn install_hooks() -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install()?;
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        eprintln!("{}", panic_hook.panic_report(info));
    }));
    Ok(())
}

/// Leaves the alternate screen and raw mode. Safe to call more than once.
pub fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

impl UI {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        let terminal = stdout()
            .execute(EnterAlternateScreen)
            .and_then(|_| Terminal::new(CrosstermBackend::new(stdout())));
        match terminal {
            Ok(terminal) => Ok(UI { terminal }),
            Err(err) => {
                let _ = restore_terminal();
                Err(err.into())
            }
        }
    }

    pub fn display(&mut self, app: &App) -> Result<()> {
        self.terminal.draw(|f| render(f, app))?;
        Ok(())
    }

    /// Waits up to `timeout` for a key event.
    pub fn next_key(&self, timeout: Duration) -> Result<Option<KeyEvent>> {
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                return Ok(Some(key));
            }
        }
        Ok(None)
    }

    /// Throws away input that queued up while a request was in flight.
    pub fn discard_pending_input(&self) -> Result<usize> {
        let dropped = drain_events(|| event::poll(Duration::ZERO), event::read)?;
        if dropped > 0 {
            tracing::debug!(dropped, "discarded input typed during a request");
        }
        Ok(dropped)
    }
}

fn drain_events(
    mut poll: impl FnMut() -> io::Result<bool>,
    mut read: impl FnMut() -> io::Result<Event>,
) -> io::Result<usize> {
    let mut dropped = 0;
    while poll()? {
        read()?;
        dropped += 1;
    }
    Ok(dropped)
}

impl Drop for UI {
    fn drop(&mut self) {
        let _ = restore_terminal();
    }
}

pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(7),
            Constraint::Min(4),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_header(f, chunks[0]);
    render_form(f, app, chunks[1]);
    render_entries(f, app, chunks[2]);
    render_toast(f, app, chunks[3]);
    render_controls(f, app, chunks[4]);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            "My Personal Diary",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Record your thoughts, reflections, and experiences",
            Style::default().fg(Color::Gray),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(header, area);
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn render_form(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus() == Focus::Form && app.editing().is_none();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(focused))
        .title("New Entry");

    let text = if app.form.is_empty() && !focused {
        Text::from(Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray)))
    } else {
        Text::from(
            app.form
                .input
                .render_with_cursor(focused && app.cursor_visible()),
        )
    };
    let form = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(form, area);
}

fn render_entries(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus() == Focus::List || app.editing().is_some();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(focused))
        .title("Your Entries");

    let entries = app.diary.get_entries();
    if entries.is_empty() {
        let empty = Paragraph::new(EMPTY_LIST)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    // Borders plus the highlight symbol.
    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = entries
        .iter()
        .map(|entry| entry_item(app, entry, width))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let selected = focused.then_some(app.selected());
    f.render_stateful_widget(list, area, &mut ListState::default().with_selected(selected));
}

fn entry_item(app: &App, entry: &DiaryEntry, width: usize) -> ListItem<'static> {
    let mut header = vec![Span::styled(
        entry.created_label(),
        Style::default().fg(Color::Gray),
    )];
    if entry.is_completed() {
        header.push(Span::raw("  "));
        header.push(Span::styled(
            "[Completed]",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Gray),
        ));
    }
    let mut lines = vec![Line::from(header)];

    match app.editing() {
        Some(session) if session.id == entry.id => {
            let edited = session.input.render_with_cursor(app.cursor_visible());
            for line in edited.split('\n') {
                lines.push(Line::from(Span::styled(
                    line.to_string(),
                    Style::default().fg(Color::Yellow),
                )));
            }
        }
        _ => {
            let style = if entry.is_completed() {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(
                truncate_to_width(entry.headline(), width),
                style,
            )));
        }
    }
    lines.push(Line::from(""));
    ListItem::new(lines)
}

fn render_toast(f: &mut Frame, app: &App, area: Rect) {
    let line = if let Some(label) = app.pending() {
        Line::from(Span::styled(label, Style::default().fg(Color::Cyan)))
    } else if let Some(toast) = app.current_toast() {
        let color = match toast.kind {
            NotificationKind::Info => Color::Green,
            NotificationKind::Error => Color::Red,
        };
        let text = if toast.message.is_empty() {
            toast.title.clone()
        } else {
            format!("{}: {}", toast.title, toast.message)
        };
        Line::from(Span::styled(
            truncate_to_width(&text, area.width as usize),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from("")
    };
    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn key_hint<'a>(key: &'a str, label: &'a str, enabled: bool) -> Vec<Span<'a>> {
    let (key_style, label_style) = if enabled {
        (Style::default().add_modifier(Modifier::BOLD), Style::default())
    } else {
        (
            Style::default().fg(Color::DarkGray),
            Style::default().fg(Color::DarkGray),
        )
    };
    vec![
        Span::styled(key, key_style),
        Span::styled(format!(" {label}  "), label_style),
    ]
}

fn render_controls(f: &mut Frame, app: &App, area: Rect) {
    let hints: Vec<(&str, &str, bool)> = if app.editing().is_some() {
        vec![("Ctrl+S", "save", true), ("Esc", "cancel", true)]
    } else {
        match app.focus() {
            Focus::Form => vec![
                ("Ctrl+S", "add entry", true),
                ("Tab", "entries", true),
                ("Ctrl+C", "quit", true),
            ],
            Focus::List => {
                let selected = app.selected_entry();
                let has_entry = selected.is_some();
                let editable = selected.map(can_edit).unwrap_or(false);
                vec![
                    ("Space", "toggle", has_entry),
                    ("e", "edit", editable),
                    ("d", "delete", has_entry),
                    ("r", "reload", true),
                    ("Tab", "write", true),
                    ("q", "quit", true),
                ]
            }
        }
    };

    let spans: Vec<Span> = hints
        .into_iter()
        .flat_map(|(key, label, enabled)| key_hint(key, label, enabled))
        .collect();
    let controls = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center);
    f.render_widget(controls, area);
}

/// Cuts `text` to at most `max` terminal columns, marking the cut with `…`.
pub fn truncate_to_width(text: &str, max: usize) -> String {
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= max {
        return text.to_string();
    }
    let budget = max.saturating_sub(1);
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    if max > 0 {
        out.push('…');
    }
    out
}
