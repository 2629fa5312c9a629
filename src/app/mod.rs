use std::io::Stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::widgets::ListState;
use ratatui::Terminal;

use crate::config::AppConfig;
use crate::storage::DiaryStore;
use crate::ui;

pub mod state;

pub use state::{AppState, OverlayState};

enum Action {
    Quit,
    PreviousMonth,
    NextMonth,
    MoveCursor(i64),
    GoToToday,
    OpenDay,
    CloseDetail,
    MoveEntryCursor(isize),
    ToggleEntry,
    RequestDelete,
    Reload,
    ShowHelp,
}

pub struct App {
    pub config: Arc<AppConfig>,
    pub store: DiaryStore,
    state: AppState,
    list_state: ListState,
    should_quit: bool,
    tick_rate: Duration,
}

impl App {
    pub fn new(config: Arc<AppConfig>, store: DiaryStore) -> Result<Self> {
        let state =
            AppState::load(&config, &store).context("loading the diary for the initial screen")?;
        Ok(Self {
            config,
            store,
            state,
            list_state: ListState::default(),
            should_quit: false,
            tick_rate: Duration::from_millis(250),
        })
    }

    pub fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;
        let result = self.event_loop(&mut terminal);
        restore_terminal(&mut terminal)?;
        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let mut last_tick = Instant::now();
        loop {
            terminal
                .draw(|frame| {
                    if self.state.selected_entries().is_empty() {
                        self.list_state.select(None);
                    } else {
                        self.list_state.select(Some(self.state.entry_cursor));
                    }
                    ui::draw_app(frame, &self.state, &mut self.list_state);
                })
                .context("rendering frame")?;

            if self.should_quit {
                break;
            }

            let timeout = self
                .tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_millis(0));

            if event::poll(timeout).context("polling for terminal events")? {
                match event::read().context("reading terminal event")? {
                    Event::Key(key) => self.handle_key(key),
                    Event::Resize(_, _) => {
                        // no-op: next draw will naturally adapt to the new size
                    }
                    _ => {}
                }
            }

            if last_tick.elapsed() >= self.tick_rate {
                self.on_tick();
                last_tick = Instant::now();
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.handle_overlay_key(key) {
            return;
        }

        if let Some(action) = self.map_key(key) {
            self.handle_action(action);
        }
    }

    /// Keys mean different things while the day-detail panel is open:
    /// vertical movement walks the entry list instead of the calendar
    /// weeks, Enter toggles the highlighted entry instead of opening a
    /// day, and `d` becomes available for deletion.
    fn map_key(&self, key: KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => Some(Action::Quit),
                _ => None,
            };
        }
        if key
            .modifiers
            .intersects(KeyModifiers::ALT | KeyModifiers::SUPER)
        {
            return None;
        }

        let detail_open = !self.state.selection.is_idle();
        match key.code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('?') => Some(Action::ShowHelp),
            KeyCode::Char('r') => Some(Action::Reload),
            KeyCode::Char('t') => Some(Action::GoToToday),
            KeyCode::Char('h') => Some(Action::PreviousMonth),
            KeyCode::Char('l') => Some(Action::NextMonth),
            KeyCode::Esc => {
                if detail_open {
                    Some(Action::CloseDetail)
                } else {
                    None
                }
            }
            KeyCode::Enter => {
                if detail_open {
                    Some(Action::ToggleEntry)
                } else {
                    Some(Action::OpenDay)
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if detail_open {
                    Some(Action::MoveEntryCursor(-1))
                } else {
                    Some(Action::MoveCursor(-7))
                }
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if detail_open {
                    Some(Action::MoveEntryCursor(1))
                } else {
                    Some(Action::MoveCursor(7))
                }
            }
            KeyCode::Left => Some(Action::MoveCursor(-1)),
            KeyCode::Right => Some(Action::MoveCursor(1)),
            KeyCode::Char('d') if detail_open => Some(Action::RequestDelete),
            _ => None,
        }
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::PreviousMonth => self.state.previous_month(),
            Action::NextMonth => self.state.next_month(),
            Action::MoveCursor(days) => self.state.move_cursor(days),
            Action::GoToToday => self.state.go_to_today(),
            Action::OpenDay => self.state.select_cursor_day(),
            Action::CloseDetail => self.state.close_detail(),
            Action::MoveEntryCursor(delta) => self.state.move_entry_cursor(delta),
            Action::ToggleEntry => self.state.toggle_highlighted_entry(),
            Action::RequestDelete => self.state.request_delete_highlighted(),
            Action::Reload => self.reload(Some("Diary reloaded")),
            Action::ShowHelp => self.state.open_help(),
        }
    }

    fn on_tick(&mut self) {
        // Keeps the today marker honest across midnight.
        self.state.refresh_today();
    }

    fn handle_overlay_key(&mut self, key: KeyEvent) -> bool {
        let Some(overlay) = self.state.overlay.clone() else {
            return false;
        };
        match overlay {
            OverlayState::Help => {
                self.state.close_overlay();
                true
            }
            OverlayState::ConfirmDelete { entry_id, title } => {
                match key.code {
                    KeyCode::Char('y' | 'Y') | KeyCode::Enter => {
                        self.state.close_overlay();
                        self.delete_entry(&entry_id, &title);
                    }
                    KeyCode::Esc | KeyCode::Char('n' | 'N') => {
                        self.state.close_overlay();
                        self.state.set_status_message(Some("Delete canceled"));
                    }
                    _ => {}
                }
                true
            }
        }
    }

    fn delete_entry(&mut self, entry_id: &str, title: &str) {
        match self.store.delete_entry(entry_id) {
            Ok(_) => self.reload(Some(format!("Deleted '{title}'"))),
            Err(err) => {
                tracing::error!(?err, "failed to delete diary entry");
                self.state
                    .set_status_message(Some(format!("Delete failed: {err}")));
            }
        }
    }

    fn reload<S: Into<String>>(&mut self, message: Option<S>) {
        match self.state.refresh(&self.store) {
            Ok(()) => self.state.set_status_message(message),
            Err(err) => {
                tracing::error!(?err, "failed to reload the diary");
                self.state
                    .set_status_message(Some(format!("Reload failed: {err}")));
            }
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("switching to alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("creating terminal backend")?;
    terminal.hide_cursor().context("hiding cursor")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    terminal.show_cursor().ok();
    disable_raw_mode().context("disabling raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("restoring screen state")?;
    Ok(())
}
