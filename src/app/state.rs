use anyhow::Result;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, Duration, PrimitiveDateTime};

use crate::calendar::grid::MonthGrid;
use crate::calendar::{today, DateKey, MonthKey};
use crate::config::emotions::EmotionRegistry;
use crate::config::AppConfig;
use crate::diary::{DiaryEntry, DiaryIndex};
use crate::selection::Selection;
use crate::stats::radial::RadialLayout;
use crate::stats::MonthlyStats;
use crate::storage::DiaryStore;

#[derive(Debug, Clone)]
pub enum OverlayState {
    Help,
    ConfirmDelete { entry_id: String, title: String },
}

/// Everything the calendar screen renders from.
///
/// `entries` is the raw diary snapshot in file order; `index` is
/// derived from it and both are replaced together on every refresh.
#[derive(Debug, Clone)]
pub struct AppState {
    pub month: MonthKey,
    pub cursor: DateKey,
    pub today: Date,
    pub entries: Vec<DiaryEntry>,
    pub index: DiaryIndex,
    pub selection: Selection,
    pub entry_cursor: usize,
    pub overlay: Option<OverlayState>,
    pub status_message: Option<String>,
    pub registry: EmotionRegistry,
    pub chart: RadialLayout,
    pub show_count_badge: bool,
}

impl AppState {
    pub fn load(config: &AppConfig, store: &DiaryStore) -> Result<Self> {
        let entries = store.fetch_all()?;
        let index = DiaryIndex::build(&entries);
        let today = today();

        Ok(Self {
            month: MonthKey::from_date(today),
            cursor: DateKey::from_date(today),
            today,
            entries,
            index,
            selection: Selection::default(),
            entry_cursor: 0,
            overlay: None,
            status_message: None,
            registry: config.emotion_registry(),
            chart: config.radial_layout(),
            show_count_badge: config.calendar.show_count_badge,
        })
    }

    /// Re-reads the diary, rebuilds the index, and revalidates the
    /// selection. If the read fails the previous snapshot stays
    /// untouched.
    pub fn refresh(&mut self, store: &DiaryStore) -> Result<()> {
        let entries = store.fetch_all()?;
        self.entries = entries;
        self.index = DiaryIndex::build(&self.entries);
        self.selection = self.selection.refresh_after_mutation(&self.index);
        self.clamp_entry_cursor();
        Ok(())
    }

    pub fn refresh_today(&mut self) {
        self.today = today();
    }

    pub fn grid(&self) -> MonthGrid {
        MonthGrid::build(self.month, &self.index, self.today)
    }

    pub fn month_stats(&self) -> MonthlyStats {
        MonthlyStats::aggregate(&self.index, self.month)
    }

    pub fn selected_entries(&self) -> &[DiaryEntry] {
        self.selection
            .selected_date()
            .map(|date| self.index.entries_on(date))
            .unwrap_or(&[])
    }

    pub fn go_to_today(&mut self) {
        self.refresh_today();
        self.cursor = DateKey::from_date(self.today);
        self.month = MonthKey::from_date(self.today);
    }

    pub fn previous_month(&mut self) {
        self.month = self.month.previous();
        self.snap_cursor_to_month();
    }

    pub fn next_month(&mut self) {
        self.month = self.month.next();
        self.snap_cursor_to_month();
    }

    fn snap_cursor_to_month(&mut self) {
        self.cursor = self.month.day_key(self.cursor.day());
    }

    /// Moves the cursor by whole days; the visible month follows the
    /// cursor across month boundaries.
    pub fn move_cursor(&mut self, days: i64) {
        let Some(next) = self.cursor.date().checked_add(Duration::days(days)) else {
            return;
        };
        self.cursor = DateKey::from_date(next);
        if !self.month.contains(self.cursor) {
            self.month = self.cursor.month_key();
        }
    }

    /// Opens the detail view for the cursor day. Days without entries
    /// are not selectable; attempting it only posts a status note.
    pub fn select_cursor_day(&mut self) {
        if self.index.entries_on(self.cursor).is_empty() {
            self.set_status_message(Some(format!("No diary entries on {}", self.cursor)));
            return;
        }
        self.selection = self.selection.select_date(self.cursor);
        self.entry_cursor = 0;
    }

    pub fn close_detail(&mut self) {
        self.selection = self.selection.close();
        self.entry_cursor = 0;
    }

    pub fn move_entry_cursor(&mut self, delta: isize) {
        let len = self.selected_entries().len();
        if len == 0 {
            return;
        }
        let current = self.entry_cursor as isize;
        let mut next = current + delta;
        if next < 0 {
            next = 0;
        } else if next >= len as isize {
            next = len as isize - 1;
        }
        self.entry_cursor = next as usize;
    }

    fn clamp_entry_cursor(&mut self) {
        let len = self.selected_entries().len();
        if len == 0 {
            self.entry_cursor = 0;
        } else if self.entry_cursor >= len {
            self.entry_cursor = len - 1;
        }
    }

    pub fn highlighted_entry(&self) -> Option<&DiaryEntry> {
        self.selected_entries().get(self.entry_cursor)
    }

    pub fn toggle_highlighted_entry(&mut self) {
        let Some(id) = self.highlighted_entry().map(|entry| entry.id.clone()) else {
            return;
        };
        self.selection = self.selection.toggle_entry(&id);
    }

    pub fn expanded_entry(&self) -> Option<&DiaryEntry> {
        let id = self.selection.expanded_entry()?;
        self.selected_entries().iter().find(|entry| entry.id == id)
    }

    pub fn request_delete_highlighted(&mut self) {
        match self.highlighted_entry() {
            Some(entry) => {
                self.overlay = Some(OverlayState::ConfirmDelete {
                    entry_id: entry.id.clone(),
                    title: entry.title.clone(),
                });
            }
            None => self.set_status_message(Some("No entry to delete")),
        }
    }

    pub fn confirm_delete_overlay(&self) -> Option<(&str, &str)> {
        match self.overlay.as_ref() {
            Some(OverlayState::ConfirmDelete { entry_id, title }) => {
                Some((entry_id.as_str(), title.as_str()))
            }
            _ => None,
        }
    }

    pub fn open_help(&mut self) {
        self.overlay = Some(OverlayState::Help);
    }

    pub fn close_overlay(&mut self) {
        self.overlay = None;
    }

    pub fn set_status_message<S: Into<String>>(&mut self, message: Option<S>) {
        self.status_message = message.map(Into::into);
    }

    /// Clock time of an entry for the detail view, shortened to `HH:MM`
    /// when the timestamp falls on the entry's own day.
    pub fn created_at_label(&self, entry: &DiaryEntry) -> Option<String> {
        let raw = entry.created_at.as_deref()?;
        Some(format_created_at(raw, entry.date_key()))
    }
}

const CREATED_AT_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

fn format_created_at(raw: &str, entry_day: Option<DateKey>) -> String {
    let trimmed = raw.trim();
    let candidate = trimmed.replace(' ', "T");
    let Some(prefix) = candidate.get(..19) else {
        return trimmed.to_string();
    };
    let Ok(stamp) = PrimitiveDateTime::parse(prefix, CREATED_AT_FORMAT) else {
        return trimmed.to_string();
    };
    let same_day = entry_day
        .map(|day| day.date() == stamp.date())
        .unwrap_or(false);
    if same_day {
        format!("{:02}:{:02}", stamp.hour(), stamp.minute())
    } else {
        format!(
            "{} {:02}:{:02}",
            DateKey::from_date(stamp.date()),
            stamp.hour(),
            stamp.minute()
        )
    }
}
