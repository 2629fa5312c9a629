use time::Date;

use crate::calendar::{DateKey, MonthKey};
use crate::diary::DiaryIndex;

/// Column headers for the Sunday-first week row.
pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// One day square of the month page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    /// 1-based day of month.
    pub day: u8,
    pub date: DateKey,
    pub is_today: bool,
    /// Emotion of the first entry recorded that day, in source order.
    pub emotion: Option<String>,
    pub entry_count: usize,
}

impl DayCell {
    /// Only days with at least one entry open the detail view.
    pub fn is_clickable(&self) -> bool {
        self.entry_count > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridCell {
    Blank,
    Day(DayCell),
}

/// Row-major cell model for one month page: leading blanks up to the
/// weekday of the 1st, then one cell per day. The final row is left
/// ragged; rendering pads it as needed, so page height varies by month.
#[derive(Debug, Clone)]
pub struct MonthGrid {
    pub month: MonthKey,
    pub weekdays: [&'static str; 7],
    pub cells: Vec<GridCell>,
}

impl MonthGrid {
    /// Derives the page for `month` from the current index. `today` is
    /// passed in rather than read from the clock so at most one cell is
    /// ever marked, and only when the page shows the current month.
    pub fn build(month: MonthKey, index: &DiaryIndex, today: Date) -> Self {
        let first = month.first_day();
        let leading = usize::from(first.weekday().number_days_from_sunday());
        let day_count = month.day_count();

        let mut cells = Vec::with_capacity(leading + usize::from(day_count));
        for _ in 0..leading {
            cells.push(GridCell::Blank);
        }

        let mut date = first;
        for day in 1..=day_count {
            let key = DateKey::from_date(date);
            let bucket = index.entries_on(key);
            cells.push(GridCell::Day(DayCell {
                day,
                date: key,
                is_today: date == today,
                emotion: bucket.first().map(|entry| entry.emotion.clone()),
                entry_count: bucket.len(),
            }));
            if day < day_count {
                date = date.next_day().unwrap_or(date);
            }
        }

        Self {
            month,
            weekdays: WEEKDAY_LABELS,
            cells,
        }
    }

    pub fn leading_blanks(&self) -> usize {
        self.cells
            .iter()
            .take_while(|cell| matches!(cell, GridCell::Blank))
            .count()
    }

    pub fn day_cells(&self) -> impl Iterator<Item = &DayCell> + '_ {
        self.cells.iter().filter_map(|cell| match cell {
            GridCell::Day(day) => Some(day),
            GridCell::Blank => None,
        })
    }

    /// Calendar rows, seven columns wide; the last row may be short.
    pub fn weeks(&self) -> std::slice::Chunks<'_, GridCell> {
        self.cells.chunks(7)
    }

    pub fn cell_at(&self, date: DateKey) -> Option<&DayCell> {
        self.day_cells().find(|cell| cell.date == date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diary::DiaryEntry;
    use time::macros::date;
    use time::Month;

    fn entry(id: &str, date: &str, emotion: &str) -> DiaryEntry {
        DiaryEntry {
            id: id.to_string(),
            date: Some(date.to_string()),
            emotion: emotion.to_string(),
            title: format!("entry {id}"),
            content: String::new(),
            images: Vec::new(),
            created_at: None,
        }
    }

    fn empty_grid(year: i32, month: Month) -> MonthGrid {
        MonthGrid::build(
            MonthKey::new(year, month),
            &DiaryIndex::default(),
            date!(2000 - 01 - 01),
        )
    }

    #[test]
    fn leap_february_has_29_day_cells() {
        assert_eq!(empty_grid(2024, Month::February).day_cells().count(), 29);
        assert_eq!(empty_grid(2023, Month::February).day_cells().count(), 28);
    }

    #[test]
    fn leading_blanks_match_the_weekday_of_the_first() {
        // December 2024 begins on a Sunday, June 2024 on a Saturday.
        assert_eq!(empty_grid(2024, Month::December).leading_blanks(), 0);
        assert_eq!(empty_grid(2024, Month::June).leading_blanks(), 6);
        // May 2024 begins on a Wednesday.
        assert_eq!(empty_grid(2024, Month::May).leading_blanks(), 3);
    }

    #[test]
    fn grid_has_no_trailing_blanks() {
        for (year, month) in [(2024, Month::February), (2024, Month::June), (2023, Month::September)] {
            let grid = empty_grid(year, month);
            assert!(matches!(grid.cells.last(), Some(GridCell::Day(_))));
            assert_eq!(
                grid.cells.len(),
                grid.leading_blanks() + grid.day_cells().count()
            );
        }
    }

    #[test]
    fn only_the_matching_cell_is_today() {
        let may = MonthKey::new(2024, Month::May);
        let grid = MonthGrid::build(may, &DiaryIndex::default(), date!(2024 - 05 - 15));
        let today_cells: Vec<u8> = grid
            .day_cells()
            .filter(|cell| cell.is_today)
            .map(|cell| cell.day)
            .collect();
        assert_eq!(today_cells, vec![15]);

        // Today in another month marks nothing on this page.
        let elsewhere = MonthGrid::build(may, &DiaryIndex::default(), date!(2024 - 06 - 15));
        assert!(elsewhere.day_cells().all(|cell| !cell.is_today));
    }

    #[test]
    fn day_cells_surface_first_emotion_and_count() {
        let entries = vec![
            entry("1", "2024-05-01", "happy"),
            entry("2", "2024-05-01", "sad"),
            entry("3", "2024-05-02", "happy"),
        ];
        let index = DiaryIndex::build(&entries);
        let grid = MonthGrid::build(MonthKey::new(2024, Month::May), &index, date!(2024 - 05 - 15));

        let first = grid
            .cell_at(DateKey::normalize("2024-05-01").expect("valid key"))
            .expect("cell present");
        assert_eq!(first.entry_count, 2);
        assert_eq!(first.emotion.as_deref(), Some("happy"));
        assert!(first.is_clickable());

        let quiet = grid
            .cell_at(DateKey::normalize("2024-05-03").expect("valid key"))
            .expect("cell present");
        assert_eq!(quiet.entry_count, 0);
        assert_eq!(quiet.emotion, None);
        assert!(!quiet.is_clickable());
    }

    #[test]
    fn weeks_chunk_rows_of_seven() {
        let grid = empty_grid(2024, Month::May);
        let weeks: Vec<_> = grid.weeks().collect();
        assert_eq!(weeks.len(), 5);
        assert!(weeks[..4].iter().all(|week| week.len() == 7));
        // 3 blanks + 31 days = 34 cells, so the last row holds 6.
        assert_eq!(weeks[4].len(), 6);
    }
}
