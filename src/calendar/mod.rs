use std::fmt;

use once_cell::sync::Lazy;
use time::format_description::FormatItem;
use time::{format_description, Date, Month, OffsetDateTime};

pub mod grid;

static DATE_FORMAT: Lazy<Vec<FormatItem<'static>>> = Lazy::new(|| {
    format_description::parse("[year]-[month]-[day]").expect("valid date format description")
});

/// Canonical `YYYY-MM-DD` key a diary entry is grouped under.
///
/// The entry feed is inconsistent about timestamp shapes: a bare date,
/// an ISO instant with a `T` separator, or a space-separated datetime
/// all appear in the wild. Two raw values naming the same calendar day
/// always normalize to the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(Date);

impl DateKey {
    /// Normalizes a raw timestamp string by cutting at the first `'T'`
    /// or `' '`. Returns `None` when the remaining prefix is not a
    /// valid `YYYY-MM-DD` date; no reformatting of other shapes is
    /// attempted.
    pub fn normalize(raw: &str) -> Option<Self> {
        let prefix = match raw.find(['T', ' ']) {
            Some(split) => &raw[..split],
            None => raw,
        };
        Date::parse(prefix, &*DATE_FORMAT).ok().map(Self)
    }

    pub fn from_date(date: Date) -> Self {
        Self(date)
    }

    pub fn date(self) -> Date {
        self.0
    }

    pub fn day(self) -> u8 {
        self.0.day()
    }

    pub fn month_key(self) -> MonthKey {
        MonthKey::new(self.0.year(), self.0.month())
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            u8::from(self.0.month()),
            self.0.day()
        )
    }
}

/// One displayed calendar page, identified by year and month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthKey {
    year: i32,
    month: Month,
}

impl MonthKey {
    pub fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    pub fn from_date(date: Date) -> Self {
        Self::new(date.year(), date.month())
    }

    /// Parses a `YYYY-MM` month argument.
    pub fn parse(input: &str) -> Option<Self> {
        DateKey::normalize(&format!("{input}-01")).map(DateKey::month_key)
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> Month {
        self.month
    }

    pub fn contains(self, key: DateKey) -> bool {
        key.date().year() == self.year && key.date().month() == self.month
    }

    pub fn day_count(self) -> u8 {
        time::util::days_in_year_month(self.year, self.month)
    }

    pub fn first_day(self) -> Date {
        Date::from_calendar_date(self.year, self.month, 1).unwrap_or(Date::MIN)
    }

    pub fn last_day(self) -> Date {
        Date::from_calendar_date(self.year, self.month, self.day_count()).unwrap_or(Date::MAX)
    }

    /// Key for one day of this page; out-of-range days clamp to the
    /// month's bounds.
    pub fn day_key(self, day: u8) -> DateKey {
        let clamped = day.clamp(1, self.day_count());
        DateKey::from_date(
            Date::from_calendar_date(self.year, self.month, clamped).unwrap_or(Date::MIN),
        )
    }

    /// Previous calendar month, rolling the year back over January.
    /// Saturates at the first month the `Date` type can represent.
    pub fn previous(self) -> Self {
        match self.month {
            Month::January if self.year == Date::MIN.year() => self,
            Month::January => Self::new(self.year - 1, Month::December),
            month => Self::new(self.year, month.previous()),
        }
    }

    /// Next calendar month, rolling the year forward over December.
    pub fn next(self) -> Self {
        match self.month {
            Month::December if self.year == Date::MAX.year() => self,
            Month::December => Self::new(self.year + 1, Month::January),
            month => Self::new(self.year, month.next()),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, u8::from(self.month))
    }
}

/// Local calendar day, falling back to UTC when the local offset cannot
/// be determined.
pub fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn normalize_strips_time_component() {
        let bare = DateKey::normalize("2024-03-05");
        let iso = DateKey::normalize("2024-03-05T10:00:00");
        let spaced = DateKey::normalize("2024-03-05 10:00:00");

        assert!(bare.is_some());
        assert_eq!(bare, iso);
        assert_eq!(bare, spaced);
        assert_eq!(bare.map(|key| key.to_string()).as_deref(), Some("2024-03-05"));
    }

    #[test]
    fn normalize_rejects_other_shapes() {
        assert_eq!(DateKey::normalize("03/05/2024"), None);
        assert_eq!(DateKey::normalize("2024-3-5"), None);
        assert_eq!(DateKey::normalize("20240305"), None);
        assert_eq!(DateKey::normalize(""), None);
        assert_eq!(DateKey::normalize("tomorrow"), None);
        // Shape alone is not enough; the prefix must be a real date.
        assert_eq!(DateKey::normalize("2024-02-30T08:00:00"), None);
    }

    #[test]
    fn normalize_is_stable_across_calls() {
        let raw = "2024-12-31T23:59:59";
        assert_eq!(DateKey::normalize(raw), DateKey::normalize(raw));
    }

    #[test]
    fn month_parse_accepts_year_month_only() {
        let month = MonthKey::parse("2024-05").expect("valid month");
        assert_eq!(month.year(), 2024);
        assert_eq!(month.month(), Month::May);

        assert_eq!(MonthKey::parse("2024-5"), None);
        assert_eq!(MonthKey::parse("2024-13"), None);
        assert_eq!(MonthKey::parse("2024-05-03"), None);
    }

    #[test]
    fn month_navigation_rolls_the_year() {
        let january = MonthKey::new(2024, Month::January);
        assert_eq!(january.previous(), MonthKey::new(2023, Month::December));

        let december = MonthKey::new(2023, Month::December);
        assert_eq!(december.next(), MonthKey::new(2024, Month::January));

        let may = MonthKey::new(2024, Month::May);
        assert_eq!(may.previous().next(), may);
    }

    #[test]
    fn month_contains_only_its_own_days() {
        let may = MonthKey::new(2024, Month::May);
        assert!(may.contains(DateKey::from_date(date!(2024 - 05 - 01))));
        assert!(may.contains(DateKey::from_date(date!(2024 - 05 - 31))));
        assert!(!may.contains(DateKey::from_date(date!(2024 - 06 - 01))));
        assert!(!may.contains(DateKey::from_date(date!(2023 - 05 - 15))));
    }

    #[test]
    fn day_key_clamps_to_month_length() {
        let february = MonthKey::new(2023, Month::February);
        assert_eq!(february.day_key(31).to_string(), "2023-02-28");
        assert_eq!(february.day_key(0).to_string(), "2023-02-01");
        assert_eq!(february.day_key(15).day(), 15);
    }

    #[test]
    fn month_day_count_tracks_leap_years() {
        assert_eq!(MonthKey::new(2024, Month::February).day_count(), 29);
        assert_eq!(MonthKey::new(2023, Month::February).day_count(), 28);
        assert_eq!(MonthKey::new(2024, Month::May).day_count(), 31);
    }
}
