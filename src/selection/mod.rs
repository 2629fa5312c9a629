use crate::calendar::DateKey;
use crate::diary::DiaryIndex;

/// Drives the day-detail panel: which day is open and which entry,
/// if any, is expanded inside it.
///
/// Transitions are pure; callers assign the returned value. Requests
/// that make no sense in the current state return the state unchanged,
/// so stray key presses can never corrupt the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// No day open, calendar has focus.
    Idle,
    /// A day's entry list is open, nothing expanded.
    DateSelected { date: DateKey },
    /// One entry within the open day shows its full detail.
    EntryExpanded { date: DateKey, entry_id: String },
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Idle
    }
}

impl Selection {
    /// Opens `date`. Callers only invoke this for days that have at
    /// least one entry. Selecting a new day always collapses any
    /// expansion left over from the previous one.
    pub fn select_date(&self, date: DateKey) -> Selection {
        Selection::DateSelected { date }
    }

    /// Expands `entry_id`, collapses it if it was already expanded, or
    /// switches straight to it from another expanded entry. Does
    /// nothing while no day is open.
    pub fn toggle_entry(&self, entry_id: &str) -> Selection {
        match self {
            Selection::Idle => Selection::Idle,
            Selection::DateSelected { date } => Selection::EntryExpanded {
                date: *date,
                entry_id: entry_id.to_string(),
            },
            Selection::EntryExpanded { date, entry_id: expanded } => {
                if expanded == entry_id {
                    Selection::DateSelected { date: *date }
                } else {
                    Selection::EntryExpanded {
                        date: *date,
                        entry_id: entry_id.to_string(),
                    }
                }
            }
        }
    }

    /// Closes the detail panel outright.
    pub fn close(&self) -> Selection {
        Selection::Idle
    }

    /// Re-validates the selection against a freshly rebuilt index.
    /// The open day survives only if it still has entries; the
    /// expansion never does, since the expanded entry may be the one
    /// that was just deleted.
    pub fn refresh_after_mutation(&self, index: &DiaryIndex) -> Selection {
        match self.selected_date() {
            None => Selection::Idle,
            Some(date) => {
                if index.entries_on(date).is_empty() {
                    Selection::Idle
                } else {
                    Selection::DateSelected { date }
                }
            }
        }
    }

    pub fn selected_date(&self) -> Option<DateKey> {
        match self {
            Selection::Idle => None,
            Selection::DateSelected { date } | Selection::EntryExpanded { date, .. } => Some(*date),
        }
    }

    pub fn expanded_entry(&self) -> Option<&str> {
        match self {
            Selection::EntryExpanded { entry_id, .. } => Some(entry_id),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Selection::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diary::DiaryEntry;
    use assert_matches::assert_matches;

    fn key(raw: &str) -> DateKey {
        DateKey::normalize(raw).expect("valid date literal")
    }

    fn entry(id: &str, date: &str) -> DiaryEntry {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "date": date,
            "emotion": "happy",
            "title": format!("entry {id}"),
        }))
        .expect("valid entry literal")
    }

    #[test]
    fn browsing_a_day_with_two_entries() {
        let day = key("2024-03-05");
        let selection = Selection::default();

        let selection = selection.select_date(day);
        assert_matches!(&selection, Selection::DateSelected { date } if *date == day);

        let selection = selection.toggle_entry("e1");
        assert_matches!(&selection, Selection::EntryExpanded { entry_id, .. } if entry_id == "e1");

        // Toggling the expanded entry collapses back to the list.
        let selection = selection.toggle_entry("e1");
        assert_matches!(&selection, Selection::DateSelected { date } if *date == day);

        let selection = selection.toggle_entry("e1").toggle_entry("e2");
        assert_matches!(&selection, Selection::EntryExpanded { entry_id, .. } if entry_id == "e2");

        assert_matches!(selection.close(), Selection::Idle);
    }

    #[test]
    fn toggling_while_idle_changes_nothing() {
        let selection = Selection::default().toggle_entry("e1");
        assert!(selection.is_idle());
        assert_eq!(selection.expanded_entry(), None);
    }

    #[test]
    fn selecting_a_new_day_collapses_the_old_expansion() {
        let selection = Selection::default()
            .select_date(key("2024-03-05"))
            .toggle_entry("e1")
            .select_date(key("2024-03-06"));
        assert_matches!(&selection, Selection::DateSelected { date } if *date == key("2024-03-06"));
        assert_eq!(selection.expanded_entry(), None);
    }

    #[test]
    fn refresh_keeps_the_day_while_it_still_has_entries() {
        let index = DiaryIndex::build(&[entry("e1", "2024-03-05"), entry("e2", "2024-03-05")]);
        let selection = Selection::default()
            .select_date(key("2024-03-05"))
            .toggle_entry("e1");

        let refreshed = selection.refresh_after_mutation(&index);
        assert_matches!(&refreshed, Selection::DateSelected { date } if *date == key("2024-03-05"));
        assert_eq!(refreshed.expanded_entry(), None);
    }

    #[test]
    fn refresh_after_deleting_the_last_entry_returns_to_idle() {
        let selection = Selection::default()
            .select_date(key("2024-03-05"))
            .toggle_entry("e1");

        // The day's only entry is gone from the rebuilt index.
        let rebuilt = DiaryIndex::build(&[entry("e2", "2024-03-09")]);
        assert_matches!(selection.refresh_after_mutation(&rebuilt), Selection::Idle);
    }

    #[test]
    fn refresh_while_idle_stays_idle() {
        let index = DiaryIndex::build(&[entry("e1", "2024-03-05")]);
        assert_matches!(Selection::Idle.refresh_after_mutation(&index), Selection::Idle);
    }
}
