use std::collections::BTreeMap;
use std::ops::Bound;

use serde::{Deserialize, Deserializer, Serialize};
use serde_with::{serde_as, DefaultOnNull};

use crate::calendar::{DateKey, MonthKey};

/// One diary record as it appears in the entry feed.
///
/// The feed is lenient about shapes: ids arrive as JSON numbers or
/// strings, `images` may be `null`, and `date`/`createdAt` may be
/// absent. `date` is the calendar day the entry belongs to; `createdAt`
/// is the authoring timestamp and is display-only, never used for
/// grouping.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryEntry {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(default)]
    pub date: Option<String>,
    pub emotion: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl DiaryEntry {
    /// Calendar key this entry groups under, if its date normalizes.
    pub fn date_key(&self) -> Option<DateKey> {
        self.date.as_deref().and_then(DateKey::normalize)
    }
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(value) => value.to_string(),
    })
}

/// Snapshot of the entry collection bucketed by calendar day.
///
/// Buckets keep the source collection's order. The index is rebuilt
/// wholesale after every mutation of the backing store; there is no
/// incremental update path, so it can never drift from the store.
#[derive(Debug, Clone, Default)]
pub struct DiaryIndex {
    buckets: BTreeMap<DateKey, Vec<DiaryEntry>>,
}

impl DiaryIndex {
    /// Builds the index in one pass over the collection. Entries whose
    /// date does not normalize are left out of every calendar view
    /// without failing the build.
    pub fn build(entries: &[DiaryEntry]) -> Self {
        let mut buckets: BTreeMap<DateKey, Vec<DiaryEntry>> = BTreeMap::new();
        for entry in entries {
            let Some(key) = entry.date_key() else {
                continue;
            };
            buckets.entry(key).or_default().push(entry.clone());
        }
        Self { buckets }
    }

    /// Entries recorded on `date`, in source order. A day without
    /// entries yields an empty slice, never a failure.
    pub fn entries_on(&self, date: DateKey) -> &[DiaryEntry] {
        self.buckets
            .get(&date)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Day buckets between `start` and `end` inclusive, in ascending
    /// date order. A window whose `start` exceeds `end` holds no days.
    pub fn between(
        &self,
        start: DateKey,
        end: DateKey,
    ) -> impl DoubleEndedIterator<Item = (DateKey, &[DiaryEntry])> + '_ {
        let range = if start <= end {
            (Bound::Included(start), Bound::Included(end))
        } else {
            (Bound::Included(start), Bound::Excluded(start))
        };
        self.buckets
            .range(range)
            .map(|(key, bucket)| (*key, bucket.as_slice()))
    }

    /// Day buckets falling inside `month`, in ascending date order.
    pub fn month_buckets(
        &self,
        month: MonthKey,
    ) -> impl DoubleEndedIterator<Item = (DateKey, &[DiaryEntry])> + '_ {
        self.between(
            DateKey::from_date(month.first_day()),
            DateKey::from_date(month.last_day()),
        )
    }

    /// Number of entries that made it into a bucket.
    pub fn indexed_entry_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn day_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, date: Option<&str>, emotion: &str) -> DiaryEntry {
        DiaryEntry {
            id: id.to_string(),
            date: date.map(str::to_string),
            emotion: emotion.to_string(),
            title: format!("entry {id}"),
            content: String::new(),
            images: Vec::new(),
            created_at: None,
        }
    }

    #[test]
    fn feed_tolerates_numeric_ids_and_null_images() {
        let raw = r#"{
            "id": 42,
            "date": "2024-05-03T09:30:00",
            "emotion": "happy",
            "title": "numeric id",
            "content": "body",
            "images": null,
            "createdAt": "2024-05-03T09:30:00"
        }"#;
        let parsed: DiaryEntry = serde_json::from_str(raw).expect("lenient parse");
        assert_eq!(parsed.id, "42");
        assert!(parsed.images.is_empty());
        assert_eq!(parsed.date_key().map(|key| key.to_string()).as_deref(), Some("2024-05-03"));
    }

    #[test]
    fn feed_tolerates_missing_optional_fields() {
        let raw = r#"{"id": "a1", "emotion": "sad", "title": "sparse"}"#;
        let parsed: DiaryEntry = serde_json::from_str(raw).expect("sparse parse");
        assert_eq!(parsed.date, None);
        assert_eq!(parsed.date_key(), None);
        assert_eq!(parsed.content, "");
        assert_eq!(parsed.created_at, None);
    }

    #[test]
    fn index_buckets_account_for_every_normalizable_entry() {
        let entries = vec![
            entry("1", Some("2024-05-01"), "happy"),
            entry("2", Some("2024-05-01T10:00:00"), "sad"),
            entry("3", Some("2024-05-02 08:15:00"), "happy"),
            entry("4", Some("not a date"), "angry"),
            entry("5", None, "hurt"),
        ];
        let index = DiaryIndex::build(&entries);

        assert_eq!(index.indexed_entry_count(), 3);
        assert_eq!(index.day_count(), 2);

        let first_day = DateKey::normalize("2024-05-01").expect("valid key");
        let bucket = index.entries_on(first_day);
        assert_eq!(bucket.len(), 2);
        // Source order survives bucketing.
        assert_eq!(bucket[0].id, "1");
        assert_eq!(bucket[1].id, "2");
    }

    #[test]
    fn query_on_empty_day_returns_empty_slice() {
        let index = DiaryIndex::build(&[entry("1", Some("2024-05-01"), "happy")]);
        let other_day = DateKey::normalize("2024-05-02").expect("valid key");
        assert!(index.entries_on(other_day).is_empty());
        // Repeat queries are read-only and stay stable.
        assert!(index.entries_on(other_day).is_empty());
    }

    #[test]
    fn month_buckets_exclude_neighboring_months() {
        let entries = vec![
            entry("april", Some("2024-04-30"), "sad"),
            entry("may-first", Some("2024-05-01"), "happy"),
            entry("may-last", Some("2024-05-31"), "happy"),
            entry("june", Some("2024-06-01"), "angry"),
        ];
        let index = DiaryIndex::build(&entries);
        let may = MonthKey::parse("2024-05").expect("valid month");

        let days: Vec<String> = index
            .month_buckets(may)
            .map(|(key, _)| key.to_string())
            .collect();
        assert_eq!(days, vec!["2024-05-01", "2024-05-31"]);
    }

    #[test]
    fn inverted_between_window_is_empty() {
        let entries = vec![entry("1", Some("2024-05-02"), "happy")];
        let index = DiaryIndex::build(&entries);
        let start = DateKey::normalize("2024-05-10").expect("valid key");
        let end = DateKey::normalize("2024-05-01").expect("valid key");

        assert_eq!(index.between(start, end).count(), 0);
        assert_eq!(index.between(end, start).count(), 1);
    }

    #[test]
    fn rebuild_reflects_the_refreshed_collection() {
        let mut entries = vec![
            entry("1", Some("2024-05-01"), "happy"),
            entry("2", Some("2024-05-01"), "sad"),
        ];
        let day = DateKey::normalize("2024-05-01").expect("valid key");

        let before = DiaryIndex::build(&entries);
        assert_eq!(before.entries_on(day).len(), 2);

        entries.remove(0);
        let after = DiaryIndex::build(&entries);
        assert_eq!(after.entries_on(day).len(), 1);
        assert_eq!(after.entries_on(day)[0].id, "2");
        // The earlier snapshot is untouched by the rebuild.
        assert_eq!(before.entries_on(day).len(), 2);
    }
}
