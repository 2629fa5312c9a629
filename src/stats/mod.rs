use indexmap::IndexMap;

use crate::calendar::MonthKey;
use crate::diary::DiaryIndex;

pub mod radial;

/// Count for one emotion tag within a displayed month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmotionStat {
    pub emotion: String,
    pub count: usize,
}

/// Per-emotion breakdown of one month.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthlyStats {
    /// Tags that actually occurred, in first-seen order.
    pub stats: Vec<EmotionStat>,
    /// Sum of all counts; legitimately zero for quiet months.
    pub total: usize,
}

impl MonthlyStats {
    /// Tallies every indexed entry of `month` under its emotion tag.
    ///
    /// The month membership of a bucket comes from its own key, never
    /// from re-reading raw entry fields. Days are scanned in ascending
    /// date order and tags keep the order they were first seen in that
    /// scan. The tally is recomputed from scratch on every call since
    /// the index may have been rebuilt since the last one; nothing is
    /// memoized. Unknown tags count under their own key; mapping them
    /// to a display style is the presentation layer's concern.
    pub fn aggregate(index: &DiaryIndex, month: MonthKey) -> Self {
        let mut counts: IndexMap<&str, usize> = IndexMap::new();
        let mut total = 0usize;
        for (_, bucket) in index.month_buckets(month) {
            for entry in bucket {
                *counts.entry(entry.emotion.as_str()).or_insert(0) += 1;
                total += 1;
            }
        }
        let stats = counts
            .into_iter()
            .map(|(emotion, count)| EmotionStat {
                emotion: emotion.to_string(),
                count,
            })
            .collect();
        Self { stats, total }
    }

    pub fn count_for(&self, emotion: &str) -> usize {
        self.stats
            .iter()
            .find(|stat| stat.emotion == emotion)
            .map(|stat| stat.count)
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diary::DiaryEntry;

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

    fn may_2024() -> MonthKey {
        MonthKey::parse("2024-05").expect("valid month")
    }

    #[test]
    fn aggregate_counts_by_tag_in_first_seen_order() {
        let entries = vec![
            entry("1", "2024-05-01", "happy"),
            entry("2", "2024-05-01", "sad"),
            entry("3", "2024-05-02", "happy"),
        ];
        let index = DiaryIndex::build(&entries);
        let stats = MonthlyStats::aggregate(&index, may_2024());

        assert_eq!(stats.total, 3);
        assert_eq!(stats.stats.len(), 2);
        assert_eq!(stats.stats[0].emotion, "happy");
        assert_eq!(stats.stats[0].count, 2);
        assert_eq!(stats.stats[1].emotion, "sad");
        assert_eq!(stats.stats[1].count, 1);
    }

    #[test]
    fn aggregate_total_matches_sum_of_counts_and_buckets() {
        let entries = vec![
            entry("1", "2024-05-01", "happy"),
            entry("2", "2024-05-03", "anxiety"),
            entry("3", "2024-05-03", "anxiety"),
            entry("4", "2024-05-20", "hurt"),
            entry("5", "2024-06-01", "sad"),
        ];
        let index = DiaryIndex::build(&entries);
        let month = may_2024();
        let stats = MonthlyStats::aggregate(&index, month);

        let count_sum: usize = stats.stats.iter().map(|stat| stat.count).sum();
        let bucket_sum: usize = index.month_buckets(month).map(|(_, bucket)| bucket.len()).sum();
        assert_eq!(stats.total, count_sum);
        assert_eq!(stats.total, bucket_sum);
        assert_eq!(stats.total, 4);
    }

    #[test]
    fn aggregate_skips_entries_outside_the_month() {
        let entries = vec![
            entry("1", "2024-04-30", "happy"),
            entry("2", "2024-06-01", "happy"),
        ];
        let index = DiaryIndex::build(&entries);
        let stats = MonthlyStats::aggregate(&index, may_2024());

        assert!(stats.is_empty());
        assert!(stats.stats.is_empty());
        assert_eq!(stats.total, 0);
    }

    #[test]
    fn aggregate_lists_no_zero_count_tags() {
        let entries = vec![entry("1", "2024-05-10", "embarrassed")];
        let index = DiaryIndex::build(&entries);
        let stats = MonthlyStats::aggregate(&index, may_2024());

        assert!(stats.stats.iter().all(|stat| stat.count > 0));
        assert_eq!(stats.count_for("embarrassed"), 1);
        assert_eq!(stats.count_for("happy"), 0);
    }

    #[test]
    fn aggregate_counts_unknown_tags_under_their_own_key() {
        let entries = vec![
            entry("1", "2024-05-01", "nostalgic"),
            entry("2", "2024-05-02", "nostalgic"),
        ];
        let index = DiaryIndex::build(&entries);
        let stats = MonthlyStats::aggregate(&index, may_2024());

        assert_eq!(stats.count_for("nostalgic"), 2);
        assert_eq!(stats.total, 2);
    }

    #[test]
    fn aggregate_reflects_a_rebuilt_index() {
        let mut entries = vec![
            entry("1", "2024-05-01", "happy"),
            entry("2", "2024-05-02", "sad"),
        ];
        let before = MonthlyStats::aggregate(&DiaryIndex::build(&entries), may_2024());
        assert_eq!(before.total, 2);

        entries.pop();
        let after = MonthlyStats::aggregate(&DiaryIndex::build(&entries), may_2024());
        assert_eq!(after.total, 1);
        assert_eq!(after.count_for("sad"), 0);
    }
}
