use serde::Serialize;
use thiserror::Error;

use crate::model::ids::VocabListId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Counts coming back from storage that cannot describe a real list.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressStatsError {
    #[error(
        "list {list_id}: learned ({learned}) + in progress ({in_progress}) exceeds total ({total})"
    )]
    CountsExceedTotal {
        list_id: VocabListId,
        total: u32,
        learned: u32,
        in_progress: u32,
    },
}

//
// ─── PERCENT ───────────────────────────────────────────────────────────────────
//

/// Share of learned words as a percentage with one decimal.
///
/// The `f64` product is rounded to its nearest one-decimal representation,
/// ties going to even on the binary value. An empty list yields `0.0`.
#[must_use]
pub fn progress_percent(learned: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let percent = f64::from(learned) / f64::from(total) * 100.0;
    format!("{percent:.1}").parse().unwrap_or(percent)
}

//
// ─── LIST PROGRESS ─────────────────────────────────────────────────────────────
//

/// Learning state of one active list for one learner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListProgress {
    pub id: VocabListId,
    pub name: String,
    pub total_words: u32,
    pub learned_words: u32,
    pub in_progress_words: u32,
    pub progress_percent: f64,
    pub is_completed: bool,
}

impl ListProgress {
    /// Derive percent and completion from raw counts.
    ///
    /// # Errors
    ///
    /// Returns `ProgressStatsError::CountsExceedTotal` when
    /// `learned + in_progress > total`.
    pub fn from_counts(
        id: VocabListId,
        name: impl Into<String>,
        total_words: u32,
        learned_words: u32,
        in_progress_words: u32,
    ) -> Result<Self, ProgressStatsError> {
        if u64::from(learned_words) + u64::from(in_progress_words) > u64::from(total_words) {
            return Err(ProgressStatsError::CountsExceedTotal {
                list_id: id,
                total: total_words,
                learned: learned_words,
                in_progress: in_progress_words,
            });
        }

        Ok(Self {
            id,
            name: name.into(),
            total_words,
            learned_words,
            in_progress_words,
            progress_percent: progress_percent(learned_words, total_words),
            is_completed: total_words > 0 && learned_words == total_words,
        })
    }
}

//
// ─── DASHBOARD SUMMARY ─────────────────────────────────────────────────────────
//

/// Everything the dashboard view needs, in one value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub started_lists: Vec<ListProgress>,
    pub words_today: u32,
    pub words_goal: u32,
    pub daily_goal_reached: bool,
    pub lists_learned: u32,
    pub lists_total: u32,
}

impl DashboardSummary {
    /// `lists_learned` is derived from the completed entries of `started_lists`,
    /// `daily_goal_reached` from `words_today` against `words_goal`.
    #[must_use]
    pub fn new(
        started_lists: Vec<ListProgress>,
        words_today: u32,
        words_goal: u32,
        lists_total: u32,
    ) -> Self {
        let completed = started_lists.iter().filter(|l| l.is_completed).count();
        let lists_learned = u32::try_from(completed).unwrap_or(u32::MAX);
        Self {
            started_lists,
            words_today,
            words_goal,
            daily_goal_reached: words_today >= words_goal,
            lists_learned,
            lists_total,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn list(total: u32, learned: u32, in_progress: u32) -> ListProgress {
        ListProgress::from_counts(VocabListId::new(1), "Verben", total, learned, in_progress)
            .unwrap()
    }

    #[test]
    fn forty_words_twenty_five_learned() {
        let progress = list(40, 25, 3);
        assert_eq!(progress.progress_percent, 62.5);
        assert!(!progress.is_completed);
    }

    #[test]
    fn empty_list_is_zero_and_not_completed() {
        let progress = list(0, 0, 0);
        assert_eq!(progress.progress_percent, 0.0);
        assert!(!progress.is_completed);
    }

    #[test]
    fn fully_learned_list_is_completed() {
        let progress = list(12, 12, 0);
        assert_eq!(progress.progress_percent, 100.0);
        assert!(progress.is_completed);
    }

    #[test]
    fn rounds_to_one_decimal() {
        assert_eq!(progress_percent(2, 3), 66.7);
        assert_eq!(progress_percent(1, 3), 33.3);
        assert_eq!(progress_percent(1, 7), 14.3);
        // 28.749999... and 61.250000...1 once multiplied out in f64
        assert_eq!(progress_percent(23, 80), 28.7);
        assert_eq!(progress_percent(49, 80), 61.3);
        // exact binary ties go to even
        assert_eq!(progress_percent(1, 16), 6.2);
        assert_eq!(progress_percent(3, 16), 18.8);
    }

    #[test]
    fn rejects_counts_above_total() {
        let err =
            ListProgress::from_counts(VocabListId::new(4), "Kaputt", 3, 2, 2).unwrap_err();
        assert_eq!(
            err,
            ProgressStatsError::CountsExceedTotal {
                list_id: VocabListId::new(4),
                total: 3,
                learned: 2,
                in_progress: 2,
            }
        );
    }

    #[test]
    fn summary_counts_completed_lists() {
        let summary = DashboardSummary::new(
            vec![list(2, 2, 0), list(5, 1, 1), list(0, 0, 0), list(1, 1, 0)],
            4,
            10,
            9,
        );
        assert_eq!(summary.lists_learned, 2);
        assert_eq!(summary.lists_total, 9);
        assert!(!summary.daily_goal_reached);
    }

    #[test]
    fn daily_goal_is_reached_at_the_target() {
        assert!(DashboardSummary::new(Vec::new(), 10, 10, 0).daily_goal_reached);
        assert!(DashboardSummary::new(Vec::new(), 12, 10, 0).daily_goal_reached);
        assert!(!DashboardSummary::new(Vec::new(), 9, 10, 0).daily_goal_reached);
    }

    proptest! {
        #[test]
        fn completion_matches_counts(total in 0_u32..500, learned_seed in 0_u32..500, ip_seed in 0_u32..500) {
            let learned = if total == 0 { 0 } else { learned_seed % (total + 1) };
            let in_progress = if total == learned { 0 } else { ip_seed % (total - learned + 1) };
            let progress = list(total, learned, in_progress);

            prop_assert!(progress.learned_words + progress.in_progress_words <= progress.total_words);
            prop_assert_eq!(progress.is_completed, total > 0 && learned == total);
            prop_assert!((0.0..=100.0).contains(&progress.progress_percent));
            if total == 0 {
                prop_assert_eq!(progress.progress_percent, 0.0);
            }
            if progress.is_completed {
                prop_assert_eq!(progress.progress_percent, 100.0);
            }
        }
    }
}
