use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::config::ProgressConfig;
use crate::model::ids::{UserId, WordId};

//
// ─── PROGRESS ──────────────────────────────────────────────────────────────────
//

/// Per-learner counter of correct answers for one word.
///
/// A row is created on the first correct answer and only ever incremented
/// afterwards. At most one row exists per `(user, word)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Progress {
    user_id: UserId,
    word_id: WordId,
    created_on: NaiveDate,
    correct_count: u32,
    last_correct: Option<NaiveDate>,
    next_review: Option<NaiveDate>,
}

impl Progress {
    /// Row for the first correct answer given on `today`.
    #[must_use]
    pub fn first_correct(
        user_id: UserId,
        word_id: WordId,
        today: NaiveDate,
        config: &ProgressConfig,
    ) -> Self {
        let mut progress = Self {
            user_id,
            word_id,
            created_on: today,
            correct_count: 0,
            last_correct: None,
            next_review: None,
        };
        progress.record_correct(today, config);
        progress
    }

    /// Rebuild a row from storage.
    #[must_use]
    pub fn from_persisted(
        user_id: UserId,
        word_id: WordId,
        created_on: NaiveDate,
        correct_count: u32,
        last_correct: Option<NaiveDate>,
        next_review: Option<NaiveDate>,
    ) -> Self {
        Self {
            user_id,
            word_id,
            created_on,
            correct_count,
            last_correct,
            next_review,
        }
    }

    /// Count another correct answer and push the next review out.
    pub fn record_correct(&mut self, today: NaiveDate, config: &ProgressConfig) {
        self.correct_count = self.correct_count.saturating_add(1);
        self.last_correct = Some(today);
        let days = review_interval_days(self.correct_count, config.review_max_interval_days());
        self.next_review = today.checked_add_signed(Duration::days(i64::from(days)));
    }

    /// Whether the counter has reached the learned threshold.
    #[must_use]
    pub fn is_learned(&self, config: &ProgressConfig) -> bool {
        self.correct_count >= config.learned_threshold()
    }

    // Accessors
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn word_id(&self) -> WordId {
        self.word_id
    }

    #[must_use]
    pub fn created_on(&self) -> NaiveDate {
        self.created_on
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn last_correct(&self) -> Option<NaiveDate> {
        self.last_correct
    }

    #[must_use]
    pub fn next_review(&self) -> Option<NaiveDate> {
        self.next_review
    }
}

/// Doubling review interval: 1, 2, 4, 8... days, capped at `max_days`.
#[must_use]
pub fn review_interval_days(correct_count: u32, max_days: u32) -> u32 {
    if correct_count == 0 {
        return 0;
    }
    let exponent = correct_count - 1;
    if exponent >= 31 {
        return max_days;
    }
    (1_u32 << exponent).min(max_days)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn first_correct_starts_at_one() {
        let config = ProgressConfig::default();
        let p = Progress::first_correct(UserId::new(1), WordId::new(2), day(1), &config);
        assert_eq!(p.correct_count(), 1);
        assert_eq!(p.last_correct(), Some(day(1)));
        assert_eq!(p.next_review(), Some(day(2)));
        assert_eq!(p.created_on(), day(1));
    }

    #[test]
    fn record_correct_increments_and_reschedules() {
        let config = ProgressConfig::default();
        let mut p = Progress::first_correct(UserId::new(1), WordId::new(2), day(1), &config);
        p.record_correct(day(3), &config);
        p.record_correct(day(5), &config);
        assert_eq!(p.correct_count(), 3);
        assert_eq!(p.last_correct(), Some(day(5)));
        assert_eq!(p.next_review(), Some(day(9)));
        assert_eq!(p.created_on(), day(1));
    }

    #[test]
    fn learned_from_the_configured_threshold() {
        let p = |count| {
            Progress::from_persisted(UserId::new(1), WordId::new(1), day(1), count, None, None)
        };
        let config = ProgressConfig::default();
        assert!(!p(4).is_learned(&config));
        assert!(p(5).is_learned(&config));

        let strict = ProgressConfig::new(8, 60).unwrap();
        assert!(!p(5).is_learned(&strict));
        assert!(p(8).is_learned(&strict));
    }

    #[test]
    fn interval_is_capped() {
        assert_eq!(review_interval_days(0, 30), 0);
        assert_eq!(review_interval_days(1, 30), 1);
        assert_eq!(review_interval_days(5, 30), 16);
        assert_eq!(review_interval_days(6, 30), 30);
        assert_eq!(review_interval_days(40, 30), 30);
    }
}
