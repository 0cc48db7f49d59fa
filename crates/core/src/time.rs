use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, Utc};

/// Source of "today" for progress bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    /// Wall clock, booked against the local calendar day.
    #[default]
    System,
    /// Frozen instant, booked against its UTC calendar day.
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Frozen at noon UTC of `day`.
    #[must_use]
    pub fn on_day(day: NaiveDate) -> Self {
        Self::Fixed(day.and_time(NaiveTime::MIN).and_utc() + Duration::hours(12))
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Self::System => Utc::now(),
            Self::Fixed(at) => *at,
        }
    }

    /// The calendar day correct answers are booked against.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        match self {
            Self::System => Local::now().date_naive(),
            Self::Fixed(at) => at.date_naive(),
        }
    }

    /// Move a fixed clock forward. The system clock ignores this.
    pub fn advance(&mut self, delta: Duration) {
        if let Self::Fixed(at) = self {
            *at += delta;
        }
    }
}

/// 2023-11-14T22:13:20Z, the instant `fixed_now` returns.
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Deterministic instant for tests.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0).unwrap_or(DateTime::UNIX_EPOCH)
}

#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}
