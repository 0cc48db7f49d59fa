use thiserror::Error;

pub const DEFAULT_LEARNED_THRESHOLD: u32 = 5;
pub const DEFAULT_REVIEW_MAX_INTERVAL_DAYS: u32 = 60;

pub const ENV_LEARNED_THRESHOLD: &str = "VOCAB_LEARNED_THRESHOLD";
pub const ENV_REVIEW_MAX_INTERVAL_DAYS: &str = "VOCAB_REVIEW_MAX_INTERVAL_DAYS";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("learned threshold must be > 0")]
    InvalidLearnedThreshold,

    #[error("review max interval must be at least 1 day")]
    InvalidReviewMaxInterval,

    #[error("invalid value for {key}: {raw}")]
    InvalidValue { key: &'static str, raw: String },
}

/// Tunables for progress tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressConfig {
    learned_threshold: u32,
    review_max_interval_days: u32,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            learned_threshold: DEFAULT_LEARNED_THRESHOLD,
            review_max_interval_days: DEFAULT_REVIEW_MAX_INTERVAL_DAYS,
        }
    }
}

impl ProgressConfig {
    /// # Errors
    ///
    /// Returns `ConfigError` if either value is zero.
    pub fn new(learned_threshold: u32, review_max_interval_days: u32) -> Result<Self, ConfigError> {
        if learned_threshold == 0 {
            return Err(ConfigError::InvalidLearnedThreshold);
        }
        if review_max_interval_days == 0 {
            return Err(ConfigError::InvalidReviewMaxInterval);
        }
        Ok(Self {
            learned_threshold,
            review_max_interval_days,
        })
    }

    /// Read overrides from the process environment, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but not a valid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`ProgressConfig::from_env`], with an explicit variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but not a valid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &'static str, default: u32| -> Result<u32, ConfigError> {
            match lookup(key) {
                None => Ok(default),
                Some(raw) => raw
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| ConfigError::InvalidValue { key, raw }),
            }
        };

        Self::new(
            read(ENV_LEARNED_THRESHOLD, DEFAULT_LEARNED_THRESHOLD)?,
            read(ENV_REVIEW_MAX_INTERVAL_DAYS, DEFAULT_REVIEW_MAX_INTERVAL_DAYS)?,
        )
    }

    /// Correct answers needed before a word counts as learned.
    #[must_use]
    pub fn learned_threshold(&self) -> u32 {
        self.learned_threshold
    }

    #[must_use]
    pub fn review_max_interval_days(&self) -> u32 {
        self.review_max_interval_days
    }
}
