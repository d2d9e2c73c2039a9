use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressError {
    #[error("invalid calendar date '{input}': expected YYYY-MM-DD")]
    InvalidDate { input: String },

    #[error("journey duration must be positive, got {days}")]
    NonPositiveDuration { days: i64 },
}
