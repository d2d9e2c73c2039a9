//! Pure consistency and journey computations.
//!
//! Nothing in here touches storage or the wall clock directly. Callers fetch
//! the raw dates and pass "today" in, either explicitly or through a [`Clock`].

pub mod clock;
pub mod date;
pub mod error;
pub mod journey;
pub mod profile;
pub mod streak;

pub use clock::{Clock, FixedClock, SystemClock};
pub use date::CalendarDate;
pub use error::ProgressError;
pub use journey::{
    DayPosition, JourneyProgress, JourneyProgressCalculator, TrailStatus, compute_progress,
    compute_progress_str,
};
pub use profile::{ProfileProgress, Trophy, derive_trophies, summarize};
pub use streak::{StreakCalculator, StreakResult, compute_streaks};
