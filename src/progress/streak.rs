use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::clock::Clock;
use super::date::CalendarDate;
use super::error::ProgressError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakResult {
    /// Consecutive days ending today; 0 when today has no check-in.
    pub current: u32,
    /// Longest run of consecutive days anywhere in the history.
    pub best: u32,
    /// Distinct days with at least one check-in.
    pub active_days: u32,
}

/// Computes streaks from check-in date keys as of `today`.
///
/// Keys may repeat and arrive in any order. A single malformed key fails the
/// whole computation.
pub fn compute_streaks<I, S>(date_keys: I, today: CalendarDate) -> Result<StreakResult, ProgressError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let unique = date_keys
        .into_iter()
        .map(|key| key.as_ref().parse::<CalendarDate>())
        .collect::<Result<BTreeSet<_>, _>>()?;

    // Most recent first
    let dates: Vec<CalendarDate> = unique.into_iter().rev().collect();

    let Some(&latest) = dates.first() else {
        return Ok(StreakResult::default());
    };

    let current = if latest == today {
        1 + dates
            .windows(2)
            .take_while(|pair| pair[0].days_since(pair[1]) == 1)
            .count() as u32
    } else {
        0
    };

    let mut best = 1u32;
    let mut run = 1u32;
    for pair in dates.windows(2) {
        if pair[0].days_since(pair[1]) == 1 {
            run += 1;
        } else {
            run = 1;
        }
        best = best.max(run);
    }

    Ok(StreakResult {
        current,
        best,
        active_days: dates.len() as u32,
    })
}

/// [`compute_streaks`] bound to a clock, so "today" is read once per call.
pub struct StreakCalculator<C: Clock> {
    clock: C,
}

impl<C: Clock> StreakCalculator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    pub fn compute<I, S>(&self, date_keys: I) -> Result<StreakResult, ProgressError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        compute_streaks(date_keys, self.clock.today())
    }
}
