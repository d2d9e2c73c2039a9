use serde::{Deserialize, Serialize};

use super::clock::Clock;
use super::date::CalendarDate;
use super::error::ProgressError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayPosition {
    Past,
    Current,
    Future,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailStatus {
    Completed,
    Available,
    Missed,
    Locked,
}

impl TrailStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrailStatus::Completed => "completed",
            TrailStatus::Available => "available",
            TrailStatus::Missed => "missed",
            TrailStatus::Locked => "locked",
        }
    }
}

/// Where a journey stands on a given day.
///
/// `day_index` is 1-based and never leaves `1..=total_days`. Once the journey
/// has run past its last day, `is_completed` is set and `day_index` stays on
/// the final day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyProgress {
    pub day_index: u32,
    pub is_completed: bool,
    pub total_days: u32,
}

impl JourneyProgress {
    pub fn is_future(&self, day: u32) -> bool {
        day > self.day_index
    }

    pub fn is_past(&self, day: u32) -> bool {
        day < self.day_index
    }

    pub fn is_current(&self, day: u32) -> bool {
        day == self.day_index
    }

    pub fn position(&self, day: u32) -> DayPosition {
        if self.is_past(day) {
            DayPosition::Past
        } else if self.is_current(day) {
            DayPosition::Current
        } else {
            DayPosition::Future
        }
    }

    pub fn days_remaining(&self) -> u32 {
        if self.is_completed {
            0
        } else {
            self.total_days - self.day_index
        }
    }

    /// Classifies one trail day given the day indices already checked in.
    pub fn trail_status(&self, day: u32, completed_days: &[u32]) -> TrailStatus {
        if completed_days.contains(&day) {
            return TrailStatus::Completed;
        }
        match self.position(day) {
            DayPosition::Current => TrailStatus::Available,
            DayPosition::Past => TrailStatus::Missed,
            DayPosition::Future => TrailStatus::Locked,
        }
    }

    /// Status of every day `1..=total_days`, in order.
    pub fn trail(&self, completed_days: &[u32]) -> Vec<(u32, TrailStatus)> {
        (1..=self.total_days)
            .map(|day| (day, self.trail_status(day, completed_days)))
            .collect()
    }
}

pub fn compute_progress(
    start_date: CalendarDate,
    duration_days: i64,
    today: CalendarDate,
) -> Result<JourneyProgress, ProgressError> {
    if duration_days <= 0 {
        return Err(ProgressError::NonPositiveDuration {
            days: duration_days,
        });
    }
    let total_days = u32::try_from(duration_days).unwrap_or(u32::MAX);

    // Start dates in the future still land on day 1.
    let raw_day_index = (today.days_since(start_date) + 1).max(1);
    let is_completed = raw_day_index > duration_days;
    let day_index = if is_completed {
        total_days
    } else {
        u32::try_from(raw_day_index).unwrap_or(total_days)
    };

    Ok(JourneyProgress {
        day_index,
        is_completed,
        total_days,
    })
}

/// Like [`compute_progress`], parsing the start date first.
pub fn compute_progress_str(
    start_date: &str,
    duration_days: i64,
    today: CalendarDate,
) -> Result<JourneyProgress, ProgressError> {
    compute_progress(start_date.parse()?, duration_days, today)
}

pub struct JourneyProgressCalculator<C: Clock> {
    clock: C,
}

impl<C: Clock> JourneyProgressCalculator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    pub fn compute(
        &self,
        start_date: CalendarDate,
        duration_days: i64,
    ) -> Result<JourneyProgress, ProgressError> {
        compute_progress(start_date, duration_days, self.clock.today())
    }
}
