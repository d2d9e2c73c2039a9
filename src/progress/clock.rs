use chrono::{FixedOffset, Local, Utc};

use super::date::CalendarDate;

/// Source of "today" for anything that depends on the current calendar day.
pub trait Clock: Send + Sync {
    fn today(&self) -> CalendarDate;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn today(&self) -> CalendarDate {
        (**self).today()
    }
}

/// Wall-clock day, either in the machine's local zone or a fixed UTC offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    offset: Option<FixedOffset>,
}

impl SystemClock {
    pub fn local() -> Self {
        Self { offset: None }
    }

    /// `minutes` east of UTC. Returns `None` when out of chrono's range.
    pub fn with_offset_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes * 60).map(|offset| Self {
            offset: Some(offset),
        })
    }
}

impl Clock for SystemClock {
    fn today(&self) -> CalendarDate {
        match self.offset {
            Some(offset) => Utc::now().with_timezone(&offset).date_naive().into(),
            None => Local::now().date_naive().into(),
        }
    }
}

/// Always returns the same day. Used by `--today` and by tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    date: CalendarDate,
}

impl FixedClock {
    pub fn new(date: CalendarDate) -> Self {
        Self { date }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> CalendarDate {
        self.date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_returns_given_date() {
        let date = CalendarDate::from_ymd(2025, 10, 2).unwrap();
        let clock: Box<dyn Clock> = Box::new(FixedClock::new(date));
        assert_eq!(clock.today(), date);
    }

    #[test]
    fn offset_clock_stays_within_a_day_of_utc() {
        let utc_today: CalendarDate = Utc::now().date_naive().into();
        for minutes in [-12 * 60, 0, 330, 14 * 60] {
            let clock = SystemClock::with_offset_minutes(minutes).unwrap();
            assert!(clock.today().days_since(utc_today).abs() <= 1);
        }
    }

    #[test]
    fn rejects_out_of_range_offset() {
        assert!(SystemClock::with_offset_minutes(24 * 60).is_none());
    }
}
