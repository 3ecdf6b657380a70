use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Simulated seconds in one in-game day.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Monotonic simulated clock. Time only moves forward.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimClock {
    start_date: NaiveDate,
    elapsed_secs: f64,
    day: u32,
}

impl SimClock {
    pub fn new(start_date: NaiveDate) -> Self {
        Self {
            start_date,
            elapsed_secs: 0.0,
            day: 0,
        }
    }

    /// Advance by `dt` seconds and return how many day boundaries were crossed.
    /// Negative or non-finite steps are ignored.
    pub fn advance(&mut self, dt: f64) -> u32 {
        if !dt.is_finite() || dt <= 0.0 {
            return 0;
        }
        self.elapsed_secs += dt;
        let day = (self.elapsed_secs / SECONDS_PER_DAY).floor() as u32;
        let crossed = day.saturating_sub(self.day);
        self.day = self.day.max(day);
        crossed
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }

    /// Whole days elapsed since the start date.
    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Calendar date of the current day.
    pub fn date(&self) -> NaiveDate {
        self.start_date
            .checked_add_days(Days::new(u64::from(self.day)))
            .unwrap_or(self.start_date)
    }
}

/// Convert a tick length in seconds into a fraction of a day.
pub fn secs_to_days(dt: f64) -> f64 {
    dt / SECONDS_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crosses_day_boundaries() {
        let mut clock = SimClock::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(clock.advance(SECONDS_PER_DAY / 2.0), 0);
        assert_eq!(clock.advance(SECONDS_PER_DAY / 2.0), 1);
        assert_eq!(clock.advance(SECONDS_PER_DAY * 3.0), 3);
        assert_eq!(clock.day(), 4);
        assert_eq!(clock.date(), NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    }

    #[test]
    fn ignores_backwards_steps() {
        let mut clock = SimClock::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        clock.advance(100.0);
        assert_eq!(clock.advance(-50.0), 0);
        assert_eq!(clock.advance(f64::NAN), 0);
        assert_eq!(clock.elapsed_secs(), 100.0);
    }
}
