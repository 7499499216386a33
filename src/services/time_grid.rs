use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::Interval;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GridError {
    #[error("invalid grid configuration: {0}")]
    InvalidConfiguration(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridConfig {
    pub open_hour: u32,
    pub close_hour: u32,
    pub step_minutes: i64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            open_hour: 9,
            close_hour: 21,
            step_minutes: 30,
        }
    }
}

impl GridConfig {
    pub fn generate(&self, day: NaiveDate, duration_minutes: i64) -> Result<Vec<Interval>, GridError> {
        generate(
            day,
            self.open_hour,
            self.close_hour,
            self.step_minutes,
            duration_minutes,
        )
    }
}

fn at_hour(day: NaiveDate, hour: u32) -> NaiveDateTime {
    // close_hour may be 24, which lands on the following midnight
    day.and_time(NaiveTime::default()) + Duration::hours(i64::from(hour))
}

pub fn generate(
    day: NaiveDate,
    open_hour: u32,
    close_hour: u32,
    step_minutes: i64,
    duration_minutes: i64,
) -> Result<Vec<Interval>, GridError> {
    if open_hour >= close_hour || close_hour > 24 {
        return Err(GridError::InvalidConfiguration(format!(
            "opening hours {open_hour}-{close_hour} are not a valid range"
        )));
    }
    if step_minutes <= 0 {
        return Err(GridError::InvalidConfiguration(format!(
            "step must be positive, got {step_minutes} minutes"
        )));
    }
    if duration_minutes <= 0 {
        return Err(GridError::InvalidConfiguration(format!(
            "duration must be positive, got {duration_minutes} minutes"
        )));
    }

    let window = i64::from(close_hour - open_hour) * 60;
    if duration_minutes > window {
        return Ok(Vec::new());
    }

    let open = at_hour(day, open_hour);
    let close = at_hour(day, close_hour);
    // both bounded by the window, so these cannot overflow
    let step = Duration::minutes(step_minutes.min(window));
    let duration = Duration::minutes(duration_minutes);

    let mut slots = Vec::new();
    let mut start = open;
    while start < close {
        let end = match start.checked_add_signed(duration) {
            Some(end) if end <= close => end,
            _ => break,
        };
        let interval = Interval::new(start, end)
            .map_err(|e| GridError::InvalidConfiguration(e.to_string()))?;
        slots.push(interval);
        start = match start.checked_add_signed(step) {
            Some(next) => next,
            None => break,
        };
    }

    Ok(slots)
}
