//! Coarse natural-language durations ("a few seconds", "3 hours", "a year").
//!
//! Each candidate unit is the absolute duration rounded half-up to a whole
//! number of that unit; the first unit whose threshold holds wins:
//!
//! | Rounded value      | Output            |
//! |--------------------|-------------------|
//! | seconds ≤ 44       | a few seconds     |
//! | minutes ≤ 1        | a minute          |
//! | minutes < 45       | N minutes         |
//! | hours ≤ 1          | an hour           |
//! | hours < 22         | N hours           |
//! | days ≤ 1           | a day             |
//! | days < 26          | N days            |
//! | months ≤ 1         | a month           |
//! | months < 11        | N months          |
//! | years ≤ 1          | a year            |
//! | otherwise          | N years           |
//!
//! Months and years use the average Gregorian month (146097 / 4800 days).

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

const MS_PER_SECOND: i128 = 1_000;
const MS_PER_MINUTE: i128 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i128 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i128 = 24 * MS_PER_HOUR;
/// Days in a 400-year Gregorian cycle
const DAYS_PER_CYCLE: i128 = 146_097;
/// Months in a 400-year Gregorian cycle
const MONTHS_PER_CYCLE: i128 = 4_800;
/// Years in a 400-year Gregorian cycle
const YEARS_PER_CYCLE: i128 = 400;

/// The unit a humanized duration was expressed in
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// Under ~45 seconds
    Seconds,
    /// Minutes
    Minutes,
    /// Hours
    Hours,
    /// Days
    Days,
    /// Months
    Months,
    /// Years
    Years,
}

/// A duration rounded to a single unit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HumanDuration {
    /// Unit chosen by the thresholds
    pub unit: TimeUnit,
    /// Rounded amount; `1` for the singular forms, `0` for "a few seconds"
    pub count: u64,
}

impl HumanDuration {
    /// Humanizes the absolute value of `duration`
    #[must_use]
    pub fn from_duration(duration: Duration) -> Self {
        let ms = i128::from(duration.num_milliseconds()).abs();

        let seconds = round_div(ms, MS_PER_SECOND);
        if seconds <= 44 {
            return Self::new(TimeUnit::Seconds, 0);
        }

        let minutes = round_div(ms, MS_PER_MINUTE);
        if minutes < 45 {
            return Self::new(TimeUnit::Minutes, minutes.max(1));
        }

        let hours = round_div(ms, MS_PER_HOUR);
        if hours < 22 {
            return Self::new(TimeUnit::Hours, hours.max(1));
        }

        let days = round_div(ms, MS_PER_DAY);
        if days < 26 {
            return Self::new(TimeUnit::Days, days.max(1));
        }

        let months = round_div(ms * MONTHS_PER_CYCLE, DAYS_PER_CYCLE * MS_PER_DAY);
        if months < 11 {
            return Self::new(TimeUnit::Months, months.max(1));
        }

        let years = round_div(ms * YEARS_PER_CYCLE, DAYS_PER_CYCLE * MS_PER_DAY);
        Self::new(TimeUnit::Years, years.max(1))
    }

    fn new(unit: TimeUnit, count: i128) -> Self {
        Self {
            unit,
            count: u64::try_from(count).unwrap_or(u64::MAX),
        }
    }

    /// True for the units that render as "soon" (seconds and minutes)
    #[must_use]
    pub const fn is_imminent(self) -> bool {
        matches!(self.unit, TimeUnit::Seconds | TimeUnit::Minutes)
    }
}

/// Rounds `num / den` half-up; both must be non-negative
const fn round_div(num: i128, den: i128) -> i128 {
    (2 * num + den) / (2 * den)
}

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (singular, plural) = match self.unit {
            TimeUnit::Seconds => return f.write_str("a few seconds"),
            TimeUnit::Minutes => ("a minute", "minutes"),
            TimeUnit::Hours => ("an hour", "hours"),
            TimeUnit::Days => ("a day", "days"),
            TimeUnit::Months => ("a month", "months"),
            TimeUnit::Years => ("a year", "years"),
        };
        if self.count <= 1 {
            f.write_str(singular)
        } else {
            write!(f, "{} {plural}", self.count)
        }
    }
}

/// Shorthand for `HumanDuration::from_duration(duration).to_string()`
#[must_use]
pub fn humanize(duration: Duration) -> String {
    HumanDuration::from_duration(duration).to_string()
}
