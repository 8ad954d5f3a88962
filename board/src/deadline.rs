//! Deadline countdown text and urgency.

use crate::humanize::{HumanDuration, TimeUnit};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Visual urgency of a deadline notice
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    /// Due within the hour, or overdue
    Danger,
    /// Due within the day
    Warning,
    /// Further out
    Secondary,
}

impl Urgency {
    /// Style class name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Danger => "danger",
            Self::Warning => "warning",
            Self::Secondary => "secondary",
        }
    }

    /// Urgency implied by how far away something is
    #[must_use]
    pub const fn for_unit(unit: TimeUnit) -> Self {
        match unit {
            TimeUnit::Seconds | TimeUnit::Minutes => Self::Danger,
            TimeUnit::Hours => Self::Warning,
            TimeUnit::Days | TimeUnit::Months | TimeUnit::Years => Self::Secondary,
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency assigned to deadlines that have already passed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverduePolicy {
    /// Anything overdue is [`Urgency::Danger`]
    #[default]
    AlwaysDanger,
    /// Overdue deadlines are tiered by magnitude like upcoming ones, so
    /// "3 days overdue" shows as [`Urgency::Secondary`]
    ByMagnitude,
}

/// Rendered countdown for one deadline
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineNotice {
    /// `"Time left: …"` or `"… overdue"`
    pub text: String,
    /// Visual urgency
    pub urgency: Urgency,
    /// True once the deadline has passed
    pub overdue: bool,
    /// The humanized distance to the deadline
    pub remaining: HumanDuration,
}

impl DeadlineNotice {
    /// Computes the notice for a deadline at `finish`, seen from `now`
    ///
    /// A deadline exactly at `now` still counts as time left.
    #[must_use]
    pub fn new(finish: DateTime<Utc>, now: DateTime<Utc>, policy: OverduePolicy) -> Self {
        let delta = finish.signed_duration_since(now);
        let remaining = HumanDuration::from_duration(delta);
        let overdue = delta < chrono::Duration::zero();

        let (text, urgency) = if overdue {
            let urgency = match policy {
                OverduePolicy::AlwaysDanger => Urgency::Danger,
                OverduePolicy::ByMagnitude => Urgency::for_unit(remaining.unit),
            };
            (format!("{remaining} overdue"), urgency)
        } else {
            (format!("Time left: {remaining}"), Urgency::for_unit(remaining.unit))
        };

        Self {
            text,
            urgency,
            overdue,
            remaining,
        }
    }
}

/// Notice for an optional deadline; `None` when no deadline is set
#[must_use]
pub fn deadline_notice(
    finish: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    policy: OverduePolicy,
) -> Option<DeadlineNotice> {
    finish.map(|finish| DeadlineNotice::new(finish, now, policy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tidyboard_testing::test_time;

    fn notice(offset: Duration, policy: OverduePolicy) -> DeadlineNotice {
        DeadlineNotice::new(test_time() + offset, test_time(), policy)
    }

    #[test]
    fn thirty_seconds_left_is_danger() {
        let n = notice(Duration::seconds(30), OverduePolicy::default());
        assert_eq!(n.text, "Time left: a few seconds");
        assert_eq!(n.urgency, Urgency::Danger);
        assert!(!n.overdue);
    }

    #[test]
    fn hours_left_is_warning() {
        let n = notice(Duration::hours(5), OverduePolicy::default());
        assert_eq!(n.text, "Time left: 5 hours");
        assert_eq!(n.urgency, Urgency::Warning);
    }

    #[test]
    fn days_left_is_secondary() {
        let n = notice(Duration::days(3), OverduePolicy::default());
        assert_eq!(n.text, "Time left: 3 days");
        assert_eq!(n.urgency, Urgency::Secondary);
    }

    #[test]
    fn two_hours_overdue_is_danger_by_default() {
        let n = notice(Duration::hours(-2), OverduePolicy::AlwaysDanger);
        assert_eq!(n.text, "2 hours overdue");
        assert_eq!(n.urgency, Urgency::Danger);
        assert!(n.overdue);
    }

    #[test]
    fn magnitude_policy_tiers_overdue() {
        let n = notice(Duration::hours(-2), OverduePolicy::ByMagnitude);
        assert_eq!(n.urgency, Urgency::Warning);

        let n = notice(Duration::days(-40), OverduePolicy::ByMagnitude);
        assert_eq!(n.text, "a month overdue");
        assert_eq!(n.urgency, Urgency::Secondary);
    }

    #[test]
    fn deadline_at_now_is_time_left() {
        let n = notice(Duration::zero(), OverduePolicy::default());
        assert_eq!(n.text, "Time left: a few seconds");
        assert!(!n.overdue);
    }

    #[test]
    fn no_deadline_no_notice() {
        assert_eq!(deadline_notice(None, test_time(), OverduePolicy::default()), None);
        assert!(deadline_notice(Some(test_time()), test_time(), OverduePolicy::default()).is_some());
    }

    #[test]
    fn urgency_class_names() {
        assert_eq!(Urgency::Danger.as_str(), "danger");
        assert_eq!(Urgency::Warning.to_string(), "warning");
        assert_eq!(Urgency::Secondary.as_str(), "secondary");
    }
}
