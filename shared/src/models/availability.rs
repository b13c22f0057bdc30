//! Availability rules
//!
//! Recursive rule trees attached to products, evaluated at read time by the
//! snapshot layer. The mutation engine itself only needs structural equality
//! (derived `PartialEq`) to detect whether a rule changed.

use chrono::{Datelike, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Recursive availability rule
///
/// `days` uses 0 = Monday … 6 = Sunday. `TimeWindow` minutes are minutes
/// since midnight UTC; `end_minute` is exclusive and may wrap past midnight
/// (`start > end` means the window crosses the day boundary).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AvailabilityRule {
    Always,
    Never,
    TimeWindow { start_minute: u16, end_minute: u16 },
    DaysOfWeek { days: Vec<u8> },
    All { rules: Vec<AvailabilityRule> },
    Any { rules: Vec<AvailabilityRule> },
    Not { rule: Box<AvailabilityRule> },
}

impl AvailabilityRule {
    /// Recursive evaluation at a Unix-millis instant
    pub fn is_met_at(&self, at_millis: i64) -> bool {
        let dt = match Utc.timestamp_millis_opt(at_millis).single() {
            Some(dt) => dt,
            None => return false,
        };
        match self {
            AvailabilityRule::Always => true,
            AvailabilityRule::Never => false,
            AvailabilityRule::TimeWindow {
                start_minute,
                end_minute,
            } => {
                let minute = (dt.hour() * 60 + dt.minute()) as u16;
                if start_minute <= end_minute {
                    minute >= *start_minute && minute < *end_minute
                } else {
                    // Wraps midnight
                    minute >= *start_minute || minute < *end_minute
                }
            }
            AvailabilityRule::DaysOfWeek { days } => {
                let day = dt.weekday().num_days_from_monday() as u8;
                days.contains(&day)
            }
            AvailabilityRule::All { rules } => rules.iter().all(|r| r.is_met_at(at_millis)),
            AvailabilityRule::Any { rules } => rules.iter().any(|r| r.is_met_at(at_millis)),
            AvailabilityRule::Not { rule } => !rule.is_met_at(at_millis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-01-01 was a Monday; 12:00 UTC
    const MONDAY_NOON: i64 = 1_704_110_400_000;

    #[test]
    fn test_time_window() {
        let rule = AvailabilityRule::TimeWindow {
            start_minute: 11 * 60,
            end_minute: 14 * 60,
        };
        assert!(rule.is_met_at(MONDAY_NOON));
        assert!(!rule.is_met_at(MONDAY_NOON + 3 * 3_600_000)); // 15:00
    }

    #[test]
    fn test_time_window_wrapping_midnight() {
        let rule = AvailabilityRule::TimeWindow {
            start_minute: 22 * 60,
            end_minute: 2 * 60,
        };
        assert!(rule.is_met_at(MONDAY_NOON + 11 * 3_600_000)); // 23:00
        assert!(rule.is_met_at(MONDAY_NOON + 13 * 3_600_000)); // 01:00 next day
        assert!(!rule.is_met_at(MONDAY_NOON)); // 12:00
    }

    #[test]
    fn test_nested_rules() {
        // Weekday lunch: Mon-Fri AND 11:00-14:00
        let rule = AvailabilityRule::All {
            rules: vec![
                AvailabilityRule::DaysOfWeek {
                    days: vec![0, 1, 2, 3, 4],
                },
                AvailabilityRule::TimeWindow {
                    start_minute: 11 * 60,
                    end_minute: 14 * 60,
                },
            ],
        };
        assert!(rule.is_met_at(MONDAY_NOON));
        // Saturday noon
        assert!(!rule.is_met_at(MONDAY_NOON + 5 * 86_400_000));
    }

    #[test]
    fn test_not_inverts() {
        let rule = AvailabilityRule::Not {
            rule: Box::new(AvailabilityRule::Never),
        };
        assert!(rule.is_met_at(MONDAY_NOON));
    }

    #[test]
    fn test_structural_equality_not_semantic() {
        // Equivalent in behavior, different in structure — must compare unequal
        let a = AvailabilityRule::Always;
        let b = AvailabilityRule::Not {
            rule: Box::new(AvailabilityRule::Never),
        };
        assert_ne!(a, b);
        assert_eq!(a.is_met_at(MONDAY_NOON), b.is_met_at(MONDAY_NOON));
    }

    #[test]
    fn test_tagged_serde_round_trip() {
        let rule = AvailabilityRule::Any {
            rules: vec![
                AvailabilityRule::TimeWindow {
                    start_minute: 0,
                    end_minute: 120,
                },
                AvailabilityRule::Not {
                    rule: Box::new(AvailabilityRule::DaysOfWeek { days: vec![6] }),
                },
            ],
        };
        let json = serde_json::to_string(&rule).unwrap();
        assert!(json.contains("\"kind\":\"any\""));
        let back: AvailabilityRule = serde_json::from_str(&json).unwrap();
        assert_eq!(rule, back);
    }
}
