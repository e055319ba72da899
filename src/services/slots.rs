use chrono::{DateTime, Datelike, Duration, Timelike, Utc, Weekday};

use crate::models::SlotSuggestion;

pub const DEPARTMENTS: [&str; 6] = ["Engineering", "HR", "Sales", "Marketing", "Product", "Design"];

const DEFAULT_MEETING_TYPE: &str = "Technical Interview";

/// Picks a meeting type for a department. Implementations must always answer.
pub trait SlotSuggester: Send + Sync {
    fn suggest(&self, department: &str, duration_minutes: i64) -> SlotSuggestion;
}

/// Fixed department table standing in for a trained classifier.
#[derive(Debug, Default, Clone)]
pub struct LookupSlotSuggester;

impl SlotSuggester for LookupSlotSuggester {
    fn suggest(&self, department: &str, duration_minutes: i64) -> SlotSuggestion {
        let meeting_type = match department.trim().to_lowercase().as_str() {
            "engineering" => "Technical Interview",
            "hr" => "HR Screening",
            "sales" | "marketing" => "Initial Discussion",
            "product" | "design" => "Project Presentation",
            _ => DEFAULT_MEETING_TYPE,
        };

        SlotSuggestion {
            meeting_type: meeting_type.to_string(),
            duration_minutes,
        }
    }
}

/// The `DEPARTMENTS` entry matching `department`, ignoring case and
/// surrounding whitespace.
pub fn canonical_department(department: &str) -> Option<&'static str> {
    DEPARTMENTS
        .iter()
        .copied()
        .find(|d| d.eq_ignore_ascii_case(department.trim()))
}

pub fn meeting_duration(meeting_type: &str) -> i64 {
    match meeting_type {
        "Technical Interview" | "Project Presentation" => 60,
        "HR Screening" => 45,
        "Final Round" => 90,
        "Initial Discussion" | "Follow-up Meeting" => 30,
        _ => 60,
    }
}

/// Weekday office hours in UTC, `start` inclusive and `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingHours {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            start_hour: 9,
            end_hour: 17,
        }
    }
}

impl WorkingHours {
    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        let weekend = matches!(ts.weekday(), Weekday::Sat | Weekday::Sun);
        !weekend && self.start_hour <= ts.hour() && ts.hour() < self.end_hour
    }

    /// Working hours are the only constraint; there is no calendar to
    /// conflict with, so the duration does not narrow anything yet.
    pub fn check_availability(&self, ts: &DateTime<Utc>, _duration_minutes: i64) -> bool {
        self.contains(ts)
    }

    /// First whole-hour slot within the next five calendar days, starting
    /// from `start_from`'s own day.
    pub fn suggest_next_slot(
        &self,
        meeting_type: &str,
        start_from: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        let duration = meeting_duration(meeting_type);
        let first_day = start_from.date_naive();

        for offset in 0..5 {
            let day = first_day + Duration::days(offset);
            if matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
                continue;
            }

            for hour in self.start_hour..self.end_hour {
                let Some(slot) = day.and_hms_opt(hour, 0, 0).map(|dt| dt.and_utc()) else {
                    continue;
                };
                if slot < start_from {
                    continue;
                }
                if self.check_availability(&slot, duration) {
                    return Some(slot);
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_lookup_by_department() {
        let s = LookupSlotSuggester;
        assert_eq!(s.suggest("Engineering", 60).meeting_type, "Technical Interview");
        assert_eq!(s.suggest("hr", 60).meeting_type, "HR Screening");
        assert_eq!(s.suggest("Sales", 60).meeting_type, "Initial Discussion");
        assert_eq!(s.suggest("Design", 60).meeting_type, "Project Presentation");
        assert_eq!(s.suggest("Legal", 60).meeting_type, "Technical Interview");
    }

    #[test]
    fn test_lookup_echoes_duration() {
        let suggestion = LookupSlotSuggester.suggest("HR", 25);
        assert_eq!(suggestion.duration_minutes, 25);
        assert_eq!(
            suggestion.to_message(),
            "I suggest scheduling a HR Screening for 25 minutes."
        );
    }

    #[test]
    fn test_known_departments() {
        assert_eq!(canonical_department("engineering"), Some("Engineering"));
        assert_eq!(canonical_department(" Product "), Some("Product"));
        assert_eq!(canonical_department("hr"), Some("HR"));
        assert_eq!(canonical_department("Legal"), None);
    }

    #[test]
    fn test_meeting_durations() {
        assert_eq!(meeting_duration("HR Screening"), 45);
        assert_eq!(meeting_duration("Final Round"), 90);
        assert_eq!(meeting_duration("Follow-up Meeting"), 30);
        assert_eq!(meeting_duration("Something Else"), 60);
    }

    #[test]
    fn test_working_hours() {
        let hours = WorkingHours::default();
        // 2025-06-16 is a Monday
        assert!(hours.contains(&ts(2025, 6, 16, 9, 0)));
        assert!(hours.contains(&ts(2025, 6, 16, 16, 59)));
        assert!(!hours.contains(&ts(2025, 6, 16, 17, 0)));
        assert!(!hours.contains(&ts(2025, 6, 16, 8, 59)));
        assert!(!hours.contains(&ts(2025, 6, 14, 10, 0)));
    }

    #[test]
    fn test_next_slot_same_day() {
        let hours = WorkingHours::default();
        let slot = hours.suggest_next_slot("HR Screening", ts(2025, 6, 16, 10, 30));
        assert_eq!(slot, Some(ts(2025, 6, 16, 11, 0)));
    }

    #[test]
    fn test_next_slot_rolls_to_next_day_after_hours() {
        let hours = WorkingHours::default();
        let slot = hours.suggest_next_slot("HR Screening", ts(2025, 6, 16, 18, 0));
        assert_eq!(slot, Some(ts(2025, 6, 17, 9, 0)));
    }

    #[test]
    fn test_next_slot_skips_weekend() {
        let hours = WorkingHours::default();
        // Saturday evening, Monday morning is the first slot
        let slot = hours.suggest_next_slot("Final Round", ts(2025, 6, 14, 20, 0));
        assert_eq!(slot, Some(ts(2025, 6, 16, 9, 0)));
    }

    #[test]
    fn test_next_slot_none_when_window_has_no_hours() {
        let hours = WorkingHours {
            start_hour: 9,
            end_hour: 9,
        };
        assert_eq!(hours.suggest_next_slot("HR Screening", ts(2025, 6, 16, 8, 0)), None);
    }
}
