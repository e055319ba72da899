use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Date and time-of-day pulled out of one message. Either half may be missing.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParsedMoment {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
}

impl ParsedMoment {
    /// Combined UTC timestamp, only when both halves were found.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        match (self.date, self.time) {
            (Some(d), Some(t)) => Some(d.and_time(t).and_utc()),
            _ => None,
        }
    }
}
