use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlotSuggestion {
    pub meeting_type: String,
    pub duration_minutes: i64,
}

impl SlotSuggestion {
    pub fn to_message(&self) -> String {
        format!(
            "I suggest scheduling a {} for {} minutes.",
            self.meeting_type, self.duration_minutes
        )
    }
}

/// Everything an invite dispatcher needs to notify both participants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeetingDescriptor {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub timezone: String,
    pub location: String,
    pub description: String,
    pub meeting_type: String,
    pub organizer_email: String,
    pub attendee_email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum MeetingStatus {
    Scheduled,
    Cancelled,
}

impl MeetingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingStatus::Scheduled => "scheduled",
            MeetingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "cancelled" => MeetingStatus::Cancelled,
            _ => MeetingStatus::Scheduled,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingRecord {
    pub id: String,
    pub session_id: String,
    #[serde(flatten)]
    pub descriptor: MeetingDescriptor,
    pub status: MeetingStatus,
    pub created_at: NaiveDateTime,
}
