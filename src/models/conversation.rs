use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::MeetingDescriptor;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Greeting,
    CollectingAvailability,
    ConfirmSchedule,
    Completed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Greeting => "greeting",
            Phase::CollectingAvailability => "collecting_availability",
            Phase::ConfirmSchedule => "confirm_schedule",
            Phase::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "collecting_availability" => Phase::CollectingAvailability,
            "confirm_schedule" => Phase::ConfirmSchedule,
            "completed" => Phase::Completed,
            _ => Phase::Greeting,
        }
    }
}

/// Progress of one scheduling dialogue. Owned by exactly one session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationState {
    pub phase: Phase,
    pub proposed_date_time: Option<DateTime<Utc>>,
    pub pending_date: Option<NaiveDate>,
    pub pending_time: Option<NaiveTime>,
    pub department: String,
    pub meeting_type: Option<String>,
    pub duration_minutes: i64,
    #[serde(default)]
    pub organizer_email: String,
    #[serde(default)]
    pub attendee_email: String,
    /// Last successfully dispatched meeting, kept until cancel/reschedule.
    #[serde(default)]
    pub meeting: Option<MeetingDescriptor>,
}

impl ConversationState {
    pub fn new(department: impl Into<String>, duration_minutes: i64) -> Self {
        Self {
            phase: Phase::Greeting,
            proposed_date_time: None,
            pending_date: None,
            pending_time: None,
            department: department.into(),
            meeting_type: None,
            duration_minutes,
            organizer_email: String::new(),
            attendee_email: String::new(),
            meeting: None,
        }
    }

    pub fn has_participants(&self) -> bool {
        !self.organizer_email.trim().is_empty() && !self.attendee_email.trim().is_empty()
    }

    /// Drops everything the user proposed or scheduled. Participants and
    /// department survive since the caller owns them.
    pub fn clear_schedule(&mut self) {
        self.proposed_date_time = None;
        self.pending_date = None;
        self.pending_time = None;
        self.meeting = None;
    }

    pub fn reset(&mut self) {
        self.clear_schedule();
        self.phase = Phase::Greeting;
        self.meeting_type = None;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationMessage {
    pub role: String,
    pub content: String,
}

impl ConversationMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub state: ConversationState,
    pub messages: Vec<ConversationMessage>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_round_trips_through_str() {
        for phase in [
            Phase::Greeting,
            Phase::CollectingAvailability,
            Phase::ConfirmSchedule,
            Phase::Completed,
        ] {
            assert_eq!(Phase::parse(phase.as_str()), phase);
        }
        assert_eq!(Phase::parse("garbage"), Phase::Greeting);
    }

    #[test]
    fn test_reset_keeps_participants() {
        let mut state = ConversationState::new("HR", 60);
        state.organizer_email = "r@example.com".to_string();
        state.attendee_email = "c@example.com".to_string();
        state.phase = Phase::Completed;
        state.pending_date = NaiveDate::from_ymd_opt(2025, 1, 1);
        state.meeting_type = Some("HR Screening".to_string());

        state.reset();

        assert_eq!(state.phase, Phase::Greeting);
        assert!(state.pending_date.is_none());
        assert!(state.meeting_type.is_none());
        assert!(state.has_participants());
        assert_eq!(state.department, "HR");
    }

    #[test]
    fn test_has_participants_rejects_blank() {
        let mut state = ConversationState::new("HR", 60);
        state.organizer_email = "r@example.com".to_string();
        state.attendee_email = "   ".to_string();
        assert!(!state.has_participants());
    }
}
