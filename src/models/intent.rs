use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    OfferAvailability,
    ScheduleMeeting,
    Reschedule,
    CancelMeeting,
    RequestTimeSlot,
    Unknown,
}

impl Intent {
    pub fn reply(&self) -> &'static str {
        match self {
            Intent::OfferAvailability => {
                "Thanks for sharing your availability. Which exact day and time should I book, for example 'tomorrow at 2 PM'?"
            }
            Intent::ScheduleMeeting => "Please let me know your preferred day and time first.",
            Intent::Reschedule => {
                "I understand you want to reschedule. Please provide your new availability."
            }
            Intent::CancelMeeting => {
                "I'll help you cancel the meeting. Please confirm if you want to proceed."
            }
            Intent::RequestTimeSlot => {
                "I'll help you find a suitable time slot. What days work best for you?"
            }
            Intent::Unknown => "I'm not sure how to help with that. Could you please rephrase?",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedIntent {
    pub intent: Intent,
}
