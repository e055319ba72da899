pub mod conversation;
pub mod intent;
pub mod meeting;
pub mod moment;

pub use conversation::{ConversationMessage, ConversationState, Phase, Session};
pub use intent::{ClassifiedIntent, Intent};
pub use meeting::{MeetingDescriptor, MeetingRecord, MeetingStatus, SlotSuggestion};
pub use moment::ParsedMoment;
