pub mod email;

use async_trait::async_trait;

use crate::models::MeetingDescriptor;

/// Sends a finalized meeting to its participants. Returns `false` on any
/// failure; transport errors never escape an implementation.
#[async_trait]
pub trait InviteDispatcher: Send + Sync {
    async fn send(&self, meeting: &MeetingDescriptor) -> bool;
}

/// Logs invites instead of delivering them. Used when no mail relay is configured.
pub struct LogDispatcher;

#[async_trait]
impl InviteDispatcher for LogDispatcher {
    async fn send(&self, meeting: &MeetingDescriptor) -> bool {
        tracing::info!(
            title = %meeting.title,
            start = %meeting.start,
            organizer = %meeting.organizer_email,
            attendee = %meeting.attendee_email,
            "mail relay not configured, invite logged only"
        );
        true
    }
}
