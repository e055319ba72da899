use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use base64::Engine;
use chrono::Utc;
use serde_json::json;

use super::InviteDispatcher;
use crate::models::MeetingDescriptor;
use crate::services::calendar::{email_body, generate_ics};

/// Delivers invites through a JSON mail relay (SendGrid v3 `mail/send` shape)
/// with the iCalendar request attached.
pub struct HttpMailDispatcher {
    api_url: String,
    api_key: String,
    from_email: String,
    client: reqwest::Client,
}

impl HttpMailDispatcher {
    /// `timeout` bounds the whole relay exchange; a relay that never answers
    /// counts as a failed dispatch.
    pub fn new(
        api_url: String,
        api_key: String,
        from_email: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build mail relay client")?;

        Ok(Self {
            api_url,
            api_key,
            from_email,
            client,
        })
    }

    fn payload(&self, meeting: &MeetingDescriptor, ics: &str) -> serde_json::Value {
        let attachment = base64::engine::general_purpose::STANDARD.encode(ics);

        json!({
            "personalizations": [{
                "to": [
                    { "email": meeting.attendee_email },
                    { "email": meeting.organizer_email },
                ],
            }],
            "from": { "email": self.from_email },
            "subject": meeting.title,
            "content": [{
                "type": "text/plain",
                "value": email_body(meeting),
            }],
            "attachments": [{
                "content": attachment,
                "type": "text/calendar; method=REQUEST",
                "filename": "invite.ics",
                "disposition": "attachment",
            }],
        })
    }

    async fn deliver(&self, meeting: &MeetingDescriptor) -> anyhow::Result<()> {
        let uid = uuid::Uuid::new_v4().to_string();
        let ics = generate_ics(meeting, &uid, Utc::now());
        let body = self.payload(meeting, &ics);

        self.client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("failed to reach mail relay")?
            .error_for_status()
            .context("mail relay returned error")?;

        Ok(())
    }
}

#[async_trait]
impl InviteDispatcher for HttpMailDispatcher {
    async fn send(&self, meeting: &MeetingDescriptor) -> bool {
        match self.deliver(meeting).await {
            Ok(()) => {
                tracing::info!(attendee = %meeting.attendee_email, "calendar invite sent");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to send calendar invite");
                false
            }
        }
    }
}
