use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::OwnedMutexGuard;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{
    ConversationMessage, ConversationState, MeetingRecord, MeetingStatus, Phase, Session,
};
use crate::services::dialogue::{Effect, GREETING};
use crate::services::slots::canonical_department;
use crate::state::AppState;

const MISSING_EMAILS: &str =
    "Please enter both recruiter and candidate email addresses before we start scheduling.";

#[derive(Debug, Clone, Serialize)]
pub struct TurnReply {
    pub reply: String,
    pub phase: Phase,
}

#[derive(Debug, Default, Clone)]
pub struct Participants {
    pub recruiter_email: Option<String>,
    pub candidate_email: Option<String>,
    pub department: Option<String>,
}

pub fn start_session(state: &Arc<AppState>, participants: Participants) -> Result<Session, AppError> {
    let department = canonical_department(&state.config.default_department)
        .map(str::to_string)
        .unwrap_or_else(|| state.config.default_department.clone());
    let mut conv = ConversationState::new(department, state.config.default_duration_minutes);
    conv.organizer_email = state.config.default_recruiter_email.clone();
    apply_participants(&mut conv, participants)?;

    let now = Utc::now().naive_utc();
    let session = Session {
        id: uuid::Uuid::new_v4().to_string(),
        state: conv,
        messages: vec![ConversationMessage::assistant(GREETING)],
        created_at: now,
        updated_at: now,
    };

    {
        let db = lock_db(state);
        queries::create_session(&db, &session)?;
    }

    tracing::info!(session_id = %session.id, "session started");
    Ok(session)
}

pub fn load_session(state: &Arc<AppState>, session_id: &str) -> Result<Session, AppError> {
    let db = lock_db(state);
    queries::get_session(&db, session_id)?
        .ok_or_else(|| AppError::NotFound(format!("session {session_id}")))
}

pub async fn update_participants(
    state: &Arc<AppState>,
    session_id: &str,
    participants: Participants,
) -> Result<Session, AppError> {
    let _turn = lock_turn(state, session_id).await?;

    let mut session = load_session(state, session_id)?;
    apply_participants(&mut session.state, participants)?;
    persist(state, &mut session)?;
    Ok(session)
}

/// Explicit reset back to a fresh greeting. Participants are kept.
pub async fn reset_session(state: &Arc<AppState>, session_id: &str) -> Result<Session, AppError> {
    let _turn = lock_turn(state, session_id).await?;

    let mut session = load_session(state, session_id)?;
    session.state.reset();
    session.state.duration_minutes = state.config.default_duration_minutes;
    session.messages = vec![ConversationMessage::assistant(GREETING)];
    persist(state, &mut session)?;

    tracing::info!(session_id, "session reset");
    Ok(session)
}

pub async fn end_session(state: &Arc<AppState>, session_id: &str) -> Result<(), AppError> {
    let deleted = {
        let _turn = lock_turn(state, session_id).await?;
        let db = lock_db(state);
        queries::delete_session(&db, session_id)?
    };
    state.forget_session_lock(session_id);

    if deleted {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("session {session_id}")))
    }
}

pub async fn process_message(
    state: &Arc<AppState>,
    session_id: &str,
    message: &str,
) -> Result<TurnReply, AppError> {
    process_message_at(state, session_id, message, Utc::now()).await
}

pub async fn process_message_at(
    state: &Arc<AppState>,
    session_id: &str,
    message: &str,
    now: DateTime<Utc>,
) -> Result<TurnReply, AppError> {
    let _turn = lock_turn(state, session_id).await?;

    let mut session = load_session(state, session_id)?;
    session.messages.push(ConversationMessage::user(message));

    let reply = if session.state.has_participants() {
        let turn = state.dialogue.handle(&mut session.state, message, now).await;
        apply_effects(state, &session.id, &turn.effects)?;
        turn.reply
    } else {
        tracing::debug!(session_id, "turn rejected, participants missing");
        MISSING_EMAILS.to_string()
    };

    session.messages.push(ConversationMessage::assistant(reply.clone()));
    persist(state, &mut session)?;

    tracing::info!(
        session_id,
        phase = session.state.phase.as_str(),
        "processed message"
    );

    Ok(TurnReply {
        reply,
        phase: session.state.phase,
    })
}

/// Waits for the session's turn. Unknown ids are rejected before a lock
/// entry is created for them.
async fn lock_turn(
    state: &Arc<AppState>,
    session_id: &str,
) -> Result<OwnedMutexGuard<()>, AppError> {
    let exists = {
        let db = lock_db(state);
        queries::session_exists(&db, session_id)?
    };
    if !exists {
        return Err(AppError::NotFound(format!("session {session_id}")));
    }
    Ok(state.session_lock(session_id).lock_owned().await)
}

fn apply_participants(conv: &mut ConversationState, p: Participants) -> Result<(), AppError> {
    if let Some(email) = p.recruiter_email {
        conv.organizer_email = validate_email(&email)?;
    }
    if let Some(email) = p.candidate_email {
        conv.attendee_email = validate_email(&email)?;
    }
    if let Some(department) = p.department {
        let canonical = canonical_department(&department).ok_or_else(|| {
            AppError::Validation(format!("unknown department: {}", department.trim()))
        })?;
        conv.department = canonical.to_string();
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<String, AppError> {
    let email = email.trim();
    let valid = email
        .split_once('@')
        .map(|(user, domain)| !user.is_empty() && domain.contains('.') && !domain.starts_with('.'))
        .unwrap_or(false);
    if valid && !email.contains(char::is_whitespace) {
        Ok(email.to_string())
    } else {
        Err(AppError::Validation(format!("invalid email address: {email}")))
    }
}

fn apply_effects(state: &Arc<AppState>, session_id: &str, effects: &[Effect]) -> Result<(), AppError> {
    let db = lock_db(state);
    for effect in effects {
        match effect {
            Effect::InviteDispatched(descriptor) => {
                let record = MeetingRecord {
                    id: uuid::Uuid::new_v4().to_string(),
                    session_id: session_id.to_string(),
                    descriptor: descriptor.clone(),
                    status: MeetingStatus::Scheduled,
                    created_at: Utc::now().naive_utc(),
                };
                queries::insert_meeting(&db, &record)?;
                tracing::info!(session_id, meeting_id = %record.id, "meeting recorded");
            }
            Effect::MeetingCancelled => {
                let count = queries::cancel_meetings_for_session(&db, session_id)?;
                tracing::info!(session_id, count, "meetings cancelled");
            }
            Effect::InviteFailed => {
                tracing::warn!(session_id, "invite dispatch failed, awaiting retry");
            }
            Effect::SlotSuggested(_) | Effect::StateReset => {}
        }
    }
    Ok(())
}

fn persist(state: &Arc<AppState>, session: &mut Session) -> Result<(), AppError> {
    session.updated_at = Utc::now().naive_utc();
    let db = lock_db(state);
    queries::save_session(&db, session)?;
    Ok(())
}

fn lock_db(state: &AppState) -> std::sync::MutexGuard<'_, rusqlite::Connection> {
    state
        .db
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email(" a@b.com ").unwrap(), "a@b.com");
        assert!(validate_email("ab.com").is_err());
        assert!(validate_email("@b.com").is_err());
        assert!(validate_email("a@bcom").is_err());
        assert!(validate_email("a b@c.com").is_err());
    }

    #[test]
    fn test_apply_participants() {
        let mut conv = ConversationState::new("Engineering", 60);
        apply_participants(
            &mut conv,
            Participants {
                recruiter_email: Some("r@example.com".to_string()),
                candidate_email: None,
                department: Some("Design".to_string()),
            },
        )
        .unwrap();
        assert_eq!(conv.organizer_email, "r@example.com");
        assert_eq!(conv.department, "Design");
        assert!(!conv.has_participants());

        let err = apply_participants(
            &mut conv,
            Participants {
                department: Some("Legal".to_string()),
                ..Default::default()
            },
        );
        assert!(matches!(err, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_department_stored_in_canonical_case() {
        let mut conv = ConversationState::new("Engineering", 60);
        apply_participants(
            &mut conv,
            Participants {
                department: Some(" hr ".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(conv.department, "HR");
    }
}
