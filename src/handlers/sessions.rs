use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{ConversationMessage, MeetingRecord, Phase, Session};
use crate::services::conversation::{self, Participants, TurnReply};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ParticipantsPayload {
    pub recruiter_email: Option<String>,
    pub candidate_email: Option<String>,
    pub department: Option<String>,
}

impl From<ParticipantsPayload> for Participants {
    fn from(p: ParticipantsPayload) -> Self {
        Participants {
            recruiter_email: p.recruiter_email,
            candidate_email: p.candidate_email,
            department: p.department,
        }
    }
}

#[derive(Deserialize)]
pub struct MessagePayload {
    pub message: String,
}

#[derive(Serialize)]
pub struct SessionView {
    pub id: String,
    pub phase: Phase,
    pub department: String,
    pub recruiter_email: String,
    pub candidate_email: String,
    pub proposed_date_time: Option<String>,
    pub pending_date: Option<String>,
    pub pending_time: Option<String>,
    pub meeting_type: Option<String>,
    pub duration_minutes: i64,
    pub messages: Vec<ConversationMessage>,
}

impl From<Session> for SessionView {
    fn from(s: Session) -> Self {
        let st = s.state;
        SessionView {
            id: s.id,
            phase: st.phase,
            department: st.department,
            recruiter_email: st.organizer_email,
            candidate_email: st.attendee_email,
            proposed_date_time: st.proposed_date_time.map(|dt| dt.to_rfc3339()),
            pending_date: st.pending_date.map(|d| d.format("%Y-%m-%d").to_string()),
            pending_time: st.pending_time.map(|t| t.format("%H:%M").to_string()),
            meeting_type: st.meeting_type,
            duration_minutes: st.duration_minutes,
            messages: s.messages,
        }
    }
}

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    payload: Option<Json<ParticipantsPayload>>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let participants = payload.map(|Json(p)| p).unwrap_or_default();
    let session = conversation::start_session(&state, participants.into())?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    let session = conversation::load_session(&state, &id)?;
    Ok(Json(session.into()))
}

pub async fn update_participants(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<ParticipantsPayload>,
) -> Result<Json<SessionView>, AppError> {
    let session = conversation::update_participants(&state, &id, payload.into()).await?;
    Ok(Json(session.into()))
}

pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<MessagePayload>,
) -> Result<Json<TurnReply>, AppError> {
    let message = payload.message.trim();
    if message.is_empty() {
        return Err(AppError::Validation("message must not be empty".to_string()));
    }
    let reply = conversation::process_message(&state, &id, message).await?;
    Ok(Json(reply))
}

pub async fn reset_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    let session = conversation::reset_session(&state, &id).await?;
    Ok(Json(session.into()))
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    conversation::end_session(&state, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_meetings(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<MeetingRecord>>, AppError> {
    // 404 for unknown sessions rather than an empty list
    conversation::load_session(&state, &id)?;
    let db = state.db.lock().unwrap_or_else(|p| p.into_inner());
    let meetings = queries::get_meetings_for_session(&db, &id)?;
    Ok(Json(meetings))
}
