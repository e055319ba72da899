use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::services::calendar::generate_ics;
use crate::services::conversation;
use crate::services::slots::meeting_duration;
use crate::state::AppState;

pub async fn download_ics(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let session = conversation::load_session(&state, &id)?;
    let meeting = session
        .state
        .meeting
        .ok_or_else(|| AppError::NotFound(format!("no scheduled meeting for session {id}")))?;

    let ics = generate_ics(&meeting, &session.id, Utc::now());
    let filename = format!("interview-{}.ics", session.id);

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8; method=REQUEST".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        ics,
    )
        .into_response())
}

#[derive(Deserialize)]
pub struct NextSlotQuery {
    pub meeting_type: Option<String>,
    pub from: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct NextSlot {
    pub meeting_type: String,
    pub duration_minutes: i64,
    pub start: Option<DateTime<Utc>>,
}

pub async fn next_slot(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NextSlotQuery>,
) -> Json<NextSlot> {
    let meeting_type = query
        .meeting_type
        .unwrap_or_else(|| "Technical Interview".to_string());
    let from = query.from.unwrap_or_else(Utc::now);
    let start = state.working_hours.suggest_next_slot(&meeting_type, from);

    Json(NextSlot {
        duration_minutes: meeting_duration(&meeting_type),
        meeting_type,
        start,
    })
}
