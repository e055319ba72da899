pub mod calendar;
pub mod health;
pub mod sessions;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/sessions", post(sessions::create_session))
        .route(
            "/api/sessions/:id",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route(
            "/api/sessions/:id/participants",
            put(sessions::update_participants),
        )
        .route("/api/sessions/:id/messages", post(sessions::send_message))
        .route("/api/sessions/:id/reset", post(sessions::reset_session))
        .route("/api/sessions/:id/meetings", get(sessions::list_meetings))
        .route("/api/sessions/:id/invite.ics", get(calendar::download_ics))
        .route("/api/slots/next", get(calendar::next_slot))
        .with_state(state)
}
