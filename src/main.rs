use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use interview_scheduler::config::AppConfig;
use interview_scheduler::db;
use interview_scheduler::handlers;
use interview_scheduler::services::ai::intent::{
    IntentResponder, KeywordIntentResponder, LlmIntentResponder,
};
use interview_scheduler::services::ai::ollama::OllamaProvider;
use interview_scheduler::services::dialogue::DialogueStateMachine;
use interview_scheduler::services::invite::email::HttpMailDispatcher;
use interview_scheduler::services::invite::{InviteDispatcher, LogDispatcher};
use interview_scheduler::services::meet_link::RandomMeetLink;
use interview_scheduler::services::slots::{LookupSlotSuggester, WorkingHours};
use interview_scheduler::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    config.validate()?;

    let conn = db::init_db(&config.database_url)?;

    let responder: Box<dyn IntentResponder> = match config.intent_responder.as_str() {
        "ollama" => {
            tracing::info!(
                "using Ollama intent responder (url: {}, model: {})",
                config.ollama_url,
                config.ollama_model
            );
            Box::new(LlmIntentResponder::new(Box::new(OllamaProvider::new(
                config.ollama_url.clone(),
                config.ollama_model.clone(),
                Duration::from_secs(config.ollama_timeout_secs),
            )?)))
        }
        _ => {
            tracing::info!("using keyword intent responder");
            Box::new(KeywordIntentResponder)
        }
    };

    let invites: Box<dyn InviteDispatcher> = if config.mail_configured() {
        tracing::info!("sending invites via {}", config.mail_api_url);
        Box::new(HttpMailDispatcher::new(
            config.mail_api_url.clone(),
            config.mail_api_key.clone(),
            config.mail_from.clone(),
            Duration::from_secs(config.mail_timeout_secs),
        )?)
    } else {
        tracing::warn!("MAIL_API_KEY or MAIL_FROM not set, invites will only be logged");
        Box::new(LogDispatcher)
    };

    let dialogue = DialogueStateMachine::new(
        Box::new(LookupSlotSuggester),
        invites,
        Box::new(RandomMeetLink::new(config.meet_base_url.clone())),
        responder,
        config.timezone_label.clone(),
    );

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        working_hours: WorkingHours {
            start_hour: config.working_hours_start,
            end_hour: config.working_hours_end,
        },
        config: config.clone(),
        dialogue,
        session_locks: Mutex::new(HashMap::new()),
    });

    let app = handlers::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
