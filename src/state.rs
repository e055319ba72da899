use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::services::dialogue::DialogueStateMachine;
use crate::services::slots::WorkingHours;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub dialogue: DialogueStateMachine,
    pub working_hours: WorkingHours,
    pub session_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl AppState {
    /// Turn lock for one session. Turns of the same session run one at a
    /// time; different sessions never wait on each other.
    ///
    /// Entries nobody holds or waits on are dropped here, so idle ids do not
    /// accumulate.
    pub fn session_lock(&self, session_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .session_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry(session_id.to_string()).or_default())
    }

    pub fn session_lock_count(&self) -> usize {
        self.session_locks
            .lock()
            .map(|locks| locks.len())
            .unwrap_or_default()
    }

    pub fn forget_session_lock(&self, session_id: &str) {
        if let Ok(mut locks) = self.session_locks.lock() {
            locks.remove(session_id);
        }
    }
}
