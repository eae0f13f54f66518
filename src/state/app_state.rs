use mongodb::Database;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::config::Settings;
use crate::error::AppError;
use crate::models::qr_code::QrCodeRecord;
use crate::services::history::{LocalHistory, RemoteHistory};
use crate::services::session::EditorSession;

pub const QR_CODES_COLLECTION: &str = "qr_codes";

struct SessionSlot {
    session: EditorSession,
    last_used: Instant,
}

impl SessionSlot {
    fn is_idle(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_used) >= timeout
    }
}

pub struct AppState {
    pub settings: Settings,
    pub db: Option<Database>,
    pub local_history: LocalHistory,
    sessions: Mutex<HashMap<String, SessionSlot>>,
}

impl AppState {
    pub fn new(settings: Settings, db: Option<Database>, local_history: LocalHistory) -> Self {
        Self {
            settings,
            db,
            local_history,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn sessions(&self) -> Result<MutexGuard<'_, HashMap<String, SessionSlot>>, AppError> {
        self.sessions
            .lock()
            .map_err(|_| AppError::Internal("session lock poisoned".to_string()))
    }

    /// Register a new session, dropping idle ones first and the least recently
    /// used one when the table is full.
    pub fn insert_session(&self, id: String, session: EditorSession) -> Result<(), AppError> {
        self.insert_session_at(id, session, Instant::now())
    }

    fn insert_session_at(
        &self,
        id: String,
        session: EditorSession,
        now: Instant,
    ) -> Result<(), AppError> {
        let mut sessions = self.sessions()?;
        let timeout = self.settings.session_idle_timeout;

        let before = sessions.len();
        sessions.retain(|_, slot| !slot.is_idle(now, timeout));
        if sessions.len() != before {
            log::info!("Evicted {} idle editing session(s)", before - sessions.len());
        }

        while !sessions.is_empty() && sessions.len() >= self.settings.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, slot)| slot.last_used)
                .map(|(id, _)| id.clone());
            if let Some(oldest) = oldest {
                sessions.remove(&oldest);
                log::info!("Session limit reached, evicted editing session {}", oldest);
            }
        }

        sessions.insert(
            id,
            SessionSlot {
                session,
                last_used: now,
            },
        );
        Ok(())
    }

    pub fn remove_session(&self, id: &str) -> Result<Option<EditorSession>, AppError> {
        Ok(self.sessions()?.remove(id).map(|slot| slot.session))
    }

    pub fn session_count(&self) -> Result<usize, AppError> {
        Ok(self.sessions()?.len())
    }

    /// Run `f` against one session while holding the session lock.
    pub fn with_session<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut EditorSession) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        self.with_session_at(id, Instant::now(), f)
    }

    fn with_session_at<T>(
        &self,
        id: &str,
        now: Instant,
        f: impl FnOnce(&mut EditorSession) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut sessions = self.sessions()?;
        let slot = sessions.get_mut(id).ok_or(AppError::SessionNotFound)?;
        if slot.is_idle(now, self.settings.session_idle_timeout) {
            sessions.remove(id);
            log::info!("Editing session {} expired", id);
            return Err(AppError::SessionNotFound);
        }
        slot.last_used = now;
        f(&mut slot.session)
    }

    /// The caller's slice of the remote collection, if a remote store is configured.
    pub fn remote_history(&self, owner: &str) -> Result<RemoteHistory, AppError> {
        let db = self.db.as_ref().ok_or(AppError::RemoteUnavailable)?;
        Ok(RemoteHistory::new(
            db.collection::<QrCodeRecord>(QR_CODES_COLLECTION),
            owner,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::kv_store::MemoryStore;
    use std::sync::Arc;

    fn state(max_sessions: usize, idle_secs: u64) -> AppState {
        let mut settings = Settings::for_tests();
        settings.max_sessions = max_sessions;
        settings.session_idle_timeout = Duration::from_secs(idle_secs);
        let local = LocalHistory::new(Arc::new(MemoryStore::new()), settings.history_capacity);
        AppState::new(settings, None, local)
    }

    fn touch(state: &AppState, id: &str, now: Instant) -> Result<(), AppError> {
        state.with_session_at(id, now, |_| Ok(()))
    }

    #[test]
    fn idle_sessions_are_evicted_on_insert() {
        let state = state(10, 60);
        let start = Instant::now();
        state.insert_session_at("a".into(), EditorSession::new(), start).unwrap();
        state.insert_session_at("b".into(), EditorSession::new(), start).unwrap();
        // Keep "b" alive, let "a" go idle
        touch(&state, "b", start + Duration::from_secs(40)).unwrap();

        state
            .insert_session_at("c".into(), EditorSession::new(), start + Duration::from_secs(70))
            .unwrap();

        assert_eq!(state.session_count().unwrap(), 2);
        assert!(matches!(
            touch(&state, "a", start + Duration::from_secs(70)),
            Err(AppError::SessionNotFound)
        ));
        assert!(touch(&state, "b", start + Duration::from_secs(70)).is_ok());
    }

    #[test]
    fn idle_session_is_gone_on_access() {
        let state = state(10, 60);
        let start = Instant::now();
        state.insert_session_at("a".into(), EditorSession::new(), start).unwrap();

        assert!(touch(&state, "a", start + Duration::from_secs(59)).is_ok());
        assert!(matches!(
            touch(&state, "a", start + Duration::from_secs(120)),
            Err(AppError::SessionNotFound)
        ));
        assert_eq!(state.session_count().unwrap(), 0);
    }

    #[test]
    fn full_table_drops_least_recently_used() {
        let state = state(2, 3600);
        let start = Instant::now();
        state.insert_session_at("a".into(), EditorSession::new(), start).unwrap();
        state
            .insert_session_at("b".into(), EditorSession::new(), start + Duration::from_secs(1))
            .unwrap();
        touch(&state, "a", start + Duration::from_secs(2)).unwrap();

        state
            .insert_session_at("c".into(), EditorSession::new(), start + Duration::from_secs(3))
            .unwrap();

        assert_eq!(state.session_count().unwrap(), 2);
        let later = start + Duration::from_secs(4);
        assert!(touch(&state, "a", later).is_ok());
        assert!(touch(&state, "b", later).is_err());
        assert!(touch(&state, "c", later).is_ok());
    }

    #[test]
    fn remove_returns_the_session() {
        let state = state(10, 60);
        state.insert_session("a".into(), EditorSession::new()).unwrap();
        assert!(state.remove_session("a").unwrap().is_some());
        assert!(state.remove_session("a").unwrap().is_none());
    }
}
