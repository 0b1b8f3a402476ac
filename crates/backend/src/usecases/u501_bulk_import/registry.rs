use chrono::Utc;
use contracts::enums::ImportTarget;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use super::session::ImportSession;

pub type SharedSession<R> = Arc<Mutex<ImportSession<R>>>;

/// Реестр сессий импорта (in-memory).
///
/// Каждая сессия под своим мьютексом: пока одна сессия импортирует,
/// остальные доступны.
pub struct SessionRegistry<R> {
    target: ImportTarget,
    sessions: Arc<RwLock<HashMap<String, SharedSession<R>>>>,
}

impl<R> Clone for SessionRegistry<R> {
    fn clone(&self) -> Self {
        Self {
            target: self.target,
            sessions: self.sessions.clone(),
        }
    }
}

impl<R: Clone + Send + 'static> SessionRegistry<R> {
    pub fn new(target: ImportTarget) -> Self {
        Self {
            target,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn create_session(&self) -> String {
        let session_id = uuid::Uuid::new_v4().to_string();
        let session = ImportSession::new(session_id.clone(), self.target);
        self.sessions
            .write()
            .await
            .insert(session_id.clone(), Arc::new(Mutex::new(session)));
        tracing::info!("[{}] Import session created: {}", self.target, session_id);
        session_id
    }

    pub async fn get(&self, session_id: &str) -> Option<SharedSession<R>> {
        self.sessions.read().await.get(session_id).cloned()
    }

    pub async fn remove(&self, session_id: &str) -> Option<SharedSession<R>> {
        self.sessions.write().await.remove(session_id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Удаляет сессии без изменений дольше `max_age_hours`.
    /// Занятые сессии (мьютекс захвачен) не трогаются.
    pub async fn cleanup_old_sessions(&self, max_age_hours: i64) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| match session.try_lock() {
            Ok(s) => {
                !s.state().accepts_file() || (now - s.updated_at()).num_hours() < max_age_hours
            }
            Err(_) => true,
        });
        let removed = before - sessions.len();
        if removed > 0 {
            tracing::info!("[{}] Removed {} stale import sessions", self.target, removed);
        }
        removed
    }
}
