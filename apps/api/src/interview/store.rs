use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::session::SessionState;

/// In-memory session storage. Sessions live only as long as the process and
/// expire after `ttl` without activity.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionState>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn create(&self) -> SessionState {
        let now = Utc::now();
        let session = SessionState::new(Uuid::new_v4(), now);
        let mut sessions = self.sessions.write().await;
        self.prune_expired(&mut sessions, now);
        sessions.insert(session.id, session.clone());
        info!(session_id = %session.id, "Session created");
        session
    }

    /// Returns a snapshot of the session. The lock is released before the caller
    /// does any slow work with it.
    pub async fn get(&self, id: Uuid) -> Result<SessionState, AppError> {
        let now = Utc::now();
        let sessions = self.sessions.read().await;
        match sessions.get(&id) {
            Some(session) if !self.is_expired(session, now) => Ok(session.clone()),
            _ => Err(session_not_found(id)),
        }
    }

    /// Stores the next state of a session, stamping its activity time.
    ///
    /// A state derived from an older revision than the stored one is rejected:
    /// the session was restarted or re-analyzed while it was being computed.
    pub async fn save(&self, mut session: SessionState) -> Result<SessionState, AppError> {
        let now = Utc::now();
        session.updated_at = now;
        let mut sessions = self.sessions.write().await;
        self.prune_expired(&mut sessions, now);
        match sessions.get(&session.id) {
            None => return Err(session_not_found(session.id)),
            Some(current) if current.revision > session.revision => {
                warn!(
                    session_id = %session.id,
                    stored = current.revision,
                    stale = session.revision,
                    "Discarding result computed for an earlier session revision"
                );
                return Err(AppError::Conflict(
                    "The session was restarted or a new resume was uploaded while this \
                     request was running. Its result was discarded."
                        .to_string(),
                ));
            }
            Some(_) => {}
        }
        sessions.insert(session.id, session.clone());
        Ok(session)
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        let removed = self.sessions.write().await.remove(&id);
        match removed {
            Some(_) => {
                info!(session_id = %id, "Session removed");
                Ok(())
            }
            None => Err(session_not_found(id)),
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn is_expired(&self, session: &SessionState, now: DateTime<Utc>) -> bool {
        now - session.updated_at > self.ttl
    }

    fn prune_expired(&self, sessions: &mut HashMap<Uuid, SessionState>, now: DateTime<Utc>) {
        let before = sessions.len();
        sessions.retain(|_, s| !self.is_expired(s, now));
        let pruned = before - sessions.len();
        if pruned > 0 {
            debug!(pruned, "Pruned expired sessions");
        }
    }
}

fn session_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found or expired"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::session::Stage;

    #[tokio::test]
    async fn test_create_get_save_roundtrip() {
        let store = SessionStore::new(Duration::minutes(30));
        let session = store.create().await;
        let mut fetched = store.get(session.id).await.unwrap();
        assert_eq!(fetched.stage, Stage::ResumeAnalysis);

        fetched.resume_filename = Some("cv.pdf".to_string());
        store.save(fetched).await.unwrap();
        let again = store.get(session.id).await.unwrap();
        assert_eq!(again.resume_filename.as_deref(), Some("cv.pdf"));
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let store = SessionStore::new(Duration::minutes(30));
        assert!(matches!(
            store.get(Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
        let orphan = SessionState::new(Uuid::new_v4(), Utc::now());
        assert!(matches!(store.save(orphan).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_stale_revision_cannot_overwrite_a_restart() {
        let store = SessionStore::new(Duration::minutes(30));
        let session = store.create().await;
        let in_flight = store.get(session.id).await.unwrap();

        let restarted = store.save(session.restart()).await.unwrap();
        assert_eq!(restarted.revision, 1);

        let mut late = in_flight;
        late.resume_filename = Some("old.pdf".to_string());
        assert!(matches!(store.save(late).await, Err(AppError::Conflict(_))));
        let current = store.get(restarted.id).await.unwrap();
        assert_eq!(current.revision, 1);
        assert!(current.resume_filename.is_none());
    }

    #[tokio::test]
    async fn test_removed_session_is_gone() {
        let store = SessionStore::new(Duration::minutes(30));
        let session = store.create().await;
        store.remove(session.id).await.unwrap();
        assert!(store.get(session.id).await.is_err());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_idle_sessions_expire() {
        let store = SessionStore::new(Duration::zero());
        let session = store.create().await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        assert!(store.get(session.id).await.is_err());
        store.create().await;
        assert_eq!(store.len().await, 1);
    }
}
