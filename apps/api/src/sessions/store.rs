//! Session persistence. In-memory by default; Redis when `REDIS_URL` is set.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use redis::AsyncCommands;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::sessions::machine::Session;

const REDIS_KEY_PREFIX: &str = "interview-coach:session:";
/// Ten years; keeps `chrono::Duration` construction in range.
const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// `None` when the session never existed or has expired.
    async fn load(&self, id: Uuid) -> Result<Option<Session>, AppError>;

    async fn save(&self, session: &Session) -> Result<(), AppError>;

    /// Returns whether a session was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Restarts the expiry clock without rewriting the session, so reads
    /// count as activity and cannot clobber a concurrent write.
    async fn keep_alive(&self, id: Uuid) -> Result<(), AppError>;
}

/// Process-local store. Expired sessions are evicted lazily on access.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
    ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: Duration::seconds(ttl_secs.min(MAX_TTL_SECS) as i64),
        }
    }

    fn is_expired(&self, session: &Session) -> bool {
        session.updated_at + self.ttl < Utc::now()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<Session>, AppError> {
        let found = self.sessions.read().await.get(&id).cloned();
        match found {
            Some(session) if self.is_expired(&session) => {
                self.sessions.write().await.remove(&id);
                debug!(session_id = %id, "Evicted expired session");
                Ok(None)
            }
            other => Ok(other),
        }
    }

    async fn save(&self, session: &Session) -> Result<(), AppError> {
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| !self.is_expired(s));
        sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.sessions.write().await.remove(&id).is_some())
    }

    async fn keep_alive(&self, id: Uuid) -> Result<(), AppError> {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(&id) {
            if !self.is_expired(session) {
                session.touch();
            }
        }
        Ok(())
    }
}

/// Sessions as JSON strings with a sliding `SET EX` expiry.
pub struct RedisSessionStore {
    client: redis::Client,
    ttl_secs: u64,
}

impl RedisSessionStore {
    pub fn new(client: redis::Client, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, AppError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(store_error)
    }
}

fn session_key(id: Uuid) -> String {
    format!("{REDIS_KEY_PREFIX}{id}")
}

fn store_error(e: impl std::fmt::Display) -> AppError {
    AppError::SessionStore(e.to_string())
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<Session>, AppError> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn.get(session_key(id)).await.map_err(store_error)?;
        raw.map(|json| serde_json::from_str(&json).map_err(store_error))
            .transpose()
    }

    async fn save(&self, session: &Session) -> Result<(), AppError> {
        let json = serde_json::to_string(session).map_err(store_error)?;
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(session_key(session.id), json, self.ttl_secs)
            .await
            .map_err(store_error)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut conn = self.connection().await?;
        let removed: u64 = conn.del(session_key(id)).await.map_err(store_error)?;
        Ok(removed > 0)
    }

    async fn keep_alive(&self, id: Uuid) -> Result<(), AppError> {
        let mut conn = self.connection().await?;
        let ttl = self.ttl_secs.min(i64::MAX as u64) as i64;
        conn.expire::<_, ()>(session_key(id), ttl)
            .await
            .map_err(store_error)
    }
}
