use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::redis::RedisHandle;
use crate::engine::error::EngineError;
use crate::engine::session::AssessmentSession;

/// Sessions are kept at most a day; an untouched run is abandoned anyway.
const SESSION_TTL_SECONDS: u64 = 86_400;

/// Server-side storage for in-progress assessment sessions, keyed by the
/// authenticated user. Values round-trip as JSON so nested question and
/// answer structures survive intact.
#[async_trait]
pub(crate) trait SessionStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<AssessmentSession>, EngineError>;
    async fn save(&self, key: &str, session: &AssessmentSession) -> Result<(), EngineError>;
    async fn clear(&self, key: &str) -> Result<(), EngineError>;
}

pub(crate) struct RedisSessionStore<'a> {
    redis: &'a RedisHandle,
}

impl<'a> RedisSessionStore<'a> {
    pub(crate) fn new(redis: &'a RedisHandle) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore<'_> {
    async fn load(&self, key: &str) -> Result<Option<AssessmentSession>, EngineError> {
        let raw = self
            .redis
            .get_string(key)
            .await
            .map_err(|err| EngineError::SessionStore(err.to_string()))?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(err) => {
                // A payload we can no longer read is as good as no session.
                tracing::warn!(error = %err, key, "Discarding unreadable session payload");
                self.clear(key).await?;
                Ok(None)
            }
        }
    }

    async fn save(&self, key: &str, session: &AssessmentSession) -> Result<(), EngineError> {
        let payload = serde_json::to_string(session)
            .map_err(|err| EngineError::SessionStore(err.to_string()))?;
        self.redis
            .set_string(key, &payload, SESSION_TTL_SECONDS)
            .await
            .map_err(|err| EngineError::SessionStore(err.to_string()))
    }

    async fn clear(&self, key: &str) -> Result<(), EngineError> {
        self.redis.delete(key).await.map_err(|err| EngineError::SessionStore(err.to_string()))
    }
}

/// Map-backed store for tests and single-process deployments.
#[derive(Default)]
pub(crate) struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, AssessmentSession>>,
}

impl InMemorySessionStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, key: &str) -> Result<Option<AssessmentSession>, EngineError> {
        let sessions = self.sessions.lock().expect("session map poisoned");
        Ok(sessions.get(key).cloned())
    }

    async fn save(&self, key: &str, session: &AssessmentSession) -> Result<(), EngineError> {
        let mut sessions = self.sessions.lock().expect("session map poisoned");
        sessions.insert(key.to_string(), session.clone());
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<(), EngineError> {
        let mut sessions = self.sessions.lock().expect("session map poisoned");
        sessions.remove(key);
        Ok(())
    }
}
