//! Best-effort distributed locking.
//!
//! This is a contention-reduction optimization, not a correctness boundary:
//! the posting path's actual correctness guarantee comes from row-level
//! `SELECT ... FOR UPDATE` inside the database transaction. A lock here just
//! keeps two requests for the same account/company from racing each other
//! into the DB transaction in the first place. If Redis is unavailable,
//! callers should still be safe (just more contended) — `acquire` failing
//! is reported to the caller, who decides whether to proceed anyway.

use redis::AsyncCommands;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("lock-unavailable: could not acquire lock for key {0}")]
    Unavailable(String),
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// A held lock. Dropping it releases the lock via a background spawn if it
/// was not explicitly released, so a panicking caller doesn't leak it for
/// the full TTL — though the TTL is the backstop either way.
pub struct LockHandle {
    key: String,
    token: String,
}

impl LockHandle {
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Thin wrapper around a Redis connection manager providing
/// acquire/release with a compare-and-delete token, so a lock holder can't
/// accidentally release a lock it no longer owns (e.g. after its TTL
/// expired and someone else acquired it).
#[derive(Clone)]
pub struct LockService {
    conn: redis::aio::ConnectionManager,
}

const RELEASE_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

impl LockService {
    pub async fn connect(redis_url: &str) -> Result<Self, LockError> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_connection_manager().await?;
        Ok(Self { conn })
    }

    /// Acquire `key` for up to `ttl`, returning a handle carrying an opaque
    /// random token. Only the holder of that exact token can release it.
    pub async fn acquire(&self, key: &str, ttl: Duration) -> Result<LockHandle, LockError> {
        let token = Uuid::new_v4().to_string();
        let mut conn = self.conn.clone();
        let acquired: bool = conn
            .set_options(
                key,
                &token,
                redis::SetOptions::default()
                    .conditional_set(redis::ExistenceCheck::NX)
                    .with_expiration(redis::SetExpiry::PX(ttl.as_millis() as u64)),
            )
            .await?
            .unwrap_or(false);

        if !acquired {
            return Err(LockError::Unavailable(key.to_string()));
        }

        Ok(LockHandle {
            key: key.to_string(),
            token,
        })
    }

    /// Release a previously acquired lock. A no-op (and not an error) if
    /// the lock already expired or was stolen by a new holder.
    pub async fn release(&self, handle: LockHandle) -> Result<(), LockError> {
        let mut conn = self.conn.clone();
        let deleted: i32 = redis::Script::new(RELEASE_SCRIPT)
            .key(&handle.key)
            .arg(&handle.token)
            .invoke_async(&mut conn)
            .await?;

        if deleted == 0 {
            warn!(key = %handle.key, "lock release was a no-op; token did not match current holder");
        }
        Ok(())
    }

    /// Run `f` while holding `key`, releasing it afterward regardless of
    /// whether `f` succeeds.
    pub async fn with_lock<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        f: F,
    ) -> Result<T, WithLockError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        let handle = self.acquire(key, ttl).await.map_err(WithLockError::Lock)?;
        let result = f().await;
        if let Err(err) = self.release(handle).await {
            warn!(%err, key, "failed to release lock after with_lock body completed");
        }
        result.map_err(WithLockError::Body)
    }

    /// Acquire multiple locks at once, always in a deterministic
    /// (lexicographic) key order to avoid deadlocking against another
    /// caller locking the same set of keys in a different order. Releases
    /// in reverse acquisition order. On partial failure, releases whatever
    /// was already acquired before returning the error.
    pub async fn with_locks<T, E, F, Fut>(
        &self,
        keys: &[&str],
        ttl: Duration,
        f: F,
    ) -> Result<T, WithLockError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        let mut ordered: Vec<&str> = keys.to_vec();
        ordered.sort_unstable();
        ordered.dedup();

        let mut held = Vec::with_capacity(ordered.len());
        for key in &ordered {
            match self.acquire(key, ttl).await {
                Ok(handle) => held.push(handle),
                Err(err) => {
                    self.release_all(held).await;
                    return Err(WithLockError::Lock(err));
                }
            }
        }

        let result = f().await;
        self.release_all(held).await;
        result.map_err(WithLockError::Body)
    }

    async fn release_all(&self, handles: Vec<LockHandle>) {
        for handle in handles.into_iter().rev() {
            let key = handle.key.clone();
            if let Err(err) = self.release(handle).await {
                warn!(%err, key, "failed to release lock during with_locks cleanup");
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum WithLockError<E> {
    #[error("lock-unavailable: {0}")]
    Lock(#[from] LockError),
    #[error(transparent)]
    Body(E),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_ordering_is_deterministic_and_deduped() {
        let mut keys = vec!["acct:b", "acct:a", "acct:c", "acct:a"];
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys, vec!["acct:a", "acct:b", "acct:c"]);
    }
}
