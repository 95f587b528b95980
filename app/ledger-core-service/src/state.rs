//! Shared application state handed to every route: the pool (which also
//! backs the idempotency table — see `command::execute`), the event bus,
//! the (optional) best-effort lock service, and metrics.

use crate::metrics::Metrics;
use distributed_lock::LockService;
use event_bus::EventBus;
use serde::Serialize;
use sqlx::PgPool;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// TTL for the best-effort document lock. Short: this is a contention
/// optimization, not a correctness boundary (the `FOR UPDATE` row lock
/// taken inside the transaction is), so a lock that outlives one request
/// by much is never useful.
const LOCK_TTL: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub event_bus: Arc<dyn EventBus>,
    pub lock: Option<Arc<LockService>>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Run `f` while holding a best-effort lock on `key`. If no lock
    /// service is configured, or the lock is contended, `f` still runs —
    /// callers rely on the database transaction's row lock for
    /// correctness, same as `gl_rs`/`documents_rs` internally. `verb`
    /// labels the contention counter so dashboards can see which commands
    /// actually fight over locks.
    pub async fn with_best_effort_lock<T, F, Fut>(&self, verb: &str, key: &str, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let Some(lock) = &self.lock else {
            return f().await;
        };

        match lock.acquire(key, LOCK_TTL).await {
            Ok(handle) => {
                let result = f().await;
                if let Err(err) = lock.release(handle).await {
                    warn!(%err, key, "failed to release document lock after command");
                }
                result
            }
            Err(err) => {
                self.metrics
                    .lock_contention_total
                    .with_label_values(&[verb])
                    .inc();
                warn!(%err, key, "document lock unavailable, proceeding without it");
                f().await
            }
        }
    }

    /// Fire-and-forget publish onto the fast path, after the transaction
    /// that already wrote the matching outbox row has committed (spec §6,
    /// `event-bus`'s own doc comment). A failure here never fails the
    /// request — the outbox poller is the guaranteed-delivery path and is
    /// out of scope for this service.
    pub async fn publish_fast_path(&self, subject: &str, payload: &impl Serialize) {
        let bytes = match serde_json::to_vec(payload) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(%err, subject, "failed to serialize fast-path event payload");
                return;
            }
        };
        if let Err(err) = self.event_bus.publish(subject, bytes).await {
            warn!(%err, subject, "fast-path event publish failed");
        }
    }
}
