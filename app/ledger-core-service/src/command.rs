//! Glue between an axum handler and a domain service call: pulls the
//! tenant and idempotency key off the headers, opens the one transaction
//! the whole command runs in, runs it under `idempotency::run` (which
//! claims the idempotency row through that same transaction before `f`
//! touches anything) and a best-effort document lock, commits once, and
//! records metrics — the same shape every `routes/*.rs` handler needs,
//! written once.

use crate::dto::{idempotency_key_from_headers, tenant_context_from_headers};
use crate::error::ApiError;
use crate::state::AppState;
use crate::telemetry::record_command;
use axum::http::HeaderMap;
use idempotency::IdempotencyError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::{Postgres, Transaction};
use std::future::Future;
use std::time::Instant;
use tenant_context::TenantContext;

/// Run one command. `f` receives the tenant context and the transaction
/// its domain writes must use — it must not open or commit its own
/// transaction. `lock_key`, when set, is acquired as a best-effort lock
/// for the duration of the whole command — pass `None` for commands with
/// no existing document to key on (e.g. `*.create`). Returns whether the
/// response was replayed from a prior call alongside the response itself.
pub async fn execute<Req, Resp, F, Fut>(
    state: &AppState,
    headers: &HeaderMap,
    verb: &'static str,
    lock_key: Option<String>,
    req: &Req,
    f: F,
) -> Result<(bool, Resp), ApiError>
where
    Req: Serialize,
    Resp: Serialize + DeserializeOwned,
    F: FnOnce(TenantContext, &mut Transaction<'static, Postgres>) -> Fut,
    Fut: Future<Output = Result<Resp, ApiError>>,
{
    let ctx = tenant_context_from_headers(headers)?;
    let idempotency_key = idempotency_key_from_headers(headers)?;
    let company_id = ctx.company_id;
    let started = Instant::now();

    let run_command = move || async move {
        let mut tx: Transaction<'static, Postgres> =
            state.pool.begin().await.map_err(IdempotencyError::from)?;

        let outcome = idempotency::run(
            &mut tx,
            company_id,
            &idempotency_key,
            req,
            move |tx| async move { f(ctx, tx).await.map_err(IdempotencyError::from) },
        )
        .await?;

        tx.commit().await.map_err(IdempotencyError::from)?;
        Ok(outcome)
    };

    let outcome = match &lock_key {
        Some(key) => state.with_best_effort_lock(verb, key, run_command).await,
        None => run_command().await,
    };

    record_command(state, verb, started, &outcome);
    let outcome = outcome.map_err(ApiError::from)?;
    Ok((outcome.replayed, outcome.response))
}
