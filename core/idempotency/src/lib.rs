//! Command idempotency.
//!
//! Every mutating command is keyed by `(company_id, idempotency_key)`. The
//! idempotency row is claimed through the same transaction the command's
//! domain writes use: the `(company_id, idempotency_key)` unique index,
//! not the order in which this function happens to run, is what decides
//! which of two concurrent identical-key calls wins. The loser's claiming
//! `INSERT` blocks on the winner's uncommitted row; by the time it
//! unblocks, the winner has either committed (and the loser sees a
//! complete response row to replay) or rolled back (and the loser's
//! `INSERT` succeeds in its place).
//!
//! Enforced here at the domain layer (not HTTP middleware) so the same
//! logic covers HTTP handlers, event consumers, and tests uniformly.

use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};
use sqlx::{Postgres, Transaction};
use tenant_context::CompanyId;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum IdempotencyError {
    #[error("idempotency-key-reuse: key {key} was already used with a different request")]
    KeyReuse { key: String },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("could not serialize request or response: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Carries a failure from the wrapped command itself (e.g. a
    /// `DocumentError`/`LedgerError` at the HTTP boundary), tagged with its
    /// stable error `kind` so callers can translate it without this crate
    /// depending on every domain error enum.
    #[error("{kind}: {message}")]
    Command { kind: String, message: String },
}

/// Canonical fingerprint of a request payload. `serde_json::Map` is backed
/// by a `BTreeMap` (the `preserve_order` feature is not enabled anywhere in
/// this workspace), so object keys serialize in sorted order regardless of
/// struct field declaration order — two semantically identical requests
/// fingerprint identically.
pub fn fingerprint<T: Serialize>(request: &T) -> Result<String, IdempotencyError> {
    let canonical = serde_json::to_value(request)?;
    let bytes = serde_json::to_vec(&canonical)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

/// Outcome of [`run`]: whether the response came from `command` running
/// just now, or was replayed from a concurrent or earlier call with the
/// same key.
pub struct RunOutcome<R> {
    pub replayed: bool,
    pub response: R,
}

#[derive(sqlx::FromRow)]
struct ClaimedRow {
    #[allow(dead_code)]
    id: Uuid,
}

#[derive(sqlx::FromRow)]
struct ExistingRow {
    request_fingerprint: String,
    response: Option<serde_json::Value>,
}

/// Run `command` under idempotency protection, inside `tx`. `command`
/// receives the same `tx` for its domain writes, so the claiming insert
/// below, the domain writes, and the response `UPDATE` all live in one
/// transaction — the caller commits `tx` once, after `run` returns `Ok`.
///
/// - If this call claims the `(company_id, key)` row, `command` runs and
///   its response is written back into that row before returning.
/// - If another call already holds (or just committed) that row, this call
///   never runs `command`; it returns the stored response instead,
///   provided the stored request fingerprint matches — otherwise it's a
///   key reused with a different request, which is rejected.
pub async fn run<'c, Req, Resp, F, Fut>(
    tx: &mut Transaction<'c, Postgres>,
    company_id: CompanyId,
    key: &str,
    request: &Req,
    command: F,
) -> Result<RunOutcome<Resp>, IdempotencyError>
where
    Req: Serialize,
    Resp: Serialize + DeserializeOwned,
    F: FnOnce(&mut Transaction<'c, Postgres>) -> Fut,
    Fut: std::future::Future<Output = Result<Resp, IdempotencyError>>,
{
    let request_fingerprint = fingerprint(request)?;

    let claimed: Option<ClaimedRow> = sqlx::query_as(
        r#"
        INSERT INTO idempotency_keys (id, company_id, idempotency_key, request_fingerprint, response, created_at)
        VALUES ($1, $2, $3, $4, NULL, NOW())
        ON CONFLICT (company_id, idempotency_key) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(company_id.0)
    .bind(key)
    .bind(&request_fingerprint)
    .fetch_optional(&mut **tx)
    .await?;

    if claimed.is_none() {
        let existing: ExistingRow = sqlx::query_as(
            r#"
            SELECT request_fingerprint, response
            FROM idempotency_keys
            WHERE company_id = $1 AND idempotency_key = $2
            "#,
        )
        .bind(company_id.0)
        .bind(key)
        .fetch_one(&mut **tx)
        .await?;

        check_fingerprint_match(&existing.request_fingerprint, &request_fingerprint, key)?;

        // The row we lost the race for always carries a response by the
        // time we can see it committed: the winner only releases the row
        // (by committing) after writing it in the `UPDATE` below.
        let response_json = existing
            .response
            .ok_or(IdempotencyError::Database(sqlx::Error::RowNotFound))?;
        let response: Resp = serde_json::from_value(response_json)?;
        return Ok(RunOutcome {
            replayed: true,
            response,
        });
    }

    let response = command(tx).await?;
    let response_json = serde_json::to_value(&response)?;

    sqlx::query(
        r#"
        UPDATE idempotency_keys
        SET response = $3
        WHERE company_id = $1 AND idempotency_key = $2
        "#,
    )
    .bind(company_id.0)
    .bind(key)
    .bind(&response_json)
    .execute(&mut **tx)
    .await?;

    Ok(RunOutcome {
        replayed: false,
        response,
    })
}

fn check_fingerprint_match(
    stored_fingerprint: &str,
    incoming_fingerprint: &str,
    key: &str,
) -> Result<(), IdempotencyError> {
    if stored_fingerprint != incoming_fingerprint {
        return Err(IdempotencyError::KeyReuse {
            key: key.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Req {
        amount: i64,
        memo: String,
    }

    #[test]
    fn fingerprint_is_stable_across_field_order() {
        let a = serde_json::json!({"amount": 1, "memo": "x"});
        let b = serde_json::json!({"memo": "x", "amount": 1});
        let fp_a = fingerprint(&a).unwrap();
        let fp_b = fingerprint(&b).unwrap();
        assert_eq!(fp_a, fp_b);
    }

    #[test]
    fn fingerprint_changes_with_request_content() {
        let first = Req {
            amount: 500,
            memo: "rent".to_string(),
        };
        let second = Req {
            amount: 999,
            memo: "rent".to_string(),
        };
        assert_ne!(fingerprint(&first).unwrap(), fingerprint(&second).unwrap());
    }

    #[test]
    fn matching_fingerprints_are_accepted() {
        assert!(check_fingerprint_match("abc123", "abc123", "key-1").is_ok());
    }

    #[test]
    fn mismatched_fingerprints_are_rejected_as_key_reuse() {
        match check_fingerprint_match("abc123", "def456", "key-1") {
            Err(IdempotencyError::KeyReuse { key }) => assert_eq!(key, "key-1"),
            other => panic!("expected KeyReuse, got {other:?}"),
        }
    }
}
