//! Shared metrics recording for command handlers, so every route module
//! reports the same three numbers (attempted, duration, replayed) the
//! same way instead of re-deriving it per verb.

use crate::state::AppState;
use idempotency::{IdempotencyError, RunOutcome};
use std::time::Instant;

pub fn record_command<T>(
    state: &AppState,
    verb: &str,
    started_at: Instant,
    result: &Result<RunOutcome<T>, IdempotencyError>,
) {
    let elapsed = started_at.elapsed().as_secs_f64();
    state
        .metrics
        .command_duration_seconds
        .with_label_values(&[verb])
        .observe(elapsed);

    match result {
        Ok(outcome) => {
            state
                .metrics
                .commands_total
                .with_label_values(&[verb, "ok"])
                .inc();
            if outcome.replayed {
                state
                    .metrics
                    .idempotent_replays_total
                    .with_label_values(&[verb])
                    .inc();
            }
        }
        Err(err) => {
            state
                .metrics
                .commands_total
                .with_label_values(&[verb, "error"])
                .inc();
            let kind = match err {
                IdempotencyError::KeyReuse { .. } => "idempotency-key-reuse",
                IdempotencyError::Command { kind, .. } => kind.as_str(),
                IdempotencyError::Database(_) | IdempotencyError::Serialization(_) => "internal",
            };
            state
                .metrics
                .command_errors_total
                .with_label_values(&[verb, kind])
                .inc();
        }
    }
}
