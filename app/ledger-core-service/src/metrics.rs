//! Prometheus counters/histograms on the posting and settlement hot paths,
//! following the shape of `platform/identity-auth`'s `Metrics` (the one
//! module in the pack that actually wires `prometheus` up end to end).

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::time::Instant;

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,

    /// Commands attempted, labeled by `verb` (e.g. `invoice.post`) and
    /// `result` (`ok`|`error`).
    pub commands_total: IntCounterVec,
    /// Errors by their stable `kind()` string, labeled by `verb`.
    pub command_errors_total: IntCounterVec,
    /// Requests replayed from a prior idempotent call, labeled by `verb`.
    pub idempotent_replays_total: IntCounterVec,
    /// Best-effort lock acquisitions that failed and fell through to an
    /// unlocked attempt, labeled by `verb`.
    pub lock_contention_total: IntCounterVec,
    /// Command handling latency, labeled by `verb`.
    pub command_duration_seconds: HistogramVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let commands_total = IntCounterVec::new(
            Opts::new("ledger_commands_total", "Total commands handled"),
            &["verb", "result"],
        )
        .expect("metric");

        let command_errors_total = IntCounterVec::new(
            Opts::new("ledger_command_errors_total", "Command failures by error kind"),
            &["verb", "kind"],
        )
        .expect("metric");

        let idempotent_replays_total = IntCounterVec::new(
            Opts::new(
                "ledger_idempotent_replays_total",
                "Commands answered from a prior idempotent call instead of re-running",
            ),
            &["verb"],
        )
        .expect("metric");

        let lock_contention_total = IntCounterVec::new(
            Opts::new(
                "ledger_lock_contention_total",
                "Best-effort document lock acquisitions that failed",
            ),
            &["verb"],
        )
        .expect("metric");

        let command_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "ledger_command_duration_seconds",
                "Command handling duration in seconds",
            ),
            &["verb"],
        )
        .expect("metric");

        registry.register(Box::new(commands_total.clone())).unwrap();
        registry
            .register(Box::new(command_errors_total.clone()))
            .unwrap();
        registry
            .register(Box::new(idempotent_replays_total.clone()))
            .unwrap();
        registry
            .register(Box::new(lock_contention_total.clone()))
            .unwrap();
        registry
            .register(Box::new(command_duration_seconds.clone()))
            .unwrap();

        Self {
            registry,
            commands_total,
            command_errors_total,
            idempotent_replays_total,
            lock_contention_total,
            command_duration_seconds,
        }
    }

    pub fn render(&self) -> Result<String, String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buf = Vec::new();
        encoder
            .encode(&metric_families, &mut buf)
            .map_err(|e| e.to_string())?;
        String::from_utf8(buf).map_err(|e| e.to_string())
    }

    pub fn timer() -> Instant {
        Instant::now()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
