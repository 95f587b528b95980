//! Weighted-average-cost engine.
//!
//! `apply_stock_move_wac` is the single entry point for both quantity
//! moves and value-only adjustments (see [`crate::apply_stock_value_adjustment_wac`]).
//! Every call replays the full move timeline for `(location_id, item_id)`
//! from the earliest affected date forward; for the common case of an
//! in-order move that earliest date is the new move itself, so the replay
//! is one step. A backdated move replays everything after it, revaluing
//! every OUT/adjustment whose applied cost depended on the WAC that
//! existed before the backdated move was inserted.

use crate::errors::InventoryError;
use crate::repos::{balance_repo, stock_move_repo};
use crate::types::{Direction, InventoryBalance, StockMoveInput, StockMoveRow};
use event_bus::EventEnvelope;
use money_rs::{Money, Rate};
use sqlx::{Postgres, Transaction};
use tenant_context::TenantContext;
use uuid::Uuid;

pub struct AppliedMove {
    pub id: Uuid,
    pub total_cost_applied: Money,
}

pub async fn apply_stock_move_wac(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    input: StockMoveInput,
) -> Result<AppliedMove, InventoryError> {
    balance_repo::lock_or_create(tx, ctx.company_id.0, input.location_id, input.item_id).await?;

    let existing = stock_move_repo::fetch_ordered(tx, ctx.company_id.0, input.location_id, input.item_id)
        .await?;

    let is_backdated = existing
        .last()
        .map(|last| input.date < last.date)
        .unwrap_or(false);

    if is_backdated && !input.allow_backdated {
        return Err(InventoryError::BackdatedMoveNotAllowed(input.date));
    }

    let new_id = Uuid::new_v4();
    let mut timeline: Vec<TimelineEntry> = existing
        .iter()
        .map(TimelineEntry::from_row)
        .collect();
    timeline.push(TimelineEntry::from_input(new_id, &input));
    timeline.sort_by_key(|e| (e.date, e.tie_break));

    let replay = replay_timeline(&timeline, input.allow_negative_on_hand).map_err(|over_drawn| {
        InventoryError::InsufficientStock {
            location_id: input.location_id,
            item_id: input.item_id,
            on_hand: over_drawn.on_hand,
            requested: over_drawn.requested,
        }
    })?;

    for step in &replay.steps {
        if step.entry_id == new_id {
            continue;
        }
        let entry = timeline.iter().find(|e| e.id == step.entry_id).unwrap();
        if entry.direction == Direction::Out && entry.stored_total_cost != Some(step.total_cost) {
            stock_move_repo::update_total_cost_applied(tx, step.entry_id, step.total_cost).await?;
        }
    }

    let balance = replay.final_balance;
    let applied_total_for_new_move = replay
        .steps
        .iter()
        .find(|s| s.entry_id == new_id)
        .map(|s| s.total_cost)
        .unwrap_or(Money::ZERO);

    stock_move_repo::insert(
        tx,
        stock_move_repo::NewStockMove {
            id: new_id,
            company_id: ctx.company_id.0,
            location_id: input.location_id,
            item_id: input.item_id,
            date: input.date,
            move_type: input.move_type,
            direction: input.direction,
            quantity: input.quantity.as_decimal(),
            unit_cost_applied: input.unit_cost_applied.as_decimal(),
            total_cost_applied: applied_total_for_new_move,
            total_cost_override: input.total_cost_override,
            reference_type: input.reference_type.clone(),
            reference_id: input.reference_id.clone(),
            correlation_id: input.correlation_id,
            journal_entry_id: input.journal_entry_id,
        },
    )
    .await?;

    balance_repo::upsert(tx, ctx.company_id.0, input.location_id, input.item_id, balance).await?;

    if is_backdated {
        let payload = serde_json::json!({
            "locationId": input.location_id,
            "itemId": input.item_id,
            "fromDate": input.date,
        });
        let envelope = EventEnvelope::new(
            ctx.company_id.0,
            "inventory.recalc.requested",
            "inventory_balance",
            format!("{}:{}", input.location_id, input.item_id),
            "inventory-rs",
            ctx.correlation_id,
            None,
            payload,
        );
        let outbox_event = event_bus::OutboxEvent::from_envelope(&envelope)?;
        crate::repos::outbox_repo::insert(tx, ctx.company_id.0, &outbox_event).await?;
    }

    Ok(AppliedMove {
        id: new_id,
        total_cost_applied: applied_total_for_new_move,
    })
}

/// A value-only adjustment (landed cost capitalization) — quantity zero,
/// a fixed value delta rather than `quantity × cost`. Shares the same
/// replay machinery and backdating rules as a quantity move.
pub async fn apply_stock_value_adjustment_wac(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    location_id: Uuid,
    item_id: Uuid,
    date: chrono::NaiveDate,
    value_delta: Money,
    reference_type: String,
    reference_id: String,
    correlation_id: Uuid,
    allow_backdated: bool,
) -> Result<AppliedMove, InventoryError> {
    let direction = if value_delta.is_negative() {
        Direction::Out
    } else {
        Direction::In
    };

    apply_stock_move_wac(
        tx,
        ctx,
        StockMoveInput {
            location_id,
            item_id,
            date,
            move_type: crate::types::StockMoveKind::Adjustment,
            direction,
            quantity: Rate::ZERO,
            unit_cost_applied: Rate::ZERO,
            total_cost_override: Some(value_delta.abs()),
            reference_type,
            reference_id,
            correlation_id,
            journal_entry_id: None,
            allow_backdated,
            allow_negative_on_hand: true,
        },
    )
    .await
}

struct TimelineEntry {
    id: Uuid,
    date: chrono::NaiveDate,
    tie_break: (i64, Uuid),
    direction: Direction,
    quantity: Rate,
    unit_cost_applied: Rate,
    total_cost_override: Option<Money>,
    stored_total_cost: Option<Money>,
}

impl TimelineEntry {
    fn from_row(row: &StockMoveRow) -> Self {
        Self {
            id: row.id,
            date: row.date,
            tie_break: (row.created_at.timestamp_nanos_opt().unwrap_or_default(), row.id),
            direction: row.direction,
            quantity: Rate::from_decimal(row.quantity),
            unit_cost_applied: Rate::from_decimal(row.unit_cost_applied),
            total_cost_override: row.total_cost_override.map(Money::from_decimal),
            stored_total_cost: Some(Money::from_decimal(row.total_cost_applied)),
        }
    }

    fn from_input(id: Uuid, input: &StockMoveInput) -> Self {
        Self {
            id,
            date: input.date,
            tie_break: (i64::MAX, id),
            direction: input.direction,
            quantity: input.quantity,
            unit_cost_applied: input.unit_cost_applied,
            total_cost_override: input.total_cost_override,
            stored_total_cost: None,
        }
    }
}

struct ReplayStep {
    entry_id: Uuid,
    total_cost: Money,
}

struct ReplayOutcome {
    steps: Vec<ReplayStep>,
    final_balance: InventoryBalance,
}

struct OverDrawn {
    on_hand: Rate,
    requested: Rate,
}

/// Walks a date-sorted timeline from zero, recomputing `(quantity_on_hand,
/// total_value, wac)` at each step. Pure so a backdated-move scenario can
/// be checked without a database.
fn replay_timeline(timeline: &[TimelineEntry], allow_negative_on_hand: bool) -> Result<ReplayOutcome, OverDrawn> {
    let mut balance = InventoryBalance::ZERO;
    let mut steps = Vec::with_capacity(timeline.len());

    for entry in timeline {
        let total_cost = match entry.direction {
            Direction::In => entry
                .total_cost_override
                .unwrap_or_else(|| (entry.quantity * entry.unit_cost_applied).round2()),
            Direction::Out => entry
                .total_cost_override
                .unwrap_or_else(|| (entry.quantity * balance.wac).round2()),
        };

        let new_quantity = match entry.direction {
            Direction::In => balance.quantity_on_hand + entry.quantity,
            Direction::Out => balance.quantity_on_hand - entry.quantity,
        };

        if new_quantity.is_negative() && !allow_negative_on_hand {
            return Err(OverDrawn {
                on_hand: balance.quantity_on_hand,
                requested: entry.quantity,
            });
        }

        let new_value = match entry.direction {
            Direction::In => balance.total_value + total_cost,
            Direction::Out => balance.total_value - total_cost,
        };

        let new_wac = if new_quantity.is_positive() {
            Rate::from_decimal(new_value.as_decimal() / new_quantity.as_decimal())
        } else {
            Rate::ZERO
        };

        balance = InventoryBalance {
            quantity_on_hand: new_quantity,
            total_value: if new_quantity.is_zero() { Money::ZERO } else { new_value },
            wac: new_wac,
        };

        steps.push(ReplayStep {
            entry_id: entry.id,
            total_cost,
        });
    }

    Ok(ReplayOutcome {
        steps,
        final_balance: balance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(
        date: NaiveDate,
        order: i64,
        direction: Direction,
        quantity: &str,
        unit_cost: &str,
    ) -> TimelineEntry {
        let id = Uuid::new_v4();
        TimelineEntry {
            id,
            date,
            tie_break: (order, id),
            direction,
            quantity: Rate::parse(quantity).unwrap(),
            unit_cost_applied: Rate::parse(unit_cost).unwrap(),
            total_cost_override: None,
            stored_total_cost: None,
        }
    }

    #[test]
    fn receipt_then_issue_applies_wac_at_time_of_issue() {
        let d0 = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let d5 = NaiveDate::from_ymd_opt(2026, 1, 6).unwrap();
        let timeline = vec![
            entry(d0, 0, Direction::In, "10", "5"),
            entry(d5, 1, Direction::Out, "4", "0"),
        ];

        let outcome = replay_timeline(&timeline, false).unwrap();

        assert_eq!(outcome.steps[1].total_cost, Money::parse("20.00").unwrap());
        assert_eq!(outcome.final_balance.quantity_on_hand, Rate::parse("6").unwrap());
        assert_eq!(outcome.final_balance.total_value, Money::parse("30.00").unwrap());
        assert_eq!(outcome.final_balance.wac, Rate::parse("5").unwrap());
    }

    #[test]
    fn backdated_receipt_replays_and_revalues_the_later_out() {
        // Spec scenario: receive 10@5 (D), issue 4 (D+5), backdated receipt of
        // 10@7 dated D+2 — WAC becomes 6.0 and the D+5 issue revalues to 24.
        let d0 = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2026, 1, 3).unwrap();
        let d5 = NaiveDate::from_ymd_opt(2026, 1, 6).unwrap();

        let mut timeline = vec![
            entry(d0, 0, Direction::In, "10", "5"),
            entry(d5, 1, Direction::Out, "4", "0"),
        ];
        timeline.push(entry(d2, 2, Direction::In, "10", "7"));
        timeline.sort_by_key(|e| (e.date, e.tie_break));

        let outcome = replay_timeline(&timeline, false).unwrap();

        let out_step = timeline
            .iter()
            .zip(outcome.steps.iter())
            .find(|(e, _)| e.direction == Direction::Out)
            .map(|(_, s)| s)
            .unwrap();
        assert_eq!(out_step.total_cost, Money::parse("24.00").unwrap());
        assert_eq!(outcome.final_balance.quantity_on_hand, Rate::parse("16").unwrap());
        assert_eq!(outcome.final_balance.total_value, Money::parse("96.00").unwrap());
        assert_eq!(outcome.final_balance.wac, Rate::parse("6.0").unwrap());
    }

    #[test]
    fn issuing_more_than_on_hand_is_rejected_unless_allowed() {
        let d0 = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let timeline = vec![
            entry(d0, 0, Direction::In, "5", "10"),
            entry(d0, 1, Direction::Out, "6", "0"),
        ];

        assert!(replay_timeline(&timeline, false).is_err());
        assert!(replay_timeline(&timeline, true).is_ok());
    }

    #[test]
    fn quantity_returning_to_zero_zeroes_total_value() {
        let d0 = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let d1 = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        let timeline = vec![
            entry(d0, 0, Direction::In, "10", "5"),
            entry(d1, 1, Direction::Out, "10", "0"),
        ];

        let outcome = replay_timeline(&timeline, false).unwrap();
        assert!(outcome.final_balance.quantity_on_hand.is_zero());
        assert_eq!(outcome.final_balance.total_value, Money::ZERO);
    }

    #[test]
    fn value_only_adjustment_changes_value_without_touching_quantity() {
        let d0 = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let d1 = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        let mut adjustment = entry(d1, 1, Direction::In, "0", "0");
        adjustment.total_cost_override = Some(Money::parse("15.00").unwrap());
        let timeline = vec![entry(d0, 0, Direction::In, "10", "5"), adjustment];

        let outcome = replay_timeline(&timeline, false).unwrap();
        assert_eq!(outcome.final_balance.quantity_on_hand, Rate::parse("10").unwrap());
        assert_eq!(outcome.final_balance.total_value, Money::parse("65.00").unwrap());
        assert_eq!(outcome.final_balance.wac, Rate::parse("6.5").unwrap());
    }
}
