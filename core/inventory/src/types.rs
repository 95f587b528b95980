use chrono::{DateTime, NaiveDate, Utc};
use money_rs::{Money, Rate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "stock_move_type", rename_all = "UPPERCASE")]
pub enum StockMoveKind {
    PurchaseReceipt,
    SaleIssue,
    Adjustment,
    PurchaseReturn,
    SaleReturn,
    Transfer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "stock_move_direction", rename_all = "UPPERCASE")]
pub enum Direction {
    In,
    Out,
}

/// A caller-supplied stock move, not yet persisted. `total_cost_override`
/// covers two cases: preserving a discounted lot cost on an IN move
/// (per spec 4.7), and expressing a value-only adjustment (quantity zero,
/// a fixed value delta rather than `quantity × cost`).
#[derive(Debug, Clone)]
pub struct StockMoveInput {
    pub location_id: Uuid,
    pub item_id: Uuid,
    pub date: NaiveDate,
    pub move_type: StockMoveKind,
    pub direction: Direction,
    pub quantity: Rate,
    pub unit_cost_applied: Rate,
    pub total_cost_override: Option<Money>,
    pub reference_type: String,
    pub reference_id: String,
    pub correlation_id: Uuid,
    pub journal_entry_id: Option<Uuid>,
    pub allow_backdated: bool,
    /// Permits a replay step to drive on-hand quantity negative. Only the
    /// void/compensating-move path sets this (reversing a move that itself
    /// consumed stock which has since been partially reissued).
    pub allow_negative_on_hand: bool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StockMoveRow {
    pub id: Uuid,
    pub company_id: Uuid,
    pub location_id: Uuid,
    pub item_id: Uuid,
    pub date: NaiveDate,
    pub move_type: StockMoveKind,
    pub direction: Direction,
    pub quantity: rust_decimal::Decimal,
    pub unit_cost_applied: rust_decimal::Decimal,
    pub total_cost_applied: rust_decimal::Decimal,
    pub total_cost_override: Option<rust_decimal::Decimal>,
    pub reference_type: String,
    pub reference_id: String,
    pub correlation_id: Uuid,
    pub journal_entry_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct StockMove {
    pub id: Uuid,
    pub location_id: Uuid,
    pub item_id: Uuid,
    pub date: NaiveDate,
    pub move_type: StockMoveKind,
    pub direction: Direction,
    pub quantity: Rate,
    pub unit_cost_applied: Rate,
    pub total_cost_applied: Money,
}

#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct InventoryBalanceRow {
    pub quantity_on_hand: rust_decimal::Decimal,
    pub total_value: rust_decimal::Decimal,
    pub wac: rust_decimal::Decimal,
}

#[derive(Debug, Clone, Copy)]
pub struct InventoryBalance {
    pub quantity_on_hand: Rate,
    pub total_value: Money,
    pub wac: Rate,
}

impl InventoryBalance {
    pub const ZERO: InventoryBalance = InventoryBalance {
        quantity_on_hand: Rate::ZERO,
        total_value: Money::ZERO,
        wac: Rate::ZERO,
    };
}
