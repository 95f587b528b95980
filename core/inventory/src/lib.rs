//! Weighted-average-cost inventory valuation: stock moves and value-only
//! adjustments replayed through one engine, with backdated-move detection
//! and revaluation of downstream moves.

pub mod errors;
pub mod repos;
pub mod services;
pub mod types;

pub use errors::InventoryError;
pub use services::wac_engine::{apply_stock_move_wac, apply_stock_value_adjustment_wac, AppliedMove};
pub use types::{
    Direction, InventoryBalance, StockMove, StockMoveInput, StockMoveKind, StockMoveRow,
};
