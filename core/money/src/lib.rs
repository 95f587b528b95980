//! Fixed-point decimal kernel for the posting path.
//!
//! Every value that flows through the ledger, inventory, or settlement
//! engines is a [`Money`] (2 fractional digits, half-away-from-zero
//! rounding) or a [`Rate`] (up to 6 fractional digits, used for quantities
//! and weighted-average cost). Floating point never appears on these types
//! — construction from `f64` is intentionally not provided.

mod money;
mod rate;

pub use money::Money;
pub use rate::Rate;

use rust_decimal::Decimal;

/// Rounding mode used for every monetary and rate computation in this
/// workspace: round half away from zero, matching how invoices, tax lines,
/// and WAC are rounded in practice.
pub(crate) const ROUNDING: rust_decimal::RoundingStrategy =
    rust_decimal::RoundingStrategy::MidpointAwayFromZero;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecimalError {
    #[error("could not parse '{0}' as a decimal amount")]
    InvalidFormat(String),
    #[error("value '{0}' is not finite")]
    NotFinite(String),
}

pub(crate) fn parse_decimal(raw: &str) -> Result<Decimal, DecimalError> {
    Decimal::from_str_exact(raw.trim())
        .or_else(|_| raw.trim().parse::<Decimal>())
        .map_err(|_| DecimalError::InvalidFormat(raw.to_string()))
}
