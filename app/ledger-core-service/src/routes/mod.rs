//! One axum route per command verb (spec §6), grouped by aggregate.

pub mod advance;
pub mod invoice;
pub mod journal;
pub mod period;
pub mod purchase_bill;
pub mod vendor_credit;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(journal::router())
        .merge(invoice::router())
        .merge(purchase_bill::router())
        .merge(vendor_credit::router())
        .merge(advance::router())
        .merge(period::router())
}
