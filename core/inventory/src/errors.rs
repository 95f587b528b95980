use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("insufficient-stock: {location_id}/{item_id} has {on_hand} on hand, cannot issue {requested}")]
    InsufficientStock {
        location_id: Uuid,
        item_id: Uuid,
        on_hand: money_rs::Rate,
        requested: money_rs::Rate,
    },

    #[error("backdated-move-not-allowed: move dated {0} precedes the latest move on file; pass allow_backdated to replay")]
    BackdatedMoveNotAllowed(chrono::NaiveDate),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("event serialization error: {0}")]
    EventSerialization(#[from] serde_json::Error),
}

impl InventoryError {
    pub fn kind(&self) -> &'static str {
        match self {
            InventoryError::InsufficientStock { .. } => "insufficient-stock",
            InventoryError::BackdatedMoveNotAllowed(_) => "invalid-input",
            InventoryError::Database(_) => "internal",
            InventoryError::EventSerialization(_) => "internal",
        }
    }
}
