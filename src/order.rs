use std::fmt;
use teloxide::types::UserId;
use serde::{Serialize, Deserialize};

mod display;
mod role;
mod status;
mod update;
mod update_error;
pub mod workflow;
pub use display::{describe, is_active, progress, action_label,
                  StatusInfo, ProgressStep, StepState};
pub use role::{Role, Roles};
pub use status::Status;
pub use update::StatusUpdate;
pub use update_error::UpdateError;
pub use workflow::{next_status, can_transition, validate_update,
                   validate_update_for, available_update};
use crate::DateTime;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
         Serialize, Deserialize)]
#[repr(transparent)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    /// Price of one item in cents
    pub unit_price: u64,
}

impl OrderItem {
    /// None if it doesn't fit in cents
    pub fn checked_total(&self) -> Option<u64> {
        self.unit_price.checked_mul(u64::from(self.quantity))
    }

    /// Items of a stored order were priced at checkout, so this fits
    pub fn total(&self) -> u64 {
        self.unit_price.saturating_mul(u64::from(self.quantity))
    }
}

/// Order as the store keeps it
///
/// Everything except the status and its timestamps is fixed at checkout.
/// Money is in cents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "orderId")]
    pub id: OrderId,

    /// Who placed it
    pub customer_id: UserId,

    pub items: Vec<OrderItem>,

    pub subtotal: u64,

    pub delivery_fee: u64,

    /// `subtotal + delivery_fee`, computed once at checkout
    pub total: u64,

    pub delivery_address: String,

    #[serde(default)]
    pub delivery_instructions: Option<String>,

    /// Raw status as the store sent it, see `Order::status`
    pub status: String,

    pub created_at: DateTime,

    /// Last status change
    #[serde(default)]
    pub updated_at: Option<DateTime>,

    #[serde(default)]
    pub accepted_at: Option<DateTime>,

    #[serde(default)]
    pub delivered_at: Option<DateTime>,
}

impl Order {
    /// Parsed status, `InvalidStatus` if the store sent us something
    /// we don't know
    pub fn status(&self) -> Result<Status, UpdateError> {
        self.status.parse()
    }

    pub fn is_active(&self) -> bool {
        is_active(&self.status)
    }

    pub fn info(&self) -> StatusInfo<'_> {
        describe(&self.status)
    }

    /// Records a status change the store has accepted
    pub fn apply_status(&mut self, status: Status, at: DateTime) {
        self.status = status.id().to_string();
        self.updated_at = Some(at);
        match status {
            Status::Accepted  => self.accepted_at = Some(at),
            Status::Delivered => self.delivered_at = Some(at),
            _ => (),
        }
    }

    pub fn num_items(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}
