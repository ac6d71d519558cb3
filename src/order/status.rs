use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};

use crate::order::UpdateError;

/// Position of an order on its way from the store to the customer
///
/// There is exactly one path through these, see `Status::next`.
/// The serialized names are shared with the order store and must not change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
         Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Just placed, nobody has looked at it yet
    Pending,

    /// Store agreed to fulfil it
    Accepted,

    /// Runner is collecting the items
    Picking,

    /// Runner is on the way
    OutForDelivery,

    /// Handed over, nothing else can happen to it
    Delivered,
}

impl Status {
    /// Every status in path order
    pub const ALL: &'static [Status] =
        &[ Status::Pending,
           Status::Accepted,
           Status::Picking,
           Status::OutForDelivery,
           Status::Delivered ];

    pub const fn id(self) -> &'static str {
        match self {
            Status::Pending        => "pending",
            Status::Accepted       => "accepted",
            Status::Picking        => "picking",
            Status::OutForDelivery => "out_for_delivery",
            Status::Delivered      => "delivered",
        }
    }

    /// Converts str to Status, returns None if it doesn't
    /// match any of the status ids
    pub fn from_id(id: &str) -> Option<Status> {
        Status::ALL.iter().cloned().find(|s| s.id() == id)
    }

    /// The only status this one may move to, None for `Delivered`
    pub const fn next(self) -> Option<Status> {
        match self {
            Status::Pending        => Some(Status::Accepted),
            Status::Accepted       => Some(Status::Picking),
            Status::Picking        => Some(Status::OutForDelivery),
            Status::OutForDelivery => Some(Status::Delivered),
            Status::Delivered      => None,
        }
    }

    /// 1-based position on the path
    pub const fn step_index(self) -> u8 {
        match self {
            Status::Pending        => 1,
            Status::Accepted       => 2,
            Status::Picking        => 3,
            Status::OutForDelivery => 4,
            Status::Delivered      => 5,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Status::Delivered)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Status {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::from_id(s).ok_or_else(|| UpdateError::InvalidStatus(s.to_string()))
    }
}
