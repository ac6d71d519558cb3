use crate::order::Status;

/// Why a status change was refused
///
/// All of these are local and recoverable. `InvalidStatus` means the
/// record itself is broken, the other two mean "don't offer this button".
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum UpdateError {
    /// Value is not one of the known statuses
    #[error("Unknown order status \"{0}\"")]
    InvalidStatus(String),

    /// Target is not the single next step of the current status
    #[error("An order can't go from {from} to {to}. \
Somebody may have updated it already, try refreshing")]
    IllegalTransition { from: Status, to: Status },

    /// Transition is legal but nobody with these roles may perform it
    #[error("You are not permitted to move this order to {to}")]
    Unauthorized { from: Status, to: Status },
}
