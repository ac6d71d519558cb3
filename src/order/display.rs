use std::borrow::Cow;

use crate::order::{Role, Status};

/// How a status is shown to people
///
/// The same for every view, so customers, admins and runners see the
/// same words for the same thing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusInfo<'a> {
    pub label: Cow<'a, str>,
    pub icon: &'static str,
    pub description: &'static str,
    /// 1-based position on the path, 0 for statuses we don't know
    pub step_index: u8,
}

impl Status {
    pub const fn label(self) -> &'static str {
        match self {
            Status::Pending        => "Order Placed",
            Status::Accepted       => "Accepted",
            Status::Picking        => "Being Picked",
            Status::OutForDelivery => "On The Way",
            Status::Delivered      => "Delivered",
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            Status::Pending        => "📝",
            Status::Accepted       => "✅",
            Status::Picking        => "🛒",
            Status::OutForDelivery => "🚴",
            Status::Delivered      => "🎉",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Status::Pending        => "Waiting for store to accept",
            Status::Accepted       => "Store is preparing your order",
            Status::Picking        => "Runner is picking up items",
            Status::OutForDelivery => "Your order is on the way!",
            Status::Delivered      => "Order completed",
        }
    }

    pub fn info(self) -> StatusInfo<'static> {
        StatusInfo {
            label: Cow::Borrowed(self.label()),
            icon: self.icon(),
            description: self.description(),
            step_index: self.step_index(),
        }
    }
}

const UNKNOWN_ICON: &str = "❓";

/// Display info for a raw status value
///
/// Never fails: a status we don't know (maybe a newer store added it)
/// is shown as itself with step 0.
pub fn describe(status: &str) -> StatusInfo<'_> {
    match Status::from_id(status) {
        Some(s) => s.info(),
        None => StatusInfo {
            label: Cow::Borrowed(status),
            icon: UNKNOWN_ICON,
            description: "",
            step_index: 0,
        },
    }
}

/// Whether the order is still moving, i.e. show a progress tracker
/// rather than a completed badge
pub fn is_active(status: &str) -> bool {
    status != Status::Delivered.id()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepState {
    Completed,
    Current,
    Pending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressStep {
    pub status: Status,
    pub state: StepState,
}

/// Every step of the path marked relative to `current`
pub fn progress(current: &str) -> Vec<ProgressStep> {
    let current = describe(current).step_index;
    Status::ALL.iter().cloned()
        .map(|status| {
            let step = status.step_index();
            let state = if current > step {
                StepState::Completed
            } else if current == step {
                StepState::Current
            } else {
                StepState::Pending
            };
            ProgressStep { status, state }
        })
        .collect()
}

/// Button text for moving an order to `target`
pub const fn action_label(role: Role, target: Status) -> &'static str {
    match (role, target) {
        (Role::Runner, Status::Picking)        => "🏪 Pick Up Order",
        (Role::Runner, Status::OutForDelivery) => "🚴 Start Delivery",
        (_, Status::Pending)                   => Status::Pending.label(),
        (_, Status::Accepted)                  => "Accept Order",
        (_, Status::Picking)                   => "Start Picking",
        (_, Status::OutForDelivery)            => "Out for Delivery",
        (_, Status::Delivered)                 => "✅ Mark Delivered",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_known() {
        let info = describe("out_for_delivery");
        assert_eq!("On The Way", info.label);
        assert_eq!("🚴", info.icon);
        assert_eq!(4, info.step_index);
        assert_eq!(Status::OutForDelivery.info(), info);
    }

    #[test]
    fn test_describe_falls_back() {
        let info = describe("refunded");
        assert_eq!("refunded", info.label);
        assert_eq!(0, info.step_index);
        assert_eq!("", info.description);
    }

    #[test]
    fn test_steps_strictly_increase() {
        let steps: Vec<u8> = Status::ALL.iter()
            .map(|s| describe(s.id()).step_index)
            .collect();
        assert!(steps.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(1, steps[0]);
        assert_eq!(5, steps[4]);
    }

    #[test]
    fn test_is_active() {
        assert!(!is_active("delivered"));
        for s in Status::ALL.iter().filter(|s| **s != Status::Delivered) {
            assert!(is_active(s.id()));
        }
        assert!(is_active("something_new"));
    }

    #[test]
    fn test_progress_marks_steps() {
        let states: Vec<StepState> =
            progress("picking").into_iter().map(|p| p.state).collect();
        assert_eq!(vec![StepState::Completed,
                        StepState::Completed,
                        StepState::Current,
                        StepState::Pending,
                        StepState::Pending], states);
    }

    #[test]
    fn test_progress_of_unknown_status() {
        assert!(progress("???").iter().all(|p| p.state == StepState::Pending));
    }

    #[test]
    fn test_action_labels() {
        assert_eq!("Accept Order", action_label(Role::Admin, Status::Accepted));
        assert_eq!("Start Picking", action_label(Role::Admin, Status::Picking));
        assert_eq!("🏪 Pick Up Order", action_label(Role::Runner, Status::Picking));
        assert_eq!("✅ Mark Delivered", action_label(Role::Runner, Status::Delivered));
        assert_eq!("Order Placed", action_label(Role::Admin, Status::Pending));
    }
}
