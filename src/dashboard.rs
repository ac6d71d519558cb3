use crate::order::{Order, Status};

/// Newest orders first, ties broken by id
pub fn newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| {
        b.created_at.cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

fn has_status(order: &Order, statuses: &[Status]) -> bool {
    order.status().map(|s| statuses.contains(&s)).unwrap_or(false)
}

const IN_PROGRESS: &[Status] =
    &[Status::Accepted, Status::Picking, Status::OutForDelivery];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AdminStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub delivered: usize,
}

/// Orders with a status we don't know only count towards `total`
pub fn admin_stats(orders: &[Order]) -> AdminStats {
    AdminStats {
        total: orders.len(),
        pending: orders.iter().filter(|o| has_status(o, &[Status::Pending])).count(),
        in_progress: orders.iter().filter(|o| has_status(o, IN_PROGRESS)).count(),
        delivered: orders.iter().filter(|o| has_status(o, &[Status::Delivered])).count(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdminFilter {
    All,
    Only(Status),
}

impl AdminFilter {
    pub fn all_filters() -> Vec<AdminFilter> {
        std::iter::once(AdminFilter::All)
            .chain(Status::ALL.iter().cloned().map(AdminFilter::Only))
            .collect()
    }

    pub const fn id(self) -> &'static str {
        match self {
            AdminFilter::All          => "all",
            AdminFilter::Only(status) => status.id(),
        }
    }

    pub fn from_id(id: &str) -> Option<AdminFilter> {
        if id == "all" {
            return Some(AdminFilter::All)
        }
        Status::from_id(id).map(AdminFilter::Only)
    }

    pub fn human_name(self) -> &'static str {
        match self {
            AdminFilter::All          => "All",
            AdminFilter::Only(status) => status.label(),
        }
    }

    pub fn matches(self, order: &Order) -> bool {
        match self {
            AdminFilter::All          => true,
            AdminFilter::Only(status) => has_status(order, &[status]),
        }
    }

    pub fn apply(self, orders: &[Order]) -> Vec<Order> {
        orders.iter().filter(|o| self.matches(o)).cloned().collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunnerTab {
    /// Accepted by the store, waiting for a runner
    Available,

    /// Being picked or on the way
    MyDeliveries,

    Completed,
}

impl RunnerTab {
    pub const ALL: &'static [RunnerTab] =
        &[ RunnerTab::Available,
           RunnerTab::MyDeliveries,
           RunnerTab::Completed ];

    pub const fn id(self) -> &'static str {
        match self {
            RunnerTab::Available    => "available",
            RunnerTab::MyDeliveries => "my_deliveries",
            RunnerTab::Completed    => "completed",
        }
    }

    pub fn from_id(id: &str) -> Option<RunnerTab> {
        RunnerTab::ALL.iter().cloned().find(|t| t.id() == id)
    }

    pub const fn human_name(self) -> &'static str {
        match self {
            RunnerTab::Available    => "📦 Available",
            RunnerTab::MyDeliveries => "🚴 My Deliveries",
            RunnerTab::Completed    => "✅ Completed",
        }
    }

    /// What to say when the tab is empty
    pub const fn empty_text(self) -> &'static str {
        match self {
            RunnerTab::Available    => "🎉 No orders waiting for pickup!",
            RunnerTab::MyDeliveries => "📭 No active deliveries",
            RunnerTab::Completed    => "📊 No completed deliveries yet",
        }
    }

    pub const fn statuses(self) -> &'static [Status] {
        match self {
            RunnerTab::Available    => &[Status::Accepted],
            RunnerTab::MyDeliveries => &[Status::Picking, Status::OutForDelivery],
            RunnerTab::Completed    => &[Status::Delivered],
        }
    }

    pub fn matches(self, order: &Order) -> bool {
        has_status(order, self.statuses())
    }

    pub fn apply(self, orders: &[Order]) -> Vec<Order> {
        orders.iter().filter(|o| self.matches(o)).cloned().collect()
    }

    pub fn count(self, orders: &[Order]) -> usize {
        orders.iter().filter(|o| self.matches(o)).count()
    }
}
