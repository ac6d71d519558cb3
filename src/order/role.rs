use std::collections::BTreeSet;
use std::fmt;
use serde::{Serialize, Deserialize};

use crate::order::Status;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
         Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Places orders and watches them, can't move them
    Customer,

    /// Runs the store, may perform every transition
    Admin,

    /// Delivers orders the store has accepted
    Runner,
}

impl Role {
    pub const ALL: &'static [Role] =
        &[ Role::Customer, Role::Admin, Role::Runner ];

    pub const fn id(self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin    => "admin",
            Role::Runner   => "runner",
        }
    }

    /// Maps an identity group name to a role
    ///
    /// Accepts both singular and plural group names, case doesn't matter.
    pub fn from_group(group: &str) -> Option<Role> {
        match group.trim().to_ascii_lowercase().as_str() {
            "admin"  | "admins"  => Some(Role::Admin),
            "runner" | "runners" => Some(Role::Runner),
            "customer" | "customers" => Some(Role::Customer),
            _ => None,
        }
    }

    /// Statuses this role may move an order *to*
    pub const fn allowed_targets(self) -> &'static [Status] {
        match self {
            Role::Customer => &[],
            Role::Admin =>
                &[Status::Accepted,
                  Status::Picking,
                  Status::OutForDelivery,
                  Status::Delivered],
            Role::Runner =>
                &[Status::Picking,
                  Status::OutForDelivery,
                  Status::Delivered],
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Every role a user holds
///
/// Roles are not exclusive, a user can be both an admin and a runner.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Roles(BTreeSet<Role>);

impl Roles {
    /// No roles at all, i.e. someone we couldn't identify
    pub fn none() -> Roles {
        Roles(BTreeSet::new())
    }

    /// Roles of an identified user given their group memberships
    ///
    /// Anyone identified is a customer, unknown groups are ignored.
    pub fn from_groups<I, S>(groups: I) -> Roles
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut roles = Roles::none().with(Role::Customer);
        for group in groups {
            match Role::from_group(group.as_ref()) {
                Some(role) => { roles.0.insert(role); },
                None => log::debug!("ignoring unknown group {:?}", group.as_ref()),
            }
        }
        roles
    }

    pub fn with(mut self, role: Role) -> Roles {
        self.0.insert(role);
        self
    }

    pub fn has(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().cloned()
    }

    pub fn is_staff(&self) -> bool {
        self.has(Role::Admin) || self.has(Role::Runner)
    }
}

impl fmt::Display for Roles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "nobody");
        }
        let names: Vec<&str> = self.iter().map(|r| r.id()).collect();
        write!(f, "{}", names.join(", "))
    }
}
