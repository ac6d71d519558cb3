use std::collections::{BTreeMap, BTreeSet};
use teloxide::types::UserId;

use crate::config::Config;
use crate::order::Roles;

/// Who is in which identity group
///
/// Stands in for the identity provider: it only knows group memberships,
/// the roles are worked out from them by `Roles::from_groups`.
#[derive(Clone, Debug, Default)]
pub struct Directory {
    groups: BTreeMap<String, BTreeSet<UserId>>,
}

impl Directory {
    pub fn new(groups: BTreeMap<String, Vec<UserId>>) -> Directory {
        let groups = groups.into_iter()
            .map(|(name, members)| (name, members.into_iter().collect()))
            .collect();
        Directory { groups }
    }

    pub fn from_config(config: &Config) -> Directory {
        Directory::new(config.groups.clone())
    }

    /// Names of the groups `uid` belongs to
    pub fn groups_of(&self, uid: UserId) -> Vec<&str> {
        self.groups.iter()
            .filter(|(_name, members)| members.contains(&uid))
            .map(|(name, _members)| name.as_str())
            .collect()
    }

    pub fn roles_of(&self, uid: UserId) -> Roles {
        Roles::from_groups(self.groups_of(uid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::Role;

    fn mk_directory() -> Directory {
        let mut groups = BTreeMap::new();
        groups.insert("admins".to_string(), vec![UserId(1)]);
        groups.insert("runners".to_string(), vec![UserId(1), UserId(2)]);
        groups.insert("beta_testers".to_string(), vec![UserId(3)]);
        Directory::new(groups)
    }

    #[test]
    fn test_roles_of() {
        let dir = mk_directory();

        let roles = dir.roles_of(UserId(1));
        assert!(roles.has(Role::Admin) && roles.has(Role::Runner));

        let roles = dir.roles_of(UserId(2));
        assert!(roles.has(Role::Runner) && !roles.has(Role::Admin));

        let roles = dir.roles_of(UserId(3));
        assert!(roles.has(Role::Customer) && !roles.is_staff());

        assert_eq!(vec!["beta_testers"], dir.groups_of(UserId(3)));
        assert!(dir.groups_of(UserId(99)).is_empty());
    }
}
