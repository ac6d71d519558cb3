use crate::order::{Order, Role, Roles, Status, UpdateError};

/// The single legal next status of `current`, `None` if it's terminal
///
/// Fails with `InvalidStatus` if `current` is not a known status.
pub fn next_status(current: &str) -> Result<Option<Status>, UpdateError> {
    let current: Status = current.parse()?;
    Ok(current.next())
}

/// Whether `role` may move an order from `from` to `to`
///
/// False whenever `to` isn't the next step of `from`, whatever the role.
pub fn can_transition(role: Role, from: Status, to: Status) -> bool {
    authorize(role, from, to).is_ok()
}

/// Same decision as `can_transition`, but says why it's refused
pub fn authorize(role: Role, from: Status, to: Status) -> Result<(), UpdateError> {
    check_legal(from, to)?;
    if role.allowed_targets().contains(&to) {
        Ok(())
    } else {
        Err(UpdateError::Unauthorized { from, to })
    }
}

fn check_legal(from: Status, to: Status) -> Result<(), UpdateError> {
    if from.next() == Some(to) {
        Ok(())
    } else {
        Err(UpdateError::IllegalTransition { from, to })
    }
}

/// Checks a requested status change before it's sent to the store
///
/// Always validated against the status `order` has right now, so a stale
/// request that somebody else already performed is refused as
/// `IllegalTransition`. Returns the validated target.
pub fn validate_update(
    order: &Order,
    requested: &str,
    role: Role,
) -> Result<Status, UpdateError> {
    validate(order, requested, |from, to| authorize(role, from, to))
}

/// `validate_update` for a user holding several roles
///
/// Allowed if any of the roles allows it.
pub fn validate_update_for(
    order: &Order,
    requested: &str,
    roles: &Roles,
) -> Result<Status, UpdateError> {
    validate(order, requested, |from, to| {
        if roles.iter().any(|role| can_transition(role, from, to)) {
            Ok(())
        } else {
            Err(UpdateError::Unauthorized { from, to })
        }
    })
}

fn validate<F>(
    order: &Order,
    requested: &str,
    permitted: F,
) -> Result<Status, UpdateError>
where
    F: FnOnce(Status, Status) -> Result<(), UpdateError>,
{
    let to: Status = requested.parse()?;
    let from = order.status()?;
    check_legal(from, to)?;
    permitted(from, to)?;
    Ok(to)
}

/// The update a user with `roles` could perform on `order` right now
///
/// Returns the role that permits it along with the target, so views can
/// pick a fitting button label. Admin wins over runner.
pub fn available_update(order: &Order, roles: &Roles) -> Option<(Role, Status)> {
    let from = order.status().ok()?;
    let to = from.next()?;
    [Role::Admin, Role::Runner, Role::Customer]
        .into_iter()
        .filter(|role| roles.has(*role))
        .find(|role| can_transition(*role, from, to))
        .map(|role| (role, to))
}
