//! User Service - registration, lookup and role management

use super::{Catalog, ServiceError};
use crate::domain::ValidationWarning;
use crate::models::{User, UserRole};

/// Register a new user.
///
/// Name and email go through normalization; the registration is refused when
/// any of id, name or email ends up empty, or when the id is already used.
pub fn register_user(
    catalog: &mut Catalog,
    user_id: &str,
    name: &str,
    email: &str,
    role: UserRole,
) -> Result<Vec<ValidationWarning>, ServiceError> {
    let normalized = User::new(user_id, name, email, role);
    let user = &normalized.value;

    let fields = [
        ("user ID", user.user_id()),
        ("name", user.name()),
        ("email", user.email()),
    ];
    for (field, value) in fields {
        if value.is_empty() {
            return Err(ServiceError::InvalidInput(format!("invalid or missing {}", field)));
        }
    }
    if catalog.find_user(user.user_id()).is_some() {
        return Err(ServiceError::duplicate("User", user.user_id()));
    }

    tracing::info!("Registered user '{}' as {}", user.user_id(), user.role());
    catalog.users.push(normalized.value);
    Ok(normalized.warnings)
}

pub fn get_user<'a>(catalog: &'a Catalog, user_id: &str) -> Result<&'a User, ServiceError> {
    catalog
        .find_user(user_id)
        .ok_or_else(|| ServiceError::not_found("User", user_id))
}

/// Employees and admins; unknown users are not staff
pub fn is_staff(catalog: &Catalog, user_id: &str) -> bool {
    catalog
        .find_user(user_id)
        .is_some_and(|u| u.role().is_staff())
}

/// Change a user's role. Only an admin may do this.
pub fn set_role(
    catalog: &mut Catalog,
    acting_user_id: &str,
    target_user_id: &str,
    role: UserRole,
) -> Result<(), ServiceError> {
    let acting = get_user(catalog, acting_user_id)?;
    if acting.role() != UserRole::Admin {
        return Err(ServiceError::NotPermitted(
            "only administrators can change roles".to_string(),
        ));
    }

    let target = catalog
        .find_user_mut(target_user_id)
        .ok_or_else(|| ServiceError::not_found("User", target_user_id))?;
    tracing::info!(
        "User '{}' role changed from {} to {} by '{}'",
        target_user_id,
        target.role(),
        role,
        acting_user_id
    );
    target.set_role(role);
    Ok(())
}
