//! Notification Service - staff messages to users

use super::{Catalog, ServiceError};
use crate::models::Notification;

/// Send `message` to an existing user, stamped with `now`
pub fn send_notification(
    catalog: &mut Catalog,
    notification_id: &str,
    user_id: &str,
    message: &str,
    now: i64,
) -> Result<(), ServiceError> {
    if catalog.find_user(user_id).is_none() {
        return Err(ServiceError::not_found("User", user_id));
    }
    if catalog.find_notification(notification_id).is_some() {
        return Err(ServiceError::duplicate("Notification", notification_id));
    }

    let notification = Notification::new_at(notification_id, user_id, message, now, now)?;
    tracing::info!("Notification '{}' sent to '{}'", notification_id, user_id);
    catalog.notifications.push(notification);
    Ok(())
}

pub fn inbox<'a>(catalog: &'a Catalog, user_id: &str) -> Vec<&'a Notification> {
    catalog
        .notifications
        .iter()
        .filter(|n| n.user_id() == user_id)
        .collect()
}

pub fn unread_count(catalog: &Catalog, user_id: &str) -> usize {
    inbox(catalog, user_id).iter().filter(|n| !n.is_read()).count()
}

/// Mark a notification read; only its recipient may do so
pub fn mark_notification_read(
    catalog: &mut Catalog,
    acting_user_id: &str,
    notification_id: &str,
) -> Result<(), ServiceError> {
    let notification = catalog
        .find_notification_mut(notification_id)
        .ok_or_else(|| ServiceError::not_found("Notification", notification_id))?;
    if notification.user_id() != acting_user_id {
        return Err(ServiceError::NotPermitted(
            "this notification belongs to another user".to_string(),
        ));
    }
    notification.mark_read();
    Ok(())
}
