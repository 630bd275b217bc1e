//! Reservation Service - holds on resources that are currently lent out

use super::{Catalog, ServiceError};
use crate::models::{Reservation, TransitionOutcome};

/// Place a hold on a resource that is not available
pub fn reserve_resource(
    catalog: &mut Catalog,
    reservation_id: &str,
    user_id: &str,
    resource_id: &str,
    now: i64,
) -> Result<Reservation, ServiceError> {
    if catalog.find_user(user_id).is_none() {
        return Err(ServiceError::not_found("User", user_id));
    }
    let resource = catalog
        .find_resource(resource_id)
        .ok_or_else(|| ServiceError::not_found("Resource", resource_id))?;
    if resource.is_available() {
        return Err(ServiceError::StillAvailable(resource_id.to_string()));
    }
    let already_held = catalog
        .reservations
        .iter()
        .any(|r| r.is_pending() && r.user_id() == user_id && r.resource_id() == resource_id);
    if already_held {
        return Err(ServiceError::InvalidState(format!(
            "you already have a pending reservation for '{}'",
            resource_id
        )));
    }
    if catalog.find_reservation(reservation_id).is_some() {
        return Err(ServiceError::duplicate("Reservation", reservation_id));
    }

    let reservation = Reservation::new_at(reservation_id, user_id, resource_id, now, now).value;
    if reservation.reservation_id().is_empty()
        || reservation.user_id().is_empty()
        || reservation.resource_id().is_empty()
    {
        return Err(ServiceError::InvalidInput(
            "invalid reservation identifiers".to_string(),
        ));
    }

    tracing::info!("Reservation '{}': '{}' held for '{}'", reservation_id, resource_id, user_id);
    catalog.reservations.push(reservation.clone());
    Ok(reservation)
}

fn outcome_to_result(reservation_id: &str, outcome: TransitionOutcome) -> Result<(), ServiceError> {
    match outcome {
        TransitionOutcome::Applied => Ok(()),
        TransitionOutcome::AlreadyFinal => Err(ServiceError::InvalidState(format!(
            "reservation '{}' is no longer pending",
            reservation_id
        ))),
        TransitionOutcome::IncompleteRecord => Err(ServiceError::InvalidState(format!(
            "reservation '{}' is missing information",
            reservation_id
        ))),
    }
}

/// Cancel a pending reservation. Only its owner may cancel it.
pub fn cancel_reservation(
    catalog: &mut Catalog,
    acting_user_id: &str,
    reservation_id: &str,
) -> Result<(), ServiceError> {
    let reservation = catalog
        .find_reservation_mut(reservation_id)
        .ok_or_else(|| ServiceError::not_found("Reservation", reservation_id))?;
    if reservation.user_id() != acting_user_id {
        return Err(ServiceError::NotPermitted(
            "you can only cancel your own reservations".to_string(),
        ));
    }
    outcome_to_result(reservation_id, reservation.cancel())
}

pub fn fulfill_reservation(
    catalog: &mut Catalog,
    reservation_id: &str,
    now: i64,
) -> Result<(), ServiceError> {
    let reservation = catalog
        .find_reservation_mut(reservation_id)
        .ok_or_else(|| ServiceError::not_found("Reservation", reservation_id))?;
    outcome_to_result(reservation_id, reservation.fulfill_at(now))
}

pub fn pending_reservations_for<'a>(catalog: &'a Catalog, user_id: &str) -> Vec<&'a Reservation> {
    catalog
        .reservations
        .iter()
        .filter(|r| r.is_pending() && r.user_id() == user_id)
        .collect()
}

pub fn pending_reservations(catalog: &Catalog) -> Vec<&Reservation> {
    catalog.reservations.iter().filter(|r| r.is_pending()).collect()
}
