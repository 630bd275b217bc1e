//! Loan Service - borrowing, returning and renewing resources

use super::{Catalog, ServiceError};
use crate::models::{Loan, RenewalOutcome};

/// Lend `resource_id` to `user_id` for one loan period starting at `now`.
///
/// Checked in order: the user exists, the resource exists, the user does not
/// already hold it, and it is available.
pub fn borrow_resource(
    catalog: &mut Catalog,
    loan_id: &str,
    user_id: &str,
    resource_id: &str,
    now: i64,
) -> Result<Loan, ServiceError> {
    // 1. Check the parties
    if catalog.find_user(user_id).is_none() {
        return Err(ServiceError::not_found("User", user_id));
    }
    let resource = catalog
        .find_resource(resource_id)
        .ok_or_else(|| ServiceError::not_found("Resource", resource_id))?;
    if catalog.find_active_loan(user_id, resource_id).is_some() {
        return Err(ServiceError::AlreadyBorrowed(resource_id.to_string()));
    }
    if !resource.is_available() {
        return Err(ServiceError::Unavailable(resource_id.to_string()));
    }
    if catalog.find_loan(loan_id).is_some() {
        return Err(ServiceError::duplicate("Loan", loan_id));
    }

    // 2. Create the loan
    let policy = catalog.policy;
    let loan = Loan::new_at(
        loan_id,
        user_id,
        resource_id,
        now,
        now.saturating_add(policy.loan_period_secs()),
        &policy,
        now,
    )
    .value;
    if loan.loan_id().is_empty() || loan.user_id().is_empty() || loan.resource_id().is_empty() {
        return Err(ServiceError::InvalidInput("invalid loan identifiers".to_string()));
    }

    // 3. Mark the resource as lent
    if let Some(resource) = catalog.find_resource_mut(resource_id) {
        resource.set_available(false);
    }
    tracing::info!(
        "Loan '{}': '{}' borrowed by '{}' until {}",
        loan.loan_id(),
        resource_id,
        user_id,
        loan.due_date()
    );
    catalog.loans.push(loan.clone());
    Ok(loan)
}

/// Close the user's active loan on `resource_id` and make it available again
pub fn return_resource(
    catalog: &mut Catalog,
    user_id: &str,
    resource_id: &str,
    now: i64,
) -> Result<(), ServiceError> {
    let loan = catalog
        .find_active_loan_mut(user_id, resource_id)
        .ok_or_else(|| ServiceError::not_found("Active loan", resource_id))?;

    let outcome = loan.mark_returned_at(now);
    if !outcome.is_applied() {
        return Err(ServiceError::InvalidState(format!(
            "loan '{}' cannot be returned ({:?})",
            loan.loan_id(),
            outcome
        )));
    }

    if let Some(resource) = catalog.find_resource_mut(resource_id) {
        resource.set_available(true);
    }
    tracing::info!("'{}' returned by '{}'", resource_id, user_id);
    Ok(())
}

/// Renew the user's active loan on `resource_id`; a refusal is an `Ok` outcome
pub fn renew_loan(
    catalog: &mut Catalog,
    user_id: &str,
    resource_id: &str,
    now: i64,
) -> Result<RenewalOutcome, ServiceError> {
    let policy = catalog.policy;
    let loan = catalog
        .find_active_loan_mut(user_id, resource_id)
        .ok_or_else(|| ServiceError::not_found("Active loan", resource_id))?;
    Ok(loan.renew_at(&policy, now))
}

pub fn active_loans_for<'a>(catalog: &'a Catalog, user_id: &str) -> Vec<&'a Loan> {
    catalog
        .loans
        .iter()
        .filter(|l| !l.is_returned() && l.user_id() == user_id)
        .collect()
}

/// Full loan history of a user, returned loans included, oldest first
pub fn loan_history<'a>(catalog: &'a Catalog, user_id: &str) -> Vec<&'a Loan> {
    let mut loans: Vec<&Loan> = catalog.loans.iter().filter(|l| l.user_id() == user_id).collect();
    loans.sort_by_key(|l| l.borrow_date());
    loans
}

/// Every unreturned loan past its due date
pub fn overdue_loans<'a>(catalog: &'a Catalog, now: i64) -> Vec<&'a Loan> {
    catalog.loans.iter().filter(|l| l.is_overdue_at(now)).collect()
}
