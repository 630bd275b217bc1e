use bibliocatalog::models::{BookInput, LoanState, RenewalOutcome, ReservationStatus, UserRole};
use bibliocatalog::services::{
    loan_service, notification_service, reservation_service, resource_service, user_service,
};
use bibliocatalog::{Catalog, ServiceError, seed};

const T0: i64 = 1_760_000_000;
const DAY: i64 = 86_400;

fn setup_library() -> Catalog {
    let mut catalog = Catalog::default();
    seed::ensure_default_admin(&mut catalog).unwrap();
    for (id, name, email, role) in [
        ("USER1001", "Ada Lovelace", "ada@example.com", UserRole::Student),
        ("USER1002", "Alan Turing", "alan@example.com", UserRole::Teacher),
    ] {
        user_service::register_user(&mut catalog, id, name, email, role).unwrap();
    }
    resource_service::add_book(
        &mut catalog,
        BookInput {
            title: "Structure and Interpretation of Computer Programs".into(),
            author: "Harold Abelson".into(),
            resource_id: "RES1001".into(),
            category: "Computer Science".into(),
            publication_year: 1985,
            publisher: "MIT Press".into(),
            number_of_pages: 657,
            isbn: "0-262-01077-1".into(),
            edition: "1st".into(),
        },
    )
    .unwrap();
    catalog
}

#[test]
fn test_borrow_then_borrow_again_is_already_borrowed() {
    let mut catalog = setup_library();

    let loan = loan_service::borrow_resource(&mut catalog, "LOAN1001", "USER1001", "RES1001", T0)
        .unwrap();
    assert!(!catalog.find_resource("RES1001").unwrap().is_available());
    assert_eq!(loan.borrow_date(), T0);
    assert_eq!(loan.due_date(), T0 + catalog.policy.loan_period_secs());

    assert_eq!(
        loan_service::borrow_resource(&mut catalog, "LOAN1002", "USER1001", "RES1001", T0),
        Err(ServiceError::AlreadyBorrowed("RES1001".into()))
    );
    assert_eq!(catalog.loans.len(), 1);
}

#[test]
fn test_full_lending_cycle_with_reservation() {
    let mut catalog = setup_library();

    // Ada borrows, Alan queues up
    loan_service::borrow_resource(&mut catalog, "LOAN1001", "USER1001", "RES1001", T0).unwrap();
    reservation_service::reserve_resource(&mut catalog, "RSV1001", "USER1002", "RES1001", T0)
        .unwrap();

    // Ada renews twice, the third attempt hits the default limit
    for _ in 0..2 {
        let outcome = loan_service::renew_loan(&mut catalog, "USER1001", "RES1001", T0 + DAY)
            .unwrap();
        assert!(outcome.is_renewed());
    }
    assert_eq!(
        loan_service::renew_loan(&mut catalog, "USER1001", "RES1001", T0 + DAY).unwrap(),
        RenewalOutcome::LimitReached
    );
    assert_eq!(catalog.find_loan("LOAN1001").unwrap().due_date(), T0 + 42 * DAY);

    // Staff can see nothing is overdue yet
    assert!(loan_service::overdue_loans(&catalog, T0 + 30 * DAY).is_empty());
    assert_eq!(loan_service::overdue_loans(&catalog, T0 + 43 * DAY).len(), 1);

    // Return, then hand the book to Alan
    loan_service::return_resource(&mut catalog, "USER1001", "RES1001", T0 + 40 * DAY).unwrap();
    let returned = catalog.find_loan("LOAN1001").unwrap();
    assert_eq!(returned.state(), LoanState::Returned);
    assert!(catalog.find_resource("RES1001").unwrap().is_available());

    reservation_service::fulfill_reservation(&mut catalog, "RSV1001", T0 + 40 * DAY).unwrap();
    let reservation = catalog.find_reservation("RSV1001").unwrap();
    assert_eq!(reservation.status(), ReservationStatus::Fulfilled);
    assert_eq!(reservation.fulfillment_date(), T0 + 40 * DAY);

    loan_service::borrow_resource(&mut catalog, "LOAN1002", "USER1002", "RES1001", T0 + 40 * DAY)
        .unwrap();
    assert_eq!(loan_service::active_loans_for(&catalog, "USER1002").len(), 1);
    assert!(loan_service::active_loans_for(&catalog, "USER1001").is_empty());
}

#[test]
fn test_cannot_remove_lent_resource() {
    let mut catalog = setup_library();
    loan_service::borrow_resource(&mut catalog, "LOAN1001", "USER1001", "RES1001", T0).unwrap();
    reservation_service::reserve_resource(&mut catalog, "RSV1001", "USER1002", "RES1001", T0)
        .unwrap();

    assert!(matches!(
        resource_service::remove_resource(&mut catalog, "RES1001"),
        Err(ServiceError::InvalidState(_))
    ));

    loan_service::return_resource(&mut catalog, "USER1001", "RES1001", T0 + DAY).unwrap();
    resource_service::remove_resource(&mut catalog, "RES1001").unwrap();
    assert_eq!(
        catalog.find_reservation("RSV1001").unwrap().status(),
        ReservationStatus::Canceled
    );
}

#[test]
fn test_staff_workflow() {
    let mut catalog = setup_library();
    assert!(user_service::is_staff(&catalog, seed::DEFAULT_ADMIN_ID));
    assert!(!user_service::is_staff(&catalog, "USER1002"));

    user_service::set_role(&mut catalog, seed::DEFAULT_ADMIN_ID, "USER1002", UserRole::Employee)
        .unwrap();
    assert!(user_service::is_staff(&catalog, "USER1002"));

    notification_service::send_notification(
        &mut catalog,
        "NOTIF1001",
        "USER1001",
        "Welcome aboard",
        T0,
    )
    .unwrap();
    assert_eq!(notification_service::unread_count(&catalog, "USER1001"), 1);
    notification_service::mark_notification_read(&mut catalog, "USER1001", "NOTIF1001").unwrap();
    assert_eq!(notification_service::unread_count(&catalog, "USER1001"), 0);
}
