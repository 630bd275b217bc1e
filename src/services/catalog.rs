//! Catalog store
//!
//! Ordered in-memory collections of every entity plus the loan policy that
//! governs them. Entities reference each other by string id; lookups are
//! linear scans.

use crate::models::{LibraryEvent, Loan, LoanPolicy, Notification, Reservation, Resource, User};

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub policy: LoanPolicy,
    pub users: Vec<User>,
    pub resources: Vec<Resource>,
    pub loans: Vec<Loan>,
    pub reservations: Vec<Reservation>,
    pub notifications: Vec<Notification>,
    pub events: Vec<LibraryEvent>,
}

impl Catalog {
    pub fn new(policy: LoanPolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
            && self.resources.is_empty()
            && self.loans.is_empty()
            && self.reservations.is_empty()
            && self.notifications.is_empty()
            && self.events.is_empty()
    }

    pub fn find_user(&self, user_id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.user_id() == user_id)
    }

    pub fn find_user_mut(&mut self, user_id: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.user_id() == user_id)
    }

    pub fn find_resource(&self, resource_id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.resource_id() == resource_id)
    }

    pub fn find_resource_mut(&mut self, resource_id: &str) -> Option<&mut Resource> {
        self.resources.iter_mut().find(|r| r.resource_id() == resource_id)
    }

    pub fn find_loan(&self, loan_id: &str) -> Option<&Loan> {
        self.loans.iter().find(|l| l.loan_id() == loan_id)
    }

    /// The unreturned loan of `resource_id` held by `user_id`, if any
    pub fn find_active_loan(&self, user_id: &str, resource_id: &str) -> Option<&Loan> {
        self.loans
            .iter()
            .find(|l| !l.is_returned() && l.user_id() == user_id && l.resource_id() == resource_id)
    }

    pub fn find_active_loan_mut(&mut self, user_id: &str, resource_id: &str) -> Option<&mut Loan> {
        self.loans
            .iter_mut()
            .find(|l| !l.is_returned() && l.user_id() == user_id && l.resource_id() == resource_id)
    }

    pub fn has_active_loan_on(&self, resource_id: &str) -> bool {
        self.loans
            .iter()
            .any(|l| !l.is_returned() && l.resource_id() == resource_id)
    }

    pub fn find_reservation(&self, reservation_id: &str) -> Option<&Reservation> {
        self.reservations
            .iter()
            .find(|r| r.reservation_id() == reservation_id)
    }

    pub fn find_reservation_mut(&mut self, reservation_id: &str) -> Option<&mut Reservation> {
        self.reservations
            .iter_mut()
            .find(|r| r.reservation_id() == reservation_id)
    }

    pub fn find_notification(&self, notification_id: &str) -> Option<&Notification> {
        self.notifications
            .iter()
            .find(|n| n.notification_id() == notification_id)
    }

    pub fn find_notification_mut(&mut self, notification_id: &str) -> Option<&mut Notification> {
        self.notifications
            .iter_mut()
            .find(|n| n.notification_id() == notification_id)
    }

    pub fn find_event(&self, event_id: &str) -> Option<&LibraryEvent> {
        self.events.iter().find(|e| e.event_id() == event_id)
    }

    /// True when any entity of any kind already uses `id`
    pub fn is_id_taken(&self, id: &str) -> bool {
        self.find_user(id).is_some()
            || self.find_resource(id).is_some()
            || self.find_loan(id).is_some()
            || self.find_reservation(id).is_some()
            || self.find_notification(id).is_some()
            || self.find_event(id).is_some()
    }

    /// "3 users, 5 resources, ..." for log lines
    pub fn summary(&self) -> String {
        format!(
            "{} users, {} resources, {} loans, {} reservations, {} notifications, {} events",
            self.users.len(),
            self.resources.len(),
            self.loans.len(),
            self.reservations.len(),
            self.notifications.len(),
            self.events.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Book, BookInput, UserRole};

    fn setup_catalog() -> Catalog {
        let mut catalog = Catalog::default();
        catalog.users.push(
            User::new("USER1001", "Ada Lovelace", "ada@example.com", UserRole::Student).value,
        );
        catalog.resources.push(
            Book::new(BookInput {
                title: "Dune".into(),
                author: "Frank Herbert".into(),
                resource_id: "RES1001".into(),
                number_of_pages: 412,
                ..Default::default()
            })
            .value
            .into(),
        );
        catalog
    }

    #[test]
    fn test_lookups() {
        let catalog = setup_catalog();
        assert!(catalog.find_user("USER1001").is_some());
        assert!(catalog.find_user("USER9999").is_none());
        assert_eq!(catalog.find_resource("RES1001").map(|r| r.title()), Some("Dune"));
        assert!(catalog.is_id_taken("RES1001"));
        assert!(!catalog.is_id_taken("LOAN1001"));
    }
}
