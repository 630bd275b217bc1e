pub mod article;
pub mod book;
pub mod event;
pub mod loan;
pub mod notification;
pub mod reservation;
pub mod resource;
pub mod thesis;
pub mod user;

pub use article::{Article, ArticleInput};
pub use book::{Book, BookInput};
pub use event::LibraryEvent;
pub use loan::{Loan, LoanPolicy, LoanState, RenewalOutcome};
pub use notification::Notification;
pub use reservation::{Reservation, ReservationStatus};
pub use resource::{Resource, ResourceInfo, ResourceKind};
pub use thesis::{Thesis, ThesisInput, ThesisType};
pub use user::{User, UserRole};

use serde::de::DeserializeOwned;

use crate::domain::RecordError;

/// Result of asking an entity to leave its current state. A refused
/// transition is a normal outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Applied,
    /// The entity is already in a terminal state
    AlreadyFinal,
    /// One of the identifying fields is empty
    IncompleteRecord,
}

impl TransitionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, TransitionOutcome::Applied)
    }
}

/// Current time as epoch seconds
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Human-readable UTC rendering of an epoch timestamp (`0` renders as "-")
pub fn format_timestamp(ts: i64) -> String {
    if ts == 0 {
        return "-".to_string();
    }
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// Decode a stored record into its serde shape, mapping any shape error to `MalformedRecord`
pub(crate) fn decode_record<T: DeserializeOwned>(
    entity: &'static str,
    value: &serde_json::Value,
) -> Result<T, RecordError> {
    if !value.is_object() {
        return Err(RecordError::malformed(entity, "expected an object"));
    }
    serde_json::from_value(value.clone()).map_err(|e| RecordError::malformed(entity, e))
}
