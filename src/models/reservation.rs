use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{TransitionOutcome, decode_record, now};
use crate::domain::validation::{SECONDS_PER_YEAR, is_valid_identifier, is_within_window};
use crate::domain::{Normalized, RecordError, ValidationWarning};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReservationStatus {
    #[default]
    Pending,
    Fulfilled,
    Canceled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Fulfilled => "Fulfilled",
            Self::Canceled => "Canceled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Fulfilled" => Ok(Self::Fulfilled),
            "Canceled" | "Cancelled" => Ok(Self::Canceled),
            other => Err(format!("unknown reservation status '{}'", other)),
        }
    }
}

/// Stored shape; status is kept as a raw string so an unknown value can be
/// normalized instead of failing the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRecord {
    pub reservation_id: String,
    pub user_id: String,
    pub resource_id: String,
    pub reservation_date: i64,
    pub fulfillment_date: i64,
    pub status: String,
}

/// A hold on an unavailable resource. `Pending` is the only state that can
/// transition; `Fulfilled` and `Canceled` are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    reservation_id: String,
    user_id: String,
    resource_id: String,
    reservation_date: i64,
    fulfillment_date: i64,
    status: ReservationStatus,
}

impl Reservation {
    pub fn new(
        reservation_id: &str,
        user_id: &str,
        resource_id: &str,
        reservation_date: i64,
    ) -> Normalized<Reservation> {
        Self::new_at(reservation_id, user_id, resource_id, reservation_date, now())
    }

    /// A reservation date of 0, or one more than a year away from `now`, is
    /// replaced by `now`.
    pub fn new_at(
        reservation_id: &str,
        user_id: &str,
        resource_id: &str,
        reservation_date: i64,
        now: i64,
    ) -> Normalized<Reservation> {
        let Normalized {
            value: mut reservation,
            mut warnings,
        } = Self::with_ids(reservation_id, user_id, resource_id);

        reservation.reservation_date = if reservation_date == 0 {
            now
        } else if is_within_window(reservation_date, now, SECONDS_PER_YEAR, SECONDS_PER_YEAR) {
            reservation_date
        } else {
            warnings.push(ValidationWarning::new(
                "reservationDate",
                "date outside one year of now, using current time",
            ));
            now
        };

        Normalized::new(reservation, warnings)
    }

    // Pending reservation with normalized ids and no dates set
    fn with_ids(reservation_id: &str, user_id: &str, resource_id: &str) -> Normalized<Reservation> {
        let mut warnings = Vec::new();
        let mut id_or_empty = |field: &'static str, id: &str, max: usize| {
            if id.is_empty() || is_valid_identifier(id, 3, max) {
                id.to_string()
            } else {
                warnings.push(ValidationWarning::new(field, "invalid ID, using empty string"));
                String::new()
            }
        };
        let reservation_id = id_or_empty("reservationId", reservation_id, 30);
        let user_id = id_or_empty("userId", user_id, 20);
        let resource_id = id_or_empty("resourceId", resource_id, 20);

        Normalized::new(
            Reservation {
                reservation_id,
                user_id,
                resource_id,
                reservation_date: 0,
                fulfillment_date: 0,
                status: ReservationStatus::Pending,
            },
            warnings,
        )
    }

    pub fn reservation_id(&self) -> &str {
        &self.reservation_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    pub fn reservation_date(&self) -> i64 {
        self.reservation_date
    }

    pub fn fulfillment_date(&self) -> i64 {
        self.fulfillment_date
    }

    pub fn status(&self) -> ReservationStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status == ReservationStatus::Pending
    }

    fn check_transition(&self, action: &str) -> Option<TransitionOutcome> {
        if self.reservation_id.is_empty()
            || self.user_id.is_empty()
            || self.resource_id.is_empty()
        {
            tracing::warn!("Cannot {} reservation with missing information", action);
            return Some(TransitionOutcome::IncompleteRecord);
        }
        if !self.is_pending() {
            tracing::warn!(
                "Cannot {} reservation '{}': status is {}",
                action,
                self.reservation_id,
                self.status
            );
            return Some(TransitionOutcome::AlreadyFinal);
        }
        None
    }

    pub fn cancel(&mut self) -> TransitionOutcome {
        if let Some(refused) = self.check_transition("cancel") {
            return refused;
        }
        self.status = ReservationStatus::Canceled;
        TransitionOutcome::Applied
    }

    pub fn fulfill(&mut self) -> TransitionOutcome {
        self.fulfill_at(now())
    }

    pub fn fulfill_at(&mut self, now: i64) -> TransitionOutcome {
        if let Some(refused) = self.check_transition("fulfill") {
            return refused;
        }
        self.status = ReservationStatus::Fulfilled;
        self.fulfillment_date = now;
        TransitionOutcome::Applied
    }

    pub fn to_record(&self) -> ReservationRecord {
        ReservationRecord {
            reservation_id: self.reservation_id.clone(),
            user_id: self.user_id.clone(),
            resource_id: self.resource_id.clone(),
            reservation_date: self.reservation_date,
            fulfillment_date: self.fulfillment_date,
            status: self.status.as_str().to_string(),
        }
    }

    pub fn to_document(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self.to_record())
    }

    /// Rebuild a stored reservation. Ids are re-normalized; dates are kept as
    /// stored since old reservations legitimately fall outside the creation window.
    pub fn from_document(
        value: &serde_json::Value,
    ) -> Result<Normalized<Reservation>, RecordError> {
        let record: ReservationRecord = decode_record("reservation", value)?;
        let Normalized {
            value: mut reservation,
            mut warnings,
        } = Reservation::with_ids(&record.reservation_id, &record.user_id, &record.resource_id);

        reservation.reservation_date = if record.reservation_date < 0 {
            warnings.push(ValidationWarning::new("reservationDate", "negative date, using 0"));
            0
        } else {
            record.reservation_date
        };

        reservation.status = record.status.parse().unwrap_or_else(|_| {
            warnings.push(ValidationWarning::new(
                "status",
                format!("unknown status '{}', using Pending", record.status),
            ));
            ReservationStatus::Pending
        });
        reservation.fulfillment_date = if record.fulfillment_date < 0 {
            warnings.push(ValidationWarning::new("fulfillmentDate", "negative date, using 0"));
            0
        } else {
            record.fulfillment_date
        };

        Ok(Normalized::new(reservation, warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const T0: i64 = 1_760_000_000;

    fn pending() -> Reservation {
        Reservation::new_at("RSV1001", "USER1001", "RES1001", T0, T0).value
    }

    #[test]
    fn test_zero_date_becomes_now() {
        let reservation = Reservation::new_at("RSV1001", "USER1001", "RES1001", 0, T0);
        assert!(reservation.is_clean());
        assert_eq!(reservation.value.reservation_date(), T0);

        let two_years_ago = T0 - 2 * SECONDS_PER_YEAR;
        let stale = Reservation::new_at("RSV1001", "USER1001", "RES1001", two_years_ago, T0);
        assert_eq!(stale.value.reservation_date(), T0);
        assert_eq!(stale.warnings.len(), 1);
    }

    #[test]
    fn test_fulfill_after_cancel_fails() {
        let mut reservation = pending();
        assert_eq!(reservation.cancel(), TransitionOutcome::Applied);
        assert_eq!(reservation.fulfill_at(T0 + 10), TransitionOutcome::AlreadyFinal);
        assert_eq!(reservation.status(), ReservationStatus::Canceled);
        assert_eq!(reservation.fulfillment_date(), 0);
    }

    #[test]
    fn test_fulfill_stamps_date() {
        let mut reservation = pending();
        assert!(reservation.fulfill_at(T0 + 60).is_applied());
        assert_eq!(reservation.fulfillment_date(), T0 + 60);
        assert_eq!(reservation.cancel(), TransitionOutcome::AlreadyFinal);
    }

    #[test]
    fn test_incomplete_reservation_cannot_transition() {
        let mut reservation = Reservation::new_at("RSV1001", "", "RES1001", T0, T0).value;
        assert_eq!(reservation.cancel(), TransitionOutcome::IncompleteRecord);
        assert!(reservation.is_pending());
    }

    #[test]
    fn test_round_trip() {
        let mut reservation = pending();
        reservation.fulfill_at(T0 + 5);
        let doc = reservation.to_document().unwrap();
        assert_eq!(doc["status"], "Fulfilled");

        let restored = Reservation::from_document(&doc).unwrap();
        assert!(restored.is_clean());
        assert_eq!(restored.value, reservation);
    }

    #[test]
    fn test_old_fulfilled_reservation_keeps_its_dates() {
        let placed = T0 - 2 * SECONDS_PER_YEAR;
        let mut reservation =
            Reservation::new_at("RSV1001", "USER1001", "RES1001", placed, placed).value;
        reservation.fulfill_at(placed + 10);

        let doc = reservation.to_document().unwrap();
        let restored = Reservation::from_document(&doc).unwrap().value;
        assert_eq!(restored, reservation);
        assert_eq!(restored.reservation_date(), placed);
        assert!(restored.reservation_date() <= restored.fulfillment_date());
    }

    #[test]
    fn test_negative_stored_date_becomes_zero() {
        let doc = json!({
            "reservationId": "RSV1001",
            "userId": "USER1001",
            "resourceId": "RES1001",
            "reservationDate": -7,
            "fulfillmentDate": 0,
            "status": "Pending"
        });
        let loaded = Reservation::from_document(&doc).unwrap();
        assert_eq!(loaded.value.reservation_date(), 0);
        assert_eq!(loaded.warnings.len(), 1);
    }

    #[test]
    fn test_unknown_status_becomes_pending() {
        let doc = json!({
            "reservationId": "RSV1001",
            "userId": "USER1001",
            "resourceId": "RES1001",
            "reservationDate": 0,
            "fulfillmentDate": -4,
            "status": "Lost"
        });
        let loaded = Reservation::from_document(&doc).unwrap();
        assert!(loaded.value.is_pending());
        assert_eq!(loaded.value.fulfillment_date(), 0);
        assert_eq!(loaded.warnings.len(), 2);
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let doc = json!({ "reservationId": "RSV1001" });
        assert!(matches!(
            Reservation::from_document(&doc),
            Err(RecordError::MalformedRecord { entity: "reservation", .. })
        ));
    }
}
