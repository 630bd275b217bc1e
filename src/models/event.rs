use std::fmt;

use serde::{Deserialize, Serialize};

use super::{decode_record, format_timestamp, now};
use crate::domain::validation::{SECONDS_PER_DAY, SECONDS_PER_YEAR, check_identifier, check_text};
use crate::domain::{RecordError, ValidationError};

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 1000;
pub const MAX_LOCATION_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub event_id: String,
    pub title: String,
    pub description: String,
    pub event_date: i64,
    pub location: String,
}

/// A library event announced by staff. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEvent {
    event_id: String,
    title: String,
    description: String,
    event_date: i64,
    location: String,
}

impl LibraryEvent {
    pub fn new(
        event_id: &str,
        title: &str,
        description: &str,
        event_date: i64,
        location: &str,
    ) -> Result<LibraryEvent, ValidationError> {
        Self::new_at(event_id, title, description, event_date, location, now())
    }

    /// The event date must fall between yesterday and one year from `now`.
    pub fn new_at(
        event_id: &str,
        title: &str,
        description: &str,
        event_date: i64,
        location: &str,
        now: i64,
    ) -> Result<LibraryEvent, ValidationError> {
        let event = Self::build(event_id, title, description, event_date, location, now)?;
        if event_date < now.saturating_sub(SECONDS_PER_DAY) {
            return Err(ValidationError::DateInPast("eventDate"));
        }
        Ok(event)
    }

    // Everything except the lower date bound, which stored events outgrow.
    fn build(
        event_id: &str,
        title: &str,
        description: &str,
        event_date: i64,
        location: &str,
        now: i64,
    ) -> Result<LibraryEvent, ValidationError> {
        check_identifier("eventId", event_id, 30)?;
        check_text("title", title, MAX_TITLE_LEN)?;
        check_text("description", description, MAX_DESCRIPTION_LEN)?;
        check_text("location", location, MAX_LOCATION_LEN)?;
        if event_date <= 0 {
            return Err(ValidationError::InvalidDate("eventDate"));
        }
        if event_date > now.saturating_add(SECONDS_PER_YEAR) {
            return Err(ValidationError::DateTooFar("eventDate"));
        }

        Ok(LibraryEvent {
            event_id: event_id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            event_date,
            location: location.to_string(),
        })
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn event_date(&self) -> i64 {
        self.event_date
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn is_upcoming_at(&self, now: i64) -> bool {
        self.event_date >= now
    }

    pub fn to_record(&self) -> EventRecord {
        EventRecord {
            event_id: self.event_id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            event_date: self.event_date,
            location: self.location.clone(),
        }
    }

    pub fn to_document(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self.to_record())
    }

    pub fn from_document(value: &serde_json::Value) -> Result<LibraryEvent, RecordError> {
        let record: EventRecord = decode_record("event", value)?;
        Ok(Self::build(
            &record.event_id,
            &record.title,
            &record.description,
            record.event_date,
            &record.location,
            now(),
        )?)
    }
}

impl fmt::Display for LibraryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Event: {} ({})", self.title, self.event_id)?;
        writeln!(f, "When:  {}", format_timestamp(self.event_date))?;
        writeln!(f, "Where: {}", self.location)?;
        write!(f, "{}", self.description)
    }
}
