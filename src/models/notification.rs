use std::fmt;

use serde::{Deserialize, Serialize};

use super::{decode_record, format_timestamp, now};
use crate::domain::validation::{SECONDS_PER_DAY, check_identifier, check_text, is_not_after};
use crate::domain::{RecordError, ValidationError};

pub const MAX_MESSAGE_LEN: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    pub notification_id: String,
    pub user_id: String,
    pub message: String,
    pub sent_date: i64,
    pub read_flag: bool,
}

/// A message from staff to one user. Every field is checked strictly and the
/// read flag only ever goes from unread to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    notification_id: String,
    user_id: String,
    message: String,
    sent_date: i64,
    read: bool,
}

impl Notification {
    pub fn new(
        notification_id: &str,
        user_id: &str,
        message: &str,
        sent_date: i64,
    ) -> Result<Notification, ValidationError> {
        Self::new_at(notification_id, user_id, message, sent_date, now())
    }

    /// The sent date may be at most one day ahead of `now`.
    pub fn new_at(
        notification_id: &str,
        user_id: &str,
        message: &str,
        sent_date: i64,
        now: i64,
    ) -> Result<Notification, ValidationError> {
        check_identifier("notificationId", notification_id, 50)?;
        check_identifier("userId", user_id, 30)?;
        check_text("message", message, MAX_MESSAGE_LEN)?;
        if sent_date < 0 {
            return Err(ValidationError::InvalidDate("sentDate"));
        }
        if !is_not_after(sent_date, now, SECONDS_PER_DAY) {
            return Err(ValidationError::DateInFuture("sentDate"));
        }

        Ok(Notification {
            notification_id: notification_id.to_string(),
            user_id: user_id.to_string(),
            message: message.to_string(),
            sent_date,
            read: false,
        })
    }

    pub fn notification_id(&self) -> &str {
        &self.notification_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn sent_date(&self) -> i64 {
        self.sent_date
    }

    pub fn is_read(&self) -> bool {
        self.read
    }

    pub fn mark_read(&mut self) {
        self.read = true;
    }

    pub fn to_record(&self) -> NotificationRecord {
        NotificationRecord {
            notification_id: self.notification_id.clone(),
            user_id: self.user_id.clone(),
            message: self.message.clone(),
            sent_date: self.sent_date,
            read_flag: self.read,
        }
    }

    pub fn to_document(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self.to_record())
    }

    pub fn from_document(value: &serde_json::Value) -> Result<Notification, RecordError> {
        let record: NotificationRecord = decode_record("notification", value)?;
        let mut notification = Notification::new(
            &record.notification_id,
            &record.user_id,
            &record.message,
            record.sent_date,
        )?;
        notification.read = record.read_flag;
        Ok(notification)
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}: {}",
            self.notification_id,
            if self.read { " " } else { "*" },
            format_timestamp(self.sent_date),
            self.message
        )
    }
}
