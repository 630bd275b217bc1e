//! Loans and the loan policy
//!
//! A loan is `Active` until it is marked returned, after which it is frozen.
//! Whether an active loan is overdue is derived from the clock on every read
//! and never stored. Renewal and due-date defaults come from an explicit
//! [`LoanPolicy`] handed in by the caller.

use serde::{Deserialize, Serialize};

use super::{TransitionOutcome, decode_record, now};
use crate::domain::validation::{SECONDS_PER_DAY, SECONDS_PER_YEAR, is_valid_identifier};
use crate::domain::{Normalized, RecordError, ValidationWarning};

pub const DEFAULT_MAX_RENEWALS: u32 = 2;
pub const MAX_RENEWALS_LIMIT: u32 = 10;
pub const DEFAULT_LOAN_PERIOD_DAYS: i64 = 14;
pub const MAX_LOAN_PERIOD_DAYS: i64 = 365;

/// Catalog-wide lending rules, persisted in the `config` block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanPolicy {
    max_renewals: u32,
    loan_period_secs: i64,
}

impl Default for LoanPolicy {
    fn default() -> Self {
        Self {
            max_renewals: DEFAULT_MAX_RENEWALS,
            loan_period_secs: DEFAULT_LOAN_PERIOD_DAYS * SECONDS_PER_DAY,
        }
    }
}

impl LoanPolicy {
    pub fn max_renewals(&self) -> u32 {
        self.max_renewals
    }

    pub fn loan_period_secs(&self) -> i64 {
        self.loan_period_secs
    }

    pub fn loan_period_days(&self) -> i64 {
        self.loan_period_secs / SECONDS_PER_DAY
    }

    /// Negative values fall back to the default, values above 10 clamp to 10.
    pub fn set_max_renewals(&mut self, value: i64) -> Option<ValidationWarning> {
        if value < 0 {
            self.max_renewals = DEFAULT_MAX_RENEWALS;
            Some(ValidationWarning::new(
                "maxRenewals",
                format!("invalid value {}, using default {}", value, DEFAULT_MAX_RENEWALS),
            ))
        } else if value > i64::from(MAX_RENEWALS_LIMIT) {
            self.max_renewals = MAX_RENEWALS_LIMIT;
            Some(ValidationWarning::new(
                "maxRenewals",
                format!("value {} too high, using {}", value, MAX_RENEWALS_LIMIT),
            ))
        } else {
            self.max_renewals = u32::try_from(value).unwrap_or(DEFAULT_MAX_RENEWALS);
            None
        }
    }

    /// Periods under one day fall back to 14 days, periods over a year clamp to 365 days.
    pub fn set_loan_period_days(&mut self, days: i64) -> Option<ValidationWarning> {
        let (days, warning) = if days < 1 {
            (
                DEFAULT_LOAN_PERIOD_DAYS,
                Some(ValidationWarning::new(
                    "loanPeriodDays",
                    format!(
                        "invalid loan period {}, using default {}",
                        days, DEFAULT_LOAN_PERIOD_DAYS
                    ),
                )),
            )
        } else if days > MAX_LOAN_PERIOD_DAYS {
            (
                MAX_LOAN_PERIOD_DAYS,
                Some(ValidationWarning::new(
                    "loanPeriodDays",
                    format!("loan period {} too long, using {}", days, MAX_LOAN_PERIOD_DAYS),
                )),
            )
        } else {
            (days, None)
        };

        self.loan_period_secs = days
            .checked_mul(SECONDS_PER_DAY)
            .filter(|secs| *secs <= i64::from(i32::MAX))
            .unwrap_or(i64::from(i32::MAX));
        warning
    }

    pub fn with_max_renewals(mut self, value: i64) -> Self {
        self.set_max_renewals(value);
        self
    }

    pub fn with_loan_period_days(mut self, days: i64) -> Self {
        self.set_loan_period_days(days);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanState {
    Active,
    Returned,
}

/// Why a renewal was or was not granted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewalOutcome {
    Renewed { due_date: i64 },
    AlreadyReturned,
    LimitReached,
    Overdue,
    IncompleteRecord,
}

impl RenewalOutcome {
    pub fn is_renewed(&self) -> bool {
        matches!(self, RenewalOutcome::Renewed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRecord {
    pub loan_id: String,
    pub user_id: String,
    pub resource_id: String,
    pub borrow_date: i64,
    pub due_date: i64,
    pub return_date: i64,
    pub is_returned: bool,
    pub renewal_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loan {
    loan_id: String,
    user_id: String,
    resource_id: String,
    borrow_date: i64,
    due_date: i64,
    return_date: i64,
    state: LoanState,
    renewal_count: u32,
}

impl Loan {
    /// Build an active loan.
    ///
    /// Malformed identifiers become `""` and unusable dates become `0`. A due
    /// date not after the borrow date is replaced by `borrow_date + loan period`.
    pub fn new(
        loan_id: &str,
        user_id: &str,
        resource_id: &str,
        borrow_date: i64,
        due_date: i64,
        policy: &LoanPolicy,
    ) -> Normalized<Loan> {
        Self::new_at(loan_id, user_id, resource_id, borrow_date, due_date, policy, now())
    }

    pub fn new_at(
        loan_id: &str,
        user_id: &str,
        resource_id: &str,
        borrow_date: i64,
        due_date: i64,
        policy: &LoanPolicy,
        now: i64,
    ) -> Normalized<Loan> {
        let mut warnings = Vec::new();
        let mut id_or_empty = |field: &'static str, id: &str, max: usize| {
            if id.is_empty() || is_valid_identifier(id, 3, max) {
                id.to_string()
            } else {
                warnings.push(ValidationWarning::new(field, "invalid ID, using empty string"));
                String::new()
            }
        };
        let loan_id = id_or_empty("loanId", loan_id, 30);
        let user_id = id_or_empty("userId", user_id, 20);
        let resource_id = id_or_empty("resourceId", resource_id, 20);

        // Dates further than ten years out are treated as garbage.
        let latest = now.saturating_add(10 * SECONDS_PER_YEAR);
        let mut date_or_zero = |field: &'static str, date: i64| {
            if date == 0 || (0..=latest).contains(&date) {
                date
            } else {
                warnings.push(ValidationWarning::new(field, "invalid date, using 0"));
                0
            }
        };
        let borrow_date = date_or_zero("borrowDate", borrow_date);
        let mut due_date = date_or_zero("dueDate", due_date);

        if borrow_date != 0 && due_date != 0 && due_date <= borrow_date {
            due_date = borrow_date.saturating_add(policy.loan_period_secs());
            warnings.push(ValidationWarning::new(
                "dueDate",
                "due date must be after borrow date, using borrow date + loan period",
            ));
        }

        Normalized::new(
            Loan {
                loan_id,
                user_id,
                resource_id,
                borrow_date,
                due_date,
                return_date: 0,
                state: LoanState::Active,
                renewal_count: 0,
            },
            warnings,
        )
    }

    pub fn loan_id(&self) -> &str {
        &self.loan_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    pub fn borrow_date(&self) -> i64 {
        self.borrow_date
    }

    pub fn due_date(&self) -> i64 {
        self.due_date
    }

    /// `0` while the loan is active
    pub fn return_date(&self) -> i64 {
        self.return_date
    }

    pub fn renewal_count(&self) -> u32 {
        self.renewal_count
    }

    pub fn state(&self) -> LoanState {
        self.state
    }

    pub fn is_returned(&self) -> bool {
        self.state == LoanState::Returned
    }

    pub fn is_overdue(&self) -> bool {
        self.is_overdue_at(now())
    }

    pub fn is_overdue_at(&self, now: i64) -> bool {
        !self.is_returned() && now > self.due_date
    }

    fn is_complete(&self) -> bool {
        !self.loan_id.is_empty() && !self.user_id.is_empty() && !self.resource_id.is_empty()
    }

    pub fn renew(&mut self, policy: &LoanPolicy) -> RenewalOutcome {
        self.renew_at(policy, now())
    }

    /// Extend the due date by one loan period.
    ///
    /// Refused when the loan is returned, has used all renewals, is overdue or
    /// lacks an identifier; a refusal leaves the loan unchanged.
    pub fn renew_at(&mut self, policy: &LoanPolicy, now: i64) -> RenewalOutcome {
        let outcome = if self.is_returned() {
            RenewalOutcome::AlreadyReturned
        } else if self.renewal_count >= policy.max_renewals() {
            RenewalOutcome::LimitReached
        } else if now > self.due_date {
            RenewalOutcome::Overdue
        } else if !self.is_complete() {
            RenewalOutcome::IncompleteRecord
        } else {
            self.due_date = self.due_date.saturating_add(policy.loan_period_secs());
            self.renewal_count += 1;
            RenewalOutcome::Renewed {
                due_date: self.due_date,
            }
        };

        if !outcome.is_renewed() {
            tracing::warn!("Renewal of loan '{}' refused: {:?}", self.loan_id, outcome);
        }
        outcome
    }

    pub fn mark_returned(&mut self) -> TransitionOutcome {
        self.mark_returned_at(now())
    }

    /// Stamp the return date once; later calls change nothing.
    pub fn mark_returned_at(&mut self, now: i64) -> TransitionOutcome {
        if self.is_returned() {
            tracing::warn!("Loan '{}' already marked as returned", self.loan_id);
            return TransitionOutcome::AlreadyFinal;
        }
        if !self.is_complete() {
            tracing::warn!("Cannot return loan '{}' with missing information", self.loan_id);
            return TransitionOutcome::IncompleteRecord;
        }
        self.return_date = now;
        self.state = LoanState::Returned;
        TransitionOutcome::Applied
    }

    pub fn to_record(&self) -> LoanRecord {
        LoanRecord {
            loan_id: self.loan_id.clone(),
            user_id: self.user_id.clone(),
            resource_id: self.resource_id.clone(),
            borrow_date: self.borrow_date,
            due_date: self.due_date,
            return_date: self.return_date,
            is_returned: self.is_returned(),
            renewal_count: i64::from(self.renewal_count),
        }
    }

    pub fn to_document(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self.to_record())
    }

    /// Rebuild a loan, clamping the renewal count into `[0, max_renewals]`.
    pub fn from_document(
        value: &serde_json::Value,
        policy: &LoanPolicy,
    ) -> Result<Normalized<Loan>, RecordError> {
        let record: LoanRecord = decode_record("loan", value)?;
        let Normalized {
            value: mut loan,
            mut warnings,
        } = Loan::new(
            &record.loan_id,
            &record.user_id,
            &record.resource_id,
            record.borrow_date,
            record.due_date,
            policy,
        );

        loan.return_date = if record.return_date < 0 {
            warnings.push(ValidationWarning::new("returnDate", "negative date, using 0"));
            0
        } else {
            record.return_date
        };
        if record.is_returned {
            loan.state = LoanState::Returned;
        }

        let max = i64::from(policy.max_renewals());
        let count = if record.renewal_count < 0 {
            warnings.push(ValidationWarning::new("renewalCount", "negative count, using 0"));
            0
        } else if record.renewal_count > max {
            warnings.push(ValidationWarning::new(
                "renewalCount",
                format!("count {} exceeds maximum, using {}", record.renewal_count, max),
            ));
            max
        } else {
            record.renewal_count
        };
        loan.renewal_count = u32::try_from(count).unwrap_or(0);

        Ok(Normalized::new(loan, warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = SECONDS_PER_DAY;
    const T0: i64 = 1_760_000_000;

    fn active_loan(policy: &LoanPolicy) -> Loan {
        let due = T0 + policy.loan_period_secs();
        Loan::new_at("LOAN1001", "USER1001", "RES1001", T0, due, policy, T0).value
    }

    #[test]
    fn test_policy_defaults_and_clamping() {
        let mut policy = LoanPolicy::default();
        assert_eq!(policy.max_renewals(), 2);
        assert_eq!(policy.loan_period_days(), 14);

        assert!(policy.set_max_renewals(-3).is_some());
        assert_eq!(policy.max_renewals(), 2);
        assert!(policy.set_max_renewals(25).is_some());
        assert_eq!(policy.max_renewals(), 10);
        assert!(policy.set_max_renewals(0).is_none());
        assert_eq!(policy.max_renewals(), 0);

        assert!(policy.set_loan_period_days(0).is_some());
        assert_eq!(policy.loan_period_days(), 14);
        assert!(policy.set_loan_period_days(400).is_some());
        assert_eq!(policy.loan_period_days(), 365);
        assert_eq!(policy.loan_period_secs(), 365 * DAY);
    }

    #[test]
    fn test_due_date_is_corrected() {
        let policy = LoanPolicy::default();
        let loan = Loan::new_at("LOAN1001", "USER1001", "RES1001", T0, T0 - 1, &policy, T0);
        assert_eq!(loan.value.due_date(), T0 + 14 * DAY);
        assert_eq!(loan.warnings.len(), 1);
    }

    #[test]
    fn test_invalid_ids_become_empty() {
        let policy = LoanPolicy::default();
        let loan = Loan::new_at("L", "bad id", "RES1001", T0, T0 + DAY, &policy, T0);
        assert_eq!(loan.value.loan_id(), "");
        assert_eq!(loan.value.user_id(), "");
        assert_eq!(loan.warnings.len(), 2);
    }

    #[test]
    fn test_renew_extends_due_date() {
        let policy = LoanPolicy::default();
        let mut loan = active_loan(&policy);
        let due = loan.due_date();

        let outcome = loan.renew_at(&policy, T0 + DAY);
        assert_eq!(outcome, RenewalOutcome::Renewed { due_date: due + 14 * DAY });
        assert_eq!(loan.renewal_count(), 1);
    }

    #[test]
    fn test_renew_at_limit_changes_nothing() {
        let policy = LoanPolicy::default();
        let mut loan = active_loan(&policy);
        assert!(loan.renew_at(&policy, T0).is_renewed());
        assert!(loan.renew_at(&policy, T0).is_renewed());
        let due = loan.due_date();

        assert_eq!(loan.renew_at(&policy, T0), RenewalOutcome::LimitReached);
        assert_eq!(loan.due_date(), due);
        assert_eq!(loan.renewal_count(), 2);
    }

    #[test]
    fn test_renew_overdue_is_refused() {
        let policy = LoanPolicy::default();
        let mut loan = active_loan(&policy);
        let later = loan.due_date() + 1;
        assert!(loan.is_overdue_at(later));
        assert_eq!(loan.renew_at(&policy, later), RenewalOutcome::Overdue);
        assert_eq!(loan.renewal_count(), 0);
    }

    #[test]
    fn test_renew_incomplete_is_refused() {
        let policy = LoanPolicy::default();
        let mut loan = Loan::new_at("", "USER1001", "RES1001", T0, T0 + DAY, &policy, T0).value;
        assert_eq!(loan.renew_at(&policy, T0), RenewalOutcome::IncompleteRecord);
    }

    #[test]
    fn test_mark_returned_twice() {
        let policy = LoanPolicy::default();
        let mut loan = active_loan(&policy);
        assert_eq!(loan.mark_returned_at(T0 + DAY), TransitionOutcome::Applied);
        assert_eq!(loan.mark_returned_at(T0 + 2 * DAY), TransitionOutcome::AlreadyFinal);
        assert_eq!(loan.state(), LoanState::Returned);
        assert_eq!(loan.return_date(), T0 + DAY);
        assert!(!loan.is_overdue_at(T0 + 100 * DAY));
        assert_eq!(loan.renew_at(&policy, T0), RenewalOutcome::AlreadyReturned);
    }

    #[test]
    fn test_round_trip() {
        let policy = LoanPolicy::default();
        let mut loan = active_loan(&policy);
        loan.renew_at(&policy, T0);
        loan.mark_returned_at(T0 + 3 * DAY);

        let doc = loan.to_document().unwrap();
        assert_eq!(doc["isReturned"], true);
        let restored = Loan::from_document(&doc, &policy).unwrap();
        assert!(restored.is_clean());
        assert_eq!(restored.value, loan);
    }

    #[test]
    fn test_stored_renewal_count_is_clamped() {
        let policy = LoanPolicy::default().with_max_renewals(1);
        let mut doc = active_loan(&policy).to_document().unwrap();
        doc["renewalCount"] = serde_json::json!(7);
        let loan = Loan::from_document(&doc, &policy).unwrap();
        assert_eq!(loan.value.renewal_count(), 1);
        assert_eq!(loan.warnings.len(), 1);
    }
}
