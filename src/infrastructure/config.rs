use std::env;
use std::path::PathBuf;

use crate::models::LoanPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub profile: String,
    pub data_file: PathBuf,
    /// Seeds the policy of a catalog that has no file yet
    pub max_renewals: Option<i64>,
    pub loan_period_days: Option<i64>,
    pub seed_demo: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key/value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let profile = lookup("PROFILE").unwrap_or_else(|| "default".to_string());

        let data_file = lookup("LIBRARY_DATA_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                if profile == "default" {
                    PathBuf::from("library_data.json")
                } else {
                    PathBuf::from(format!("library_data_{}.json", profile))
                }
            });

        Self {
            data_file,
            max_renewals: lookup("MAX_RENEWALS").and_then(|v| v.trim().parse().ok()),
            loan_period_days: lookup("LOAN_PERIOD_DAYS").and_then(|v| v.trim().parse().ok()),
            seed_demo: lookup("SEED_DEMO")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(false),
            profile,
        }
    }

    /// Initial loan policy, clamped like any other policy input
    pub fn loan_policy(&self) -> LoanPolicy {
        let mut policy = LoanPolicy::default();
        if let Some(max) = self.max_renewals {
            policy.set_max_renewals(max);
        }
        if let Some(days) = self.loan_period_days {
            policy.set_loan_period_days(days);
        }
        policy
    }
}
