use crate::errors::{AppError, AppResult};
use crate::models::money::Money;
use crate::store::Collection;
use crate::store::document::Entity;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WageType {
    Daily,
    Hourly,
    /// Legacy policy: a fixed salary pro-rated across the days of the month.
    Monthly,
}

impl WageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WageType::Daily => "daily",
            WageType::Hourly => "hourly",
            WageType::Monthly => "monthly",
        }
    }

    /// Helper: convert input code from CLI (lowercase or uppercase, long or short)
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "daily" | "d" => Some(WageType::Daily),
            "hourly" | "h" => Some(WageType::Hourly),
            "monthly" | "m" => Some(WageType::Monthly),
            _ => None,
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            WageType::Daily => "day",
            WageType::Hourly => "hour",
            WageType::Monthly => "month",
        }
    }
}

impl fmt::Display for WageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `(wage_type, wage_amount)` pair that turns attendance into money.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WagePolicy {
    pub wage_type: WageType,
    pub wage_amount: Money,
}

impl WagePolicy {
    pub fn new(wage_type: WageType, wage_amount: Money) -> Self {
        Self {
            wage_type,
            wage_amount,
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if !self.wage_amount.is_positive() {
            return Err(AppError::Validation(format!(
                "Wage amount must be greater than 0 (got {})",
                self.wage_amount
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    #[serde(skip)]
    pub id: String,
    pub site_id: String,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    pub wage_type: WageType,
    pub wage_amount: Money,
    #[serde(default)]
    pub pending_amount: Money,
    #[serde(default)]
    pub paid_amount: Money,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Local>,
}

fn default_active() -> bool {
    true
}

impl Worker {
    /// New workers always start with an empty ledger.
    pub fn new(site_id: &str, name: &str, phone: &str, policy: WagePolicy) -> Self {
        Self {
            id: String::new(),
            site_id: site_id.to_string(),
            name: name.trim().to_string(),
            phone: phone.trim().to_string(),
            wage_type: policy.wage_type,
            wage_amount: policy.wage_amount,
            pending_amount: Money::ZERO,
            paid_amount: Money::ZERO,
            is_active: true,
            created_at: Local::now(),
        }
    }

    pub fn policy(&self) -> WagePolicy {
        WagePolicy::new(self.wage_type, self.wage_amount)
    }

    pub fn balance(&self) -> Balance {
        Balance {
            pending: self.pending_amount,
            paid: self.paid_amount,
        }
    }

    pub fn set_balance(&mut self, balance: Balance) {
        self.pending_amount = balance.pending;
        self.paid_amount = balance.paid;
    }
}

impl Entity for Worker {
    const COLLECTION: Collection = Collection::Workers;
    const KIND: &'static str = "Worker";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// The two ledger figures of a worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Balance {
    pub pending: Money,
    pub paid: Money,
}

impl Balance {
    pub fn new(pending: Money, paid: Money) -> Self {
        Self { pending, paid }
    }

    pub fn check(&self) -> AppResult<()> {
        if self.pending.is_negative() {
            return Err(AppError::Validation(format!(
                "Pending amount cannot be negative ({})",
                self.pending
            )));
        }
        if self.paid.is_negative() {
            return Err(AppError::Validation(format!(
                "Paid amount cannot be negative ({})",
                self.paid
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wage_type_codes() {
        assert_eq!(WageType::from_code("Daily"), Some(WageType::Daily));
        assert_eq!(WageType::from_code("h"), Some(WageType::Hourly));
        assert_eq!(WageType::from_code("MONTHLY"), Some(WageType::Monthly));
        assert_eq!(WageType::from_code("weekly"), None);
    }

    #[test]
    fn policy_requires_positive_rate() {
        assert!(WagePolicy::new(WageType::Daily, Money::ZERO).validate().is_err());
        assert!(
            WagePolicy::new(WageType::Daily, Money::from_units(800))
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn worker_serializes_camel_case_without_id() {
        let mut w = Worker::new(
            "site-1",
            " Ravi ",
            "",
            WagePolicy::new(WageType::Daily, Money::from_units(800)),
        );
        w.id = "w-1".into();
        let v = serde_json::to_value(&w).unwrap();
        assert_eq!(v["siteId"], "site-1");
        assert_eq!(v["wageType"], "daily");
        assert_eq!(v["wageAmount"], 80000);
        assert_eq!(v["pendingAmount"], 0);
        assert_eq!(v["name"], "Ravi");
        assert!(v.get("id").is_none());
    }
}
