use crate::models::money::Money;
use crate::store::Collection;
use crate::store::document::Entity;
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentKind {
    #[default]
    Wage,
    /// Paid ahead of payroll; deducted from the month's net pay.
    Advance,
}

impl PaymentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentKind::Wage => "wage",
            PaymentKind::Advance => "advance",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "wage" | "w" => Some(PaymentKind::Wage),
            "advance" | "a" => Some(PaymentKind::Advance),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record of money handed to a worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(skip)]
    pub id: String,
    pub worker_id: String,
    pub site_id: String,
    pub amount: Money,
    pub date: NaiveDate,
    pub method: String,
    #[serde(default)]
    pub kind: PaymentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Local>,
}

impl Entity for Payment {
    const COLLECTION: Collection = Collection::Payments;
    const KIND: &'static str = "Payment";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Operator input for a payment before it is checked against the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    pub amount: Money,
    pub date: NaiveDate,
    pub method: String,
    pub kind: PaymentKind,
    pub notes: Option<String>,
}

impl PaymentRequest {
    pub fn new(amount: Money, date: NaiveDate) -> Self {
        Self {
            amount,
            date,
            method: "cash".to_string(),
            kind: PaymentKind::Wage,
            notes: None,
        }
    }
}
