use crate::models::money::Money;
use crate::store::Collection;
use crate::store::document::Entity;
use chrono::{DateTime, Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    HalfDay,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::HalfDay => "half-day",
        }
    }

    /// Accepts `present`/`p`, `absent`/`a`, `half-day`/`half`/`h`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "present" | "p" => Some(AttendanceStatus::Present),
            "absent" | "a" => Some(AttendanceStatus::Absent),
            "half-day" | "halfday" | "half" | "h" => Some(AttendanceStatus::HalfDay),
            _ => None,
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the operator reports for one worker on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceMark {
    pub status: AttendanceStatus,
    pub time_in: Option<NaiveTime>,
    pub time_out: Option<NaiveTime>,
}

impl AttendanceMark {
    pub fn status(status: AttendanceStatus) -> Self {
        Self {
            status,
            time_in: None,
            time_out: None,
        }
    }

    pub fn shift(time_in: NaiveTime, time_out: Option<NaiveTime>) -> Self {
        Self {
            status: AttendanceStatus::Present,
            time_in: Some(time_in),
            time_out,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    #[serde(skip)]
    pub id: String,
    pub worker_id: String,
    pub site_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub time_in: Option<NaiveTime>,
    #[serde(default)]
    pub time_out: Option<NaiveTime>,
    #[serde(default)]
    pub minutes_worked: Option<i64>,
    /// Amount accrued to the worker's pending balance for this record.
    pub wage_earned: Money,
    /// Hourly shift still waiting for its check-out time.
    #[serde(default)]
    pub incomplete: bool,
    pub created_at: DateTime<Local>,
}

impl Attendance {
    pub fn mark(&self) -> AttendanceMark {
        AttendanceMark {
            status: self.status,
            time_in: self.time_in,
            time_out: self.time_out,
        }
    }
}

impl Entity for Attendance {
    const COLLECTION: Collection = Collection::Attendance;
    const KIND: &'static str = "Attendance";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
