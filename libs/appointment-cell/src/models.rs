// libs/appointment-cell/src/models.rs
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::fmt;

use doctor_cell::models::DoctorError;
use shared_backend::BackendError;
use shared_models::auth::Role;
use shared_models::error::AppError;

use crate::services::slot::{self, SlotParseError};

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

/// An appointment as the clinic backend serves it. Read-only on this side
/// except for the completion flag, which is flipped after the backend confirms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub doc_id: Option<String>,
    /// `D_M_YYYY`, not zero padded.
    #[serde(default)]
    pub slot_date: String,
    /// `h:mm AM|PM`.
    #[serde(default)]
    pub slot_time: String,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: f64,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default)]
    pub cancelled: bool,
    #[serde(default)]
    pub cancelled_by: Option<CancelledBy>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub user_data: PatientSummary,
    #[serde(default)]
    pub doc_data: Option<DoctorSummary>,
    /// When the appointment was booked, not when it takes place.
    #[serde(default, with = "booked_on")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payu_txn_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payu_payment_id: Option<String>,
}

impl AppointmentRecord {
    /// Civil date-time of the slot, derived from the string fields on every call.
    pub fn slot_instant(&self) -> Result<NaiveDateTime, SlotParseError> {
        slot::parse_slot(&self.slot_date, &self.slot_time)
    }

    pub fn is_paid(&self) -> bool {
        matches!(self.payment_status, Some(PaymentStatus::Paid))
    }

    /// Patient self-cancellations, which the doctor's console never shows.
    pub fn is_cancelled_by_patient(&self) -> bool {
        self.cancelled && matches!(self.cancelled_by, Some(CancelledBy::User))
    }

    pub fn is_active(&self) -> bool {
        !self.cancelled && !self.is_completed
    }

    /// Contribution to earnings: the fee only once the consultation is both
    /// completed and paid.
    pub fn earned_amount(&self) -> f64 {
        if self.is_completed && self.is_paid() {
            self.amount
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatientSummary {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DoctorSummary {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub speciality: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Failed,
    #[serde(other)]
    Other,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Failed => write!(f, "failed"),
            PaymentStatus::Other => write!(f, "other"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CancelledBy {
    User,
    Doctor,
    Admin,
    #[serde(other)]
    Other,
}

// Fees occasionally arrive as strings or null from older bookings.
fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

/// The booked-on timestamp is epoch milliseconds on current records and an
/// ISO-8601 string on older ones.
mod booked_on {
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_some(&ts.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Number(n)) => n.as_i64().and_then(from_millis),
            Some(Value::String(s)) => parse_text(&s),
            _ => None,
        })
    }

    fn from_millis(millis: i64) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(millis).single()
    }

    fn parse_text(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(millis) = raw.parse::<i64>() {
            return from_millis(millis);
        }
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| Utc.from_utc_datetime(&naive))
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifyError {
    #[error("Invalid reference time: {0}")]
    InvalidReferenceTime(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found: {0}")]
    NotFound(String),

    #[error("Operation requires the {0} console")]
    WrongRole(Role),

    #[error(transparent)]
    Classification(#[from] ClassifyError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Doctor(#[from] DoctorError),
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound(_) => AppError::NotFound(err.to_string()),
            AppointmentError::WrongRole(_) => AppError::Auth(err.to_string()),
            AppointmentError::Classification(inner) => AppError::Internal(inner.to_string()),
            AppointmentError::Backend(inner) => inner.into(),
            AppointmentError::Doctor(inner) => inner.into(),
        }
    }
}
