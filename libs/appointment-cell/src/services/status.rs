// libs/appointment-cell/src/services/status.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{AppointmentRecord, PaymentStatus};
use crate::services::slot::SlotParseError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StatusLabel {
    Cancelled,
    Completed,
    #[serde(rename = "Missed (Unpaid)")]
    MissedUnpaid,
    Upcoming,
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusLabel::Cancelled => write!(f, "Cancelled"),
            StatusLabel::Completed => write!(f, "Completed"),
            StatusLabel::MissedUnpaid => write!(f, "Missed (Unpaid)"),
            StatusLabel::Upcoming => write!(f, "Upcoming"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Danger,
    Info,
    Success,
    Muted,
    Warning,
}

impl Severity {
    /// Badge classes used by the console stylesheet.
    pub fn css_class(&self) -> &'static str {
        match self {
            Severity::Danger => "bg-red-100 text-red-800",
            Severity::Info => "bg-blue-100 text-blue-800",
            Severity::Success => "bg-green-100 text-green-800",
            Severity::Muted => "bg-gray-100 text-gray-800",
            Severity::Warning => "bg-yellow-100 text-yellow-800",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub label: StatusLabel,
    pub severity: Severity,
    pub severity_class: &'static str,
}

impl StatusBadge {
    pub fn new(label: StatusLabel, severity: Severity) -> Self {
        Self {
            label,
            severity,
            severity_class: severity.css_class(),
        }
    }
}

/// Display status for an appointment whose slot instant is already known.
///
/// Label precedence: cancelled, then completed, then (slot in the past) paid
/// → completed / otherwise missed, else upcoming. The badge colour follows
/// the payment state before falling back to past/upcoming.
pub fn status_for(
    payment_status: Option<&PaymentStatus>,
    cancelled: bool,
    is_completed: bool,
    instant: NaiveDateTime,
    now: NaiveDateTime,
) -> StatusBadge {
    let paid = matches!(payment_status, Some(PaymentStatus::Paid));
    let is_past = instant < now;

    let label = if cancelled {
        StatusLabel::Cancelled
    } else if is_completed {
        StatusLabel::Completed
    } else if is_past {
        if paid {
            StatusLabel::Completed
        } else {
            StatusLabel::MissedUnpaid
        }
    } else {
        StatusLabel::Upcoming
    };

    let severity = if cancelled {
        Severity::Danger
    } else if is_completed {
        Severity::Info
    } else {
        match payment_status {
            Some(PaymentStatus::Failed) => Severity::Danger,
            Some(PaymentStatus::Paid) => Severity::Success,
            _ if is_past => Severity::Muted,
            _ => Severity::Warning,
        }
    };

    StatusBadge::new(label, severity)
}

/// Status badge for a record. Cancelled and completed records never need the
/// slot instant; everything else fails only if the slot cannot be parsed.
pub fn label_status(record: &AppointmentRecord, now: NaiveDateTime) -> Result<StatusBadge, SlotParseError> {
    if record.cancelled {
        return Ok(StatusBadge::new(StatusLabel::Cancelled, Severity::Danger));
    }
    if record.is_completed {
        return Ok(StatusBadge::new(StatusLabel::Completed, Severity::Info));
    }

    let instant = record.slot_instant()?;
    Ok(status_for(
        record.payment_status.as_ref(),
        record.cancelled,
        record.is_completed,
        instant,
        now,
    ))
}

pub fn payment_label(payment_status: Option<&PaymentStatus>) -> &'static str {
    match payment_status {
        Some(PaymentStatus::Paid) => "Paid",
        Some(PaymentStatus::Failed) => "Failed",
        _ => "Pending",
    }
}
