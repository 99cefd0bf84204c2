// libs/appointment-cell/src/services/classifier.rs
use std::collections::BTreeMap;

use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, warn};

use shared_models::auth::Role;

use crate::models::{AppointmentRecord, ClassifyError};
use crate::services::status::{payment_label, status_for, StatusBadge};

pub const DEFAULT_HORIZON_DAYS: u32 = 7;

/// Which console the list is rendered for. The doctor console hides
/// appointments the patient cancelled themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewRole {
    Admin,
    Doctor,
}

impl From<Role> for ViewRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => ViewRole::Admin,
            Role::Doctor => ViewRole::Doctor,
        }
    }
}

/// A record together with its parsed slot and display status.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduledAppointment {
    #[serde(flatten)]
    pub record: AppointmentRecord,
    pub slot: NaiveDateTime,
    pub status: StatusBadge,
    pub payment: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub label: String,
    pub appointments: Vec<ScheduledAppointment>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ClassifiedAppointments {
    pub upcoming_by_day: Vec<DayBucket>,
    pub upcoming_future: Vec<ScheduledAppointment>,
    pub past: Vec<ScheduledAppointment>,
    pub cancelled: Vec<ScheduledAppointment>,
    /// Ids of records whose slot could not be parsed.
    pub unparseable: Vec<String>,
}

impl ClassifiedAppointments {
    pub fn upcoming(&self) -> impl Iterator<Item = &ScheduledAppointment> {
        self.upcoming_by_day
            .iter()
            .flat_map(|bucket| bucket.appointments.iter())
            .chain(self.upcoming_future.iter())
    }

    pub fn upcoming_count(&self) -> usize {
        self.upcoming_by_day
            .iter()
            .map(|bucket| bucket.appointments.len())
            .sum::<usize>()
            + self.upcoming_future.len()
    }

    /// Records placed in some bucket.
    pub fn placed_count(&self) -> usize {
        self.upcoming_count() + self.past.len() + self.cancelled.len()
    }

    pub fn find(&self, appointment_id: &str) -> Option<&ScheduledAppointment> {
        self.upcoming()
            .chain(self.past.iter())
            .chain(self.cancelled.iter())
            .find(|scheduled| scheduled.record.id == appointment_id)
    }
}

pub fn classify(
    records: &[AppointmentRecord],
    now: NaiveDateTime,
    role: ViewRole,
) -> Result<ClassifiedAppointments, ClassifyError> {
    classify_with_horizon(records, now, role, DEFAULT_HORIZON_DAYS)
}

/// Partition records into day buckets, later upcoming, past and cancelled.
///
/// Cancellation is checked before time. Past means the slot instant is
/// strictly before `now`; upcoming slots whose civil date falls within
/// `horizon_days` of today (today inclusive) get a day bucket.
pub fn classify_with_horizon(
    records: &[AppointmentRecord],
    now: NaiveDateTime,
    role: ViewRole,
    horizon_days: u32,
) -> Result<ClassifiedAppointments, ClassifyError> {
    let today = now.date();
    let horizon_end = today
        .checked_add_days(Days::new(u64::from(horizon_days)))
        .ok_or_else(|| {
            ClassifyError::InvalidReferenceTime(format!(
                "{} days after {} is out of range",
                horizon_days, today
            ))
        })?;

    let mut classified = ClassifiedAppointments::default();
    let mut by_day: BTreeMap<NaiveDate, Vec<ScheduledAppointment>> = BTreeMap::new();

    for record in records {
        if role == ViewRole::Doctor && record.is_cancelled_by_patient() {
            continue;
        }

        let slot = match record.slot_instant() {
            Ok(slot) => slot,
            Err(e) => {
                warn!("Skipping appointment {}: {}", record.id, e);
                classified.unparseable.push(record.id.clone());
                continue;
            }
        };

        let scheduled = ScheduledAppointment {
            payment: payment_label(record.payment_status.as_ref()),
            status: status_for(
                record.payment_status.as_ref(),
                record.cancelled,
                record.is_completed,
                slot,
                now,
            ),
            record: record.clone(),
            slot,
        };

        if record.cancelled {
            classified.cancelled.push(scheduled);
        } else if slot < now {
            classified.past.push(scheduled);
        } else if slot.date() < horizon_end {
            by_day.entry(slot.date()).or_default().push(scheduled);
        } else {
            classified.upcoming_future.push(scheduled);
        }
    }

    classified.upcoming_by_day = by_day
        .into_iter()
        .map(|(date, mut appointments)| {
            appointments.sort_by_key(|a| a.slot);
            DayBucket {
                label: day_label(date, today),
                date,
                appointments,
            }
        })
        .collect();
    classified.upcoming_future.sort_by_key(|a| a.slot);
    classified.past.sort_by(|a, b| b.slot.cmp(&a.slot));
    classified.cancelled.sort_by(|a, b| b.slot.cmp(&a.slot));

    debug!(
        "Classified {} appointments: {} upcoming, {} past, {} cancelled, {} unparseable",
        records.len(),
        classified.upcoming_count(),
        classified.past.len(),
        classified.cancelled.len(),
        classified.unparseable.len()
    );

    Ok(classified)
}

/// Heading shown above a day bucket.
pub fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        2..=6 => date.format("%A, %B %-d").to_string(),
        _ => date.format("%B %-d, %Y").to_string(),
    }
}
