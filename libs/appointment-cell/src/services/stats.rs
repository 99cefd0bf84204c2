// libs/appointment-cell/src/services/stats.rs
use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, warn};

use doctor_cell::models::DoctorRecord;

use crate::models::{AppointmentRecord, ClassifyError};
use crate::services::classifier::{classify, ScheduledAppointment, ViewRole};
use crate::services::status::{label_status, payment_label, status_for, StatusBadge};

pub const DEFAULT_RECENT_LIMIT: usize = 5;
const NEXT_UP_LIMIT: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppointmentTotals {
    pub total: usize,
    pub upcoming: usize,
    pub past: usize,
    pub cancelled: usize,
    pub completed: usize,
    pub unparseable: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecialityCount {
    pub speciality: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentAppointment {
    #[serde(flatten)]
    pub record: AppointmentRecord,
    pub status: StatusBadge,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub totals: AppointmentTotals,
    pub earnings: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_doctors: Option<usize>,
    pub speciality_distribution: Vec<SpecialityCount>,
    pub recent: Vec<RecentAppointment>,
}

pub fn compute_stats(
    records: &[AppointmentRecord],
    doctors: Option<&[DoctorRecord]>,
    now: NaiveDateTime,
) -> Result<DashboardStats, ClassifyError> {
    compute_stats_with_limit(records, doctors, now, DEFAULT_RECENT_LIMIT)
}

/// Admin dashboard aggregates. Counts reuse the classifier's partition, so a
/// record is upcoming, past or cancelled here exactly when it is in the list
/// view.
pub fn compute_stats_with_limit(
    records: &[AppointmentRecord],
    doctors: Option<&[DoctorRecord]>,
    now: NaiveDateTime,
    recent_limit: usize,
) -> Result<DashboardStats, ClassifyError> {
    let classified = classify(records, now, ViewRole::Admin)?;

    let totals = AppointmentTotals {
        total: records.len(),
        upcoming: classified.upcoming_count(),
        past: classified.past.len(),
        cancelled: classified.cancelled.len(),
        completed: records.iter().filter(|r| !r.cancelled && r.is_completed).count(),
        unparseable: classified.unparseable.len(),
    };

    let stats = DashboardStats {
        earnings: total_earnings(records),
        total_doctors: doctors.map(<[DoctorRecord]>::len),
        speciality_distribution: doctors.map(speciality_distribution).unwrap_or_default(),
        recent: recent_appointments(records, now, recent_limit),
        totals,
    };

    debug!(
        "Dashboard stats: {} appointments, earnings {}",
        stats.totals.total, stats.earnings
    );

    Ok(stats)
}

pub fn total_earnings(records: &[AppointmentRecord]) -> f64 {
    records.iter().map(AppointmentRecord::earned_amount).sum()
}

/// Doctor count per speciality, largest first, ties by name.
pub fn speciality_distribution(doctors: &[DoctorRecord]) -> Vec<SpecialityCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for doctor in doctors {
        let speciality = doctor.speciality.trim();
        if !speciality.is_empty() {
            *counts.entry(speciality).or_default() += 1;
        }
    }

    let mut distribution: Vec<SpecialityCount> = counts
        .into_iter()
        .map(|(speciality, count)| SpecialityCount {
            speciality: speciality.to_string(),
            count,
        })
        .collect();
    distribution.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.speciality.cmp(&b.speciality)));
    distribution
}

/// Most recently booked first; records without a booking date go last.
/// Records with an unreadable slot have no status and are skipped.
pub fn recent_appointments(
    records: &[AppointmentRecord],
    now: NaiveDateTime,
    limit: usize,
) -> Vec<RecentAppointment> {
    let mut ordered: Vec<&AppointmentRecord> = records.iter().collect();
    ordered.sort_by(|a, b| match (a.date, b.date) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    ordered
        .into_iter()
        .filter_map(|record| match record.slot_instant().and_then(|_| label_status(record, now)) {
            Ok(status) => Some(RecentAppointment {
                record: record.clone(),
                status,
            }),
            Err(e) => {
                warn!("Leaving appointment {} out of recent: {}", record.id, e);
                None
            }
        })
        .take(limit)
        .collect()
}

// ==============================================================================
// DOCTOR OVERVIEW
// ==============================================================================

#[derive(Debug, Clone, Default, Serialize)]
pub struct DoctorOverview {
    pub total: usize,
    pub completed: usize,
    pub earnings: f64,
    pub today: Vec<ScheduledAppointment>,
    pub next_up: Vec<ScheduledAppointment>,
    /// Active appointments on later days, before trimming to `next_up`.
    pub later_count: usize,
}

/// Summary for the doctor's own dashboard. Patient self-cancellations and
/// records with unreadable slots are left out of every figure.
pub fn doctor_overview(records: &[AppointmentRecord], now: NaiveDateTime) -> DoctorOverview {
    let today = now.date();
    let mut overview = DoctorOverview::default();
    let mut later = Vec::new();

    for record in records.iter().filter(|r| !r.is_cancelled_by_patient()) {
        let slot = match record.slot_instant() {
            Ok(slot) => slot,
            Err(e) => {
                warn!("Skipping appointment {} in doctor overview: {}", record.id, e);
                continue;
            }
        };

        overview.total += 1;
        if record.is_completed {
            overview.completed += 1;
        }
        overview.earnings += record.earned_amount();

        if !record.is_active() || slot.date() < today {
            continue;
        }

        let scheduled = ScheduledAppointment {
            payment: payment_label(record.payment_status.as_ref()),
            status: status_for(record.payment_status.as_ref(), false, false, slot, now),
            record: record.clone(),
            slot,
        };
        if slot.date() == today {
            overview.today.push(scheduled);
        } else {
            later.push(scheduled);
        }
    }

    overview.today.sort_by_key(|a| a.slot);
    later.sort_by_key(|a| a.slot);
    overview.later_count = later.len();
    later.truncate(NEXT_UP_LIMIT);
    overview.next_up = later;

    overview
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::status::StatusLabel;
    use chrono::NaiveDate;
    use serde_json::Value;
    use shared_utils::test_utils::{AppointmentFixture, MockBackendResponses};

    fn record(value: Value) -> AppointmentRecord {
        serde_json::from_value(value).unwrap()
    }

    fn doctor(value: Value) -> DoctorRecord {
        serde_json::from_value(value).unwrap()
    }

    fn new_year() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    fn ids<'a>(list: impl IntoIterator<Item = &'a ScheduledAppointment>) -> Vec<&'a str> {
        list.into_iter().map(|a| a.record.id.as_str()).collect()
    }

    #[test]
    fn three_record_scenario_totals() {
        let records = vec![
            record(AppointmentFixture::new("A", "1_1_2025", "9:00 AM").build()),
            record(AppointmentFixture::new("B", "1_1_2025", "10:00 AM").cancelled_by("user").build()),
            record(AppointmentFixture::new("C", "1_1_2024", "9:00 AM").completed().paid().amount(500.0).build()),
        ];

        let stats = compute_stats(&records, None, new_year()).unwrap();
        assert_eq!(
            stats.totals,
            AppointmentTotals {
                total: 3,
                upcoming: 1,
                past: 1,
                cancelled: 1,
                completed: 1,
                unparseable: 0,
            }
        );
        assert_eq!(stats.earnings, 500.0);

        let overview = doctor_overview(&records, new_year());
        assert_eq!(overview.total, 2);
        assert_eq!(overview.earnings, 500.0);
        assert_eq!(ids(&overview.today), vec!["A"]);
    }

    #[test]
    fn unpaid_past_visit_scenario_totals() {
        let records = vec![
            record(AppointmentFixture::new("A", "1_1_2025", "10:00 AM").completed().paid().build()),
            record(AppointmentFixture::new("B", "1_1_2025", "11:00 AM").cancelled_by("user").build()),
            record(AppointmentFixture::new("C", "31_12_2024", "9:00 AM").build()),
        ];

        let stats = compute_stats(&records, None, new_year()).unwrap();
        assert_eq!(
            stats.totals,
            AppointmentTotals {
                total: 3,
                upcoming: 1,
                past: 1,
                cancelled: 1,
                completed: 1,
                unparseable: 0,
            }
        );
        assert_eq!(stats.earnings, 500.0);
        assert_eq!(stats.total_doctors, None);
        assert!(stats.speciality_distribution.is_empty());
    }

    #[test]
    fn earnings_only_count_completed_and_paid() {
        let records = vec![
            record(AppointmentFixture::new("paid-done", "1_1_2024", "9:00 AM").completed().paid().amount(300.0).build()),
            record(AppointmentFixture::new("paid-open", "1_1_2024", "9:00 AM").paid().amount(1000.0).build()),
            record(AppointmentFixture::new("done-unpaid", "1_1_2024", "9:00 AM").completed().amount(1000.0).build()),
            record(AppointmentFixture::new("done-failed", "1_1_2024", "9:00 AM").completed().payment("failed").build()),
            record(AppointmentFixture::new("bad-slot", "??", "9:00 AM").completed().paid().amount(200.0).build()),
        ];

        assert_eq!(total_earnings(&records), 500.0);
    }

    #[test]
    fn speciality_distribution_orders_by_count_then_name() {
        let roster = vec![
            doctor(MockBackendResponses::doctor_response("d1", "Dr. A", "Neurologist", true)),
            doctor(MockBackendResponses::doctor_response("d2", "Dr. B", "Dermatologist", true)),
            doctor(MockBackendResponses::doctor_response("d3", "Dr. C", "Pediatricians", false)),
            doctor(MockBackendResponses::doctor_response("d4", "Dr. D", "Pediatricians", true)),
        ];

        let stats = compute_stats(&[], Some(roster.as_slice()), new_year()).unwrap();
        assert_eq!(stats.total_doctors, Some(4));
        let names: Vec<(&str, usize)> = stats
            .speciality_distribution
            .iter()
            .map(|s| (s.speciality.as_str(), s.count))
            .collect();
        assert_eq!(
            names,
            vec![("Pediatricians", 2), ("Dermatologist", 1), ("Neurologist", 1)]
        );
    }

    #[test]
    fn recent_is_newest_booking_first_with_undated_last() {
        let mut undated = AppointmentFixture::new("undated", "2_1_2025", "9:00 AM").build();
        undated["date"] = Value::Null;

        let records = vec![
            record(undated),
            record(AppointmentFixture::new("old", "2_1_2025", "9:00 AM").booked_at_millis(1_600_000_000_000).build()),
            record(AppointmentFixture::new("new", "2_1_2025", "9:00 AM").booked_at_millis(1_730_000_000_000).build()),
            record(AppointmentFixture::new("mid", "2_1_2025", "9:00 AM").booked_at_millis(1_700_000_000_000).build()),
        ];

        let recent = recent_appointments(&records, new_year(), 5);
        let order: Vec<&str> = recent.iter().map(|r| r.record.id.as_str()).collect();
        assert_eq!(order, vec!["new", "mid", "old", "undated"]);

        assert_eq!(recent_appointments(&records, new_year(), 2).len(), 2);
    }

    #[test]
    fn recent_entries_are_labelled() {
        let records = vec![
            record(AppointmentFixture::new("gone", "2_1_2025", "9:00 AM").cancelled_by("user").build()),
            record(AppointmentFixture::new("done", "1_6_2024", "9:00 AM").completed().build()),
        ];

        let recent = recent_appointments(&records, new_year(), 5);
        assert_eq!(recent[0].status.label, StatusLabel::Cancelled);
        assert_eq!(recent[1].status.label, StatusLabel::Completed);
    }

    #[test]
    fn recent_skips_unreadable_slots() {
        let records = vec![
            record(AppointmentFixture::new("bad", "not_a_date", "9:00 AM").booked_at_millis(1_730_000_000_000).build()),
            record(AppointmentFixture::new("ok-1", "2_1_2025", "9:00 AM").booked_at_millis(1_700_000_000_000).build()),
            record(AppointmentFixture::new("ok-2", "3_1_2025", "9:00 AM").booked_at_millis(1_600_000_000_000).build()),
        ];

        let only_bad = recent_appointments(&records[..1], new_year(), 5);
        assert!(only_bad.is_empty());

        let cancelled_bad = record(AppointmentFixture::new("gone-bad", "??", "9:00 AM").cancelled_by("admin").build());
        assert!(recent_appointments(&[cancelled_bad], new_year(), 5).is_empty());

        let recent = recent_appointments(&records, new_year(), 2);
        let order: Vec<&str> = recent.iter().map(|r| r.record.id.as_str()).collect();
        assert_eq!(order, vec!["ok-1", "ok-2"]);
    }

    #[test]
    fn doctor_overview_groups_today_and_next_up() {
        let records = vec![
            record(AppointmentFixture::new("today-late", "1_1_2025", "5:00 PM").build()),
            record(AppointmentFixture::new("today-early", "1_1_2025", "9:00 AM").paid().build()),
            record(AppointmentFixture::new("today-done", "1_1_2025", "8:00 AM").completed().paid().amount(400.0).build()),
            record(AppointmentFixture::new("patient-cancel", "1_1_2025", "10:00 AM").cancelled_by("user").build()),
            record(AppointmentFixture::new("doctor-cancel", "2_1_2025", "10:00 AM").cancelled_by("doctor").build()),
            record(AppointmentFixture::new("d4", "4_1_2025", "9:00 AM").build()),
            record(AppointmentFixture::new("d2", "2_1_2025", "9:00 AM").build()),
            record(AppointmentFixture::new("d3", "3_1_2025", "9:00 AM").build()),
            record(AppointmentFixture::new("d5", "5_1_2025", "9:00 AM").build()),
            record(AppointmentFixture::new("yesterday", "31_12_2024", "9:00 AM").build()),
            record(AppointmentFixture::new("broken", "31_02_2025", "9:00 AM").build()),
        ];

        let overview = doctor_overview(&records, new_year());
        assert_eq!(overview.total, 9);
        assert_eq!(overview.completed, 1);
        assert_eq!(overview.earnings, 400.0);
        assert_eq!(ids(&overview.today), vec!["today-early", "today-late"]);
        assert_eq!(ids(&overview.next_up), vec!["d2", "d3", "d4"]);
        assert_eq!(overview.later_count, 4);
    }

    #[test]
    fn doctor_overview_of_nothing() {
        let overview = doctor_overview(&[], new_year());
        assert_eq!(overview.total, 0);
        assert_eq!(overview.earnings, 0.0);
        assert!(overview.today.is_empty());
        assert!(overview.next_up.is_empty());
    }
}
