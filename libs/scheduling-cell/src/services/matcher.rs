// libs/scheduling-cell/src/services/matcher.rs
//
// Pure slot classification helpers consumed by the builder and generator.
use chrono::{NaiveDate, NaiveTime};
use std::collections::{HashMap, HashSet};

use crate::catalog::ClinicCatalog;
use crate::models::{ScheduledAppointment, Slot};

/// True iff the slot's service-code tag is in the service's declared code set.
/// Slots with no code never match.
pub fn service_matches_slot(catalog: &ClinicCatalog, service_name: &str, slot: &Slot) -> bool {
    let Some(code) = slot.service_code.as_deref() else {
        return false;
    };
    catalog
        .service(service_name)
        .is_some_and(|svc| svc.codes.iter().any(|c| c == code))
}

/// Half-open interval overlap on the full timestamps. Slots missing a start
/// or end never overlap.
pub fn slots_overlap(a: &Slot, b: &Slot) -> bool {
    match (a.start, a.end, b.start, b.end) {
        (Some(start_a), Some(end_a), Some(start_b), Some(end_b)) => {
            start_a < end_b && start_b < end_a
        }
        _ => false,
    }
}

/// Minutes between two clock times. Negative when the times are out of
/// order; callers must pre-sort.
pub fn gap_minutes(earlier_end: NaiveTime, later_start: NaiveTime) -> i64 {
    (later_start - earlier_end).num_minutes()
}

/// Whether every idle gap between consecutive same-day appointments stays
/// within `max_gap_minutes`.
pub fn has_acceptable_gaps(appointments: &[ScheduledAppointment], max_gap_minutes: i64) -> bool {
    if appointments.len() <= 1 {
        return true;
    }

    let mut by_date: HashMap<NaiveDate, Vec<&ScheduledAppointment>> = HashMap::new();
    for apt in appointments {
        by_date.entry(apt.date).or_default().push(apt);
    }

    for day in by_date.values_mut() {
        if day.len() <= 1 {
            continue;
        }
        day.sort_by_key(|a| a.start_time);
        for pair in day.windows(2) {
            if gap_minutes(pair[0].end_time, pair[1].start_time) > max_gap_minutes {
                return false;
            }
        }
    }

    true
}

pub fn all_same_practitioner(appointments: &[ScheduledAppointment]) -> bool {
    match appointments.first() {
        None => true,
        Some(first) => appointments
            .iter()
            .all(|a| a.slot.practitioner_id == first.slot.practitioner_id),
    }
}

pub fn count_unique_days(appointments: &[ScheduledAppointment]) -> usize {
    appointments
        .iter()
        .map(|a| a.date)
        .collect::<HashSet<_>>()
        .len()
}
