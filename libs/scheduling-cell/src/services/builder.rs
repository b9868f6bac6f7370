// libs/scheduling-cell/src/services/builder.rs
//
// The combinatorial core: assigns one non-overlapping, service-matching slot
// per requested service for a single practitioner, either within one visit or
// across exactly two. Assignment is a greedy single pass in service order and
// never reconsiders earlier choices; exclusion sets are caller-owned values.
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::catalog::ClinicCatalog;
use crate::models::{ScheduledAppointment, Slot};
use crate::services::matcher;

pub struct ScheduleBuilder<'a> {
    catalog: &'a ClinicCatalog,
}

impl<'a> ScheduleBuilder<'a> {
    pub fn new(catalog: &'a ClinicCatalog) -> Self {
        Self { catalog }
    }

    /// Try to fit every distinct requested service into one visit on one of
    /// the candidate dates, with a single practitioner. Dates are tried in
    /// the order given; the first fully valid bundle wins.
    pub fn single_day(
        &self,
        services: &[String],
        target_dates: &[NaiveDate],
        slots_by_date: &HashMap<NaiveDate, Vec<Slot>>,
        consultation: Option<&str>,
        used_slot_ids: &HashSet<String>,
        required_practitioner: Option<&str>,
    ) -> Option<Vec<ScheduledAppointment>> {
        let ordered = ordered_services(services, consultation);

        for date in target_dates {
            let Some(available) = slots_by_date.get(date) else {
                continue;
            };
            if available.is_empty() {
                continue;
            }

            let (by_practitioner, encountered) = group_by_practitioner(available.iter());
            let candidates: Vec<&str> = match required_practitioner {
                Some(id) => vec![id],
                None => encountered,
            };

            for prac_id in candidates {
                let Some(prac_slots) = by_practitioner.get(prac_id) else {
                    continue;
                };

                let mut sorted: Vec<&Slot> = prac_slots.clone();
                sorted.sort_by_key(|s| s.start);

                let mut attempt: Vec<ScheduledAppointment> = Vec::new();
                let mut used = used_slot_ids.clone();

                if !self.assign_greedily(&ordered, &sorted, &mut used, &mut attempt) {
                    continue;
                }

                // Time order is authoritative: a requested consultation must
                // land chronologically last, never be reordered into place.
                attempt.sort_by_key(|a| a.start_time);
                if !consultation_is_last(&attempt, consultation) {
                    continue;
                }

                return Some(attempt);
            }
        }

        None
    }

    /// Split the services across exactly the first two candidate dates, both
    /// served by one practitioner. A requested consultation always closes the
    /// second visit.
    pub fn two_day(
        &self,
        services: &[String],
        target_dates: &[NaiveDate],
        slots_by_date: &HashMap<NaiveDate, Vec<Slot>>,
        consultation: Option<&str>,
        used_slot_ids: &HashSet<String>,
        required_practitioner: Option<&str>,
    ) -> Option<Vec<ScheduledAppointment>> {
        if target_dates.len() < 2 {
            return None;
        }
        let (day1, day2) = (target_dates[0], target_dates[1]);
        let ordered = ordered_services(services, consultation);

        let pooled = slots_by_date
            .get(&day1)
            .into_iter()
            .flatten()
            .chain(slots_by_date.get(&day2).into_iter().flatten());
        let (by_practitioner, encountered) = group_by_practitioner(pooled);

        let candidates: Vec<&str> = match required_practitioner {
            Some(id) => vec![id],
            None => encountered,
        };

        for prac_id in candidates {
            let Some(prac_slots) = by_practitioner.get(prac_id) else {
                continue;
            };

            let mut day1_slots: Vec<&Slot> = prac_slots
                .iter()
                .copied()
                .filter(|s| s.start_date() == Some(day1))
                .collect();
            let mut day2_slots: Vec<&Slot> = prac_slots
                .iter()
                .copied()
                .filter(|s| s.start_date() == Some(day2))
                .collect();
            day1_slots.sort_by_key(|s| s.start);
            day2_slots.sort_by_key(|s| s.start);

            if day1_slots.is_empty() || day2_slots.is_empty() {
                continue;
            }

            let (day1_services, day2_services) = split_services(&ordered, consultation);

            let mut attempt: Vec<ScheduledAppointment> = Vec::new();
            let mut used = used_slot_ids.clone();

            // Day-1 commitments carry into day 2 through the shared set.
            if !self.assign_greedily(&day1_services, &day1_slots, &mut used, &mut attempt) {
                continue;
            }
            if !self.assign_greedily(&day2_services, &day2_slots, &mut used, &mut attempt) {
                continue;
            }

            // Guard against both halves collapsing onto one date.
            if attempt.len() != ordered.len() || matcher::count_unique_days(&attempt) != 2 {
                continue;
            }

            attempt.sort_by(|a, b| a.date.cmp(&b.date).then(a.start_time.cmp(&b.start_time)));
            if !consultation_is_last(&attempt, consultation) {
                continue;
            }

            return Some(attempt);
        }

        None
    }

    /// One pass over the service list: commit the first free, matching,
    /// non-overlapping slot for each service, or fail the whole attempt.
    fn assign_greedily(
        &self,
        services: &[String],
        sorted_slots: &[&Slot],
        used: &mut HashSet<String>,
        committed: &mut Vec<ScheduledAppointment>,
    ) -> bool {
        for service_name in services {
            let mut assigned = false;

            for slot in sorted_slots {
                if used.contains(&slot.id) {
                    continue;
                }
                if !matcher::service_matches_slot(self.catalog, service_name, slot) {
                    continue;
                }
                if committed.iter().any(|existing| matcher::slots_overlap(slot, &existing.slot)) {
                    continue;
                }
                let Some(appointment) = self.make_appointment(service_name, slot) else {
                    continue;
                };

                used.insert(slot.id.clone());
                committed.push(appointment);
                assigned = true;
                break;
            }

            if !assigned {
                debug!("No slot satisfies {}", service_name);
                return false;
            }
        }

        true
    }

    fn make_appointment(&self, service_name: &str, slot: &Slot) -> Option<ScheduledAppointment> {
        let start = slot.start?;
        let end = slot.end?;

        Some(ScheduledAppointment {
            service_name: service_name.to_string(),
            date: start.date_naive(),
            start_time: start.time(),
            end_time: end.time(),
            coverage: self.catalog.coverage(service_name),
            practitioner_name: slot.practitioner_name.clone(),
            slot: slot.clone(),
        })
    }
}

/// Dedupe the requested services preserving input order, then move the
/// consultation (if requested) to the end of the ordering.
fn ordered_services(services: &[String], consultation: Option<&str>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for service in services {
        if !unique.contains(service) {
            unique.push(service.clone());
        }
    }

    if let Some(consult) = consultation {
        if unique.iter().any(|s| s == consult) {
            unique.retain(|s| s != consult);
            unique.push(consult.to_string());
        }
    }

    unique
}

/// Split a consultation-last service ordering across two visits: the
/// consultation is held out and appended to day 2, the rest is halved with
/// the ceiling going to day 1.
fn split_services(ordered: &[String], consultation: Option<&str>) -> (Vec<String>, Vec<String>) {
    if let Some(consult) = consultation {
        if ordered.iter().any(|s| s == consult) {
            let non_consult: Vec<String> = ordered
                .iter()
                .filter(|s| s.as_str() != consult)
                .cloned()
                .collect();
            let mid = non_consult.len().div_ceil(2);
            let day1 = non_consult[..mid].to_vec();
            let mut day2 = non_consult[mid..].to_vec();
            day2.push(consult.to_string());
            return (day1, day2);
        }
    }

    let mid = ordered.len().div_ceil(2);
    (ordered[..mid].to_vec(), ordered[mid..].to_vec())
}

fn consultation_is_last(appointments: &[ScheduledAppointment], consultation: Option<&str>) -> bool {
    let Some(consult) = consultation else {
        return true;
    };
    match appointments.iter().position(|a| a.service_name == consult) {
        None => true,
        Some(idx) => idx == appointments.len() - 1,
    }
}

/// Group slots by owning practitioner, remembering first-encounter order so
/// candidate iteration stays deterministic.
fn group_by_practitioner<'s>(
    slots: impl Iterator<Item = &'s Slot>,
) -> (HashMap<&'s str, Vec<&'s Slot>>, Vec<&'s str>) {
    let mut by_practitioner: HashMap<&str, Vec<&Slot>> = HashMap::new();
    let mut encountered: Vec<&str> = Vec::new();

    for slot in slots {
        let prac_id = slot.practitioner_id.as_str();
        if !by_practitioner.contains_key(prac_id) {
            encountered.push(prac_id);
        }
        by_practitioner.entry(prac_id).or_default().push(slot);
    }

    (by_practitioner, encountered)
}
