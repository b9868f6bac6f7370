// libs/scheduling-cell/src/services/generator.rs
//
// Drives the builder repeatedly to enumerate distinct schedule options:
// several single-day bundles per practitioner via exclusion sets, then
// two-day bundles over nearby date pairs, deduplicated by slot combination
// and globally ranked.
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::catalog::ClinicCatalog;
use crate::models::{ScheduleError, ScheduleOption, ScheduledAppointment, Slot, VisitPacing};
use crate::services::builder::ScheduleBuilder;
use crate::services::matcher;

/// Enumeration caps. Defaults mirror the clinic's production tuning; all of
/// them are per-practitioner except the implicit global ordering.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorLimits {
    /// Exclusion-set retries per practitioner per date in the single-day pass.
    pub retries_per_date: usize,
    /// Single-day options kept per practitioner.
    pub single_day_cap: usize,
    /// Two-day options kept per practitioner.
    pub two_day_cap: usize,
    /// How many later dates each date is paired with in the two-day pass.
    pub date_pair_lookahead: usize,
}

impl Default for GeneratorLimits {
    fn default() -> Self {
        Self {
            retries_per_date: 5,
            single_day_cap: 2,
            two_day_cap: 4,
            date_pair_lookahead: 5,
        }
    }
}

pub struct OptionGenerator<'a> {
    catalog: &'a ClinicCatalog,
    limits: GeneratorLimits,
}

impl<'a> OptionGenerator<'a> {
    pub fn new(catalog: &'a ClinicCatalog) -> Self {
        Self::with_limits(catalog, GeneratorLimits::default())
    }

    pub fn with_limits(catalog: &'a ClinicCatalog, limits: GeneratorLimits) -> Self {
        Self { catalog, limits }
    }

    /// Enumerate ranked schedule options from the given slot inventory.
    /// Deterministic for a given inventory; re-running the same search yields
    /// the same options (or the same error) every time.
    pub fn generate(
        &self,
        specialty: &str,
        services: &[String],
        preferred_practitioner: Option<&str>,
        slots: Vec<Slot>,
    ) -> Result<Vec<ScheduleOption>, ScheduleError> {
        if services.is_empty() {
            return Err(ScheduleError::Validation(
                "At least one service must be requested".to_string(),
            ));
        }
        if self.catalog.specialty(specialty).is_none() {
            return Err(ScheduleError::UnknownSpecialty(specialty.to_string()));
        }

        let free: Vec<Slot> = slots.into_iter().filter(Slot::is_free).collect();

        let pool: Vec<Slot> = match preferred_practitioner {
            Some(prac_id) => free
                .iter()
                .filter(|s| s.practitioner_id == prac_id)
                .cloned()
                .collect(),
            None => free.clone(),
        };

        if pool.is_empty() {
            // Distinguish "nothing offered at all" from "the preference
            // filter removed everything".
            if preferred_practitioner.is_some() && !free.is_empty() {
                return Err(ScheduleError::PractitionerFullyBooked);
            }
            return Err(ScheduleError::NoSlotsInRange);
        }

        let consultation = self.catalog.consultation_service(specialty);
        let builder = ScheduleBuilder::new(self.catalog);

        let practitioner_ids: Vec<String> = match preferred_practitioner {
            Some(id) => vec![id.to_string()],
            None => {
                let mut seen: Vec<String> = Vec::new();
                for slot in &pool {
                    if !seen.contains(&slot.practitioner_id) {
                        seen.push(slot.practitioner_id.clone());
                    }
                }
                seen
            }
        };

        let mut distinct_services: Vec<&str> = Vec::new();
        for service in services {
            if !distinct_services.contains(&service.as_str()) {
                distinct_services.push(service);
            }
        }

        let mut options: Vec<ScheduleOption> = Vec::new();
        let mut used_combinations: HashSet<String> = HashSet::new();

        // Pass 1: single-day bundles, up to `single_day_cap` per practitioner,
        // forced apart by excluding already-used slots on each retry.
        for prac_id in &practitioner_ids {
            let prac_slots: Vec<Slot> = pool
                .iter()
                .filter(|s| &s.practitioner_id == prac_id)
                .cloned()
                .collect();
            let by_date = group_by_date(&prac_slots);
            let mut dates: Vec<NaiveDate> = by_date.keys().copied().collect();
            dates.sort();

            let mut found = 0usize;
            for date in dates {
                if found >= self.limits.single_day_cap {
                    break;
                }

                let mut avoid: HashSet<String> = HashSet::new();
                for attempt in 0..self.limits.retries_per_date {
                    let Some(schedule) = builder.single_day(
                        services,
                        &[date],
                        &by_date,
                        consultation,
                        &avoid,
                        Some(prac_id),
                    ) else {
                        if attempt == 0 {
                            debug!("No single-day bundle for {} on {}", prac_id, date);
                        }
                        break;
                    };

                    if !matcher::all_same_practitioner(&schedule) {
                        continue;
                    }

                    let key = combination_key(&schedule);
                    if used_combinations.insert(key) {
                        for apt in &schedule {
                            avoid.insert(apt.slot.id.clone());
                        }
                        options.push(self.option_from(schedule, 1));
                        found += 1;
                    } else {
                        debug!("Skipping duplicate single-day combination for {}", prac_id);
                    }
                }
            }
        }

        // Pass 2: two-day bundles, only worthwhile when there is more than one
        // service to split and more than one date to split across.
        let all_dates: HashSet<NaiveDate> =
            pool.iter().filter_map(Slot::start_date).collect();
        if distinct_services.len() >= 2 && all_dates.len() >= 2 {
            for prac_id in &practitioner_ids {
                let prac_slots: Vec<Slot> = pool
                    .iter()
                    .filter(|s| &s.practitioner_id == prac_id)
                    .cloned()
                    .collect();
                let by_date = group_by_date(&prac_slots);
                let mut dates: Vec<NaiveDate> = by_date.keys().copied().collect();
                dates.sort();
                if dates.len() < 2 {
                    continue;
                }

                let mut found = 0usize;
                'pairs: for i in 0..dates.len() {
                    let upper = (i + 1 + self.limits.date_pair_lookahead).min(dates.len());
                    for j in (i + 1)..upper {
                        if found >= self.limits.two_day_cap {
                            break 'pairs;
                        }

                        let Some(schedule) = builder.two_day(
                            services,
                            &[dates[i], dates[j]],
                            &by_date,
                            consultation,
                            &HashSet::new(),
                            Some(prac_id),
                        ) else {
                            continue;
                        };

                        if !matcher::all_same_practitioner(&schedule) {
                            continue;
                        }

                        let key = combination_key(&schedule);
                        if used_combinations.insert(key) {
                            options.push(self.option_from(schedule, 2));
                            found += 1;
                        } else {
                            debug!("Skipping duplicate two-day combination for {}", prac_id);
                        }
                    }
                }
            }
        }

        if options.is_empty() {
            let hint = if all_dates.len() == 1 {
                "all slots fall on a single date and cannot cover every requested service"
                    .to_string()
            } else {
                "no combination of available slots covers every requested service".to_string()
            };
            return Err(ScheduleError::NoFeasibleBundle { hint });
        }

        // Global rank: fewer visit days first, earlier start date second, then
        // renumber for display.
        options.sort_by(|a, b| {
            a.total_days
                .cmp(&b.total_days)
                .then(a.first_date().cmp(&b.first_date()))
        });
        for (idx, option) in options.iter_mut().enumerate() {
            option.id = idx + 1;
        }

        Ok(options)
    }

    fn option_from(&self, appointments: Vec<ScheduledAppointment>, total_days: u8) -> ScheduleOption {
        let pacing = if matcher::has_acceptable_gaps(&appointments, 0) {
            VisitPacing::BackToBack
        } else if matcher::has_acceptable_gaps(&appointments, 15) {
            VisitPacing::SmallGaps
        } else {
            VisitPacing::Gapped
        };

        ScheduleOption {
            id: 0,
            appointments,
            total_days,
            pacing,
        }
    }
}

/// Stable identity of a slot combination: sorted slot ids, comma-joined.
fn combination_key(appointments: &[ScheduledAppointment]) -> String {
    let mut ids: Vec<&str> = appointments.iter().map(|a| a.slot.id.as_str()).collect();
    ids.sort_unstable();
    ids.join(",")
}

fn group_by_date(slots: &[Slot]) -> HashMap<NaiveDate, Vec<Slot>> {
    let mut by_date: HashMap<NaiveDate, Vec<Slot>> = HashMap::new();
    for slot in slots {
        if let Some(date) = slot.start_date() {
            by_date.entry(date).or_default().push(slot.clone());
        }
    }
    by_date
}
