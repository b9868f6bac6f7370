// libs/scheduling-cell/tests/generator_test.rs
//
// Option enumeration: dedup by slot combination, per-practitioner caps,
// global ranking, pacing labels, and the infeasibility error taxonomy.

use assert_matches::assert_matches;
use chrono::{DateTime, FixedOffset};
use std::collections::HashSet;

use scheduling_cell::catalog::ClinicCatalog;
use scheduling_cell::models::{ScheduleError, Slot, SlotStatus, VisitPacing};
use scheduling_cell::services::generator::{GeneratorLimits, OptionGenerator};

// ==============================================================================
// TEST FIXTURES AND UTILITIES
// ==============================================================================

fn dt(date: &str, time: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(&format!("{}T{}:00+00:00", date, time)).unwrap()
}

fn slot(id: &str, date: &str, start: &str, end: &str, code: &str, prac: &str) -> Slot {
    Slot {
        id: id.to_string(),
        start: Some(dt(date, start)),
        end: Some(dt(date, end)),
        status: SlotStatus::Free,
        service_code: Some(code.to_string()),
        practitioner_id: prac.to_string(),
        practitioner_name: "Dr. Sarah Johnson".to_string(),
    }
}

fn names(services: &[&str]) -> Vec<String> {
    services.iter().map(|s| s.to_string()).collect()
}

fn combination_key(option: &scheduling_cell::models::ScheduleOption) -> String {
    let mut ids: Vec<&str> = option
        .appointments
        .iter()
        .map(|a| a.slot.id.as_str())
        .collect();
    ids.sort_unstable();
    ids.join(",")
}

// ==============================================================================
// VALIDATION AND INFEASIBILITY
// ==============================================================================

#[test]
fn empty_service_list_is_rejected() {
    let catalog = ClinicCatalog::default();
    let generator = OptionGenerator::new(&catalog);

    let result = generator.generate("Ophthalmology", &[], None, vec![]);

    assert_matches!(result, Err(ScheduleError::Validation(_)));
}

#[test]
fn unknown_specialty_is_rejected() {
    let catalog = ClinicCatalog::default();
    let generator = OptionGenerator::new(&catalog);

    let result = generator.generate("Dermatology", &names(&["OCT"]), None, vec![]);

    assert_matches!(result, Err(ScheduleError::UnknownSpecialty(_)));
}

#[test]
fn no_slots_at_all_reports_empty_range() {
    let catalog = ClinicCatalog::default();
    let generator = OptionGenerator::new(&catalog);

    let result = generator.generate("Ophthalmology", &names(&["OCT"]), None, vec![]);

    assert_matches!(result, Err(ScheduleError::NoSlotsInRange));
}

#[test]
fn preference_that_eliminates_all_slots_is_distinguished() {
    let catalog = ClinicCatalog::default();
    let generator = OptionGenerator::new(&catalog);

    // Slots exist, just not for the requested practitioner.
    let slots = vec![slot(
        "s1", "2025-09-01", "09:00", "09:30", "ophthal-test-1", "oph-michael",
    )];

    let result = generator.generate("Ophthalmology", &names(&["OCT"]), Some("oph-sarah"), slots);

    assert_matches!(result, Err(ScheduleError::PractitionerFullyBooked));
}

#[test]
fn unmatchable_services_yield_no_feasible_bundle() {
    let catalog = ClinicCatalog::default();
    let generator = OptionGenerator::new(&catalog);

    // Free inventory exists but no slot carries an OCT code.
    let slots = vec![slot(
        "s1", "2025-09-01", "09:00", "09:30", "ophthal-consult", "oph-sarah",
    )];

    let result = generator.generate("Ophthalmology", &names(&["OCT"]), None, slots);

    assert_matches!(result, Err(ScheduleError::NoFeasibleBundle { .. }));
}

#[test]
fn busy_slots_are_ignored() {
    let catalog = ClinicCatalog::default();
    let generator = OptionGenerator::new(&catalog);

    let mut busy = slot("s1", "2025-09-01", "09:00", "09:30", "ophthal-test-1", "oph-sarah");
    busy.status = SlotStatus::Busy;

    let result = generator.generate("Ophthalmology", &names(&["OCT"]), None, vec![busy]);

    assert_matches!(result, Err(ScheduleError::NoSlotsInRange));
}

#[test]
fn identical_searches_fail_identically() {
    let catalog = ClinicCatalog::default();
    let generator = OptionGenerator::new(&catalog);

    let slots = vec![slot(
        "s1", "2025-09-01", "09:00", "09:30", "ophthal-consult", "oph-sarah",
    )];

    let first = generator.generate("Ophthalmology", &names(&["OCT"]), None, slots.clone());
    let second = generator.generate("Ophthalmology", &names(&["OCT"]), None, slots);

    assert_matches!(first, Err(ScheduleError::NoFeasibleBundle { .. }));
    assert_matches!(second, Err(ScheduleError::NoFeasibleBundle { .. }));
}

// ==============================================================================
// ENUMERATION AND DEDUP
// ==============================================================================

#[test]
fn single_feasible_bundle_yields_one_option() {
    let catalog = ClinicCatalog::default();
    let generator = OptionGenerator::new(&catalog);

    let slots = vec![
        slot("s1", "2025-09-01", "09:00", "09:30", "ophthal-test-1", "oph-sarah"),
        slot("s2", "2025-09-01", "09:30", "10:00", "ophthal-consult", "oph-sarah"),
    ];

    let options = generator
        .generate("Ophthalmology", &names(&["OCT", "Consultation"]), None, slots)
        .unwrap();

    assert_eq!(options.len(), 1);
    assert_eq!(options[0].id, 1);
    assert_eq!(options[0].total_days, 1);
    assert_eq!(options[0].pacing, VisitPacing::BackToBack);
    assert_eq!(options[0].appointments.len(), 2);
}

#[test]
fn exclusion_retries_produce_distinct_options() {
    let catalog = ClinicCatalog::default();
    let generator = OptionGenerator::new(&catalog);

    // Two OCT slots and two consultation slots: the retry loop should find
    // two fully disjoint combinations and then stop.
    let slots = vec![
        slot("o1", "2025-09-01", "09:00", "09:30", "ophthal-test-1", "oph-sarah"),
        slot("o2", "2025-09-01", "10:00", "10:30", "ophthal-test-1", "oph-sarah"),
        slot("c1", "2025-09-01", "09:30", "10:00", "ophthal-consult", "oph-sarah"),
        slot("c2", "2025-09-01", "10:30", "11:00", "ophthal-consult", "oph-sarah"),
    ];

    let options = generator
        .generate("Ophthalmology", &names(&["OCT", "Consultation"]), None, slots)
        .unwrap();

    assert_eq!(options.len(), 2);
    let keys: HashSet<String> = options.iter().map(combination_key).collect();
    assert_eq!(keys.len(), 2, "options must use distinct slot combinations");
}

#[test]
fn options_are_ranked_by_days_then_date_and_renumbered() {
    let catalog = ClinicCatalog::default();
    let generator = OptionGenerator::new(&catalog);

    // Sarah can only serve the later date; Michael the earlier one.
    let slots = vec![
        slot("s1", "2025-09-03", "09:00", "09:30", "ophthal-test-1", "oph-sarah"),
        slot("s2", "2025-09-03", "09:30", "10:00", "ophthal-consult", "oph-sarah"),
        slot("m1", "2025-09-01", "09:00", "09:30", "ophthal-test-1", "oph-michael"),
        slot("m2", "2025-09-01", "09:30", "10:00", "ophthal-consult", "oph-michael"),
    ];

    let options = generator
        .generate("Ophthalmology", &names(&["OCT", "Consultation"]), None, slots)
        .unwrap();

    assert_eq!(options.len(), 2);
    assert_eq!(options[0].id, 1);
    assert_eq!(options[1].id, 2);
    assert_eq!(
        options[0].appointments[0].slot.practitioner_id,
        "oph-michael"
    );
    assert!(options[0].first_date() < options[1].first_date());
}

#[test]
fn two_day_options_appear_when_one_day_cannot_cover() {
    let catalog = ClinicCatalog::default();
    let generator = OptionGenerator::new(&catalog);

    let slots = vec![
        slot("a1", "2025-09-01", "09:00", "09:30", "ophthal-test-1", "oph-sarah"),
        slot("b1", "2025-09-02", "09:00", "09:30", "ophthal-test-2", "oph-sarah"),
        slot("b2", "2025-09-02", "09:30", "10:00", "ophthal-consult", "oph-sarah"),
    ];

    let options = generator
        .generate(
            "Ophthalmology",
            &names(&["OCT", "Visual Field", "Consultation"]),
            None,
            slots,
        )
        .unwrap();

    assert_eq!(options.len(), 1);
    assert_eq!(options[0].total_days, 2);
    assert_eq!(
        options[0].appointments.last().unwrap().service_name,
        "Consultation"
    );
}

#[test]
fn single_service_never_produces_two_day_options() {
    let catalog = ClinicCatalog::default();
    let generator = OptionGenerator::new(&catalog);

    let slots = vec![
        slot("a1", "2025-09-01", "09:00", "09:30", "ophthal-test-1", "oph-sarah"),
        slot("b1", "2025-09-02", "09:00", "09:30", "ophthal-test-1", "oph-sarah"),
    ];

    let options = generator
        .generate("Ophthalmology", &names(&["OCT"]), None, slots)
        .unwrap();

    assert!(options.iter().all(|o| o.total_days == 1));
    assert_eq!(options.len(), 2);
}

#[test]
fn caps_limit_options_per_practitioner() {
    let catalog = ClinicCatalog::default();
    let limits = GeneratorLimits {
        single_day_cap: 1,
        ..GeneratorLimits::default()
    };
    let generator = OptionGenerator::with_limits(&catalog, limits);

    // One feasible bundle per date over three dates; the cap keeps one.
    let slots = vec![
        slot("a1", "2025-09-01", "09:00", "09:30", "ophthal-test-1", "oph-sarah"),
        slot("b1", "2025-09-02", "09:00", "09:30", "ophthal-test-1", "oph-sarah"),
        slot("c1", "2025-09-03", "09:00", "09:30", "ophthal-test-1", "oph-sarah"),
    ];

    let options = generator
        .generate("Ophthalmology", &names(&["OCT"]), None, slots)
        .unwrap();

    assert_eq!(options.len(), 1);
    assert_eq!(options[0].appointments[0].slot.id, "a1");
}

// ==============================================================================
// PACING
// ==============================================================================

#[test]
fn pacing_reflects_the_widest_gap() {
    let catalog = ClinicCatalog::default();
    let generator = OptionGenerator::new(&catalog);

    // Ten-minute gap between the visit's appointments.
    let small = vec![
        slot("s1", "2025-09-01", "09:00", "09:30", "ophthal-test-1", "oph-sarah"),
        slot("s2", "2025-09-01", "09:40", "10:10", "ophthal-consult", "oph-sarah"),
    ];
    let options = generator
        .generate("Ophthalmology", &names(&["OCT", "Consultation"]), None, small)
        .unwrap();
    assert_eq!(options[0].pacing, VisitPacing::SmallGaps);

    // Forty-five minutes exceeds the small-gap threshold.
    let wide = vec![
        slot("s1", "2025-09-01", "09:00", "09:30", "ophthal-test-1", "oph-sarah"),
        slot("s2", "2025-09-01", "10:15", "10:45", "ophthal-consult", "oph-sarah"),
    ];
    let options = generator
        .generate("Ophthalmology", &names(&["OCT", "Consultation"]), None, wide)
        .unwrap();
    assert_eq!(options[0].pacing, VisitPacing::Gapped);
}
