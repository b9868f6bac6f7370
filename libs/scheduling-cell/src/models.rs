// libs/scheduling-cell/src/models.rs
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use shared_fhir::models::{CodeableConcept, Coding, Reference, SlotResource};

// ==============================================================================
// CORE SCHEDULING MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Free,
    Busy,
    #[serde(other)]
    Other,
}

impl SlotStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "free" => SlotStatus::Free,
            "busy" => SlotStatus::Busy,
            _ => SlotStatus::Other,
        }
    }
}

/// One offered time window, annotated with the practitioner whose schedule
/// owns it. Timestamps keep the backend's fixed offset; overlap detection
/// must always use the full date+time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub id: String,
    pub start: Option<DateTime<FixedOffset>>,
    pub end: Option<DateTime<FixedOffset>>,
    pub status: SlotStatus,
    pub service_code: Option<String>,
    pub practitioner_id: String,
    pub practitioner_name: String,
}

impl Slot {
    pub fn is_free(&self) -> bool {
        self.status == SlotStatus::Free
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start.map(|s| s.date_naive())
    }

    /// Rebuild the backend wire representation, for slot-status updates.
    pub fn to_resource(&self) -> SlotResource {
        SlotResource {
            resource_type: "Slot".to_string(),
            id: Some(self.id.clone()),
            start: self.start,
            end: self.end,
            status: match self.status {
                SlotStatus::Free => "free".to_string(),
                SlotStatus::Busy => "busy".to_string(),
                SlotStatus::Other => "busy-unavailable".to_string(),
            },
            schedule: Some(Reference::new(format!("Schedule/{}", self.practitioner_id))),
            service_type: self
                .service_code
                .as_ref()
                .map(|code| {
                    vec![CodeableConcept {
                        coding: vec![Coding { code: Some(code.clone()), display: None }],
                    }]
                })
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Coverage {
    Covered,
    Paid,
    Unknown,
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coverage::Covered => write!(f, "Covered"),
            Coverage::Paid => write!(f, "Paid"),
            Coverage::Unknown => write!(f, "Unknown"),
        }
    }
}

/// One requested service bound to one chosen slot. Transient: lives for a
/// single search/booking cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledAppointment {
    pub service_name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub coverage: Coverage,
    pub practitioner_name: String,
    pub slot: Slot,
}

/// How tightly packed the appointments of an option are within each visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitPacing {
    BackToBack,
    SmallGaps,
    Gapped,
}

/// A complete, validated bundle covering every requested service. `id` is the
/// display ordinal assigned after global ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOption {
    pub id: usize,
    pub appointments: Vec<ScheduledAppointment>,
    pub total_days: u8,
    pub pacing: VisitPacing,
}

impl ScheduleOption {
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.appointments.first().map(|a| a.date)
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchScheduleRequest {
    pub specialty: String,
    pub services: Vec<String>,
    pub practitioner_preference: Option<String>,
    pub date_range_start: NaiveDate,
    pub date_range_end: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookScheduleRequest {
    pub patient_id: String,
    pub specialty: String,
    pub option: ScheduleOption,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

/// Search-side failures. Infeasibility variants are ordinary results of a
/// search that ran to completion, not upstream faults; callers need to tell
/// "no slots at all" apart from "the practitioner filter eliminated them".
#[derive(Debug, Clone, thiserror::Error)]
pub enum ScheduleError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown specialty: {0}")]
    UnknownSpecialty(String),

    #[error("No available slots found for the selected date range")]
    NoSlotsInRange,

    #[error("No available slots for the selected practitioner")]
    PractitionerFullyBooked,

    #[error("Could not generate schedule options: {hint}")]
    NoFeasibleBundle { hint: String },

    #[error("Scheduling backend error: {0}")]
    Upstream(String),
}

/// Booking is best-effort: appointments already submitted when a later step
/// fails are not rolled back, so the error names what was already booked.
#[derive(Debug, thiserror::Error)]
#[error("Booking failed while scheduling {failed_service}: {cause}")]
pub struct BookingError {
    pub booked: Vec<String>,
    pub failed_service: String,
    pub cause: anyhow::Error,
}
