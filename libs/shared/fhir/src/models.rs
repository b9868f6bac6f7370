// libs/shared/fhir/src/models.rs
//
// Minimal wire types for the FHIR resources this system touches. Only the
// fields the scheduling flow reads or writes are modeled; unknown fields are
// ignored on deserialization.
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    pub reference: String,
}

impl Reference {
    pub fn new(reference: impl Into<String>) -> Self {
        Self { reference: reference.into() }
    }

    /// The id portion of a `Type/id` reference, if present.
    pub fn target_id(&self) -> Option<&str> {
        self.reference.split('/').nth(1)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Coding {
    pub code: Option<String>,
    pub display: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeableConcept {
    #[serde(default)]
    pub coding: Vec<Coding>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotResource {
    pub resource_type: String,
    pub id: Option<String>,
    pub start: Option<DateTime<FixedOffset>>,
    pub end: Option<DateTime<FixedOffset>>,
    pub status: String,
    pub schedule: Option<Reference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub service_type: Vec<CodeableConcept>,
}

impl SlotResource {
    /// First service-type code, the tag the matcher tests against.
    pub fn service_code(&self) -> Option<&str> {
        self.service_type
            .first()
            .and_then(|st| st.coding.first())
            .and_then(|c| c.code.as_deref())
    }

    /// Schedule owner parsed from the `Schedule/{id}` back-reference.
    pub fn schedule_id(&self) -> Option<&str> {
        self.schedule.as_ref().and_then(|s| s.target_id())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotBundleEntry {
    pub resource: SlotResource,
}

/// A FHIR searchset bundle of Slot resources.
#[derive(Debug, Clone, Deserialize)]
pub struct SlotBundle {
    #[serde(default)]
    pub entry: Vec<SlotBundleEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Participant {
    pub actor: Reference,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentResource {
    pub resource_type: String,
    pub status: String,
    pub description: String,
    pub start: Option<DateTime<FixedOffset>>,
    pub end: Option<DateTime<FixedOffset>>,
    pub participant: Vec<Participant>,
    pub slot: Vec<Reference>,
}

impl AppointmentResource {
    /// Booking payload binding a patient and a practitioner to one slot.
    pub fn booked(patient_id: &str, practitioner_id: &str, description: String, slot: &SlotResource) -> Self {
        let slot_id = slot.id.as_deref().unwrap_or_default();
        Self {
            resource_type: "Appointment".to_string(),
            status: "booked".to_string(),
            description,
            start: slot.start,
            end: slot.end,
            participant: vec![
                Participant {
                    actor: Reference::new(format!("Patient/{}", patient_id)),
                    status: "accepted".to_string(),
                },
                Participant {
                    actor: Reference::new(format!("Practitioner/{}", practitioner_id)),
                    status: "accepted".to_string(),
                },
            ],
            slot: vec![Reference::new(format!("Slot/{}", slot_id))],
        }
    }
}
