// libs/scheduling-cell/src/catalog.rs
//
// Immutable clinic configuration injected into the matcher and generator:
// which services each specialty offers, which backend service codes satisfy
// each service, coverage labels, and the practitioner roster per specialty.
use serde::Serialize;

use crate::models::Coverage;

#[derive(Debug, Clone, Serialize)]
pub struct ServiceDefinition {
    pub name: String,
    /// Backend service codes that satisfy this service. Several codes may
    /// represent the same logical service (e.g. ECG accepts either of two).
    pub codes: Vec<String>,
    pub coverage: Coverage,
}

#[derive(Debug, Clone, Serialize)]
pub struct PractitionerRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpecialtyEntry {
    pub name: String,
    /// Service names offered by this specialty, in menu order.
    pub services: Vec<String>,
    pub practitioners: Vec<PractitionerRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClinicCatalog {
    pub services: Vec<ServiceDefinition>,
    pub specialties: Vec<SpecialtyEntry>,
}

impl ClinicCatalog {
    pub fn new(services: Vec<ServiceDefinition>, specialties: Vec<SpecialtyEntry>) -> Self {
        Self { services, specialties }
    }

    pub fn service(&self, name: &str) -> Option<&ServiceDefinition> {
        self.services.iter().find(|s| s.name == name)
    }

    pub fn coverage(&self, name: &str) -> Coverage {
        self.service(name).map(|s| s.coverage).unwrap_or(Coverage::Unknown)
    }

    pub fn specialty(&self, name: &str) -> Option<&SpecialtyEntry> {
        self.specialties.iter().find(|s| s.name == name)
    }

    pub fn practitioners(&self, specialty: &str) -> &[PractitionerRef] {
        self.specialty(specialty)
            .map(|s| s.practitioners.as_slice())
            .unwrap_or(&[])
    }

    pub fn practitioner_name(&self, specialty: &str, practitioner_id: &str) -> Option<&str> {
        self.practitioners(specialty)
            .iter()
            .find(|p| p.id == practitioner_id)
            .map(|p| p.name.as_str())
    }

    /// The consultation service of a specialty, if it offers one. Consultations
    /// must always be scheduled after the other services of a visit.
    pub fn consultation_service(&self, specialty: &str) -> Option<&str> {
        self.specialty(specialty)?
            .services
            .iter()
            .find(|s| s.to_lowercase().contains("consultation"))
            .map(|s| s.as_str())
    }
}

impl Default for ClinicCatalog {
    fn default() -> Self {
        let svc = |name: &str, codes: &[&str], coverage: Coverage| ServiceDefinition {
            name: name.to_string(),
            codes: codes.iter().map(|c| c.to_string()).collect(),
            coverage,
        };
        let prac = |id: &str, name: &str| PractitionerRef {
            id: id.to_string(),
            name: name.to_string(),
        };

        let services = vec![
            svc("OCT", &["ophthal-test-1"], Coverage::Covered),
            svc("Visual Field", &["ophthal-test-2"], Coverage::Covered),
            svc("AS-OCT", &["ophthal-test-3"], Coverage::Paid),
            svc("Optos", &["ophthal-test-4"], Coverage::Paid),
            svc("ECG", &["cardio-ekg", "cardio-test-1"], Coverage::Covered),
            svc("Echocardiogram", &["cardio-echo", "cardio-test-2"], Coverage::Covered),
            svc("Stress Test", &["cardio-test-3"], Coverage::Paid),
            svc("Pelvic Ultrasound", &["gyn-ultrasound"], Coverage::Covered),
            svc("Lab Work", &["gyn-pap"], Coverage::Covered),
            // The consultation code set spans every specialty.
            svc(
                "Consultation",
                &["ophthal-consult", "cardio-consult", "gyn-consult"],
                Coverage::Covered,
            ),
        ];

        let specialties = vec![
            SpecialtyEntry {
                name: "Ophthalmology".to_string(),
                services: ["OCT", "Visual Field", "AS-OCT", "Optos", "Consultation"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                practitioners: vec![
                    prac("oph-sarah", "Dr. Sarah Johnson"),
                    prac("oph-michael", "Dr. Michael Chen"),
                ],
            },
            SpecialtyEntry {
                name: "Cardiology".to_string(),
                services: ["ECG", "Echocardiogram", "Stress Test", "Consultation"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                practitioners: vec![
                    prac("card-james", "Dr. James Wilson"),
                    prac("card-maria", "Dr. Maria Garcia"),
                ],
            },
            SpecialtyEntry {
                name: "Gynecology".to_string(),
                services: ["Pelvic Ultrasound", "Lab Work", "Consultation"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                practitioners: vec![
                    prac("gyn-emily", "Dr. Emily Rodriguez"),
                    prac("gyn-priya", "Dr. Priya Patel"),
                ],
            },
        ];

        Self::new(services, specialties)
    }
}
