// libs/scheduling-cell/src/services/slots.rs
//
// Fetches free-slot inventory from the FHIR backend, one schedule query per
// practitioner of the specialty, and annotates each raw resource with the
// owning practitioner. Per-practitioner failures are logged and skipped so a
// single flaky schedule never empties the whole search.
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, warn};

use shared_config::AppConfig;
use shared_fhir::client::FhirClient;
use shared_fhir::models::SlotResource;

use crate::catalog::ClinicCatalog;
use crate::models::{ScheduleError, Slot, SlotStatus};

pub struct SlotDirectory {
    fhir: Arc<FhirClient>,
}

impl SlotDirectory {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_client(Arc::new(FhirClient::new(config)))
    }

    pub fn with_client(fhir: Arc<FhirClient>) -> Self {
        Self { fhir }
    }

    /// All free slots offered by the specialty's practitioners in the date
    /// range. Practitioners whose query fails contribute nothing.
    pub async fn fetch_specialty_slots(
        &self,
        catalog: &ClinicCatalog,
        specialty: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        auth_token: Option<&str>,
    ) -> Result<Vec<Slot>, ScheduleError> {
        if catalog.specialty(specialty).is_none() {
            return Err(ScheduleError::UnknownSpecialty(specialty.to_string()));
        }

        let mut slots: Vec<Slot> = Vec::new();

        for practitioner in catalog.practitioners(specialty) {
            match self
                .fhir
                .query_free_slots(&practitioner.id, start_date, end_date, auth_token)
                .await
            {
                Ok(resources) => {
                    slots.extend(
                        resources
                            .into_iter()
                            .filter_map(|r| annotate(r, catalog, specialty)),
                    );
                }
                Err(err) => {
                    warn!(
                        "Skipping slots for practitioner {}: {}",
                        practitioner.id, err
                    );
                }
            }
        }

        info!(
            "Fetched {} free slots for {} between {} and {}",
            slots.len(),
            specialty,
            start_date,
            end_date
        );

        Ok(slots)
    }
}

/// Turn a raw slot resource into a practitioner-annotated domain slot.
/// Resources without an id, or not free, are dropped.
fn annotate(resource: SlotResource, catalog: &ClinicCatalog, specialty: &str) -> Option<Slot> {
    let id = resource.id.clone()?;

    let status = SlotStatus::parse(&resource.status);
    if status != SlotStatus::Free {
        return None;
    }

    let practitioner_id = resource.schedule_id().unwrap_or_default().to_string();
    let practitioner_name = catalog
        .practitioner_name(specialty, &practitioner_id)
        .unwrap_or("Available Specialist")
        .to_string();

    Some(Slot {
        id,
        start: resource.start,
        end: resource.end,
        status,
        service_code: resource.service_code().map(str::to_string),
        practitioner_id,
        practitioner_name,
    })
}
