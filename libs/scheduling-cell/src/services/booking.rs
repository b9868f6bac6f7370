// libs/scheduling-cell/src/services/booking.rs
//
// Books a chosen schedule option appointment by appointment. Booking is
// best-effort: there is no rollback, so a mid-sequence failure reports both
// the failed service and everything already booked before it.
use std::sync::Arc;
use tracing::{error, info};

use shared_config::AppConfig;
use shared_fhir::client::FhirClient;
use shared_fhir::models::AppointmentResource;

use crate::models::{BookingError, ScheduleOption};

pub struct BookingService {
    fhir: Arc<FhirClient>,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_client(Arc::new(FhirClient::new(config)))
    }

    pub fn with_client(fhir: Arc<FhirClient>) -> Self {
        Self { fhir }
    }

    /// Create one appointment per entry in the option, marking each slot busy
    /// as it is claimed. Stops at the first failure.
    pub async fn book_option(
        &self,
        patient_id: &str,
        specialty: &str,
        option: &ScheduleOption,
        auth_token: Option<&str>,
    ) -> Result<(), BookingError> {
        let mut booked: Vec<String> = Vec::new();

        for appointment in &option.appointments {
            let description = format!("{} - {}", specialty, appointment.service_name);
            let slot_resource = appointment.slot.to_resource();
            let payload = AppointmentResource::booked(
                patient_id,
                &appointment.slot.practitioner_id,
                description,
                &slot_resource,
            );

            if let Err(err) = self.fhir.create_appointment(&payload, auth_token).await {
                error!(
                    "Failed to create appointment for {}: {}",
                    appointment.service_name, err
                );
                return Err(BookingError {
                    booked,
                    failed_service: appointment.service_name.clone(),
                    cause: err,
                });
            }

            if let Err(err) = self.fhir.mark_slot_busy(&slot_resource, auth_token).await {
                error!(
                    "Failed to mark slot {} busy for {}: {}",
                    appointment.slot.id, appointment.service_name, err
                );
                return Err(BookingError {
                    booked,
                    failed_service: appointment.service_name.clone(),
                    cause: err,
                });
            }

            booked.push(appointment.service_name.clone());
        }

        info!(
            "Booked {} appointments for patient {}",
            booked.len(),
            patient_id
        );

        Ok(())
    }
}
