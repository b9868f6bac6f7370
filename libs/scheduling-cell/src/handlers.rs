// libs/scheduling-cell/src/handlers.rs
use axum::{extract::State, Json};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use shared_models::error::AppError;

use crate::models::{BookScheduleRequest, ScheduleError, SearchScheduleRequest};
use crate::services::booking::BookingService;
use crate::services::generator::OptionGenerator;
use crate::services::slots::SlotDirectory;
use crate::SchedulingState;

/// GET /schedule/catalog
///
/// The service menu the frontend renders: specialties with their services,
/// coverage labels, and practitioner rosters.
pub async fn get_catalog(State(state): State<Arc<SchedulingState>>) -> Json<Value> {
    Json(json!({
        "success": true,
        "services": state.catalog.services,
        "specialties": state.catalog.specialties,
    }))
}

/// POST /schedule/search
///
/// Fetch free slots for the specialty's practitioners and enumerate ranked
/// schedule options covering every requested service.
pub async fn search_schedules(
    State(state): State<Arc<SchedulingState>>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Json(request): Json<SearchScheduleRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.as_ref().map(|TypedHeader(a)| a.token());

    if request.specialty.is_empty() || request.services.is_empty() {
        return Err(AppError::ValidationError(
            "Select a specialty and at least one service".to_string(),
        ));
    }
    if request.date_range_start > request.date_range_end {
        return Err(AppError::ValidationError(
            "Date range start must not be after its end".to_string(),
        ));
    }

    info!(
        "Searching schedules: {} / {:?} between {} and {}",
        request.specialty, request.services, request.date_range_start, request.date_range_end
    );

    let directory = SlotDirectory::new(&state.config);
    let slots = directory
        .fetch_specialty_slots(
            &state.catalog,
            &request.specialty,
            request.date_range_start,
            request.date_range_end,
            token,
        )
        .await
        .map_err(map_schedule_error)?;

    let generator = OptionGenerator::new(&state.catalog);
    let options = generator
        .generate(
            &request.specialty,
            &request.services,
            request.practitioner_preference.as_deref(),
            slots,
        )
        .map_err(map_schedule_error)?;

    Ok(Json(json!({
        "success": true,
        "options": options,
    })))
}

/// POST /schedule/book
pub async fn book_schedule(
    State(state): State<Arc<SchedulingState>>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Json(request): Json<BookScheduleRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.as_ref().map(|TypedHeader(a)| a.token());

    let patient_id = if request.patient_id.is_empty() {
        state.config.default_patient_id.clone()
    } else {
        request.patient_id.clone()
    };
    if patient_id.is_empty() {
        return Err(AppError::ValidationError("Patient id is required".to_string()));
    }
    if request.option.appointments.is_empty() {
        return Err(AppError::ValidationError(
            "Schedule option has no appointments".to_string(),
        ));
    }

    let booking = BookingService::new(&state.config);
    match booking
        .book_option(&patient_id, &request.specialty, &request.option, token)
        .await
    {
        Ok(()) => Ok(Json(json!({
            "success": true,
            "booked": request
                .option
                .appointments
                .iter()
                .map(|a| a.service_name.clone())
                .collect::<Vec<_>>(),
        }))),
        Err(err) => {
            let message = if err.booked.is_empty() {
                format!("Booking failed at {}: nothing was booked", err.failed_service)
            } else {
                format!(
                    "Booking failed at {}; already booked: {}",
                    err.failed_service,
                    err.booked.join(", ")
                )
            };
            Err(AppError::ExternalService(message))
        }
    }
}

fn map_schedule_error(err: ScheduleError) -> AppError {
    match err {
        ScheduleError::Validation(msg) => AppError::ValidationError(msg),
        ScheduleError::UnknownSpecialty(name) => {
            AppError::NotFound(format!("Unknown specialty: {}", name))
        }
        ScheduleError::NoSlotsInRange => AppError::NotFound(
            "No available slots found for the selected date range".to_string(),
        ),
        ScheduleError::PractitionerFullyBooked => AppError::NotFound(
            "No available slots for the selected practitioner. Try any available practitioner"
                .to_string(),
        ),
        ScheduleError::NoFeasibleBundle { hint } => {
            AppError::NotFound(format!("Could not generate schedule options: {}", hint))
        }
        ScheduleError::Upstream(msg) => AppError::ExternalService(msg),
    }
}
