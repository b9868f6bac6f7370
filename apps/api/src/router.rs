use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use scheduling_cell::router::scheduling_routes;
use scheduling_cell::SchedulingState;

pub fn create_router(state: Arc<SchedulingState>) -> Router {
    Router::new()
        .route("/", get(|| async { "SmartVisit Scheduler API is running!" }))
        .nest("/schedule", scheduling_routes(state.clone()))
}
