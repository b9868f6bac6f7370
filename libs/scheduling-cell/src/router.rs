// libs/scheduling-cell/src/router.rs
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::SchedulingState;

pub fn scheduling_routes(state: Arc<SchedulingState>) -> Router {
    Router::new()
        .route("/catalog", get(handlers::get_catalog))
        .route("/search", post(handlers::search_schedules))
        .route("/book", post(handlers::book_schedule))
        .with_state(state)
}
