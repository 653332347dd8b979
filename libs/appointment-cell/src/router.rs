use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    // All appointment operations require authentication
    let protected_routes = Router::new()
        .route("/", post(handlers::book_appointment))
        .route("/stats", get(handlers::get_appointment_stats))
        .route("/conflicts/check", get(handlers::check_appointment_conflicts))
        .route("/patients/{patient_id}", get(handlers::get_patient_agenda))
        .route("/doctors/{doctor_id}", get(handlers::get_doctor_day_agenda))
        .route("/{appointment_id}/status", patch(handlers::update_appointment_status))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
