use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    // Every directory and block operation requires authentication
    let protected_routes = Router::new()
        .route("/", get(handlers::list_doctors))
        .route("/specialties", get(handlers::list_specialties))
        .route("/specialties", post(handlers::add_specialty))
        .route("/{doctor_id}/blocks", get(handlers::list_blocked_slots))
        .route("/{doctor_id}/blocks", post(handlers::create_blocked_slot))
        .route(
            "/{doctor_id}/blocks/{block_id}",
            delete(handlers::delete_blocked_slot),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
