use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn queue_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route("/", post(handlers::add_to_queue))
        .route("/", get(handlers::list_queue))
        .route("/", delete(handlers::clear_queue))
        .route("/{entry_id}", patch(handlers::update_queue_status))
        .route("/{entry_id}", delete(handlers::remove_from_queue))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
