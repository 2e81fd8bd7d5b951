use axum::{Router, routing::{get, post}};

use crate::handlers;

pub fn simulation_routes() -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/simulate", post(handlers::simulate))
}
