use axum::middleware::from_fn_with_state;
use axum::routing::post;
use axum::Router;

pub mod verify_code;

use crate::http_server::rate_limit;
use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/verify-code", post(verify_code::handler))
        .route_layer(from_fn_with_state(state.clone(), rate_limit::enforce))
        .with_state(state)
}
