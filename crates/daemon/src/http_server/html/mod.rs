use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;

mod letters;

use crate::http_server::auth;
use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/*slug", get(letters::handler))
        .route_layer(from_fn_with_state(
            state.clone(),
            auth::require_authorization,
        ))
        .with_state(state)
}
