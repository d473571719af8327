use crate::auth_gate::require_caller;
use crate::{SharedData, api, logging};
use axum::{Router, middleware};
use std::sync::Arc;

/// Assembles the full HTTP surface. Everything except signup, login and the API docs sits
/// behind the bearer token gate.
pub fn build_router(shared_data: Arc<SharedData>) -> Router {
    let auth_gate =
        middleware::from_fn_with_state(shared_data.token_verifier.clone(), require_caller);

    let router = Router::new()
        .nest("/api/auth", api::auth::auth_routes())
        .nest(
            "/api/tasks",
            api::task::task_routes().route_layer(auth_gate.clone()),
        )
        .nest(
            "/api/categories",
            api::category::category_routes().route_layer(auth_gate.clone()),
        )
        .nest(
            "/api/analytics",
            api::analytics::analytics_routes().route_layer(auth_gate),
        )
        .merge(api::swagger_main::build_documentation())
        .with_state(shared_data);

    logging::attach_tracing_http(router)
}
