use crate::infrastructure::http::controllers::{assignments, duty_slots};
use crate::infrastructure::http::middleware::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

const MAX_BODY_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/assignments", post(assignments::assign_volunteer))
        .route("/api/assignments/batch", post(assignments::batch_assign))
        .route(
            "/api/assignments/:id/cancel",
            post(assignments::cancel_assignment),
        )
        .route(
            "/api/duty-slots/:id/capacity-override",
            put(duty_slots::set_capacity_override),
        );

    Router::new()
        .route("/health", get(health_handler))
        .merge(api)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn health_handler() -> &'static str {
    "OK"
}
