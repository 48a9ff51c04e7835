use axum::Router;

use crate::state::SharedState;

/// OpenAPI / Swagger UI routes.
pub mod docs;
/// Game entry routes (create & join).
pub mod game;
/// Health check route.
pub mod health;
/// Lobby snapshot, lifecycle, and chat routes.
pub mod lobby;
/// Prediction-mode routes.
pub mod oscars;
/// Change-feed SSE routes.
pub mod sse;
/// Trivia-mode routes.
pub mod trivia;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(game::router())
        .merge(lobby::router())
        .merge(trivia::router())
        .merge(oscars::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
