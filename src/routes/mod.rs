use axum::Router;

use crate::state::SharedState;

/// Swagger UI and OpenAPI document.
pub mod docs;
/// Lobby routes: games, players, teams, settings.
pub mod game;
/// Health check route.
pub mod health;
/// Per-game SSE stream.
pub mod sse;
/// Turn state machine routes.
pub mod turn;
/// Word pool routes.
pub mod word;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(game::router())
        .merge(word::router())
        .merge(turn::router())
        .merge(sse::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
