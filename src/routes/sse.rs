use std::convert::Infallible;

use axum::{
    Router,
    extract::{Path, State},
    response::sse::Sse,
    routing::get,
};
use futures::Stream;
use tracing::info;
use uuid::Uuid;

use crate::{error::AppError, services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/games/{id}/events",
    tag = "sse",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Per-game event stream", content_type = "text/event-stream", body = String),
        (status = 404, description = "Game not found")
    )
)]
/// Stream store change notifications for one game to a connected client.
pub async fn game_events(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>>, AppError> {
    let (receiver, handshake) = sse_service::subscribe(&state, id).await?;
    info!(game_id = %id, "new SSE connection");
    Ok(sse_service::to_sse_stream(receiver, handshake))
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/games/{id}/events", get(game_events))
}
