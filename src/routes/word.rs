use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::word::{
        RequesterQuery, RoundQuery, SubmitWordRequest, WordCountsResponse, WordSummary,
    },
    error::AppError,
    services::word_service,
    state::SharedState,
};

/// Routes handling the lobby word pool.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games/{id}/words", post(submit_word))
        .route("/games/{id}/words/counts", get(word_counts))
        .route("/games/{id}/words/{word_id}", delete(remove_word))
        .route("/games/{id}/players/{player_id}/words", get(player_words))
}

/// Submit a word to the game's pool during the lobby.
#[utoipa::path(
    post,
    path = "/games/{id}/words",
    tag = "words",
    params(("id" = Uuid, Path, description = "Game identifier")),
    request_body = SubmitWordRequest,
    responses(
        (status = 200, description = "Word stored", body = WordSummary),
        (status = 409, description = "Quota reached or the game has left the lobby")
    )
)]
pub async fn submit_word(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<SubmitWordRequest>>,
) -> Result<Json<WordSummary>, AppError> {
    let word = word_service::submit(&state, id, payload).await?;
    Ok(Json(word))
}

/// Remove a previously submitted word; only the submitter may do so.
#[utoipa::path(
    delete,
    path = "/games/{id}/words/{word_id}",
    tag = "words",
    params(
        ("id" = Uuid, Path, description = "Game identifier"),
        ("word_id" = Uuid, Path, description = "Word to remove"),
        ("requesterId" = Uuid, Query, description = "Player issuing the request")
    ),
    responses(
        (status = 204, description = "Word removed"),
        (status = 403, description = "Requester did not submit this word"),
        (status = 404, description = "Word not found")
    )
)]
pub async fn remove_word(
    State(state): State<SharedState>,
    Path((id, word_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<RequesterQuery>,
) -> Result<StatusCode, AppError> {
    word_service::remove(&state, id, word_id, query.requester_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List the words a player has submitted so far.
#[utoipa::path(
    get,
    path = "/games/{id}/players/{player_id}/words",
    tag = "words",
    params(
        ("id" = Uuid, Path, description = "Game identifier"),
        ("player_id" = Uuid, Path, description = "Submitting player")
    ),
    responses(
        (status = 200, description = "Words submitted by the player", body = [WordSummary])
    )
)]
pub async fn player_words(
    State(state): State<SharedState>,
    Path((id, player_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<WordSummary>>, AppError> {
    let words = word_service::list_by_player(&state, id, player_id).await?;
    Ok(Json(words))
}

/// Per-round guessed/total counters for progress displays.
#[utoipa::path(
    get,
    path = "/games/{id}/words/counts",
    tag = "words",
    params(
        ("id" = Uuid, Path, description = "Game identifier"),
        ("round" = u8, Query, description = "Round number (1..=3)")
    ),
    responses(
        (status = 200, description = "Pool counters", body = WordCountsResponse)
    )
)]
pub async fn word_counts(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Query(query): Query<RoundQuery>,
) -> Result<Json<WordCountsResponse>, AppError> {
    let counts = word_service::counts_for_round(&state, id, query.round).await?;
    Ok(Json(counts))
}
