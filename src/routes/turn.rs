use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use uuid::Uuid;

use crate::{
    dto::turn::{
        GuessRequest, GuessResponse, SkipResponse, StartGameResponse, StartTurnResponse,
        TimeUpResponse, TurnActionRequest,
    },
    error::AppError,
    services::turn_service,
    state::SharedState,
};

/// Routes driving the round/turn state machine.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games/{id}/start", post(start_game))
        .route("/games/{id}/turn/start", post(start_turn))
        .route("/games/{id}/turn/guess", post(correct_guess))
        .route("/games/{id}/turn/skip", post(skip))
        .route("/games/{id}/turn/timeout", post(time_up))
}

/// Leave the lobby and enter round 1 if the verification gate passes.
#[utoipa::path(
    post,
    path = "/games/{id}/start",
    tag = "turns",
    params(("id" = Uuid, Path, description = "Game identifier")),
    request_body = TurnActionRequest,
    responses(
        (status = 200, description = "Game started", body = StartGameResponse),
        (status = 403, description = "Requester is not the host"),
        (status = 422, description = "Verification gate failed; body lists every problem")
    )
)]
pub async fn start_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TurnActionRequest>,
) -> Result<Json<StartGameResponse>, AppError> {
    let response = turn_service::start_game(&state, id, payload.requester_id).await?;
    Ok(Json(response))
}

/// Start the paused turn's timer and deal the first word card.
#[utoipa::path(
    post,
    path = "/games/{id}/turn/start",
    tag = "turns",
    params(("id" = Uuid, Path, description = "Game identifier")),
    request_body = TurnActionRequest,
    responses(
        (status = 200, description = "Turn running", body = StartTurnResponse),
        (status = 403, description = "Requester is not the current describer"),
        (status = 409, description = "No turn is waiting to start")
    )
)]
pub async fn start_turn(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TurnActionRequest>,
) -> Result<Json<StartTurnResponse>, AppError> {
    let response = turn_service::start_turn(&state, id, payload.requester_id).await?;
    Ok(Json(response))
}

/// Record a correct guess for the word on the describer's card.
#[utoipa::path(
    post,
    path = "/games/{id}/turn/guess",
    tag = "turns",
    params(("id" = Uuid, Path, description = "Game identifier")),
    request_body = GuessRequest,
    responses(
        (status = 200, description = "Guess recorded", body = GuessResponse),
        (status = 404, description = "Word not found"),
        (status = 409, description = "Word already guessed this round or no turn running")
    )
)]
pub async fn correct_guess(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<GuessRequest>,
) -> Result<Json<GuessResponse>, AppError> {
    let response = turn_service::correct_guess(&state, id, payload).await?;
    Ok(Json(response))
}

/// Skip the current word, paying the configured time penalty.
#[utoipa::path(
    post,
    path = "/games/{id}/turn/skip",
    tag = "turns",
    params(("id" = Uuid, Path, description = "Game identifier")),
    request_body = TurnActionRequest,
    responses(
        (status = 200, description = "Skip applied", body = SkipResponse),
        (status = 403, description = "Requester is not the current describer")
    )
)]
pub async fn skip(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TurnActionRequest>,
) -> Result<Json<SkipResponse>, AppError> {
    let response = turn_service::skip(&state, id, payload.requester_id).await?;
    Ok(Json(response))
}

/// Report that the turn timer reached zero and rotate to the next turn.
#[utoipa::path(
    post,
    path = "/games/{id}/turn/timeout",
    tag = "turns",
    params(("id" = Uuid, Path, description = "Game identifier")),
    request_body = TurnActionRequest,
    responses(
        (status = 200, description = "Turn rotated", body = TimeUpResponse),
        (status = 409, description = "No turn is running")
    )
)]
pub async fn time_up(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TurnActionRequest>,
) -> Result<Json<TimeUpResponse>, AppError> {
    let response = turn_service::time_up(&state, id, payload.requester_id).await?;
    Ok(Json(response))
}
