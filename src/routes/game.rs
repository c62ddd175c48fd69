use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post, put},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::{
        game::{
            AssignTeamRequest, CreateGameRequest, CreateTeamRequest, GameJoinedResponse,
            GameOverview, JoinGameRequest, PlayerSummary, StartCheckResponse, TeamSummary,
            UpdateSettingsRequest,
        },
        word::RequesterQuery,
    },
    error::AppError,
    services::game_service,
    state::SharedState,
};

/// Routes handling lobby operations: games, players, teams, settings.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", post(create_game))
        .route("/games/join", post(join_game))
        .route("/games/{id}", get(get_game))
        .route("/games/{id}/settings", patch(update_settings))
        .route("/games/{id}/teams", post(create_team))
        .route("/games/{id}/players/{player_id}/team", put(assign_team))
        .route("/games/{id}/start-check", get(start_check))
}

/// Create a fresh game in the lobby state; the caller becomes the host.
#[utoipa::path(
    post,
    path = "/games",
    tag = "game",
    request_body = CreateGameRequest,
    responses(
        (status = 200, description = "Game created", body = GameJoinedResponse),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateGameRequest>>,
) -> Result<Json<GameJoinedResponse>, AppError> {
    let response = game_service::create_game(&state, payload).await?;
    Ok(Json(response))
}

/// Join an open game by its four-character code.
#[utoipa::path(
    post,
    path = "/games/join",
    tag = "game",
    request_body = JoinGameRequest,
    responses(
        (status = 200, description = "Joined the game", body = GameJoinedResponse),
        (status = 404, description = "No open game with that code")
    )
)]
pub async fn join_game(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<JoinGameRequest>>,
) -> Result<Json<GameJoinedResponse>, AppError> {
    let response = game_service::join_game(&state, payload).await?;
    Ok(Json(response))
}

/// Fetch the current snapshot of a game with its teams and players.
#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "game",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Game overview", body = GameOverview),
        (status = 404, description = "Game not found")
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameOverview>, AppError> {
    let overview = game_service::get_overview(&state, id).await?;
    Ok(Json(overview))
}

/// Replace the game settings; host only, lobby only.
#[utoipa::path(
    patch,
    path = "/games/{id}/settings",
    tag = "game",
    params(("id" = Uuid, Path, description = "Game identifier")),
    request_body = UpdateSettingsRequest,
    responses(
        (status = 204, description = "Settings updated"),
        (status = 403, description = "Requester is not the host"),
        (status = 409, description = "Game has left the lobby")
    )
)]
pub async fn update_settings(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<UpdateSettingsRequest>>,
) -> Result<axum::http::StatusCode, AppError> {
    game_service::update_settings(&state, id, payload).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

/// Create a team during the lobby; host only.
#[utoipa::path(
    post,
    path = "/games/{id}/teams",
    tag = "game",
    params(("id" = Uuid, Path, description = "Game identifier")),
    request_body = CreateTeamRequest,
    responses(
        (status = 200, description = "Team created", body = TeamSummary),
        (status = 403, description = "Requester is not the host")
    )
)]
pub async fn create_team(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<CreateTeamRequest>>,
) -> Result<Json<TeamSummary>, AppError> {
    let team = game_service::create_team(&state, id, payload).await?;
    Ok(Json(team.into()))
}

/// Assign a player to a team, or clear their team, during the lobby.
#[utoipa::path(
    put,
    path = "/games/{id}/players/{player_id}/team",
    tag = "game",
    params(
        ("id" = Uuid, Path, description = "Game identifier"),
        ("player_id" = Uuid, Path, description = "Player to reassign")
    ),
    request_body = AssignTeamRequest,
    responses(
        (status = 200, description = "Player reassigned", body = PlayerSummary),
        (status = 403, description = "Requester may not move this player")
    )
)]
pub async fn assign_team(
    State(state): State<SharedState>,
    Path((id, player_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<AssignTeamRequest>,
) -> Result<Json<PlayerSummary>, AppError> {
    let player = game_service::assign_team(&state, id, player_id, payload).await?;
    Ok(Json(player.into()))
}

/// Preview the start verification gate without attempting to start.
#[utoipa::path(
    get,
    path = "/games/{id}/start-check",
    tag = "game",
    params(
        ("id" = Uuid, Path, description = "Game identifier"),
        ("requesterId" = Uuid, Query, description = "Player issuing the request")
    ),
    responses(
        (status = 200, description = "Gate diagnostics", body = StartCheckResponse)
    )
)]
pub async fn start_check(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Query(query): Query<RequesterQuery>,
) -> Result<Json<StartCheckResponse>, AppError> {
    let response = game_service::start_check(&state, id, query.requester_id).await?;
    Ok(Json(response))
}
