//! Game bootstrap and lobby logic: creation, joining by code, team
//! management, and the start-check preview.
//!
//! Every operation reads fresh records from the store, validates, and only
//! then writes; nothing here trusts client-side cached state.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{
        game_store::GameStore,
        models::{GameEntity, GameState, PlayerEntity, TeamEntity},
    },
    dto::game::{
        AssignTeamRequest, CreateGameRequest, CreateTeamRequest, GameJoinedResponse, GameOverview,
        JoinGameRequest, StartCheckResponse, UpdateSettingsRequest,
    },
    engine::{codes, verification},
    error::ServiceError,
    state::SharedState,
};

/// Attempts made to find a join code that is free among non-finished games.
const CODE_ALLOCATION_ATTEMPTS: usize = 32;

/// Create a new game in the lobby state; the creating player becomes host.
pub async fn create_game(
    state: &SharedState,
    request: CreateGameRequest,
) -> Result<GameJoinedResponse, ServiceError> {
    let store = state.require_game_store().await?;

    let host_name = request.host_name.trim().to_owned();
    if host_name.is_empty() {
        return Err(ServiceError::InvalidInput(
            "host name must not be empty".into(),
        ));
    }

    let settings = request
        .settings
        .map(Into::into)
        .unwrap_or_else(|| state.config().default_settings());

    let code = allocate_code(&store).await?;
    let now = store.server_time().await?;

    let game = GameEntity {
        id: Uuid::new_v4(),
        code: code.clone(),
        state: GameState::Lobby,
        current_round: None,
        active_team_id: None,
        active_player_id: None,
        turn_order: Vec::new(),
        turn_state: None,
        turn_start_time: None,
        turn_sequence: None,
        settings,
        last_guessed_word: None,
        last_speaker_ids: HashMap::new(),
        created_at: now,
        updated_at: now,
    };

    let host = PlayerEntity {
        id: Uuid::new_v4(),
        game_id: game.id,
        team_id: None,
        name: host_name,
        is_host: true,
        joined_at: now,
    };

    store.save_game(game.clone()).await?;
    store.save_player(host.clone()).await?;

    info!(game_id = %game.id, code = %code, "created game");

    Ok(GameJoinedResponse {
        game: game.into(),
        player: host.into(),
    })
}

/// Join an open game by its code, creating a player record.
pub async fn join_game(
    state: &SharedState,
    request: JoinGameRequest,
) -> Result<GameJoinedResponse, ServiceError> {
    let store = state.require_game_store().await?;

    let code = codes::normalize(&request.code);
    let Some(game) = store.find_game_by_code(code.clone()).await? else {
        return Err(ServiceError::NotFound(format!(
            "no open game with code `{code}`"
        )));
    };

    if game.state != GameState::Lobby {
        return Err(ServiceError::InvalidTransition(
            "players can only join while the game is in the lobby".into(),
        ));
    }

    let player_name = request.player_name.trim().to_owned();
    if player_name.is_empty() {
        return Err(ServiceError::InvalidInput(
            "player name must not be empty".into(),
        ));
    }

    let player = PlayerEntity {
        id: Uuid::new_v4(),
        game_id: game.id,
        team_id: None,
        name: player_name,
        is_host: false,
        joined_at: store.server_time().await?,
    };
    store.save_player(player.clone()).await?;

    info!(game_id = %game.id, player_id = %player.id, "player joined");

    Ok(GameJoinedResponse {
        game: game.into(),
        player: player.into(),
    })
}

/// Aggregate view of a game with its teams and players.
pub async fn get_overview(state: &SharedState, game_id: Uuid) -> Result<GameOverview, ServiceError> {
    let store = state.require_game_store().await?;
    let game = load_game(&store, game_id).await?;
    let teams = store.list_teams(game_id).await?;
    let players = store.list_players(game_id).await?;

    Ok(GameOverview {
        game: game.into(),
        teams: teams.into_iter().map(Into::into).collect(),
        players: players.into_iter().map(Into::into).collect(),
    })
}

/// Replace the game settings; host-only, lobby-only.
pub async fn update_settings(
    state: &SharedState,
    game_id: Uuid,
    request: UpdateSettingsRequest,
) -> Result<(), ServiceError> {
    let store = state.require_game_store().await?;
    let mut game = load_game(&store, game_id).await?;
    ensure_lobby(&game, "settings can only change while the game is in the lobby")?;

    let requester = load_player(&store, &game, request.requester_id).await?;
    if !requester.is_host {
        return Err(ServiceError::NotOwner(
            "only the host can change settings".into(),
        ));
    }

    game.settings = request.settings.into();
    game.updated_at = store.server_time().await?;
    store.save_game(game).await?;
    Ok(())
}

/// Create a team during the lobby; host-only.
pub async fn create_team(
    state: &SharedState,
    game_id: Uuid,
    request: CreateTeamRequest,
) -> Result<TeamEntity, ServiceError> {
    let store = state.require_game_store().await?;
    let game = load_game(&store, game_id).await?;
    ensure_lobby(&game, "teams can only be created while the game is in the lobby")?;

    let requester = load_player(&store, &game, request.requester_id).await?;
    if !requester.is_host {
        return Err(ServiceError::NotOwner(
            "only the host can create teams".into(),
        ));
    }

    let name = request.name.trim().to_owned();
    if name.is_empty() {
        return Err(ServiceError::InvalidInput(
            "team name must not be empty".into(),
        ));
    }

    let team = TeamEntity {
        id: Uuid::new_v4(),
        game_id,
        name,
        score: 0,
    };
    store.save_team(team.clone()).await?;
    Ok(team)
}

/// Assign a player to a team (or clear the assignment) during the lobby.
/// Players move themselves; the host may move anyone.
pub async fn assign_team(
    state: &SharedState,
    game_id: Uuid,
    player_id: Uuid,
    request: AssignTeamRequest,
) -> Result<PlayerEntity, ServiceError> {
    let store = state.require_game_store().await?;
    let game = load_game(&store, game_id).await?;
    ensure_lobby(&game, "team membership is fixed once the game has started")?;

    let requester = load_player(&store, &game, request.requester_id).await?;
    if requester.id != player_id && !requester.is_host {
        return Err(ServiceError::NotOwner(
            "players can only move themselves unless they are the host".into(),
        ));
    }

    let mut player = load_player(&store, &game, player_id).await?;

    if let Some(team_id) = request.team_id {
        let team = store
            .find_team(team_id)
            .await?
            .filter(|team| team.game_id == game_id)
            .ok_or_else(|| ServiceError::NotFound(format!("team `{team_id}` not found")))?;
        player.team_id = Some(team.id);
    } else {
        player.team_id = None;
    }

    store.save_player(player.clone()).await?;
    Ok(player)
}

/// Evaluate the verification gate without starting the game, returning every
/// violated rule for the lobby checklist.
pub async fn start_check(
    state: &SharedState,
    game_id: Uuid,
    requester_id: Uuid,
) -> Result<StartCheckResponse, ServiceError> {
    let store = state.require_game_store().await?;
    let game = load_game(&store, game_id).await?;
    let requester = load_player(&store, &game, requester_id).await?;

    let teams = store.list_teams(game_id).await?;
    let players = store.list_players(game_id).await?;
    let words = store.list_words(game_id).await?;

    let problems = verification::violations(
        &requester,
        &teams,
        &players,
        &words,
        game.settings.word_count_per_person,
    );

    Ok(StartCheckResponse {
        can_start: problems.is_empty(),
        problems,
    })
}

/// Fetch a game or fail with `NotFound`.
pub(crate) async fn load_game(
    store: &Arc<dyn GameStore>,
    game_id: Uuid,
) -> Result<GameEntity, ServiceError> {
    store
        .find_game(game_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("game `{game_id}` not found")))
}

/// Fetch a player belonging to the given game or fail with `NotFound`.
pub(crate) async fn load_player(
    store: &Arc<dyn GameStore>,
    game: &GameEntity,
    player_id: Uuid,
) -> Result<PlayerEntity, ServiceError> {
    store
        .find_player(player_id)
        .await?
        .filter(|player| player.game_id == game.id)
        .ok_or_else(|| ServiceError::NotFound(format!("player `{player_id}` not found")))
}

fn ensure_lobby(game: &GameEntity, message: &str) -> Result<(), ServiceError> {
    if game.state != GameState::Lobby {
        return Err(ServiceError::InvalidTransition(message.into()));
    }
    Ok(())
}

async fn allocate_code(store: &Arc<dyn GameStore>) -> Result<String, ServiceError> {
    for _ in 0..CODE_ALLOCATION_ATTEMPTS {
        let candidate = codes::generate(&mut rand::rng());
        if store.find_game_by_code(candidate.clone()).await?.is_none() {
            return Ok(candidate);
        }
    }
    // With a 31^4 code space this only happens when the store is saturated
    // with open games.
    Err(ServiceError::InvalidInput(
        "could not allocate a free join code".into(),
    ))
}
