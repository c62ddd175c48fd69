//! Game bootstrap, lobby, and snapshot DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{
        GameEntity, GameSettings, GameState, PlayerEntity, TeamEntity, TurnSequence, TurnState,
    },
    dto::format_system_time,
};

/// Host-chosen rule overrides. Bounds keep a game playable.
#[derive(Debug, Clone, Copy, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsInput {
    /// Words each player must submit (1..=20).
    #[validate(range(min = 1, max = 20))]
    pub word_count_per_person: u32,
    /// Turn length in seconds (10..=600).
    #[validate(range(min = 10, max = 600))]
    pub round_length_seconds: u32,
    /// Skip penalty in seconds (0..=120).
    #[validate(range(max = 120))]
    pub skip_penalty_seconds: u32,
}

impl From<SettingsInput> for GameSettings {
    fn from(value: SettingsInput) -> Self {
        Self {
            word_count_per_person: value.word_count_per_person,
            round_length_seconds: value.round_length_seconds,
            skip_penalty_seconds: value.skip_penalty_seconds,
        }
    }
}

/// Request payload for creating a game.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    /// Display name of the creating player, who becomes the host.
    #[validate(length(min = 1, max = 32))]
    pub host_name: String,
    /// Optional overrides for the configured defaults.
    #[validate(nested)]
    pub settings: Option<SettingsInput>,
}

/// Request payload for joining a game by code.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinGameRequest {
    /// Join code shown by the host; matched case-insensitively.
    #[validate(custom(function = "crate::dto::validation::validate_join_code"))]
    pub code: String,
    /// Display name of the joining player.
    #[validate(length(min = 1, max = 32))]
    pub player_name: String,
}

/// Request payload for creating a team during the lobby.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamRequest {
    /// Player issuing the request; must be the host.
    pub requester_id: Uuid,
    /// Team display name.
    #[validate(length(min = 1, max = 32))]
    pub name: String,
}

/// Request payload for assigning a player to a team during the lobby.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignTeamRequest {
    /// Player issuing the request; the player themselves or the host.
    pub requester_id: Uuid,
    /// Target team, or `None` to leave the current team.
    pub team_id: Option<Uuid>,
}

/// Request payload for updating game settings during the lobby.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    /// Player issuing the request; must be the host.
    pub requester_id: Uuid,
    /// Replacement settings.
    #[validate(nested)]
    pub settings: SettingsInput,
}

/// Team projection returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    /// Team identifier.
    pub id: Uuid,
    /// Team display name.
    pub name: String,
    /// Current score.
    pub score: u32,
}

impl From<TeamEntity> for TeamSummary {
    fn from(value: TeamEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            score: value.score,
        }
    }
}

/// Player projection returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    /// Player identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Assigned team, if any.
    pub team_id: Option<Uuid>,
    /// Whether this player is the host.
    pub is_host: bool,
    /// RFC3339 join timestamp.
    pub joined_at: String,
}

impl From<PlayerEntity> for PlayerSummary {
    fn from(value: PlayerEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            team_id: value.team_id,
            is_host: value.is_host,
            joined_at: format_system_time(value.joined_at),
        }
    }
}

/// Notification projection of the most recent correct guess.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LastGuessedWordView {
    /// Guessed word text.
    pub text: String,
    /// Team that scored.
    pub team_id: Uuid,
    /// RFC3339 timestamp of the guess.
    pub timestamp: String,
}

/// Full game snapshot returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Game identifier.
    pub id: Uuid,
    /// Join code.
    pub code: String,
    /// Lifecycle phase.
    pub state: GameState,
    /// Round in progress.
    pub current_round: Option<u8>,
    /// Team whose turn it is.
    pub active_team_id: Option<Uuid>,
    /// Current describer.
    pub active_player_id: Option<Uuid>,
    /// Shuffled team order fixed at start.
    pub turn_order: Vec<Uuid>,
    /// Turn sub-state.
    pub turn_state: Option<TurnState>,
    /// RFC3339 instant the running turn began.
    pub turn_start_time: Option<String>,
    /// Precomputed turn ordering plus cursor.
    pub turn_sequence: Option<TurnSequence>,
    /// Rule knobs in effect.
    pub settings: GameSettings,
    /// Most recent correct guess.
    pub last_guessed_word: Option<LastGuessedWordView>,
}

impl From<GameEntity> for GameSnapshot {
    fn from(value: GameEntity) -> Self {
        Self {
            id: value.id,
            code: value.code,
            state: value.state,
            current_round: value.current_round,
            active_team_id: value.active_team_id,
            active_player_id: value.active_player_id,
            turn_order: value.turn_order,
            turn_state: value.turn_state,
            turn_start_time: value.turn_start_time.map(format_system_time),
            turn_sequence: value.turn_sequence,
            settings: value.settings,
            last_guessed_word: value.last_guessed_word.map(|last| LastGuessedWordView {
                text: last.text,
                team_id: last.team_id,
                timestamp: format_system_time(last.timestamp),
            }),
        }
    }
}

/// Aggregate lobby/game view: the game plus its teams and players.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameOverview {
    /// The game snapshot.
    pub game: GameSnapshot,
    /// Teams of the game.
    pub teams: Vec<TeamSummary>,
    /// Players of the game.
    pub players: Vec<PlayerSummary>,
}

/// Response to game creation or join: the game plus the caller's player.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameJoinedResponse {
    /// The game snapshot.
    pub game: GameSnapshot,
    /// The player record created for the caller.
    pub player: PlayerSummary,
}

/// Result of evaluating the start verification gate.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartCheckResponse {
    /// Whether the game may start right now.
    pub can_start: bool,
    /// One human-readable diagnostic per violated rule, in rule order.
    pub problems: Vec<String>,
}
