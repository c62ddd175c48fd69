use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Fishbowl Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::game::create_game,
        crate::routes::game::join_game,
        crate::routes::game::get_game,
        crate::routes::game::update_settings,
        crate::routes::game::create_team,
        crate::routes::game::assign_team,
        crate::routes::game::start_check,
        crate::routes::word::submit_word,
        crate::routes::word::remove_word,
        crate::routes::word::player_words,
        crate::routes::word::word_counts,
        crate::routes::turn::start_game,
        crate::routes::turn::start_turn,
        crate::routes::turn::correct_guess,
        crate::routes::turn::skip,
        crate::routes::turn::time_up,
        crate::routes::sse::game_events,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::game::CreateGameRequest,
            crate::dto::game::JoinGameRequest,
            crate::dto::game::CreateTeamRequest,
            crate::dto::game::AssignTeamRequest,
            crate::dto::game::UpdateSettingsRequest,
            crate::dto::game::SettingsInput,
            crate::dto::game::GameSnapshot,
            crate::dto::game::GameOverview,
            crate::dto::game::GameJoinedResponse,
            crate::dto::game::StartCheckResponse,
            crate::dto::game::TeamSummary,
            crate::dto::game::PlayerSummary,
            crate::dto::game::LastGuessedWordView,
            crate::dto::word::SubmitWordRequest,
            crate::dto::word::WordSummary,
            crate::dto::word::WordCard,
            crate::dto::word::WordCountsResponse,
            crate::dto::turn::TurnActionRequest,
            crate::dto::turn::GuessRequest,
            crate::dto::turn::GuessResolution,
            crate::dto::turn::StartGameResponse,
            crate::dto::turn::StartTurnResponse,
            crate::dto::turn::GuessResponse,
            crate::dto::turn::SkipResponse,
            crate::dto::turn::TimeUpResponse,
            crate::dto::sse::Handshake,
            crate::dao::models::GameState,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "game", description = "Lobby operations on games, teams and players"),
        (name = "words", description = "Word pool operations"),
        (name = "turns", description = "Round and turn state machine operations"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
pub struct ApiDoc;
