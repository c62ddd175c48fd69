/// OpenAPI documentation generation.
pub mod documentation;
/// Lobby operations: games, players, teams, settings.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Team score bookkeeping.
pub mod score_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events streaming service.
pub mod sse_service;
/// Storage connection supervision and degraded-mode tracking.
pub mod storage_supervisor;
/// Round and turn state transitions.
pub mod turn_service;
/// Word pool operations.
pub mod word_service;
