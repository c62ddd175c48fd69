//! Turn and round action DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::{game::GameSnapshot, word::WordCard};

/// Request payload naming the acting player for turn operations.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TurnActionRequest {
    /// Player issuing the request.
    pub requester_id: Uuid,
}

/// Request payload for reporting a correct guess.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GuessRequest {
    /// Player issuing the request; any player observing the turn may report.
    pub requester_id: Uuid,
    /// The word that was on the describer's card.
    pub word_id: Uuid,
}

/// Response to StartGame.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartGameResponse {
    /// The game after entering round 1.
    pub game: GameSnapshot,
}

/// Response to StartTurn: the ticking game plus the describer's first card.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartTurnResponse {
    /// The game with its turn now active.
    pub game: GameSnapshot,
    /// First word for the describer; `None` never happens for a legal start
    /// because an exhausted pool advances the round instead.
    pub word: Option<WordCard>,
    /// Seconds left in the turn, derived from server time.
    pub remaining_seconds: u64,
}

/// How a correct guess resolved.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum GuessResolution {
    /// Pool still has words; same describer continues with `next_word`.
    Continued,
    /// Pool exhausted; the game moved to the next round.
    RoundAdvanced,
    /// Pool of round 3 exhausted; the game is finished.
    Finished,
}

/// Response to CorrectGuess.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GuessResponse {
    /// What the guess did to the game.
    pub resolution: GuessResolution,
    /// Next card for the same describer when the turn continues.
    pub next_word: Option<WordCard>,
    /// The game after the guess.
    pub game: GameSnapshot,
}

/// Response to Skip.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SkipResponse {
    /// False when the skip was folded into a time-up and the turn rotated.
    pub penalized: bool,
    /// Replacement card for the same describer when the turn continues.
    pub next_word: Option<WordCard>,
    /// Seconds left after the penalty, derived from server time.
    pub remaining_seconds: u64,
    /// The game after the skip.
    pub game: GameSnapshot,
}

/// Response to TimeUp.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeUpResponse {
    /// The game with the next turn queued, paused.
    pub game: GameSnapshot,
}
