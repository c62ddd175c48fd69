//! Word pool DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::dao::models::WordEntity;

/// Request payload for submitting a word during the lobby.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitWordRequest {
    /// Submitting player.
    pub player_id: Uuid,
    /// Word text; trimmed before storage.
    #[validate(custom(function = "crate::dto::validation::validate_word_text"))]
    pub text: String,
}

/// Query parameters identifying the actor for owner-checked operations.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequesterQuery {
    /// Player issuing the request.
    pub requester_id: Uuid,
}

/// Word projection for its submitter's own list.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WordSummary {
    /// Word identifier.
    pub id: Uuid,
    /// Word text.
    pub text: String,
    /// Submitting player.
    pub submitted_by_player_id: Uuid,
}

impl From<WordEntity> for WordSummary {
    fn from(value: WordEntity) -> Self {
        Self {
            id: value.id,
            text: value.text,
            submitted_by_player_id: value.submitted_by_player_id,
        }
    }
}

/// The card shown to a describer: one unguessed word.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WordCard {
    /// Word identifier, echoed back on guess.
    pub id: Uuid,
    /// Word text.
    pub text: String,
}

impl From<WordEntity> for WordCard {
    fn from(value: WordEntity) -> Self {
        Self {
            id: value.id,
            text: value.text,
        }
    }
}

/// Query parameters for the per-round counters.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RoundQuery {
    /// Round number (1..=3).
    pub round: u8,
}

/// Per-round word-pool progress.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WordCountsResponse {
    /// Round the counters refer to.
    pub round: u8,
    /// Words flagged guessed in that round.
    pub guessed: usize,
    /// All words in the game; rounds never shrink the denominator.
    pub total: usize,
}
