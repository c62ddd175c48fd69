//! Document shapes stored in CouchDB.
//!
//! Every record type gets its own prefixed document ID so `_all_docs` range
//! queries can enumerate one type at a time; the owning game is kept in the
//! document body.

use std::{collections::HashMap, time::SystemTime};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::dao::{
    game_store::couchdb::error::CouchDaoError,
    models::{
        GameEntity, GameSettings, GameState, LastGuessedWord, PlayerEntity, TeamEntity,
        TurnSequence, TurnState, WordEntity,
    },
};

pub const GAME_PREFIX: &str = "game::";
pub const TEAM_PREFIX: &str = "team::";
pub const PLAYER_PREFIX: &str = "player::";
pub const WORD_PREFIX: &str = "word::";
pub const END_SUFFIX: &str = "\u{ffff}";

#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    #[serde(default)]
    pub doc: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchGameDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub game: GameBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameBody {
    pub code: String,
    pub state: GameState,
    pub current_round: Option<u8>,
    pub active_team_id: Option<Uuid>,
    pub active_player_id: Option<Uuid>,
    pub turn_order: Vec<Uuid>,
    pub turn_state: Option<TurnState>,
    pub turn_start_time: Option<SystemTime>,
    pub turn_sequence: Option<TurnSequence>,
    pub settings: GameSettings,
    pub last_guessed_word: Option<LastGuessedWord>,
    #[serde(default)]
    pub last_speaker_ids: HashMap<Uuid, Uuid>,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

impl From<(GameEntity, Option<String>)> for CouchGameDocument {
    fn from((game, rev): (GameEntity, Option<String>)) -> Self {
        Self {
            id: game_doc_id(game.id),
            rev,
            game: GameBody {
                code: game.code,
                state: game.state,
                current_round: game.current_round,
                active_team_id: game.active_team_id,
                active_player_id: game.active_player_id,
                turn_order: game.turn_order,
                turn_state: game.turn_state,
                turn_start_time: game.turn_start_time,
                turn_sequence: game.turn_sequence,
                settings: game.settings,
                last_guessed_word: game.last_guessed_word,
                last_speaker_ids: game.last_speaker_ids,
                created_at: game.created_at,
                updated_at: game.updated_at,
            },
        }
    }
}

impl TryFrom<CouchGameDocument> for GameEntity {
    type Error = CouchDaoError;

    fn try_from(doc: CouchGameDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: extract_uuid(&doc.id)?,
            code: doc.game.code,
            state: doc.game.state,
            current_round: doc.game.current_round,
            active_team_id: doc.game.active_team_id,
            active_player_id: doc.game.active_player_id,
            turn_order: doc.game.turn_order,
            turn_state: doc.game.turn_state,
            turn_start_time: doc.game.turn_start_time,
            turn_sequence: doc.game.turn_sequence,
            settings: doc.game.settings,
            last_guessed_word: doc.game.last_guessed_word,
            last_speaker_ids: doc.game.last_speaker_ids,
            created_at: doc.game.created_at,
            updated_at: doc.game.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchTeamDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub team: TeamBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamBody {
    pub game_id: Uuid,
    pub name: String,
    pub score: u32,
}

impl From<(TeamEntity, Option<String>)> for CouchTeamDocument {
    fn from((team, rev): (TeamEntity, Option<String>)) -> Self {
        Self {
            id: team_doc_id(team.id),
            rev,
            team: TeamBody {
                game_id: team.game_id,
                name: team.name,
                score: team.score,
            },
        }
    }
}

impl TryFrom<CouchTeamDocument> for TeamEntity {
    type Error = CouchDaoError;

    fn try_from(doc: CouchTeamDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: extract_uuid(&doc.id)?,
            game_id: doc.team.game_id,
            name: doc.team.name,
            score: doc.team.score,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchPlayerDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub player: PlayerBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerBody {
    pub game_id: Uuid,
    pub team_id: Option<Uuid>,
    pub name: String,
    pub is_host: bool,
    pub joined_at: SystemTime,
}

impl From<(PlayerEntity, Option<String>)> for CouchPlayerDocument {
    fn from((player, rev): (PlayerEntity, Option<String>)) -> Self {
        Self {
            id: player_doc_id(player.id),
            rev,
            player: PlayerBody {
                game_id: player.game_id,
                team_id: player.team_id,
                name: player.name,
                is_host: player.is_host,
                joined_at: player.joined_at,
            },
        }
    }
}

impl TryFrom<CouchPlayerDocument> for PlayerEntity {
    type Error = CouchDaoError;

    fn try_from(doc: CouchPlayerDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: extract_uuid(&doc.id)?,
            game_id: doc.player.game_id,
            team_id: doc.player.team_id,
            name: doc.player.name,
            is_host: doc.player.is_host,
            joined_at: doc.player.joined_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchWordDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub word: WordBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordBody {
    pub game_id: Uuid,
    pub text: String,
    pub submitted_by_player_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guessed_in_round1: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guessed_in_round2: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guessed_in_round3: Option<bool>,
}

impl From<(WordEntity, Option<String>)> for CouchWordDocument {
    fn from((word, rev): (WordEntity, Option<String>)) -> Self {
        Self {
            id: word_doc_id(word.id),
            rev,
            word: WordBody {
                game_id: word.game_id,
                text: word.text,
                submitted_by_player_id: word.submitted_by_player_id,
                guessed_in_round1: word.guessed_in_round1,
                guessed_in_round2: word.guessed_in_round2,
                guessed_in_round3: word.guessed_in_round3,
            },
        }
    }
}

impl TryFrom<CouchWordDocument> for WordEntity {
    type Error = CouchDaoError;

    fn try_from(doc: CouchWordDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: extract_uuid(&doc.id)?,
            game_id: doc.word.game_id,
            text: doc.word.text,
            submitted_by_player_id: doc.word.submitted_by_player_id,
            guessed_in_round1: doc.word.guessed_in_round1,
            guessed_in_round2: doc.word.guessed_in_round2,
            guessed_in_round3: doc.word.guessed_in_round3,
        })
    }
}

pub fn game_doc_id(id: Uuid) -> String {
    format!("{}{}", GAME_PREFIX, id)
}

pub fn team_doc_id(id: Uuid) -> String {
    format!("{}{}", TEAM_PREFIX, id)
}

pub fn player_doc_id(id: Uuid) -> String {
    format!("{}{}", PLAYER_PREFIX, id)
}

pub fn word_doc_id(id: Uuid) -> String {
    format!("{}{}", WORD_PREFIX, id)
}

pub fn extract_uuid(doc_id: &str) -> Result<Uuid, CouchDaoError> {
    let (_, id) = doc_id
        .split_once("::")
        .ok_or_else(|| CouchDaoError::InvalidDocId {
            doc_id: doc_id.to_string(),
            kind: "missing separator",
        })?;

    Uuid::parse_str(id).map_err(|_| CouchDaoError::InvalidDocId {
        doc_id: doc_id.to_string(),
        kind: "invalid UUID",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_ids_round_trip_through_extract() {
        let id = Uuid::new_v4();
        assert_eq!(extract_uuid(&game_doc_id(id)).unwrap(), id);
        assert_eq!(extract_uuid(&word_doc_id(id)).unwrap(), id);
    }

    #[test]
    fn malformed_doc_ids_are_rejected() {
        assert!(extract_uuid("no-separator").is_err());
        assert!(extract_uuid("game::not-a-uuid").is_err());
    }
}
