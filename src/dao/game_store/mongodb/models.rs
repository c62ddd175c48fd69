use mongodb::bson::{Binary, DateTime, Document, doc, spec::BinarySubtype};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::dao::models::{
    GameEntity, GameSettings, GameState, LastGuessedWord, PlayerEntity, TeamEntity, TurnSequence,
    TurnState, WordEntity,
};

/// Game record with timestamps widened to BSON datetimes. The speaker map is
/// flattened to entry pairs because BSON map keys must be strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    code: String,
    state: GameState,
    current_round: Option<u8>,
    active_team_id: Option<Uuid>,
    active_player_id: Option<Uuid>,
    turn_order: Vec<Uuid>,
    turn_state: Option<TurnState>,
    turn_start_time: Option<DateTime>,
    turn_sequence: Option<TurnSequence>,
    settings: GameSettings,
    last_guessed_word: Option<MongoLastGuessedWord>,
    #[serde(default)]
    last_speakers: Vec<MongoSpeakerEntry>,
    created_at: DateTime,
    updated_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MongoLastGuessedWord {
    text: String,
    team_id: Uuid,
    timestamp: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MongoSpeakerEntry {
    team_id: Uuid,
    player_id: Uuid,
}

impl From<GameEntity> for MongoGameDocument {
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
            turn_start_time: value.turn_start_time.map(DateTime::from_system_time),
            turn_sequence: value.turn_sequence,
            settings: value.settings,
            last_guessed_word: value.last_guessed_word.map(|word| MongoLastGuessedWord {
                text: word.text,
                team_id: word.team_id,
                timestamp: DateTime::from_system_time(word.timestamp),
            }),
            last_speakers: value
                .last_speaker_ids
                .into_iter()
                .map(|(team_id, player_id)| MongoSpeakerEntry { team_id, player_id })
                .collect(),
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl From<MongoGameDocument> for GameEntity {
    fn from(value: MongoGameDocument) -> Self {
        Self {
            id: value.id,
            code: value.code,
            state: value.state,
            current_round: value.current_round,
            active_team_id: value.active_team_id,
            active_player_id: value.active_player_id,
            turn_order: value.turn_order,
            turn_state: value.turn_state,
            turn_start_time: value.turn_start_time.map(DateTime::to_system_time),
            turn_sequence: value.turn_sequence,
            settings: value.settings,
            last_guessed_word: value.last_guessed_word.map(|word| LastGuessedWord {
                text: word.text,
                team_id: word.team_id,
                timestamp: word.timestamp.to_system_time(),
            }),
            last_speaker_ids: value
                .last_speakers
                .into_iter()
                .map(|entry| (entry.team_id, entry.player_id))
                .collect::<HashMap<_, _>>(),
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoTeamDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    game_id: Uuid,
    name: String,
    score: u32,
}

impl From<TeamEntity> for MongoTeamDocument {
    fn from(value: TeamEntity) -> Self {
        Self {
            id: value.id,
            game_id: value.game_id,
            name: value.name,
            score: value.score,
        }
    }
}

impl From<MongoTeamDocument> for TeamEntity {
    fn from(value: MongoTeamDocument) -> Self {
        Self {
            id: value.id,
            game_id: value.game_id,
            name: value.name,
            score: value.score,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoPlayerDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    game_id: Uuid,
    team_id: Option<Uuid>,
    name: String,
    is_host: bool,
    joined_at: DateTime,
}

impl From<PlayerEntity> for MongoPlayerDocument {
    fn from(value: PlayerEntity) -> Self {
        Self {
            id: value.id,
            game_id: value.game_id,
            team_id: value.team_id,
            name: value.name,
            is_host: value.is_host,
            joined_at: DateTime::from_system_time(value.joined_at),
        }
    }
}

impl From<MongoPlayerDocument> for PlayerEntity {
    fn from(value: MongoPlayerDocument) -> Self {
        Self {
            id: value.id,
            game_id: value.game_id,
            team_id: value.team_id,
            name: value.name,
            is_host: value.is_host,
            joined_at: value.joined_at.to_system_time(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoWordDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    game_id: Uuid,
    text: String,
    submitted_by_player_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    guessed_in_round1: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    guessed_in_round2: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    guessed_in_round3: Option<bool>,
}

impl From<WordEntity> for MongoWordDocument {
    fn from(value: WordEntity) -> Self {
        Self {
            id: value.id,
            game_id: value.game_id,
            text: value.text,
            submitted_by_player_id: value.submitted_by_player_id,
            guessed_in_round1: value.guessed_in_round1,
            guessed_in_round2: value.guessed_in_round2,
            guessed_in_round3: value.guessed_in_round3,
        }
    }
}

impl From<MongoWordDocument> for WordEntity {
    fn from(value: MongoWordDocument) -> Self {
        Self {
            id: value.id,
            game_id: value.game_id,
            text: value.text,
            submitted_by_player_id: value.submitted_by_player_id,
            guessed_in_round1: value.guessed_in_round1,
            guessed_in_round2: value.guessed_in_round2,
            guessed_in_round3: value.guessed_in_round3,
        }
    }
}

pub fn uuid_as_binary(id: Uuid) -> Binary {
    Binary {
        subtype: BinarySubtype::Uuid,
        bytes: id.into_bytes().to_vec(),
    }
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": uuid_as_binary(id)}
}
