//! Mapping from store change notifications to named SSE payloads.
//!
//! Word texts are never broadcast; until the game starts they are secrets
//! between the submitter and the pool, so word events only carry identifiers.

use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dao::game_store::StoreEvent,
    dto::{
        game::{GameSnapshot, PlayerSummary, TeamSummary},
        sse::ServerEvent,
    },
};

const EVENT_GAME_UPDATED: &str = "game.updated";
const EVENT_TEAM_UPDATED: &str = "team.updated";
const EVENT_PLAYER_UPDATED: &str = "player.updated";
const EVENT_WORD_SUBMITTED: &str = "word.submitted";
const EVENT_WORD_REMOVED: &str = "word.removed";

/// Reference to a word without its text, safe to broadcast to every client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WordRef {
    word_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    submitted_by_player_id: Option<Uuid>,
}

/// Translate a store change into the event sent to SSE subscribers.
/// Returns `None` when the payload fails to serialize, which is logged and
/// dropped rather than tearing the stream down.
pub fn from_store_event(event: StoreEvent) -> Option<ServerEvent> {
    let result = match event {
        StoreEvent::Game(game) => {
            ServerEvent::json(EVENT_GAME_UPDATED.to_string(), &GameSnapshot::from(game))
        }
        StoreEvent::Team(team) => {
            ServerEvent::json(EVENT_TEAM_UPDATED.to_string(), &TeamSummary::from(team))
        }
        StoreEvent::Player(player) => ServerEvent::json(
            EVENT_PLAYER_UPDATED.to_string(),
            &PlayerSummary::from(player),
        ),
        StoreEvent::Word(word) => ServerEvent::json(
            EVENT_WORD_SUBMITTED.to_string(),
            &WordRef {
                word_id: word.id,
                submitted_by_player_id: Some(word.submitted_by_player_id),
            },
        ),
        StoreEvent::WordRemoved { word_id } => ServerEvent::json(
            EVENT_WORD_REMOVED.to_string(),
            &WordRef {
                word_id,
                submitted_by_player_id: None,
            },
        ),
    };

    match result {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(error = %err, "failed to serialize SSE payload");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::{GameEntity, GameSettings, GameState, WordEntity};
    use std::{collections::HashMap, time::SystemTime};

    fn game() -> GameEntity {
        GameEntity {
            id: Uuid::new_v4(),
            code: "ABCD".into(),
            state: GameState::Lobby,
            current_round: None,
            active_team_id: None,
            active_player_id: None,
            turn_order: Vec::new(),
            turn_state: None,
            turn_start_time: None,
            turn_sequence: None,
            settings: GameSettings {
                word_count_per_person: 5,
                round_length_seconds: 60,
                skip_penalty_seconds: 10,
            },
            last_guessed_word: None,
            last_speaker_ids: HashMap::new(),
            created_at: SystemTime::UNIX_EPOCH,
            updated_at: SystemTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn game_writes_map_to_named_snapshot_events() {
        let event = from_store_event(StoreEvent::Game(game())).unwrap();
        assert_eq!(event.event.as_deref(), Some("game.updated"));
        assert!(event.data.contains("\"state\":\"lobby\""));
    }

    #[test]
    fn word_events_never_carry_the_text() {
        let player_id = Uuid::new_v4();
        let word = WordEntity {
            id: Uuid::new_v4(),
            game_id: Uuid::new_v4(),
            text: "top secret".into(),
            submitted_by_player_id: player_id,
            guessed_in_round1: None,
            guessed_in_round2: None,
            guessed_in_round3: None,
        };
        let event = from_store_event(StoreEvent::Word(word)).unwrap();
        assert_eq!(event.event.as_deref(), Some("word.submitted"));
        assert!(!event.data.contains("top secret"));
        assert!(event.data.contains(&player_id.to_string()));
    }

    #[test]
    fn removals_only_reference_the_word_id() {
        let word_id = Uuid::new_v4();
        let event = from_store_event(StoreEvent::WordRemoved { word_id }).unwrap();
        assert_eq!(event.event.as_deref(), Some("word.removed"));
        assert!(event.data.contains(&word_id.to_string()));
        assert!(!event.data.contains("submittedByPlayerId"));
    }
}
