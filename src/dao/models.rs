//! Persisted record shapes shared by every storage adapter.
//!
//! Field names are contractual: browser clients read these records straight
//! from the store, so the serialized form uses the camelCase names they
//! expect regardless of the backend.

use serde::{Deserialize, Serialize};
use std::{collections::HashMap, time::SystemTime};
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle phase of a game, strictly forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GameState {
    /// Players are joining, forming teams, and submitting words.
    Lobby,
    /// First round: describe the word freely.
    Round1,
    /// Second round: act the word out.
    Round2,
    /// Third round: a single-word clue.
    Round3,
    /// All rounds complete; scores are final.
    Finished,
}

impl GameState {
    /// The state label for a given round number (1..=3).
    pub fn for_round(round: u8) -> Option<Self> {
        match round {
            1 => Some(GameState::Round1),
            2 => Some(GameState::Round2),
            3 => Some(GameState::Round3),
            _ => None,
        }
    }

    /// Round number when the game is inside a round.
    pub fn round_number(self) -> Option<u8> {
        match self {
            GameState::Round1 => Some(1),
            GameState::Round2 => Some(2),
            GameState::Round3 => Some(3),
            _ => None,
        }
    }

    /// Whether this state is one of the three playing rounds.
    pub fn is_round(self) -> bool {
        self.round_number().is_some()
    }
}

/// Whether the current turn's timer is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TurnState {
    /// Waiting for the describer to start their timer.
    Paused,
    /// Timer running; guesses and skips are legal.
    Active,
}

/// One scheduled turn: which team is up and which of its players describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TurnRef {
    /// Team whose turn it is.
    pub team_id: Uuid,
    /// Player on that team acting as describer.
    pub player_id: Uuid,
}

/// The full precomputed turn ordering plus the consumption cursor.
///
/// The `turns` list is generated once at game start and never mutated
/// afterwards; only `current_index` moves, wrapping modulo the length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TurnSequence {
    /// Immutable ordered list of (team, player) turns.
    pub turns: Vec<TurnRef>,
    /// Cursor into `turns` identifying the current turn.
    pub current_index: usize,
}

impl TurnSequence {
    /// The turn the cursor currently points at.
    pub fn current(&self) -> Option<TurnRef> {
        self.turns.get(self.current_index).copied()
    }

    /// Move the cursor forward by one, wrapping at the end.
    pub fn advance(&mut self) {
        if !self.turns.is_empty() {
            self.current_index = (self.current_index + 1) % self.turns.len();
        }
    }
}

/// Per-game rule knobs fixed by the host during the lobby.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    /// Number of words every player must submit before the game can start.
    pub word_count_per_person: u32,
    /// Length of one turn in seconds.
    pub round_length_seconds: u32,
    /// Seconds deducted from the running turn when the describer skips.
    pub skip_penalty_seconds: u32,
}

/// Denormalized notification payload describing the most recent correct guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastGuessedWord {
    /// Text of the guessed word.
    pub text: String,
    /// Team that scored the guess.
    pub team_id: Uuid,
    /// Server time at which the guess was recorded.
    pub timestamp: SystemTime,
}

/// Aggregate game record, the single source of truth for "whose turn it is".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEntity {
    /// Primary key of the game.
    pub id: Uuid,
    /// Four-character join code, unique among non-finished games.
    pub code: String,
    /// Lifecycle phase.
    pub state: GameState,
    /// Round in progress (1..=3), `None` in lobby and after finishing.
    pub current_round: Option<u8>,
    /// Team whose turn it is once the game has left the lobby.
    pub active_team_id: Option<Uuid>,
    /// Current describer, consistent with `turn_sequence` past the lobby.
    pub active_player_id: Option<Uuid>,
    /// Shuffled team order fixed at game start.
    pub turn_order: Vec<Uuid>,
    /// Sub-state of the current turn, `None` outside rounds.
    pub turn_state: Option<TurnState>,
    /// Server instant the running turn's timer began, `None` while paused.
    pub turn_start_time: Option<SystemTime>,
    /// Precomputed (team, player) ordering plus cursor.
    pub turn_sequence: Option<TurnSequence>,
    /// Rule knobs chosen by the host.
    pub settings: GameSettings,
    /// Notification payload for the most recent correct guess.
    pub last_guessed_word: Option<LastGuessedWord>,
    /// Last describer per team, informational only.
    #[serde(default)]
    pub last_speaker_ids: HashMap<Uuid, Uuid>,
    /// Creation timestamp for auditing/debugging.
    pub created_at: SystemTime,
    /// Last time the game record was updated.
    pub updated_at: SystemTime,
}

impl GameEntity {
    /// The turn the sequence cursor points at, if a sequence exists.
    pub fn current_turn(&self) -> Option<TurnRef> {
        self.turn_sequence.as_ref().and_then(TurnSequence::current)
    }
}

/// Team record; belongs to exactly one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamEntity {
    /// Primary key of the team.
    pub id: Uuid,
    /// Owning game.
    pub game_id: Uuid,
    /// Display name chosen by the host.
    pub name: String,
    /// Current score, non-negative and non-decreasing during a game.
    pub score: u32,
}

/// Player record; belongs to one game, optionally to one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerEntity {
    /// Primary key of the player.
    pub id: Uuid,
    /// Owning game.
    pub game_id: Uuid,
    /// Team the player is assigned to, settled during the lobby.
    pub team_id: Option<Uuid>,
    /// Display name chosen on join.
    pub name: String,
    /// Exactly one host per game, set at creation and immutable.
    pub is_host: bool,
    /// Server time the player joined.
    pub joined_at: SystemTime,
}

/// Word record submitted by one player during the lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordEntity {
    /// Primary key of the word.
    pub id: Uuid,
    /// Owning game.
    pub game_id: Uuid,
    /// Trimmed word text.
    pub text: String,
    /// Player who submitted the word; only they may remove it.
    pub submitted_by_player_id: Uuid,
    /// Guessed flag for round 1; once true, never reset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guessed_in_round1: Option<bool>,
    /// Guessed flag for round 2; once true, never reset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guessed_in_round2: Option<bool>,
    /// Guessed flag for round 3; once true, never reset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guessed_in_round3: Option<bool>,
}

impl WordEntity {
    /// Whether the word has been guessed in the given round (1..=3).
    pub fn guessed_in(&self, round: u8) -> bool {
        let flag = match round {
            1 => self.guessed_in_round1,
            2 => self.guessed_in_round2,
            3 => self.guessed_in_round3,
            _ => None,
        };
        flag.unwrap_or(false)
    }

    /// Set the guessed flag for the given round. The flag is monotonic; this
    /// never clears an already-set round.
    pub fn mark_guessed(&mut self, round: u8) {
        match round {
            1 => self.guessed_in_round1 = Some(true),
            2 => self.guessed_in_round2 = Some(true),
            3 => self.guessed_in_round3 = Some(true),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_game_uses_contractual_field_names() {
        let game = GameEntity {
            id: Uuid::new_v4(),
            code: "WXYZ".into(),
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
        };

        let value = serde_json::to_value(&game).unwrap();
        assert_eq!(value["state"], "lobby");
        assert!(value.get("currentRound").is_some());
        assert!(value.get("turnStartTime").is_some());
        let settings = &value["settings"];
        assert_eq!(settings["wordCountPerPerson"], 5);
        assert_eq!(settings["roundLengthSeconds"], 60);
        assert_eq!(settings["skipPenaltySeconds"], 10);
    }

    #[test]
    fn word_round_flags_are_independent() {
        let mut word = WordEntity {
            id: Uuid::new_v4(),
            game_id: Uuid::new_v4(),
            text: "penguin".into(),
            submitted_by_player_id: Uuid::new_v4(),
            guessed_in_round1: None,
            guessed_in_round2: None,
            guessed_in_round3: None,
        };

        assert!(!word.guessed_in(1));
        word.mark_guessed(1);
        assert!(word.guessed_in(1));
        assert!(!word.guessed_in(2));
        assert!(!word.guessed_in(3));

        let value = serde_json::to_value(&word).unwrap();
        assert_eq!(value["guessedInRound1"], true);
        assert!(value.get("guessedInRound2").is_none());
    }

    #[test]
    fn turn_sequence_cursor_wraps() {
        let team = Uuid::new_v4();
        let turns: Vec<TurnRef> = (0..3)
            .map(|_| TurnRef {
                team_id: team,
                player_id: Uuid::new_v4(),
            })
            .collect();
        let mut sequence = TurnSequence {
            turns,
            current_index: 2,
        };
        sequence.advance();
        assert_eq!(sequence.current_index, 0);
    }
}
