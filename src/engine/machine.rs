//! Round/turn state machine.
//!
//! Pure transition functions over a [`GameEntity`] snapshot. Services read a
//! fresh snapshot from the store, apply a transition here, and write the
//! result back only when it succeeded (validate-then-write); a rejected
//! transition never leaves a partially updated record behind.

use std::time::SystemTime;

use thiserror::Error;

use crate::dao::models::{
    GameEntity, GameState, LastGuessedWord, TurnRef, TurnSequence, TurnState,
};
use crate::engine::clock;

/// Events that drive the round/turn state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnEvent {
    /// Host starts the game from the lobby.
    StartGame,
    /// The describer starts their turn timer.
    StartTurn,
    /// The describer's team guessed the current word.
    CorrectGuess,
    /// The describer skips the current word.
    Skip,
    /// A client observed the turn timer reaching zero.
    TimeUp,
    /// The game ends after the last round.
    EndGame,
}

/// Error returned when an event cannot be applied to the current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {state:?} (turn {turn_state:?})")]
pub struct InvalidTransition {
    /// Game state when the invalid event arrived.
    pub state: GameState,
    /// Turn sub-state when the invalid event arrived.
    pub turn_state: Option<TurnState>,
    /// The rejected event.
    pub event: TurnEvent,
}

/// What a correct guess did to the game beyond marking the word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    /// Words remain in the round pool; the same describer continues.
    Continue,
    /// The round pool is exhausted; the game advanced to this round.
    RoundAdvanced(u8),
    /// The pool of round 3 is exhausted; the game is finished.
    Finished,
}

/// Resolution of a skip request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipOutcome {
    /// The penalty was applied; the same describer continues.
    Penalized,
    /// No time would remain after the penalty; treated as time-up and the
    /// turn advanced.
    TurnAdvanced,
}

fn reject(game: &GameEntity, event: TurnEvent) -> InvalidTransition {
    InvalidTransition {
        state: game.state,
        turn_state: game.turn_state,
        event,
    }
}

/// Leave the lobby with a freshly generated turn sequence (StartGame).
///
/// Preconditions beyond the lobby state are the verification gate's job and
/// must be re-derived from the store by the caller immediately before this.
pub fn start_game(
    game: &mut GameEntity,
    turn_order: Vec<uuid::Uuid>,
    turns: Vec<TurnRef>,
) -> Result<(), InvalidTransition> {
    if game.state != GameState::Lobby {
        return Err(reject(game, TurnEvent::StartGame));
    }

    let sequence = TurnSequence {
        turns,
        current_index: 0,
    };
    let first = sequence.current();

    game.state = GameState::Round1;
    game.current_round = Some(1);
    game.turn_order = turn_order;
    game.active_team_id = first.map(|turn| turn.team_id);
    game.active_player_id = first.map(|turn| turn.player_id);
    game.turn_sequence = Some(sequence);
    game.turn_state = Some(TurnState::Paused);
    game.turn_start_time = None;
    Ok(())
}

/// Begin the paused turn's timer at the given server instant (StartTurn).
pub fn start_turn(game: &mut GameEntity, now: SystemTime) -> Result<(), InvalidTransition> {
    if !game.state.is_round() || game.turn_state != Some(TurnState::Paused) {
        return Err(reject(game, TurnEvent::StartTurn));
    }

    game.turn_state = Some(TurnState::Active);
    game.turn_start_time = Some(now);
    Ok(())
}

/// Record a correct guess on the game record (CorrectGuess).
///
/// The caller has already flagged the word and bumped the team score;
/// `pool_exhausted` reflects the round pool after that flag. Within a
/// still-active pool the turn does not rotate; the same describer pulls the
/// next word.
pub fn correct_guess(
    game: &mut GameEntity,
    guessed: LastGuessedWord,
    pool_exhausted: bool,
) -> Result<GuessOutcome, InvalidTransition> {
    if !game.state.is_round() || game.turn_state != Some(TurnState::Active) {
        return Err(reject(game, TurnEvent::CorrectGuess));
    }

    game.last_guessed_word = Some(guessed);

    if !pool_exhausted {
        return Ok(GuessOutcome::Continue);
    }

    match game.current_round {
        Some(round) if round < 3 => {
            advance_round(game);
            Ok(GuessOutcome::RoundAdvanced(round + 1))
        }
        _ => {
            end_game(game);
            Ok(GuessOutcome::Finished)
        }
    }
}

/// Skip the current word (Skip), or fold into TimeUp when no time would
/// remain after the penalty.
pub fn skip(game: &mut GameEntity, now: SystemTime) -> Result<SkipOutcome, InvalidTransition> {
    if !game.state.is_round() || game.turn_state != Some(TurnState::Active) {
        return Err(reject(game, TurnEvent::Skip));
    }
    let Some(started) = game.turn_start_time else {
        return Err(reject(game, TurnEvent::Skip));
    };

    let remaining = clock::remaining_seconds(game.settings.round_length_seconds, started, now);
    if remaining <= u64::from(game.settings.skip_penalty_seconds) {
        record_last_speaker(game);
        advance_turn(game);
        return Ok(SkipOutcome::TurnAdvanced);
    }

    game.turn_start_time = Some(clock::penalized_start(
        started,
        game.settings.skip_penalty_seconds,
    ));
    Ok(SkipOutcome::Penalized)
}

/// A client reported the timer reaching zero (TimeUp): remember the finishing
/// describer and rotate to the next turn, paused.
pub fn time_up(game: &mut GameEntity) -> Result<(), InvalidTransition> {
    if !game.state.is_round() || game.turn_state != Some(TurnState::Active) {
        return Err(reject(game, TurnEvent::TimeUp));
    }

    record_last_speaker(game);
    advance_turn(game);
    Ok(())
}

/// Move the cursor one turn forward and pause, syncing the active pair.
fn advance_turn(game: &mut GameEntity) {
    if let Some(sequence) = game.turn_sequence.as_mut() {
        sequence.advance();
    }
    sync_active_pair(game);
    game.turn_state = Some(TurnState::Paused);
    game.turn_start_time = None;
}

/// Enter the next round. The cursor also advances one turn so the new round
/// opens with a fresh describer rather than repeating the last one.
fn advance_round(game: &mut GameEntity) {
    let next = game.current_round.unwrap_or(0) + 1;
    game.current_round = Some(next);
    if let Some(state) = GameState::for_round(next) {
        game.state = state;
    }
    if let Some(sequence) = game.turn_sequence.as_mut() {
        sequence.advance();
    }
    sync_active_pair(game);
    game.turn_state = Some(TurnState::Paused);
    game.turn_start_time = None;
}

/// Finish the game. The active pair is left as-is, informational only.
fn end_game(game: &mut GameEntity) {
    game.state = GameState::Finished;
    game.turn_state = None;
    game.turn_start_time = None;
}

fn sync_active_pair(game: &mut GameEntity) {
    let current = game.current_turn();
    game.active_team_id = current.map(|turn| turn.team_id);
    game.active_player_id = current.map(|turn| turn.player_id);
}

fn record_last_speaker(game: &mut GameEntity) {
    if let (Some(team_id), Some(player_id)) = (game.active_team_id, game.active_player_id) {
        game.last_speaker_ids.insert(team_id, player_id);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use uuid::Uuid;

    use crate::dao::models::GameSettings;

    use super::*;

    fn sequence_of(pairs: &[(Uuid, Uuid)]) -> Vec<TurnRef> {
        pairs
            .iter()
            .map(|&(team_id, player_id)| TurnRef { team_id, player_id })
            .collect()
    }

    fn lobby_game() -> GameEntity {
        GameEntity {
            id: Uuid::new_v4(),
            code: "AB2C".into(),
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

    fn started_game() -> (GameEntity, Vec<(Uuid, Uuid)>) {
        let team_a = Uuid::new_v4();
        let team_b = Uuid::new_v4();
        let pairs = vec![
            (team_a, Uuid::new_v4()),
            (team_b, Uuid::new_v4()),
            (team_a, Uuid::new_v4()),
            (team_b, Uuid::new_v4()),
        ];
        let mut game = lobby_game();
        start_game(&mut game, vec![team_a, team_b], sequence_of(&pairs)).unwrap();
        (game, pairs)
    }

    fn guessed(team_id: Uuid) -> LastGuessedWord {
        LastGuessedWord {
            text: "yeti".into(),
            team_id,
            timestamp: SystemTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn start_game_enters_round_one_paused() {
        let (game, pairs) = started_game();
        assert_eq!(game.state, GameState::Round1);
        assert_eq!(game.current_round, Some(1));
        assert_eq!(game.turn_state, Some(TurnState::Paused));
        assert_eq!(game.turn_start_time, None);
        assert_eq!(game.active_team_id, Some(pairs[0].0));
        assert_eq!(game.active_player_id, Some(pairs[0].1));
    }

    #[test]
    fn start_game_twice_is_rejected() {
        let (mut game, _) = started_game();
        let err = start_game(&mut game, Vec::new(), Vec::new()).unwrap_err();
        assert_eq!(err.event, TurnEvent::StartGame);
        assert_eq!(err.state, GameState::Round1);
    }

    #[test]
    fn start_turn_requires_paused_round() {
        let mut game = lobby_game();
        assert!(start_turn(&mut game, SystemTime::now()).is_err());

        let (mut game, _) = started_game();
        let now = SystemTime::now();
        start_turn(&mut game, now).unwrap();
        assert_eq!(game.turn_state, Some(TurnState::Active));
        assert_eq!(game.turn_start_time, Some(now));

        // Already active.
        assert!(start_turn(&mut game, now).is_err());
    }

    #[test]
    fn guess_with_words_left_keeps_the_turn() {
        let (mut game, pairs) = started_game();
        start_turn(&mut game, SystemTime::now()).unwrap();

        let outcome = correct_guess(&mut game, guessed(pairs[0].0), false).unwrap();
        assert_eq!(outcome, GuessOutcome::Continue);
        assert_eq!(game.state, GameState::Round1);
        assert_eq!(game.turn_state, Some(TurnState::Active));
        assert_eq!(game.active_player_id, Some(pairs[0].1));
        assert_eq!(game.last_guessed_word.as_ref().unwrap().text, "yeti");
    }

    #[test]
    fn exhausting_an_early_round_advances_to_the_next() {
        let (mut game, pairs) = started_game();
        start_turn(&mut game, SystemTime::now()).unwrap();

        let outcome = correct_guess(&mut game, guessed(pairs[0].0), true).unwrap();
        assert_eq!(outcome, GuessOutcome::RoundAdvanced(2));
        assert_eq!(game.state, GameState::Round2);
        assert_eq!(game.current_round, Some(2));
        assert_eq!(game.turn_state, Some(TurnState::Paused));
        assert_eq!(game.turn_start_time, None);
        // New round opens on the next turn, not the same describer.
        assert_eq!(game.active_player_id, Some(pairs[1].1));
    }

    #[test]
    fn exhausting_round_three_finishes_the_game() {
        let (mut game, pairs) = started_game();
        game.state = GameState::Round3;
        game.current_round = Some(3);
        start_turn(&mut game, SystemTime::now()).unwrap();

        let outcome = correct_guess(&mut game, guessed(pairs[0].0), true).unwrap();
        assert_eq!(outcome, GuessOutcome::Finished);
        assert_eq!(game.state, GameState::Finished);
        // Active pair is retained, informational only.
        assert_eq!(game.active_team_id, Some(pairs[0].0));
        assert_eq!(game.active_player_id, Some(pairs[0].1));
        assert_eq!(game.turn_state, None);
    }

    #[test]
    fn skip_with_plenty_of_time_shifts_the_start_back() {
        let (mut game, pairs) = started_game();
        let start = SystemTime::now();
        start_turn(&mut game, start).unwrap();

        let now = start + Duration::from_secs(5);
        let outcome = skip(&mut game, now).unwrap();
        assert_eq!(outcome, SkipOutcome::Penalized);
        assert_eq!(game.turn_start_time, Some(start - Duration::from_secs(10)));
        assert_eq!(game.active_player_id, Some(pairs[0].1));
        assert_eq!(game.turn_state, Some(TurnState::Active));
    }

    #[test]
    fn skip_near_the_buzzer_behaves_like_time_up() {
        let (mut game, pairs) = started_game();
        let start = SystemTime::now();
        start_turn(&mut game, start).unwrap();

        // 55s elapsed of 60s leaves 5s, less than the 10s penalty.
        let now = start + Duration::from_secs(55);
        let outcome = skip(&mut game, now).unwrap();
        assert_eq!(outcome, SkipOutcome::TurnAdvanced);
        assert_eq!(game.turn_state, Some(TurnState::Paused));
        assert_eq!(game.turn_start_time, None);
        assert_eq!(game.active_team_id, Some(pairs[1].0));
        assert_eq!(game.active_player_id, Some(pairs[1].1));
        // Finishing describer is remembered for their team.
        assert_eq!(game.last_speaker_ids.get(&pairs[0].0), Some(&pairs[0].1));
    }

    #[test]
    fn time_up_rotates_and_pauses() {
        let (mut game, pairs) = started_game();
        start_turn(&mut game, SystemTime::now()).unwrap();

        time_up(&mut game).unwrap();
        assert_eq!(game.turn_state, Some(TurnState::Paused));
        assert_eq!(game.turn_start_time, None);
        assert_eq!(game.active_team_id, Some(pairs[1].0));
        assert_eq!(game.active_player_id, Some(pairs[1].1));
    }

    #[test]
    fn time_up_while_paused_is_rejected() {
        let (mut game, _) = started_game();
        let err = time_up(&mut game).unwrap_err();
        assert_eq!(err.event, TurnEvent::TimeUp);
        assert_eq!(err.turn_state, Some(TurnState::Paused));
    }

    #[test]
    fn cursor_wraps_past_the_sequence_end() {
        let (mut game, pairs) = started_game();
        for _ in 0..pairs.len() {
            start_turn(&mut game, SystemTime::now()).unwrap();
            time_up(&mut game).unwrap();
        }
        // One full rotation lands back on the opening pair.
        assert_eq!(game.active_team_id, Some(pairs[0].0));
        assert_eq!(game.active_player_id, Some(pairs[0].1));
        assert_eq!(
            game.turn_sequence.as_ref().unwrap().current_index,
            0
        );
    }

    #[test]
    fn guesses_are_rejected_while_paused() {
        let (mut game, pairs) = started_game();
        let err = correct_guess(&mut game, guessed(pairs[0].0), false).unwrap_err();
        assert_eq!(err.event, TurnEvent::CorrectGuess);
    }
}
