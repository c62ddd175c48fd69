//! Round/turn orchestration: StartGame with its verification gate, the
//! describer's turn timer, guesses, skips, and time-up reports.
//!
//! Every transition follows the same shape: read fresh records, apply the
//! pure state machine to the in-memory snapshot, and persist only when the
//! transition was accepted. A rejected operation writes nothing.

use indexmap::IndexMap;
use tracing::info;
use uuid::Uuid;

use crate::{
    dao::models::LastGuessedWord,
    dto::turn::{
        GuessRequest, GuessResolution, GuessResponse, SkipResponse, StartGameResponse,
        StartTurnResponse, TimeUpResponse,
    },
    engine::{
        clock,
        machine::{self, GuessOutcome, SkipOutcome},
        sequencer, verification,
    },
    error::ServiceError,
    services::{
        game_service::{load_game, load_player},
        score_service, word_service,
    },
    state::SharedState,
};

/// Leave the lobby: re-derive the verification gate from fresh reads,
/// generate the turn sequence, and enter round 1 paused.
pub async fn start_game(
    state: &SharedState,
    game_id: Uuid,
    requester_id: Uuid,
) -> Result<StartGameResponse, ServiceError> {
    let store = state.require_game_store().await?;
    let mut game = load_game(&store, game_id).await?;
    let requester = load_player(&store, &game, requester_id).await?;

    // The gate is evaluated against the store at transition time; a client's
    // cached "can start" is worthless once membership has changed.
    let teams = store.list_teams(game_id).await?;
    let players = store.list_players(game_id).await?;
    let words = store.list_words(game_id).await?;

    let problems = verification::violations(
        &requester,
        &teams,
        &players,
        &words,
        game.settings.word_count_per_person,
    );
    if !problems.is_empty() {
        return Err(ServiceError::PreconditionFailed(problems));
    }

    let mut rosters: IndexMap<Uuid, Vec<Uuid>> =
        teams.iter().map(|team| (team.id, Vec::new())).collect();
    for player in &players {
        if let Some(team_id) = player.team_id
            && let Some(roster) = rosters.get_mut(&team_id)
        {
            roster.push(player.id);
        }
    }

    let turns = sequencer::generate(&rosters, &mut rand::rng());
    let mut turn_order = Vec::with_capacity(rosters.len());
    for turn in &turns {
        if !turn_order.contains(&turn.team_id) {
            turn_order.push(turn.team_id);
        }
    }

    machine::start_game(&mut game, turn_order, turns)?;
    game.updated_at = store.server_time().await?;
    store.save_game(game.clone()).await?;

    info!(game_id = %game.id, "game started");
    Ok(StartGameResponse { game: game.into() })
}

/// Start the paused turn's timer; only the current describer may do this.
pub async fn start_turn(
    state: &SharedState,
    game_id: Uuid,
    requester_id: Uuid,
) -> Result<StartTurnResponse, ServiceError> {
    let store = state.require_game_store().await?;
    let mut game = load_game(&store, game_id).await?;

    if game.active_player_id != Some(requester_id) {
        return Err(ServiceError::NotOwner(
            "only the current describer can start the turn".into(),
        ));
    }

    let now = store.server_time().await?;
    machine::start_turn(&mut game, now)?;
    game.updated_at = now;
    store.save_game(game.clone()).await?;

    let round = game.current_round.unwrap_or(1);
    let word = word_service::pick_random_unguessed(&store, game_id, round).await?;

    Ok(StartTurnResponse {
        remaining_seconds: u64::from(game.settings.round_length_seconds),
        word: word.map(Into::into),
        game: game.into(),
    })
}

/// Record a correct guess: flag the word for the round, credit the team,
/// publish the notification payload, and either continue the turn, open the
/// next round, or finish the game when the pool ran dry.
pub async fn correct_guess(
    state: &SharedState,
    game_id: Uuid,
    request: GuessRequest,
) -> Result<GuessResponse, ServiceError> {
    let store = state.require_game_store().await?;
    let mut game = load_game(&store, game_id).await?;
    load_player(&store, &game, request.requester_id).await?;

    let round = game.current_round.ok_or_else(|| {
        ServiceError::InvalidTransition("no round is in progress".into())
    })?;
    let team_id = game.active_team_id.ok_or_else(|| {
        ServiceError::InvalidTransition("no team is currently active".into())
    })?;

    let mut word = store
        .find_word(request.word_id)
        .await?
        .filter(|word| word.game_id == game_id)
        .ok_or_else(|| {
            ServiceError::NotFound(format!("word `{}` not found", request.word_id))
        })?;

    // A word is guessed at most once per round; a duplicate report of the
    // same event would otherwise inflate the score.
    if word.guessed_in(round) {
        return Err(ServiceError::InvalidTransition(
            "word was already guessed in this round".into(),
        ));
    }

    let words = store.list_words(game_id).await?;
    let pool_exhausted = words
        .iter()
        .filter(|other| other.id != word.id)
        .all(|other| other.guessed_in(round));

    let now = store.server_time().await?;
    let guessed = LastGuessedWord {
        text: word.text.clone(),
        team_id,
        timestamp: now,
    };

    // Validate the transition on the snapshot before any write.
    let outcome = machine::correct_guess(&mut game, guessed, pool_exhausted)?;

    word.mark_guessed(round);
    store.save_word(word).await?;
    score_service::add_points(&store, game_id, team_id, 1).await?;

    game.updated_at = now;
    store.save_game(game.clone()).await?;

    let (resolution, next_word) = match outcome {
        GuessOutcome::Continue => {
            let next = word_service::pick_random_unguessed(&store, game_id, round).await?;
            (GuessResolution::Continued, next.map(Into::into))
        }
        GuessOutcome::RoundAdvanced(next_round) => {
            info!(game_id = %game.id, round = next_round, "round advanced");
            (GuessResolution::RoundAdvanced, None)
        }
        GuessOutcome::Finished => {
            info!(game_id = %game.id, "game finished");
            (GuessResolution::Finished, None)
        }
    };

    Ok(GuessResponse {
        resolution,
        next_word,
        game: game.into(),
    })
}

/// Skip the current word, paying the penalty; folds into a time-up when no
/// time would remain afterwards.
pub async fn skip(
    state: &SharedState,
    game_id: Uuid,
    requester_id: Uuid,
) -> Result<SkipResponse, ServiceError> {
    let store = state.require_game_store().await?;
    let mut game = load_game(&store, game_id).await?;

    if game.active_player_id != Some(requester_id) {
        return Err(ServiceError::NotOwner(
            "only the current describer can skip".into(),
        ));
    }

    let now = store.server_time().await?;
    let outcome = machine::skip(&mut game, now)?;
    game.updated_at = now;
    store.save_game(game.clone()).await?;

    match outcome {
        SkipOutcome::Penalized => {
            let round = game.current_round.unwrap_or(1);
            let next = word_service::pick_random_unguessed(&store, game_id, round).await?;
            let remaining = game
                .turn_start_time
                .map(|started| {
                    clock::remaining_seconds(game.settings.round_length_seconds, started, now)
                })
                .unwrap_or(0);
            Ok(SkipResponse {
                penalized: true,
                next_word: next.map(Into::into),
                remaining_seconds: remaining,
                game: game.into(),
            })
        }
        SkipOutcome::TurnAdvanced => Ok(SkipResponse {
            penalized: false,
            next_word: None,
            remaining_seconds: 0,
            game: game.into(),
        }),
    }
}

/// A client observed the turn timer reaching zero: rotate to the next turn.
/// A duplicate report arrives after the turn already paused and is rejected
/// by the state machine rather than advancing twice.
pub async fn time_up(
    state: &SharedState,
    game_id: Uuid,
    requester_id: Uuid,
) -> Result<TimeUpResponse, ServiceError> {
    let store = state.require_game_store().await?;
    let mut game = load_game(&store, game_id).await?;
    load_player(&store, &game, requester_id).await?;

    machine::time_up(&mut game)?;
    game.updated_at = store.server_time().await?;
    store.save_game(game.clone()).await?;

    Ok(TimeUpResponse { game: game.into() })
}
