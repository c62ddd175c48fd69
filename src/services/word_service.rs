//! Word pool management: submission quotas, ownership-checked removal,
//! per-round guessed-state, and random unguessed selection.

use std::sync::Arc;

use rand::seq::IndexedRandom;
use uuid::Uuid;

use crate::{
    dao::{game_store::GameStore, models::{GameState, WordEntity}},
    dto::word::{SubmitWordRequest, WordCountsResponse, WordSummary},
    error::ServiceError,
    services::game_service::{load_game, load_player},
    state::SharedState,
};

/// Submit a word to the game's pool, enforcing the per-player quota.
pub async fn submit(
    state: &SharedState,
    game_id: Uuid,
    request: SubmitWordRequest,
) -> Result<WordSummary, ServiceError> {
    let store = state.require_game_store().await?;
    let game = load_game(&store, game_id).await?;
    if game.state != GameState::Lobby {
        return Err(ServiceError::InvalidTransition(
            "words can only be submitted while the game is in the lobby".into(),
        ));
    }

    let player = load_player(&store, &game, request.player_id).await?;

    let text = request.text.trim().to_owned();
    if text.is_empty() {
        return Err(ServiceError::InvalidInput("word must not be empty".into()));
    }

    let quota = game.settings.word_count_per_person;
    let submitted = store.list_words_by_player(game_id, player.id).await?.len();
    if submitted as u32 >= quota {
        return Err(ServiceError::QuotaExceeded(format!(
            "player already submitted {submitted} of {quota} words"
        )));
    }

    let word = WordEntity {
        id: Uuid::new_v4(),
        game_id,
        text,
        submitted_by_player_id: player.id,
        guessed_in_round1: None,
        guessed_in_round2: None,
        guessed_in_round3: None,
    };
    store.save_word(word.clone()).await?;
    Ok(word.into())
}

/// Remove a word from the pool; only its submitter may do so, and only while
/// the game is still in the lobby.
pub async fn remove(
    state: &SharedState,
    game_id: Uuid,
    word_id: Uuid,
    requester_id: Uuid,
) -> Result<(), ServiceError> {
    let store = state.require_game_store().await?;
    let game = load_game(&store, game_id).await?;

    let word = store
        .find_word(word_id)
        .await?
        .filter(|word| word.game_id == game_id)
        .ok_or_else(|| ServiceError::NotFound(format!("word `{word_id}` not found")))?;

    if word.submitted_by_player_id != requester_id {
        return Err(ServiceError::NotOwner(
            "only the submitter can remove a word".into(),
        ));
    }

    if game.state != GameState::Lobby {
        return Err(ServiceError::InvalidTransition(
            "words cannot be removed once the game has started".into(),
        ));
    }

    store.delete_word(word_id).await?;
    Ok(())
}

/// Words a player has submitted so far.
pub async fn list_by_player(
    state: &SharedState,
    game_id: Uuid,
    player_id: Uuid,
) -> Result<Vec<WordSummary>, ServiceError> {
    let store = state.require_game_store().await?;
    load_game(&store, game_id).await?;
    let words = store.list_words_by_player(game_id, player_id).await?;
    Ok(words.into_iter().map(Into::into).collect())
}

/// Per-round progress counters. `total` is the full pool size; rounds never
/// shrink the denominator.
pub async fn counts_for_round(
    state: &SharedState,
    game_id: Uuid,
    round: u8,
) -> Result<WordCountsResponse, ServiceError> {
    let store = state.require_game_store().await?;
    load_game(&store, game_id).await?;
    ensure_round(round)?;

    let words = store.list_words(game_id).await?;
    let total = words.len();
    let guessed = words.iter().filter(|word| word.guessed_in(round)).count();

    Ok(WordCountsResponse {
        round,
        guessed,
        total,
    })
}

/// Uniformly pick a word not yet guessed in the given round, or `None` when
/// the round pool is exhausted.
pub(crate) async fn pick_random_unguessed(
    store: &Arc<dyn GameStore>,
    game_id: Uuid,
    round: u8,
) -> Result<Option<WordEntity>, ServiceError> {
    ensure_round(round)?;
    let words = store.list_words(game_id).await?;
    let unguessed: Vec<&WordEntity> = words
        .iter()
        .filter(|word| !word.guessed_in(round))
        .collect();
    Ok(unguessed.choose(&mut rand::rng()).map(|word| (*word).clone()))
}

fn ensure_round(round: u8) -> Result<(), ServiceError> {
    if !(1..=3).contains(&round) {
        return Err(ServiceError::InvalidInput(format!(
            "round must be 1..=3, got {round}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{collections::HashMap, time::SystemTime};

    use crate::{
        config::AppConfig,
        dao::{
            game_store::memory::MemoryGameStore,
            models::{GameEntity, GameSettings},
        },
        state::AppState,
    };

    async fn seeded_pool(guessed_round1: usize, total: usize) -> (SharedState, Uuid) {
        let state = AppState::new(AppConfig::default());
        state.set_game_store(Arc::new(MemoryGameStore::new())).await;
        let store = state.require_game_store().await.unwrap();

        let game_id = Uuid::new_v4();
        store
            .save_game(GameEntity {
                id: game_id,
                code: "ZZZZ".into(),
                state: GameState::Round1,
                current_round: Some(1),
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
            })
            .await
            .unwrap();

        for index in 0..total {
            let mut word = WordEntity {
                id: Uuid::new_v4(),
                game_id,
                text: format!("word-{index}"),
                submitted_by_player_id: Uuid::new_v4(),
                guessed_in_round1: None,
                guessed_in_round2: None,
                guessed_in_round3: None,
            };
            if index < guessed_round1 {
                word.mark_guessed(1);
            }
            store.save_word(word).await.unwrap();
        }
        (state, game_id)
    }

    #[tokio::test]
    async fn pick_never_returns_a_word_guessed_in_that_round() {
        let (state, game_id) = seeded_pool(3, 4).await;
        let store = state.require_game_store().await.unwrap();
        for _ in 0..20 {
            let word = pick_random_unguessed(&store, game_id, 1)
                .await
                .unwrap()
                .unwrap();
            assert!(!word.guessed_in(1));
        }
        // Round 2 flags were never set, so the whole pool is still available.
        assert!(
            pick_random_unguessed(&store, game_id, 2)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn pick_returns_none_when_the_round_is_exhausted() {
        let (state, game_id) = seeded_pool(4, 4).await;
        let store = state.require_game_store().await.unwrap();
        assert!(
            pick_random_unguessed(&store, game_id, 1)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn marking_a_word_bumps_the_round_counter_only() {
        let (state, game_id) = seeded_pool(2, 5).await;
        let store = state.require_game_store().await.unwrap();

        let before = counts_for_round(&state, game_id, 1).await.unwrap();
        assert_eq!((before.guessed, before.total), (2, 5));

        let mut word = pick_random_unguessed(&store, game_id, 1)
            .await
            .unwrap()
            .unwrap();
        word.mark_guessed(1);
        store.save_word(word).await.unwrap();

        let after = counts_for_round(&state, game_id, 1).await.unwrap();
        assert_eq!((after.guessed, after.total), (3, 5));
    }

    #[tokio::test]
    async fn rounds_outside_the_game_are_rejected() {
        let (state, game_id) = seeded_pool(0, 1).await;
        assert!(counts_for_round(&state, game_id, 0).await.is_err());
        assert!(counts_for_round(&state, game_id, 4).await.is_err());
    }
}
