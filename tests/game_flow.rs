//! End-to-end flows exercised through the service layer against the memory
//! store: lobby assembly, the start gate, and full games played to the end.

use std::sync::Arc;

use uuid::Uuid;

use fishbowl_back::{
    config::AppConfig,
    dao::{
        game_store::{GameStore, memory::MemoryGameStore},
        models::{GameState, TurnState},
    },
    dto::{
        game::{
            AssignTeamRequest, CreateGameRequest, CreateTeamRequest, JoinGameRequest,
            SettingsInput,
        },
        turn::{GuessRequest, GuessResolution},
        word::SubmitWordRequest,
    },
    error::ServiceError,
    services::{game_service, turn_service, word_service},
    state::{AppState, SharedState},
};

async fn state_with_memory_store() -> SharedState {
    let state = AppState::new(AppConfig::default());
    state
        .set_game_store(Arc::new(MemoryGameStore::new()))
        .await;
    state
}

struct Lobby {
    state: SharedState,
    game_id: Uuid,
    host_id: Uuid,
    player_ids: Vec<Uuid>,
    team_ids: Vec<Uuid>,
}

/// Assemble a ready-to-start lobby: two teams of two, one word per player.
async fn ready_lobby(words_per_person: u32) -> Lobby {
    let state = state_with_memory_store().await;

    let created = game_service::create_game(
        &state,
        CreateGameRequest {
            host_name: "host".into(),
            settings: Some(SettingsInput {
                word_count_per_person: words_per_person,
                round_length_seconds: 60,
                skip_penalty_seconds: 10,
            }),
        },
    )
    .await
    .unwrap();
    let game_id = created.game.id;
    let host_id = created.player.id;

    let mut player_ids = vec![host_id];
    for name in ["bea", "cal", "dot"] {
        let joined = game_service::join_game(
            &state,
            JoinGameRequest {
                code: created.game.code.clone(),
                player_name: name.into(),
            },
        )
        .await
        .unwrap();
        player_ids.push(joined.player.id);
    }

    let mut team_ids = Vec::new();
    for name in ["Reds", "Blues"] {
        let team = game_service::create_team(
            &state,
            game_id,
            CreateTeamRequest {
                requester_id: host_id,
                name: name.into(),
            },
        )
        .await
        .unwrap();
        team_ids.push(team.id);
    }

    for (index, player_id) in player_ids.iter().enumerate() {
        game_service::assign_team(
            &state,
            game_id,
            *player_id,
            AssignTeamRequest {
                requester_id: host_id,
                team_id: Some(team_ids[index % 2]),
            },
        )
        .await
        .unwrap();
    }

    for (index, player_id) in player_ids.iter().enumerate() {
        for word in 0..words_per_person {
            word_service::submit(
                &state,
                game_id,
                SubmitWordRequest {
                    player_id: *player_id,
                    text: format!("word-{index}-{word}"),
                },
            )
            .await
            .unwrap();
        }
    }

    Lobby {
        state,
        game_id,
        host_id,
        player_ids,
        team_ids,
    }
}

async fn load_game(
    state: &SharedState,
    game_id: Uuid,
) -> fishbowl_back::dao::models::GameEntity {
    let store = state.require_game_store().await.unwrap();
    store.find_game(game_id).await.unwrap().unwrap()
}

#[tokio::test]
async fn full_game_runs_to_completion_and_scores_every_round() {
    let lobby = ready_lobby(1).await;
    let Lobby {
        state,
        game_id,
        host_id,
        ..
    } = lobby;

    let check = game_service::start_check(&state, game_id, host_id)
        .await
        .unwrap();
    assert!(check.can_start, "gate should pass: {:?}", check.problems);

    turn_service::start_game(&state, game_id, host_id).await.unwrap();
    let game = load_game(&state, game_id).await;
    assert_eq!(game.state, GameState::Round1);
    assert_eq!(game.current_round, Some(1));
    assert_eq!(game.turn_state, Some(TurnState::Paused));

    let store = state.require_game_store().await.unwrap();
    let mut guesses = 0usize;
    // 4 words replayed over 3 rounds; generous bound against infinite loops.
    for _ in 0..100 {
        let game = load_game(&state, game_id).await;
        if game.state == GameState::Finished {
            break;
        }

        let describer = game.active_player_id.expect("a describer past the lobby");
        let started = turn_service::start_turn(&state, game_id, describer)
            .await
            .unwrap();
        let mut card = started.word.expect("an unguessed word at turn start");

        loop {
            let response = turn_service::correct_guess(
                &state,
                game_id,
                GuessRequest {
                    requester_id: host_id,
                    word_id: card.id,
                },
            )
            .await
            .unwrap();
            guesses += 1;

            match response.resolution {
                GuessResolution::Continued => {
                    card = response.next_word.expect("a follow-up word while continuing");
                }
                GuessResolution::RoundAdvanced | GuessResolution::Finished => break,
            }
        }
    }

    let game = load_game(&state, game_id).await;
    assert_eq!(game.state, GameState::Finished);
    // The describer pair of the final turn stays visible on the finished game.
    assert!(game.active_team_id.is_some());
    assert!(game.active_player_id.is_some());

    // Every word scores exactly once per round.
    assert_eq!(guesses, 4 * 3);
    let teams = store.list_teams(game_id).await.unwrap();
    let total: u32 = teams.iter().map(|team| team.score).sum();
    assert_eq!(total, 12);

    // All three per-round flag sets are saturated.
    let words = store.list_words(game_id).await.unwrap();
    for round in 1..=3 {
        assert!(words.iter().all(|word| word.guessed_in(round)));
    }
}

#[tokio::test]
async fn start_gate_lists_every_problem_and_blocks_start() {
    let state = state_with_memory_store().await;

    let created = game_service::create_game(
        &state,
        CreateGameRequest {
            host_name: "host".into(),
            settings: None,
        },
    )
    .await
    .unwrap();

    // One team, one unassigned host, no words.
    game_service::create_team(
        &state,
        created.game.id,
        CreateTeamRequest {
            requester_id: created.player.id,
            name: "Loners".into(),
        },
    )
    .await
    .unwrap();

    let check = game_service::start_check(&state, created.game.id, created.player.id)
        .await
        .unwrap();
    assert!(!check.can_start);
    assert!(check.problems.len() >= 2, "problems: {:?}", check.problems);

    let err = turn_service::start_game(&state, created.game.id, created.player.id)
        .await
        .unwrap_err();
    match err {
        ServiceError::PreconditionFailed(problems) => {
            assert_eq!(problems, check.problems);
        }
        other => panic!("expected gate failure, got {other}"),
    }

    let game = load_game(&state, created.game.id).await;
    assert_eq!(game.state, GameState::Lobby);
}

#[tokio::test]
async fn word_quota_and_ownership_are_enforced() {
    let lobby = ready_lobby(1).await;

    // Quota already reached by the host.
    let err = word_service::submit(
        &lobby.state,
        lobby.game_id,
        SubmitWordRequest {
            player_id: lobby.host_id,
            text: "overflow".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::QuotaExceeded(_)));

    // Only the submitter may remove their word.
    let store = lobby.state.require_game_store().await.unwrap();
    let host_words = store
        .list_words_by_player(lobby.game_id, lobby.host_id)
        .await
        .unwrap();
    let err = word_service::remove(
        &lobby.state,
        lobby.game_id,
        host_words[0].id,
        lobby.player_ids[1],
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::NotOwner(_)));

    word_service::remove(&lobby.state, lobby.game_id, host_words[0].id, lobby.host_id)
        .await
        .unwrap();
}

#[tokio::test]
async fn only_the_describer_may_start_or_skip_a_turn() {
    let lobby = ready_lobby(1).await;
    turn_service::start_game(&lobby.state, lobby.game_id, lobby.host_id)
        .await
        .unwrap();

    let game = load_game(&lobby.state, lobby.game_id).await;
    let describer = game.active_player_id.unwrap();
    let bystander = *lobby
        .player_ids
        .iter()
        .find(|id| **id != describer)
        .unwrap();

    let err = turn_service::start_turn(&lobby.state, lobby.game_id, bystander)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotOwner(_)));

    turn_service::start_turn(&lobby.state, lobby.game_id, describer)
        .await
        .unwrap();
    let err = turn_service::skip(&lobby.state, lobby.game_id, bystander)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotOwner(_)));
}

#[tokio::test]
async fn early_skip_penalizes_and_keeps_the_turn_running() {
    let lobby = ready_lobby(2).await;
    turn_service::start_game(&lobby.state, lobby.game_id, lobby.host_id)
        .await
        .unwrap();

    let game = load_game(&lobby.state, lobby.game_id).await;
    let describer = game.active_player_id.unwrap();
    turn_service::start_turn(&lobby.state, lobby.game_id, describer)
        .await
        .unwrap();

    let response = turn_service::skip(&lobby.state, lobby.game_id, describer)
        .await
        .unwrap();
    assert!(response.penalized);
    assert!(response.next_word.is_some());
    // 10 second penalty off a fresh 60 second turn.
    assert!(response.remaining_seconds <= 50);
    assert!(response.remaining_seconds > 40);

    let game = load_game(&lobby.state, lobby.game_id).await;
    assert_eq!(game.turn_state, Some(TurnState::Active));
}

#[tokio::test]
async fn time_up_rotates_turns_and_rejects_duplicate_reports() {
    let lobby = ready_lobby(1).await;
    turn_service::start_game(&lobby.state, lobby.game_id, lobby.host_id)
        .await
        .unwrap();

    let before = load_game(&lobby.state, lobby.game_id).await;
    let first_describer = before.active_player_id.unwrap();
    let first_team = before.active_team_id.unwrap();
    turn_service::start_turn(&lobby.state, lobby.game_id, first_describer)
        .await
        .unwrap();

    turn_service::time_up(&lobby.state, lobby.game_id, lobby.host_id)
        .await
        .unwrap();

    let after = load_game(&lobby.state, lobby.game_id).await;
    assert_eq!(after.turn_state, Some(TurnState::Paused));
    assert!(after.turn_start_time.is_none());
    // Two teams alternate, so the next turn belongs to the other team.
    assert_ne!(after.active_team_id, Some(first_team));
    // The timed-out describer is remembered as the team's last speaker.
    assert_eq!(
        after.last_speaker_ids.get(&first_team),
        Some(&first_describer)
    );

    let err = turn_service::time_up(&lobby.state, lobby.game_id, lobby.host_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidTransition(_)));
}

#[tokio::test]
async fn guessing_the_same_word_twice_in_a_round_is_rejected() {
    let lobby = ready_lobby(2).await;
    turn_service::start_game(&lobby.state, lobby.game_id, lobby.host_id)
        .await
        .unwrap();

    let game = load_game(&lobby.state, lobby.game_id).await;
    let describer = game.active_player_id.unwrap();
    let started = turn_service::start_turn(&lobby.state, lobby.game_id, describer)
        .await
        .unwrap();
    let card = started.word.unwrap();

    turn_service::correct_guess(
        &lobby.state,
        lobby.game_id,
        GuessRequest {
            requester_id: lobby.host_id,
            word_id: card.id,
        },
    )
    .await
    .unwrap();

    let err = turn_service::correct_guess(
        &lobby.state,
        lobby.game_id,
        GuessRequest {
            requester_id: lobby.host_id,
            word_id: card.id,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidTransition(_)));
}

#[tokio::test]
async fn lobby_mutations_are_rejected_after_start() {
    let lobby = ready_lobby(1).await;
    turn_service::start_game(&lobby.state, lobby.game_id, lobby.host_id)
        .await
        .unwrap();

    let err = word_service::submit(
        &lobby.state,
        lobby.game_id,
        SubmitWordRequest {
            player_id: lobby.host_id,
            text: "late".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidTransition(_)));

    let err = game_service::assign_team(
        &lobby.state,
        lobby.game_id,
        lobby.host_id,
        AssignTeamRequest {
            requester_id: lobby.host_id,
            team_id: Some(lobby.team_ids[1]),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidTransition(_)));
}
