//! Conformance suite run against every [`GameStore`] adapter that can be
//! exercised without external infrastructure. Backed adapters implement the
//! same contract; pointing this suite at them only needs a running database.

use std::{collections::HashMap, sync::Arc, time::SystemTime};

use uuid::Uuid;

use fishbowl_back::dao::{
    game_store::{GameStore, StoreEvent, memory::MemoryGameStore},
    models::{
        GameEntity, GameSettings, GameState, PlayerEntity, TeamEntity, WordEntity,
    },
};

fn memory_store() -> Arc<dyn GameStore> {
    Arc::new(MemoryGameStore::new())
}

fn sample_game(code: &str) -> GameEntity {
    GameEntity {
        id: Uuid::new_v4(),
        code: code.to_owned(),
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

fn sample_player(game_id: Uuid, name: &str, is_host: bool) -> PlayerEntity {
    PlayerEntity {
        id: Uuid::new_v4(),
        game_id,
        team_id: None,
        name: name.to_owned(),
        is_host,
        joined_at: SystemTime::now(),
    }
}

fn sample_word(game_id: Uuid, player_id: Uuid, text: &str) -> WordEntity {
    WordEntity {
        id: Uuid::new_v4(),
        game_id,
        text: text.to_owned(),
        submitted_by_player_id: player_id,
        guessed_in_round1: None,
        guessed_in_round2: None,
        guessed_in_round3: None,
    }
}

async fn games_round_trip(store: Arc<dyn GameStore>) {
    let game = sample_game("ABCD");
    store.save_game(game.clone()).await.unwrap();

    let loaded = store.find_game(game.id).await.unwrap().unwrap();
    assert_eq!(loaded, game);
    assert!(store.find_game(Uuid::new_v4()).await.unwrap().is_none());
}

async fn code_lookup_skips_finished_games(store: Arc<dyn GameStore>) {
    let mut finished = sample_game("WXYZ");
    finished.state = GameState::Finished;
    store.save_game(finished).await.unwrap();

    assert!(
        store
            .find_game_by_code("WXYZ".into())
            .await
            .unwrap()
            .is_none(),
        "finished games must not be joinable"
    );

    let open = sample_game("WXYZ");
    store.save_game(open.clone()).await.unwrap();
    let found = store.find_game_by_code("WXYZ".into()).await.unwrap();
    assert_eq!(found.map(|game| game.id), Some(open.id));
}

async fn child_records_are_scoped_to_their_game(store: Arc<dyn GameStore>) {
    let game_a = sample_game("AAAA");
    let game_b = sample_game("BBBB");
    store.save_game(game_a.clone()).await.unwrap();
    store.save_game(game_b.clone()).await.unwrap();

    let team = TeamEntity {
        id: Uuid::new_v4(),
        game_id: game_a.id,
        name: "Reds".into(),
        score: 0,
    };
    store.save_team(team.clone()).await.unwrap();

    let player = sample_player(game_a.id, "alice", true);
    store.save_player(player.clone()).await.unwrap();
    let stranger = sample_player(game_b.id, "mallory", true);
    store.save_player(stranger).await.unwrap();

    assert_eq!(store.list_teams(game_a.id).await.unwrap(), vec![team]);
    assert!(store.list_teams(game_b.id).await.unwrap().is_empty());

    let players = store.list_players(game_a.id).await.unwrap();
    assert_eq!(players.len(), 1);
    assert_eq!(players[0].id, player.id);
}

async fn players_list_in_join_order(store: Arc<dyn GameStore>) {
    let game = sample_game("JOIN");
    store.save_game(game.clone()).await.unwrap();

    let mut first = sample_player(game.id, "first", true);
    first.joined_at = SystemTime::UNIX_EPOCH;
    let second = sample_player(game.id, "second", false);
    store.save_player(second.clone()).await.unwrap();
    store.save_player(first.clone()).await.unwrap();

    let players = store.list_players(game.id).await.unwrap();
    assert_eq!(players[0].id, first.id);
    assert_eq!(players[1].id, second.id);
}

async fn words_filter_by_submitter_and_delete_reports_existence(store: Arc<dyn GameStore>) {
    let game = sample_game("WORD");
    store.save_game(game.clone()).await.unwrap();

    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let word_a = sample_word(game.id, alice, "kazoo");
    let word_b = sample_word(game.id, bob, "piano");
    store.save_word(word_a.clone()).await.unwrap();
    store.save_word(word_b.clone()).await.unwrap();

    assert_eq!(store.list_words(game.id).await.unwrap().len(), 2);
    let mine = store.list_words_by_player(game.id, alice).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, word_a.id);

    assert!(store.delete_word(word_a.id).await.unwrap());
    assert!(!store.delete_word(word_a.id).await.unwrap());
    assert_eq!(store.list_words(game.id).await.unwrap().len(), 1);
}

async fn guessed_flags_survive_round_trips(store: Arc<dyn GameStore>) {
    let game = sample_game("FLAG");
    store.save_game(game.clone()).await.unwrap();

    let mut word = sample_word(game.id, Uuid::new_v4(), "lantern");
    word.mark_guessed(1);
    word.mark_guessed(3);
    store.save_word(word.clone()).await.unwrap();

    let loaded = store.find_word(word.id).await.unwrap().unwrap();
    assert!(loaded.guessed_in(1));
    assert!(!loaded.guessed_in(2));
    assert!(loaded.guessed_in(3));
}

async fn subscription_delivers_full_record_values(store: Arc<dyn GameStore>) {
    let game = sample_game("SUBS");
    let mut receiver = store.subscribe(game.id).await.unwrap();

    store.save_game(game.clone()).await.unwrap();
    match receiver.recv().await.unwrap() {
        StoreEvent::Game(published) => assert_eq!(published, game),
        other => panic!("expected a game event, got {other:?}"),
    }

    let word = sample_word(game.id, Uuid::new_v4(), "secret");
    store.save_word(word.clone()).await.unwrap();
    match receiver.recv().await.unwrap() {
        StoreEvent::Word(published) => assert_eq!(published.id, word.id),
        other => panic!("expected a word event, got {other:?}"),
    }

    store.delete_word(word.id).await.unwrap();
    match receiver.recv().await.unwrap() {
        StoreEvent::WordRemoved { word_id } => assert_eq!(word_id, word.id),
        other => panic!("expected a removal event, got {other:?}"),
    }
}

async fn subscriptions_are_per_game(store: Arc<dyn GameStore>) {
    let watched = sample_game("ONE1");
    let other = sample_game("TWO2");
    let mut receiver = store.subscribe(watched.id).await.unwrap();

    store.save_game(other).await.unwrap();
    store.save_game(watched.clone()).await.unwrap();

    // Only the watched game's write arrives.
    match receiver.recv().await.unwrap() {
        StoreEvent::Game(published) => assert_eq!(published.id, watched.id),
        other => panic!("expected a game event, got {other:?}"),
    }
    assert!(receiver.try_recv().is_err());
}

async fn server_time_is_plausible(store: Arc<dyn GameStore>) {
    let before = SystemTime::now();
    let reported = store.server_time().await.unwrap();
    assert!(reported >= before, "server time went backwards");
}

macro_rules! adapter_suite {
    ($name:ident, $factory:expr) => {
        mod $name {
            use super::*;

            #[tokio::test]
            async fn games_round_trip() {
                super::games_round_trip($factory()).await;
            }

            #[tokio::test]
            async fn code_lookup_skips_finished_games() {
                super::code_lookup_skips_finished_games($factory()).await;
            }

            #[tokio::test]
            async fn child_records_are_scoped_to_their_game() {
                super::child_records_are_scoped_to_their_game($factory()).await;
            }

            #[tokio::test]
            async fn players_list_in_join_order() {
                super::players_list_in_join_order($factory()).await;
            }

            #[tokio::test]
            async fn words_filter_by_submitter_and_delete_reports_existence() {
                super::words_filter_by_submitter_and_delete_reports_existence($factory()).await;
            }

            #[tokio::test]
            async fn guessed_flags_survive_round_trips() {
                super::guessed_flags_survive_round_trips($factory()).await;
            }

            #[tokio::test]
            async fn subscription_delivers_full_record_values() {
                super::subscription_delivers_full_record_values($factory()).await;
            }

            #[tokio::test]
            async fn subscriptions_are_per_game() {
                super::subscriptions_are_per_game($factory()).await;
            }

            #[tokio::test]
            async fn server_time_is_plausible() {
                super::server_time_is_plausible($factory()).await;
            }
        }
    };
}

adapter_suite!(memory, super::memory_store);
