//! In-process [`GameStore`] adapter.
//!
//! Backs local development and the conformance/integration test suites. The
//! change feed is native: every write publishes the full record value on a
//! per-game broadcast channel, mirroring a real-time tree backend.

use std::time::SystemTime;

use dashmap::DashMap;
use futures::future::BoxFuture;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::dao::{
    game_store::{GameStore, StoreEvent},
    models::{GameEntity, GameState, PlayerEntity, TeamEntity, WordEntity},
    storage::StorageResult,
};

const CHANGE_CHANNEL_CAPACITY: usize = 32;

/// DashMap-backed store with per-game change hubs.
#[derive(Default)]
pub struct MemoryGameStore {
    games: DashMap<Uuid, GameEntity>,
    teams: DashMap<Uuid, TeamEntity>,
    players: DashMap<Uuid, PlayerEntity>,
    words: DashMap<Uuid, WordEntity>,
    hubs: DashMap<Uuid, broadcast::Sender<StoreEvent>>,
}

impl MemoryGameStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn publish(&self, game_id: Uuid, event: StoreEvent) {
        if let Some(sender) = self.hubs.get(&game_id) {
            // Delivery errors only mean nobody is subscribed right now.
            let _ = sender.send(event);
        }
    }

    fn hub(&self, game_id: Uuid) -> broadcast::Sender<StoreEvent> {
        self.hubs
            .entry(game_id)
            .or_insert_with(|| broadcast::channel(CHANGE_CHANNEL_CAPACITY).0)
            .clone()
    }
}

impl GameStore for MemoryGameStore {
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let game_id = game.id;
        self.games.insert(game_id, game.clone());
        self.publish(game_id, StoreEvent::Game(game));
        Box::pin(async { Ok(()) })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let found = self.games.get(&id).map(|entry| entry.clone());
        Box::pin(async move { Ok(found) })
    }

    fn find_game_by_code(
        &self,
        code: String,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let found = self
            .games
            .iter()
            .find(|entry| entry.code == code && entry.state != GameState::Finished)
            .map(|entry| entry.clone());
        Box::pin(async move { Ok(found) })
    }

    fn save_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>> {
        let game_id = team.game_id;
        self.teams.insert(team.id, team.clone());
        self.publish(game_id, StoreEvent::Team(team));
        Box::pin(async { Ok(()) })
    }

    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let found = self.teams.get(&id).map(|entry| entry.clone());
        Box::pin(async move { Ok(found) })
    }

    fn list_teams(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        let teams: Vec<TeamEntity> = self
            .teams
            .iter()
            .filter(|entry| entry.game_id == game_id)
            .map(|entry| entry.clone())
            .collect();
        Box::pin(async move { Ok(teams) })
    }

    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let game_id = player.game_id;
        self.players.insert(player.id, player.clone());
        self.publish(game_id, StoreEvent::Player(player));
        Box::pin(async { Ok(()) })
    }

    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let found = self.players.get(&id).map(|entry| entry.clone());
        Box::pin(async move { Ok(found) })
    }

    fn list_players(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let mut players: Vec<PlayerEntity> = self
            .players
            .iter()
            .filter(|entry| entry.game_id == game_id)
            .map(|entry| entry.clone())
            .collect();
        // Stable join order keeps list responses deterministic for clients.
        players.sort_by_key(|player| player.joined_at);
        Box::pin(async move { Ok(players) })
    }

    fn save_word(&self, word: WordEntity) -> BoxFuture<'static, StorageResult<()>> {
        let game_id = word.game_id;
        self.words.insert(word.id, word.clone());
        self.publish(game_id, StoreEvent::Word(word));
        Box::pin(async { Ok(()) })
    }

    fn find_word(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<WordEntity>>> {
        let found = self.words.get(&id).map(|entry| entry.clone());
        Box::pin(async move { Ok(found) })
    }

    fn delete_word(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let removed = self.words.remove(&id);
        if let Some((word_id, word)) = removed.as_ref() {
            self.publish(word.game_id, StoreEvent::WordRemoved { word_id: *word_id });
        }
        let existed = removed.is_some();
        Box::pin(async move { Ok(existed) })
    }

    fn list_words(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<WordEntity>>> {
        let words: Vec<WordEntity> = self
            .words
            .iter()
            .filter(|entry| entry.game_id == game_id)
            .map(|entry| entry.clone())
            .collect();
        Box::pin(async move { Ok(words) })
    }

    fn list_words_by_player(
        &self,
        game_id: Uuid,
        player_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<WordEntity>>> {
        let words: Vec<WordEntity> = self
            .words
            .iter()
            .filter(|entry| {
                entry.game_id == game_id && entry.submitted_by_player_id == player_id
            })
            .map(|entry| entry.clone())
            .collect();
        Box::pin(async move { Ok(words) })
    }

    fn subscribe(
        &self,
        game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<broadcast::Receiver<StoreEvent>>> {
        let receiver = self.hub(game_id).subscribe();
        Box::pin(async move { Ok(receiver) })
    }

    fn server_time(&self) -> BoxFuture<'static, StorageResult<SystemTime>> {
        Box::pin(async { Ok(SystemTime::now()) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
