//! Storage port consumed by the orchestration engine.
//!
//! The engine is written once against [`GameStore`] and parameterized with an
//! adapter at the composition root; business logic never branches on the
//! backend in use.

#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use std::time::SystemTime;

use futures::future::BoxFuture;
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::dao::models::{GameEntity, PlayerEntity, TeamEntity, WordEntity};
use crate::dao::storage::StorageResult;

/// Change notification carrying the mutated record's full current value.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "record", rename_all = "camelCase")]
pub enum StoreEvent {
    /// The game record was written.
    Game(GameEntity),
    /// A team record belonging to the watched game was written.
    Team(TeamEntity),
    /// A player record belonging to the watched game was written.
    Player(PlayerEntity),
    /// A word record belonging to the watched game was written or removed.
    Word(WordEntity),
    /// A word record was deleted.
    WordRemoved {
        /// Identifier of the removed word.
        word_id: Uuid,
    },
}

/// Abstraction over the persistence backend for game session records.
///
/// Adapters implement an identical contract, including the error taxonomy;
/// `tests/store_conformance.rs` exercises each adapter against the same
/// suite instead of hand-written parity checks.
pub trait GameStore: Send + Sync {
    /// Insert or replace a game record.
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Point read of a game by id.
    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Look up a game by join code among non-finished games only. The code is
    /// matched in its normalized (uppercase) form.
    fn find_game_by_code(&self, code: String)
    -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;

    /// Insert or replace a team record.
    fn save_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Point read of a team by id.
    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>>;
    /// All teams belonging to a game.
    fn list_teams(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>>;

    /// Insert or replace a player record.
    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Point read of a player by id.
    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>>;
    /// All players belonging to a game.
    fn list_players(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>>;

    /// Insert or replace a word record.
    fn save_word(&self, word: WordEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Point read of a word by id.
    fn find_word(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<WordEntity>>>;
    /// Delete a word record, returning whether it existed.
    fn delete_word(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    /// All words belonging to a game.
    fn list_words(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<WordEntity>>>;
    /// Words a single player submitted to a game.
    fn list_words_by_player(
        &self,
        game_id: Uuid,
        player_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<WordEntity>>>;

    /// Subscribe to change notifications for one game. Every mutation of the
    /// game or its child records delivers the full current value.
    fn subscribe(
        &self,
        game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<broadcast::Receiver<StoreEvent>>>;

    /// Monotonic server-assigned timestamp. All durable timestamps come from
    /// here, never from a client clock.
    fn server_time(&self) -> BoxFuture<'static, StorageResult<SystemTime>>;

    /// Cheap connectivity probe used by the storage supervisor.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Attempt to re-establish a dropped connection.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
