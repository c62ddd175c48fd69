use std::{sync::Arc, time::SystemTime};

use dashmap::DashMap;
use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{Client, Collection, Database, IndexModel, bson::doc, options::IndexOptions};
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{
        MongoGameDocument, MongoPlayerDocument, MongoTeamDocument, MongoWordDocument, doc_id,
        uuid_as_binary,
    },
};
use crate::dao::{
    game_store::{GameStore, StoreEvent},
    models::{GameEntity, PlayerEntity, TeamEntity, WordEntity},
    storage::StorageResult,
};

const GAMES: &str = "games";
const TEAMS: &str = "teams";
const PLAYERS: &str = "players";
const WORDS: &str = "words";

const CHANGE_CHANNEL_CAPACITY: usize = 32;

/// MongoDB-backed [`GameStore`].
///
/// MongoDB has no native per-document change feed cheap enough for this use,
/// so change notifications are published in-process after each successful
/// write, mirroring the memory adapter's hubs.
#[derive(Clone)]
pub struct MongoGameStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
    hubs: DashMap<Uuid, broadcast::Sender<StoreEvent>>,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
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

impl MongoGameStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
            hubs: DashMap::new(),
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;

        let games = database.collection::<MongoGameDocument>(GAMES);
        let code_index = IndexModel::builder()
            .keys(doc! {"code": 1, "state": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("game_code_state_idx".to_owned()))
                    .build(),
            )
            .build();
        games
            .create_index(code_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: GAMES,
                index: "code,state",
                source,
            })?;

        for (collection, index_name) in [
            (TEAMS, "team_game_idx"),
            (PLAYERS, "player_game_idx"),
            (WORDS, "word_game_idx"),
        ] {
            let target = database.collection::<mongodb::bson::Document>(collection);
            let index = IndexModel::builder()
                .keys(doc! {"game_id": 1})
                .options(
                    IndexOptions::builder()
                        .name(Some(index_name.to_owned()))
                        .build(),
                )
                .build();
            target
                .create_index(index)
                .await
                .map_err(|source| MongoDaoError::EnsureIndex {
                    collection,
                    index: "game_id",
                    source,
                })?;
        }

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn games(&self) -> Collection<MongoGameDocument> {
        self.database().await.collection(GAMES)
    }

    async fn teams(&self) -> Collection<MongoTeamDocument> {
        self.database().await.collection(TEAMS)
    }

    async fn players(&self) -> Collection<MongoPlayerDocument> {
        self.database().await.collection(PLAYERS)
    }

    async fn words(&self) -> Collection<MongoWordDocument> {
        self.database().await.collection(WORDS)
    }

    async fn save_game(&self, game: GameEntity) -> MongoResult<()> {
        let id = game.id;
        let document: MongoGameDocument = game.clone().into();
        self.games()
            .await
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::Save {
                collection: GAMES,
                id,
                source,
            })?;
        self.inner.publish(id, StoreEvent::Game(game));
        Ok(())
    }

    async fn find_game(&self, id: Uuid) -> MongoResult<Option<GameEntity>> {
        let document = self
            .games()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Load {
                collection: GAMES,
                id,
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn find_game_by_code(&self, code: String) -> MongoResult<Option<GameEntity>> {
        let document = self
            .games()
            .await
            .find_one(doc! {"code": &code, "state": {"$ne": "finished"}})
            .await
            .map_err(|source| MongoDaoError::Query {
                collection: GAMES,
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn save_team(&self, team: TeamEntity) -> MongoResult<()> {
        let id = team.id;
        let game_id = team.game_id;
        let document: MongoTeamDocument = team.clone().into();
        self.teams()
            .await
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::Save {
                collection: TEAMS,
                id,
                source,
            })?;
        self.inner.publish(game_id, StoreEvent::Team(team));
        Ok(())
    }

    async fn find_team(&self, id: Uuid) -> MongoResult<Option<TeamEntity>> {
        let document = self
            .teams()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Load {
                collection: TEAMS,
                id,
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn list_teams(&self, game_id: Uuid) -> MongoResult<Vec<TeamEntity>> {
        let documents: Vec<MongoTeamDocument> = self
            .teams()
            .await
            .find(doc! {"game_id": uuid_as_binary(game_id)})
            .await
            .map_err(|source| MongoDaoError::Query {
                collection: TEAMS,
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::Query {
                collection: TEAMS,
                source,
            })?;
        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn save_player(&self, player: PlayerEntity) -> MongoResult<()> {
        let id = player.id;
        let game_id = player.game_id;
        let document: MongoPlayerDocument = player.clone().into();
        self.players()
            .await
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::Save {
                collection: PLAYERS,
                id,
                source,
            })?;
        self.inner.publish(game_id, StoreEvent::Player(player));
        Ok(())
    }

    async fn find_player(&self, id: Uuid) -> MongoResult<Option<PlayerEntity>> {
        let document = self
            .players()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Load {
                collection: PLAYERS,
                id,
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn list_players(&self, game_id: Uuid) -> MongoResult<Vec<PlayerEntity>> {
        let documents: Vec<MongoPlayerDocument> = self
            .players()
            .await
            .find(doc! {"game_id": uuid_as_binary(game_id)})
            .sort(doc! {"joined_at": 1})
            .await
            .map_err(|source| MongoDaoError::Query {
                collection: PLAYERS,
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::Query {
                collection: PLAYERS,
                source,
            })?;
        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn save_word(&self, word: WordEntity) -> MongoResult<()> {
        let id = word.id;
        let game_id = word.game_id;
        let document: MongoWordDocument = word.clone().into();
        self.words()
            .await
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::Save {
                collection: WORDS,
                id,
                source,
            })?;
        self.inner.publish(game_id, StoreEvent::Word(word));
        Ok(())
    }

    async fn find_word(&self, id: Uuid) -> MongoResult<Option<WordEntity>> {
        let document = self
            .words()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Load {
                collection: WORDS,
                id,
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn delete_word(&self, id: Uuid) -> MongoResult<bool> {
        // Read first: the notification needs the owning game's hub.
        let existing = self.find_word(id).await?;
        let Some(word) = existing else {
            return Ok(false);
        };

        let result = self
            .words()
            .await
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Delete {
                collection: WORDS,
                id,
                source,
            })?;

        let deleted = result.deleted_count > 0;
        if deleted {
            self.inner
                .publish(word.game_id, StoreEvent::WordRemoved { word_id: id });
        }
        Ok(deleted)
    }

    async fn list_words(&self, game_id: Uuid) -> MongoResult<Vec<WordEntity>> {
        let documents: Vec<MongoWordDocument> = self
            .words()
            .await
            .find(doc! {"game_id": uuid_as_binary(game_id)})
            .await
            .map_err(|source| MongoDaoError::Query {
                collection: WORDS,
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::Query {
                collection: WORDS,
                source,
            })?;
        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn list_words_by_player(
        &self,
        game_id: Uuid,
        player_id: Uuid,
    ) -> MongoResult<Vec<WordEntity>> {
        let documents: Vec<MongoWordDocument> = self
            .words()
            .await
            .find(doc! {
                "game_id": uuid_as_binary(game_id),
                "submitted_by_player_id": uuid_as_binary(player_id),
            })
            .await
            .map_err(|source| MongoDaoError::Query {
                collection: WORDS,
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::Query {
                collection: WORDS,
                source,
            })?;
        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn server_time(&self) -> MongoResult<SystemTime> {
        let database = self.database().await;
        let response = database
            .run_command(doc! { "hello": 1 })
            .await
            .map_err(|source| MongoDaoError::ServerTimeCommand { source })?;
        let local_time = response
            .get_datetime("localTime")
            .map_err(|source| MongoDaoError::ServerTimeField { source })?;
        Ok(local_time.to_system_time())
    }
}

impl GameStore for MongoGameStore {
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_game(game).await.map_err(Into::into) })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_game(id).await.map_err(Into::into) })
    }

    fn find_game_by_code(
        &self,
        code: String,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_game_by_code(code).await.map_err(Into::into) })
    }

    fn save_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_team(team).await.map_err(Into::into) })
    }

    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_team(id).await.map_err(Into::into) })
    }

    fn list_teams(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_teams(game_id).await.map_err(Into::into) })
    }

    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_player(player).await.map_err(Into::into) })
    }

    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_player(id).await.map_err(Into::into) })
    }

    fn list_players(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_players(game_id).await.map_err(Into::into) })
    }

    fn save_word(&self, word: WordEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_word(word).await.map_err(Into::into) })
    }

    fn find_word(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<WordEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_word(id).await.map_err(Into::into) })
    }

    fn delete_word(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_word(id).await.map_err(Into::into) })
    }

    fn list_words(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<WordEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_words(game_id).await.map_err(Into::into) })
    }

    fn list_words_by_player(
        &self,
        game_id: Uuid,
        player_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<WordEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_words_by_player(game_id, player_id)
                .await
                .map_err(Into::into)
        })
    }

    fn subscribe(
        &self,
        game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<broadcast::Receiver<StoreEvent>>> {
        let receiver = self.inner.hub(game_id).subscribe();
        Box::pin(async move { Ok(receiver) })
    }

    fn server_time(&self) -> BoxFuture<'static, StorageResult<SystemTime>> {
        let store = self.clone();
        Box::pin(async move { store.server_time().await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
