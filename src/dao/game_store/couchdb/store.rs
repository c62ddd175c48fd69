use std::{sync::Arc, time::SystemTime};

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::from_value;
use time::{OffsetDateTime, format_description::well_known::Rfc2822};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::dao::{
    game_store::{GameStore, StoreEvent},
    models::{GameEntity, GameState, PlayerEntity, TeamEntity, WordEntity},
    storage::{StorageError, StorageResult},
};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::{
        AllDocsResponse, CouchGameDocument, CouchPlayerDocument, CouchTeamDocument,
        CouchWordDocument, END_SUFFIX, GAME_PREFIX, PLAYER_PREFIX, TEAM_PREFIX, WORD_PREFIX,
        game_doc_id, player_doc_id, team_doc_id, word_doc_id,
    },
};

/// CouchDB-backed [`GameStore`].
///
/// Child records are filtered by the `game_id` carried in each document body
/// after an `_all_docs` range read over the type prefix. Change subscriptions
/// would need the `_changes` feed and are not implemented by this adapter.
#[derive(Clone)]
pub struct CouchGameStore {
    client: Client,
    base_url: Arc<str>,
    database: Arc<str>,
    auth: Option<(Arc<str>, Arc<str>)>,
}

impl CouchGameStore {
    /// Establish a connection to CouchDB and ensure the database exists.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let base_url = Arc::<str>::from(config.base_url.trim_end_matches('/'));
        let database = Arc::<str>::from(config.database);
        let auth = config
            .username
            .zip(config.password)
            .map(|(u, p)| (Arc::<str>::from(u), Arc::<str>::from(p)));

        let store = Self {
            client,
            base_url,
            database,
            auth,
        };

        store.ensure_database().await?;
        Ok(store)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}/{}", self.base_url, self.database, path);
        let builder = self.client.request(method, url);
        if let Some((ref user, ref pass)) = self.auth {
            builder.basic_auth(user.as_ref(), Some(pass.as_ref()))
        } else {
            builder
        }
    }

    fn database_request(&self, method: Method) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, self.database);
        let builder = self.client.request(method, url);
        if let Some((ref user, ref pass)) = self.auth {
            builder.basic_auth(user.as_ref(), Some(pass.as_ref()))
        } else {
            builder
        }
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let database = self.database.to_string();

        let response = self
            .database_request(Method::GET)
            .send()
            .await
            .map_err(|source| CouchDaoError::DatabaseQuery {
                database: database.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => {
                let create = self
                    .database_request(Method::PUT)
                    .send()
                    .await
                    .map_err(|source| CouchDaoError::DatabaseCreate {
                        database: database.clone(),
                        source,
                    })?;
                if create.status().is_success() {
                    Ok(())
                } else {
                    Err(CouchDaoError::DatabaseStatus {
                        database,
                        status: create.status(),
                    })
                }
            }
            other => Err(CouchDaoError::DatabaseStatus {
                database,
                status: other,
            }),
        }
    }

    async fn get_document<T>(&self, doc_id: &str) -> CouchResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, doc_id)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: doc_id.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                response.json::<T>().await.map(Some).map_err(|source| {
                    CouchDaoError::DecodeResponse {
                        path: doc_id.to_string(),
                        source,
                    }
                })
            }
            other => Err(CouchDaoError::RequestStatus {
                path: doc_id.to_string(),
                status: other,
            }),
        }
    }

    async fn put_document<T>(&self, doc_id: &str, document: &T) -> CouchResult<()>
    where
        T: ?Sized + Serialize,
    {
        let response = self
            .request(Method::PUT, doc_id)
            .json(document)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: doc_id.to_string(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CouchDaoError::RequestStatus {
                path: doc_id.to_string(),
                status: response.status(),
            })
        }
    }

    async fn delete_document(&self, doc_id: &str, rev: &str) -> CouchResult<bool> {
        let response = self
            .request(Method::DELETE, doc_id)
            .query(&[("rev", rev)])
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: doc_id.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            other => Err(CouchDaoError::RequestStatus {
                path: doc_id.to_string(),
                status: other,
            }),
        }
    }

    async fn list_documents<T>(&self, prefix: &str) -> CouchResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        const ALL_DOCS: &str = "_all_docs";
        let query = [
            ("include_docs", "true".to_string()),
            ("startkey", format!("\"{}\"", prefix)),
            ("endkey", format!("\"{}{}\"", prefix, END_SUFFIX)),
        ];

        let response = self
            .request(Method::GET, ALL_DOCS)
            .query(&query)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: ALL_DOCS.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(CouchDaoError::RequestStatus {
                path: ALL_DOCS.to_string(),
                status: response.status(),
            });
        }

        let payload = response.json::<AllDocsResponse>().await.map_err(|source| {
            CouchDaoError::DecodeResponse {
                path: ALL_DOCS.to_string(),
                source,
            }
        })?;

        let mut documents = Vec::new();
        for row in payload.rows {
            if let Some(doc) = row.doc {
                let parsed = from_value(doc).map_err(|source| CouchDaoError::DeserializeValue {
                    path: ALL_DOCS.to_string(),
                    source,
                })?;
                documents.push(parsed);
            }
        }

        Ok(documents)
    }

    /// Fetch the stored `_rev` for a document, if it exists.
    async fn current_rev(&self, doc_id: &str) -> CouchResult<Option<String>> {
        #[derive(serde::Deserialize)]
        struct RevOnly {
            #[serde(rename = "_rev")]
            rev: String,
        }

        Ok(self
            .get_document::<RevOnly>(doc_id)
            .await?
            .map(|doc| doc.rev))
    }

    async fn server_time(&self) -> CouchResult<SystemTime> {
        let response = self
            .database_request(Method::HEAD)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: self.database.to_string(),
                source,
            })?;

        let header = response
            .headers()
            .get(reqwest::header::DATE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .ok_or(CouchDaoError::MissingDateHeader)?;

        let parsed = OffsetDateTime::parse(&header, &Rfc2822).map_err(|source| {
            CouchDaoError::InvalidDateHeader {
                value: header,
                source,
            }
        })?;

        Ok(parsed.into())
    }
}

impl GameStore for CouchGameStore {
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let doc_id = game_doc_id(game.id);
            let rev = store.current_rev(&doc_id).await?;
            let doc = CouchGameDocument::from((game, rev));
            store.put_document(&doc_id, &doc).await.map_err(Into::into)
        })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let maybe = store
                .get_document::<CouchGameDocument>(&game_doc_id(id))
                .await?;
            maybe
                .map(GameEntity::try_from)
                .transpose()
                .map_err(Into::into)
        })
    }

    fn find_game_by_code(
        &self,
        code: String,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let docs = store
                .list_documents::<CouchGameDocument>(GAME_PREFIX)
                .await?;
            for doc in docs {
                let game = GameEntity::try_from(doc).map_err(StorageError::from)?;
                if game.code == code && game.state != GameState::Finished {
                    return Ok(Some(game));
                }
            }
            Ok(None)
        })
    }

    fn save_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let doc_id = team_doc_id(team.id);
            let rev = store.current_rev(&doc_id).await?;
            let doc = CouchTeamDocument::from((team, rev));
            store.put_document(&doc_id, &doc).await.map_err(Into::into)
        })
    }

    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let maybe = store
                .get_document::<CouchTeamDocument>(&team_doc_id(id))
                .await?;
            maybe
                .map(TeamEntity::try_from)
                .transpose()
                .map_err(Into::into)
        })
    }

    fn list_teams(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let docs = store
                .list_documents::<CouchTeamDocument>(TEAM_PREFIX)
                .await?;
            let mut teams = Vec::new();
            for doc in docs {
                let team = TeamEntity::try_from(doc).map_err(StorageError::from)?;
                if team.game_id == game_id {
                    teams.push(team);
                }
            }
            Ok(teams)
        })
    }

    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let doc_id = player_doc_id(player.id);
            let rev = store.current_rev(&doc_id).await?;
            let doc = CouchPlayerDocument::from((player, rev));
            store.put_document(&doc_id, &doc).await.map_err(Into::into)
        })
    }

    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let maybe = store
                .get_document::<CouchPlayerDocument>(&player_doc_id(id))
                .await?;
            maybe
                .map(PlayerEntity::try_from)
                .transpose()
                .map_err(Into::into)
        })
    }

    fn list_players(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let docs = store
                .list_documents::<CouchPlayerDocument>(PLAYER_PREFIX)
                .await?;
            let mut players = Vec::new();
            for doc in docs {
                let player = PlayerEntity::try_from(doc).map_err(StorageError::from)?;
                if player.game_id == game_id {
                    players.push(player);
                }
            }
            // Stable join order keeps list responses deterministic for clients.
            players.sort_by_key(|player| player.joined_at);
            Ok(players)
        })
    }

    fn save_word(&self, word: WordEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let doc_id = word_doc_id(word.id);
            let rev = store.current_rev(&doc_id).await?;
            let doc = CouchWordDocument::from((word, rev));
            store.put_document(&doc_id, &doc).await.map_err(Into::into)
        })
    }

    fn find_word(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<WordEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let maybe = store
                .get_document::<CouchWordDocument>(&word_doc_id(id))
                .await?;
            maybe
                .map(WordEntity::try_from)
                .transpose()
                .map_err(Into::into)
        })
    }

    fn delete_word(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let doc_id = word_doc_id(id);
            match store.current_rev(&doc_id).await? {
                Some(rev) => store
                    .delete_document(&doc_id, &rev)
                    .await
                    .map_err(Into::into),
                None => Ok(false),
            }
        })
    }

    fn list_words(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<WordEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let docs = store
                .list_documents::<CouchWordDocument>(WORD_PREFIX)
                .await?;
            let mut words = Vec::new();
            for doc in docs {
                let word = WordEntity::try_from(doc).map_err(StorageError::from)?;
                if word.game_id == game_id {
                    words.push(word);
                }
            }
            Ok(words)
        })
    }

    fn list_words_by_player(
        &self,
        game_id: Uuid,
        player_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<WordEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let words = store.list_words(game_id).await?;
            Ok(words
                .into_iter()
                .filter(|word| word.submitted_by_player_id == player_id)
                .collect())
        })
    }

    fn subscribe(
        &self,
        _game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<broadcast::Receiver<StoreEvent>>> {
        Box::pin(async { Err(StorageError::not_implemented("subscribe")) })
    }

    fn server_time(&self) -> BoxFuture<'static, StorageResult<SystemTime>> {
        let store = self.clone();
        Box::pin(async move { store.server_time().await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let response = store
                .database_request(Method::GET)
                .send()
                .await
                .map_err(|source| CouchDaoError::RequestSend {
                    path: store.database.to_string(),
                    source,
                })?;

            if response.status().is_success() {
                Ok(())
            } else {
                Err(CouchDaoError::RequestStatus {
                    path: store.database.to_string(),
                    status: response.status(),
                }
                .into())
            }
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_database().await.map_err(Into::into) })
    }
}
