use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database,
    bson::{Document, doc},
    options::IndexOptions,
};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoLobbyDocument, doc_id, uuid_as_binary},
};
use crate::dao::{
    models::{
        AnswerEntity, CategoryEntity, ChatMessageEntity, FavoriteMovieEntity, FinalBurnEntity,
        LobbyEntity, NomineeEntity, PlayerEntity, PredictionEntity, QuestionEntity, RoastEntity,
        ShameMovieEntity,
    },
    party_store::PartyStore,
    storage::StorageResult,
};

const LOBBY_COLLECTION: &str = "lobbies";
const PLAYER_COLLECTION: &str = "players";
const CATEGORY_COLLECTION: &str = "categories";
const NOMINEE_COLLECTION: &str = "nominees";
const PREDICTION_COLLECTION: &str = "predictions";
const QUESTION_COLLECTION: &str = "questions";
const ANSWER_COLLECTION: &str = "answers";
const FAVORITE_COLLECTION: &str = "favorite_movies";
const ROAST_COLLECTION: &str = "roasts";
const FINAL_BURN_COLLECTION: &str = "final_burns";
const SHAME_COLLECTION: &str = "shame_movies";
const CHAT_COLLECTION: &str = "chat_messages";

/// MongoDB-backed [`PartyStore`] with one collection per table.
#[derive(Clone)]
pub struct MongoPartyStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
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
}

impl MongoPartyStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;

        // Join codes must be unique across lobbies.
        let lobbies = database.collection::<Document>(LOBBY_COLLECTION);
        let code_index = mongodb::IndexModel::builder()
            .keys(doc! {"code": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("lobby_code_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            )
            .build();
        lobbies
            .create_index(code_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: LOBBY_COLLECTION,
                index: "code",
                source,
            })?;

        for (collection, key) in [
            (PLAYER_COLLECTION, "lobby_id"),
            (CATEGORY_COLLECTION, "lobby_id"),
            (NOMINEE_COLLECTION, "category_id"),
            (PREDICTION_COLLECTION, "category_id"),
            (QUESTION_COLLECTION, "lobby_id"),
            (ANSWER_COLLECTION, "player_id"),
            (FAVORITE_COLLECTION, "player_id"),
        ] {
            let coll = database.collection::<Document>(collection);
            let index = mongodb::IndexModel::builder()
                .keys(doc! {key: 1})
                .build();
            coll.create_index(index)
                .await
                .map_err(|source| MongoDaoError::EnsureIndex {
                    collection,
                    index: "owner",
                    source,
                })?;
        }

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.database().await.collection::<T>(name)
    }

    async fn replace_row<T>(
        &self,
        collection: &'static str,
        id: Uuid,
        row: &T,
    ) -> MongoResult<()>
    where
        T: Serialize + Send + Sync,
    {
        self.collection::<T>(collection)
            .await
            .replace_one(doc_id(id), row)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::Write { collection, source })?;
        Ok(())
    }

    async fn find_row<T>(&self, collection: &'static str, filter: Document) -> MongoResult<Option<T>>
    where
        T: DeserializeOwned + Send + Sync,
    {
        self.collection::<T>(collection)
            .await
            .find_one(filter)
            .await
            .map_err(|source| MongoDaoError::Read { collection, source })
    }

    async fn list_rows<T>(&self, collection: &'static str, filter: Document) -> MongoResult<Vec<T>>
    where
        T: DeserializeOwned + Send + Sync,
    {
        self.collection::<T>(collection)
            .await
            .find(filter)
            .await
            .map_err(|source| MongoDaoError::Read { collection, source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::Read { collection, source })
    }
}

fn in_filter(field: &str, ids: &[Uuid]) -> Document {
    let binaries: Vec<_> = ids.iter().copied().map(uuid_as_binary).collect();
    doc! { field: { "$in": binaries } }
}

impl PartyStore for MongoPartyStore {
    fn save_lobby(&self, lobby: LobbyEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let id = lobby.id;
            let document: MongoLobbyDocument = lobby.into();
            store
                .replace_row(LOBBY_COLLECTION, id, &document)
                .await
                .map_err(Into::into)
        })
    }

    fn find_lobby(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<LobbyEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let document: Option<MongoLobbyDocument> =
                store.find_row(LOBBY_COLLECTION, doc_id(id)).await?;
            Ok(document.map(Into::into))
        })
    }

    fn find_lobby_by_code(
        &self,
        code: String,
    ) -> BoxFuture<'static, StorageResult<Option<LobbyEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let document: Option<MongoLobbyDocument> = store
                .find_row(LOBBY_COLLECTION, doc! {"code": code})
                .await?;
            Ok(document.map(Into::into))
        })
    }

    fn delete_lobby(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let result = store
                .collection::<MongoLobbyDocument>(LOBBY_COLLECTION)
                .await
                .delete_one(doc_id(id))
                .await
                .map_err(|source| MongoDaoError::Write {
                    collection: LOBBY_COLLECTION,
                    source,
                })?;
            Ok(result.deleted_count > 0)
        })
    }

    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .replace_row(PLAYER_COLLECTION, player.id, &player)
                .await
                .map_err(Into::into)
        })
    }

    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_row(PLAYER_COLLECTION, doc_id(id))
                .await
                .map_err(Into::into)
        })
    }

    fn list_players(
        &self,
        lobby_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut players: Vec<PlayerEntity> = store
                .list_rows(
                    PLAYER_COLLECTION,
                    doc! {"lobby_id": uuid_as_binary(lobby_id)},
                )
                .await?;
            players.sort_by_key(|p| (p.created_at, p.id));
            Ok(players)
        })
    }

    fn save_category(&self, category: CategoryEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .replace_row(CATEGORY_COLLECTION, category.id, &category)
                .await
                .map_err(Into::into)
        })
    }

    fn find_category(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<CategoryEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_row(CATEGORY_COLLECTION, doc_id(id))
                .await
                .map_err(Into::into)
        })
    }

    fn list_categories(
        &self,
        lobby_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<CategoryEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut categories: Vec<CategoryEntity> = store
                .list_rows(
                    CATEGORY_COLLECTION,
                    doc! {"lobby_id": uuid_as_binary(lobby_id)},
                )
                .await?;
            categories.sort_by_key(|c| c.display_order);
            Ok(categories)
        })
    }

    fn save_nominee(&self, nominee: NomineeEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .replace_row(NOMINEE_COLLECTION, nominee.id, &nominee)
                .await
                .map_err(Into::into)
        })
    }

    fn find_nominee(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<NomineeEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_row(NOMINEE_COLLECTION, doc_id(id))
                .await
                .map_err(Into::into)
        })
    }

    fn list_nominees(
        &self,
        category_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<NomineeEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut nominees: Vec<NomineeEntity> = store
                .list_rows(
                    NOMINEE_COLLECTION,
                    doc! {"category_id": uuid_as_binary(category_id)},
                )
                .await?;
            nominees.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(nominees)
        })
    }

    fn save_prediction(
        &self,
        prediction: PredictionEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .replace_row(PREDICTION_COLLECTION, prediction.id, &prediction)
                .await
                .map_err(Into::into)
        })
    }

    fn find_prediction(
        &self,
        player_id: Uuid,
        category_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<PredictionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_row(
                    PREDICTION_COLLECTION,
                    doc! {
                        "player_id": uuid_as_binary(player_id),
                        "category_id": uuid_as_binary(category_id),
                    },
                )
                .await
                .map_err(Into::into)
        })
    }

    fn list_predictions(
        &self,
        category_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<PredictionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_rows(
                    PREDICTION_COLLECTION,
                    doc! {"category_id": uuid_as_binary(category_id)},
                )
                .await
                .map_err(Into::into)
        })
    }

    fn save_questions(
        &self,
        questions: Vec<QuestionEntity>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            for question in questions {
                store
                    .replace_row(QUESTION_COLLECTION, question.id, &question)
                    .await?;
            }
            Ok(())
        })
    }

    fn find_question(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_row(QUESTION_COLLECTION, doc_id(id))
                .await
                .map_err(Into::into)
        })
    }

    fn list_questions(
        &self,
        lobby_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut questions: Vec<QuestionEntity> = store
                .list_rows(
                    QUESTION_COLLECTION,
                    doc! {"lobby_id": uuid_as_binary(lobby_id)},
                )
                .await?;
            questions.sort_by_key(|q| (q.created_at, q.id));
            Ok(questions)
        })
    }

    fn save_answer(&self, answer: AnswerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .replace_row(ANSWER_COLLECTION, answer.id, &answer)
                .await
                .map_err(Into::into)
        })
    }

    fn find_answer(
        &self,
        player_id: Uuid,
        question_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<AnswerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_row(
                    ANSWER_COLLECTION,
                    doc! {
                        "player_id": uuid_as_binary(player_id),
                        "question_id": uuid_as_binary(question_id),
                    },
                )
                .await
                .map_err(Into::into)
        })
    }

    fn list_answers_by_player(
        &self,
        player_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<AnswerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut answers: Vec<AnswerEntity> = store
                .list_rows(
                    ANSWER_COLLECTION,
                    doc! {"player_id": uuid_as_binary(player_id)},
                )
                .await?;
            answers.sort_by_key(|a| std::cmp::Reverse((a.created_at, a.id)));
            Ok(answers)
        })
    }

    fn list_answers_for_players(
        &self,
        player_ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<AnswerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_rows(ANSWER_COLLECTION, in_filter("player_id", &player_ids))
                .await
                .map_err(Into::into)
        })
    }

    fn save_favorite_movie(
        &self,
        favorite: FavoriteMovieEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .replace_row(FAVORITE_COLLECTION, favorite.id, &favorite)
                .await
                .map_err(Into::into)
        })
    }

    fn list_favorites_by_player(
        &self,
        player_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<FavoriteMovieEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_rows(
                    FAVORITE_COLLECTION,
                    doc! {"player_id": uuid_as_binary(player_id)},
                )
                .await
                .map_err(Into::into)
        })
    }

    fn list_favorites_for_players(
        &self,
        player_ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<FavoriteMovieEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_rows(FAVORITE_COLLECTION, in_filter("player_id", &player_ids))
                .await
                .map_err(Into::into)
        })
    }

    fn save_roast(&self, roast: RoastEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .replace_row(ROAST_COLLECTION, roast.id, &roast)
                .await
                .map_err(Into::into)
        })
    }

    fn save_final_burn(&self, burn: FinalBurnEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .replace_row(FINAL_BURN_COLLECTION, burn.id, &burn)
                .await
                .map_err(Into::into)
        })
    }

    fn find_final_burn(
        &self,
        lobby_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<FinalBurnEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_row(
                    FINAL_BURN_COLLECTION,
                    doc! {"lobby_id": uuid_as_binary(lobby_id)},
                )
                .await
                .map_err(Into::into)
        })
    }

    fn save_shame_movie(&self, shame: ShameMovieEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .replace_row(SHAME_COLLECTION, shame.id, &shame)
                .await
                .map_err(Into::into)
        })
    }

    fn list_shame_movies(
        &self,
        lobby_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<ShameMovieEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_rows(
                    SHAME_COLLECTION,
                    doc! {"lobby_id": uuid_as_binary(lobby_id)},
                )
                .await
                .map_err(Into::into)
        })
    }

    fn save_chat_message(
        &self,
        message: ChatMessageEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .replace_row(CHAT_COLLECTION, message.id, &message)
                .await
                .map_err(Into::into)
        })
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
