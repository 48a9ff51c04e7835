use std::{collections::HashMap, sync::Arc};

use futures::future::BoxFuture;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dao::{
    models::{
        AnswerEntity, CategoryEntity, ChatMessageEntity, FavoriteMovieEntity, FinalBurnEntity,
        LobbyEntity, NomineeEntity, PlayerEntity, PredictionEntity, QuestionEntity, RoastEntity,
        ShameMovieEntity,
    },
    party_store::PartyStore,
    storage::StorageResult,
};

/// Lock-protected table snapshot backing the in-memory store.
#[derive(Default)]
struct Tables {
    lobbies: HashMap<Uuid, LobbyEntity>,
    players: HashMap<Uuid, PlayerEntity>,
    categories: HashMap<Uuid, CategoryEntity>,
    nominees: HashMap<Uuid, NomineeEntity>,
    predictions: HashMap<Uuid, PredictionEntity>,
    questions: HashMap<Uuid, QuestionEntity>,
    answers: HashMap<Uuid, AnswerEntity>,
    favorites: HashMap<Uuid, FavoriteMovieEntity>,
    roasts: HashMap<Uuid, RoastEntity>,
    final_burns: HashMap<Uuid, FinalBurnEntity>,
    shame_movies: HashMap<Uuid, ShameMovieEntity>,
    chat_messages: HashMap<Uuid, ChatMessageEntity>,
}

/// Storage backend holding every table in process memory.
///
/// Fills the second-backend slot next to MongoDB: it powers the service
/// tests and `STORE_BACKEND=memory` deployments where persistence across
/// restarts does not matter.
#[derive(Clone, Default)]
pub struct MemoryPartyStore {
    inner: Arc<RwLock<Tables>>,
}

impl MemoryPartyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PartyStore for MemoryPartyStore {
    fn save_lobby(&self, lobby: LobbyEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.write().await.lobbies.insert(lobby.id, lobby);
            Ok(())
        })
    }

    fn find_lobby(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<LobbyEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.read().await.lobbies.get(&id).cloned()) })
    }

    fn find_lobby_by_code(
        &self,
        code: String,
    ) -> BoxFuture<'static, StorageResult<Option<LobbyEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let guard = store.inner.read().await;
            Ok(guard.lobbies.values().find(|l| l.code == code).cloned())
        })
    }

    fn delete_lobby(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.write().await.lobbies.remove(&id).is_some()) })
    }

    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.write().await.players.insert(player.id, player);
            Ok(())
        })
    }

    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.read().await.players.get(&id).cloned()) })
    }

    fn list_players(
        &self,
        lobby_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let guard = store.inner.read().await;
            let mut players: Vec<PlayerEntity> = guard
                .players
                .values()
                .filter(|p| p.lobby_id == lobby_id)
                .cloned()
                .collect();
            players.sort_by_key(|p| (p.created_at, p.id));
            Ok(players)
        })
    }

    fn save_category(&self, category: CategoryEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .inner
                .write()
                .await
                .categories
                .insert(category.id, category);
            Ok(())
        })
    }

    fn find_category(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<CategoryEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.read().await.categories.get(&id).cloned()) })
    }

    fn list_categories(
        &self,
        lobby_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<CategoryEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let guard = store.inner.read().await;
            let mut categories: Vec<CategoryEntity> = guard
                .categories
                .values()
                .filter(|c| c.lobby_id == lobby_id)
                .cloned()
                .collect();
            categories.sort_by_key(|c| c.display_order);
            Ok(categories)
        })
    }

    fn save_nominee(&self, nominee: NomineeEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .inner
                .write()
                .await
                .nominees
                .insert(nominee.id, nominee);
            Ok(())
        })
    }

    fn find_nominee(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<NomineeEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.read().await.nominees.get(&id).cloned()) })
    }

    fn list_nominees(
        &self,
        category_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<NomineeEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let guard = store.inner.read().await;
            let mut nominees: Vec<NomineeEntity> = guard
                .nominees
                .values()
                .filter(|n| n.category_id == category_id)
                .cloned()
                .collect();
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
                .inner
                .write()
                .await
                .predictions
                .insert(prediction.id, prediction);
            Ok(())
        })
    }

    fn find_prediction(
        &self,
        player_id: Uuid,
        category_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<PredictionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let guard = store.inner.read().await;
            Ok(guard
                .predictions
                .values()
                .find(|p| p.player_id == player_id && p.category_id == category_id)
                .cloned())
        })
    }

    fn list_predictions(
        &self,
        category_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<PredictionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let guard = store.inner.read().await;
            Ok(guard
                .predictions
                .values()
                .filter(|p| p.category_id == category_id)
                .cloned()
                .collect())
        })
    }

    fn save_questions(
        &self,
        questions: Vec<QuestionEntity>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let mut guard = store.inner.write().await;
            for question in questions {
                guard.questions.insert(question.id, question);
            }
            Ok(())
        })
    }

    fn find_question(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.read().await.questions.get(&id).cloned()) })
    }

    fn list_questions(
        &self,
        lobby_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let guard = store.inner.read().await;
            let mut questions: Vec<QuestionEntity> = guard
                .questions
                .values()
                .filter(|q| q.lobby_id == lobby_id)
                .cloned()
                .collect();
            questions.sort_by_key(|q| (q.created_at, q.id));
            Ok(questions)
        })
    }

    fn save_answer(&self, answer: AnswerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.write().await.answers.insert(answer.id, answer);
            Ok(())
        })
    }

    fn find_answer(
        &self,
        player_id: Uuid,
        question_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<AnswerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let guard = store.inner.read().await;
            Ok(guard
                .answers
                .values()
                .find(|a| a.player_id == player_id && a.question_id == question_id)
                .cloned())
        })
    }

    fn list_answers_by_player(
        &self,
        player_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<AnswerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let guard = store.inner.read().await;
            let mut answers: Vec<AnswerEntity> = guard
                .answers
                .values()
                .filter(|a| a.player_id == player_id)
                .cloned()
                .collect();
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
            let guard = store.inner.read().await;
            Ok(guard
                .answers
                .values()
                .filter(|a| player_ids.contains(&a.player_id))
                .cloned()
                .collect())
        })
    }

    fn save_favorite_movie(
        &self,
        favorite: FavoriteMovieEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .inner
                .write()
                .await
                .favorites
                .insert(favorite.id, favorite);
            Ok(())
        })
    }

    fn list_favorites_by_player(
        &self,
        player_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<FavoriteMovieEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let guard = store.inner.read().await;
            Ok(guard
                .favorites
                .values()
                .filter(|f| f.player_id == player_id)
                .cloned()
                .collect())
        })
    }

    fn list_favorites_for_players(
        &self,
        player_ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<FavoriteMovieEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let guard = store.inner.read().await;
            Ok(guard
                .favorites
                .values()
                .filter(|f| player_ids.contains(&f.player_id))
                .cloned()
                .collect())
        })
    }

    fn save_roast(&self, roast: RoastEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.write().await.roasts.insert(roast.id, roast);
            Ok(())
        })
    }

    fn save_final_burn(&self, burn: FinalBurnEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.write().await.final_burns.insert(burn.id, burn);
            Ok(())
        })
    }

    fn find_final_burn(
        &self,
        lobby_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<FinalBurnEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let guard = store.inner.read().await;
            Ok(guard
                .final_burns
                .values()
                .find(|b| b.lobby_id == lobby_id)
                .cloned())
        })
    }

    fn save_shame_movie(&self, shame: ShameMovieEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .inner
                .write()
                .await
                .shame_movies
                .insert(shame.id, shame);
            Ok(())
        })
    }

    fn list_shame_movies(
        &self,
        lobby_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<ShameMovieEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let guard = store.inner.read().await;
            Ok(guard
                .shame_movies
                .values()
                .filter(|s| s.lobby_id == lobby_id)
                .cloned()
                .collect())
        })
    }

    fn save_chat_message(
        &self,
        message: ChatMessageEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .inner
                .write()
                .await
                .chat_messages
                .insert(message.id, message);
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;
    use crate::dao::models::{GameMode, GameStage, LobbyConfigEntity};

    fn lobby(code: &str) -> LobbyEntity {
        LobbyEntity {
            id: Uuid::new_v4(),
            code: code.to_string(),
            host_id: Uuid::new_v4(),
            mode: GameMode::Trivia,
            stage: GameStage::Open,
            config: LobbyConfigEntity {
                question_count: 10,
                answer_seconds: 20,
            },
            created_at: SystemTime::now(),
            started_at: None,
            ended_at: None,
        }
    }

    #[tokio::test]
    async fn lobby_round_trip_by_code() {
        let store = MemoryPartyStore::new();
        let lobby = lobby("WXYZ");
        store.save_lobby(lobby.clone()).await.unwrap();

        let found = store
            .find_lobby_by_code("WXYZ".into())
            .await
            .unwrap()
            .expect("lobby should resolve by code");
        assert_eq!(found.host_id, lobby.host_id);
        assert!(found.started_at.is_none());

        assert!(
            store
                .find_lobby_by_code("QQQQ".into())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn players_listed_in_join_order() {
        let store = MemoryPartyStore::new();
        let lobby_id = Uuid::new_v4();
        for (offset, name) in ["first", "second", "third"].iter().enumerate() {
            store
                .save_player(PlayerEntity {
                    id: Uuid::new_v4(),
                    lobby_id,
                    name: name.to_string(),
                    is_host: offset == 0,
                    score: 0,
                    streak: 0,
                    correct_answers: 0,
                    incorrect_answers: 0,
                    has_been_roasted: false,
                    created_at: SystemTime::UNIX_EPOCH
                        + std::time::Duration::from_secs(offset as u64),
                })
                .await
                .unwrap();
        }

        let players = store.list_players(lobby_id).await.unwrap();
        let names: Vec<&str> = players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn prediction_upsert_replaces_by_id() {
        let store = MemoryPartyStore::new();
        let (player_id, category_id) = (Uuid::new_v4(), Uuid::new_v4());
        let mut prediction = PredictionEntity {
            id: Uuid::new_v4(),
            player_id,
            category_id,
            nominee_id: Uuid::new_v4(),
            scored: false,
            created_at: SystemTime::now(),
            updated_at: SystemTime::now(),
        };
        store.save_prediction(prediction.clone()).await.unwrap();

        let second_pick = Uuid::new_v4();
        prediction.nominee_id = second_pick;
        store.save_prediction(prediction).await.unwrap();

        let live = store
            .find_prediction(player_id, category_id)
            .await
            .unwrap()
            .expect("prediction should exist");
        assert_eq!(live.nominee_id, second_pick);
        assert_eq!(store.list_predictions(category_id).await.unwrap().len(), 1);
    }
}
