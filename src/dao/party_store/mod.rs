/// In-memory backend used by tests and database-less deployments.
pub mod memory;
#[cfg(feature = "mongo-store")]
/// MongoDB-backed store.
pub mod mongodb;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::models::{
    AnswerEntity, CategoryEntity, ChatMessageEntity, FavoriteMovieEntity, FinalBurnEntity,
    LobbyEntity, NomineeEntity, PlayerEntity, PredictionEntity, QuestionEntity, RoastEntity,
    ShameMovieEntity,
};
use crate::dao::storage::StorageResult;

/// Abstraction over the persistence layer: one method per query shape the
/// services actually issue, so test doubles stay compile-time checked.
///
/// `save_*` methods upsert by primary key. Lookups return `Ok(None)` on
/// absence; the error channel is reserved for backend failures. No
/// transaction spans more than one call.
pub trait PartyStore: Send + Sync {
    /// Upsert a lobby row.
    fn save_lobby(&self, lobby: LobbyEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Look up a lobby by primary key.
    fn find_lobby(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<LobbyEntity>>>;
    /// Look up a lobby by its join code (uniqueness check and join flow).
    fn find_lobby_by_code(
        &self,
        code: String,
    ) -> BoxFuture<'static, StorageResult<Option<LobbyEntity>>>;
    /// Delete a lobby row. Used only as the create-game compensation.
    fn delete_lobby(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;

    /// Upsert a player row.
    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Look up a player by primary key.
    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>>;
    /// All players of a lobby ordered by join time.
    fn list_players(&self, lobby_id: Uuid)
    -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>>;

    /// Upsert a category row.
    fn save_category(&self, category: CategoryEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Look up a category by primary key.
    fn find_category(&self, id: Uuid)
    -> BoxFuture<'static, StorageResult<Option<CategoryEntity>>>;
    /// All categories of a lobby ordered by display order.
    fn list_categories(
        &self,
        lobby_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<CategoryEntity>>>;

    /// Upsert a nominee row.
    fn save_nominee(&self, nominee: NomineeEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Look up a nominee by primary key.
    fn find_nominee(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<NomineeEntity>>>;
    /// All nominees of a category.
    fn list_nominees(
        &self,
        category_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<NomineeEntity>>>;

    /// Upsert a prediction row.
    fn save_prediction(
        &self,
        prediction: PredictionEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// The live prediction of one player for one category, if any.
    fn find_prediction(
        &self,
        player_id: Uuid,
        category_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<PredictionEntity>>>;
    /// All predictions for a category (winner scoring).
    fn list_predictions(
        &self,
        category_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<PredictionEntity>>>;

    /// Bulk insert freshly generated questions.
    fn save_questions(
        &self,
        questions: Vec<QuestionEntity>,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Look up a question by primary key.
    fn find_question(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>>;
    /// All questions of a lobby ordered by creation time.
    fn list_questions(
        &self,
        lobby_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>>;

    /// Insert an answer row.
    fn save_answer(&self, answer: AnswerEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// The answer a player already gave to a question, if any (dedup guard).
    fn find_answer(
        &self,
        player_id: Uuid,
        question_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<AnswerEntity>>>;
    /// A player's answers, newest first (streak and roast context).
    fn list_answers_by_player(
        &self,
        player_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<AnswerEntity>>>;
    /// Answers of a set of players (final-burn aggregation).
    fn list_answers_for_players(
        &self,
        player_ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<AnswerEntity>>>;

    /// Insert a favorite-movie row.
    fn save_favorite_movie(
        &self,
        favorite: FavoriteMovieEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Favorites submitted by one player.
    fn list_favorites_by_player(
        &self,
        player_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<FavoriteMovieEntity>>>;
    /// Favorites of a set of players (all-submitted check, generation).
    fn list_favorites_for_players(
        &self,
        player_ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<FavoriteMovieEntity>>>;

    /// Insert a roast row.
    fn save_roast(&self, roast: RoastEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Insert the final-burn row.
    fn save_final_burn(&self, burn: FinalBurnEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// The final burn of a lobby, if the game has ended.
    fn find_final_burn(
        &self,
        lobby_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<FinalBurnEntity>>>;
    /// Insert a shame-movie row.
    fn save_shame_movie(&self, shame: ShameMovieEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Shame entries of a lobby (final results view).
    fn list_shame_movies(
        &self,
        lobby_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<ShameMovieEntity>>>;
    /// Insert a chat message row.
    fn save_chat_message(
        &self,
        message: ChatMessageEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;

    /// Cheap connectivity probe used by the storage supervisor.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the backend connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
