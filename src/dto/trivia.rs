use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{
        FavoriteMovieEntity, FinalBurnEntity, QuestionEntity, RoastEntity, ShameMovieEntity,
    },
    dto::{common::DifficultyDto, format_system_time, lobby::PlayerSummary,
        validation::validate_movie_titles},
};

/// Payload submitting a player's favorite movies.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SubmitFavoritesRequest {
    /// Id of the submitting player.
    pub player_id: Uuid,
    /// Between 1 and 10 non-blank titles.
    #[validate(custom(function = validate_movie_titles))]
    pub titles: Vec<String>,
}

/// Outcome of a favorites submission, including whether the lobby roster is
/// now fully submitted.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitFavoritesResponse {
    /// Titles stored for this player.
    pub submitted: usize,
    /// Whether every player on the current roster has submitted.
    pub all_submitted: bool,
    /// Whether this submission triggered question generation.
    pub questions_generated: bool,
}

/// Payload asking for trivia generation for a lobby.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateQuestionsRequest {
    /// The lobby to generate for.
    pub lobby_id: Uuid,
}

/// Result of a trivia generation run.
#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateQuestionsResponse {
    /// Number of questions inserted.
    pub generated: usize,
    /// The inserted questions.
    pub questions: Vec<QuestionSummary>,
}

/// Public projection of a trivia question.
///
/// Correctness is checked client-side by exact match against
/// `correct_answer`, so the full row is exposed, matching the lobby's
/// party-game trust model.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuestionSummary {
    /// Question id.
    pub id: Uuid,
    /// Question text.
    pub question: String,
    /// The four options.
    pub options: Vec<String>,
    /// The correct option.
    pub correct_answer: String,
    /// Justification shown after answering.
    pub explanation: Option<String>,
    /// Movie the question is about, when not general knowledge.
    pub movie_title: Option<String>,
    /// Difficulty tier.
    pub difficulty: DifficultyDto,
    /// Base points for a correct answer.
    pub points: u32,
    /// Generation time (RFC3339).
    pub created_at: String,
}

impl From<QuestionEntity> for QuestionSummary {
    fn from(question: QuestionEntity) -> Self {
        Self {
            id: question.id,
            question: question.question,
            options: question.options,
            correct_answer: question.correct_answer,
            explanation: question.explanation,
            movie_title: question.movie_title,
            difficulty: question.difficulty.into(),
            points: question.points,
            created_at: format_system_time(question.created_at),
        }
    }
}

/// Payload recording a player's answer to a question.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AnswerRequest {
    /// Answering player.
    pub player_id: Uuid,
    /// Question being answered.
    pub question_id: Uuid,
    /// The picked option.
    pub answer: String,
    /// Milliseconds the player took to answer.
    pub answer_time_ms: u64,
}

/// Outcome of an answer submission.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnswerOutcome {
    /// Whether the answer matched.
    pub is_correct: bool,
    /// Points granted (zero for a miss).
    pub score_delta: u32,
    /// The player's streak after this answer.
    pub streak: u32,
    /// The correct option, for the reveal.
    pub correct_answer: String,
}

/// Context payload for roast generation, mirroring the answer that earned it.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RoastGenerateRequest {
    /// The roasted player.
    pub player_id: Uuid,
    /// The fumbled question.
    pub question_id: Uuid,
    /// Display name of the player.
    pub player_name: String,
    /// Question text.
    pub question: String,
    /// The wrong option they picked.
    pub wrong_answer: String,
    /// The option they should have picked.
    pub correct_answer: String,
}

/// Public projection of a roast row.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoastSummary {
    /// Roast id.
    pub id: Uuid,
    /// Roasted player.
    pub player_id: Uuid,
    /// Question that earned the roast.
    pub question_id: Uuid,
    /// Roast text.
    pub content: String,
    /// Generation time (RFC3339).
    pub created_at: String,
}

impl From<RoastEntity> for RoastSummary {
    fn from(roast: RoastEntity) -> Self {
        Self {
            id: roast.id,
            player_id: roast.player_id,
            question_id: roast.question_id,
            content: roast.content,
            created_at: format_system_time(roast.created_at),
        }
    }
}

/// Payload asking for the end-of-game burn.
#[derive(Debug, Deserialize, ToSchema)]
pub struct FinalBurnGenerateRequest {
    /// The lobby to end.
    pub lobby_id: Uuid,
}

/// Public projection of the final burn.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FinalBurnSummary {
    /// Burn id.
    pub id: Uuid,
    /// Owning lobby.
    pub lobby_id: Uuid,
    /// The roasted player.
    pub player_id: Uuid,
    /// Burn text.
    pub content: String,
    /// Generation time (RFC3339).
    pub created_at: String,
}

impl From<FinalBurnEntity> for FinalBurnSummary {
    fn from(burn: FinalBurnEntity) -> Self {
        Self {
            id: burn.id,
            lobby_id: burn.lobby_id,
            player_id: burn.player_id,
            content: burn.content,
            created_at: format_system_time(burn.created_at),
        }
    }
}

/// Public projection of a shame-list entry.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShameMovieSummary {
    /// Entry id.
    pub id: Uuid,
    /// The shamed player.
    pub player_id: Uuid,
    /// Title of the fumbled movie.
    pub movie_title: String,
    /// Why the entry exists.
    pub reason: String,
}

impl From<ShameMovieEntity> for ShameMovieSummary {
    fn from(shame: ShameMovieEntity) -> Self {
        Self {
            id: shame.id,
            player_id: shame.player_id,
            movie_title: shame.movie_title,
            reason: shame.reason,
        }
    }
}

/// Public projection of a favorite-movie row (feed payload).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FavoriteMovieSummary {
    /// Favorite id.
    pub id: Uuid,
    /// Submitting player.
    pub player_id: Uuid,
    /// Submitted title.
    pub movie_title: String,
}

impl From<FavoriteMovieEntity> for FavoriteMovieSummary {
    fn from(favorite: FavoriteMovieEntity) -> Self {
        Self {
            id: favorite.id,
            player_id: favorite.player_id,
            movie_title: favorite.movie_title,
        }
    }
}

/// End-of-game results: the burn, the shame list, and the leaderboard.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct ResultsResponse {
    /// The final burn, once generated.
    pub final_burn: Option<FinalBurnSummary>,
    /// Shame-list entries for the lobby.
    pub shame_movies: Vec<ShameMovieSummary>,
    /// Players ordered by descending score.
    pub leaderboard: Vec<PlayerSummary>,
}
