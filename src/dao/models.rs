use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

/// Gameplay flavour a lobby was created for. The two flows share the lobby
/// and stage machinery but are mutually exclusive within one lobby.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Award-show predictions with host-driven winner reveals.
    Predictions,
    /// AI-generated movie trivia with roasts.
    Trivia,
}

/// Lifecycle stage of a lobby, persisted on the lobby row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameStage {
    /// Waiting for players to join; the host has not started yet.
    Open,
    /// Started; players are submitting predictions or favorite movies.
    Collecting,
    /// Content is ready and the round is live.
    Playing,
    /// The game is over and the final summary exists.
    Ended,
}

/// Persisted status of the winner-reveal sequence for a category.
///
/// `Revealing` marks a sequence that started but has not completed; a retry
/// of the reveal resumes from idempotent steps instead of double-granting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RevealState {
    /// No winner has been picked yet.
    Open,
    /// A reveal sequence is in flight (or crashed mid-way).
    Revealing,
    /// Winner set, category locked, scores granted.
    Revealed,
}

/// Per-lobby gameplay settings chosen at creation time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LobbyConfigEntity {
    /// How many trivia questions to aim for when generating.
    pub question_count: u32,
    /// Seconds a player has to answer a question.
    pub answer_seconds: u32,
}

/// A game session identified by its short join code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LobbyEntity {
    /// Primary key of the lobby.
    pub id: Uuid,
    /// Unique 4-character uppercase join code.
    pub code: String,
    /// Player id of the lobby creator.
    pub host_id: Uuid,
    /// Which gameplay flow this lobby runs.
    pub mode: GameMode,
    /// Current lifecycle stage.
    pub stage: GameStage,
    /// Gameplay settings.
    pub config: LobbyConfigEntity,
    /// Creation timestamp.
    pub created_at: SystemTime,
    /// Set once when the host starts the game.
    pub started_at: Option<SystemTime>,
    /// Set once when the game ends; only ever after `started_at`.
    pub ended_at: Option<SystemTime>,
}

/// A participant in a lobby, including their live score counters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerEntity {
    /// Primary key of the player.
    pub id: Uuid,
    /// Lobby the player belongs to.
    pub lobby_id: Uuid,
    /// Display name chosen when joining.
    pub name: String,
    /// Whether this player created the lobby. Exactly one per lobby.
    pub is_host: bool,
    /// Accumulated score; never decreases.
    pub score: i32,
    /// Current run of consecutive correct answers.
    pub streak: u32,
    /// Total correct answers so far.
    pub correct_answers: u32,
    /// Total incorrect answers so far.
    pub incorrect_answers: u32,
    /// Whether a roast has already been generated for this player.
    pub has_been_roasted: bool,
    /// Join timestamp, used to order the roster.
    pub created_at: SystemTime,
}

/// An award race owned by a prediction-mode lobby.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryEntity {
    /// Primary key of the category.
    pub id: Uuid,
    /// Owning lobby.
    pub lobby_id: Uuid,
    /// Award name, e.g. "Best Picture".
    pub name: String,
    /// Position in the reveal sequence.
    pub display_order: u32,
    /// One-way flag set when predictions close.
    pub locked: bool,
    /// Status of the winner-reveal sequence.
    pub reveal_state: RevealState,
    /// Creation timestamp.
    pub created_at: SystemTime,
}

/// A candidate inside a category. At most one nominee per category carries
/// `is_winner = true` at any time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NomineeEntity {
    /// Primary key of the nominee.
    pub id: Uuid,
    /// Owning category.
    pub category_id: Uuid,
    /// Nominee name (person or film).
    pub name: String,
    /// Film the nominee is attached to, when distinct from the name.
    pub movie: Option<String>,
    /// One-way flag; set through the reveal sequence only.
    pub is_winner: bool,
}

/// A player's pick for a category. Upserted: one live row per
/// player + category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PredictionEntity {
    /// Primary key of the prediction.
    pub id: Uuid,
    /// Predicting player.
    pub player_id: Uuid,
    /// Category the pick applies to.
    pub category_id: Uuid,
    /// Chosen nominee.
    pub nominee_id: Uuid,
    /// Whether points for this prediction were already granted.
    pub scored: bool,
    /// First submission timestamp.
    pub created_at: SystemTime,
    /// Last change timestamp (bumped on upsert).
    pub updated_at: SystemTime,
}

/// Difficulty tier of a trivia question, which fixes its base points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// 100 base points.
    Easy,
    /// 200 base points.
    Medium,
    /// 300 base points.
    Hard,
}

impl Difficulty {
    /// Base points awarded for a correct answer at this tier.
    pub fn base_points(self) -> u32 {
        match self {
            Difficulty::Easy => 100,
            Difficulty::Medium => 200,
            Difficulty::Hard => 300,
        }
    }
}

/// A generated trivia question with exactly four options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionEntity {
    /// Primary key of the question.
    pub id: Uuid,
    /// Owning lobby.
    pub lobby_id: Uuid,
    /// Question text.
    pub question: String,
    /// The four answer options.
    pub options: Vec<String>,
    /// The correct option, matching one of `options` exactly.
    pub correct_answer: String,
    /// Short justification shown after answering.
    pub explanation: Option<String>,
    /// Movie the question was generated from, when not general knowledge.
    pub movie_title: Option<String>,
    /// Difficulty tier.
    pub difficulty: Difficulty,
    /// Base points for a correct answer.
    pub points: u32,
    /// Generation timestamp, used to order the question list.
    pub created_at: SystemTime,
}

/// A player's recorded answer. Append-only: at most one per
/// player + question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerEntity {
    /// Primary key of the answer.
    pub id: Uuid,
    /// Answering player.
    pub player_id: Uuid,
    /// Question answered.
    pub question_id: Uuid,
    /// The option the player picked.
    pub answer: String,
    /// Whether it matched the correct option.
    pub is_correct: bool,
    /// Milliseconds the player took to answer.
    pub answer_time_ms: u64,
    /// Submission timestamp.
    pub created_at: SystemTime,
}

/// A favorite movie submitted by a player during the collecting stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FavoriteMovieEntity {
    /// Primary key of the favorite.
    pub id: Uuid,
    /// Submitting player.
    pub player_id: Uuid,
    /// Title as typed by the player.
    pub movie_title: String,
    /// Submission timestamp.
    pub created_at: SystemTime,
}

/// A generated roast reacting to one wrong answer. Never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoastEntity {
    /// Primary key of the roast.
    pub id: Uuid,
    /// Roasted player.
    pub player_id: Uuid,
    /// Question that earned the roast.
    pub question_id: Uuid,
    /// Roast text.
    pub content: String,
    /// Generation timestamp.
    pub created_at: SystemTime,
}

/// The end-of-game roast targeting the lowest-scoring player. Never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FinalBurnEntity {
    /// Primary key of the burn.
    pub id: Uuid,
    /// Owning lobby.
    pub lobby_id: Uuid,
    /// The roasted (lowest-scoring) player.
    pub player_id: Uuid,
    /// Burn text.
    pub content: String,
    /// Generation timestamp.
    pub created_at: SystemTime,
}

/// A movie a player embarrassingly failed a question about. Never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShameMovieEntity {
    /// Primary key of the entry.
    pub id: Uuid,
    /// Owning lobby.
    pub lobby_id: Uuid,
    /// The player being shamed.
    pub player_id: Uuid,
    /// Title of the fumbled movie.
    pub movie_title: String,
    /// Human-readable reason for the entry.
    pub reason: String,
    /// Creation timestamp.
    pub created_at: SystemTime,
}

/// An emoji reaction posted to the lobby chat. Never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessageEntity {
    /// Primary key of the message.
    pub id: Uuid,
    /// Owning lobby.
    pub lobby_id: Uuid,
    /// Sending player.
    pub player_id: Uuid,
    /// The emoji payload.
    pub emoji: String,
    /// Send timestamp.
    pub created_at: SystemTime,
}
