use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{LobbyEntity, PlayerEntity},
    dto::{
        common::{GameModeDto, GameStageDto},
        format_system_time,
        validation::validate_join_code,
    },
};

/// Payload used to create a fresh lobby, naming its host.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateGameRequest {
    /// Display name for the host player.
    #[validate(length(min = 1, max = 32))]
    pub host_name: String,
    /// Gameplay flavour; defaults to trivia.
    #[serde(default = "default_mode")]
    pub mode: GameModeDto,
}

fn default_mode() -> GameModeDto {
    GameModeDto::Trivia
}

/// Payload used to join an existing lobby by code.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct JoinGameRequest {
    /// The 4-character join code (case and whitespace insensitive).
    #[validate(custom(function = validate_join_code))]
    pub game_code: String,
    /// Display name for the joining player.
    #[validate(length(min = 1, max = 32))]
    pub player_name: String,
}

/// Identity handed back after creating or joining a game.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameEntryResponse {
    /// The lobby joined or created.
    pub lobby_id: Uuid,
    /// The caller's player id.
    pub player_id: Uuid,
    /// The lobby's join code.
    pub lobby_code: String,
}

/// Public projection of a lobby row.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LobbySummary {
    /// Lobby id.
    pub id: Uuid,
    /// Join code.
    pub code: String,
    /// Player id of the host.
    pub host_id: Uuid,
    /// Gameplay flavour.
    pub mode: GameModeDto,
    /// Current lifecycle stage.
    pub stage: GameStageDto,
    /// Questions aimed for during generation.
    pub question_count: u32,
    /// Seconds allowed per answer.
    pub answer_seconds: u32,
    /// Creation time (RFC3339).
    pub created_at: String,
    /// Start time, once the host starts.
    pub started_at: Option<String>,
    /// End time, once the game ends.
    pub ended_at: Option<String>,
}

impl From<LobbyEntity> for LobbySummary {
    fn from(lobby: LobbyEntity) -> Self {
        Self {
            id: lobby.id,
            code: lobby.code,
            host_id: lobby.host_id,
            mode: lobby.mode.into(),
            stage: lobby.stage.into(),
            question_count: lobby.config.question_count,
            answer_seconds: lobby.config.answer_seconds,
            created_at: format_system_time(lobby.created_at),
            started_at: lobby.started_at.map(format_system_time),
            ended_at: lobby.ended_at.map(format_system_time),
        }
    }
}

/// Public projection of a player row.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlayerSummary {
    /// Player id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Whether this player is the lobby host.
    pub is_host: bool,
    /// Current score.
    pub score: i32,
    /// Current correct-answer streak.
    pub streak: u32,
    /// Correct answers so far.
    pub correct_answers: u32,
    /// Incorrect answers so far.
    pub incorrect_answers: u32,
    /// Join time (RFC3339).
    pub created_at: String,
}

impl From<PlayerEntity> for PlayerSummary {
    fn from(player: PlayerEntity) -> Self {
        Self {
            id: player.id,
            name: player.name,
            is_host: player.is_host,
            score: player.score,
            streak: player.streak,
            correct_answers: player.correct_answers,
            incorrect_answers: player.incorrect_answers,
            created_at: format_system_time(player.created_at),
        }
    }
}

/// Request body for host-only lobby actions.
#[derive(Debug, Deserialize, ToSchema)]
pub struct HostActionRequest {
    /// Id of the acting player; must be the lobby host.
    pub player_id: Uuid,
}

/// Response returned once a game has been started.
#[derive(Debug, Serialize, ToSchema)]
pub struct StartGameResponse {
    /// When the game started (RFC3339).
    pub started_at: String,
    /// Stage after the start.
    pub stage: GameStageDto,
}
