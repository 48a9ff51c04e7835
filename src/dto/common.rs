use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::dao::models::{Difficulty, GameMode, GameStage, RevealState};

/// Gameplay flavour exposed to clients.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameModeDto {
    /// Award predictions with host-driven reveals.
    Predictions,
    /// AI-generated movie trivia.
    Trivia,
}

impl From<GameMode> for GameModeDto {
    fn from(value: GameMode) -> Self {
        match value {
            GameMode::Predictions => GameModeDto::Predictions,
            GameMode::Trivia => GameModeDto::Trivia,
        }
    }
}

impl From<GameModeDto> for GameMode {
    fn from(value: GameModeDto) -> Self {
        match value {
            GameModeDto::Predictions => GameMode::Predictions,
            GameModeDto::Trivia => GameMode::Trivia,
        }
    }
}

/// Lobby lifecycle stage exposed to clients.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameStageDto {
    /// Waiting for players; not started.
    Open,
    /// Players are submitting their setup data.
    Collecting,
    /// The round is live.
    Playing,
    /// Finished; the final summary exists.
    Ended,
}

impl From<GameStage> for GameStageDto {
    fn from(value: GameStage) -> Self {
        match value {
            GameStage::Open => GameStageDto::Open,
            GameStage::Collecting => GameStageDto::Collecting,
            GameStage::Playing => GameStageDto::Playing,
            GameStage::Ended => GameStageDto::Ended,
        }
    }
}

/// Winner-reveal progress exposed to clients.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RevealStateDto {
    /// No winner picked yet.
    Open,
    /// Reveal sequence in flight.
    Revealing,
    /// Winner set and scores granted.
    Revealed,
}

impl From<RevealState> for RevealStateDto {
    fn from(value: RevealState) -> Self {
        match value {
            RevealState::Open => RevealStateDto::Open,
            RevealState::Revealing => RevealStateDto::Revealing,
            RevealState::Revealed => RevealStateDto::Revealed,
        }
    }
}

/// Question difficulty tier exposed to clients.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyDto {
    /// 100 base points.
    Easy,
    /// 200 base points.
    Medium,
    /// 300 base points.
    Hard,
}

impl From<Difficulty> for DifficultyDto {
    fn from(value: Difficulty) -> Self {
        match value {
            Difficulty::Easy => DifficultyDto::Easy,
            Difficulty::Medium => DifficultyDto::Medium,
            Difficulty::Hard => DifficultyDto::Hard,
        }
    }
}
