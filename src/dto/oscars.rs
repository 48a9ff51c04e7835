use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dao::models::{CategoryEntity, NomineeEntity},
    dto::common::RevealStateDto,
};

/// Public projection of a category row (without its nominees).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategorySummary {
    /// Category id.
    pub id: Uuid,
    /// Award name.
    pub name: String,
    /// Position in the reveal sequence.
    pub display_order: u32,
    /// Whether predictions are closed.
    pub locked: bool,
    /// Winner-reveal progress.
    pub reveal_state: RevealStateDto,
}

impl From<CategoryEntity> for CategorySummary {
    fn from(category: CategoryEntity) -> Self {
        Self {
            id: category.id,
            name: category.name,
            display_order: category.display_order,
            locked: category.locked,
            reveal_state: category.reveal_state.into(),
        }
    }
}

/// Public projection of a nominee row.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NomineeSummary {
    /// Nominee id.
    pub id: Uuid,
    /// Owning category.
    pub category_id: Uuid,
    /// Nominee name.
    pub name: String,
    /// Film the nominee is attached to, when distinct from the name.
    pub movie: Option<String>,
    /// Whether this nominee won its category.
    pub is_winner: bool,
}

impl From<NomineeEntity> for NomineeSummary {
    fn from(nominee: NomineeEntity) -> Self {
        Self {
            id: nominee.id,
            category_id: nominee.category_id,
            name: nominee.name,
            movie: nominee.movie,
            is_winner: nominee.is_winner,
        }
    }
}

/// A category bundled with its nominees, as served to game views.
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryWithNominees {
    /// The category itself.
    #[serde(flatten)]
    pub category: CategorySummary,
    /// Its candidates.
    pub nominees: Vec<NomineeSummary>,
}

/// Payload submitting (or changing) a player's pick for a category.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PredictionRequest {
    /// Predicting player.
    pub player_id: Uuid,
    /// Category being predicted.
    pub category_id: Uuid,
    /// Chosen nominee.
    pub nominee_id: Uuid,
}

/// Payload for the host-only winner reveal.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetWinnerRequest {
    /// Id of the acting player; must be the lobby host.
    pub player_id: Uuid,
    /// The winning nominee.
    pub nominee_id: Uuid,
}

/// Outcome of a winner reveal.
#[derive(Debug, Serialize, ToSchema)]
pub struct SetWinnerResponse {
    /// The winning nominee.
    pub winner_id: Uuid,
    /// Players whose scores were updated by this reveal.
    pub players_updated: usize,
}

/// Payload for the standalone score-update endpoint.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateScoresRequest {
    /// Category whose predictions are scored.
    pub category_id: Uuid,
    /// The winning nominee.
    pub nominee_id: Uuid,
}

/// Result of a score update run.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScoreUpdateResponse {
    /// Players whose scores changed.
    pub players_updated: usize,
}
