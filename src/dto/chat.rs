use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{dao::models::ChatMessageEntity, dto::format_system_time};

/// Payload posting an emoji reaction to the lobby chat.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ChatMessageRequest {
    /// Sending player.
    pub player_id: Uuid,
    /// The emoji payload.
    #[validate(length(min = 1, max = 16))]
    pub emoji: String,
}

/// Public projection of a chat message.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChatMessageSummary {
    /// Message id.
    pub id: Uuid,
    /// Sending player.
    pub player_id: Uuid,
    /// The emoji payload.
    pub emoji: String,
    /// Send time (RFC3339).
    pub created_at: String,
}

impl From<ChatMessageEntity> for ChatMessageSummary {
    fn from(message: ChatMessageEntity) -> Self {
        Self {
            id: message.id,
            player_id: message.player_id,
            emoji: message.emoji,
            created_at: format_system_time(message.created_at),
        }
    }
}
