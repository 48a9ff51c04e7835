use std::time::SystemTime;

use uuid::Uuid;

use crate::{
    dao::models::ChatMessageEntity,
    dto::chat::{ChatMessageRequest, ChatMessageSummary},
    error::ServiceError,
    services::{feed_events, lobby_service},
    state::SharedState,
};

/// Persist an emoji reaction and fan it out to the lobby.
pub async fn send_message(
    state: &SharedState,
    lobby_id: Uuid,
    request: ChatMessageRequest,
) -> Result<ChatMessageSummary, ServiceError> {
    let store = state.require_party_store().await?;
    lobby_service::require_lobby(&store, lobby_id).await?;
    let player = lobby_service::require_member(&store, lobby_id, request.player_id).await?;

    let message = ChatMessageEntity {
        id: Uuid::new_v4(),
        lobby_id,
        player_id: player.id,
        emoji: request.emoji,
        created_at: SystemTime::now(),
    };
    store.save_chat_message(message.clone()).await?;
    feed_events::chat_inserted(state, &message);

    Ok(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dto::{common::GameModeDto, lobby::CreateGameRequest},
        services::{lobby_service, testing::memory_state},
        state::feed::{ChangeEvent, RowChange},
    };

    #[tokio::test]
    async fn chat_messages_land_on_the_lobby_feed() {
        let state = memory_state().await;
        let entry = lobby_service::create_game(
            &state,
            CreateGameRequest {
                host_name: "Alice".into(),
                mode: GameModeDto::Trivia,
            },
        )
        .await
        .unwrap();

        let mut feed = state.feed().subscribe(entry.lobby_id);

        let message = send_message(
            &state,
            entry.lobby_id,
            ChatMessageRequest {
                player_id: entry.player_id,
                emoji: "🍿".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(message.emoji, "🍿");

        let event = feed.recv().await.unwrap();
        match event {
            ChangeEvent::ChatMessage(RowChange::Inserted(row)) => {
                assert_eq!(row.emoji, "🍿");
            }
            other => panic!("expected a chat insert, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn foreign_players_cannot_post() {
        let state = memory_state().await;
        let entry = lobby_service::create_game(
            &state,
            CreateGameRequest {
                host_name: "Alice".into(),
                mode: GameModeDto::Trivia,
            },
        )
        .await
        .unwrap();

        let err = send_message(
            &state,
            entry.lobby_id,
            ChatMessageRequest {
                player_id: Uuid::new_v4(),
                emoji: "🎬".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
