use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::{
        chat::ChatMessageSummary,
        lobby::{LobbySummary, PlayerSummary},
        oscars::{CategorySummary, NomineeSummary},
        trivia::{FavoriteMovieSummary, FinalBurnSummary, QuestionSummary, RoastSummary},
    },
    state::feed::ChangeEvent,
};

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    /// SSE event name, e.g. `players.updated`.
    pub event: Option<String>,
    /// Serialized JSON payload.
    pub data: String,
}

impl ServerEvent {
    /// Build an event with a pre-rendered data payload.
    pub fn new(event: Option<String>, data: String) -> Self {
        Self { event, data }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }

    /// Render a typed change event into its wire form: the event name is
    /// `<table>.<kind>` and the data is the row's public projection.
    pub fn from_change(change: &ChangeEvent) -> serde_json::Result<Self> {
        let event = Some(change.event_name());
        match change {
            ChangeEvent::Lobby(row) => {
                Self::json(event, &LobbySummary::from(row.row().clone()))
            }
            ChangeEvent::Player(row) => {
                Self::json(event, &PlayerSummary::from(row.row().clone()))
            }
            ChangeEvent::Category(row) => {
                Self::json(event, &CategorySummary::from(row.row().clone()))
            }
            ChangeEvent::Nominee(row) => {
                Self::json(event, &NomineeSummary::from(row.row().clone()))
            }
            ChangeEvent::Question(row) => {
                Self::json(event, &QuestionSummary::from(row.row().clone()))
            }
            ChangeEvent::Roast(row) => Self::json(event, &RoastSummary::from(row.row().clone())),
            ChangeEvent::FinalBurn(row) => {
                Self::json(event, &FinalBurnSummary::from(row.row().clone()))
            }
            ChangeEvent::FavoriteMovie(row) => {
                Self::json(event, &FavoriteMovieSummary::from(row.row().clone()))
            }
            ChangeEvent::ChatMessage(row) => {
                Self::json(event, &ChatMessageSummary::from(row.row().clone()))
            }
        }
    }
}

/// Initial metadata sent to an SSE client when it connects.
#[derive(Debug, Serialize, ToSchema)]
pub struct Handshake {
    /// Lobby whose stream this is.
    pub lobby_id: uuid::Uuid,
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Whether the backend is running without a storage backend connection.
    pub degraded: bool,
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use uuid::Uuid;

    use super::*;
    use crate::{
        dao::models::{GameMode, GameStage, LobbyConfigEntity, LobbyEntity, PlayerEntity},
        state::feed::RowChange,
    };

    #[test]
    fn change_events_render_with_table_and_kind_names() {
        let player = PlayerEntity {
            id: Uuid::new_v4(),
            lobby_id: Uuid::new_v4(),
            name: "alice".into(),
            is_host: true,
            score: 0,
            streak: 0,
            correct_answers: 0,
            incorrect_answers: 0,
            has_been_roasted: false,
            created_at: SystemTime::now(),
        };

        let event = ServerEvent::from_change(&ChangeEvent::Player(RowChange::Inserted(player)))
            .expect("player events serialize");
        assert_eq!(event.event.as_deref(), Some("players.inserted"));
        assert!(event.data.contains("alice"));
    }

    #[test]
    fn lobby_updates_expose_timestamps_as_rfc3339() {
        let lobby = LobbyEntity {
            id: Uuid::new_v4(),
            code: "WXYZ".into(),
            host_id: Uuid::new_v4(),
            mode: GameMode::Trivia,
            stage: GameStage::Collecting,
            config: LobbyConfigEntity {
                question_count: 10,
                answer_seconds: 20,
            },
            created_at: SystemTime::UNIX_EPOCH,
            started_at: Some(SystemTime::UNIX_EPOCH),
            ended_at: None,
        };

        let event = ServerEvent::from_change(&ChangeEvent::Lobby(RowChange::Updated(lobby)))
            .expect("lobby events serialize");
        assert_eq!(event.event.as_deref(), Some("lobbies.updated"));
        assert!(event.data.contains("1970-01-01T00:00:00Z"));
        // Unset timestamps are omitted rather than serialized as null.
        assert!(!event.data.contains("ended_at"));
    }
}
