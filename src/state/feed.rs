use dashmap::DashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::dao::models::{
    CategoryEntity, ChatMessageEntity, FavoriteMovieEntity, FinalBurnEntity, LobbyEntity,
    NomineeEntity, PlayerEntity, QuestionEntity, RoastEntity,
};

/// Row-level mutation kinds carried by the change feed. Deletes carry the
/// old row so consumers can drop it from their local caches by key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowChange<T> {
    /// A new row was committed.
    Inserted(T),
    /// An existing row was replaced.
    Updated(T),
    /// A row was removed.
    Deleted(T),
}

impl<T> RowChange<T> {
    /// The row the change refers to.
    pub fn row(&self) -> &T {
        match self {
            RowChange::Inserted(row) | RowChange::Updated(row) | RowChange::Deleted(row) => row,
        }
    }

    /// Wire suffix for the SSE event name.
    pub fn kind(&self) -> &'static str {
        match self {
            RowChange::Inserted(_) => "inserted",
            RowChange::Updated(_) => "updated",
            RowChange::Deleted(_) => "deleted",
        }
    }
}

/// Typed change notification fanned out to every subscriber of a lobby.
///
/// One variant per table: nothing untyped crosses the feed boundary, and
/// consumers can match on exactly the tables they care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// The lobby row itself changed (start, stage flip, end).
    Lobby(RowChange<LobbyEntity>),
    /// A player joined, changed score/streak, or left.
    Player(RowChange<PlayerEntity>),
    /// A category was locked or its reveal advanced.
    Category(RowChange<CategoryEntity>),
    /// A nominee's winner flag changed.
    Nominee(RowChange<NomineeEntity>),
    /// A trivia question was generated.
    Question(RowChange<QuestionEntity>),
    /// A roast landed for some player.
    Roast(RowChange<RoastEntity>),
    /// The final burn was produced.
    FinalBurn(RowChange<FinalBurnEntity>),
    /// A player submitted a favorite movie.
    FavoriteMovie(RowChange<FavoriteMovieEntity>),
    /// An emoji was posted to the lobby chat.
    ChatMessage(RowChange<ChatMessageEntity>),
}

impl ChangeEvent {
    /// Table the change belongs to, as used in wire event names.
    pub fn table(&self) -> &'static str {
        match self {
            ChangeEvent::Lobby(_) => "lobbies",
            ChangeEvent::Player(_) => "players",
            ChangeEvent::Category(_) => "categories",
            ChangeEvent::Nominee(_) => "nominees",
            ChangeEvent::Question(_) => "questions",
            ChangeEvent::Roast(_) => "roasts",
            ChangeEvent::FinalBurn(_) => "final_burns",
            ChangeEvent::FavoriteMovie(_) => "favorite_movies",
            ChangeEvent::ChatMessage(_) => "chat_messages",
        }
    }

    /// Mutation kind of the inner change.
    pub fn kind(&self) -> &'static str {
        match self {
            ChangeEvent::Lobby(change) => change.kind(),
            ChangeEvent::Player(change) => change.kind(),
            ChangeEvent::Category(change) => change.kind(),
            ChangeEvent::Nominee(change) => change.kind(),
            ChangeEvent::Question(change) => change.kind(),
            ChangeEvent::Roast(change) => change.kind(),
            ChangeEvent::FinalBurn(change) => change.kind(),
            ChangeEvent::FavoriteMovie(change) => change.kind(),
            ChangeEvent::ChatMessage(change) => change.kind(),
        }
    }

    /// SSE event name, e.g. `players.updated`.
    pub fn event_name(&self) -> String {
        format!("{}.{}", self.table(), self.kind())
    }
}

/// Per-lobby broadcast registry backing the change feed.
///
/// Channels are created lazily on first subscription and pruned once the
/// last subscriber is gone, so idle lobbies hold no server-side resources.
pub struct FeedRegistry {
    channels: DashMap<Uuid, broadcast::Sender<ChangeEvent>>,
    capacity: usize,
}

impl FeedRegistry {
    /// Build a registry whose per-lobby channels buffer `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity,
        }
    }

    /// Register a subscriber for one lobby's stream. Dropping the receiver
    /// releases the subscription; the channel disappears with its last
    /// receiver.
    pub fn subscribe(&self, lobby_id: Uuid) -> broadcast::Receiver<ChangeEvent> {
        self.channels
            .entry(lobby_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Fan an event out to the lobby's subscribers, pruning the channel when
    /// nobody is listening anymore.
    pub fn publish(&self, lobby_id: Uuid, event: ChangeEvent) {
        let Some(sender) = self.channels.get(&lobby_id) else {
            return;
        };

        if sender.send(event).is_err() {
            drop(sender);
            self.channels
                .remove_if(&lobby_id, |_, sender| sender.receiver_count() == 0);
        }
    }

    /// Number of lobbies with at least one live channel (diagnostics).
    pub fn active_channels(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;
    use crate::dao::models::{GameMode, GameStage, LobbyConfigEntity};

    fn lobby_event() -> ChangeEvent {
        ChangeEvent::Lobby(RowChange::Updated(LobbyEntity {
            id: Uuid::new_v4(),
            code: "WXYZ".into(),
            host_id: Uuid::new_v4(),
            mode: GameMode::Trivia,
            stage: GameStage::Collecting,
            config: LobbyConfigEntity {
                question_count: 10,
                answer_seconds: 20,
            },
            created_at: SystemTime::now(),
            started_at: Some(SystemTime::now()),
            ended_at: None,
        }))
    }

    #[test]
    fn event_names_follow_table_and_kind() {
        assert_eq!(lobby_event().event_name(), "lobbies.updated");
    }

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let registry = FeedRegistry::new(8);
        let lobby_id = Uuid::new_v4();
        let mut receiver = registry.subscribe(lobby_id);

        registry.publish(lobby_id, lobby_event());

        let received = receiver.recv().await.unwrap();
        assert_eq!(received.table(), "lobbies");
    }

    #[tokio::test]
    async fn events_do_not_cross_lobbies() {
        let registry = FeedRegistry::new(8);
        let mut receiver = registry.subscribe(Uuid::new_v4());

        registry.publish(Uuid::new_v4(), lobby_event());

        assert!(matches!(
            receiver.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn channel_pruned_after_last_subscriber_drops() {
        let registry = FeedRegistry::new(8);
        let lobby_id = Uuid::new_v4();
        let receiver = registry.subscribe(lobby_id);
        assert_eq!(registry.active_channels(), 1);

        drop(receiver);
        registry.publish(lobby_id, lobby_event());
        assert_eq!(registry.active_channels(), 0);
    }
}
