//! Client-session view state reconciled from snapshots plus the change feed.
//!
//! These types encode the merge rules every consumer of the feed must follow:
//! merge rows by primary key (at-least-once delivery means duplicates),
//! tolerate cross-table reordering, and latch one-shot signals so repeated
//! events cannot re-trigger navigation.

use indexmap::IndexMap;
use uuid::Uuid;

use crate::{
    dao::models::{GameStage, LobbyEntity, PlayerEntity},
    state::feed::{ChangeEvent, RowChange},
};

/// One-shot signals surfaced while reconciling lobby events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobbySignal {
    /// `started_at` transitioned from unset to set. Emitted at most once per
    /// view, no matter how often the update is delivered.
    GameStarted,
}

/// Reconciled pre-game lobby state: the lobby snapshot and a roster merged
/// by player id.
#[derive(Default)]
pub struct LobbyView {
    lobby: Option<LobbyEntity>,
    players: IndexMap<Uuid, PlayerEntity>,
    start_seen: bool,
}

impl LobbyView {
    /// Start from the initial fetch. A lobby that already started does not
    /// re-emit [`LobbySignal::GameStarted`] later.
    pub fn from_snapshot(lobby: LobbyEntity, players: Vec<PlayerEntity>) -> Self {
        let start_seen = lobby.started_at.is_some();
        let players = players.into_iter().map(|p| (p.id, p)).collect();
        Self {
            lobby: Some(lobby),
            players,
            start_seen,
        }
    }

    /// Current lobby snapshot, if any update or snapshot has arrived.
    pub fn lobby(&self) -> Option<&LobbyEntity> {
        self.lobby.as_ref()
    }

    /// Roster ordered by join time.
    pub fn players(&self) -> Vec<&PlayerEntity> {
        let mut players: Vec<&PlayerEntity> = self.players.values().collect();
        players.sort_by_key(|p| (p.created_at, p.id));
        players
    }

    /// Merge one feed event into the view, returning a signal when the event
    /// crosses a one-shot boundary.
    pub fn apply(&mut self, event: &ChangeEvent) -> Option<LobbySignal> {
        match event {
            ChangeEvent::Player(RowChange::Inserted(player))
            | ChangeEvent::Player(RowChange::Updated(player)) => {
                // Insert-or-replace by id: a re-delivered insert is a no-op
                // update, never a duplicate roster entry.
                self.players.insert(player.id, player.clone());
                None
            }
            ChangeEvent::Player(RowChange::Deleted(player)) => {
                self.players.shift_remove(&player.id);
                None
            }
            ChangeEvent::Lobby(RowChange::Inserted(lobby))
            | ChangeEvent::Lobby(RowChange::Updated(lobby)) => {
                let newly_started = lobby.started_at.is_some() && !self.start_seen;
                self.lobby = Some(lobby.clone());
                if newly_started {
                    self.start_seen = true;
                    Some(LobbySignal::GameStarted)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

/// Stage a single player's session is in, derived from shared lobby state
/// plus that player's own progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStage {
    /// The lobby has not started; show the roster.
    WaitingForStart,
    /// Started, but this player has not submitted their setup data yet.
    SubmittingData,
    /// Data submitted; per-stage content has not arrived yet. The content
    /// signal may be observed before the rows exist, so consumers re-fetch.
    WaitingForContent,
    /// The round is live and this player still has questions left.
    Playing,
    /// This player answered everything; the host drives the transition out.
    Finished,
    /// The lobby ended.
    Ended,
}

/// Derive the session stage for one player.
///
/// Pure and idempotent: re-deriving after a reload with the same inputs
/// yields the same stage, which is what makes reload the recovery mechanism.
pub fn derive_stage(
    lobby: &LobbyEntity,
    has_submitted: bool,
    answered: usize,
    question_count: usize,
) -> SessionStage {
    if lobby.ended_at.is_some() || lobby.stage == GameStage::Ended {
        return SessionStage::Ended;
    }
    if lobby.started_at.is_none() {
        return SessionStage::WaitingForStart;
    }
    if !has_submitted {
        return SessionStage::SubmittingData;
    }
    if lobby.stage != GameStage::Playing {
        return SessionStage::WaitingForContent;
    }
    if question_count > 0 && answered >= question_count {
        return SessionStage::Finished;
    }
    SessionStage::Playing
}

/// Position of a player inside the question list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionCursor {
    index: usize,
    total: usize,
}

impl QuestionCursor {
    /// Resume at the first unanswered question.
    pub fn new(total: usize, answered: usize) -> Self {
        Self {
            index: answered.min(total),
            total,
        }
    }

    /// Index of the question currently shown, or `None` once past the end.
    pub fn current(&self) -> Option<usize> {
        (self.index < self.total).then_some(self.index)
    }

    /// Move to the next question. Returns `false` when already past the last
    /// one: the session parks on "waiting for others" and never self-ends.
    pub fn advance(&mut self) -> bool {
        if self.index < self.total {
            self.index += 1;
        }
        self.current().is_some()
    }

    /// Whether the player is parked waiting for the host to end the game.
    pub fn waiting_for_others(&self) -> bool {
        self.total > 0 && self.index >= self.total
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use super::*;
    use crate::dao::models::{GameMode, LobbyConfigEntity};

    fn lobby(stage: GameStage, started: bool, ended: bool) -> LobbyEntity {
        LobbyEntity {
            id: Uuid::new_v4(),
            code: "WXYZ".into(),
            host_id: Uuid::new_v4(),
            mode: GameMode::Trivia,
            stage,
            config: LobbyConfigEntity {
                question_count: 10,
                answer_seconds: 20,
            },
            created_at: SystemTime::UNIX_EPOCH,
            started_at: started.then_some(SystemTime::UNIX_EPOCH + Duration::from_secs(1)),
            ended_at: ended.then_some(SystemTime::UNIX_EPOCH + Duration::from_secs(2)),
        }
    }

    fn player(lobby_id: Uuid, name: &str, joined_secs: u64) -> PlayerEntity {
        PlayerEntity {
            id: Uuid::new_v4(),
            lobby_id,
            name: name.into(),
            is_host: false,
            score: 0,
            streak: 0,
            correct_answers: 0,
            incorrect_answers: 0,
            has_been_roasted: false,
            created_at: SystemTime::UNIX_EPOCH + Duration::from_secs(joined_secs),
        }
    }

    #[test]
    fn duplicate_insert_does_not_duplicate_roster() {
        let snapshot = lobby(GameStage::Open, false, false);
        let joiner = player(snapshot.id, "bob", 5);
        let mut view = LobbyView::from_snapshot(snapshot, vec![]);

        view.apply(&ChangeEvent::Player(RowChange::Inserted(joiner.clone())));
        view.apply(&ChangeEvent::Player(RowChange::Inserted(joiner.clone())));

        assert_eq!(view.players().len(), 1);
        assert_eq!(view.players()[0].name, "bob");
    }

    #[test]
    fn update_of_unknown_player_inserts_it() {
        let snapshot = lobby(GameStage::Open, false, false);
        let lobby_id = snapshot.id;
        let mut view = LobbyView::from_snapshot(snapshot, vec![]);

        // An update delivered before the insert it logically follows.
        let mut late = player(lobby_id, "carol", 3);
        late.score = 50;
        view.apply(&ChangeEvent::Player(RowChange::Updated(late)));

        assert_eq!(view.players().len(), 1);
        assert_eq!(view.players()[0].score, 50);
    }

    #[test]
    fn roster_ordered_by_join_time_regardless_of_delivery_order() {
        let snapshot = lobby(GameStage::Open, false, false);
        let lobby_id = snapshot.id;
        let mut view = LobbyView::from_snapshot(snapshot, vec![]);

        view.apply(&ChangeEvent::Player(RowChange::Inserted(player(
            lobby_id, "late", 9,
        ))));
        view.apply(&ChangeEvent::Player(RowChange::Inserted(player(
            lobby_id, "early", 1,
        ))));

        let names: Vec<&str> = view.players().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["early", "late"]);
    }

    #[test]
    fn start_signal_fires_exactly_once() {
        let mut view = LobbyView::from_snapshot(lobby(GameStage::Open, false, false), vec![]);
        let started = lobby(GameStage::Collecting, true, false);

        let first = view.apply(&ChangeEvent::Lobby(RowChange::Updated(started.clone())));
        let second = view.apply(&ChangeEvent::Lobby(RowChange::Updated(started)));

        assert_eq!(first, Some(LobbySignal::GameStarted));
        assert_eq!(second, None);
    }

    #[test]
    fn already_started_snapshot_never_signals() {
        let mut view = LobbyView::from_snapshot(lobby(GameStage::Collecting, true, false), vec![]);
        let update = lobby(GameStage::Collecting, true, false);
        assert_eq!(
            view.apply(&ChangeEvent::Lobby(RowChange::Updated(update))),
            None
        );
    }

    #[test]
    fn stage_derivation_is_idempotent() {
        let snapshot = lobby(GameStage::Collecting, true, false);
        let first = derive_stage(&snapshot, false, 0, 0);
        let second = derive_stage(&snapshot, false, 0, 0);
        assert_eq!(first, SessionStage::SubmittingData);
        assert_eq!(first, second);
    }

    #[test]
    fn stage_covers_the_session_lifecycle() {
        assert_eq!(
            derive_stage(&lobby(GameStage::Open, false, false), false, 0, 0),
            SessionStage::WaitingForStart
        );
        assert_eq!(
            derive_stage(&lobby(GameStage::Collecting, true, false), true, 0, 0),
            SessionStage::WaitingForContent
        );
        assert_eq!(
            derive_stage(&lobby(GameStage::Playing, true, false), true, 2, 8),
            SessionStage::Playing
        );
        assert_eq!(
            derive_stage(&lobby(GameStage::Playing, true, false), true, 8, 8),
            SessionStage::Finished
        );
        assert_eq!(
            derive_stage(&lobby(GameStage::Playing, true, true), true, 2, 8),
            SessionStage::Ended
        );
    }

    #[test]
    fn content_ready_signal_before_rows_is_tolerated() {
        // The stage can flip to Playing before any question row arrives; the
        // session stays in Playing with zero questions and re-fetches.
        let snapshot = lobby(GameStage::Playing, true, false);
        assert_eq!(
            derive_stage(&snapshot, true, 0, 0),
            SessionStage::Playing
        );
    }

    #[test]
    fn cursor_parks_after_last_question() {
        let mut cursor = QuestionCursor::new(2, 0);
        assert_eq!(cursor.current(), Some(0));
        assert!(cursor.advance());
        assert_eq!(cursor.current(), Some(1));
        assert!(!cursor.advance());
        assert!(cursor.waiting_for_others());
        // Advancing again stays parked.
        assert!(!cursor.advance());
        assert!(cursor.waiting_for_others());
    }

    #[test]
    fn cursor_resumes_at_first_unanswered() {
        let cursor = QuestionCursor::new(5, 3);
        assert_eq!(cursor.current(), Some(3));
    }
}
