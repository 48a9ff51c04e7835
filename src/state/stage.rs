use thiserror::Error;

use crate::dao::models::GameStage;

/// Events that move a lobby through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageEvent {
    /// The host starts the game; players begin submitting their data.
    Start,
    /// Per-stage content exists (questions generated / predictions closed).
    ContentReady,
    /// The host ends the game and the final summary is produced.
    End,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid stage transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The stage the lobby was in when the invalid event was received.
    pub from: GameStage,
    /// The event that cannot be applied from this stage.
    pub event: StageEvent,
}

/// Compute the stage that follows `from` when `event` is applied.
///
/// The authoritative stage lives on the lobby row; services validate through
/// this function before persisting, so every client derives the same
/// lifecycle from the same row. `End` is accepted from any post-start stage.
pub fn next(from: GameStage, event: StageEvent) -> Result<GameStage, InvalidTransition> {
    let next = match (from, event) {
        (GameStage::Open, StageEvent::Start) => GameStage::Collecting,
        (GameStage::Collecting, StageEvent::ContentReady) => GameStage::Playing,
        (GameStage::Collecting, StageEvent::End) => GameStage::Ended,
        (GameStage::Playing, StageEvent::End) => GameStage::Ended,
        (from, event) => return Err(InvalidTransition { from, event }),
    };

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_happy_path_through_lifecycle() {
        let collecting = next(GameStage::Open, StageEvent::Start).unwrap();
        assert_eq!(collecting, GameStage::Collecting);

        let playing = next(collecting, StageEvent::ContentReady).unwrap();
        assert_eq!(playing, GameStage::Playing);

        assert_eq!(next(playing, StageEvent::End).unwrap(), GameStage::Ended);
    }

    #[test]
    fn host_can_end_during_collection() {
        assert_eq!(
            next(GameStage::Collecting, StageEvent::End).unwrap(),
            GameStage::Ended
        );
    }

    #[test]
    fn content_cannot_arrive_before_start() {
        let err = next(GameStage::Open, StageEvent::ContentReady).unwrap_err();
        assert_eq!(err.from, GameStage::Open);
        assert_eq!(err.event, StageEvent::ContentReady);
    }

    #[test]
    fn ended_is_terminal() {
        assert!(next(GameStage::Ended, StageEvent::Start).is_err());
        assert!(next(GameStage::Ended, StageEvent::ContentReady).is_err());
        assert!(next(GameStage::Ended, StageEvent::End).is_err());
    }

    #[test]
    fn open_cannot_end() {
        assert!(next(GameStage::Open, StageEvent::End).is_err());
    }
}
