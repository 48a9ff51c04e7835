use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Emoji chat DTOs.
pub mod chat;
/// Shared enums and conversions used across DTO modules.
pub mod common;
/// Health endpoint DTOs.
pub mod health;
/// Lobby creation, join, and roster DTOs.
pub mod lobby;
/// Prediction-mode (categories, nominees, winners) DTOs.
pub mod oscars;
/// Server-sent event envelope and payload conversions.
pub mod sse;
/// Trivia-mode (favorites, questions, answers, roasts) DTOs.
pub mod trivia;
/// Validation helpers for DTO fields.
pub mod validation;

pub(crate) fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
