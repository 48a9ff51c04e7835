//! Library crate for movie-night-back, exposing modules for binaries and
//! integration tests.

/// Runtime configuration loading.
pub mod config;
/// Persistence layer: entities, storage trait, backends.
pub mod dao;
/// Request/response/SSE data transfer objects.
pub mod dto;
/// Service and HTTP error taxonomy.
pub mod error;
/// LLM providers and deterministic fallback templates.
pub mod llm;
/// HTTP route trees.
pub mod routes;
/// Business logic services.
pub mod services;
/// Shared state: store slot, change feed, stage machine, views.
pub mod state;
