//! Movie Night Back binary entrypoint wiring REST, SSE, and storage layers.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use movie_night_back::{
    config::AppConfig,
    dao::party_store::memory::MemoryPartyStore,
    llm::LlmConfig,
    routes,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();

    let llm_config = LlmConfig::from_env();
    let llm = llm_config.build_provider();
    match &llm {
        Some(provider) => info!(provider = provider.name(), model = %llm_config.model, "LLM provider configured"),
        None => warn!("no LLM API key configured; generation uses fallback templates"),
    }

    let app_state = AppState::new(config, llm);
    install_storage(app_state.clone());

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Install the storage backend selected by `STORE_BACKEND`: `memory` for the
/// in-process store, anything else for MongoDB behind the reconnecting
/// supervisor.
fn install_storage(state: SharedState) {
    let backend = env::var("STORE_BACKEND").unwrap_or_else(|_| "mongo".into());

    if backend == "memory" {
        tokio::spawn(async move {
            info!("using in-memory storage backend");
            state
                .install_party_store(Arc::new(MemoryPartyStore::new()))
                .await;
        });
        return;
    }

    #[cfg(feature = "mongo-store")]
    {
        use movie_night_back::{
            dao::{
                party_store::PartyStore,
                party_store::mongodb::{MongoConfig, MongoPartyStore},
                storage::StorageError,
            },
            services::storage_supervisor,
        };

        let mongo_uri =
            env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017".into());
        let mongo_db = env::var("MONGO_DB").ok();

        tokio::spawn(storage_supervisor::run(state, move || {
            let uri = mongo_uri.clone();
            let db = mongo_db.clone();
            async move {
                let config = MongoConfig::from_uri(&uri, db.as_deref())
                    .await
                    .map_err(StorageError::from)?;
                let store = MongoPartyStore::connect(config)
                    .await
                    .map_err(StorageError::from)?;
                Ok(Arc::new(store) as Arc<dyn PartyStore>)
            }
        }));
    }

    #[cfg(not(feature = "mongo-store"))]
    {
        warn!("built without mongo-store; falling back to the in-memory backend");
        tokio::spawn(async move {
            state
                .install_party_store(Arc::new(MemoryPartyStore::new()))
                .await;
        });
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
