//! Fishbowl Back binary entrypoint wiring REST, SSE, and storage layers.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fishbowl_back::{
    config::AppConfig,
    dao::{game_store::GameStore, storage::StorageError},
    routes,
    services::storage_supervisor,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let app_state = AppState::new(config);

    let backend = env::var("STORE_BACKEND").unwrap_or_else(|_| "memory".into());
    spawn_storage_supervisor(app_state.clone(), &backend)?;

    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, backend = %backend, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Select the storage backend at the composition root and run its supervisor.
fn spawn_storage_supervisor(state: SharedState, backend: &str) -> anyhow::Result<()> {
    match backend {
        "memory" => {
            tokio::spawn(storage_supervisor::run(state, || async {
                let store: Arc<dyn GameStore> =
                    Arc::new(fishbowl_back::dao::game_store::memory::MemoryGameStore::new());
                Ok::<_, StorageError>(store)
            }));
            Ok(())
        }
        #[cfg(feature = "mongo-store")]
        "mongo" => {
            use fishbowl_back::dao::game_store::mongodb::{MongoConfig, MongoGameStore};

            let uri =
                env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017".into());
            let db_name = env::var("MONGO_DB").ok();

            tokio::spawn(storage_supervisor::run(state, move || {
                let uri = uri.clone();
                let db_name = db_name.clone();
                async move {
                    let config = MongoConfig::from_uri(&uri, db_name.as_deref()).await?;
                    let store: Arc<dyn GameStore> = Arc::new(MongoGameStore::connect(config).await?);
                    Ok::<_, StorageError>(store)
                }
            }));
            Ok(())
        }
        #[cfg(feature = "couch-store")]
        "couch" => {
            use fishbowl_back::dao::game_store::couchdb::{CouchConfig, CouchGameStore};

            tokio::spawn(storage_supervisor::run(state, move || async move {
                let config = CouchConfig::from_env()?;
                let store: Arc<dyn GameStore> = Arc::new(CouchGameStore::connect(config).await?);
                Ok::<_, StorageError>(store)
            }));
            Ok(())
        }
        other => anyhow::bail!("unsupported STORE_BACKEND `{other}`"),
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
