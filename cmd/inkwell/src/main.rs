//! # Inkwell
//!
//! Assembles the adapters selected at compile time and serves the HTTP API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use api_adapters::{router, AppState};
use auth_adapters::{Argon2AuthProvider, InMemorySessionStore};
use configs::{LogFormat, LogSettings, Settings};
use services::{Ports, ServiceSettings, Services};
use storage_adapters::{JsonFileStore, LocalMediaStorage};
use tracing_subscriber::EnvFilter;

fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
    }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading configuration")?;
    init_tracing(&settings.log);
    for warning in settings.warnings() {
        tracing::warn!("{warning}");
    }

    // 1. Document store
    let store = JsonFileStore::new(&settings.storage.document_path);
    if settings.storage.create_if_missing {
        store.init_if_missing().await?;
    }

    // 2. Media side-tree
    let media = LocalMediaStorage::new(&settings.storage.upload_dir, "/static");
    media.ensure_dirs().await.context("creating upload directories")?;

    // 3. Auth
    let auth = Argon2AuthProvider::new(settings.security.ip_hash_secret);

    let services = Services::new(
        Ports {
            store: Arc::new(store),
            auth: Arc::new(auth),
            sessions: Arc::new(InMemorySessionStore::new()),
            media: Arc::new(media),
        },
        ServiceSettings {
            forbidden_words: settings.content.forbidden_words.clone(),
            view_window: chrono::Duration::minutes(settings.content.view_window_minutes),
        },
    );
    services.health().await.context("document store is unreadable")?;

    let app = router(AppState::new(services), &settings.storage.upload_dir);

    let addr = settings.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, document = %settings.storage.document_path.display(), "inkwell listening");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
