//! Creates the administrator account and a few starter tags. Safe to re-run:
//! records that already exist are left alone.

use std::sync::Arc;

use anyhow::Context;
use auth_adapters::{Argon2AuthProvider, InMemorySessionStore};
use configs::Settings;
use domains::models::Role;
use domains::AppError;
use secrecy::ExposeSecret;
use services::auth::RegisterInput;
use services::tags::NewTag;
use services::{Ports, ServiceSettings, Services};
use storage_adapters::{JsonFileStore, LocalMediaStorage};

const STARTER_TAGS: [(&str, &str, &str); 5] = [
    ("Rust", "Systems programming", "#CE422B"),
    ("Web", "Frontend and backend development", "#3B82F6"),
    ("Database", "Storage, queries and modelling", "#10B981"),
    ("DevOps", "Deployment and operations", "#F59E0B"),
    ("Life", "Everything else", "#8B5CF6"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading configuration")?;
    tracing_subscriber::fmt().with_env_filter(&settings.log.level).init();
    for warning in settings.warnings() {
        tracing::warn!("{warning}");
    }

    let store = JsonFileStore::new(&settings.storage.document_path);
    store.init_if_missing().await?;

    let services = Services::new(
        Ports {
            store: Arc::new(store),
            auth: Arc::new(Argon2AuthProvider::new(settings.security.ip_hash_secret)),
            sessions: Arc::new(InMemorySessionStore::new()),
            media: Arc::new(LocalMediaStorage::new(&settings.storage.upload_dir, "/static")),
        },
        ServiceSettings::default(),
    );

    let seed = &settings.seed;
    let input = RegisterInput {
        email: seed.admin_email.clone(),
        password: seed.admin_password.expose_secret().to_string(),
        username: Some(seed.admin_username.clone()),
    };
    match services.auth.create_account(input, Role::Admin).await {
        Ok(user) => tracing::info!(user_id = user.id, email = %user.email, "admin created"),
        Err(AppError::Conflict(_)) => tracing::info!(email = %seed.admin_email, "admin already exists"),
        Err(e) => return Err(e).context("creating admin"),
    }

    let admin = services
        .db
        .read()
        .await?
        .user_by_email(&seed.admin_email)
        .cloned()
        .context("admin account vanished")?;
    if !admin.is_admin() {
        anyhow::bail!("{} exists but is not an administrator", seed.admin_email);
    }

    for (name, description, color) in STARTER_TAGS {
        let tag = NewTag {
            name: name.to_string(),
            description: Some(description.to_string()),
            color: Some(color.to_string()),
        };
        match services.tags.create(&admin, tag).await {
            Ok(tag) => tracing::info!(tag_id = tag.id, name, "tag created"),
            Err(AppError::Conflict(_)) => tracing::debug!(name, "tag already exists"),
            Err(e) => return Err(e).context("creating starter tags"),
        }
    }
    Ok(())
}
