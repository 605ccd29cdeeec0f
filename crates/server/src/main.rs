use std::path::Path;

use anyhow::Error as AnyhowError;
use db::{DBService, models::user::User};
use rand::Rng;
use secrecy::SecretString;
use server::{AppState, http};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, prelude::*};

#[derive(Debug, Error)]
pub enum TaskBoardError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(#[from] AnyhowError),
}

#[tokio::main]
async fn main() -> Result<(), TaskBoardError> {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let filter_string = format!(
        "warn,server={level},services={level},db={level},utils={level}",
        level = log_level
    );
    let env_filter = EnvFilter::try_new(filter_string).expect("Failed to create tracing filter");
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(env_filter))
        .init();

    let db = DBService::new();
    seed_users_from_env(&db);

    let state = AppState::new(db, jwt_secret_from_env());
    let app_router = http::router(state);

    let port = std::env::var("BACKEND_PORT")
        .or_else(|_| std::env::var("PORT"))
        .ok()
        .and_then(|value| value.trim().parse::<u16>().ok())
        .unwrap_or(5000);
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

    let listener = tokio::net::TcpListener::bind(format!("{host}:{port}")).await?;
    let actual_port = listener.local_addr()?.port();
    tracing::info!("Server running on http://{host}:{actual_port}");

    axum::serve(listener, app_router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn jwt_secret_from_env() -> SecretString {
    match std::env::var("TASKBOARD_JWT_SECRET") {
        Ok(secret) if !secret.trim().is_empty() => SecretString::from(secret),
        _ => {
            tracing::warn!(
                "TASKBOARD_JWT_SECRET is not set; using an ephemeral secret, tokens will not survive a restart"
            );
            let secret: String = rand::thread_rng()
                .sample_iter(&rand::distributions::Alphanumeric)
                .take(48)
                .map(char::from)
                .collect();
            SecretString::from(secret)
        }
    }
}

/// Users are owned by the external identity system; an optional JSON file
/// stands in for it so a fresh process has callers to authenticate.
fn seed_users_from_env(db: &DBService) {
    let Ok(path) = std::env::var("TASKBOARD_USERS_FILE") else {
        return;
    };
    match load_users(Path::new(&path), db) {
        Ok(count) => tracing::info!(count, path = %path, "loaded user records"),
        Err(err) => tracing::warn!(error = %err, path = %path, "failed to load user records"),
    }
}

fn load_users(path: &Path, db: &DBService) -> anyhow::Result<usize> {
    let raw = std::fs::read_to_string(path)?;
    let users: Vec<User> = serde_json::from_str(&raw)?;
    let count = users.len();
    for user in users {
        User::create(&db.store, user);
    }
    Ok(count)
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigint = signal(SignalKind::interrupt()).expect("Failed to install SIGINT handler");
        let mut sigterm =
            signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");
        tokio::select! {
            _ = sigint.recv() => {}
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            return;
        }
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
