//! Main entry point for the VidTube backend.
//!
//! This file initializes the Axum web server, sets up the database and
//! media-host connections, and registers all API routes and middleware.
//! It orchestrates the application's startup and defines its overall structure.

mod api;
mod auth;
mod config;
mod database;
mod errors;
mod middleware;
mod services;
mod state;
mod utils;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tracing_subscriber::EnvFilter;
use vidtube_adapters::{BlobStore, CloudinaryStore, MemoryBlobStore};

use crate::auth::service::AuthService;
use crate::auth::tokens::TokenIssuer;
use crate::config::AppConfig;
use crate::database::queries::{MongoUserRepository, UserRepository};
use crate::services::MediaManager;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;

    let db = database::connect(&config.database).await?;
    let users: Arc<dyn UserRepository> = Arc::new(MongoUserRepository::new(&db));

    let store: Arc<dyn BlobStore> = match config.media.cloudinary.clone() {
        Some(cloudinary) => Arc::new(CloudinaryStore::new(cloudinary)),
        None => {
            tracing::warn!("no media-host credentials configured, uploads stay in memory");
            Arc::new(MemoryBlobStore::new())
        }
    };
    let media = Arc::new(MediaManager::new(store, config.media.temp_dir.clone()));

    let auth = Arc::new(AuthService::new(
        users.clone(),
        media.clone(),
        TokenIssuer::new(&config.tokens),
    ));
    let state = AppState { auth, users, media };

    let app = Router::new()
        .route("/", get(root_handler))
        .nest("/api/v1/users", auth::routes::user_router(state))
        .layer(middleware::cors_layer(&config.cors_origin)?)
        .layer(middleware::trace_layer());

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn root_handler() -> &'static str {
    "Welcome to VidTube!"
}
