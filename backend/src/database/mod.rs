//! Module for database connection setup and common utilities.
//!
//! This module is responsible for initializing the MongoDB client and
//! providing a central point for database-related configurations and
//! helpers.

pub mod models;
pub mod queries;

use mongodb::bson::doc;
use mongodb::{Client, Database};

use crate::config::DatabaseConfig;

/// Connect to the configured deployment and verify it answers.
///
/// The ping makes startup fail fast on a bad URL instead of at the first
/// request.
pub async fn connect(config: &DatabaseConfig) -> Result<Database, mongodb::error::Error> {
    let client = Client::with_uri_str(&config.url).await?;
    let database = client.database(&config.name);
    database.run_command(doc! {"ping": 1}).await?;
    tracing::info!(database = %config.name, "connected to MongoDB");
    Ok(database)
}
