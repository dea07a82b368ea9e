//! Application state shared across axum handlers.
//!
//! Everything is reference-counted so the state clones cheaply per
//! request; the repository and media manager are trait-backed, letting
//! tests swap in the in-memory implementations.

use std::sync::Arc;

use crate::auth::service::AuthService;
use crate::database::queries::UserRepository;
use crate::services::MediaManager;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub users: Arc<dyn UserRepository>,
    pub media: Arc<MediaManager>,
}
