//! HTTP routes for the user profile endpoints.
//!
//! All of these require an authenticated caller; the auth guard is applied
//! by the parent router.

use axum::routing::{get, patch};
use axum::Router;

use crate::api::user::handlers;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/current-user", get(handlers::current_user))
        .route("/update-account", patch(handlers::update_account))
        .route("/avatar", patch(handlers::update_avatar))
}
