// Library exports for Quill
// This allows integration tests and external code to use Quill modules

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod mail;
pub mod routes;
pub mod state;
pub mod storage;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::home::index))
        .route("/about", get(routes::home::about))
        .route("/user/{username}", get(routes::users::user_posts))
        .route("/assets/{*path}", get(routes::assets::serve))
        .route("/media/{file}", get(routes::assets::media))
        .merge(routes::auth::router())
        .merge(routes::posts::router())
        .merge(routes::account::router())
        .with_state(state)
}
