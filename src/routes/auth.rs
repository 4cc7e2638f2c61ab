use axum::routing::{get, post};
use axum::Router;

use crate::auth::handlers;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/register",
            get(handlers::register_page).post(handlers::register_submit),
        )
        .route(
            "/login",
            get(handlers::login_page).post(handlers::login_submit),
        )
        .route("/logout", post(handlers::logout))
        .route(
            "/reset",
            get(handlers::reset_request_page).post(handlers::reset_request_submit),
        )
        .route(
            "/reset/{token}",
            get(handlers::reset_password_page).post(handlers::reset_password_submit),
        )
}
