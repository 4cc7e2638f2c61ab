use askama::Template;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::db::posts::{self, Page};
use crate::error::AppResult;
use crate::extractors::MaybeUser;
use crate::routes::Nav;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub nav: Nav,
    pub page: Page,
}

#[derive(Template)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate {
    pub nav: Nav,
}

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

#[derive(Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<u32>,
}

/// GET / — newest posts, paginated.
pub async fn index(
    State(state): State<AppState>,
    maybe_user: MaybeUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    let page = posts::list_page(&state.db, query.page.unwrap_or(1))?;
    Ok(Html(HomeTemplate {
        nav: Nav::from_maybe(&maybe_user),
        page,
    })
    .into_response())
}

/// GET /about
pub async fn about(maybe_user: MaybeUser) -> AppResult<Response> {
    Ok(Html(AboutTemplate {
        nav: Nav::from_maybe(&maybe_user),
    })
    .into_response())
}
