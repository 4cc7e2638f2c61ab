use askama::Template;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};

use crate::db::posts::{self, Page};
use crate::db::users;
use crate::error::{AppError, AppResult};
use crate::extractors::MaybeUser;
use crate::routes::home::{Html, PageQuery};
use crate::routes::Nav;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/user_posts.html")]
pub struct UserPostsTemplate {
    pub nav: Nav,
    pub author: String,
    pub avatar_url: String,
    pub page: Page,
}

/// GET /user/{username} — all posts by one author, paginated.
pub async fn user_posts(
    State(state): State<AppState>,
    maybe_user: MaybeUser,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    let author = users::find_by_username(&state.db, &username)?.ok_or(AppError::NotFound)?;
    let page = posts::list_by_author_page(&state.db, &author.id, query.page.unwrap_or(1))?;
    let avatar_url = author.avatar_url();

    Ok(Html(UserPostsTemplate {
        nav: Nav::from_maybe(&maybe_user),
        author: author.username,
        avatar_url,
        page,
    })
    .into_response())
}
