use askama::Template;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;

use crate::db::models::Post;
use crate::db::{posts, users};
use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, MaybeUser};
use crate::routes::home::Html;
use crate::routes::Nav;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/post.html")]
pub struct PostTemplate {
    pub nav: Nav,
    pub post: Post,
    pub author_username: String,
    pub viewer_is_owner: bool,
}

#[derive(Template)]
#[template(path = "pages/post_form.html")]
pub struct PostFormTemplate {
    pub nav: Nav,
    pub legend: String,
    pub action: String,
    pub title: String,
    pub body: String,
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct PostForm {
    pub title: String,
    pub body: String,
}

fn validate(title: &str, body: &str) -> Option<String> {
    if title.trim().is_empty() {
        return Some("Title is required.".to_string());
    }
    if title.chars().count() > 100 {
        return Some("Title must be at most 100 characters.".to_string());
    }
    if body.trim().is_empty() {
        return Some("Content is required.".to_string());
    }
    None
}

/// Load a post or 404, then require the viewer to own it.
fn owned_post(state: &AppState, post_id: &str, user: &CurrentUser) -> AppResult<Post> {
    let post = posts::find_by_id(&state.db, post_id)?.ok_or(AppError::NotFound)?;
    if post.user_id != user.id {
        return Err(AppError::Forbidden);
    }
    Ok(post)
}

/// GET /post/new
async fn new_post_page(user: CurrentUser) -> AppResult<Response> {
    Ok(Html(PostFormTemplate {
        nav: Nav::for_user(&user),
        legend: "New Post".to_string(),
        action: "/post/new".to_string(),
        title: String::new(),
        body: String::new(),
        error: None,
    })
    .into_response())
}

/// POST /post/new
async fn create_post(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<PostForm>,
) -> AppResult<Response> {
    if let Some(error) = validate(&form.title, &form.body) {
        return Ok(Html(PostFormTemplate {
            nav: Nav::for_user(&user),
            legend: "New Post".to_string(),
            action: "/post/new".to_string(),
            title: form.title,
            body: form.body,
            error: Some(error),
        })
        .into_response());
    }

    let post = posts::create(&state.db, &user.id, form.title.trim(), &form.body)?;
    tracing::info!("User {} created post {}", user.username, post.id);
    Ok(Redirect::to(&format!("/post/{}", post.id)).into_response())
}

/// GET /post/{id}
async fn show_post(
    State(state): State<AppState>,
    maybe_user: MaybeUser,
    Path(post_id): Path<String>,
) -> AppResult<Response> {
    let post = posts::find_by_id(&state.db, &post_id)?.ok_or(AppError::NotFound)?;
    let author = users::find_by_id(&state.db, &post.user_id)?
        .ok_or_else(|| AppError::Internal("post author missing".into()))?;

    let viewer_is_owner = maybe_user
        .0
        .as_ref()
        .is_some_and(|u| u.id == post.user_id);

    Ok(Html(PostTemplate {
        nav: Nav::from_maybe(&maybe_user),
        post,
        author_username: author.username,
        viewer_is_owner,
    })
    .into_response())
}

/// GET /post/{id}/edit
async fn edit_post_page(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(post_id): Path<String>,
) -> AppResult<Response> {
    let post = owned_post(&state, &post_id, &user)?;
    Ok(Html(PostFormTemplate {
        nav: Nav::for_user(&user),
        legend: "Edit Post".to_string(),
        action: format!("/post/{}/edit", post.id),
        title: post.title,
        body: post.body,
        error: None,
    })
    .into_response())
}

/// POST /post/{id}/edit
async fn update_post(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(post_id): Path<String>,
    Form(form): Form<PostForm>,
) -> AppResult<Response> {
    let post = owned_post(&state, &post_id, &user)?;

    if let Some(error) = validate(&form.title, &form.body) {
        return Ok(Html(PostFormTemplate {
            nav: Nav::for_user(&user),
            legend: "Edit Post".to_string(),
            action: format!("/post/{}/edit", post.id),
            title: form.title,
            body: form.body,
            error: Some(error),
        })
        .into_response());
    }

    posts::update(&state.db, &post.id, form.title.trim(), &form.body)?;
    tracing::info!("User {} updated post {}", user.username, post.id);
    Ok(Redirect::to(&format!("/post/{}", post.id)).into_response())
}

/// POST /post/{id}/delete
async fn delete_post(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(post_id): Path<String>,
) -> AppResult<Response> {
    let post = owned_post(&state, &post_id, &user)?;
    posts::delete(&state.db, &post.id)?;
    tracing::info!("User {} deleted post {}", user.username, post.id);
    Ok(Redirect::to("/").into_response())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/post/new", get(new_post_page).post(create_post))
        .route("/post/{id}", get(show_post))
        .route("/post/{id}/edit", get(edit_post_page).post(update_post))
        .route("/post/{id}/delete", post(delete_post))
}
