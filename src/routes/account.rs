use askama::Template;
use axum::extract::{Multipart, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use crate::auth::validate;
use crate::db::users;
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::routes::home::Html;
use crate::routes::Nav;
use crate::state::AppState;
use crate::storage;

#[derive(Template)]
#[template(path = "pages/account.html")]
pub struct AccountTemplate {
    pub nav: Nav,
    pub username: String,
    pub email: String,
    pub avatar_url: String,
    pub errors: AccountErrors,
    pub notice: Option<String>,
}

#[derive(Default)]
pub struct AccountErrors {
    pub username: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

impl AccountErrors {
    fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.avatar.is_none()
    }
}

#[derive(Deserialize)]
pub struct AccountQuery {
    #[serde(default)]
    pub notice: Option<String>,
}

/// The profile fields as they arrived in the multipart body.
#[derive(Default)]
struct ProfileUpdate {
    username: String,
    email: String,
    avatar: Option<(String, Vec<u8>)>,
}

async fn read_multipart(mut multipart: Multipart) -> AppResult<ProfileUpdate> {
    let mut update = ProfileUpdate::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid form data: {e}")))?
    {
        match field.name() {
            Some("username") => {
                update.username = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid form data: {e}")))?;
            }
            Some("email") => {
                update.email = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid form data: {e}")))?;
            }
            Some("avatar") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid form data: {e}")))?;
                // Browsers send an empty part when no file was picked
                if !filename.is_empty() && !bytes.is_empty() {
                    update.avatar = Some((filename, bytes.to_vec()));
                }
            }
            _ => {}
        }
    }

    Ok(update)
}

fn account_notice(code: &str) -> Option<String> {
    match code {
        "updated" => Some("Your account information has been updated.".to_string()),
        _ => None,
    }
}

/// GET /account
async fn account_page(
    user: CurrentUser,
    Query(query): Query<AccountQuery>,
) -> AppResult<Response> {
    Ok(Html(AccountTemplate {
        nav: Nav::for_user(&user),
        username: user.username.clone(),
        email: user.email.clone(),
        avatar_url: user.avatar_url(),
        errors: AccountErrors::default(),
        notice: query.notice.as_deref().and_then(account_notice),
    })
    .into_response())
}

/// POST /account — update username/email, optionally replacing the avatar.
async fn account_update(
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> AppResult<Response> {
    let update = read_multipart(multipart).await?;
    let username = update.username.trim().to_string();
    let email = update.email.trim().to_string();

    let mut errors = AccountErrors {
        username: validate::username(&username),
        email: validate::email(&email),
        avatar: None,
    };

    // Only check for reuse when the field actually changed
    if errors.username.is_none() && username != user.username {
        if users::find_by_username(&state.db, &username)?.is_some() {
            errors.username = Some("That username is taken, please choose a different one.".into());
        }
    }
    if errors.email.is_none() && email != user.email {
        if users::find_by_email(&state.db, &email)?.is_some() {
            errors.email = Some("That email is already registered, please use a different one.".into());
        }
    }

    let mut avatar_file: Option<String> = None;
    if errors.is_empty() {
        if let Some((filename, bytes)) = &update.avatar {
            match storage::save_avatar(state.config.uploads_path(), filename, bytes) {
                Ok(stored) => avatar_file = Some(stored),
                Err(AppError::BadRequest(msg)) => errors.avatar = Some(msg),
                Err(e) => return Err(e),
            }
        }
    }

    if !errors.is_empty() {
        return Ok(Html(AccountTemplate {
            nav: Nav::for_user(&user),
            username,
            email,
            avatar_url: user.avatar_url(),
            errors,
            notice: None,
        })
        .into_response());
    }

    users::update_profile(&state.db, &user.id, &username, &email, avatar_file.as_deref())?;
    tracing::info!("User {} updated their account", user.id);

    Ok(Redirect::to("/account?notice=updated").into_response())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/account", get(account_page).post(account_update))
}
