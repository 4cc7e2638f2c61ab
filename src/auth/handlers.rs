use askama::Template;
use axum::extract::{Path, Query, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use crate::auth::reset::ResetTokenError;
use crate::auth::{password, session, validate};
use crate::db::users::{self, CreateUserError};
use crate::error::AppResult;
use crate::extractors::{extract_session_token, MaybeUser};
use crate::routes::home::Html;
use crate::routes::Nav;
use crate::state::AppState;

// -- Templates --

#[derive(Template)]
#[template(path = "pages/register.html")]
pub struct RegisterTemplate {
    pub nav: Nav,
    pub username: String,
    pub email: String,
    pub errors: RegisterErrors,
}

#[derive(Default)]
pub struct RegisterErrors {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

impl RegisterErrors {
    fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.confirm_password.is_none()
    }
}

#[derive(Template)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub nav: Nav,
    pub email: String,
    pub next: String,
    pub error: Option<String>,
    pub notice: Option<String>,
}

#[derive(Template)]
#[template(path = "pages/reset_request.html")]
pub struct ResetRequestTemplate {
    pub nav: Nav,
    pub email: String,
    pub error: Option<String>,
    pub notice: Option<String>,
}

#[derive(Template)]
#[template(path = "pages/reset_password.html")]
pub struct ResetPasswordTemplate {
    pub nav: Nav,
    pub token: String,
    pub error: Option<String>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Deserialize)]
pub struct AuthQuery {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub notice: Option<String>,
}

#[derive(Deserialize)]
pub struct ResetRequestForm {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordForm {
    pub password: String,
    pub confirm_password: String,
}

// -- Cookie helpers --

fn session_cookie(name: &str, token: &str, max_age_hours: u64) -> String {
    let max_age_secs = max_age_hours * 3600;
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        name, token, max_age_secs
    )
}

fn clear_session_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0", name)
}

// -- Notices --

fn notice_message(code: &str) -> Option<String> {
    let message = match code {
        "registered" => "Account created! You can now log in.",
        "reset-sent" => "An email has been sent with instructions to reset your password.",
        "password-updated" => "Your password has been updated! You can now log in.",
        "invalid-token" => "That reset link is invalid or has expired. Please request a new one.",
        _ => return None,
    };
    Some(message.to_string())
}

/// Only follow relative redirect targets; anything else goes home.
fn safe_next(next: &str) -> &str {
    if next.starts_with('/') && !next.starts_with("//") {
        next
    } else {
        "/"
    }
}

// -- Register handlers --

/// GET /register
pub async fn register_page(maybe_user: MaybeUser) -> AppResult<Response> {
    if maybe_user.0.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    Ok(Html(RegisterTemplate {
        nav: Nav::logged_out(),
        username: String::new(),
        email: String::new(),
        errors: RegisterErrors::default(),
    })
    .into_response())
}

/// POST /register
pub async fn register_submit(
    State(state): State<AppState>,
    maybe_user: MaybeUser,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    if maybe_user.0.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let username = form.username.trim().to_string();
    let email = form.email.trim().to_string();

    let (password_err, confirm_err) = validate::password(&form.password, &form.confirm_password);
    let mut errors = RegisterErrors {
        username: validate::username(&username),
        email: validate::email(&email),
        password: password_err,
        confirm_password: confirm_err,
    };

    if errors.is_empty() {
        if users::find_by_username(&state.db, &username)?.is_some() {
            errors.username = Some("That username is taken, please choose a different one.".into());
        }
        if users::find_by_email(&state.db, &email)?.is_some() {
            errors.email = Some("That email is already registered, please use a different one.".into());
        }
    }

    if errors.is_empty() {
        let hash = password::hash(&form.password)?;
        match users::create(&state.db, &username, &email, &hash) {
            Ok(user) => {
                tracing::info!("Registered new user {}", user.username);
                return Ok(Redirect::to("/login?notice=registered").into_response());
            }
            // Lost a race against a concurrent registration; surface it
            // like the pre-check would have.
            Err(CreateUserError::UsernameTaken) => {
                errors.username =
                    Some("That username is taken, please choose a different one.".into());
            }
            Err(CreateUserError::EmailTaken) => {
                errors.email =
                    Some("That email is already registered, please use a different one.".into());
            }
            Err(CreateUserError::Other(e)) => return Err(e),
        }
    }

    Ok(Html(RegisterTemplate {
        nav: Nav::logged_out(),
        username,
        email,
        errors,
    })
    .into_response())
}

// -- Login / logout handlers --

/// GET /login
pub async fn login_page(
    maybe_user: MaybeUser,
    Query(query): Query<AuthQuery>,
) -> AppResult<Response> {
    if maybe_user.0.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    Ok(Html(LoginTemplate {
        nav: Nav::logged_out(),
        email: String::new(),
        next: query.next.unwrap_or_default(),
        error: None,
        notice: query.notice.as_deref().and_then(notice_message),
    })
    .into_response())
}

/// POST /login
///
/// Failure is reported with one generic message regardless of whether the
/// email exists or the password was wrong.
pub async fn login_submit(
    State(state): State<AppState>,
    maybe_user: MaybeUser,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    if maybe_user.0.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let email = form.email.trim().to_string();
    let user = users::find_by_email(&state.db, &email)?;

    let authenticated = user
        .filter(|u| password::verify(&form.password, &u.password_hash));

    let Some(user) = authenticated else {
        return Ok(Html(LoginTemplate {
            nav: Nav::logged_out(),
            email,
            next: form.next.unwrap_or_default(),
            error: Some("Invalid email or password.".to_string()),
            notice: None,
        })
        .into_response());
    };

    let hours = if form.remember.is_some() {
        state.config.auth.remember_hours
    } else {
        state.config.auth.session_hours
    };
    let token = session::create_session(&state.db, &user.id, hours)?;
    let cookie = session_cookie(&state.config.auth.cookie_name, &token, hours);

    tracing::info!("User {} logged in", user.username);

    let target = form.next.as_deref().map(safe_next).unwrap_or("/").to_string();
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Redirect::to(&target),
    )
        .into_response())
}

/// POST /logout
pub async fn logout(State(state): State<AppState>, parts: Parts) -> AppResult<Response> {
    if let Some(token) = extract_session_token(&parts, &state.config.auth.cookie_name) {
        session::delete_session(&state.db, token)?;
    }
    Ok((
        AppendHeaders([(
            header::SET_COOKIE,
            clear_session_cookie(&state.config.auth.cookie_name),
        )]),
        Redirect::to("/"),
    )
        .into_response())
}

// -- Password reset handlers --

/// GET /reset
pub async fn reset_request_page(
    maybe_user: MaybeUser,
    Query(query): Query<AuthQuery>,
) -> AppResult<Response> {
    if maybe_user.0.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    Ok(Html(ResetRequestTemplate {
        nav: Nav::logged_out(),
        email: String::new(),
        error: None,
        notice: query.notice.as_deref().and_then(notice_message),
    })
    .into_response())
}

/// POST /reset — issue a token and hand the reset link to the mailer.
pub async fn reset_request_submit(
    State(state): State<AppState>,
    maybe_user: MaybeUser,
    headers: HeaderMap,
    Form(form): Form<ResetRequestForm>,
) -> AppResult<Response> {
    if maybe_user.0.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let email = form.email.trim().to_string();
    let Some(user) = users::find_by_email(&state.db, &email)? else {
        return Ok(Html(ResetRequestTemplate {
            nav: Nav::logged_out(),
            email,
            error: Some("There is no account with that email.".to_string()),
            notice: None,
        })
        .into_response());
    };

    let token = state.reset_tokens.issue(&user.id)?;
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}:{}", state.config.server.host, state.config.server.port));
    let reset_url = format!("http://{}/reset/{}", host, token);

    if let Err(e) = state
        .mailer
        .send_reset_email(&user.email, &user.username, &reset_url)
    {
        tracing::error!("Reset email for {} not delivered: {}", user.email, e);
    }

    Ok(Redirect::to("/login?notice=reset-sent").into_response())
}

/// GET /reset/{token}
pub async fn reset_password_page(
    State(state): State<AppState>,
    maybe_user: MaybeUser,
    Path(token): Path<String>,
) -> AppResult<Response> {
    if maybe_user.0.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    match state.reset_tokens.verify(&token) {
        Ok(_) => Ok(Html(ResetPasswordTemplate {
            nav: Nav::logged_out(),
            token,
            error: None,
        })
        .into_response()),
        Err(e) => {
            tracing::warn!("Rejected reset token: {}", e);
            Ok(Redirect::to("/reset?notice=invalid-token").into_response())
        }
    }
}

/// POST /reset/{token}
pub async fn reset_password_submit(
    State(state): State<AppState>,
    maybe_user: MaybeUser,
    Path(token): Path<String>,
    Form(form): Form<ResetPasswordForm>,
) -> AppResult<Response> {
    if maybe_user.0.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    // Re-verify on submit: the token may have expired while the form sat open.
    let user_id = match state.reset_tokens.verify(&token) {
        Ok(user_id) => user_id,
        Err(ResetTokenError::Expired) | Err(ResetTokenError::Invalid) => {
            return Ok(Redirect::to("/reset?notice=invalid-token").into_response());
        }
    };

    let (password_err, confirm_err) = validate::password(&form.password, &form.confirm_password);
    if let Some(error) = password_err.or(confirm_err) {
        return Ok(Html(ResetPasswordTemplate {
            nav: Nav::logged_out(),
            token,
            error: Some(error),
        })
        .into_response());
    }

    let hash = password::hash(&form.password)?;
    users::update_password(&state.db, &user_id, &hash)?;
    tracing::info!("Password updated via reset token for user {}", user_id);

    Ok(Redirect::to("/login?notice=password-updated").into_response())
}
