use rusqlite::{params, OptionalExtension, Row};

use crate::db::models::User;
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

/// Why a registration insert was rejected.
#[derive(Debug, thiserror::Error)]
pub enum CreateUserError {
    #[error("That username is taken, please choose a different one.")]
    UsernameTaken,

    #[error("That email is already registered, please use a different one.")]
    EmailTaken,

    #[error(transparent)]
    Other(#[from] AppError),
}

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        avatar_file: row.get(4)?,
        created_at: row.get(5)?,
    })
}

const USER_COLUMNS: &str = "id, username, email, password_hash, avatar_file, created_at";

/// Insert a new user. The UNIQUE constraints on username and email are the
/// authority here; a violation is reported as the matching duplicate error.
pub fn create(
    pool: &DbPool,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<User, CreateUserError> {
    let conn = pool.get().map_err(AppError::from)?;
    let id = uuid::Uuid::now_v7().to_string();

    let inserted = conn.execute(
        "INSERT INTO users (id, username, email, password_hash) VALUES (?1, ?2, ?3, ?4)",
        params![id, username, email, password_hash],
    );

    if let Err(e) = inserted {
        let msg = e.to_string();
        if msg.contains("users.username") {
            return Err(CreateUserError::UsernameTaken);
        }
        if msg.contains("users.email") {
            return Err(CreateUserError::EmailTaken);
        }
        return Err(AppError::from(e).into());
    }

    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            row_to_user,
        )
        .map_err(AppError::from)?;
    Ok(user)
}

pub fn find_by_id(pool: &DbPool, id: &str) -> AppResult<Option<User>> {
    let conn = pool.get()?;
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            row_to_user,
        )
        .optional()?;
    Ok(user)
}

pub fn find_by_username(pool: &DbPool, username: &str) -> AppResult<Option<User>> {
    let conn = pool.get()?;
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
            params![username],
            row_to_user,
        )
        .optional()?;
    Ok(user)
}

pub fn find_by_email(pool: &DbPool, email: &str) -> AppResult<Option<User>> {
    let conn = pool.get()?;
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            params![email],
            row_to_user,
        )
        .optional()?;
    Ok(user)
}

/// Update username and email, and optionally swap the avatar reference.
pub fn update_profile(
    pool: &DbPool,
    id: &str,
    username: &str,
    email: &str,
    avatar_file: Option<&str>,
) -> AppResult<()> {
    let conn = pool.get()?;
    match avatar_file {
        Some(file) => {
            conn.execute(
                "UPDATE users SET username = ?1, email = ?2, avatar_file = ?3 WHERE id = ?4",
                params![username, email, file, id],
            )?;
        }
        None => {
            conn.execute(
                "UPDATE users SET username = ?1, email = ?2 WHERE id = ?3",
                params![username, email, id],
            )?;
        }
    }
    Ok(())
}

pub fn update_password(pool: &DbPool, id: &str, password_hash: &str) -> AppResult<()> {
    let conn = pool.get()?;
    conn.execute(
        "UPDATE users SET password_hash = ?1 WHERE id = ?2",
        params![password_hash, id],
    )?;
    Ok(())
}
