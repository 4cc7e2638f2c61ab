use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::auth::reset::ResetTokens;
use crate::config::Config;
use crate::mail::Mailer;

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub reset_tokens: ResetTokens,
    pub mailer: Mailer,
}
