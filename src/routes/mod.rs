pub mod account;
pub mod assets;
pub mod auth;
pub mod home;
pub mod posts;
pub mod users;

use crate::extractors::{CurrentUser, MaybeUser};

/// Login state shown in the page header.
pub struct Nav {
    pub username: Option<String>,
}

impl Nav {
    pub fn logged_out() -> Self {
        Self { username: None }
    }

    pub fn for_user(user: &CurrentUser) -> Self {
        Self {
            username: Some(user.username.clone()),
        }
    }

    pub fn from_maybe(maybe_user: &MaybeUser) -> Self {
        Self {
            username: maybe_user.0.as_ref().map(|u| u.username.clone()),
        }
    }
}
